use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json,
};
use canchas_app::{Claims, Credentials, NewRegistration};

use crate::{
    context::ServerContext,
    errors::{ErrorBody, ServerError, ServerResult},
    schemas::{LoginSchema, RegisterSchema, ValidatedJson},
    serialized::{LoginResult, Message, ToSerialized, VerifyResult},
    Router,
};

/// The verified claims of the request's bearer token
pub struct Session(Claims);

impl Session {
    pub fn user_id(&self) -> i32 {
        self.0.sub
    }

    pub fn user_name(&self) -> &str {
        &self.0.name
    }
}

#[async_trait]
impl FromRequestParts<ServerContext> for Session {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerContext,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|x| x.to_str().ok())
            .ok_or(ServerError::Unauthorized("Token no proporcionado"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or(ServerError::Unauthorized("Token no proporcionado"))?;

        let claims = state
            .app
            .auth
            .verify_token(token)
            .map_err(|_| ServerError::Unauthorized("Token inválido o expirado"))?;

        Ok(Self(claims))
    }
}

#[utoipa::path(
    post,
    path = "/register",
    tag = "auth",
    request_body = RegisterSchema,
    responses(
        (status = 201, body = Message),
        (status = 400, body = ErrorBody)
    )
)]
async fn register(
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<RegisterSchema>,
) -> ServerResult<impl IntoResponse> {
    context
        .app
        .auth
        .register(NewRegistration {
            name: body.name,
            email: body.email,
            password: body.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Message::new("Usuario registrado exitosamente")),
    ))
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = LoginSchema,
    responses(
        (status = 200, body = LoginResult),
        (status = 400, body = ErrorBody)
    )
)]
async fn login(
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<LoginSchema>,
) -> ServerResult<Json<LoginResult>> {
    let session = context
        .app
        .auth
        .login(Credentials {
            email: body.email,
            password: body.password,
        })
        .await?;

    Ok(Json(session.to_serialized()))
}

#[utoipa::path(
    get,
    path = "/verify",
    tag = "auth",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = VerifyResult),
        (status = 401, body = ErrorBody)
    )
)]
async fn verify(session: Session) -> Json<VerifyResult> {
    Json(VerifyResult {
        ok: true,
        name: session.user_name().to_string(),
        id: session.user_id(),
    })
}

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/verify", get(verify))
}
