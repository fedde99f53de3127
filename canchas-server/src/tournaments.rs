use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json,
};
use canchas_app::{NewTeam, NewTournament, UpdatedTournament};

use crate::{
    auth::Session,
    context::ServerContext,
    errors::{ErrorBody, ServerResult},
    schemas::{parse_date, NewTeamSchema, NewTournamentSchema, UpdateTournamentSchema, ValidatedJson},
    serialized::{Message, TeamRoster, ToSerialized, Tournament, TournamentResult},
    Router,
};

#[utoipa::path(
    get,
    path = "/api/torneos",
    tag = "torneos",
    responses(
        (status = 200, body = Vec<Tournament>)
    )
)]
async fn list_tournaments(
    State(context): State<ServerContext>,
) -> ServerResult<Json<Vec<Tournament>>> {
    let tournaments = context.app.tournaments.list().await?;

    Ok(Json(tournaments.to_serialized()))
}

#[utoipa::path(
    get,
    path = "/api/torneos/{id}",
    tag = "torneos",
    responses(
        (status = 200, body = Tournament),
        (status = 404, body = ErrorBody)
    )
)]
async fn tournament(
    State(context): State<ServerContext>,
    Path(id): Path<i32>,
) -> ServerResult<Json<Tournament>> {
    let tournament = context.app.tournaments.get(id).await?;

    Ok(Json(tournament.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/api/torneos",
    tag = "torneos",
    request_body = NewTournamentSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 201, body = TournamentResult),
        (status = 400, body = ErrorBody)
    )
)]
async fn create_tournament(
    session: Session,
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<NewTournamentSchema>,
) -> ServerResult<impl IntoResponse> {
    let tournament = context
        .app
        .tournaments
        .create(NewTournament {
            nombre: body.nombre,
            fecha_inicio: parse_date(&body.fecha_inicio)?,
            fecha_fin: parse_date(&body.fecha_fin)?,
            num_equipos: body.num_equipos,
            costo: body.costo,
            ubicacion: body.ubicacion,
            descripcion: body.descripcion,
            creador_id: session.user_id(),
            creador_nombre: session.user_name().to_string(),
        })
        .await?;

    let created = TournamentResult::new("Torneo creado exitosamente", &tournament);

    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/torneos/{id}",
    tag = "torneos",
    request_body = UpdateTournamentSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = TournamentResult),
        (status = 403, body = ErrorBody),
        (status = 404, body = ErrorBody)
    )
)]
async fn update_tournament(
    session: Session,
    State(context): State<ServerContext>,
    Path(id): Path<i32>,
    ValidatedJson(body): ValidatedJson<UpdateTournamentSchema>,
) -> ServerResult<Json<TournamentResult>> {
    let fecha_inicio = body.fecha_inicio.as_deref().map(parse_date).transpose()?;
    let fecha_fin = body.fecha_fin.as_deref().map(parse_date).transpose()?;

    let tournament = context
        .app
        .tournaments
        .update(
            session.user_id(),
            UpdatedTournament {
                id,
                nombre: body.nombre,
                fecha_inicio,
                fecha_fin,
                num_equipos: body.num_equipos,
                costo: body.costo,
                ubicacion: body.ubicacion,
                descripcion: body.descripcion,
            },
        )
        .await?;

    Ok(Json(TournamentResult::new(
        "Torneo actualizado exitosamente",
        &tournament,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/torneos/{id}",
    tag = "torneos",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Message),
        (status = 403, body = ErrorBody),
        (status = 404, body = ErrorBody)
    )
)]
async fn delete_tournament(
    session: Session,
    State(context): State<ServerContext>,
    Path(id): Path<i32>,
) -> ServerResult<Json<Message>> {
    context.app.tournaments.delete(session.user_id(), id).await?;

    Ok(Json(Message::new("Torneo eliminado exitosamente")))
}

#[utoipa::path(
    get,
    path = "/api/torneos/{id}/equipos",
    tag = "torneos",
    responses(
        (status = 200, body = TeamRoster),
        (status = 404, body = ErrorBody)
    )
)]
async fn team_roster(
    State(context): State<ServerContext>,
    Path(id): Path<i32>,
) -> ServerResult<Json<TeamRoster>> {
    let tournament = context.app.tournaments.get(id).await?;

    Ok(Json(tournament.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/api/torneos/{id}/equipos",
    tag = "torneos",
    request_body = NewTeamSchema,
    responses(
        (status = 201, body = TournamentResult),
        (status = 400, body = ErrorBody),
        (status = 404, body = ErrorBody)
    )
)]
async fn enroll_team(
    State(context): State<ServerContext>,
    Path(id): Path<i32>,
    ValidatedJson(body): ValidatedJson<NewTeamSchema>,
) -> ServerResult<impl IntoResponse> {
    let tournament = context
        .app
        .tournaments
        .enroll_team(
            id,
            NewTeam {
                nombre: body.nombre,
                capitan: body.capitan,
                telefono: body.telefono,
                email: body.email,
            },
        )
        .await?;

    let enrolled = TournamentResult::new("Equipo inscrito exitosamente", &tournament);

    Ok((StatusCode::CREATED, Json(enrolled)))
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_tournaments))
        .route("/", post(create_tournament))
        .route("/:id", get(tournament))
        .route("/:id", put(update_tournament))
        .route("/:id", delete(delete_tournament))
        .route("/:id/equipos", get(team_roster))
        .route("/:id/equipos", post(enroll_team))
}
