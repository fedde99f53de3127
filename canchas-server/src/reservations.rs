use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json,
};
use canchas_app::NewReservation;

use crate::{
    auth::Session,
    context::ServerContext,
    errors::{ErrorBody, ServerResult},
    schemas::{NewReservationSchema, ValidatedJson},
    serialized::{CreatedReservation, Message, Reservation, ToSerialized},
    Router,
};

#[utoipa::path(
    post,
    path = "/reservas",
    tag = "reservas",
    request_body = NewReservationSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 201, body = CreatedReservation),
        (status = 400, body = ErrorBody)
    )
)]
async fn create_reservation(
    session: Session,
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<NewReservationSchema>,
) -> ServerResult<impl IntoResponse> {
    let reservation = context
        .app
        .bookings
        .create(NewReservation {
            user_id: session.user_id(),
            nombre: body.nombre,
            email: body.email,
            telefono: body.telefono,
            cancha: body.cancha,
            fecha: body.fecha,
            hora: body.hora,
        })
        .await?;

    let created = CreatedReservation {
        mensaje: "Reserva creada exitosamente".to_string(),
        reserva: reservation.to_serialized(),
    };

    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/reservas",
    tag = "reservas",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Vec<Reservation>)
    )
)]
async fn list_reservations(
    session: Session,
    State(context): State<ServerContext>,
) -> ServerResult<Json<Vec<Reservation>>> {
    let reservations = context.app.bookings.list(session.user_id()).await?;

    Ok(Json(reservations.to_serialized()))
}

#[utoipa::path(
    delete,
    path = "/reservas/{id}",
    tag = "reservas",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Message),
        (status = 404, body = ErrorBody)
    )
)]
async fn cancel_reservation(
    session: Session,
    State(context): State<ServerContext>,
    Path(id): Path<i32>,
) -> ServerResult<Json<Message>> {
    context.app.bookings.cancel(session.user_id(), id).await?;

    Ok(Json(Message::new("Reserva cancelada exitosamente")))
}

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_reservation))
        .route("/", get(list_reservations))
        .route("/:id", delete(cancel_reservation))
}
