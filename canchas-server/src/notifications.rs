use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, patch},
    Json,
};

use crate::{
    auth::Session,
    context::ServerContext,
    errors::{ErrorBody, ServerResult},
    schemas::NotificationListQuery,
    serialized::{Message, NotificationList, ToSerialized, UnreadCount},
    Router,
};

#[utoipa::path(
    get,
    path = "/notificaciones",
    tag = "notificaciones",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = NotificationList)
    )
)]
async fn list_notifications(
    session: Session,
    State(context): State<ServerContext>,
    Query(query): Query<NotificationListQuery>,
) -> ServerResult<Json<NotificationList>> {
    let page = context
        .app
        .notifications
        .list(
            session.user_id(),
            query.solo_no_leidas,
            query.limit,
            query.offset,
        )
        .await?;

    Ok(Json(page.to_serialized()))
}

#[utoipa::path(
    get,
    path = "/notificaciones/contador",
    tag = "notificaciones",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = UnreadCount)
    )
)]
async fn unread_count(
    session: Session,
    State(context): State<ServerContext>,
) -> ServerResult<Json<UnreadCount>> {
    let no_leidas = context
        .app
        .notifications
        .unread_count(session.user_id())
        .await?;

    Ok(Json(UnreadCount { no_leidas }))
}

#[utoipa::path(
    patch,
    path = "/notificaciones/{id}/leer",
    tag = "notificaciones",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Message),
        (status = 404, body = ErrorBody)
    )
)]
async fn mark_read(
    session: Session,
    State(context): State<ServerContext>,
    Path(id): Path<i32>,
) -> ServerResult<Json<Message>> {
    context
        .app
        .notifications
        .mark_read(session.user_id(), id)
        .await?;

    Ok(Json(Message::new("Notificación marcada como leída")))
}

#[utoipa::path(
    patch,
    path = "/notificaciones/leer-todas",
    tag = "notificaciones",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Message)
    )
)]
async fn mark_all_read(
    session: Session,
    State(context): State<ServerContext>,
) -> ServerResult<Json<Message>> {
    context
        .app
        .notifications
        .mark_all_read(session.user_id())
        .await?;

    Ok(Json(Message::new(
        "Todas las notificaciones marcadas como leídas",
    )))
}

#[utoipa::path(
    delete,
    path = "/notificaciones/{id}",
    tag = "notificaciones",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Message),
        (status = 404, body = ErrorBody)
    )
)]
async fn delete_notification(
    session: Session,
    State(context): State<ServerContext>,
    Path(id): Path<i32>,
) -> ServerResult<Json<Message>> {
    context
        .app
        .notifications
        .delete(session.user_id(), id)
        .await?;

    Ok(Json(Message::new("Notificación eliminada")))
}

#[utoipa::path(
    delete,
    path = "/notificaciones/limpiar-leidas",
    tag = "notificaciones",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Message)
    )
)]
async fn delete_read(
    session: Session,
    State(context): State<ServerContext>,
) -> ServerResult<Json<Message>> {
    let removed = context
        .app
        .notifications
        .delete_read(session.user_id())
        .await?;

    Ok(Json(Message::new(format!(
        "{removed} notificaciones leídas eliminadas"
    ))))
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_notifications))
        .route("/contador", get(unread_count))
        .route("/leer-todas", patch(mark_all_read))
        .route("/limpiar-leidas", delete(delete_read))
        .route("/:id/leer", patch(mark_read))
        .route("/:id", delete(delete_notification))
}
