use log::warn;
use std::sync::Arc;

use crate::{
    Database, DatabaseError, NewNotification, NotificationPage, PrimaryKey, ReservationData,
};

/// The closed set of notification kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationType {
    /// A reservation was created
    Reservation,
    /// A reservation was cancelled
    Cancellation,
    /// An upcoming reservation is more than a day away
    Reminder,
    System,
    Promotion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reservation => "reserva",
            Self::Cancellation => "cancelacion",
            Self::Reminder => "recordatorio",
            Self::System => "sistema",
            Self::Promotion => "promocion",
        }
    }

    fn default_icon(&self) -> &'static str {
        match self {
            Self::Reservation => "📅",
            Self::Cancellation => "❌",
            Self::Reminder => "⏰",
            Self::System => "🔔",
            Self::Promotion => "🎉",
        }
    }

    fn default_priority(&self) -> Priority {
        match self {
            Self::Reminder => Priority::High,
            Self::Reservation | Self::Cancellation => Priority::Medium,
            Self::System | Self::Promotion => Priority::Low,
        }
    }
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "baja",
            Self::Medium => "media",
            Self::High => "alta",
        }
    }
}

impl NewNotification {
    fn of_type(
        tipo: NotificationType,
        user_id: PrimaryKey,
        titulo: impl Into<String>,
        mensaje: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            tipo: tipo.as_str().to_string(),
            titulo: titulo.into(),
            mensaje: mensaje.into(),
            reserva_id: None,
            icono: tipo.default_icon().to_string(),
            prioridad: tipo.default_priority().as_str().to_string(),
        }
    }

    pub fn welcome(user_id: PrimaryKey, name: &str) -> Self {
        Self::of_type(
            NotificationType::System,
            user_id,
            "¡Bienvenido!",
            format!("Hola {name}, tu cuenta fue creada exitosamente."),
        )
    }

    pub fn booking_created(reservation: &ReservationData) -> Self {
        let mut notification = Self::of_type(
            NotificationType::Reservation,
            reservation.user_id,
            "Reserva confirmada",
            format!(
                "Tu reserva de {} para el {} a las {} fue registrada.",
                reservation.cancha, reservation.fecha, reservation.hora
            ),
        );

        notification.reserva_id = Some(reservation.id);
        notification
    }

    pub fn booking_reminder(reservation: &ReservationData) -> Self {
        let mut notification = Self::of_type(
            NotificationType::Reminder,
            reservation.user_id,
            "Recordatorio de reserva",
            format!(
                "No olvides tu reserva de {} el {} a las {}.",
                reservation.cancha, reservation.fecha, reservation.hora
            ),
        );

        notification.reserva_id = Some(reservation.id);
        notification
    }

    pub fn booking_cancelled(reservation: &ReservationData) -> Self {
        Self::of_type(
            NotificationType::Cancellation,
            reservation.user_id,
            "Reserva cancelada",
            format!(
                "Tu reserva de {} del {} a las {} fue cancelada.",
                reservation.cancha, reservation.fecha, reservation.hora
            ),
        )
    }

    pub fn tournament_created(user_id: PrimaryKey, nombre: &str) -> Self {
        Self::of_type(
            NotificationType::System,
            user_id,
            "Torneo creado",
            format!("Tu torneo \"{nombre}\" fue publicado."),
        )
    }
}

/// Records and exposes user-visible notifications
pub struct Notifications<Db> {
    db: Arc<Db>,
}

impl<Db> Clone for Notifications<Db> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

impl<Db> Notifications<Db>
where
    Db: Database,
{
    pub fn new(db: &Arc<Db>) -> Self {
        Self { db: db.clone() }
    }

    /// Records a notification, best-effort. A storage failure here is logged
    /// and swallowed so it can never abort the operation that triggered it.
    pub async fn emit(&self, new_notification: NewNotification) {
        if let Err(e) = self.db.create_notification(new_notification).await {
            warn!("A notification could not be recorded: {e}");
        }
    }

    /// Returns a page of the user's notifications, newest first, along with
    /// total and unread counts
    pub async fn list(
        &self,
        user_id: PrimaryKey,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<NotificationPage, DatabaseError> {
        self.db
            .notifications_by_user(user_id, unread_only, limit, offset)
            .await
    }

    pub async fn unread_count(&self, user_id: PrimaryKey) -> Result<i64, DatabaseError> {
        self.db.unread_notification_count(user_id).await
    }

    pub async fn mark_read(
        &self,
        user_id: PrimaryKey,
        notification_id: PrimaryKey,
    ) -> Result<(), DatabaseError> {
        self.db
            .mark_notification_read(user_id, notification_id)
            .await
    }

    pub async fn mark_all_read(&self, user_id: PrimaryKey) -> Result<(), DatabaseError> {
        self.db.mark_all_notifications_read(user_id).await
    }

    pub async fn delete(
        &self,
        user_id: PrimaryKey,
        notification_id: PrimaryKey,
    ) -> Result<(), DatabaseError> {
        self.db.delete_notification(user_id, notification_id).await
    }

    pub async fn delete_read(&self, user_id: PrimaryKey) -> Result<u64, DatabaseError> {
        self.db.delete_read_notifications(user_id).await
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::MemoryDatabase;

    fn notifications() -> Notifications<MemoryDatabase> {
        Notifications::new(&Arc::new(MemoryDatabase::new()))
    }

    #[tokio::test]
    async fn list_is_scoped_and_counts() {
        let notifications = notifications();

        notifications.emit(NewNotification::welcome(1, "Ana")).await;
        notifications
            .emit(NewNotification::tournament_created(1, "Copa"))
            .await;
        notifications.emit(NewNotification::welcome(2, "Luis")).await;

        let page = notifications.list(1, false, 50, 0).await.unwrap();

        assert_eq!(page.total, 2);
        assert_eq!(page.unread, 2);
        assert!(page.notifications.iter().all(|n| n.user_id == 1));
        // Newest first
        assert_eq!(page.notifications[0].titulo, "Torneo creado");
    }

    #[tokio::test]
    async fn mark_read_is_scoped_to_the_owner() {
        let notifications = notifications();

        notifications.emit(NewNotification::welcome(1, "Ana")).await;
        let id = notifications.list(1, false, 50, 0).await.unwrap().notifications[0].id;

        // Another user operating on the same id sees nothing
        let result = notifications.mark_read(2, id).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));

        notifications.mark_read(1, id).await.unwrap();
        assert_eq!(notifications.unread_count(1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn delete_read_removes_only_read_ones() {
        let notifications = notifications();

        notifications.emit(NewNotification::welcome(1, "Ana")).await;
        notifications
            .emit(NewNotification::tournament_created(1, "Copa"))
            .await;

        notifications.mark_all_read(1).await.unwrap();
        notifications.emit(NewNotification::welcome(1, "Ana")).await;

        let removed = notifications.delete_read(1).await.unwrap();
        assert_eq!(removed, 2);

        let page = notifications.list(1, false, 50, 0).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.unread, 1);
    }

    #[tokio::test]
    async fn unread_filter_and_paging() {
        let notifications = notifications();

        for i in 0..5 {
            notifications
                .emit(NewNotification::tournament_created(1, &format!("Copa {i}")))
                .await;
        }

        let first = notifications.list(1, false, 50, 0).await.unwrap().notifications[0].id;
        notifications.mark_read(1, first).await.unwrap();

        let unread = notifications.list(1, true, 50, 0).await.unwrap();
        assert_eq!(unread.notifications.len(), 4);
        assert_eq!(unread.total, 5);
        assert_eq!(unread.unread, 4);

        let page = notifications.list(1, false, 2, 2).await.unwrap();
        assert_eq!(page.notifications.len(), 2);
    }
}
