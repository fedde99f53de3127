use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use std::sync::Arc;
use thiserror::Error;

use crate::{
    Database, DatabaseError, NewNotification, NewReservation, Notifications, PrimaryKey,
    ReservationData,
};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// A reminder is only worth sending when the slot is still a while away
const REMINDER_THRESHOLD_IN_HOURS: i64 = 24;

/// Keeps track of reserved slots on facilities.
///
/// A slot is a (cancha, fecha, hora) triple and can be booked at most once.
/// The storage layer enforces that with a unique constraint, so two requests
/// racing for the same slot end with one reservation and one conflict.
pub struct Bookings<Db> {
    db: Arc<Db>,
    notifications: Notifications<Db>,
}

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Todos los campos son obligatorios")]
    MissingFields,
    #[error("La fecha debe tener el formato YYYY-MM-DD")]
    InvalidDate,
    #[error("La hora debe tener el formato HH:MM")]
    InvalidTime,
    /// The slot is taken, or something else went wrong with the database
    #[error(transparent)]
    Db(DatabaseError),
}

impl<Db> Bookings<Db>
where
    Db: Database,
{
    pub fn new(db: &Arc<Db>, notifications: &Notifications<Db>) -> Self {
        Self {
            db: db.clone(),
            notifications: notifications.clone(),
        }
    }

    /// Books a slot for a user, notifying them of the new reservation
    pub async fn create(
        &self,
        new_reservation: NewReservation,
    ) -> Result<ReservationData, BookingError> {
        if new_reservation.nombre.trim().is_empty()
            || new_reservation.email.trim().is_empty()
            || new_reservation.cancha.trim().is_empty()
        {
            return Err(BookingError::MissingFields);
        }

        let date = NaiveDate::parse_from_str(&new_reservation.fecha, DATE_FORMAT)
            .map_err(|_| BookingError::InvalidDate)?;

        let time = NaiveTime::parse_from_str(&new_reservation.hora, TIME_FORMAT)
            .map_err(|_| BookingError::InvalidTime)?;

        let reservation = self
            .db
            .create_reservation(new_reservation)
            .await
            .map_err(BookingError::Db)?;

        self.notifications
            .emit(NewNotification::booking_created(&reservation))
            .await;

        let starts_at = NaiveDateTime::new(date, time);
        let hours_away = starts_at - Local::now().naive_local();

        if hours_away > Duration::hours(REMINDER_THRESHOLD_IN_HOURS) {
            self.notifications
                .emit(NewNotification::booking_reminder(&reservation))
                .await;
        }

        Ok(reservation)
    }

    /// Returns all of a user's reservations, newest first
    pub async fn list(&self, user_id: PrimaryKey) -> Result<Vec<ReservationData>, DatabaseError> {
        self.db.reservations_by_user(user_id).await
    }

    /// Cancels a reservation. Only the owner can do this; anyone else's
    /// attempt is indistinguishable from the reservation not existing.
    pub async fn cancel(
        &self,
        user_id: PrimaryKey,
        reservation_id: PrimaryKey,
    ) -> Result<ReservationData, DatabaseError> {
        let reservation = self.db.delete_reservation(user_id, reservation_id).await?;

        self.notifications
            .emit(NewNotification::booking_cancelled(&reservation))
            .await;

        Ok(reservation)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::MemoryDatabase;

    fn setup() -> (Bookings<MemoryDatabase>, Notifications<MemoryDatabase>) {
        let db = Arc::new(MemoryDatabase::new());
        let notifications = Notifications::new(&db);
        let bookings = Bookings::new(&db, &notifications);

        (bookings, notifications)
    }

    fn reservation(user_id: PrimaryKey, fecha: &str, hora: &str) -> NewReservation {
        NewReservation {
            user_id,
            nombre: "Ana".to_string(),
            email: "ana@x.com".to_string(),
            telefono: "300123".to_string(),
            cancha: "futbol5".to_string(),
            fecha: fecha.to_string(),
            hora: hora.to_string(),
        }
    }

    /// A date far enough ahead that a reminder is always emitted
    fn far_future_date() -> String {
        (Local::now() + Duration::days(30)).format("%Y-%m-%d").to_string()
    }

    #[tokio::test]
    async fn a_slot_can_only_be_booked_once() {
        let (bookings, _) = setup();
        let fecha = far_future_date();

        bookings.create(reservation(1, &fecha, "18:00")).await.unwrap();

        // Even by a different user
        let taken = bookings.create(reservation(2, &fecha, "18:00")).await;
        assert!(matches!(
            taken,
            Err(BookingError::Db(DatabaseError::Conflict { .. }))
        ));

        // A different hour on the same day is fine
        bookings.create(reservation(2, &fecha, "19:00")).await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_requests_for_a_slot_book_it_once() {
        let (bookings, _) = setup();
        let bookings = Arc::new(bookings);
        let fecha = far_future_date();

        let mut handles = vec![];

        for user_id in 1..=8 {
            let bookings = bookings.clone();
            let fecha = fecha.clone();

            handles.push(tokio::spawn(async move {
                bookings.create(reservation(user_id, &fecha, "18:00")).await
            }));
        }

        let mut successes = 0;
        let mut conflicts = 0;

        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(BookingError::Db(DatabaseError::Conflict { .. })) => conflicts += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(conflicts, 7);
    }

    #[tokio::test]
    async fn create_validates_fields() {
        let (bookings, _) = setup();

        let mut blank = reservation(1, "2030-01-10", "18:00");
        blank.cancha = " ".to_string();
        assert!(matches!(
            bookings.create(blank).await,
            Err(BookingError::MissingFields)
        ));

        let bad_date = reservation(1, "10/01/2030", "18:00");
        assert!(matches!(
            bookings.create(bad_date).await,
            Err(BookingError::InvalidDate)
        ));

        let bad_time = reservation(1, "2030-01-10", "6pm");
        assert!(matches!(
            bookings.create(bad_time).await,
            Err(BookingError::InvalidTime)
        ));
    }

    #[tokio::test]
    async fn list_returns_newest_first_and_only_owned() {
        let (bookings, _) = setup();
        let fecha = far_future_date();

        let first = bookings.create(reservation(1, &fecha, "10:00")).await.unwrap();
        let second = bookings.create(reservation(1, &fecha, "11:00")).await.unwrap();
        bookings.create(reservation(2, &fecha, "12:00")).await.unwrap();

        let list = bookings.list(1).await.unwrap();
        assert_eq!(
            list.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![second.id, first.id]
        );
    }

    #[tokio::test]
    async fn cancelling_is_scoped_to_the_owner() {
        let (bookings, _) = setup();
        let fecha = far_future_date();

        let created = bookings.create(reservation(1, &fecha, "18:00")).await.unwrap();

        let foreign = bookings.cancel(2, created.id).await;
        assert!(matches!(foreign, Err(DatabaseError::NotFound { .. })));

        bookings.cancel(1, created.id).await.unwrap();
        assert!(bookings.list(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn booking_and_cancelling_notify_the_owner() {
        let (bookings, notifications) = setup();
        let fecha = far_future_date();

        let created = bookings.create(reservation(1, &fecha, "18:00")).await.unwrap();
        bookings.cancel(1, created.id).await.unwrap();

        let page = notifications.list(1, false, 50, 0).await.unwrap();
        let tipos: Vec<_> = page.notifications.iter().map(|n| n.tipo.as_str()).collect();

        // Newest first: cancelacion, recordatorio (far future), reserva
        assert_eq!(tipos, vec!["cancelacion", "recordatorio", "reserva"]);
    }

    #[tokio::test]
    async fn near_term_bookings_get_no_reminder() {
        let (bookings, notifications) = setup();

        // A slot a couple of hours from now
        let soon = Local::now() + Duration::hours(2);
        let fecha = soon.format("%Y-%m-%d").to_string();
        let hora = soon.format("%H:%M").to_string();

        bookings.create(reservation(1, &fecha, &hora)).await.unwrap();

        let page = notifications.list(1, false, 50, 0).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.notifications[0].tipo, "reserva");
    }
}
