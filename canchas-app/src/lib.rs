mod auth;
mod bookings;
mod db;
mod notifications;
mod tournaments;

use std::sync::Arc;

pub use auth::*;
pub use bookings::*;
pub use db::*;
pub use notifications::*;
pub use tournaments::*;

/// The canchas application, facilitating accounts, reservations, tournaments,
/// and notifications on top of a pluggable storage backend.
pub struct App<Db> {
    pub auth: Auth<Db>,
    pub bookings: Bookings<Db>,
    pub tournaments: Tournaments<Db>,
    pub notifications: Notifications<Db>,
}

impl<Db> App<Db>
where
    Db: Database,
{
    pub fn new(database: Db, auth_config: AuthConfig) -> Self {
        let database = Arc::new(database);
        let notifications = Notifications::new(&database);

        Self {
            auth: Auth::new(&database, &notifications, auth_config),
            bookings: Bookings::new(&database, &notifications),
            tournaments: Tournaments::new(&database, &notifications),
            notifications,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Duration;

    fn app() -> App<MemoryDatabase> {
        App::new(
            MemoryDatabase::new(),
            AuthConfig {
                secret: "test-secret".to_string(),
                token_ttl: Duration::hours(24),
            },
        )
    }

    /// The whole booking lifecycle: register, log in, book, collide, list,
    /// cancel, and end up with a cancellation notification.
    #[tokio::test]
    async fn booking_lifecycle() {
        let app = app();

        app.auth
            .register(NewRegistration {
                name: "Ana".to_string(),
                email: "ana@x.com".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap();

        let session = app
            .auth
            .login(Credentials {
                email: "ana@x.com".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap();

        let claims = app.auth.verify_token(&session.token).unwrap();

        let new_reservation = |hora: &str| NewReservation {
            user_id: claims.sub,
            nombre: "Ana".to_string(),
            email: "ana@x.com".to_string(),
            telefono: String::new(),
            cancha: "futbol5".to_string(),
            fecha: "2030-01-10".to_string(),
            hora: hora.to_string(),
        };

        let reservation = app.bookings.create(new_reservation("18:00")).await.unwrap();

        let conflict = app.bookings.create(new_reservation("18:00")).await;
        assert!(matches!(
            conflict,
            Err(BookingError::Db(DatabaseError::Conflict { .. }))
        ));

        assert_eq!(app.bookings.list(claims.sub).await.unwrap().len(), 1);

        app.bookings.cancel(claims.sub, reservation.id).await.unwrap();
        assert!(app.bookings.list(claims.sub).await.unwrap().is_empty());

        let page = app
            .notifications
            .list(claims.sub, false, 50, 0)
            .await
            .unwrap();

        assert!(page
            .notifications
            .iter()
            .any(|n| n.tipo == "cancelacion"));
    }
}
