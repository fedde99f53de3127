use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

mod data;
pub use data::*;

mod memory;
pub use memory::*;

mod pg;
pub use pg::*;

pub type Result<T> = std::result::Result<T, DatabaseError>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    /// An unknown or internal error happened with the database
    #[error(transparent)]
    Internal(Box<dyn std::error::Error + Send + Sync>),
    /// A resource already exists
    #[error("Ya existe {resource} con {field} '{value}'")]
    Conflict {
        /// The resource in question
        resource: &'static str,
        /// The field that is conflicting
        field: &'static str,
        /// The conflicting value
        value: String,
    },
    /// A resource in the database doesn't exist
    #[error("No existe {resource} con ese {identifier}")]
    NotFound {
        resource: &'static str,
        identifier: &'static str,
    },
}

/// Helper trait to reduce boilerplate
pub trait IntoDatabaseError {
    fn not_found_or(self, resource: &'static str, identifier: &'static str) -> DatabaseError;
    /// Translates a unique constraint violation into a conflict. The
    /// constraint is the enforcement point, so inserts racing past any
    /// pre-check still surface as the same conflict.
    fn conflict_on(
        self,
        constraint: &'static str,
        resource: &'static str,
        field: &'static str,
        value: &str,
    ) -> DatabaseError;
    fn any(self) -> DatabaseError;
}

/// Represents a type that can store and fetch canchas data
#[async_trait]
pub trait Database: Send + Sync + 'static {
    async fn user_by_id(&self, user_id: PrimaryKey) -> Result<UserData>;
    /// Expects a lower-cased email, since emails are stored lower-cased
    async fn user_by_email(&self, email: &str) -> Result<UserData>;
    async fn create_user(&self, new_user: NewUser) -> Result<UserData>;

    async fn create_reservation(&self, new_reservation: NewReservation) -> Result<ReservationData>;
    /// All reservations owned by a user, newest first
    async fn reservations_by_user(&self, user_id: PrimaryKey) -> Result<Vec<ReservationData>>;
    /// Deletes a reservation scoped to its owner, returning the deleted
    /// record. A reservation owned by someone else is reported as absent.
    async fn delete_reservation(
        &self,
        user_id: PrimaryKey,
        reservation_id: PrimaryKey,
    ) -> Result<ReservationData>;

    async fn create_tournament(&self, new_tournament: NewTournament) -> Result<TournamentData>;
    /// All tournaments, newest first
    async fn list_tournaments(&self) -> Result<Vec<TournamentData>>;
    async fn tournament_by_id(&self, tournament_id: PrimaryKey) -> Result<TournamentData>;
    /// Enrolls a team, returning the updated tournament
    async fn create_team(
        &self,
        tournament_id: PrimaryKey,
        new_team: NewTeam,
    ) -> Result<TournamentData>;
    async fn update_tournament(&self, updated: UpdatedTournament) -> Result<TournamentData>;
    async fn delete_tournament(&self, tournament_id: PrimaryKey) -> Result<()>;

    async fn create_notification(
        &self,
        new_notification: NewNotification,
    ) -> Result<NotificationData>;
    async fn notifications_by_user(
        &self,
        user_id: PrimaryKey,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<NotificationPage>;
    async fn unread_notification_count(&self, user_id: PrimaryKey) -> Result<i64>;
    async fn mark_notification_read(
        &self,
        user_id: PrimaryKey,
        notification_id: PrimaryKey,
    ) -> Result<()>;
    async fn mark_all_notifications_read(&self, user_id: PrimaryKey) -> Result<()>;
    async fn delete_notification(
        &self,
        user_id: PrimaryKey,
        notification_id: PrimaryKey,
    ) -> Result<()>;
    /// Deletes every read notification of a user, returning how many went away
    async fn delete_read_notifications(&self, user_id: PrimaryKey) -> Result<u64>;
}

#[derive(Debug)]
pub struct NewUser {
    pub name: String,
    /// Always stored lower-cased
    pub email: String,
    /// The argon2 hash, never the plain text
    pub password: String,
}

#[derive(Debug)]
pub struct NewReservation {
    /// The owner of the new reservation
    pub user_id: PrimaryKey,
    pub nombre: String,
    pub email: String,
    pub telefono: String,
    pub cancha: String,
    pub fecha: String,
    pub hora: String,
}

#[derive(Debug)]
pub struct NewTournament {
    pub nombre: String,
    pub fecha_inicio: NaiveDate,
    pub fecha_fin: NaiveDate,
    pub num_equipos: i32,
    pub costo: f64,
    pub ubicacion: String,
    pub descripcion: String,
    /// The creator of the new tournament
    pub creador_id: PrimaryKey,
    pub creador_nombre: String,
}

#[derive(Debug)]
pub struct UpdatedTournament {
    pub id: PrimaryKey,
    pub nombre: Option<String>,
    pub fecha_inicio: Option<NaiveDate>,
    pub fecha_fin: Option<NaiveDate>,
    pub num_equipos: Option<i32>,
    pub costo: Option<f64>,
    pub ubicacion: Option<String>,
    pub descripcion: Option<String>,
}

#[derive(Debug)]
pub struct NewTeam {
    pub nombre: String,
    pub capitan: String,
    pub telefono: String,
    pub email: String,
}

#[derive(Debug)]
pub struct NewNotification {
    pub user_id: PrimaryKey,
    pub tipo: String,
    pub titulo: String,
    pub mensaje: String,
    pub reserva_id: Option<PrimaryKey>,
    pub icono: String,
    pub prioridad: String,
}
