use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// The type used for primary keys in the database.
pub type PrimaryKey = i32;

/// A canchas account
#[derive(Debug, Clone, FromRow)]
pub struct UserData {
    pub id: PrimaryKey,
    pub name: String,
    /// Stored lower-cased, unique
    pub email: String,
    /// The argon2 hash of the password
    pub password: String,
    pub created_at: DateTime<Utc>,
}

/// A booked slot on a facility
#[derive(Debug, Clone, FromRow)]
pub struct ReservationData {
    pub id: PrimaryKey,
    /// The user that made the reservation
    pub user_id: PrimaryKey,
    pub nombre: String,
    pub email: String,
    pub telefono: String,
    /// The facility being booked
    pub cancha: String,
    /// YYYY-MM-DD
    pub fecha: String,
    /// HH:MM
    pub hora: String,
    pub created_at: DateTime<Utc>,
}

/// A tournament with its enrolled teams
#[derive(Debug, Clone)]
pub struct TournamentData {
    pub id: PrimaryKey,
    pub nombre: String,
    pub fecha_inicio: NaiveDate,
    pub fecha_fin: NaiveDate,
    /// How many teams can enroll
    pub num_equipos: i32,
    pub costo: f64,
    pub ubicacion: String,
    pub descripcion: String,
    pub creador_id: PrimaryKey,
    pub creador_nombre: String,
    pub created_at: DateTime<Utc>,
    /// Enrollment order is preserved
    pub teams: Vec<TeamData>,
}

impl TournamentData {
    pub fn available_spots(&self) -> i32 {
        self.num_equipos - self.teams.len() as i32
    }
}

/// A team enrolled in a tournament
#[derive(Debug, Clone, FromRow)]
pub struct TeamData {
    pub id: PrimaryKey,
    pub tournament_id: PrimaryKey,
    pub nombre: String,
    pub capitan: String,
    pub telefono: String,
    pub email: String,
    pub fecha_inscripcion: DateTime<Utc>,
}

/// A user-visible event produced as a side effect of another operation
#[derive(Debug, Clone, FromRow)]
pub struct NotificationData {
    pub id: PrimaryKey,
    pub user_id: PrimaryKey,
    pub tipo: String,
    pub titulo: String,
    pub mensaje: String,
    pub leida: bool,
    pub reserva_id: Option<PrimaryKey>,
    pub icono: String,
    pub prioridad: String,
    pub created_at: DateTime<Utc>,
}

/// A page of notifications along with the user's counts
#[derive(Debug, Clone)]
pub struct NotificationPage {
    pub notifications: Vec<NotificationData>,
    /// How many notifications the user has in total
    pub total: i64,
    /// How many of them are unread
    pub unread: i64,
}
