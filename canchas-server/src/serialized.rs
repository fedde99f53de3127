//! All schemas that are exposed from endpoints are defined here
//! along with the conversions from the app's data types

use canchas_app::{
    AuthSession, NotificationData, NotificationPage, ReservationData, TeamData, TournamentData,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResult {
    pub token: String,
    pub name: String,
    pub id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyResult {
    pub ok: bool,
    pub name: String,
    pub id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: i32,
    pub nombre: String,
    pub email: String,
    pub telefono: String,
    pub cancha: String,
    pub fecha: String,
    pub hora: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: i32,
    pub nombre: String,
    pub fecha_inicio: NaiveDate,
    pub fecha_fin: NaiveDate,
    pub num_equipos: i32,
    pub costo: f64,
    pub ubicacion: String,
    pub descripcion: String,
    pub creador_id: i32,
    pub creador_nombre: String,
    pub equipos_inscritos: Vec<Team>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub nombre: String,
    pub capitan: String,
    pub telefono: String,
    pub email: String,
    pub fecha_inscripcion: DateTime<Utc>,
}

/// A tournament's roster as shown in the team list view
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamRoster {
    /// The tournament's name
    pub torneo: String,
    pub cupos_disponibles: i32,
    pub equipos: Vec<Team>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: i32,
    pub tipo: String,
    pub titulo: String,
    pub mensaje: String,
    pub leida: bool,
    pub reserva_id: Option<i32>,
    pub icono: String,
    pub prioridad: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationList {
    pub notificaciones: Vec<Notification>,
    pub total: i64,
    pub no_leidas: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCount {
    pub no_leidas: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Message {
    pub mensaje: String,
}

impl Message {
    pub fn new(mensaje: impl Into<String>) -> Self {
        Self {
            mensaje: mensaje.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedReservation {
    pub mensaje: String,
    pub reserva: Reservation,
}

/// A tournament along with the outcome message of the operation that
/// produced or modified it
#[derive(Debug, Serialize, ToSchema)]
pub struct TournamentResult {
    pub mensaje: String,
    pub torneo: Tournament,
}

impl TournamentResult {
    pub fn new(mensaje: impl Into<String>, tournament: &TournamentData) -> Self {
        Self {
            mensaje: mensaje.into(),
            torneo: tournament.to_serialized(),
        }
    }
}

/// Helper trait to convert any type into a serialized version
pub trait ToSerialized<T>
where
    T: Serialize,
{
    fn to_serialized(&self) -> T;
}

impl<I, O> ToSerialized<Vec<O>> for Vec<I>
where
    I: ToSerialized<O>,
    O: Serialize,
{
    fn to_serialized(&self) -> Vec<O> {
        self.iter().map(|x| x.to_serialized()).collect()
    }
}

impl ToSerialized<LoginResult> for AuthSession {
    fn to_serialized(&self) -> LoginResult {
        LoginResult {
            token: self.token.clone(),
            name: self.user.name.clone(),
            id: self.user.id,
        }
    }
}

impl ToSerialized<Reservation> for ReservationData {
    fn to_serialized(&self) -> Reservation {
        Reservation {
            id: self.id,
            nombre: self.nombre.clone(),
            email: self.email.clone(),
            telefono: self.telefono.clone(),
            cancha: self.cancha.clone(),
            fecha: self.fecha.clone(),
            hora: self.hora.clone(),
            created_at: self.created_at,
        }
    }
}

impl ToSerialized<Tournament> for TournamentData {
    fn to_serialized(&self) -> Tournament {
        Tournament {
            id: self.id,
            nombre: self.nombre.clone(),
            fecha_inicio: self.fecha_inicio,
            fecha_fin: self.fecha_fin,
            num_equipos: self.num_equipos,
            costo: self.costo,
            ubicacion: self.ubicacion.clone(),
            descripcion: self.descripcion.clone(),
            creador_id: self.creador_id,
            creador_nombre: self.creador_nombre.clone(),
            equipos_inscritos: self.teams.to_serialized(),
        }
    }
}

impl ToSerialized<TeamRoster> for TournamentData {
    fn to_serialized(&self) -> TeamRoster {
        TeamRoster {
            torneo: self.nombre.clone(),
            cupos_disponibles: self.available_spots(),
            equipos: self.teams.to_serialized(),
        }
    }
}

impl ToSerialized<Team> for TeamData {
    fn to_serialized(&self) -> Team {
        Team {
            nombre: self.nombre.clone(),
            capitan: self.capitan.clone(),
            telefono: self.telefono.clone(),
            email: self.email.clone(),
            fecha_inscripcion: self.fecha_inscripcion,
        }
    }
}

impl ToSerialized<Notification> for NotificationData {
    fn to_serialized(&self) -> Notification {
        Notification {
            id: self.id,
            tipo: self.tipo.clone(),
            titulo: self.titulo.clone(),
            mensaje: self.mensaje.clone(),
            leida: self.leida,
            reserva_id: self.reserva_id,
            icono: self.icono.clone(),
            prioridad: self.prioridad.clone(),
            created_at: self.created_at,
        }
    }
}

impl ToSerialized<NotificationList> for NotificationPage {
    fn to_serialized(&self) -> NotificationList {
        NotificationList {
            notificaciones: self.notifications.to_serialized(),
            total: self.total,
            no_leidas: self.unread,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn notifications_use_the_field_names_clients_expect() {
        let data = NotificationData {
            id: 7,
            user_id: 1,
            tipo: "reserva".to_string(),
            titulo: "Reserva confirmada".to_string(),
            mensaje: "Tu reserva fue registrada.".to_string(),
            leida: false,
            reserva_id: Some(3),
            icono: "📅".to_string(),
            prioridad: "media".to_string(),
            created_at: Utc::now(),
        };

        let serialized: Notification = data.to_serialized();
        let value = serde_json::to_value(&serialized).unwrap();

        assert_eq!(value["reservaId"], json!(3));
        assert_eq!(value["leida"], json!(false));
        assert!(value.get("userId").is_none());
        assert!(value.get("user_id").is_none());
    }

    #[test]
    fn tournaments_embed_their_teams() {
        let data = TournamentData {
            id: 1,
            nombre: "Copa".to_string(),
            fecha_inicio: NaiveDate::from_ymd_opt(2030, 3, 1).unwrap(),
            fecha_fin: NaiveDate::from_ymd_opt(2030, 3, 15).unwrap(),
            num_equipos: 8,
            costo: 50000.0,
            ubicacion: "Cancha Norte".to_string(),
            descripcion: String::new(),
            creador_id: 1,
            creador_nombre: "Ana".to_string(),
            created_at: Utc::now(),
            teams: vec![TeamData {
                id: 2,
                tournament_id: 1,
                nombre: "Los Rayos".to_string(),
                capitan: "Luis".to_string(),
                telefono: String::new(),
                email: "luis@x.com".to_string(),
                fecha_inscripcion: Utc::now(),
            }],
        };

        let serialized: Tournament = data.to_serialized();
        let value = serde_json::to_value(&serialized).unwrap();

        assert_eq!(value["fechaInicio"], json!("2030-03-01"));
        assert_eq!(value["equiposInscritos"][0]["nombre"], json!("Los Rayos"));
        assert_eq!(value["creadorId"], json!(1));
    }
}
