//! Request schemas accepted by the endpoints, along with the extractor
//! that validates them

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Deserialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::errors::ServerError;

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterSchema {
    #[validate(length(max = 128))]
    pub name: String,
    #[validate(length(max = 254))]
    pub email: String,
    #[validate(length(max = 64))]
    pub password: String,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginSchema {
    #[validate(length(max = 254))]
    pub email: String,
    #[validate(length(max = 64))]
    pub password: String,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewReservationSchema {
    #[validate(length(max = 128))]
    pub nombre: String,
    #[validate(length(max = 254))]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 32))]
    pub telefono: String,
    #[validate(length(max = 64))]
    pub cancha: String,
    /// YYYY-MM-DD
    #[validate(length(max = 10))]
    pub fecha: String,
    /// HH:MM
    #[validate(length(max = 5))]
    pub hora: String,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewTournamentSchema {
    #[validate(length(max = 128))]
    pub nombre: String,
    /// YYYY-MM-DD
    pub fecha_inicio: String,
    /// YYYY-MM-DD
    pub fecha_fin: String,
    pub num_equipos: i32,
    pub costo: f64,
    #[validate(length(max = 128))]
    pub ubicacion: String,
    #[serde(default)]
    #[validate(length(max = 1024))]
    pub descripcion: String,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateTournamentSchema {
    #[validate(length(max = 128))]
    pub nombre: Option<String>,
    pub fecha_inicio: Option<String>,
    pub fecha_fin: Option<String>,
    pub num_equipos: Option<i32>,
    pub costo: Option<f64>,
    #[validate(length(max = 128))]
    pub ubicacion: Option<String>,
    #[validate(length(max = 1024))]
    pub descripcion: Option<String>,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewTeamSchema {
    #[validate(length(max = 128))]
    pub nombre: String,
    #[validate(length(max = 128))]
    pub capitan: String,
    #[serde(default)]
    #[validate(length(max = 32))]
    pub telefono: String,
    #[validate(length(max = 254))]
    pub email: String,
}

/// Query parameters of the notification listing
#[derive(Debug, Deserialize)]
pub struct NotificationListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    #[serde(default)]
    pub solo_no_leidas: bool,
}

fn default_limit() -> i64 {
    50
}

/// Parses a YYYY-MM-DD date from a request
pub fn parse_date(fecha: &str) -> Result<NaiveDate, ServerError> {
    NaiveDate::parse_from_str(fecha, "%Y-%m-%d")
        .map_err(|_| ServerError::Validation("La fecha debe tener el formato YYYY-MM-DD".to_string()))
}

pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let extracted_json: Json<T> = Json::from_request(req, state).await.map_err(|_| {
            ServerError::Validation("El cuerpo de la solicitud no es válido".to_string())
        })?;

        extracted_json.0.validate().map_err(|_| {
            ServerError::Validation("Los datos de la solicitud son inválidos".to_string())
        })?;

        Ok(Self(extracted_json.0))
    }
}
