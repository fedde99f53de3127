use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use canchas_app::{AuthError, BookingError, DatabaseError, TournamentError};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

pub type ServerResult<T> = Result<T, ServerError>;

/// The body of every error response
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum ServerError {
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),
    /// Bad credentials at login
    #[error("{0}")]
    BadCredentials(String),
    /// Missing, malformed, or expired token
    #[error("{0}")]
    Unauthorized(&'static str),
    /// Authenticated, but not permitted
    #[error("No tienes permiso para realizar esta acción")]
    Forbidden,
    #[error("Ya existe {resource} con {field} '{value}'")]
    Conflict {
        resource: &'static str,
        field: &'static str,
        value: String,
    },
    #[error("No existe {resource} con ese {identifier}")]
    NotFound {
        resource: &'static str,
        identifier: &'static str,
    },
    #[error("Error interno del servidor: {0}")]
    Unknown(String),
}

impl ServerError {
    fn as_status_code(&self) -> StatusCode {
        match self {
            // This API reports conflicts as 400, not 409
            Self::Validation(_) | Self::BadCredentials(_) | Self::Conflict { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };

        (self.as_status_code(), Json(body)).into_response()
    }
}

impl From<DatabaseError> for ServerError {
    fn from(value: DatabaseError) -> Self {
        match value {
            DatabaseError::NotFound {
                resource,
                identifier,
            } => Self::NotFound {
                resource,
                identifier,
            },
            DatabaseError::Conflict {
                resource,
                field,
                value,
            } => Self::Conflict {
                resource,
                field,
                value,
            },
            e => Self::Unknown(e.to_string()),
        }
    }
}

impl From<AuthError> for ServerError {
    fn from(value: AuthError) -> Self {
        match value {
            AuthError::MissingFields | AuthError::InvalidEmail | AuthError::PasswordTooShort => {
                Self::Validation(value.to_string())
            }
            AuthError::UserNotFound | AuthError::InvalidCredentials => {
                Self::BadCredentials(value.to_string())
            }
            AuthError::InvalidToken => Self::Unauthorized("Token inválido o expirado"),
            AuthError::Db(e) => e.into(),
            e => Self::Unknown(e.to_string()),
        }
    }
}

impl From<BookingError> for ServerError {
    fn from(value: BookingError) -> Self {
        match value {
            BookingError::MissingFields
            | BookingError::InvalidDate
            | BookingError::InvalidTime => Self::Validation(value.to_string()),
            BookingError::Db(e) => e.into(),
        }
    }
}

impl From<TournamentError> for ServerError {
    fn from(value: TournamentError) -> Self {
        match value {
            TournamentError::MissingFields
            | TournamentError::InvalidDates
            | TournamentError::InvalidCapacity
            | TournamentError::Full => Self::Validation(value.to_string()),
            TournamentError::NotCreator => Self::Forbidden,
            TournamentError::Db(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn domain_errors_map_to_the_right_status() {
        let cases: Vec<(ServerError, StatusCode)> = vec![
            (AuthError::MissingFields.into(), StatusCode::BAD_REQUEST),
            (AuthError::UserNotFound.into(), StatusCode::BAD_REQUEST),
            (AuthError::InvalidToken.into(), StatusCode::UNAUTHORIZED),
            (TournamentError::NotCreator.into(), StatusCode::FORBIDDEN),
            (TournamentError::Full.into(), StatusCode::BAD_REQUEST),
            (
                DatabaseError::Conflict {
                    resource: "reserva",
                    field: "horario",
                    value: "futbol5 2030-01-10 18:00".to_string(),
                }
                .into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                DatabaseError::NotFound {
                    resource: "reserva",
                    identifier: "id",
                }
                .into(),
                StatusCode::NOT_FOUND,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(error.as_status_code(), status, "{error}");
        }
    }
}
