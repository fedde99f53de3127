use argon2::{
    password_hash::{Encoding, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::{
    Database, DatabaseError, NewNotification, NewUser, Notifications, PrimaryKey, UserData,
};

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

const MIN_PASSWORD_LENGTH: usize = 6;

/// Validates credentials and issues stateless bearer tokens.
///
/// Tokens are self-contained and signed, so verification needs no storage
/// round-trip and there is no server-side revocation. A "logout" is purely a
/// client-side affair, which means a token stays valid until it expires.
pub struct Auth<Db> {
    db: Arc<Db>,
    notifications: Notifications<Db>,
    argon: Argon2<'static>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_ttl: Duration,
}

pub struct AuthConfig {
    /// The secret the tokens are signed with
    pub secret: String,
    /// How long an issued token stays valid
    pub token_ttl: Duration,
}

/// The contents of a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// The id of the logged in user
    pub sub: PrimaryKey,
    /// The user's display name
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

/// A logged in user along with their freshly issued token
#[derive(Debug)]
pub struct AuthSession {
    pub user: UserData,
    pub token: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Todos los campos son obligatorios")]
    MissingFields,
    #[error("El correo electrónico no es válido")]
    InvalidEmail,
    #[error("La contraseña debe tener al menos 6 caracteres")]
    PasswordTooShort,
    #[error("Usuario no encontrado")]
    UserNotFound,
    /// The password is incorrect
    #[error("Contraseña incorrecta")]
    InvalidCredentials,
    /// The token is malformed, forged, or expired
    #[error("Token inválido o expirado")]
    InvalidToken,
    /// Something else went wrong with the database
    #[error(transparent)]
    Db(DatabaseError),
    #[error("HashError: {0}")]
    HashError(String),
}

#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub struct NewRegistration {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl<Db> Auth<Db>
where
    Db: Database,
{
    pub fn new(db: &Arc<Db>, notifications: &Notifications<Db>, config: AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact, no leeway
        validation.leeway = 0;

        Self {
            db: db.clone(),
            notifications: notifications.clone(),
            argon: Argon2::default(),
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            token_ttl: config.token_ttl,
        }
    }

    /// Creates an account, storing only a one-way hash of the password
    pub async fn register(&self, new_registration: NewRegistration) -> Result<UserData, AuthError> {
        let name = new_registration.name.trim();
        let email = new_registration.email.trim().to_lowercase();
        let password = new_registration.password.as_str();

        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields);
        }

        if !EMAIL_REGEX.is_match(&email) {
            return Err(AuthError::InvalidEmail);
        }

        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::PasswordTooShort);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hashed_password = self
            .argon
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        let user = self
            .db
            .create_user(NewUser {
                name: name.to_string(),
                email,
                password: hashed_password,
            })
            .await
            .map_err(AuthError::Db)?;

        self.notifications
            .emit(NewNotification::welcome(user.id, &user.name))
            .await;

        Ok(user)
    }

    /// Logs in a user, returning them along with a new token
    pub async fn login(&self, credentials: Credentials) -> Result<AuthSession, AuthError> {
        let email = credentials.email.trim().to_lowercase();

        let user = self.db.user_by_email(&email).await.map_err(|e| match e {
            DatabaseError::NotFound { .. } => AuthError::UserNotFound,
            err => AuthError::Db(err),
        })?;

        let stored_password = PasswordHash::parse(&user.password, Encoding::default())
            .map_err(|e| AuthError::HashError(e.to_string()))?;

        self.argon
            .verify_password(credentials.password.as_bytes(), &stored_password)
            .map_err(|_| AuthError::InvalidCredentials)?;

        let token = self.issue_token(user.id, &user.name)?;

        Ok(AuthSession { user, token })
    }

    /// Produces a signed token embedding the user's id and name
    pub fn issue_token(&self, user_id: PrimaryKey, name: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            name: name.to_string(),
            iat: now.timestamp(),
            exp: (now + self.token_ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::HashError(e.to_string()))
    }

    /// Checks a token's signature and expiry, returning its claims.
    ///
    /// This is pure and side-effect-free, and is the sole gate in front of
    /// every protected operation.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::MemoryDatabase;

    fn auth_with_ttl(ttl: Duration) -> Auth<MemoryDatabase> {
        let db = Arc::new(MemoryDatabase::new());
        let notifications = Notifications::new(&db);

        Auth::new(
            &db,
            &notifications,
            AuthConfig {
                secret: "test-secret".to_string(),
                token_ttl: ttl,
            },
        )
    }

    fn auth() -> Auth<MemoryDatabase> {
        auth_with_ttl(Duration::hours(24))
    }

    fn ana() -> NewRegistration {
        NewRegistration {
            name: "Ana".to_string(),
            email: "ana@x.com".to_string(),
            password: "secret1".to_string(),
        }
    }

    #[tokio::test]
    async fn register_validates_input() {
        let auth = auth();

        let missing = auth
            .register(NewRegistration {
                name: "  ".to_string(),
                ..ana()
            })
            .await;
        assert!(matches!(missing, Err(AuthError::MissingFields)));

        let bad_email = auth
            .register(NewRegistration {
                email: "not an email".to_string(),
                ..ana()
            })
            .await;
        assert!(matches!(bad_email, Err(AuthError::InvalidEmail)));

        let short = auth
            .register(NewRegistration {
                password: "abc".to_string(),
                ..ana()
            })
            .await;
        assert!(matches!(short, Err(AuthError::PasswordTooShort)));
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email_ignoring_case() {
        let auth = auth();

        auth.register(ana()).await.unwrap();

        let duplicate = auth
            .register(NewRegistration {
                email: "ANA@X.COM".to_string(),
                ..ana()
            })
            .await;

        assert!(matches!(
            duplicate,
            Err(AuthError::Db(DatabaseError::Conflict { .. }))
        ));
    }

    #[tokio::test]
    async fn register_stores_a_hash_and_emits_a_welcome() {
        let db = Arc::new(MemoryDatabase::new());
        let notifications = Notifications::new(&db);
        let auth = Auth::new(
            &db,
            &notifications,
            AuthConfig {
                secret: "test-secret".to_string(),
                token_ttl: Duration::hours(24),
            },
        );

        let user = auth.register(ana()).await.unwrap();
        assert_ne!(user.password, "secret1");

        let page = notifications.list(user.id, false, 50, 0).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.notifications[0].tipo, "sistema");
    }

    #[tokio::test]
    async fn login_and_token_roundtrip() {
        let auth = auth();
        let user = auth.register(ana()).await.unwrap();

        let session = auth
            .login(Credentials {
                email: "Ana@X.com".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap();

        let claims = auth.verify_token(&session.token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.name, "Ana");
    }

    #[tokio::test]
    async fn login_rejects_bad_credentials() {
        let auth = auth();
        auth.register(ana()).await.unwrap();

        let unknown = auth
            .login(Credentials {
                email: "nobody@x.com".to_string(),
                password: "secret1".to_string(),
            })
            .await;
        assert!(matches!(unknown, Err(AuthError::UserNotFound)));

        let wrong = auth
            .login(Credentials {
                email: "ana@x.com".to_string(),
                password: "wrong-password".to_string(),
            })
            .await;
        assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn tokens_are_valid_until_expiry_and_not_after() {
        let auth = auth_with_ttl(Duration::seconds(1));
        let token = auth.issue_token(1, "Ana").unwrap();

        // Before the deadline
        assert!(auth.verify_token(&token).is_ok());

        // After it. Verification has zero leeway, so one second past the
        // deadline is enough.
        tokio::time::sleep(std::time::Duration::from_secs(2)).await;
        assert!(matches!(
            auth.verify_token(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn garbage_tokens_are_rejected() {
        let auth = auth();

        assert!(matches!(
            auth.verify_token("not-a-token"),
            Err(AuthError::InvalidToken)
        ));

        // Signed with a different secret
        let other = auth_with_ttl(Duration::hours(24));
        let forged = {
            let db = Arc::new(MemoryDatabase::new());
            let notifications = Notifications::new(&db);
            let forger = Auth::new(
                &db,
                &notifications,
                AuthConfig {
                    secret: "other-secret".to_string(),
                    token_ttl: Duration::hours(24),
                },
            );
            forger.issue_token(1, "Ana").unwrap()
        };

        assert!(matches!(
            other.verify_token(&forged),
            Err(AuthError::InvalidToken)
        ));
    }
}
