//! App-session issuance

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use handoff_shared::constants::{TOKEN_TYPE_ACCESS, TOKEN_TYPE_REFRESH};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Token creation failed: {0}")]
    CreationError(String),
    #[error("Token validation failed: {0}")]
    ValidationError(String),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub sid: String,
    pub iat: i64,
    pub exp: i64,
    pub token_type: String,
}

/// The application's standard authenticated session, as issued to a client
/// after a pending session is consumed.
#[derive(Debug, Clone)]
pub struct AppSession {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct SessionService {
    secret: String,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

impl SessionService {
    pub fn new(secret: String, access_expiry: i64, refresh_expiry: i64) -> Self {
        Self {
            secret,
            access_token_expiry: access_expiry,
            refresh_token_expiry: refresh_expiry,
        }
    }

    /// Issue a fresh app session for a verified user.
    pub fn issue(&self, user_id: &Uuid) -> Result<AppSession, SessionError> {
        let session_id = Uuid::new_v4();
        let access_token =
            self.generate_token(user_id, &session_id, TOKEN_TYPE_ACCESS, self.access_token_expiry)?;
        let refresh_token = self.generate_token(
            user_id,
            &session_id,
            TOKEN_TYPE_REFRESH,
            self.refresh_token_expiry,
        )?;

        Ok(AppSession {
            session_id,
            user_id: *user_id,
            access_token,
            refresh_token,
            expires_at: Utc::now() + Duration::seconds(self.access_token_expiry),
        })
    }

    fn generate_token(
        &self,
        user_id: &Uuid,
        session_id: &Uuid,
        token_type: &str,
        expiry: i64,
    ) -> Result<String, SessionError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            sid: session_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(expiry)).timestamp(),
            token_type: token_type.to_string(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| SessionError::CreationError(e.to_string()))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, SessionError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| SessionError::ValidationError(e.to_string()))
    }
}
