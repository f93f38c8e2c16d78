use std::time::Duration;

use game_core::{GameStore, StoreError};
use game_types::{Player, PlayerId};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Player id.
    pub sub: String,
    pub device_fingerprint: String,
    pub iat: i64,
    /// Session expiry, unix seconds.
    pub exp: i64,
}

/// A freshly issued session.
#[derive(Debug, Clone)]
pub struct Session {
    pub player: Player,
    pub token: String,
    /// Seconds until the token expires.
    pub expires_in: i64,
}

pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    session_ttl: Duration,
    dev_mode: bool,
}

impl AuthService {
    pub fn new(secret: &str, session_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            session_ttl,
            dev_mode: false,
        }
    }

    /// Also accepts a bare player UUID as a token.
    pub fn new_dev_mode(secret: &str, session_ttl: Duration) -> Self {
        Self {
            dev_mode: true,
            ..Self::new(secret, session_ttl)
        }
    }

    /// Finds or registers the player behind `device_fingerprint`, extends the
    /// session and signs a token for it.
    pub async fn authenticate<S: GameStore>(
        &self,
        store: &S,
        device_fingerprint: &str,
        username: &str,
    ) -> Result<Session, AuthError> {
        let device_fingerprint = device_fingerprint.trim();
        if device_fingerprint.is_empty() {
            return Err(AuthError::MissingFingerprint);
        }

        let mut player = store.upsert_player(device_fingerprint, username.trim()).await?;

        let now = chrono::Utc::now().timestamp();
        player.session_expires_at = now + self.session_ttl.as_secs() as i64;
        store
            .update_player_session(player.id, player.session_expires_at)
            .await?;

        let token = self.issue_token(&player, now)?;
        tracing::info!("Player {} authenticated", player.id);

        Ok(Session {
            expires_in: player.session_expires_at - now,
            player,
            token,
        })
    }

    pub fn issue_token(&self, player: &Player, issued_at: i64) -> Result<String, AuthError> {
        let claims = SessionClaims {
            sub: player.id.to_string(),
            device_fingerprint: player.device_fingerprint.clone(),
            iat: issued_at,
            exp: player.session_expires_at,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to sign session token: {:?}", e);
            AuthError::Signing
        })
    }

    pub fn validate_token(&self, token: &str) -> Result<PlayerId, AuthError> {
        if self.dev_mode {
            if let Ok(player_id) = Uuid::parse_str(token) {
                tracing::debug!("Accepting dev token for player {}", player_id);
                return Ok(player_id);
            }
        }

        let validation = Validation::new(Algorithm::HS256);
        let token_data =
            decode::<SessionClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => {
                        tracing::warn!("Session token rejected: {:?}", e);
                        AuthError::InvalidToken
                    }
                }
            })?;

        Uuid::parse_str(&token_data.claims.sub).map_err(|_| AuthError::InvalidToken)
    }

    /// Player id from an `Authorization` header value, with or without the
    /// `Bearer ` prefix.
    pub fn validate_header(&self, header: Option<&str>) -> Result<PlayerId, AuthError> {
        let header = header.ok_or(AuthError::MissingToken)?;
        let token = header.strip_prefix("Bearer ").unwrap_or(header);
        self.validate_token(token)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing token")]
    MissingToken,
    #[error("Missing device fingerprint")]
    MissingFingerprint,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Failed to sign token")]
    Signing,
    #[error(transparent)]
    Store(#[from] StoreError),
}
