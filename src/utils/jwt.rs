use crate::error::AppResult;
use crate::models::SessionCredential;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sessions are valid for seven days from minting.
pub const SESSION_TTL_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: String,
    pub email: String,
    /// Same instant as `exp`; kept for clients that read the payload.
    pub expires_at: DateTime<Utc>,
    pub iat: i64,
    pub exp: i64,
}

/// HS256 codec for the session cookie.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, Duration::days(SESSION_TTL_DAYS))
    }

    pub fn with_ttl(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Signs a new session for `user_id`. The returned credential carries the
    /// exact expiry written into the token.
    pub fn mint(&self, user_id: Uuid, email: &str) -> AppResult<(String, SessionCredential)> {
        let now = Utc::now();
        let exp = (now + self.ttl).timestamp();
        // exp has second precision, derive expiresAt from it so both agree
        let expires_at = DateTime::<Utc>::from_timestamp(exp, 0).unwrap_or(now + self.ttl);

        let claims = Claims {
            user_id: user_id.to_string(),
            email: email.to_string(),
            expires_at,
            iat: now.timestamp(),
            exp,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok((
            token,
            SessionCredential {
                user_id,
                email: email.to_string(),
                expires_at,
            },
        ))
    }

    /// Returns the session carried by `token`, or `None` when the token is
    /// malformed, signed with another key, expired or internally inconsistent.
    pub fn verify(&self, token: &str) -> Option<SessionCredential> {
        if token.is_empty() {
            return None;
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let claims = match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(data) => data.claims,
            Err(e) => {
                log::debug!("Rejected session token: {e}");
                return None;
            }
        };

        if claims.expires_at.timestamp() != claims.exp {
            log::warn!("Rejected session token with mismatched expiry claims");
            return None;
        }

        let user_id = match Uuid::parse_str(&claims.user_id) {
            Ok(id) => id,
            Err(_) => {
                log::warn!("Rejected session token with invalid user id");
                return None;
            }
        };

        Some(SessionCredential {
            user_id,
            email: claims.email,
            expires_at: claims.expires_at,
        })
    }
}
