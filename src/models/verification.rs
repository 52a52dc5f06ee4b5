use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stored state of the one-time code issued to an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub email: String,
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
    pub attempts: i32,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

impl VerificationRecord {
    pub fn issued(email: String, code_hash: String, now: DateTime<Utc>, ttl: chrono::Duration) -> Self {
        Self {
            email,
            code_hash,
            expires_at: now + ttl,
            attempts: 0,
            verified: false,
            created_at: now,
        }
    }

    /// A record is unusable at or after its expiry instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        !self.verified && !self.is_expired_at(now)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RequestVerificationRequest {
    #[schema(example = "jdoe@my.unt.edu")]
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyCodeRequest {
    #[schema(example = "jdoe@my.unt.edu")]
    pub email: String,
    #[schema(example = "482913")]
    pub code: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn expiry_is_exclusive() {
        let now = Utc::now();
        let record = VerificationRecord::issued("a@my.unt.edu".into(), "h".into(), now, Duration::minutes(10));
        assert!(!record.is_expired_at(now + Duration::minutes(9)));
        assert!(record.is_expired_at(record.expires_at));
        assert!(record.is_live_at(now));
        assert!(!record.is_live_at(record.expires_at));
    }
}
