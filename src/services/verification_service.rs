use crate::config::VerificationConfig;
use crate::database::SharedStore;
use crate::error::{AppError, AppResult};
use crate::external::SharedMailer;
use crate::models::VerificationRecord;
use crate::utils::*;
use chrono::{Duration, Utc};

const INVALID_EMAIL: &str = "Must use a valid UNT student email.";
const INVALID_CODE: &str = "Invalid or expired verification code.";

/// Issues and confirms the one-time codes that prove control of a student address.
#[derive(Clone)]
pub struct VerificationService {
    store: SharedStore,
    mailer: SharedMailer,
    hasher: CodeHasher,
    email_suffix: String,
    code_ttl: Duration,
    max_attempts: Option<i32>,
}

impl VerificationService {
    pub fn new(
        store: SharedStore,
        mailer: SharedMailer,
        hasher: CodeHasher,
        config: &VerificationConfig,
    ) -> Self {
        Self {
            store,
            mailer,
            hasher,
            email_suffix: config.email_suffix.clone(),
            code_ttl: Duration::minutes(config.code_ttl_minutes),
            max_attempts: config.max_attempts,
        }
    }

    fn validated_email(&self, email: &str) -> AppResult<String> {
        let email = normalize_email(email);
        if email.is_empty() || !is_student_email(&email, &self.email_suffix) {
            return Err(AppError::ValidationError(INVALID_EMAIL.to_string()));
        }
        Ok(email)
    }

    /// Stores a fresh code for `email` (replacing any earlier one) and mails it.
    /// Nothing is sent when the store write fails; a mail failure leaves the
    /// stored record in place.
    pub async fn issue_code(&self, email: &str) -> AppResult<()> {
        let email = self.validated_email(email)?;

        let code = generate_six_digit_code();
        let record = VerificationRecord::issued(
            email.clone(),
            self.hasher.digest(&code),
            Utc::now(),
            self.code_ttl,
        );

        self.store.upsert_verification(&record).await?;
        log::info!(
            "Verification code issued for {}, expires at {}",
            email,
            record.expires_at
        );

        self.mailer.send_code(&email, &code).await?;
        Ok(())
    }

    /// Consumes the code issued to `email`. Returns the normalized address.
    pub async fn confirm_code(&self, email: &str, code: &str) -> AppResult<String> {
        let email = self.validated_email(email)?;
        let code = code.trim();
        if !is_six_digit_code(code) {
            return Err(AppError::ValidationError(
                "Verification code must be 6 digits.".to_string(),
            ));
        }

        let record = self
            .store
            .find_verification(&email)
            .await?
            .ok_or_else(|| AppError::ValidationError(INVALID_CODE.to_string()))?;

        let now = Utc::now();
        if record.verified || record.is_expired_at(now) {
            return Err(AppError::ValidationError(INVALID_CODE.to_string()));
        }

        if let Some(max) = self.max_attempts
            && record.attempts >= max
        {
            log::warn!("Verification locked for {} after {} attempts", email, record.attempts);
            return Err(AppError::ValidationError(
                "Too many attempts. Request a new code.".to_string(),
            ));
        }

        let matched = self.hasher.matches(code, &record.code_hash);
        let applied = self
            .store
            .record_attempt(&email, &record.code_hash, record.attempts, matched, now)
            .await?;
        if !applied {
            // reissued, consumed or counted by a concurrent request since the read
            log::warn!("Verification record for {} changed during confirmation", email);
            return Err(AppError::ValidationError(INVALID_CODE.to_string()));
        }

        if !matched {
            log::warn!(
                "Wrong verification code for {} (attempt {})",
                email,
                record.attempts + 1
            );
            return Err(AppError::ValidationError(INVALID_CODE.to_string()));
        }

        log::info!("Email verified: {}", email);
        Ok(email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::testing::YieldingStore;
    use crate::database::{MemoryStore, RecordStore};
    use crate::external::testing::RecordingMailer;
    use futures_util::future::join_all;
    use std::sync::Arc;

    struct Fixture {
        store: Arc<MemoryStore>,
        mailer: Arc<RecordingMailer>,
        service: VerificationService,
    }

    fn fixture_with(config: VerificationConfig, mailer: RecordingMailer) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let mailer = Arc::new(mailer);
        let service = VerificationService::new(
            store.clone(),
            mailer.clone(),
            CodeHasher::new("test-secret"),
            &config,
        );
        Fixture {
            store,
            mailer,
            service,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(VerificationConfig::default(), RecordingMailer::default())
    }

    fn interleaving_fixture(config: VerificationConfig) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let mailer = Arc::new(RecordingMailer::default());
        let service = VerificationService::new(
            Arc::new(YieldingStore(store.clone())),
            mailer.clone(),
            CodeHasher::new("test-secret"),
            &config,
        );
        Fixture {
            store,
            mailer,
            service,
        }
    }

    fn wrong_code(code: &str) -> &'static str {
        if code == "999999" { "100000" } else { "999999" }
    }

    #[tokio::test]
    async fn issue_code_stores_fresh_record_and_mails_six_digits() {
        let f = fixture();
        let before = Utc::now();

        f.service.issue_code("jdoe@my.unt.edu").await.unwrap();

        let record = f
            .store
            .find_verification("jdoe@my.unt.edu")
            .await
            .unwrap()
            .expect("record stored");
        assert_eq!(record.attempts, 0);
        assert!(!record.verified);
        let ttl = record.expires_at - before;
        assert!(ttl >= Duration::minutes(10) && ttl < Duration::minutes(10) + Duration::seconds(5));

        let sent = f.mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "jdoe@my.unt.edu");
        assert!(is_six_digit_code(&sent[0].1));
        assert_ne!(record.code_hash, sent[0].1);
    }

    #[tokio::test]
    async fn non_student_email_is_rejected_without_side_effects() {
        let f = fixture();
        for email in ["jdoe@unt.edu", "jdoe@gmail.com", "", "   "] {
            let err = f.service.issue_code(email).await.unwrap_err();
            assert!(matches!(err, AppError::ValidationError(_)));
        }
        assert_eq!(f.store.verification_count().await, 0);
        assert!(f.mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn issuing_twice_keeps_one_record_with_latest_code() {
        let f = fixture();
        f.service.issue_code("jdoe@my.unt.edu").await.unwrap();
        f.service.issue_code("  JDOE@my.unt.edu ").await.unwrap();

        assert_eq!(f.store.verification_count().await, 1);
        let latest = f.mailer.last_code_for("jdoe@my.unt.edu").unwrap();
        let record = f.store.find_verification("jdoe@my.unt.edu").await.unwrap().unwrap();
        assert_eq!(record.code_hash, CodeHasher::new("test-secret").digest(&latest));
    }

    #[tokio::test]
    async fn mail_failure_is_surfaced_and_record_kept() {
        let f = fixture_with(VerificationConfig::default(), RecordingMailer::failing());

        let err = f.service.issue_code("jdoe@my.unt.edu").await.unwrap_err();
        assert!(matches!(err, AppError::ExternalApiError(_)));
        assert_eq!(f.store.verification_count().await, 1);
    }

    #[tokio::test]
    async fn correct_code_confirms_once() {
        let f = fixture();
        f.service.issue_code("jdoe@my.unt.edu").await.unwrap();
        let code = f.mailer.last_code_for("jdoe@my.unt.edu").unwrap();

        let email = f.service.confirm_code("JDoe@my.unt.edu", &code).await.unwrap();
        assert_eq!(email, "jdoe@my.unt.edu");

        let record = f.store.find_verification(&email).await.unwrap().unwrap();
        assert!(record.verified);
        assert_eq!(record.attempts, 1);

        // consumed codes cannot be replayed
        assert!(f.service.confirm_code(&email, &code).await.is_err());
    }

    #[tokio::test]
    async fn wrong_code_counts_an_attempt() {
        let f = fixture();
        f.service.issue_code("jdoe@my.unt.edu").await.unwrap();
        let code = f.mailer.last_code_for("jdoe@my.unt.edu").unwrap();
        let wrong = if code == "999999" { "100000" } else { "999999" };

        let err = f.service.confirm_code("jdoe@my.unt.edu", wrong).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let record = f.store.find_verification("jdoe@my.unt.edu").await.unwrap().unwrap();
        assert_eq!(record.attempts, 1);
        assert!(!record.verified);
    }

    #[tokio::test]
    async fn expired_code_is_rejected() {
        let f = fixture();
        let hasher = CodeHasher::new("test-secret");
        let record = VerificationRecord::issued(
            "jdoe@my.unt.edu".into(),
            hasher.digest("123456"),
            Utc::now() - Duration::minutes(11),
            Duration::minutes(10),
        );
        f.store.upsert_verification(&record).await.unwrap();

        assert!(f.service.confirm_code("jdoe@my.unt.edu", "123456").await.is_err());
    }

    #[tokio::test]
    async fn unknown_email_and_malformed_code_are_rejected() {
        let f = fixture();
        assert!(f.service.confirm_code("jdoe@my.unt.edu", "123456").await.is_err());

        f.service.issue_code("jdoe@my.unt.edu").await.unwrap();
        for code in ["12345", "abcdef", "1234567"] {
            let err = f.service.confirm_code("jdoe@my.unt.edu", code).await.unwrap_err();
            assert!(matches!(err, AppError::ValidationError(_)));
        }
        let record = f.store.find_verification("jdoe@my.unt.edu").await.unwrap().unwrap();
        assert_eq!(record.attempts, 0);
    }

    #[tokio::test]
    async fn lockout_applies_only_when_configured() {
        let config = VerificationConfig {
            max_attempts: Some(2),
            ..Default::default()
        };
        let f = fixture_with(config, RecordingMailer::default());
        f.service.issue_code("jdoe@my.unt.edu").await.unwrap();
        let code = f.mailer.last_code_for("jdoe@my.unt.edu").unwrap();
        let wrong = if code == "999999" { "100000" } else { "999999" };

        assert!(f.service.confirm_code("jdoe@my.unt.edu", wrong).await.is_err());
        assert!(f.service.confirm_code("jdoe@my.unt.edu", wrong).await.is_err());
        // locked: even the right code is refused until a new one is issued
        assert!(f.service.confirm_code("jdoe@my.unt.edu", &code).await.is_err());

        f.service.issue_code("jdoe@my.unt.edu").await.unwrap();
        let fresh = f.mailer.last_code_for("jdoe@my.unt.edu").unwrap();
        assert!(f.service.confirm_code("jdoe@my.unt.edu", &fresh).await.is_ok());
    }

    #[tokio::test]
    async fn codes_do_not_survive_a_secret_rotation() {
        let f = fixture();
        f.service.issue_code("jdoe@my.unt.edu").await.unwrap();
        let code = f.mailer.last_code_for("jdoe@my.unt.edu").unwrap();

        let rotated = VerificationService::new(
            f.store.clone(),
            f.mailer.clone(),
            CodeHasher::new("rotated-secret"),
            &VerificationConfig::default(),
        );
        assert!(rotated.confirm_code("jdoe@my.unt.edu", &code).await.is_err());

        rotated.issue_code("jdoe@my.unt.edu").await.unwrap();
        let fresh = f.mailer.last_code_for("jdoe@my.unt.edu").unwrap();
        assert!(rotated.confirm_code("jdoe@my.unt.edu", &fresh).await.is_ok());
    }

    #[tokio::test]
    async fn confirm_racing_a_reissue_does_not_revive_the_old_code() {
        let f = interleaving_fixture(VerificationConfig::default());
        f.service.issue_code("jdoe@my.unt.edu").await.unwrap();
        let old = f.mailer.last_code_for("jdoe@my.unt.edu").unwrap();

        let (confirmed, issued) = tokio::join!(
            f.service.confirm_code("jdoe@my.unt.edu", wrong_code(&old)),
            f.service.issue_code("jdoe@my.unt.edu"),
        );
        assert!(confirmed.is_err());
        issued.unwrap();

        let fresh = f.mailer.last_code_for("jdoe@my.unt.edu").unwrap();
        let record = f.store.find_verification("jdoe@my.unt.edu").await.unwrap().unwrap();
        assert_eq!(record.code_hash, CodeHasher::new("test-secret").digest(&fresh));
        if old != fresh {
            assert_eq!(record.attempts, 0);
            assert!(f.service.confirm_code("jdoe@my.unt.edu", &old).await.is_err());
        }
        assert!(f.service.confirm_code("jdoe@my.unt.edu", &fresh).await.is_ok());
    }

    #[tokio::test]
    async fn concurrent_confirms_consume_the_code_once() {
        let f = interleaving_fixture(VerificationConfig::default());
        f.service.issue_code("jdoe@my.unt.edu").await.unwrap();
        let code = f.mailer.last_code_for("jdoe@my.unt.edu").unwrap();

        let (first, second) = tokio::join!(
            f.service.confirm_code("jdoe@my.unt.edu", &code),
            f.service.confirm_code("jdoe@my.unt.edu", &code),
        );
        assert_eq!([first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count(), 1);

        let record = f.store.find_verification("jdoe@my.unt.edu").await.unwrap().unwrap();
        assert!(record.verified);
        assert_eq!(record.attempts, 1);
    }

    #[tokio::test]
    async fn parallel_guesses_stay_within_the_lockout() {
        let config = VerificationConfig {
            max_attempts: Some(3),
            ..Default::default()
        };
        let f = interleaving_fixture(config);
        f.service.issue_code("jdoe@my.unt.edu").await.unwrap();
        let code = f.mailer.last_code_for("jdoe@my.unt.edu").unwrap();
        let wrong = wrong_code(&code);

        let results = join_all(
            (0..20).map(|_| f.service.confirm_code("jdoe@my.unt.edu", wrong)),
        )
        .await;
        assert!(results.iter().all(Result::is_err));

        let record = f.store.find_verification("jdoe@my.unt.edu").await.unwrap().unwrap();
        assert!(record.attempts <= 3, "{} attempts counted", record.attempts);
        assert!(!record.verified);

        // sequential guesses still run into the lockout
        for _ in 0..3 {
            let _ = f.service.confirm_code("jdoe@my.unt.edu", wrong).await;
        }
        let record = f.store.find_verification("jdoe@my.unt.edu").await.unwrap().unwrap();
        assert_eq!(record.attempts, 3);
        assert!(f.service.confirm_code("jdoe@my.unt.edu", &code).await.is_err());
    }

    #[tokio::test]
    async fn concurrent_issues_leave_exactly_one_usable_code() {
        let f = interleaving_fixture(VerificationConfig::default());

        let (first, second) = tokio::join!(
            f.service.issue_code("jdoe@my.unt.edu"),
            f.service.issue_code("jdoe@my.unt.edu"),
        );
        first.unwrap();
        second.unwrap();
        assert_eq!(f.store.verification_count().await, 1);

        let sent = f.mailer.sent();
        assert_eq!(sent.len(), 2);
        if sent[0].1 == sent[1].1 {
            assert!(f.service.confirm_code("jdoe@my.unt.edu", &sent[0].1).await.is_ok());
            return;
        }
        let mut confirmed = 0;
        for (_, code) in &sent {
            if f.service.confirm_code("jdoe@my.unt.edu", code).await.is_ok() {
                confirmed += 1;
            }
        }
        assert_eq!(confirmed, 1);
    }
}
