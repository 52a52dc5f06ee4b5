use crate::error::AppResult;
use crate::models::{PreferenceFields, Profile, ProfileFields, UserAccount, VerificationRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Keyed record store behind the verification, account and profile services.
///
/// Every write is atomic per key. Writes that depend on a previous read are
/// conditional on that read still being current.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create or replace the record keyed by `record.email`.
    async fn upsert_verification(&self, record: &VerificationRecord) -> AppResult<()>;

    async fn find_verification(&self, email: &str) -> AppResult<Option<VerificationRecord>>;

    /// Counts one confirmation attempt against the code issued to `email`, and
    /// consumes it when `matched`. Applies only while the stored record still
    /// has `code_hash`, `seen_attempts` attempts, is unconsumed and unexpired
    /// at `now`. Returns whether it applied.
    async fn record_attempt(
        &self,
        email: &str,
        code_hash: &str,
        seen_attempts: i32,
        matched: bool,
        now: DateTime<Utc>,
    ) -> AppResult<bool>;

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<UserAccount>>;

    /// Insert `user` unless an account with the same email exists; returns the
    /// stored account either way.
    async fn create_user_if_absent(&self, user: &UserAccount) -> AppResult<UserAccount>;

    async fn find_profile(&self, user_id: Uuid) -> AppResult<Option<Profile>>;

    /// Insert an empty profile for `user_id` unless one exists.
    async fn create_profile_if_absent(&self, user_id: Uuid) -> AppResult<()>;

    /// Write the "about you" columns and mark the profile complete. Other
    /// columns are left as stored.
    async fn update_profile_fields(&self, user_id: Uuid, fields: &ProfileFields) -> AppResult<()>;

    /// Write the preference columns, mark them complete and set
    /// `onboarding_completed` from the stored `profile_completed`, all in one
    /// write. Returns the resulting `onboarding_completed`.
    async fn update_preference_fields(
        &self,
        user_id: Uuid,
        fields: &PreferenceFields,
    ) -> AppResult<bool>;
}

pub type SharedStore = Arc<dyn RecordStore>;
