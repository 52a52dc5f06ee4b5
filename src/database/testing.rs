use super::{MemoryStore, RecordStore};
use crate::error::AppResult;
use crate::models::{PreferenceFields, Profile, ProfileFields, UserAccount, VerificationRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Hands control back to the runtime after every read, so concurrent
/// requests interleave between reading a record and writing it.
pub struct YieldingStore(pub Arc<MemoryStore>);

#[async_trait]
impl RecordStore for YieldingStore {
    async fn upsert_verification(&self, record: &VerificationRecord) -> AppResult<()> {
        self.0.upsert_verification(record).await
    }

    async fn find_verification(&self, email: &str) -> AppResult<Option<VerificationRecord>> {
        let found = self.0.find_verification(email).await;
        tokio::task::yield_now().await;
        found
    }

    async fn record_attempt(
        &self,
        email: &str,
        code_hash: &str,
        seen_attempts: i32,
        matched: bool,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        self.0
            .record_attempt(email, code_hash, seen_attempts, matched, now)
            .await
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<UserAccount>> {
        self.0.find_user_by_email(email).await
    }

    async fn create_user_if_absent(&self, user: &UserAccount) -> AppResult<UserAccount> {
        self.0.create_user_if_absent(user).await
    }

    async fn find_profile(&self, user_id: Uuid) -> AppResult<Option<Profile>> {
        let found = self.0.find_profile(user_id).await;
        tokio::task::yield_now().await;
        found
    }

    async fn create_profile_if_absent(&self, user_id: Uuid) -> AppResult<()> {
        self.0.create_profile_if_absent(user_id).await
    }

    async fn update_profile_fields(&self, user_id: Uuid, fields: &ProfileFields) -> AppResult<()> {
        self.0.update_profile_fields(user_id, fields).await
    }

    async fn update_preference_fields(
        &self,
        user_id: Uuid,
        fields: &PreferenceFields,
    ) -> AppResult<bool> {
        self.0.update_preference_fields(user_id, fields).await
    }
}
