use super::store::RecordStore;
use crate::error::AppResult;
use crate::models::{PreferenceFields, Profile, ProfileFields, UserAccount, VerificationRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-local store for development without a database and for tests.
#[derive(Default)]
pub struct MemoryStore {
    verifications: RwLock<HashMap<String, VerificationRecord>>,
    users: RwLock<HashMap<String, UserAccount>>,
    profiles: RwLock<HashMap<Uuid, Profile>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn verification_count(&self) -> usize {
        self.verifications.read().await.len()
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn upsert_verification(&self, record: &VerificationRecord) -> AppResult<()> {
        let mut verifications = self.verifications.write().await;
        verifications.insert(record.email.clone(), record.clone());
        Ok(())
    }

    async fn find_verification(&self, email: &str) -> AppResult<Option<VerificationRecord>> {
        Ok(self.verifications.read().await.get(email).cloned())
    }

    async fn record_attempt(
        &self,
        email: &str,
        code_hash: &str,
        seen_attempts: i32,
        matched: bool,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let mut verifications = self.verifications.write().await;
        let Some(record) = verifications.get_mut(email) else {
            return Ok(false);
        };
        if record.code_hash != code_hash
            || record.verified
            || record.attempts != seen_attempts
            || record.is_expired_at(now)
        {
            return Ok(false);
        }
        record.attempts += 1;
        record.verified = matched;
        Ok(true)
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<UserAccount>> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn create_user_if_absent(&self, user: &UserAccount) -> AppResult<UserAccount> {
        let mut users = self.users.write().await;
        let stored = users
            .entry(user.email.clone())
            .or_insert_with(|| user.clone());
        Ok(stored.clone())
    }

    async fn find_profile(&self, user_id: Uuid) -> AppResult<Option<Profile>> {
        Ok(self.profiles.read().await.get(&user_id).cloned())
    }

    async fn create_profile_if_absent(&self, user_id: Uuid) -> AppResult<()> {
        let mut profiles = self.profiles.write().await;
        profiles.entry(user_id).or_insert_with(|| Profile::empty(user_id));
        Ok(())
    }

    async fn update_profile_fields(&self, user_id: Uuid, fields: &ProfileFields) -> AppResult<()> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .entry(user_id)
            .or_insert_with(|| Profile::empty(user_id));
        profile.apply_profile_fields(fields);
        profile.updated_at = Some(Utc::now());
        Ok(())
    }

    async fn update_preference_fields(
        &self,
        user_id: Uuid,
        fields: &PreferenceFields,
    ) -> AppResult<bool> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .entry(user_id)
            .or_insert_with(|| Profile::empty(user_id));
        profile.apply_preference_fields(fields);
        profile.updated_at = Some(Utc::now());
        Ok(profile.onboarding_completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn upsert_replaces_record_for_same_email() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let first = VerificationRecord::issued("a@my.unt.edu".into(), "h1".into(), now, Duration::minutes(10));
        let second = VerificationRecord::issued("a@my.unt.edu".into(), "h2".into(), now, Duration::minutes(10));

        store.upsert_verification(&first).await.unwrap();
        store.upsert_verification(&second).await.unwrap();

        assert_eq!(store.verification_count().await, 1);
        let stored = store.find_verification("a@my.unt.edu").await.unwrap().unwrap();
        assert_eq!(stored.code_hash, "h2");
    }

    #[tokio::test]
    async fn create_user_if_absent_keeps_first_account() {
        let store = MemoryStore::new();
        let first = UserAccount::new("a@my.unt.edu".into());
        let second = UserAccount::new("a@my.unt.edu".into());

        let stored = store.create_user_if_absent(&first).await.unwrap();
        assert_eq!(stored.id, first.id);
        let stored = store.create_user_if_absent(&second).await.unwrap();
        assert_eq!(stored.id, first.id);
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn attempt_applies_only_to_the_record_that_was_read() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let record = VerificationRecord::issued("a@my.unt.edu".into(), "h1".into(), now, Duration::minutes(10));
        store.upsert_verification(&record).await.unwrap();

        // stale attempt count
        assert!(!store.record_attempt("a@my.unt.edu", "h1", 3, false, now).await.unwrap());
        // superseded code
        assert!(!store.record_attempt("a@my.unt.edu", "h0", 0, true, now).await.unwrap());
        // expired
        let later = now + Duration::minutes(11);
        assert!(!store.record_attempt("a@my.unt.edu", "h1", 0, true, later).await.unwrap());
        // unknown email
        assert!(!store.record_attempt("b@my.unt.edu", "h1", 0, true, now).await.unwrap());

        assert!(store.record_attempt("a@my.unt.edu", "h1", 0, false, now).await.unwrap());
        assert!(store.record_attempt("a@my.unt.edu", "h1", 1, true, now).await.unwrap());
        // consumed
        assert!(!store.record_attempt("a@my.unt.edu", "h1", 2, true, now).await.unwrap());

        let stored = store.find_verification("a@my.unt.edu").await.unwrap().unwrap();
        assert_eq!(stored.attempts, 2);
        assert!(stored.verified);
    }

    #[tokio::test]
    async fn profile_and_preference_writes_keep_each_others_columns() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();
        store.create_profile_if_absent(user_id).await.unwrap();

        let preferences = PreferenceFields {
            age_min: Some(20),
            ..Default::default()
        };
        assert!(!store.update_preference_fields(user_id, &preferences).await.unwrap());

        let fields = ProfileFields {
            first_name: "Jordan".into(),
            age: 21,
            academic_year: "Junior".into(),
            major: "Biology".into(),
            height: "5'9\"".into(),
            ethnicity: None,
            interests: vec!["Hiking".into(), "Coffee".into(), "Music".into()],
            about_me: None,
            instagram_handle: "@jordan".into(),
        };
        store.update_profile_fields(user_id, &fields).await.unwrap();
        // creating again must not reset anything
        store.create_profile_if_absent(user_id).await.unwrap();

        let profile = store.find_profile(user_id).await.unwrap().unwrap();
        assert_eq!(profile.age_min, Some(20));
        assert_eq!(profile.first_name.as_deref(), Some("Jordan"));
        assert!(profile.profile_completed && profile.preferences_completed);
        assert!(!profile.onboarding_completed);

        assert!(store.update_preference_fields(user_id, &preferences).await.unwrap());
    }
}
