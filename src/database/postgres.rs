use super::store::RecordStore;
use crate::entities::{
    email_verification_entity as verifications, profile_entity as profiles, user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::{PreferenceFields, Profile, ProfileFields, UserAccount, VerificationRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::prelude::Json;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, Insert, QueryFilter, Set, UpdateMany,
};
use uuid::Uuid;

/// Record store backed by the Supabase Postgres database.
#[derive(Clone)]
pub struct PostgresStore {
    pool: DatabaseConnection,
}

impl PostgresStore {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }
}

impl From<verifications::Model> for VerificationRecord {
    fn from(m: verifications::Model) -> Self {
        Self {
            email: m.email,
            code_hash: m.code_hash,
            expires_at: m.expires_at,
            attempts: m.attempts,
            verified: m.verified,
            created_at: m.created_at,
        }
    }
}

impl From<users::Model> for UserAccount {
    fn from(m: users::Model) -> Self {
        Self {
            id: m.id,
            email: m.email,
            created_at: m.created_at,
        }
    }
}

fn list_to_json(values: &[String]) -> AppResult<Option<Json>> {
    Ok(Some(serde_json::to_value(values)?))
}

fn json_to_list(value: Option<Json>) -> AppResult<Vec<String>> {
    match value {
        None | Some(Json::Null) => Ok(Vec::new()),
        Some(v) => Ok(serde_json::from_value(v)?),
    }
}

impl TryFrom<profiles::Model> for Profile {
    type Error = AppError;

    fn try_from(m: profiles::Model) -> AppResult<Self> {
        Ok(Self {
            id: m.id,
            first_name: m.first_name,
            age: m.age,
            academic_year: m.academic_year,
            major: m.major,
            height: m.height,
            ethnicity: m.ethnicity,
            interests: json_to_list(m.interests)?,
            about_me: m.about_me,
            instagram_handle: m.instagram_handle,
            profile_completed: m.profile_completed,
            age_min: m.age_min,
            age_max: m.age_max,
            academic_years_preference: json_to_list(m.academic_years_preference)?,
            height_preference: m.height_preference,
            ethnicity_preference: json_to_list(m.ethnicity_preference)?,
            intent_preference: m.intent_preference,
            must_have_values: json_to_list(m.must_have_values)?,
            lifestyle_match: json_to_list(m.lifestyle_match)?,
            dealbreakers: json_to_list(m.dealbreakers)?,
            open_to_surprises: m.open_to_surprises,
            preferences_completed: m.preferences_completed,
            onboarding_completed: m.onboarding_completed,
            updated_at: m.updated_at,
        })
    }
}

/// Conditional attempt update; affects one row only while the read record is
/// still the stored one.
fn attempt_update(
    email: &str,
    code_hash: &str,
    seen_attempts: i32,
    matched: bool,
    now: DateTime<Utc>,
) -> UpdateMany<verifications::Entity> {
    verifications::Entity::update_many()
        .col_expr(
            verifications::Column::Attempts,
            Expr::col(verifications::Column::Attempts).add(1),
        )
        .col_expr(verifications::Column::Verified, Expr::value(matched))
        .filter(verifications::Column::Email.eq(email))
        .filter(verifications::Column::CodeHash.eq(code_hash))
        .filter(verifications::Column::Verified.eq(false))
        .filter(verifications::Column::Attempts.eq(seen_attempts))
        .filter(verifications::Column::ExpiresAt.gt(now))
}

fn empty_profile(user_id: Uuid) -> profiles::ActiveModel {
    profiles::ActiveModel {
        id: Set(user_id),
        updated_at: Set(Some(Utc::now())),
        ..Default::default()
    }
}

fn profile_fields_upsert(
    user_id: Uuid,
    fields: &ProfileFields,
) -> AppResult<Insert<profiles::ActiveModel>> {
    let model = profiles::ActiveModel {
        first_name: Set(Some(fields.first_name.clone())),
        age: Set(Some(fields.age)),
        academic_year: Set(Some(fields.academic_year.clone())),
        major: Set(Some(fields.major.clone())),
        height: Set(Some(fields.height.clone())),
        ethnicity: Set(fields.ethnicity.clone()),
        interests: Set(list_to_json(&fields.interests)?),
        about_me: Set(fields.about_me.clone()),
        instagram_handle: Set(Some(fields.instagram_handle.clone())),
        profile_completed: Set(true),
        ..empty_profile(user_id)
    };

    Ok(profiles::Entity::insert(model).on_conflict(
        OnConflict::column(profiles::Column::Id)
            .update_columns([
                profiles::Column::FirstName,
                profiles::Column::Age,
                profiles::Column::AcademicYear,
                profiles::Column::Major,
                profiles::Column::Height,
                profiles::Column::Ethnicity,
                profiles::Column::Interests,
                profiles::Column::AboutMe,
                profiles::Column::InstagramHandle,
                profiles::Column::ProfileCompleted,
                profiles::Column::UpdatedAt,
            ])
            .to_owned(),
    ))
}

fn preference_fields_upsert(
    user_id: Uuid,
    fields: &PreferenceFields,
) -> AppResult<Insert<profiles::ActiveModel>> {
    let model = profiles::ActiveModel {
        age_min: Set(fields.age_min),
        age_max: Set(fields.age_max),
        academic_years_preference: Set(list_to_json(&fields.academic_years)?),
        height_preference: Set(fields.height_preference.clone()),
        ethnicity_preference: Set(list_to_json(&fields.ethnicity_preference)?),
        intent_preference: Set(fields.intent_preference.clone()),
        must_have_values: Set(list_to_json(&fields.must_have_values)?),
        lifestyle_match: Set(list_to_json(&fields.lifestyle_match)?),
        dealbreakers: Set(list_to_json(&fields.dealbreakers)?),
        open_to_surprises: Set(fields.open_to_surprises),
        preferences_completed: Set(true),
        // a fresh row has no completed profile yet
        onboarding_completed: Set(false),
        ..empty_profile(user_id)
    };

    Ok(profiles::Entity::insert(model).on_conflict(
        OnConflict::column(profiles::Column::Id)
            .update_columns([
                profiles::Column::AgeMin,
                profiles::Column::AgeMax,
                profiles::Column::AcademicYearsPreference,
                profiles::Column::HeightPreference,
                profiles::Column::EthnicityPreference,
                profiles::Column::IntentPreference,
                profiles::Column::MustHaveValues,
                profiles::Column::LifestyleMatch,
                profiles::Column::Dealbreakers,
                profiles::Column::OpenToSurprises,
                profiles::Column::PreferencesCompleted,
                profiles::Column::UpdatedAt,
            ])
            .value(
                profiles::Column::OnboardingCompleted,
                Expr::col((profiles::Entity, profiles::Column::ProfileCompleted)),
            )
            .to_owned(),
    ))
}

#[async_trait]
impl RecordStore for PostgresStore {
    async fn upsert_verification(&self, record: &VerificationRecord) -> AppResult<()> {
        let model = verifications::ActiveModel {
            email: Set(record.email.clone()),
            code_hash: Set(record.code_hash.clone()),
            expires_at: Set(record.expires_at),
            attempts: Set(record.attempts),
            verified: Set(record.verified),
            created_at: Set(record.created_at),
        };

        verifications::Entity::insert(model)
            .on_conflict(
                OnConflict::column(verifications::Column::Email)
                    .update_columns([
                        verifications::Column::CodeHash,
                        verifications::Column::ExpiresAt,
                        verifications::Column::Attempts,
                        verifications::Column::Verified,
                        verifications::Column::CreatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_verification(&self, email: &str) -> AppResult<Option<VerificationRecord>> {
        let found = verifications::Entity::find_by_id(email.to_string())
            .one(&self.pool)
            .await?;
        Ok(found.map(VerificationRecord::from))
    }

    async fn record_attempt(
        &self,
        email: &str,
        code_hash: &str,
        seen_attempts: i32,
        matched: bool,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = attempt_update(email, code_hash, seen_attempts, matched, now)
            .exec(&self.pool)
            .await?;
        Ok(result.rows_affected == 1)
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<UserAccount>> {
        let found = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.pool)
            .await?;
        Ok(found.map(UserAccount::from))
    }

    async fn create_user_if_absent(&self, user: &UserAccount) -> AppResult<UserAccount> {
        let model = users::ActiveModel {
            id: Set(user.id),
            email: Set(user.email.clone()),
            created_at: Set(user.created_at),
        };

        // a concurrent sign-in may have created the account first
        users::Entity::insert(model)
            .on_conflict(
                OnConflict::column(users::Column::Email)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.pool)
            .await?;

        self.find_user_by_email(&user.email).await?.ok_or_else(|| {
            AppError::InternalError(format!("User {} missing after insert", user.email))
        })
    }

    async fn find_profile(&self, user_id: Uuid) -> AppResult<Option<Profile>> {
        profiles::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .map(Profile::try_from)
            .transpose()
    }

    async fn create_profile_if_absent(&self, user_id: Uuid) -> AppResult<()> {
        profiles::Entity::insert(empty_profile(user_id))
            .on_conflict(
                OnConflict::column(profiles::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_profile_fields(&self, user_id: Uuid, fields: &ProfileFields) -> AppResult<()> {
        profile_fields_upsert(user_id, fields)?
            .exec_without_returning(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_preference_fields(
        &self,
        user_id: Uuid,
        fields: &PreferenceFields,
    ) -> AppResult<bool> {
        preference_fields_upsert(user_id, fields)?
            .exec_without_returning(&self.pool)
            .await?;

        let onboarding_completed = profiles::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .is_some_and(|p| p.onboarding_completed);
        Ok(onboarding_completed)
    }
}
