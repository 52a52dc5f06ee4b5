use crate::database::SharedStore;
use crate::error::{AppError, AppResult};
use crate::models::*;
use regex::Regex;
use std::sync::LazyLock;
use uuid::Uuid;

pub const MIN_AGE: i64 = 18;
pub const MAX_AGE: i64 = 30;
const MIN_INTERESTS: usize = 3;
const MAX_INTERESTS: usize = 5;

static INSTAGRAM_HANDLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@?[A-Za-z0-9._]{1,30}$").expect("valid handle regex"));

fn required(value: &str, message: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::ValidationError(message.to_string()));
    }
    Ok(value.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn clean_list(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for v in values {
        let v = v.trim().to_string();
        if !v.is_empty() && !out.contains(&v) {
            out.push(v);
        }
    }
    out
}

fn check_age_bound(age: Option<i32>, field: &str) -> AppResult<()> {
    if let Some(age) = age
        && !(MIN_AGE..=MAX_AGE).contains(&(age as i64))
    {
        return Err(AppError::ValidationError(format!(
            "{field} must be between {MIN_AGE} and {MAX_AGE}"
        )));
    }
    Ok(())
}

/// Onboarding profile and preference storage for signed-in users.
#[derive(Clone)]
pub struct ProfileService {
    store: SharedStore,
}

impl ProfileService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn get_profile(&self, user_id: Uuid) -> AppResult<Profile> {
        self.store
            .find_profile(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
    }

    /// Saves the "about you" step and marks the profile complete.
    pub async fn update_profile(&self, user_id: Uuid, request: UpdateProfileRequest) -> AppResult<()> {
        let first_name = required(&request.first_name, "First name is required")?;
        let age = request
            .age
            .as_ref()
            .ok_or_else(|| AppError::ValidationError("Age is required".to_string()))?
            .as_number()
            .ok_or_else(|| AppError::ValidationError("Age must be a number".to_string()))?;
        if !(MIN_AGE..=MAX_AGE).contains(&age) {
            return Err(AppError::ValidationError(format!(
                "Age must be between {MIN_AGE} and {MAX_AGE}"
            )));
        }
        let academic_year = required(&request.academic_year, "Academic year is required")?;
        let major = required(&request.major, "Major is required")?;
        let height = required(&request.height, "Height is required")?;

        let interests = clean_list(request.interests);
        if interests.len() < MIN_INTERESTS {
            return Err(AppError::ValidationError(
                "Please select at least 3 interests".to_string(),
            ));
        }
        if interests.len() > MAX_INTERESTS {
            return Err(AppError::ValidationError(
                "Please select no more than 5 interests".to_string(),
            ));
        }

        let instagram_handle = required(&request.instagram_handle, "Instagram handle is required")?;
        if !INSTAGRAM_HANDLE.is_match(&instagram_handle) {
            return Err(AppError::ValidationError(
                "Instagram handle is invalid".to_string(),
            ));
        }

        let fields = ProfileFields {
            first_name,
            age: age as i32,
            academic_year,
            major,
            height,
            ethnicity: optional(request.ethnicity),
            interests,
            about_me: optional(request.about_me),
            instagram_handle,
        };

        self.store.update_profile_fields(user_id, &fields).await?;
        log::info!("Profile updated for user {}", user_id);
        Ok(())
    }

    /// Saves the "your type" step. Onboarding is complete once both steps are.
    pub async fn update_preferences(
        &self,
        user_id: Uuid,
        request: UpdatePreferencesRequest,
    ) -> AppResult<()> {
        check_age_bound(request.age_min, "Minimum age")?;
        check_age_bound(request.age_max, "Maximum age")?;
        if let (Some(min), Some(max)) = (request.age_min, request.age_max)
            && min > max
        {
            return Err(AppError::ValidationError(
                "Min age must be less than or equal to max age".to_string(),
            ));
        }

        let fields = PreferenceFields {
            age_min: request.age_min,
            age_max: request.age_max,
            academic_years: clean_list(request.academic_years),
            height_preference: optional(request.height_preference),
            ethnicity_preference: clean_list(request.ethnicity_preference),
            intent_preference: optional(request.intent_preference),
            must_have_values: clean_list(request.must_have_values),
            lifestyle_match: clean_list(request.lifestyle_match),
            dealbreakers: clean_list(request.dealbreakers),
            open_to_surprises: request.open_to_surprises,
        };

        let onboarding_completed = self.store.update_preference_fields(user_id, &fields).await?;
        log::info!(
            "Preferences updated for user {} (onboarding completed: {})",
            user_id,
            onboarding_completed
        );
        Ok(())
    }
}
