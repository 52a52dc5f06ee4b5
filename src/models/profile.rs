use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Onboarding profile plus the partner preferences collected for later matching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    pub first_name: Option<String>,
    pub age: Option<i32>,
    pub academic_year: Option<String>,
    pub major: Option<String>,
    pub height: Option<String>,
    pub ethnicity: Option<String>,
    pub interests: Vec<String>,
    pub about_me: Option<String>,
    pub instagram_handle: Option<String>,
    pub profile_completed: bool,

    pub age_min: Option<i32>,
    pub age_max: Option<i32>,
    pub academic_years_preference: Vec<String>,
    pub height_preference: Option<String>,
    pub ethnicity_preference: Vec<String>,
    pub intent_preference: Option<String>,
    pub must_have_values: Vec<String>,
    pub lifestyle_match: Vec<String>,
    pub dealbreakers: Vec<String>,
    pub open_to_surprises: Option<bool>,
    pub preferences_completed: bool,

    pub onboarding_completed: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    pub fn empty(id: Uuid) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}

/// Validated "about you" columns. Writing them never touches preferences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileFields {
    pub first_name: String,
    pub age: i32,
    pub academic_year: String,
    pub major: String,
    pub height: String,
    pub ethnicity: Option<String>,
    pub interests: Vec<String>,
    pub about_me: Option<String>,
    pub instagram_handle: String,
}

/// Validated "your type" columns. Writing them never touches profile fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceFields {
    pub age_min: Option<i32>,
    pub age_max: Option<i32>,
    pub academic_years: Vec<String>,
    pub height_preference: Option<String>,
    pub ethnicity_preference: Vec<String>,
    pub intent_preference: Option<String>,
    pub must_have_values: Vec<String>,
    pub lifestyle_match: Vec<String>,
    pub dealbreakers: Vec<String>,
    pub open_to_surprises: Option<bool>,
}

impl Profile {
    pub fn apply_profile_fields(&mut self, fields: &ProfileFields) {
        self.first_name = Some(fields.first_name.clone());
        self.age = Some(fields.age);
        self.academic_year = Some(fields.academic_year.clone());
        self.major = Some(fields.major.clone());
        self.height = Some(fields.height.clone());
        self.ethnicity = fields.ethnicity.clone();
        self.interests = fields.interests.clone();
        self.about_me = fields.about_me.clone();
        self.instagram_handle = Some(fields.instagram_handle.clone());
        self.profile_completed = true;
    }

    /// Onboarding completes only if the profile step was already stored.
    pub fn apply_preference_fields(&mut self, fields: &PreferenceFields) {
        self.age_min = fields.age_min;
        self.age_max = fields.age_max;
        self.academic_years_preference = fields.academic_years.clone();
        self.height_preference = fields.height_preference.clone();
        self.ethnicity_preference = fields.ethnicity_preference.clone();
        self.intent_preference = fields.intent_preference.clone();
        self.must_have_values = fields.must_have_values.clone();
        self.lifestyle_match = fields.lifestyle_match.clone();
        self.dealbreakers = fields.dealbreakers.clone();
        self.open_to_surprises = fields.open_to_surprises;
        self.preferences_completed = true;
        self.onboarding_completed = self.profile_completed;
    }
}

/// The onboarding form posts age as a string; numbers are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgeInput {
    Number(i64),
    Text(String),
}

impl AgeInput {
    pub fn as_number(&self) -> Option<i64> {
        match self {
            AgeInput::Number(n) => Some(*n),
            AgeInput::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateProfileRequest {
    #[schema(example = "Jordan")]
    pub first_name: String,
    #[schema(value_type = String, example = "21")]
    pub age: Option<AgeInput>,
    #[schema(example = "Junior")]
    pub academic_year: String,
    #[schema(example = "Computer Science")]
    pub major: String,
    #[schema(example = "5'9\"")]
    pub height: String,
    pub ethnicity: Option<String>,
    pub interests: Vec<String>,
    pub about_me: Option<String>,
    #[schema(example = "@jordan.unt")]
    pub instagram_handle: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdatePreferencesRequest {
    #[schema(example = 19)]
    pub age_min: Option<i32>,
    #[schema(example = 24)]
    pub age_max: Option<i32>,
    pub academic_years: Vec<String>,
    pub height_preference: Option<String>,
    pub ethnicity_preference: Vec<String>,
    pub intent_preference: Option<String>,
    pub must_have_values: Vec<String>,
    pub lifestyle_match: Vec<String>,
    pub dealbreakers: Vec<String>,
    pub open_to_surprises: Option<bool>,
}
