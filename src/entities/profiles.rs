use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// List-valued columns are stored as `jsonb` arrays of strings.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub first_name: Option<String>,
    pub age: Option<i32>,
    pub academic_year: Option<String>,
    pub major: Option<String>,
    pub height: Option<String>,
    pub ethnicity: Option<String>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub interests: Option<Json>,
    #[sea_orm(column_type = "Text", nullable)]
    pub about_me: Option<String>,
    pub instagram_handle: Option<String>,
    pub profile_completed: bool,
    pub age_min: Option<i32>,
    pub age_max: Option<i32>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub academic_years_preference: Option<Json>,
    pub height_preference: Option<String>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub ethnicity_preference: Option<Json>,
    pub intent_preference: Option<String>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub must_have_values: Option<Json>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub lifestyle_match: Option<Json>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub dealbreakers: Option<Json>,
    pub open_to_surprises: Option<bool>,
    pub preferences_completed: bool,
    pub onboarding_completed: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
