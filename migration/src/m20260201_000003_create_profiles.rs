use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Profiles {
    Table,
    Id,
    FirstName,
    Age,
    AcademicYear,
    Major,
    Height,
    Ethnicity,
    Interests,
    AboutMe,
    InstagramHandle,
    ProfileCompleted,
    AgeMin,
    AgeMax,
    AcademicYearsPreference,
    HeightPreference,
    EthnicityPreference,
    IntentPreference,
    MustHaveValues,
    LifestyleMatch,
    Dealbreakers,
    OpenToSurprises,
    PreferencesCompleted,
    OnboardingCompleted,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Profiles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Profiles::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Profiles::FirstName).string().null())
                    .col(ColumnDef::new(Profiles::Age).integer().null())
                    .col(ColumnDef::new(Profiles::AcademicYear).string().null())
                    .col(ColumnDef::new(Profiles::Major).string().null())
                    .col(ColumnDef::new(Profiles::Height).string().null())
                    .col(ColumnDef::new(Profiles::Ethnicity).string().null())
                    .col(ColumnDef::new(Profiles::Interests).json_binary().null())
                    .col(ColumnDef::new(Profiles::AboutMe).text().null())
                    .col(ColumnDef::new(Profiles::InstagramHandle).string().null())
                    .col(
                        ColumnDef::new(Profiles::ProfileCompleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Profiles::AgeMin).integer().null())
                    .col(ColumnDef::new(Profiles::AgeMax).integer().null())
                    .col(ColumnDef::new(Profiles::AcademicYearsPreference).json_binary().null())
                    .col(ColumnDef::new(Profiles::HeightPreference).string().null())
                    .col(ColumnDef::new(Profiles::EthnicityPreference).json_binary().null())
                    .col(ColumnDef::new(Profiles::IntentPreference).string().null())
                    .col(ColumnDef::new(Profiles::MustHaveValues).json_binary().null())
                    .col(ColumnDef::new(Profiles::LifestyleMatch).json_binary().null())
                    .col(ColumnDef::new(Profiles::Dealbreakers).json_binary().null())
                    .col(ColumnDef::new(Profiles::OpenToSurprises).boolean().null())
                    .col(
                        ColumnDef::new(Profiles::PreferencesCompleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Profiles::OnboardingCompleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Profiles::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null()
                            .default(Expr::cust("NOW()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_profiles_user")
                            .from(Profiles::Table, Profiles::Id)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Profiles::Table).if_exists().to_owned())
            .await
    }
}
