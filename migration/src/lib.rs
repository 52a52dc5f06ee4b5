pub use sea_orm_migration::prelude::*;

mod m20260201_000001_create_users;
mod m20260201_000002_create_email_verifications;
mod m20260201_000003_create_profiles;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260201_000001_create_users::Migration),
            Box::new(m20260201_000002_create_email_verifications::Migration),
            Box::new(m20260201_000003_create_profiles::Migration),
        ]
    }
}
