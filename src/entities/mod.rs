pub mod email_verifications;
pub mod profiles;
pub mod users;

pub use email_verifications as email_verification_entity;
pub use profiles as profile_entity;
pub use users as user_entity;
