pub mod auth_service;
pub mod profile_service;
pub mod verification_service;

pub use auth_service::*;
pub use profile_service::*;
pub use verification_service::*;
