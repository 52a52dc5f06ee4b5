pub mod auth;
pub mod pages;
pub mod profile;

pub use auth::auth_config;
pub use pages::{StaticPages, pages_config};
pub use profile::profile_config;

use crate::error::AppError;
use actix_web::web;

/// Malformed JSON bodies answer with the same `{"error": ..}` shape as
/// every other failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(16 * 1024)
        .error_handler(|err, _req| {
            AppError::ValidationError(format!("Invalid request body: {err}")).into()
        })
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::config::VerificationConfig;
    use crate::database::MemoryStore;
    use crate::external::testing::RecordingMailer;
    use crate::services::*;
    use crate::utils::{CodeHasher, JwtService};
    use std::sync::Arc;

    pub const SECRET: &str = "handler-test-secret";

    pub struct TestServices {
        pub store: Arc<MemoryStore>,
        pub mailer: Arc<RecordingMailer>,
        pub jwt: JwtService,
        pub auth: AuthService,
        pub profiles: ProfileService,
    }

    pub fn services() -> TestServices {
        let store = Arc::new(MemoryStore::new());
        let mailer = Arc::new(RecordingMailer::default());
        let jwt = JwtService::new(SECRET);
        let verification = VerificationService::new(
            store.clone(),
            mailer.clone(),
            CodeHasher::new(SECRET),
            &VerificationConfig::default(),
        );
        let auth = AuthService::new(store.clone(), verification, jwt.clone(), false);
        let profiles = ProfileService::new(store.clone());
        TestServices {
            store,
            mailer,
            jwt,
            auth,
            profiles,
        }
    }
}
