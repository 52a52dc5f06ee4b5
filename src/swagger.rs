use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::request_verification,
        handlers::auth::verify,
        handlers::auth::logout,
        handlers::auth::current_session,
        handlers::profile::get_profile,
        handlers::profile::update_profile,
        handlers::profile::update_preferences,
    ),
    components(
        schemas(
            RequestVerificationRequest,
            VerifyCodeRequest,
            SessionCredential,
            Profile,
            UpdateProfileRequest,
            UpdatePreferencesRequest,
            OkResponse,
            SuccessResponse,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Student email verification and sessions"),
        (name = "profile", description = "Onboarding profile and preferences"),
    ),
    info(
        title = "UNT Love API",
        version = "0.1.0",
        description = "UNT Love onboarding backend"
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
