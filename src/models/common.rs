use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    #[schema(example = "Must use a valid UNT student email.")]
    pub error: String,
}

/// `{ "ok": true }` style acknowledgement used by the auth endpoints.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OkResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "/about-you")]
    pub redirect: Option<String>,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self {
            ok: true,
            redirect: None,
        }
    }

    pub fn redirect(to: &str) -> Self {
        Self {
            ok: true,
            redirect: Some(to.to_string()),
        }
    }
}

/// `{ "success": true }` acknowledgement used by the profile endpoints.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn new() -> Self {
        Self { success: true }
    }
}

impl Default for SuccessResponse {
    fn default() -> Self {
        Self::new()
    }
}
