use crate::middlewares::{CurrentSession, VERIFY_PATH};
use crate::models::*;
use crate::services::AuthService;
use actix_web::{HttpResponse, ResponseError, Result, web};

const ONBOARDING_START: &str = "/about-you";

#[utoipa::path(
    post,
    path = "/api/auth/request-verification",
    tag = "auth",
    request_body = RequestVerificationRequest,
    responses(
        (status = 200, description = "Verification code sent", body = OkResponse),
        (status = 400, description = "Not a UNT student email", body = ApiError),
        (status = 502, description = "Mail provider failed", body = ApiError)
    )
)]
pub async fn request_verification(
    auth_service: web::Data<AuthService>,
    request: web::Json<RequestVerificationRequest>,
) -> Result<HttpResponse> {
    match auth_service.request_code(&request.email).await {
        Ok(()) => Ok(HttpResponse::Ok().json(OkResponse::ok())),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/verify",
    tag = "auth",
    request_body = VerifyCodeRequest,
    responses(
        (status = 200, description = "Signed in, session cookie set", body = OkResponse),
        (status = 400, description = "Invalid or expired code", body = ApiError)
    )
)]
pub async fn verify(
    auth_service: web::Data<AuthService>,
    request: web::Json<VerifyCodeRequest>,
) -> Result<HttpResponse> {
    match auth_service.sign_in(&request.email, &request.code).await {
        Ok(signed_in) => {
            let cookie = auth_service.session_cookie(&signed_in.token, &signed_in.session);
            Ok(HttpResponse::Ok()
                .cookie(cookie)
                .json(OkResponse::redirect(ONBOARDING_START)))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Session cookie cleared", body = OkResponse)
    )
)]
pub async fn logout(auth_service: web::Data<AuthService>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok()
        .cookie(auth_service.logout_cookie())
        .json(OkResponse::redirect(VERIFY_PATH)))
}

#[utoipa::path(
    get,
    path = "/api/auth/session",
    tag = "auth",
    security(
        ("session_cookie" = [])
    ),
    responses(
        (status = 200, description = "Current session", body = SessionCredential),
        (status = 401, description = "No valid session", body = ApiError)
    )
)]
pub async fn current_session(session: CurrentSession) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(session.0))
}

pub fn auth_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/request-verification", web::post().to(request_verification))
            .route("/verify", web::post().to(verify))
            .route("/logout", web::post().to(logout))
            .route("/session", web::get().to(current_session)),
    );
}
