use crate::middlewares::CurrentSession;
use crate::models::*;
use crate::services::ProfileService;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/api/profile",
    tag = "profile",
    security(
        ("session_cookie" = [])
    ),
    responses(
        (status = 200, description = "Stored profile", body = Profile),
        (status = 401, description = "No valid session", body = ApiError),
        (status = 404, description = "No profile yet", body = ApiError)
    )
)]
pub async fn get_profile(
    profile_service: web::Data<ProfileService>,
    session: CurrentSession,
) -> Result<HttpResponse> {
    match profile_service.get_profile(session.0.user_id).await {
        Ok(profile) => Ok(HttpResponse::Ok().json(profile)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/profile/update-profile",
    tag = "profile",
    request_body = UpdateProfileRequest,
    security(
        ("session_cookie" = [])
    ),
    responses(
        (status = 200, description = "Profile saved", body = SuccessResponse),
        (status = 400, description = "Invalid profile", body = ApiError),
        (status = 401, description = "No valid session", body = ApiError)
    )
)]
pub async fn update_profile(
    profile_service: web::Data<ProfileService>,
    session: CurrentSession,
    request: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse> {
    match profile_service
        .update_profile(session.0.user_id, request.into_inner())
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(SuccessResponse::new())),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/profile/update-preferences",
    tag = "profile",
    request_body = UpdatePreferencesRequest,
    security(
        ("session_cookie" = [])
    ),
    responses(
        (status = 200, description = "Preferences saved", body = SuccessResponse),
        (status = 400, description = "Invalid preferences", body = ApiError),
        (status = 401, description = "No valid session", body = ApiError)
    )
)]
pub async fn update_preferences(
    profile_service: web::Data<ProfileService>,
    session: CurrentSession,
    request: web::Json<UpdatePreferencesRequest>,
) -> Result<HttpResponse> {
    match profile_service
        .update_preferences(session.0.user_id, request.into_inner())
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(SuccessResponse::new())),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn profile_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/profile")
            .route("", web::get().to(get_profile))
            .route("/update-profile", web::post().to(update_profile))
            .route("/update-preferences", web::post().to(update_preferences)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{json_config, testing};
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use serde_json::{Value, json};
    use uuid::Uuid;

    macro_rules! profile_app {
        ($services:expr) => {
            actix_test::init_service(
                App::new()
                    .app_data(web::Data::new($services.profiles.clone()))
                    .app_data(web::Data::new($services.jwt.clone()))
                    .app_data(json_config())
                    .service(web::scope("/api").configure(profile_config)),
            )
            .await
        };
    }

    fn session_cookie(services: &testing::TestServices, user_id: Uuid) -> Cookie<'static> {
        let (token, _) = services.jwt.mint(user_id, "jdoe@my.unt.edu").unwrap();
        Cookie::new(SESSION_COOKIE, token)
    }

    fn profile_body() -> Value {
        json!({
            "firstName": "Jordan",
            "age": "21",
            "academicYear": "Junior",
            "major": "Computer Science",
            "height": "5'9\"",
            "interests": ["Hiking", "Coffee", "Music"],
            "aboutMe": "Mean Green fan",
            "instagramHandle": "@jordan.unt"
        })
    }

    #[actix_web::test]
    async fn onboarding_flow_completes() {
        let services = testing::services();
        let app = profile_app!(services);
        let user_id = Uuid::new_v4();

        let req = actix_test::TestRequest::post()
            .uri("/api/profile/update-profile")
            .cookie(session_cookie(&services, user_id))
            .set_json(profile_body())
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({ "success": true }));

        let req = actix_test::TestRequest::post()
            .uri("/api/profile/update-preferences")
            .cookie(session_cookie(&services, user_id))
            .set_json(json!({ "ageMin": 19, "ageMax": 24, "academicYears": ["Senior"] }))
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({ "success": true }));

        let req = actix_test::TestRequest::get()
            .uri("/api/profile")
            .cookie(session_cookie(&services, user_id))
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["firstName"], "Jordan");
        assert_eq!(body["age"], 21);
        assert_eq!(body["profileCompleted"], true);
        assert_eq!(body["onboardingCompleted"], true);
    }

    #[actix_web::test]
    async fn updates_require_a_session() {
        let services = testing::services();
        let app = profile_app!(services);

        let req = actix_test::TestRequest::post()
            .uri("/api/profile/update-profile")
            .set_json(profile_body())
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "Unauthorized" }));
    }

    #[actix_web::test]
    async fn invalid_profile_is_rejected() {
        let services = testing::services();
        let app = profile_app!(services);
        let mut body = profile_body();
        body["interests"] = json!(["Hiking"]);

        let req = actix_test::TestRequest::post()
            .uri("/api/profile/update-profile")
            .cookie(session_cookie(&services, Uuid::new_v4()))
            .set_json(body)
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["error"], "Please select at least 3 interests");
    }

    #[actix_web::test]
    async fn missing_profile_is_404() {
        let services = testing::services();
        let app = profile_app!(services);

        let req = actix_test::TestRequest::get()
            .uri("/api/profile")
            .cookie(session_cookie(&services, Uuid::new_v4()))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
