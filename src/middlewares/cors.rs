use actix_cors::Cors;

/// Browser access for the configured origins. An empty list keeps the API
/// same-origin only.
pub fn create_cors(allowed_origins: &[String]) -> Cors {
    let cors = allowed_origins.iter().fold(Cors::default(), |cors, origin| {
        cors.allowed_origin(origin)
    });

    cors.allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allow_any_header()
        // the session travels as a cookie
        .supports_credentials()
        .max_age(3600)
}
