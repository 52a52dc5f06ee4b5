use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Context;
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use untlove_backend::{
    config::Config,
    database::open_store,
    external::build_mailer,
    handlers::{self, StaticPages},
    middlewares::{SessionGate, create_cors},
    services::*,
    swagger::swagger_config,
    utils::{CodeHasher, JwtService},
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml().context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;
    log::info!("Starting in {:?} mode", config.app.environment);

    let store = open_store(&config)
        .await
        .context("failed to open record store")?;

    let http_client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .context("failed to build HTTP client")?;
    let mailer = build_mailer(&config, http_client).context("failed to configure mailer")?;
    log::info!("Verification mail provider: {}", mailer.provider());

    let jwt_service = JwtService::new(&config.session.secret);
    let verification_service = VerificationService::new(
        store.clone(),
        mailer,
        CodeHasher::new(&config.session.secret),
        &config.verification,
    );
    let auth_service = AuthService::new(
        store.clone(),
        verification_service,
        jwt_service.clone(),
        config.is_production(),
    );
    let profile_service = ProfileService::new(store);
    let pages = StaticPages::new(&config.server.static_dir);
    log::info!("Serving pages from {}", pages.root().display());

    let allowed_origins = config.server.allowed_origins.clone();

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(SessionGate::new(jwt_service.clone()))
            .wrap(create_cors(&allowed_origins))
            .wrap(Logger::default())
            .app_data(handlers::json_config())
            .app_data(web::Data::new(jwt_service.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(profile_service.clone()))
            .app_data(web::Data::new(pages.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api")
                    .configure(handlers::auth_config)
                    .configure(handlers::profile_config),
            )
            .configure(handlers::pages_config)
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await?;

    Ok(())
}
