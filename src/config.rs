use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Signing secret used when none is configured. Only accepted outside production.
pub const DEV_SESSION_SECRET: &str = "fallback-secret-key-for-development";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub verification: VerificationConfig,
    #[serde(default)]
    pub resend: ResendConfig,
    #[serde(default)]
    pub ses: SesConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

impl FromStr for Environment {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(AppError::ConfigError(format!(
                "Unknown environment '{other}', expected development or production"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub environment: Environment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding the pre-built page shells (`index.html`, `verify.html`, ...).
    pub static_dir: String,
    pub allowed_origins: Vec<String>,
}

fn default_static_dir() -> String {
    "public".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            static_dir: default_static_dir(),
            allowed_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres URL. Empty means the in-memory store (development only).
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub secret: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: DEV_SESSION_SECRET.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationConfig {
    #[serde(default = "default_email_suffix")]
    pub email_suffix: String,
    #[serde(default = "default_code_ttl_minutes")]
    pub code_ttl_minutes: i64,
    /// Confirmation attempts allowed per issued code. `None` disables the lockout.
    #[serde(default)]
    pub max_attempts: Option<i32>,
}

fn default_email_suffix() -> String {
    "@my.unt.edu".to_string()
}

fn default_code_ttl_minutes() -> i64 {
    10
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            email_suffix: default_email_suffix(),
            code_ttl_minutes: default_code_ttl_minutes(),
            max_attempts: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResendConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_resend_from")]
    pub from_email: String,
    #[serde(default = "default_resend_base_url")]
    pub base_url: String,
}

fn default_resend_from() -> String {
    "onboarding@resend.dev".to_string()
}

fn default_resend_base_url() -> String {
    "https://api.resend.com".to_string()
}

impl Default for ResendConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            from_email: default_resend_from(),
            base_url: default_resend_base_url(),
        }
    }
}

impl ResendConfig {
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SesConfig {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub access_key_id: Option<String>,
    #[serde(default)]
    pub secret_access_key: Option<String>,
    #[serde(default)]
    pub from_email: Option<String>,
    /// Set when the keys are temporary STS credentials.
    #[serde(default)]
    pub session_token: Option<String>,
}

impl SesConfig {
    /// SES is only used when every field is present.
    pub fn is_configured(&self) -> bool {
        [
            &self.region,
            &self.access_key_id,
            &self.secret_access_key,
            &self.from_email,
        ]
        .iter()
        .all(|v| v.as_deref().is_some_and(|s| !s.trim().is_empty()))
    }
}

impl Config {
    /// Loads `CONFIG_PATH` (default `config.toml`) when present, then applies
    /// environment overrides. Without a file everything comes from the
    /// environment and defaults.
    pub fn from_toml() -> AppResult<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let mut config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => Self::parse(&config_str)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Config::default(),
            Err(e) => {
                return Err(AppError::ConfigError(format!(
                    "Cannot read config file {config_path}: {e}"
                )));
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn parse(config_str: &str) -> AppResult<Self> {
        toml::from_str(config_str)
            .map_err(|e| AppError::ConfigError(format!("Failed to parse config file: {e}")))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("APP_ENV")
            && let Ok(e) = v.parse()
        {
            self.app.environment = e;
        }
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            self.server.port = p;
        }
        if let Ok(v) = env::var("STATIC_DIR") {
            self.server.static_dir = v;
        }
        if let Ok(v) = env::var("ALLOWED_ORIGINS") {
            self.server.allowed_origins = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            self.database.max_connections = mc;
        }
        if let Ok(v) = env::var("SESSION_SECRET")
            && !v.is_empty()
        {
            self.session.secret = v;
        }
        if let Ok(v) = env::var("STUDENT_EMAIL_SUFFIX") {
            self.verification.email_suffix = v;
        }
        if let Ok(v) = env::var("VERIFICATION_CODE_TTL_MINUTES")
            && let Ok(n) = v.parse()
        {
            self.verification.code_ttl_minutes = n;
        }
        if let Ok(v) = env::var("VERIFICATION_MAX_ATTEMPTS")
            && let Ok(n) = v.parse()
        {
            self.verification.max_attempts = Some(n);
        }
        if let Ok(v) = env::var("RESEND_API_KEY") {
            self.resend.api_key = Some(v);
        }
        if let Ok(v) = env::var("RESEND_FROM_EMAIL") {
            self.resend.from_email = v;
        }
        if let Ok(v) = env::var("AWS_REGION") {
            self.ses.region = Some(v);
        }
        if let Ok(v) = env::var("AWS_ACCESS_KEY_ID") {
            self.ses.access_key_id = Some(v);
        }
        if let Ok(v) = env::var("AWS_SECRET_ACCESS_KEY") {
            self.ses.secret_access_key = Some(v);
        }
        if let Ok(v) = env::var("SES_FROM_EMAIL") {
            self.ses.from_email = Some(v);
        }
        if let Ok(v) = env::var("AWS_SESSION_TOKEN") {
            self.ses.session_token = Some(v);
        }
    }

    pub fn is_production(&self) -> bool {
        self.app.environment.is_production()
    }

    /// Startup gate. Production must not run with the fallback secret, without
    /// a database, or without a mail provider.
    pub fn validate(&self) -> AppResult<()> {
        let suffix = self.verification.email_suffix.trim();
        if !suffix.starts_with('@') || suffix.len() < 2 {
            return Err(AppError::ConfigError(format!(
                "verification.email_suffix must look like '@domain', got '{suffix}'"
            )));
        }
        if self.verification.code_ttl_minutes <= 0 {
            return Err(AppError::ConfigError(
                "verification.code_ttl_minutes must be positive".to_string(),
            ));
        }
        if let Some(max) = self.verification.max_attempts
            && max <= 0
        {
            return Err(AppError::ConfigError(
                "verification.max_attempts must be positive when set".to_string(),
            ));
        }

        let insecure_secret =
            self.session.secret.is_empty() || self.session.secret == DEV_SESSION_SECRET;

        if !self.is_production() {
            if insecure_secret {
                log::warn!(
                    "Using the development session secret; set SESSION_SECRET before deploying"
                );
            }
            return Ok(());
        }

        if insecure_secret {
            return Err(AppError::ConfigError(
                "SESSION_SECRET must be set to a non-default value in production".to_string(),
            ));
        }
        if self.database.url.trim().is_empty() {
            return Err(AppError::ConfigError(
                "DATABASE_URL is required in production".to_string(),
            ));
        }
        if !self.resend.is_configured() && !self.ses.is_configured() {
            return Err(AppError::ConfigError(
                "Set RESEND_API_KEY (and optionally RESEND_FROM_EMAIL) or AWS SES env vars for email"
                    .to_string(),
            ));
        }
        Ok(())
    }
}
