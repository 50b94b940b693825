use std::env;

use thiserror::Error;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 3001;

/// ConfigError
///
/// Raised by `AppConfig::load` when the environment cannot produce a usable configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    Missing(&'static str),
    #[error("{name} is not a valid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// AppConfig
///
/// Holds the application's entire configuration state. Loaded once at startup and
/// shared by value through `AppState`; nothing reads the environment after `load` returns.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls log format and storage backend.
    pub env: Env,
    pub port: u16,
    // Postgres connection string. `None` in local mode selects the in-memory store.
    pub database_url: Option<String>,
    // One signing secret per token class.
    pub secrets: TokenSecrets,
    // Directory backing local image storage.
    pub upload_dir: String,
    // S3-compatible storage, used in production only.
    pub s3_endpoint: String,
    pub s3_region: String,
    pub s3_key: String,
    pub s3_secret: String,
    pub s3_bucket: String,
}

/// TokenSecrets
///
/// Independent HMAC secrets, one per token purpose, so a token minted for one
/// purpose never verifies under another.
#[derive(Clone, Debug)]
pub struct TokenSecrets {
    pub access: String,
    pub refresh: String,
    pub forgot_password: String,
    pub sign_up: String,
    pub change_email: String,
}

/// Env
///
/// Defines the runtime context: developer conveniences locally, mandatory secrets in production.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for TokenSecrets {
    fn default() -> Self {
        Self {
            access: "local-access-token-secret".to_string(),
            refresh: "local-refresh-token-secret".to_string(),
            forgot_password: "local-forgot-password-secret".to_string(),
            sign_up: "local-sign-up-secret".to_string(),
            change_email: "local-change-email-secret".to_string(),
        }
    }
}

impl Default for AppConfig {
    /// Safe, non-panicking values for test state setup.
    fn default() -> Self {
        Self {
            env: Env::Local,
            port: DEFAULT_PORT,
            database_url: None,
            secrets: TokenSecrets::default(),
            upload_dir: "uploads".to_string(),
            s3_endpoint: "http://localhost:9000".to_string(),
            s3_region: "us-east-1".to_string(),
            s3_key: "admin".to_string(),
            s3_secret: "password".to_string(),
            s3_bucket: "newsroom-test".to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads every parameter from environment variables. In `Env::Production` the
    /// database URL, all token secrets and the S3 credentials are mandatory; in
    /// `Env::Local` they fall back to development values.
    pub fn load() -> Result<Self, ConfigError> {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let port = match env::var("PORT") {
            Ok(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value,
            })?,
            Err(_) => DEFAULT_PORT,
        };

        let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());

        match env {
            Env::Local => {
                let defaults = TokenSecrets::default();
                let local = Self::default();
                Ok(Self {
                    env: Env::Local,
                    port,
                    database_url: env::var("DATABASE_URL").ok(),
                    secrets: TokenSecrets {
                        access: var_or("ACCESS_TOKEN_SECRET", defaults.access),
                        refresh: var_or("REFRESH_TOKEN_SECRET", defaults.refresh),
                        forgot_password: var_or("FORGOT_PASSWORD_SECRET", defaults.forgot_password),
                        sign_up: var_or("SIGN_UP_SECRET", defaults.sign_up),
                        change_email: var_or("CHANGE_EMAIL_SECRET", defaults.change_email),
                    },
                    upload_dir,
                    s3_endpoint: local.s3_endpoint,
                    s3_region: local.s3_region,
                    s3_key: local.s3_key,
                    s3_secret: local.s3_secret,
                    s3_bucket: "newsroom-uploads".to_string(),
                })
            }
            Env::Production => Ok(Self {
                env: Env::Production,
                port,
                database_url: Some(required("DATABASE_URL")?),
                secrets: TokenSecrets {
                    access: required("ACCESS_TOKEN_SECRET")?,
                    refresh: required("REFRESH_TOKEN_SECRET")?,
                    forgot_password: required("FORGOT_PASSWORD_SECRET")?,
                    sign_up: required("SIGN_UP_SECRET")?,
                    change_email: required("CHANGE_EMAIL_SECRET")?,
                },
                upload_dir,
                s3_endpoint: required("S3_ENDPOINT")?,
                s3_region: var_or("S3_REGION", "us-east-1".to_string()),
                s3_key: required("S3_ACCESS_KEY")?,
                s3_secret: required("S3_SECRET_KEY")?,
                s3_bucket: var_or("S3_BUCKET_NAME", "newsroom-uploads".to_string()),
            }),
        }
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn var_or(name: &str, fallback: String) -> String {
    env::var(name).unwrap_or(fallback)
}
