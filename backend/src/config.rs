use std::env;

/// Application configuration loaded from environment variables.
///
/// Constructed once at process start and passed into the clients and the
/// dispatcher; a missing required variable aborts startup before any work
/// is attempted.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host (default: 0.0.0.0)
    pub host: String,
    /// Server port (default: 8080)
    pub port: u16,
    /// Supabase project URL
    pub supabase_url: String,
    /// Supabase service-role key (privileged: table reads + auth admin)
    pub supabase_service_role_key: String,
    /// SendGrid API key
    pub sendgrid_api_key: String,
    /// Sender address for outbound report mail
    pub sender_email: String,
    /// SendGrid API base URL (default: https://api.sendgrid.com)
    pub sendgrid_base_url: String,
    /// Log level (default: info)
    pub log_level: String,
    /// CORS allowed origins (comma-separated, default: *)
    pub cors_origins: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidPort)?,
            supabase_url: env::var("SUPABASE_URL")
                .map_err(|_| ConfigError::MissingEnvVar("SUPABASE_URL"))?,
            supabase_service_role_key: env::var("SUPABASE_SERVICE_ROLE_KEY")
                .map_err(|_| ConfigError::MissingEnvVar("SUPABASE_SERVICE_ROLE_KEY"))?,
            sendgrid_api_key: env::var("SENDGRID_API_KEY")
                .map_err(|_| ConfigError::MissingEnvVar("SENDGRID_API_KEY"))?,
            sender_email: env::var("SENDER_EMAIL")
                .map_err(|_| ConfigError::MissingEnvVar("SENDER_EMAIL"))?,
            sendgrid_base_url: env::var("SENDGRID_BASE_URL")
                .unwrap_or_else(|_| "https://api.sendgrid.com".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            cors_origins: env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string()),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),
    #[error("Invalid port number")]
    InvalidPort,
}
