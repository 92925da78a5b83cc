//! Environment configuration.

use std::path::PathBuf;

use crate::error::AppError;

/// Server configuration, read once at startup. Missing required variables
/// fail fast before anything binds or connects.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Postgres connection string.
    pub database_url: String,
    /// Free-tier generations per calendar month.
    pub free_tier_quota: u32,
    /// OpenAI-compatible API root for both providers.
    pub llm_base_url: String,
    /// Bearer token for the providers; optional for local servers.
    pub llm_api_key: Option<String>,
    /// Text model name.
    pub llm_model: String,
    /// Image model name.
    pub image_model: String,
    /// Stripe secret key.
    pub stripe_secret_key: String,
    /// Upgrade price in cents.
    pub stripe_price_cents: u32,
    /// Optional persona catalog override; the embedded catalog is used
    /// when unset.
    pub persona_catalog: Option<PathBuf>,
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

fn required(name: &str) -> Result<String, AppError> {
    optional(name).ok_or_else(|| AppError::Config(format!("{name} must be set")))
}

fn parsed<T: std::str::FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match optional(name) {
        Some(raw) => raw
            .parse()
            .map_err(|_| AppError::Config(format!("{name} is not valid: {raw:?}"))),
        None => Ok(default),
    }
}

impl Config {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when a required variable is missing or a
    /// numeric variable fails to parse.
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            host: optional("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parsed("PORT", 3000)?,
            database_url: required("DATABASE_URL")?,
            free_tier_quota: parsed("FREE_TIER_QUOTA", 3)?,
            llm_base_url: optional("LLM_BASE_URL")
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            llm_api_key: optional("LLM_API_KEY"),
            llm_model: optional("LLM_MODEL").unwrap_or_else(|| "gpt-5.1".to_string()),
            image_model: optional("IMAGE_MODEL").unwrap_or_else(|| "gpt-image-1".to_string()),
            stripe_secret_key: required("STRIPE_SECRET_KEY")?,
            stripe_price_cents: parsed("STRIPE_PRICE_CENTS", 900)?,
            persona_catalog: optional("PERSONA_CATALOG").map(PathBuf::from),
        })
    }
}
