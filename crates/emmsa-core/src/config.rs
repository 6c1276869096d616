use crate::ConfigError;

/// Name of the environment variable holding the Pantry API key.
pub const PANTRY_API_KEY_VAR: &str = "PANTRY_API_KEY";

const DEFAULT_REQUEST_TIMEOUT_SECS: &str = "30";

/// Settings for the remote basket store.
///
/// Loaded once at startup and never mutated afterwards.
#[derive(Clone)]
pub struct StoreConfig {
    pub api_key: String,
    /// Overrides the production Pantry base URL when set.
    pub base_url: Option<String>,
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("api_key", &"[redacted]")
            .field("base_url", &self.base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// Settings for the EMMSA price scraper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScraperConfig {
    /// Overrides the provider's price table endpoint when set.
    pub endpoint_url: Option<String>,
    pub request_timeout_secs: u64,
}

/// Load the basket store configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns [`ConfigError::MissingEnvVar`] if `PANTRY_API_KEY` is unset or
/// empty, or [`ConfigError::InvalidEnvVar`] if an optional value is malformed.
pub fn load_store_config() -> Result<StoreConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_store_config_from_env()
}

/// Load the basket store configuration without touching `.env` files.
///
/// # Errors
///
/// Same as [`load_store_config`].
pub fn load_store_config_from_env() -> Result<StoreConfig, ConfigError> {
    build_store_config(|key| std::env::var(key))
}

/// Load the scraper configuration from environment variables.
///
/// Every scraper setting has a default, so this only fails on malformed
/// overrides.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] if `EMMSA_REQUEST_TIMEOUT_SECS` is
/// not a positive integer.
pub fn load_scraper_config() -> Result<ScraperConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_scraper_config_from_env()
}

/// Load the scraper configuration without touching `.env` files.
///
/// # Errors
///
/// Same as [`load_scraper_config`].
pub fn load_scraper_config_from_env() -> Result<ScraperConfig, ConfigError> {
    build_scraper_config(|key| std::env::var(key))
}

/// Build the store configuration from the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a
/// `HashMap` instead of `set_var`/`remove_var`.
fn build_store_config<F>(lookup: F) -> Result<StoreConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let api_key = lookup(PANTRY_API_KEY_VAR)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(PANTRY_API_KEY_VAR.to_string()))?;

    let base_url = optional(&lookup, "PANTRY_BASE_URL");
    let request_timeout_secs = parse_timeout(&lookup, "PANTRY_REQUEST_TIMEOUT_SECS")?;

    Ok(StoreConfig {
        api_key,
        base_url,
        request_timeout_secs,
    })
}

fn build_scraper_config<F>(lookup: F) -> Result<ScraperConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let endpoint_url = optional(&lookup, "EMMSA_ENDPOINT_URL");
    let request_timeout_secs = parse_timeout(&lookup, "EMMSA_REQUEST_TIMEOUT_SECS")?;

    Ok(ScraperConfig {
        endpoint_url,
        request_timeout_secs,
    })
}

fn optional<F>(lookup: &F, var: &str) -> Option<String>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    lookup(var).ok().filter(|v| !v.trim().is_empty())
}

fn parse_timeout<F>(lookup: &F, var: &str) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let raw = lookup(var).unwrap_or_else(|_| DEFAULT_REQUEST_TIMEOUT_SECS.to_string());
    let secs = raw
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })?;
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: "timeout must be greater than zero".to_string(),
        });
    }
    Ok(secs)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
