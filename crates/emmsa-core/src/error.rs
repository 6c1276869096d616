use thiserror::Error;

/// Errors raised while reading process configuration.
///
/// Configuration errors are fatal and are reported before any network call
/// is attempted.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
