use thiserror::Error;

/// Errors returned by the Pantry basket client.
#[derive(Debug, Error)]
pub enum PantryError {
    /// Network, TLS, or timeout failure from the underlying HTTP client. The
    /// request URL is stripped, since its path carries the API key.
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    /// Pantry answered with a non-OK status. `message` is the provider's own
    /// message when the body carried one, else the HTTP status line.
    #[error("failed to {operation}: {message}")]
    Api { operation: String, message: String },

    /// The payload for an update could not be encoded as JSON.
    #[error("JSON serialization error for {context}: {source}")]
    Serialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl From<reqwest::Error> for PantryError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.without_url())
    }
}
