use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    /// Network, TLS, or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-2xx status.
    #[error("price table request failed with status {status}: {body}")]
    Upstream { status: u16, body: String },

    /// The response body is not usable as table markup.
    #[error("failed to parse price table: {reason}")]
    Parse { reason: String },

    #[error("invalid endpoint URL \"{url}\": {reason}")]
    InvalidEndpoint { url: String, reason: String },
}
