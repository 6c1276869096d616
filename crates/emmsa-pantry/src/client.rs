//! HTTP client for the Pantry JSON basket store.
//!
//! Every basket lives under `<base>/<api key>/basket/<name>`. Non-OK responses
//! are surfaced as [`PantryError::Api`] carrying Pantry's `message` when the
//! body holds one, or the HTTP status line otherwise.

use std::time::{Duration, Instant};

use emmsa_core::StoreConfig;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::PantryError;

pub const DEFAULT_BASE_URL: &str = "https://getpantry.cloud/apiv1/pantry";

/// Error body shape Pantry uses for failed requests.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

/// Client for one Pantry, addressed by its API key.
///
/// The base URL, key, and HTTP client are fixed at construction; every method
/// takes `&self` and makes exactly one request. Dropping a returned future
/// aborts its request, so callers bound calls with `tokio::time::timeout` or
/// `tokio::select!`.
pub struct PantryClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl std::fmt::Debug for PantryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PantryClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[redacted]")
            .finish_non_exhaustive()
    }
}

impl PantryClient {
    /// Creates a client pointed at the production Pantry API.
    ///
    /// # Errors
    ///
    /// Returns [`PantryError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, PantryError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client from loaded store configuration.
    ///
    /// # Errors
    ///
    /// Same as [`PantryClient::with_base_url`].
    pub fn from_config(config: &StoreConfig) -> Result<Self, PantryError> {
        let base_url = config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        Self::with_base_url(&config.api_key, config.request_timeout_secs, base_url)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PantryError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`PantryError::InvalidBaseUrl`] if `base_url` is not an
    /// absolute hierarchical URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, PantryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("emmsa-price-tracker/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let parsed = Url::parse(base_url).map_err(|e| PantryError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(PantryError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: "URL cannot carry a path".to_string(),
            });
        }

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url: parsed,
        })
    }

    /// Reports whether basket `name` exists.
    ///
    /// Only an exact `200 OK` counts as existing; any other status, 404
    /// included, yields `false`.
    ///
    /// # Errors
    ///
    /// Returns [`PantryError::Http`] on network failure or timeout, which is
    /// distinct from a basket that does not exist.
    pub async fn exists(&self, name: &str) -> Result<bool, PantryError> {
        let started = Instant::now();
        let result = self.exists_inner(name).await;
        log_operation("exists", name, started, &result);
        result
    }

    async fn exists_inner(&self, name: &str) -> Result<bool, PantryError> {
        let url = self.basket_url(name)?;
        let response = self.client.get(url).send().await?;
        Ok(response.status() == StatusCode::OK)
    }

    /// Creates an empty basket named `name`.
    ///
    /// # Errors
    ///
    /// - [`PantryError::Api`] if Pantry rejects the request, e.g. because the
    ///   basket already exists.
    /// - [`PantryError::Http`] on network failure or timeout.
    pub async fn create(&self, name: &str) -> Result<(), PantryError> {
        let started = Instant::now();
        let result = self.create_inner(name).await;
        log_operation("create", name, started, &result);
        result
    }

    async fn create_inner(&self, name: &str) -> Result<(), PantryError> {
        let url = self.basket_url(name)?;
        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?;
        Self::expect_ok(response, &format!("create basket {name}")).await?;
        Ok(())
    }

    /// Replaces the contents of basket `name` with `payload`.
    ///
    /// Pantry creates the basket if it is absent.
    ///
    /// # Errors
    ///
    /// - [`PantryError::Serialize`] if `payload` cannot be encoded as JSON.
    /// - [`PantryError::Api`] if Pantry rejects the request.
    /// - [`PantryError::Http`] on network failure or timeout.
    pub async fn update<T>(&self, name: &str, payload: &T) -> Result<(), PantryError>
    where
        T: Serialize + ?Sized,
    {
        let started = Instant::now();
        let result = self.update_inner(name, payload).await;
        log_operation("update", name, started, &result);
        result
    }

    async fn update_inner<T>(&self, name: &str, payload: &T) -> Result<(), PantryError>
    where
        T: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(payload).map_err(|e| PantryError::Serialize {
            context: format!("update basket {name}"),
            source: e,
        })?;

        let url = self.basket_url(name)?;
        let response = self
            .client
            .put(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        Self::expect_ok(response, &format!("update basket {name}")).await?;
        Ok(())
    }

    /// Fetches basket `name` and decodes it into `T`.
    ///
    /// Use `serde_json::Value` or a map type when the shape is not known.
    ///
    /// # Errors
    ///
    /// - [`PantryError::Api`] if Pantry answers with a non-OK status.
    /// - [`PantryError::Deserialize`] if the body is not JSON of shape `T`.
    /// - [`PantryError::Http`] on network failure or timeout.
    pub async fn get<T: DeserializeOwned>(&self, name: &str) -> Result<T, PantryError> {
        let started = Instant::now();
        let result = self.get_inner(name).await;
        log_operation("get", name, started, &result);
        result
    }

    async fn get_inner<T: DeserializeOwned>(&self, name: &str) -> Result<T, PantryError> {
        let url = self.basket_url(name)?;
        let response = self.client.get(url).send().await?;
        let body = Self::expect_ok(response, &format!("get basket {name}")).await?;
        serde_json::from_str::<T>(&body).map_err(|e| PantryError::Deserialize {
            context: format!("basket {name}"),
            source: e,
        })
    }

    /// Lists the names of all baskets in the pantry.
    ///
    /// # Errors
    ///
    /// - [`PantryError::Api`] if Pantry answers with a non-OK status.
    /// - [`PantryError::Deserialize`] if the body is not a JSON array of names.
    /// - [`PantryError::Http`] on network failure or timeout.
    pub async fn list(&self) -> Result<Vec<String>, PantryError> {
        let started = Instant::now();
        let result = self.list_inner().await;
        log_operation("list", "*", started, &result);
        result
    }

    async fn list_inner(&self) -> Result<Vec<String>, PantryError> {
        let url = self.pantry_url(&["baskets"])?;
        let response = self.client.get(url).send().await?;
        let body = Self::expect_ok(response, "list baskets").await?;
        serde_json::from_str::<Vec<String>>(&body).map_err(|e| PantryError::Deserialize {
            context: "basket list".to_string(),
            source: e,
        })
    }

    /// Deletes basket `name`.
    ///
    /// # Errors
    ///
    /// - [`PantryError::Api`] if Pantry rejects the request, e.g. because the
    ///   basket does not exist.
    /// - [`PantryError::Http`] on network failure or timeout.
    pub async fn delete(&self, name: &str) -> Result<(), PantryError> {
        let started = Instant::now();
        let result = self.delete_inner(name).await;
        log_operation("delete", name, started, &result);
        result
    }

    async fn delete_inner(&self, name: &str) -> Result<(), PantryError> {
        let url = self.basket_url(name)?;
        let response = self.client.delete(url).send().await?;
        Self::expect_ok(response, &format!("delete basket {name}")).await?;
        Ok(())
    }

    fn basket_url(&self, name: &str) -> Result<Url, PantryError> {
        self.pantry_url(&["basket", name])
    }

    /// Builds `<base>/<api key>/<segments...>`, percent-encoding each segment.
    fn pantry_url(&self, segments: &[&str]) -> Result<Url, PantryError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| PantryError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .push(&self.api_key)
            .extend(segments);
        Ok(url)
    }

    /// Returns the response body when the status is `200 OK`, otherwise an
    /// [`PantryError::Api`] built from the body's `message` or the status line.
    async fn expect_ok(response: Response, operation: &str) -> Result<String, PantryError> {
        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::OK {
            return Ok(body);
        }

        Err(PantryError::Api {
            operation: operation.to_owned(),
            message: error_message(status, &body),
        })
    }
}

/// Picks the provider's `message` when `body` decodes as `{"message": ...}`,
/// falling back to the status line (e.g. `"400 Bad Request"`).
fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(err) => err.message,
        Err(_) => status.to_string(),
    }
}

fn log_operation<T>(
    operation: &str,
    basket: &str,
    started: Instant,
    result: &Result<T, PantryError>,
) {
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    match result {
        Ok(_) => tracing::debug!(operation, basket, elapsed_ms, "pantry operation succeeded"),
        Err(e) => tracing::debug!(
            operation,
            basket,
            elapsed_ms,
            error = %e,
            "pantry operation failed"
        ),
    }
}
