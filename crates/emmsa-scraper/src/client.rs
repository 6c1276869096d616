//! HTTP client for the EMMSA daily wholesale price report.
//!
//! The provider serves its price table through the same AJAX endpoint its
//! public report page uses, so the request has to look like that page's:
//! a form-encoded POST with the page's origin, referer, and a browser UA.

use std::time::{Duration, Instant};

use chrono::NaiveDate;
use emmsa_core::{PriceRecord, ScraperConfig};
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, ORIGIN, REFERER, USER_AGENT,
};
use reqwest::{Client, Url};

use crate::error::ScraperError;
use crate::parse::parse_price_table;

/// Fixed endpoint serving the daily price table.
pub const EMMSA_PRICES_URL: &str =
    "https://old.emmsa.com.pe/emmsa_spv/app/reportes/ajax/rpt07_gettable_new_web.php";

const EMMSA_ORIGIN: &str = "https://old.emmsa.com.pe";
const EMMSA_REFERER: &str =
    "https://old.emmsa.com.pe/emmsa_spv/rpEstadistica/rpt_precios-diarios-web.php";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";
const BROWSER_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.5 Safari/605.1.15";

/// Report type `1` is "daily prices".
const DAILY_PRICES_REPORT: &str = "1";

/// Client for the EMMSA price table endpoint.
///
/// Holds only its HTTP client and endpoint, both fixed at construction, so a
/// single instance can be shared across tasks.
pub struct EmmsaClient {
    client: Client,
    endpoint: Url,
}

impl EmmsaClient {
    /// Creates a client from loaded configuration. The production endpoint is
    /// used unless the configuration overrides it.
    ///
    /// # Errors
    ///
    /// Same as [`EmmsaClient::with_endpoint`].
    pub fn from_config(config: &ScraperConfig) -> Result<Self, ScraperError> {
        let endpoint = config.endpoint_url.as_deref().unwrap_or(EMMSA_PRICES_URL);
        Self::with_endpoint(endpoint, config.request_timeout_secs)
    }

    /// Creates a client with a custom endpoint (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`ScraperError::InvalidEndpoint`] if `endpoint` is not
    /// a valid URL.
    pub fn with_endpoint(endpoint: &str, timeout_secs: u64) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let endpoint = Url::parse(endpoint).map_err(|e| ScraperError::InvalidEndpoint {
            url: endpoint.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, endpoint })
    }

    /// Fetches and parses the price table for `date`.
    ///
    /// One POST is made per call and nothing is retried. An empty vector means
    /// the provider published no prices for that date.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::Http`] on network failure, timeout, or a body that
    ///   cannot be read.
    /// - [`ScraperError::Upstream`] on any non-2xx status, carrying the body.
    /// - [`ScraperError::Parse`] if the body ends inside a `<table` tag.
    pub async fn fetch_prices(&self, date: NaiveDate) -> Result<Vec<PriceRecord>, ScraperError> {
        let started = Instant::now();
        let result = self.fetch_prices_inner(date).await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match &result {
            Ok(prices) => tracing::debug!(
                %date,
                records = prices.len(),
                elapsed_ms,
                "price request succeeded"
            ),
            Err(e) => tracing::debug!(%date, error = %e, elapsed_ms, "price request failed"),
        }

        result
    }

    async fn fetch_prices_inner(&self, date: NaiveDate) -> Result<Vec<PriceRecord>, ScraperError> {
        let formatted = provider_date(date);
        tracing::debug!(date = %formatted, "fetching prices");

        let form = price_form(&formatted);
        let response = self
            .client
            .post(self.endpoint.clone())
            .form(&form)
            .headers(provider_headers())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ScraperError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        parse_price_table(&body, date)
    }
}

/// Formats a date the way the provider's form expects it: `DD/MM/YYYY`.
fn provider_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Form fields requesting daily prices for every product and variety.
fn price_form(formatted_date: &str) -> [(&'static str, &str); 4] {
    [
        ("vid_tipo", DAILY_PRICES_REPORT),
        ("vprod", ""),
        ("vvari", ""),
        ("vfecha", formatted_date),
    ]
}

/// Headers the provider requires; they replace the ones `form()` sets.
fn provider_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
    headers.insert(ACCEPT, HeaderValue::from_static("text/html, */*; q=0.01"));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-GB,en-US;q=0.9,en;q=0.8"),
    );
    headers.insert(ORIGIN, HeaderValue::from_static(EMMSA_ORIGIN));
    headers.insert(REFERER, HeaderValue::from_static(EMMSA_REFERER));
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_UA));
    headers
}
