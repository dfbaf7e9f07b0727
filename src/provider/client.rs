// =============================================================================
// Alpha Vantage REST client: timed GETs with bounded retries
// =============================================================================
//
// Every call is a single GET against `/query`. The API key travels as a query
// parameter (the provider requires it) and is never logged or printed by the
// Debug impl. Gateway errors (502/503/504) are retried per `RetryPolicy`; any
// other failure is returned immediately as `AdvisorError::Fetch`.
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use super::retry::RetryPolicy;
use super::{FetchRequest, MarketDataSource, RawResponse};
use crate::error::{AdvisorError, AdvisorResult};
use crate::runtime_config::ServiceConfig;

/// Alpha Vantage REST client.
#[derive(Clone)]
pub struct AlphaVantageClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
    retry: RetryPolicy,
    series_timeout: Duration,
    quote_timeout: Duration,
}

impl AlphaVantageClient {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Build a client from the service configuration.
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("failed to build reqwest client")?;

        debug!(base_url = %config.base_url, "AlphaVantageClient initialised");

        Ok(Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            retry: RetryPolicy::new(config.max_retries, config.backoff_base()),
            series_timeout: config.series_timeout(),
            quote_timeout: config.quote_timeout(),
        })
    }

    /// Quotes get the short timeout; series and indicators the long one.
    fn timeout_for(&self, request: &FetchRequest) -> Duration {
        if request.is_quote() {
            self.quote_timeout
        } else {
            self.series_timeout
        }
    }

    // -------------------------------------------------------------------------
    // Request loop
    // -------------------------------------------------------------------------

    #[instrument(
        skip(self, request),
        name = "alphavantage::fetch",
        fields(function = request.function(), symbol = request.symbol())
    )]
    async fn fetch_with_retry(&self, request: &FetchRequest) -> AdvisorResult<RawResponse> {
        let url = format!("{}/query", self.base_url);
        let mut params = request.query_params();
        params.push(("apikey", self.api_key.clone()));
        let timeout = self.timeout_for(request);
        let function = request.function();

        let mut retry = 0u32;
        loop {
            let resp = self
                .client
                .get(&url)
                .query(&params)
                .timeout(timeout)
                .send()
                .await
                .map_err(|e| AdvisorError::Fetch(format!("GET {function} request failed: {e}")))?;

            let status = resp.status();

            if RetryPolicy::is_retryable(status) {
                match self.retry.delay_for(retry) {
                    Some(delay) => {
                        warn!(
                            %status,
                            attempt = retry + 1,
                            delay_ms = delay.as_millis() as u64,
                            "transient upstream error, backing off"
                        );
                        tokio::time::sleep(delay).await;
                        retry += 1;
                        continue;
                    }
                    None => {
                        return Err(AdvisorError::Fetch(format!(
                            "GET {function} returned {status} after {retry} retries"
                        )));
                    }
                }
            }

            let body = resp
                .text()
                .await
                .map_err(|e| AdvisorError::Fetch(format!("failed to read {function} response: {e}")))?;

            if !status.is_success() {
                return Err(AdvisorError::Fetch(format!(
                    "GET {function} returned {status}: {body}"
                )));
            }

            let value: RawResponse = serde_json::from_str(&body).map_err(|e| {
                AdvisorError::Fetch(format!("failed to parse {function} response: {e}"))
            })?;

            debug!(retries = retry, "upstream response received");
            return Ok(value);
        }
    }
}

#[async_trait]
impl MarketDataSource for AlphaVantageClient {
    async fn fetch(&self, request: &FetchRequest) -> AdvisorResult<RawResponse> {
        self.fetch_with_retry(request).await
    }
}

impl std::fmt::Debug for AlphaVantageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlphaVantageClient")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("retry", &self.retry)
            .finish()
    }
}
