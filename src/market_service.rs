// =============================================================================
// Market Service: request-level orchestration
// =============================================================================
//
// Daily series go through the staleness cache; quotes and provider-side
// indicator lookups go straight to the source. Each operation returns either
// its payload or an `AdvisorError`; nothing here panics on upstream content.
// =============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::cache::StalenessCache;
use crate::error::{AdvisorError, AdvisorResult};
use crate::indicators::{compute, IndicatorSnapshot};
use crate::provider::parse::{self, DAILY_SERIES_KEY};
use crate::provider::{FetchRequest, MarketDataSource, RawResponse};
use crate::signals::{recommend, Recommendation};
use crate::types::OutputSize;

/// One entry of a batch-quotes answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BatchQuote {
    Price { price: f64, date: NaiveDate },
    Error { error: String },
}

pub struct MarketService {
    source: Arc<dyn MarketDataSource>,
    cache: StalenessCache,
}

/// Symbols are matched case-insensitively upstream; cache keys use the
/// upper-case form. Only ticker characters (`A-Z 0-9 . - ^`) are accepted,
/// since the symbol ends up in cache file names.
pub fn normalize_symbol(symbol: &str) -> AdvisorResult<String> {
    let symbol = symbol.trim();
    let valid = !symbol.is_empty()
        && symbol != "."
        && symbol != ".."
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^'));
    if !valid {
        return Err(AdvisorError::DataUnavailable(format!("invalid symbol {symbol:?}")));
    }
    Ok(symbol.to_ascii_uppercase())
}

impl MarketService {
    pub fn new(source: Arc<dyn MarketDataSource>, cache: StalenessCache) -> Self {
        Self { source, cache }
    }

    /// Raw daily series, served from cache while fresh.
    pub async fn historical(&self, symbol: &str, output_size: OutputSize) -> AdvisorResult<RawResponse> {
        let payload = self
            .cache
            .get_or_refresh(&normalize_symbol(symbol)?, output_size)
            .await?;
        parse::require_key(&payload, DAILY_SERIES_KEY)?;
        Ok(payload)
    }

    /// Latest quote, always fetched live.
    pub async fn quote(&self, symbol: &str) -> AdvisorResult<RawResponse> {
        self.fetch_checked(FetchRequest::quote(normalize_symbol(symbol)?))
            .await
    }

    /// Provider-computed indicator (RSI, SMA, MACD, ...), always fetched live.
    pub async fn indicator(&self, symbol: &str, function: &str) -> AdvisorResult<RawResponse> {
        self.fetch_checked(FetchRequest::indicator(normalize_symbol(symbol)?, function))
            .await
    }

    async fn fetch_checked(&self, request: FetchRequest) -> AdvisorResult<RawResponse> {
        let payload = self.source.fetch(&request).await?;
        parse::require_key(&payload, &request.expected_key())?;
        Ok(payload)
    }

    /// Locally computed indicator snapshots over the compact daily series.
    pub async fn snapshots(&self, symbol: &str) -> AdvisorResult<Vec<IndicatorSnapshot>> {
        let payload = self
            .cache
            .get_or_refresh(&normalize_symbol(symbol)?, OutputSize::Compact)
            .await?;
        let series = parse::parse_daily_series(&payload)?;
        Ok(compute(&series))
    }

    #[instrument(skip(self), name = "market_service::recommendation")]
    pub async fn recommendation(&self, symbol: &str) -> AdvisorResult<Recommendation> {
        let symbol = normalize_symbol(symbol)?;
        let snapshots = self.snapshots(&symbol).await?;
        let rec = recommend(&symbol, &snapshots)?;
        info!(
            symbol = %rec.symbol,
            label = %rec.label,
            score = rec.score,
            confidence = rec.confidence,
            "recommendation generated"
        );
        Ok(rec)
    }

    /// Latest close per symbol. Symbols are processed one after another and
    /// each gets exactly one entry, keyed as the caller spelled it.
    pub async fn batch_quotes(&self, symbols: &[String]) -> BTreeMap<String, BatchQuote> {
        let mut results = BTreeMap::new();

        for symbol in symbols {
            let quote = match self.latest_close(symbol).await {
                Ok((date, price)) => BatchQuote::Price { price, date },
                Err(e) => {
                    debug!(%symbol, error = %e, "batch quote unavailable");
                    BatchQuote::Error { error: e.to_string() }
                }
            };
            results.insert(symbol.clone(), quote);
        }

        results
    }

    async fn latest_close(&self, symbol: &str) -> AdvisorResult<(NaiveDate, f64)> {
        let payload = self
            .cache
            .get_or_refresh(&normalize_symbol(symbol)?, OutputSize::Compact)
            .await?;
        parse::latest_close(&payload)
    }
}
