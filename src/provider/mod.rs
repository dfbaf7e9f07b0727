// =============================================================================
// Upstream market-data provider
// =============================================================================
//
// The provider is an opaque JSON source. Everything above this module talks
// to it through `MarketDataSource`, which lets the cache and the service be
// exercised against in-memory fakes.

pub mod client;
#[cfg(test)]
pub mod mock;
pub mod parse;
pub mod retry;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AdvisorResult;
use crate::types::OutputSize;

pub use client::AlphaVantageClient;

/// Interval used for indicator lookups.
pub const DEFAULT_INTERVAL: &str = "daily";
/// Look-back passed to provider-side indicator lookups.
pub const INDICATOR_TIME_PERIOD: u32 = 14;

/// Raw provider response, kept verbatim.
pub type RawResponse = Value;

/// One logical call against the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    DailySeries {
        symbol: String,
        output_size: OutputSize,
    },
    GlobalQuote {
        symbol: String,
    },
    Indicator {
        symbol: String,
        function: String,
        interval: String,
    },
}

impl FetchRequest {
    pub fn daily(symbol: impl Into<String>, output_size: OutputSize) -> Self {
        Self::DailySeries {
            symbol: symbol.into(),
            output_size,
        }
    }

    pub fn quote(symbol: impl Into<String>) -> Self {
        Self::GlobalQuote {
            symbol: symbol.into(),
        }
    }

    pub fn indicator(symbol: impl Into<String>, function: impl Into<String>) -> Self {
        Self::Indicator {
            symbol: symbol.into(),
            function: function.into().to_ascii_uppercase(),
            interval: DEFAULT_INTERVAL.to_string(),
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            Self::DailySeries { symbol, .. }
            | Self::GlobalQuote { symbol }
            | Self::Indicator { symbol, .. } => symbol,
        }
    }

    /// Provider `function=` value.
    pub fn function(&self) -> &str {
        match self {
            Self::DailySeries { .. } => "TIME_SERIES_DAILY",
            Self::GlobalQuote { .. } => "GLOBAL_QUOTE",
            Self::Indicator { function, .. } => function,
        }
    }

    pub fn is_quote(&self) -> bool {
        matches!(self, Self::GlobalQuote { .. })
    }

    /// Query parameters, excluding the API key.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("function", self.function().to_string()),
            ("symbol", self.symbol().to_string()),
        ];
        match self {
            Self::DailySeries { output_size, .. } => {
                params.push(("outputsize", output_size.as_str().to_string()));
                params.push(("datatype", "json".to_string()));
            }
            Self::GlobalQuote { .. } => {}
            Self::Indicator { interval, .. } => {
                params.push(("interval", interval.clone()));
                params.push(("time_period", INDICATOR_TIME_PERIOD.to_string()));
                params.push(("series_type", "close".to_string()));
            }
        }
        params
    }

    /// Top-level key a usable response must carry.
    pub fn expected_key(&self) -> String {
        match self {
            Self::DailySeries { .. } => parse::DAILY_SERIES_KEY.to_string(),
            Self::GlobalQuote { .. } => parse::GLOBAL_QUOTE_KEY.to_string(),
            Self::Indicator { function, .. } => format!("Technical Analysis: {function}"),
        }
    }
}

#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Perform one logical fetch, including any retries. Every failure comes
    /// back as `AdvisorError::Fetch`.
    async fn fetch(&self, request: &FetchRequest) -> AdvisorResult<RawResponse>;
}
