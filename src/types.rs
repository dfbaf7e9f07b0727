// =============================================================================
// Shared types used across the Ticker Advisor service
// =============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single daily OHLCV bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Bars ordered strictly by ascending date. Missing trading days are simply
/// absent.
pub type Series = Vec<Bar>;

/// How much history the provider returns for a daily series request.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputSize {
    /// Latest 100 bars.
    Compact,
    /// Full available history.
    Full,
}

impl Default for OutputSize {
    fn default() -> Self {
        Self::Compact
    }
}

impl OutputSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Full => "full",
        }
    }

    /// Lenient parse used for query parameters; anything unknown falls back
    /// to `Compact`.
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()) {
            Some(s) if s == "full" => Self::Full,
            _ => Self::Compact,
        }
    }
}

impl std::fmt::Display for OutputSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite key that identifies one cached provider response.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct CacheKey {
    pub symbol: String,
    pub resolution: OutputSize,
}

impl CacheKey {
    pub fn new(symbol: impl Into<String>, resolution: OutputSize) -> Self {
        Self {
            symbol: symbol.into(),
            resolution,
        }
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.symbol, self.resolution)
    }
}
