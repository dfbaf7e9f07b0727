// =============================================================================
// Error taxonomy
// =============================================================================
//
// Every failure that can reach a caller is one of three kinds. The HTTP layer
// renders all of them as `{"error": <message>, "kind": <kind>}`.
// =============================================================================

use serde_json::{json, Value};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdvisorError {
    /// Network failure, timeout, non-success status or malformed body.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// The response was well-formed but the expected payload is absent.
    #[error("data not available: {0}")]
    DataUnavailable(String),

    #[error("insufficient history: need {needed} bars, got {available}")]
    InsufficientHistory { needed: usize, available: usize },
}

impl AdvisorError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fetch(_) => "fetch",
            Self::DataUnavailable(_) => "data_unavailable",
            Self::InsufficientHistory { .. } => "insufficient_history",
        }
    }

    /// Uniform error payload returned by every endpoint.
    pub fn to_payload(&self) -> Value {
        json!({
            "error": self.to_string(),
            "kind": self.kind(),
        })
    }
}

pub type AdvisorResult<T> = std::result::Result<T, AdvisorError>;
