// In-memory provider used by cache and service tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};

use super::{FetchRequest, MarketDataSource, RawResponse};
use crate::error::{AdvisorError, AdvisorResult};

/// Canned responses keyed by symbol, with a call counter.
#[derive(Default)]
pub struct MockSource {
    responses: Mutex<HashMap<String, AdvisorResult<RawResponse>>>,
    requests: Mutex<Vec<FetchRequest>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn respond(&self, symbol: &str, response: AdvisorResult<RawResponse>) {
        self.responses.lock().insert(symbol.to_string(), response);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl MarketDataSource for MockSource {
    async fn fetch(&self, request: &FetchRequest) -> AdvisorResult<RawResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.responses
            .lock()
            .get(request.symbol())
            .cloned()
            .unwrap_or_else(|| Err(AdvisorError::Fetch(format!("no canned response for {}", request.symbol()))))
    }
}

/// Provider-shaped daily series with one bar per consecutive day.
pub fn daily_payload(closes: &[f64]) -> Value {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut container = Map::new();
    for (i, close) in closes.iter().enumerate() {
        let date = start + chrono::Days::new(i as u64);
        container.insert(
            date.format("%Y-%m-%d").to_string(),
            json!({
                "1. open": format!("{close:.4}"),
                "2. high": format!("{:.4}", close + 1.0),
                "3. low": format!("{:.4}", close - 1.0),
                "4. close": format!("{close:.4}"),
                "5. volume": "1000000",
            }),
        );
    }
    json!({
        "Meta Data": {"1. Information": "Daily Prices"},
        "Time Series (Daily)": Value::Object(container),
    })
}
