// =============================================================================
// Provider response parsing
// =============================================================================
//
// Daily series arrive as an object keyed by `YYYY-MM-DD`, each value holding
// string-encoded decimals under numbered keys ("1. open" .. "5. volume").
// When the provider has nothing to give it answers 200 with an informational
// body instead ("Error Message", "Note" or "Information"), so absence of the
// expected top-level key is the unavailability signal.
// =============================================================================

use chrono::NaiveDate;
use serde_json::Value;

use crate::error::{AdvisorError, AdvisorResult};
use crate::types::{Bar, Series};

pub const DAILY_SERIES_KEY: &str = "Time Series (Daily)";
pub const GLOBAL_QUOTE_KEY: &str = "Global Quote";

const OPEN: &str = "1. open";
const HIGH: &str = "2. high";
const LOW: &str = "3. low";
const CLOSE: &str = "4. close";
const VOLUME: &str = "5. volume";

/// Keys the provider uses to explain an empty answer.
const NOTICE_KEYS: [&str; 3] = ["Error Message", "Note", "Information"];

/// Ensure `payload` carries `key`, otherwise report why not.
pub fn require_key<'a>(payload: &'a Value, key: &str) -> AdvisorResult<&'a Value> {
    payload.get(key).ok_or_else(|| {
        let notice = NOTICE_KEYS
            .iter()
            .find_map(|k| payload.get(*k).and_then(Value::as_str));
        match notice {
            Some(msg) => AdvisorError::DataUnavailable(format!("'{key}' missing: {msg}")),
            None => AdvisorError::DataUnavailable(format!("'{key}' missing")),
        }
    })
}

/// Parse the daily container into a date-ascending series.
pub fn parse_daily_series(payload: &Value) -> AdvisorResult<Series> {
    let container = require_key(payload, DAILY_SERIES_KEY)?
        .as_object()
        .ok_or_else(|| AdvisorError::DataUnavailable(format!("'{DAILY_SERIES_KEY}' is not an object")))?;

    let mut series = container
        .iter()
        .map(|(date, fields)| parse_bar(date, fields))
        .collect::<AdvisorResult<Series>>()?;

    series.sort_by_key(|bar| bar.date);
    Ok(series)
}

/// Latest date and close straight from the raw container.
pub fn latest_close(payload: &Value) -> AdvisorResult<(NaiveDate, f64)> {
    let series = parse_daily_series(payload)?;
    series
        .last()
        .map(|bar| (bar.date, bar.close))
        .ok_or_else(|| AdvisorError::DataUnavailable(format!("'{DAILY_SERIES_KEY}' is empty")))
}

fn parse_bar(date: &str, fields: &Value) -> AdvisorResult<Bar> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| AdvisorError::DataUnavailable(format!("bad bar date '{date}': {e}")))?;

    let field = |name: &str| -> AdvisorResult<f64> {
        let raw = fields
            .get(name)
            .ok_or_else(|| AdvisorError::DataUnavailable(format!("{date}: '{name}' missing")))?;
        parse_str_f64(raw)
            .ok_or_else(|| AdvisorError::DataUnavailable(format!("{date}: '{name}' is not a number: {raw}")))
    };

    Ok(Bar {
        date,
        open: field(OPEN)?,
        high: field(HIGH)?,
        low: field(LOW)?,
        close: field(CLOSE)?,
        volume: field(VOLUME)?,
    })
}

/// Parse a JSON value that may be either a string or a number into `f64`.
fn parse_str_f64(val: &Value) -> Option<f64> {
    let parsed = match val {
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}
