// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators feeding the
// recommendation engine. Every series has one entry per input bar; windowed
// indicators use `Option<f64>` for bars without enough history.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod snapshot;

pub use snapshot::{compute, IndicatorSnapshot};
