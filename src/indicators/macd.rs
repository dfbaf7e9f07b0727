// =============================================================================
// MACD: Moving Average Convergence/Divergence
// =============================================================================
//
//   MACD   = EMA(fast) - EMA(slow)
//   Signal = EMA(MACD, signal_span)
//
// Both lines are defined from the first bar because the underlying EMAs are.
// =============================================================================

use super::ema::calculate_ema;

pub const FAST_SPAN: usize = 12;
pub const SLOW_SPAN: usize = 26;
pub const SIGNAL_SPAN: usize = 9;

#[derive(Debug, Clone, Default)]
pub struct MacdSeries {
    pub ema_fast: Vec<f64>,
    pub ema_slow: Vec<f64>,
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
}

/// Compute the standard 12/26/9 MACD for `closes`.
pub fn calculate_macd(closes: &[f64]) -> MacdSeries {
    let ema_fast = calculate_ema(closes, FAST_SPAN);
    let ema_slow = calculate_ema(closes, SLOW_SPAN);
    let macd: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(fast, slow)| fast - slow)
        .collect();
    let signal = calculate_ema(&macd, SIGNAL_SPAN);

    MacdSeries {
        ema_fast,
        ema_slow,
        macd,
        signal,
    }
}
