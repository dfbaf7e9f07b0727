// =============================================================================
// Relative Strength Index (RSI): rolling-mean variant
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1. Daily deltas: d_i = close_i - close_{i-1}; the first bar has no
//          predecessor and contributes a zero delta.
// Step 2. gain_i = max(d_i, 0), loss_i = max(-d_i, 0).
// Step 3. avg_gain / avg_loss are plain trailing means over `period` bars
//          (not Wilder smoothing).
// Step 4. RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// Saturation: avg_loss == 0 with gains gives RSI 100; avg_gain == 0 with
// losses gives 0; no movement at all leaves RSI undefined.
//
// Thresholds:  RSI > 70 => OVERBOUGHT,  RSI < 30 => OVERSOLD.
// =============================================================================

use super::sma::sma_series;

pub const RSI_PERIOD: usize = 14;
pub const OVERBOUGHT: f64 = 70.0;
pub const OVERSOLD: f64 = 30.0;

/// Compute the RSI series for `closes`, one entry per input bar.
///
/// Entries are `None` until `period` deltas are available (the first bar's
/// zero delta counts), and wherever the window saw no movement.
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let deltas = std::iter::once(0.0).chain(closes.windows(2).map(|w| w[1] - w[0]));
    let (gains, losses): (Vec<f64>, Vec<f64>) = deltas
        .take(closes.len())
        .map(|d| (d.max(0.0), (-d).max(0.0)))
        .unzip();

    let avg_gain = sma_series(&gains, period);
    let avg_loss = sma_series(&losses, period);

    avg_gain
        .into_iter()
        .zip(avg_loss)
        .map(|(g, l)| rsi_from_averages(g?, l?))
        .collect()
}

/// Convert average gain / average loss into an RSI value in [0, 100].
///
/// Returns `None` when both averages are zero (0/0) or the result is
/// non-finite.
pub fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        return None;
    }

    let rsi = if avg_loss == 0.0 {
        100.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };

    rsi.is_finite().then_some(rsi)
}
