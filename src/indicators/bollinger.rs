// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ), where σ is the trailing sample standard
// deviation of closes over the same window.

use super::sma::{rolling_std_series, sma_series};

pub const BB_PERIOD: usize = 20;
pub const BB_NUM_STD: f64 = 2.0;

/// Bands for a single bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerResult {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Calculate Bollinger Bands for every bar of `closes`.
///
/// Entries are `None` until `period` closes are available.
pub fn calculate_bollinger(
    closes: &[f64],
    period: usize,
    num_std: f64,
) -> Vec<Option<BollingerResult>> {
    let middle = sma_series(closes, period);
    let std = rolling_std_series(closes, period);

    middle
        .into_iter()
        .zip(std)
        .map(|(m, s)| {
            let (middle, std_dev) = (m?, s?);
            let half_width = num_std * std_dev;
            Some(BollingerResult {
                upper: middle + half_width,
                middle,
                lower: middle - half_width,
            })
        })
        .collect()
}
