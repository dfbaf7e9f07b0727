// =============================================================================
// Indicator Snapshots: per-bar view of every derived indicator
// =============================================================================

use serde::Serialize;

use super::bollinger::{calculate_bollinger, BB_NUM_STD, BB_PERIOD};
use super::macd::calculate_macd;
use super::rsi::{calculate_rsi, RSI_PERIOD};
use super::sma::sma_series;
use crate::types::Bar;

pub const SMA_SHORT: usize = 20;
pub const SMA_LONG: usize = 50;
pub const VOLUME_MA_PERIOD: usize = 20;

/// One bar extended with its derived indicators. Windowed fields stay `None`
/// until enough history exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSnapshot {
    #[serde(flatten)]
    pub bar: Bar,
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub ema_12: f64,
    pub ema_26: f64,
    pub macd: f64,
    pub signal: f64,
    pub rsi: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_lower: Option<f64>,
    pub volume_ma: Option<f64>,
}

/// Derive snapshots for every bar of `series`. Pure; never fails.
pub fn compute(series: &[Bar]) -> Vec<IndicatorSnapshot> {
    let closes: Vec<f64> = series.iter().map(|b| b.close).collect();
    let volumes: Vec<f64> = series.iter().map(|b| b.volume).collect();

    let sma_20 = sma_series(&closes, SMA_SHORT);
    let sma_50 = sma_series(&closes, SMA_LONG);
    let macd = calculate_macd(&closes);
    let rsi = calculate_rsi(&closes, RSI_PERIOD);
    let bands = calculate_bollinger(&closes, BB_PERIOD, BB_NUM_STD);
    let volume_ma = sma_series(&volumes, VOLUME_MA_PERIOD);

    series
        .iter()
        .enumerate()
        .map(|(i, bar)| IndicatorSnapshot {
            bar: *bar,
            sma_20: sma_20[i],
            sma_50: sma_50[i],
            ema_12: macd.ema_fast[i],
            ema_26: macd.ema_slow[i],
            macd: macd.macd[i],
            signal: macd.signal[i],
            rsi: rsi[i],
            bb_middle: bands[i].map(|b| b.middle),
            bb_upper: bands[i].map(|b| b.upper),
            bb_lower: bands[i].map(|b| b.lower),
            volume_ma: volume_ma[i],
        })
        .collect()
}
