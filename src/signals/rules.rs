// =============================================================================
// Scoring Rules: independent evaluators over the last two snapshots
// =============================================================================
//
// Each rule looks at (previous, latest) and either stays silent or returns a
// score delta with the signal that explains it. Rules never see each other's
// output; the engine applies them in the fixed order of `RULES`.
//
// Comparisons against an undefined indicator never fire.
// =============================================================================

use serde::{Serialize, Serializer};

use crate::indicators::rsi::{OVERBOUGHT, OVERSOLD};
use crate::indicators::IndicatorSnapshot;

/// Volume must exceed its moving average by this factor to be flagged.
pub const VOLUME_SPIKE_FACTOR: f64 = 1.5;

/// One triggered rule, rendered as a human-readable tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Uptrend,
    Downtrend,
    MacdBullishCross,
    MacdBearishCross,
    Oversold,
    Overbought,
    BelowLowerBand,
    AboveUpperBand,
    VolumeAboveAverage,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uptrend => "uptrend",
            Self::Downtrend => "downtrend",
            Self::MacdBullishCross => "MACD bullish cross",
            Self::MacdBearishCross => "MACD bearish cross",
            Self::Oversold => "oversold",
            Self::Overbought => "overbought",
            Self::BelowLowerBand => "below lower band",
            Self::AboveUpperBand => "above upper band",
            Self::VolumeAboveAverage => "volume above average",
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Signal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// The two bars every rule is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotPair<'a> {
    pub previous: &'a IndicatorSnapshot,
    pub latest: &'a IndicatorSnapshot,
}

pub type Rule = fn(&SnapshotPair<'_>) -> Option<(i32, Signal)>;

/// Evaluation order is part of the output contract.
pub const RULES: [Rule; 5] = [trend, macd_cross, rsi_extreme, bollinger_break, volume_spike];

/// close > SMA20 > SMA50 is an uptrend; the mirror is a downtrend.
pub fn trend(pair: &SnapshotPair<'_>) -> Option<(i32, Signal)> {
    let latest = pair.latest;
    let close = latest.bar.close;
    let (sma_20, sma_50) = (latest.sma_20?, latest.sma_50?);

    if close > sma_20 && sma_20 > sma_50 {
        Some((2, Signal::Uptrend))
    } else if close < sma_20 && sma_20 < sma_50 {
        Some((-2, Signal::Downtrend))
    } else {
        None
    }
}

/// MACD crossing its signal line between the previous and latest bar.
pub fn macd_cross(pair: &SnapshotPair<'_>) -> Option<(i32, Signal)> {
    let (prev, latest) = (pair.previous, pair.latest);

    if latest.macd > latest.signal && prev.macd <= prev.signal {
        Some((2, Signal::MacdBullishCross))
    } else if latest.macd < latest.signal && prev.macd >= prev.signal {
        Some((-2, Signal::MacdBearishCross))
    } else {
        None
    }
}

pub fn rsi_extreme(pair: &SnapshotPair<'_>) -> Option<(i32, Signal)> {
    let rsi = pair.latest.rsi?;

    if rsi < OVERSOLD {
        Some((1, Signal::Oversold))
    } else if rsi > OVERBOUGHT {
        Some((-1, Signal::Overbought))
    } else {
        None
    }
}

pub fn bollinger_break(pair: &SnapshotPair<'_>) -> Option<(i32, Signal)> {
    let latest = pair.latest;
    let close = latest.bar.close;

    if latest.bb_lower.is_some_and(|lower| close < lower) {
        Some((1, Signal::BelowLowerBand))
    } else if latest.bb_upper.is_some_and(|upper| close > upper) {
        Some((-1, Signal::AboveUpperBand))
    } else {
        None
    }
}

/// Informational only: contributes no score.
pub fn volume_spike(pair: &SnapshotPair<'_>) -> Option<(i32, Signal)> {
    let latest = pair.latest;
    let volume_ma = latest.volume_ma?;

    (latest.bar.volume > volume_ma * VOLUME_SPIKE_FACTOR).then_some((0, Signal::VolumeAboveAverage))
}
