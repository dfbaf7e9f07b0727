// =============================================================================
// Recommendation Engine: integer score to label + confidence
// =============================================================================
//
// The last two snapshots are run through every rule in `RULES`. Deltas are
// summed into an integer score and every triggered signal is kept in rule
// order. The score then maps onto a label band:
//
//   score >= 3   STRONG_BUY   min(90, 60 + 5*score)
//   1..=2        BUY          min(75, 55 + 5*score)
//   0            HOLD         50
//   -2..=-1      SELL         min(75, 55 + 5*|score|)
//   score <= -3  STRONG_SELL  min(90, 60 + 5*|score|)
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::rules::{Signal, SnapshotPair, RULES};
use crate::error::{AdvisorError, AdvisorResult};
use crate::indicators::IndicatorSnapshot;

/// Bars needed to evaluate crossover rules.
pub const MIN_SNAPSHOTS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Label {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StrongBuy => write!(f, "STRONG_BUY"),
            Self::Buy => write!(f, "BUY"),
            Self::Hold => write!(f, "HOLD"),
            Self::Sell => write!(f, "SELL"),
            Self::StrongSell => write!(f, "STRONG_SELL"),
        }
    }
}

/// Map a final score onto its label and confidence percentage.
pub fn classify(score: i32) -> (Label, u8) {
    let magnitude = score.saturating_abs();
    let (label, confidence) = match score {
        s if s >= 3 => (Label::StrongBuy, (60 + 5 * magnitude).min(90)),
        s if s >= 1 => (Label::Buy, (55 + 5 * magnitude).min(75)),
        s if s <= -3 => (Label::StrongSell, (60 + 5 * magnitude).min(90)),
        s if s <= -1 => (Label::Sell, (55 + 5 * magnitude).min(75)),
        _ => (Label::Hold, 50),
    };
    // Every band is capped at or below 90.
    (label, confidence as u8)
}

/// Final output of the engine for one symbol.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub symbol: String,
    #[serde(rename = "recommendation")]
    pub label: Label,
    pub confidence: u8,
    pub score: i32,
    pub signals: Vec<Signal>,
    pub current_price: f64,
    pub rsi: Option<f64>,
    pub macd: f64,
    #[serde(rename = "timestamp")]
    pub generated_at: DateTime<Utc>,
}

/// Score and signal list accumulated over the rule set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoringResult {
    pub score: i32,
    pub signals: Vec<Signal>,
}

/// Apply every rule to `pair` in order and fold the results.
pub fn score_pair(pair: &SnapshotPair<'_>) -> ScoringResult {
    RULES
        .iter()
        .filter_map(|rule| rule(pair))
        .fold(ScoringResult::default(), |mut acc, (delta, signal)| {
            acc.score += delta;
            acc.signals.push(signal);
            acc
        })
}

/// Build a recommendation from `snapshots`, stamped with the current time.
pub fn recommend(symbol: &str, snapshots: &[IndicatorSnapshot]) -> AdvisorResult<Recommendation> {
    recommend_at(symbol, snapshots, Utc::now())
}

/// Same as [`recommend`] with an explicit generation timestamp.
pub fn recommend_at(
    symbol: &str,
    snapshots: &[IndicatorSnapshot],
    generated_at: DateTime<Utc>,
) -> AdvisorResult<Recommendation> {
    let [.., previous, latest] = snapshots else {
        return Err(AdvisorError::InsufficientHistory {
            needed: MIN_SNAPSHOTS,
            available: snapshots.len(),
        });
    };

    let ScoringResult { score, signals } = score_pair(&SnapshotPair { previous, latest });
    let (label, confidence) = classify(score);

    Ok(Recommendation {
        symbol: symbol.to_string(),
        label,
        confidence,
        score,
        signals,
        current_price: latest.bar.close,
        rsi: latest.rsi,
        macd: latest.macd,
        generated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::compute;
    use crate::types::Bar;
    use chrono::NaiveDate;

    fn series(closes: &[f64], volume: f64) -> Vec<Bar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar {
                date: start + chrono::Days::new(i as u64),
                open: c,
                high: c,
                low: c,
                close: c,
                volume,
            })
            .collect()
    }

    #[test]
    fn classify_table() {
        assert_eq!(classify(0), (Label::Hold, 50));
        assert_eq!(classify(1), (Label::Buy, 60));
        assert_eq!(classify(2), (Label::Buy, 65));
        assert_eq!(classify(3), (Label::StrongBuy, 75));
        assert_eq!(classify(6), (Label::StrongBuy, 90));
        assert_eq!(classify(-1), (Label::Sell, 60));
        assert_eq!(classify(-2), (Label::Sell, 65));
        assert_eq!(classify(-3), (Label::StrongSell, 75));
        assert_eq!(classify(-6), (Label::StrongSell, 90));
    }

    #[test]
    fn confidence_monotonic_within_bands() {
        for (lo, hi) in [(1, 2), (3, 6)] {
            for s in lo..hi {
                let (l1, c1) = classify(s);
                let (l2, c2) = classify(s + 1);
                assert_eq!(l1, l2);
                assert!(c2 >= c1, "score {s}: {c1} -> {c2}");
            }
        }
        for (lo, hi) in [(-2, -1), (-6, -3)] {
            for s in lo..hi {
                let (l1, c1) = classify(s + 1);
                let (l2, c2) = classify(s);
                assert_eq!(l1, l2);
                assert!(c2 >= c1, "score {s}: {c1} -> {c2}");
            }
        }
    }

    #[test]
    fn band_boundary_switches_label() {
        assert_eq!(classify(2).0, Label::Buy);
        assert_eq!(classify(3).0, Label::StrongBuy);
        assert_eq!(classify(-2).0, Label::Sell);
        assert_eq!(classify(-3).0, Label::StrongSell);
    }

    #[test]
    fn fewer_than_two_snapshots_is_an_error() {
        let snaps = compute(&series(&[100.0], 1_000.0));
        let err = recommend("AAPL", &snaps).unwrap_err();
        assert_eq!(
            err,
            AdvisorError::InsufficientHistory {
                needed: 2,
                available: 1
            }
        );
        assert!(recommend("AAPL", &[]).is_err());
    }

    #[test]
    fn linear_uptrend_is_at_least_buy() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 60.0 / 59.0).collect();
        let snaps = compute(&series(&closes, 1_000.0));

        let last = snaps.last().unwrap();
        let (sma_20, sma_50) = (last.sma_20.unwrap(), last.sma_50.unwrap());
        assert!(last.bar.close > sma_20 && sma_20 > sma_50);

        let rec = recommend("TEST", &snaps).unwrap();
        assert_eq!(rec.signals.first(), Some(&Signal::Uptrend));
        assert!(matches!(rec.label, Label::Buy | Label::StrongBuy), "{:?}", rec.label);
        assert!((rec.current_price - 160.0).abs() < 1e-9);
    }

    #[test]
    fn flat_series_holds() {
        let snaps = compute(&series(&[100.0; 60], 5_000.0));
        let rec = recommend("FLAT", &snaps).unwrap();
        assert_eq!(rec.score, 0);
        assert_eq!(rec.label, Label::Hold);
        assert_eq!(rec.confidence, 50);
        assert!(rec.signals.is_empty());
        assert!(rec.rsi.is_none());
        assert_eq!(rec.macd, 0.0);
    }

    #[test]
    fn flat_series_holds_at_inexact_prices() {
        for price in [150.37, 0.11] {
            let rec = recommend("FLAT", &compute(&series(&[price; 100], 5_000.0))).unwrap();
            assert_eq!((rec.score, rec.label, rec.confidence), (0, Label::Hold, 50), "{price}");
            assert!(rec.signals.is_empty(), "{price}: {:?}", rec.signals);
        }

        // Cent steps from 0.08 to 20.06.
        for cents in 8..=2006 {
            let price = cents as f64 / 100.0;
            let rec = recommend("FLAT", &compute(&series(&[price; 100], 5_000.0))).unwrap();
            assert_eq!(rec.score, 0, "{price}: {:?}", rec.signals);
        }
    }

    #[test]
    fn same_input_same_output() {
        let closes: Vec<f64> = (0..80).map(|i| 100.0 + (i as f64 * 0.4).sin() * 8.0).collect();
        let snaps = compute(&series(&closes, 2_000.0));
        let at = Utc::now();
        let a = recommend_at("X", &snaps, at).unwrap();
        let b = recommend_at("X", &snaps, at).unwrap();
        assert_eq!(a.score, b.score);
        assert_eq!(a.signals, b.signals);
        assert_eq!(a.confidence, b.confidence);
        assert_eq!(a.generated_at, b.generated_at);
    }

    #[test]
    fn signals_follow_rule_order() {
        // A sharp drop on heavy volume after a sideways stretch trips
        // several rules at once.
        let mut closes: Vec<f64> = (0..59).map(|i| 100.0 + (i % 3) as f64).collect();
        closes.push(80.0);
        let mut bars = series(&closes, 1_000.0);
        bars.last_mut().unwrap().volume = 10_000.0;
        let rec = recommend("DROP", &compute(&bars)).unwrap();

        let order: Vec<usize> = rec
            .signals
            .iter()
            .map(|s| match s {
                Signal::Uptrend | Signal::Downtrend => 1,
                Signal::MacdBullishCross | Signal::MacdBearishCross => 2,
                Signal::Oversold | Signal::Overbought => 3,
                Signal::BelowLowerBand | Signal::AboveUpperBand => 4,
                Signal::VolumeAboveAverage => 5,
            })
            .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]), "{:?}", rec.signals);
        assert!(rec.signals.contains(&Signal::BelowLowerBand));
        assert_eq!(rec.signals.last(), Some(&Signal::VolumeAboveAverage));
    }

    #[test]
    fn serialises_with_wire_names() {
        let snaps = compute(&series(&[100.0; 3], 1_000.0));
        let rec = recommend("AAPL", &snaps).unwrap();
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["recommendation"], "HOLD");
        assert_eq!(json["symbol"], "AAPL");
        assert!(json["timestamp"].is_string());
        assert!(json["rsi"].is_null());
    }
}
