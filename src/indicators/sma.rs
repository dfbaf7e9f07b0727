// =============================================================================
// Simple Moving Average (SMA) and rolling standard deviation
// =============================================================================
//
// Both are trailing windows: the value at bar `i` covers `values[i-w+1..=i]`.
// Bars without `w` values of history carry `None`.
//
// The SMA keeps a running sum over a fixed-size ring so each bar costs O(1).
// Add/evict cycles leave rounding residue in that sum, so a window holding a
// single repeated value reports that value directly instead.
// =============================================================================

use std::collections::VecDeque;

/// Fixed-capacity ring holding the last `capacity` values and their sum.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    values: VecDeque<f64>,
    capacity: usize,
    sum: f64,
    /// Length of the trailing run of identical values.
    run: usize,
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
            sum: 0.0,
            run: 0,
        }
    }

    /// Push a value, evicting the oldest once the window is full.
    pub fn push(&mut self, value: f64) {
        if self.capacity == 0 {
            return;
        }
        if self.values.len() == self.capacity {
            if let Some(old) = self.values.pop_front() {
                self.sum -= old;
            }
        }
        self.run = match self.values.back() {
            Some(&last) if last == value => self.run + 1,
            _ => 1,
        };
        self.values.push_back(value);
        self.sum += value;
    }

    pub fn is_full(&self) -> bool {
        self.capacity > 0 && self.values.len() == self.capacity
    }

    /// Mean of the window, only once it holds `capacity` values.
    pub fn mean(&self) -> Option<f64> {
        if !self.is_full() {
            return None;
        }
        match self.constant_value() {
            Some(value) => Some(value),
            None => Some(self.sum / self.capacity as f64),
        }
    }

    /// The repeated value, when every slot holds the same one.
    fn constant_value(&self) -> Option<f64> {
        if self.run >= self.capacity {
            self.values.back().copied()
        } else {
            None
        }
    }

    /// Sample standard deviation (n - 1 denominator) of a full window.
    ///
    /// Computed in two passes over the ring so that a drifting running sum
    /// cannot produce a tiny negative variance on flat input.
    pub fn sample_std(&self) -> Option<f64> {
        if !self.is_full() || self.capacity < 2 {
            return None;
        }
        if self.constant_value().is_some() {
            return Some(0.0);
        }
        let n = self.capacity as f64;
        let mean = self.values.iter().sum::<f64>() / n;
        let var = self.values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        Some(var.sqrt())
    }
}

/// Trailing SMA over `values`, one entry per input.
pub fn sma_series(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut window = RollingWindow::new(period);
    values
        .iter()
        .map(|&v| {
            window.push(v);
            window.mean()
        })
        .collect()
}

/// Trailing sample standard deviation over `values`, one entry per input.
pub fn rolling_std_series(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut window = RollingWindow::new(period);
    values
        .iter()
        .map(|&v| {
            window.push(v);
            window.sample_std()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_undefined_until_window_fills() {
        let sma = sma_series(&[1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(sma[0], None);
        assert_eq!(sma[1], None);
        assert!((sma[2].unwrap() - 2.0).abs() < 1e-12);
        assert!((sma[3].unwrap() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn sma_period_zero_is_never_defined() {
        assert!(sma_series(&[1.0, 2.0], 0).iter().all(Option::is_none));
    }

    #[test]
    fn sma_50_matches_direct_mean() {
        // Irregular prices so the running sum sees both adds and evictions.
        let closes: Vec<f64> = (0..120)
            .map(|i| 100.0 + ((i * 37) % 23) as f64 * 0.731 - (i as f64).sin())
            .collect();
        let sma = sma_series(&closes, 50);
        let direct = closes[closes.len() - 50..].iter().sum::<f64>() / 50.0;
        let last = sma.last().copied().flatten().unwrap();
        assert!((last - direct).abs() < 1e-9, "got {last}, expected {direct}");
    }

    #[test]
    fn sample_std_known_value() {
        // Sample std of 2,4,4,4,5,5,7,9 is sqrt(32/7).
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let std = rolling_std_series(&values, 8);
        let expected = (32.0_f64 / 7.0).sqrt();
        assert!((std[7].unwrap() - expected).abs() < 1e-12);
        assert!(std[6].is_none());
    }

    #[test]
    fn flat_window_mean_is_exact() {
        for price in [150.37, 0.11, 0.08, 20.06, 1234.5678] {
            let closes = vec![price; 100];
            for period in [20, 50] {
                let sma = sma_series(&closes, period);
                assert!(
                    sma[period - 1..].iter().all(|m| *m == Some(price)),
                    "period {period} drifted for {price}"
                );
            }
        }
    }

    #[test]
    fn constant_run_after_movement_is_exact() {
        let mut closes: Vec<f64> = (0..30).map(|i| 10.0 + i as f64 * 0.37).collect();
        closes.extend(std::iter::repeat(42.13).take(25));
        let sma = sma_series(&closes, 20);
        assert_eq!(sma.last().copied().flatten(), Some(42.13));
        assert_eq!(rolling_std_series(&closes, 20).last().copied().flatten(), Some(0.0));
    }

    #[test]
    fn std_of_flat_window_is_zero() {
        let std = rolling_std_series(&[5.0; 25], 20);
        assert_eq!(std[24], Some(0.0));
    }
}
