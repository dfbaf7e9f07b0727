// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   alpha  = 2 / (span + 1)
//   EMA_0  = value_0
//   EMA_t  = EMA_{t-1} + alpha * (value_t - EMA_{t-1})
//
// The series is seeded with the first value itself, not with an SMA of the
// first `span` values, so it is defined from the very first bar.
// =============================================================================

/// Compute the EMA series for `values` with smoothing `span`.
///
/// The output has the same length as the input.
///
/// # Edge cases
/// - empty input => empty vec
/// - `span == 0` => alpha = 2, which is still a valid (if odd) recursion;
///   callers in this crate only use 9, 12 and 26.
pub fn calculate_ema(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut result = Vec::with_capacity(values.len());

    let mut iter = values.iter();
    let Some(&first) = iter.next() else {
        return result;
    };

    let mut prev = first;
    result.push(prev);
    for &value in iter {
        prev += alpha * (value - prev);
        result.push(prev);
    }

    result
}
