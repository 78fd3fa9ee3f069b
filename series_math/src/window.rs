//! Statistics over fixed-width windows of hourly values
//!
//! A window is only summarised when every slot holds an observation. A single
//! missing hour makes the whole statistic missing, so callers never mix
//! partial windows with complete ones.

use statrs::statistics::Statistics;

/// Collect a window into plain values, or `None` if any slot is missing
pub fn complete(window: &[Option<f64>]) -> Option<Vec<f64>> {
    if window.is_empty() {
        return None;
    }
    window.iter().copied().collect()
}

/// Arithmetic mean of a complete window
pub fn window_mean(window: &[Option<f64>]) -> Option<f64> {
    let values = complete(window)?;
    Some(values.iter().mean())
}

/// Sample standard deviation (n - 1 denominator) of a complete window
///
/// Windows with fewer than two values have no defined sample deviation.
pub fn window_std(window: &[Option<f64>]) -> Option<f64> {
    let values = complete(window)?;
    if values.len() < 2 {
        return None;
    }
    Some(values.iter().std_dev())
}
