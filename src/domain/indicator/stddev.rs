//! Rolling population standard deviation of closes.
//!
//! STDDEV(n)[i] = sqrt(sum((C[i-j] - SMA(n)[i])^2 for j in 0..n) / n)
//! Warmup: first (n-1) positions are `NaN`.

use crate::domain::candle::Candle;
use crate::domain::indicator::nan_series;

pub fn calculate_stddev(candles: &[Candle], period: usize) -> Vec<f64> {
    let mut out = nan_series(candles.len());
    if period == 0 {
        return out;
    }
    for i in (period - 1)..candles.len() {
        let window = &candles[i + 1 - period..=i];
        out[i] = population_stddev(window.iter().map(|c| c.close)).1;
    }
    out
}

/// (mean, population stddev) of a non-empty window.
pub fn population_stddev(values: impl Iterator<Item = f64> + Clone) -> (f64, f64) {
    let n = values.clone().count();
    if n == 0 {
        return (f64::NAN, f64::NAN);
    }
    let mean = values.clone().sum::<f64>() / n as f64;
    let variance = values
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / n as f64;
    (mean, variance.sqrt())
}
