//! Exponential Moving Average.
//!
//! k = 2/(n+1), seeded with the first close, then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! Defined from index 0: unlike SMA there is no `NaN` warmup.

use crate::domain::candle::Candle;
use crate::domain::indicator::nan_series;

pub fn calculate_ema(candles: &[Candle], period: usize) -> Vec<f64> {
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    ema_of_values(&closes, period, 0)
}

/// EMA of `values` seeded with `values[seed_index]`; earlier positions are `NaN`.
pub fn ema_of_values(values: &[f64], period: usize, seed_index: usize) -> Vec<f64> {
    let mut out = nan_series(values.len());
    if period == 0 || seed_index >= values.len() {
        return out;
    }

    let k = smoothing_factor(period);
    let mut ema = values[seed_index];
    out[seed_index] = ema;
    for i in (seed_index + 1)..values.len() {
        ema = values[i] * k + ema * (1.0 - k);
        out[i] = ema;
    }
    out
}

pub fn smoothing_factor(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}
