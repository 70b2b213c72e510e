//! Simple Moving Average.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i]). Warmup: first (n-1) positions are `NaN`.

use crate::domain::candle::Candle;
use crate::domain::indicator::nan_series;

pub fn calculate_sma(candles: &[Candle], period: usize) -> Vec<f64> {
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    sma_of_values(&closes, period)
}

/// SMA over an arbitrary series. `NaN` inputs poison only the windows that
/// contain them.
pub fn sma_of_values(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = nan_series(values.len());
    if period == 0 || values.len() < period {
        return out;
    }

    let mut sum: f64 = values[..period].iter().sum();
    out[period - 1] = sum / period as f64;
    for i in period..values.len() {
        sum += values[i] - values[i - period];
        out[i] = if sum.is_nan() {
            // Recompute so one NaN does not stick to every later window.
            let window_sum: f64 = values[i + 1 - period..=i].iter().sum();
            sum = window_sum;
            window_sum / period as f64
        } else {
            sum / period as f64
        };
    }
    out
}
