//! Average True Range with Wilder's smoothing.
//!
//! TR[i] = max(H-L, |H-prevC|, |L-prevC|) for i >= 1.
//! Seed at index n: simple mean of TR[1..=n]; then ATR[i] = (ATR[i-1]*(n-1) + TR[i]) / n.
//! Warmup: first n positions are `NaN`.

use crate::domain::candle::Candle;
use crate::domain::indicator::nan_series;

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_atr(candles: &[Candle], period: usize) -> Vec<f64> {
    let mut out = nan_series(candles.len());
    if period == 0 || candles.len() <= period {
        return out;
    }

    let tr: Vec<f64> = candles
        .windows(2)
        .map(|pair| pair[1].true_range(pair[0].close))
        .collect();

    let mut atr = tr[..period].iter().sum::<f64>() / period as f64;
    out[period] = atr;
    for i in (period + 1)..candles.len() {
        atr = (atr * (period - 1) as f64 + tr[i - 1]) / period as f64;
        out[i] = atr;
    }
    out
}
