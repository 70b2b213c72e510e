//! Volume Weighted Average Price.
//!
//! VWAP[i] = sum(TP*V) / sum(V) from the start of the series (or the anchor),
//! TP = (H+L+C)/3. While cumulative volume is zero the typical price is used.
//! No session reset: the series is treated as one continuous session.

use crate::domain::candle::Candle;
use crate::domain::indicator::nan_series;

pub fn calculate_vwap(candles: &[Candle]) -> Vec<f64> {
    calculate_anchored_vwap(candles, 0)
}

/// VWAP restarted at `anchor`; positions before it are `NaN`.
pub fn calculate_anchored_vwap(candles: &[Candle], anchor: usize) -> Vec<f64> {
    let mut out = nan_series(candles.len());
    let mut cumulative_tpv = 0.0;
    let mut cumulative_volume = 0.0;

    for (i, c) in candles.iter().enumerate().skip(anchor) {
        let tp = c.typical_price();
        let volume = c.volume.max(0.0);
        cumulative_tpv += tp * volume;
        cumulative_volume += volume;
        out[i] = if cumulative_volume > 0.0 {
            cumulative_tpv / cumulative_volume
        } else {
            tp
        };
    }
    out
}
