//! Average Directional Index.
//!
//! +DM/-DM from consecutive highs/lows, Wilder-smoothed along with TR:
//! - seed: plain sum of the first n values
//! - then S = S - S/n + current
//!
//! DI± = 100 * smoothed DM± / smoothed TR (0 when TR is 0),
//! DX = 100 * |DI+ - DI-| / (DI+ + DI-) (0 when both are 0).
//! ADX at index 2n-1 is the mean of the first n DX values, then Wilder smoothing.

use crate::domain::candle::{Candle, true_ranges};
use crate::domain::indicator::nan_series;

pub const DEFAULT_PERIOD: usize = 14;

#[derive(Debug, Clone, PartialEq)]
pub struct AdxLines {
    pub adx: Vec<f64>,
    pub plus_di: Vec<f64>,
    pub minus_di: Vec<f64>,
}

pub fn calculate_adx(candles: &[Candle], period: usize) -> AdxLines {
    let len = candles.len();
    let mut lines = AdxLines {
        adx: nan_series(len),
        plus_di: nan_series(len),
        minus_di: nan_series(len),
    };
    if period == 0 || len < period {
        return lines;
    }

    let tr = true_ranges(candles);
    let mut dm_plus = vec![0.0; len];
    let mut dm_minus = vec![0.0; len];
    for i in 1..len {
        let up = candles[i].high - candles[i - 1].high;
        let down = candles[i - 1].low - candles[i].low;
        if up > down && up > 0.0 {
            dm_plus[i] = up;
        }
        if down > up && down > 0.0 {
            dm_minus[i] = down;
        }
    }

    let mut smooth_tr: f64 = tr[..period].iter().sum();
    let mut smooth_plus: f64 = dm_plus[..period].iter().sum();
    let mut smooth_minus: f64 = dm_minus[..period].iter().sum();
    let n = period as f64;

    let mut dx_history = Vec::with_capacity(len);
    let mut adx = f64::NAN;

    for i in (period - 1)..len {
        if i >= period {
            smooth_tr = smooth_tr - smooth_tr / n + tr[i];
            smooth_plus = smooth_plus - smooth_plus / n + dm_plus[i];
            smooth_minus = smooth_minus - smooth_minus / n + dm_minus[i];
        }

        let (plus_di, minus_di) = if smooth_tr > 0.0 {
            (100.0 * smooth_plus / smooth_tr, 100.0 * smooth_minus / smooth_tr)
        } else {
            (0.0, 0.0)
        };
        lines.plus_di[i] = plus_di;
        lines.minus_di[i] = minus_di;

        let di_sum = plus_di + minus_di;
        let dx = if di_sum == 0.0 {
            0.0
        } else {
            100.0 * (plus_di - minus_di).abs() / di_sum
        };
        dx_history.push(dx);

        let first_adx = 2 * period - 1;
        if i == first_adx {
            adx = dx_history[..period].iter().sum::<f64>() / n;
            lines.adx[i] = adx;
        } else if i > first_adx {
            adx = (adx * (n - 1.0) + dx) / n;
            lines.adx[i] = adx;
        }
    }
    lines
}
