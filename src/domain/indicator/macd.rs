//! MACD (Moving Average Convergence Divergence).
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of the MACD line, seeded at index `slow`
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9.
//! Both EMAs are defined from index 0, so the MACD line is too; signal and
//! histogram are `NaN` before index `slow`.

use crate::domain::candle::Candle;
use crate::domain::indicator::{calculate_ema, ema_of_values, nan_series};

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, PartialEq)]
pub struct MacdLines {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn calculate_macd(
    candles: &[Candle],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> MacdLines {
    let len = candles.len();
    if fast == 0 || slow == 0 || signal_period == 0 {
        return MacdLines {
            macd: nan_series(len),
            signal: nan_series(len),
            histogram: nan_series(len),
        };
    }

    let ema_fast = calculate_ema(candles, fast);
    let ema_slow = calculate_ema(candles, slow);
    let macd: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();

    let signal = ema_of_values(&macd, signal_period, slow);
    let histogram = macd.iter().zip(&signal).map(|(m, s)| m - s).collect();

    MacdLines {
        macd,
        signal,
        histogram,
    }
}

pub fn calculate_macd_default(candles: &[Candle]) -> MacdLines {
    calculate_macd(candles, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}
