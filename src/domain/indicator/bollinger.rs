//! Bollinger Bands.
//!
//! - Middle: SMA over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! StdDev is the population standard deviation (divides by N, not N-1).
//! Default parameters: period=20, multiplier=2.0. Warmup: first (period-1) positions are `NaN`.

use crate::domain::candle::Candle;
use crate::domain::indicator::nan_series;
use crate::domain::indicator::stddev::population_stddev;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

impl BollingerBands {
    /// upper - lower at each position.
    pub fn width(&self) -> Vec<f64> {
        self.upper.iter().zip(&self.lower).map(|(u, l)| u - l).collect()
    }
}

pub fn calculate_bollinger(candles: &[Candle], period: usize, multiplier: f64) -> BollingerBands {
    let len = candles.len();
    let mut bands = BollingerBands {
        upper: nan_series(len),
        middle: nan_series(len),
        lower: nan_series(len),
    };
    if period == 0 || len < period {
        return bands;
    }

    for i in (period - 1)..len {
        let window = &candles[i + 1 - period..=i];
        let (middle, stddev) = population_stddev(window.iter().map(|c| c.close));
        bands.middle[i] = middle;
        bands.upper[i] = middle + multiplier * stddev;
        bands.lower[i] = middle - multiplier * stddev;
    }
    bands
}
