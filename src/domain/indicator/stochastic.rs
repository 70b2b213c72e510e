//! Stochastic oscillator.
//!
//! %K[i] = 100 * (C[i] - lowest low) / (highest high - lowest low) over k_period;
//! a flat window gives 50. %D = SMA(d_period) of %K.

use crate::domain::candle::Candle;
use crate::domain::indicator::{nan_series, sma_of_values};

pub const DEFAULT_K_PERIOD: usize = 14;
pub const DEFAULT_D_PERIOD: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct StochasticLines {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
}

pub fn calculate_stochastic(candles: &[Candle], k_period: usize, d_period: usize) -> StochasticLines {
    let mut k = nan_series(candles.len());
    if k_period == 0 || candles.len() < k_period {
        return StochasticLines {
            d: nan_series(candles.len()),
            k,
        };
    }

    for i in (k_period - 1)..candles.len() {
        let window = &candles[i + 1 - k_period..=i];
        let lowest = window.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
        let highest = window.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
        let span = highest - lowest;
        k[i] = if span > 0.0 {
            100.0 * (candles[i].close - lowest) / span
        } else {
            50.0
        };
    }

    let d = sma_of_values(&k, d_period);
    StochasticLines { k, d }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::make_hlc;

    #[test]
    fn stochastic_close_at_high_is_100() {
        let candles = make_hlc(&[(10.0, 5.0, 6.0), (12.0, 6.0, 8.0), (15.0, 7.0, 15.0)]);
        let s = calculate_stochastic(&candles, 3, 1);
        assert!(s.k[1].is_nan());
        assert!((s.k[2] - 100.0).abs() < 1e-12);
    }

    #[test]
    fn stochastic_close_at_low_is_0() {
        let candles = make_hlc(&[(10.0, 5.0, 6.0), (12.0, 6.0, 8.0), (9.0, 4.0, 4.0)]);
        let s = calculate_stochastic(&candles, 3, 1);
        assert!(s.k[2].abs() < 1e-12);
    }

    #[test]
    fn stochastic_flat_window_is_midpoint() {
        let candles = make_hlc(&[(10.0, 10.0, 10.0); 5]);
        let s = calculate_stochastic(&candles, 3, 3);
        assert_eq!(s.k[4], 50.0);
        assert_eq!(s.d[4], 50.0);
    }

    #[test]
    fn stochastic_d_is_sma_of_k() {
        let rows: Vec<(f64, f64, f64)> = (0..10)
            .map(|i| {
                let c = 100.0 + (i as f64 * 1.3).sin() * 4.0;
                (c + 1.0, c - 1.0, c)
            })
            .collect();
        let s = calculate_stochastic(&make_hlc(&rows), 4, 3);
        // first %K at 3, first %D needs three %K values -> index 5
        assert!(s.d[4].is_nan());
        let expected = (s.k[3] + s.k[4] + s.k[5]) / 3.0;
        assert!((s.d[5] - expected).abs() < 1e-9);
    }

    #[test]
    fn stochastic_short_series() {
        let s = calculate_stochastic(&make_hlc(&[(1.0, 1.0, 1.0)]), 14, 3);
        assert_eq!(s.k.len(), 1);
        assert_eq!(s.d.len(), 1);
        assert!(s.k[0].is_nan());
    }
}
