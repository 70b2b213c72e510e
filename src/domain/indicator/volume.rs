//! Volume helpers: rolling average volume and a close-price volume profile.

use crate::domain::candle::Candle;
use crate::domain::indicator::sma_of_values;

pub const DEFAULT_AVERAGE_PERIOD: usize = 20;
pub const DEFAULT_PROFILE_BINS: usize = 20;

pub fn average_volume(candles: &[Candle], period: usize) -> Vec<f64> {
    let volumes: Vec<f64> = candles.iter().map(|c| c.volume).collect();
    sma_of_values(&volumes, period)
}

/// Volume traded per equal-width price bucket of closes.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeProfile {
    /// Bucket midpoints, ascending.
    pub prices: Vec<f64>,
    pub volumes: Vec<f64>,
    pub bin_size: f64,
    /// Bucket with the most volume (point of control).
    pub poc_index: usize,
}

impl VolumeProfile {
    pub fn poc_price(&self) -> Option<f64> {
        self.prices.get(self.poc_index).copied()
    }
}

pub fn calculate_volume_profile(candles: &[Candle], bins: usize) -> VolumeProfile {
    if candles.is_empty() || bins == 0 {
        return VolumeProfile {
            prices: Vec::new(),
            volumes: Vec::new(),
            bin_size: 0.0,
            poc_index: 0,
        };
    }

    let min = candles.iter().map(|c| c.close).fold(f64::INFINITY, f64::min);
    let max = candles.iter().map(|c| c.close).fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    let bin_size = if range > 0.0 { range / bins as f64 } else { 1.0 };

    let mut volumes = vec![0.0; bins];
    for c in candles {
        // The top edge belongs to the last bucket.
        let idx = (((c.close - min) / bin_size) as usize).min(bins - 1);
        volumes[idx] += c.volume.max(0.0);
    }

    let prices = (0..bins)
        .map(|i| min + (i as f64 + 0.5) * bin_size)
        .collect();
    let poc_index = volumes
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, &v)| if v > best.1 { (i, v) } else { best })
        .0;

    VolumeProfile {
        prices,
        volumes,
        bin_size,
        poc_index,
    }
}
