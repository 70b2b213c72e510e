//! Market regime classification.
//!
//! Recomputed only when the candle series is replaced. The classifier looks at
//! the last candle against EMA(20)/EMA(50) and at its range relative to the
//! average range of the last 10 candles.

use crate::domain::candle::Candle;
use crate::domain::indicator::calculate_ema;
use std::fmt;

pub const MIN_CANDLES: usize = 50;
pub const FAST_EMA: usize = 20;
pub const SLOW_EMA: usize = 50;
pub const RANGE_LOOKBACK: usize = 10;
pub const EXPANSION_FACTOR: f64 = 2.5;
pub const CONTRACTION_FACTOR: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Regime {
    Trend,
    Range,
    Breakout,
    Breakdown,
    Chaos,
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Regime::Trend => "trend",
            Regime::Range => "range",
            Regime::Breakout => "breakout",
            Regime::Breakdown => "breakdown",
            Regime::Chaos => "chaos",
        };
        f.write_str(s)
    }
}

/// Direction of a `Trend` regime. `Regime` itself does not distinguish up from down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrendDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketState {
    pub ema20: Vec<f64>,
    pub ema50: Vec<f64>,
    pub regime: Regime,
    /// Set only when `regime` is `Trend`.
    pub direction: Option<TrendDirection>,
}

impl MarketState {
    pub fn empty() -> Self {
        Self {
            ema20: Vec::new(),
            ema50: Vec::new(),
            regime: Regime::Chaos,
            direction: None,
        }
    }
}

pub fn compute_market_state(candles: &[Candle]) -> MarketState {
    if candles.is_empty() {
        return MarketState::empty();
    }
    let ema20 = calculate_ema(candles, FAST_EMA);
    let ema50 = calculate_ema(candles, SLOW_EMA);
    let (regime, direction) = classify(candles, &ema20, &ema50);
    tracing::debug!(%regime, ?direction, candles = candles.len(), "market state computed");
    MarketState {
        ema20,
        ema50,
        regime,
        direction,
    }
}

pub fn determine_regime(candles: &[Candle], ema20: &[f64], ema50: &[f64]) -> Regime {
    classify(candles, ema20, ema50).0
}

fn classify(
    candles: &[Candle],
    ema20: &[f64],
    ema50: &[f64],
) -> (Regime, Option<TrendDirection>) {
    if candles.len() < MIN_CANDLES {
        return (Regime::Chaos, None);
    }
    let last = candles.len() - 1;
    let (Some(&e20), Some(&e50)) = (ema20.get(last), ema50.get(last)) else {
        return (Regime::Chaos, None);
    };
    let candle = &candles[last];
    let price = candle.close;

    let range = candle.range();
    let lookback = &candles[candles.len() - RANGE_LOOKBACK..];
    let avg_range = lookback.iter().map(Candle::range).sum::<f64>() / RANGE_LOOKBACK as f64;

    if range > avg_range * EXPANSION_FACTOR {
        let regime = if price > candle.open {
            Regime::Breakout
        } else {
            Regime::Breakdown
        };
        return (regime, None);
    }

    if price > e20 && e20 > e50 {
        return (Regime::Trend, Some(TrendDirection::Up));
    }
    if price < e20 && e20 < e50 {
        return (Regime::Trend, Some(TrendDirection::Down));
    }

    if range < avg_range * CONTRACTION_FACTOR {
        return (Regime::Range, None);
    }
    (Regime::Chaos, None)
}
