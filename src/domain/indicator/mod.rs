//! Technical indicator implementations.
//!
//! Every calculation is a pure function of the candle slice and returns one or
//! more `f64` lines of exactly `candles.len()` elements. Positions without
//! enough history hold `NaN`; nothing here panics or returns an error.
//!
//! - `IndicatorKind`: which indicator (one per chart, enforced by the caller)
//! - `IndicatorSpec`: kind plus user parameters and styling
//! - `IndicatorOutput`: the named lines computed for one spec

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stddev;
pub mod stochastic;
pub mod volume;
pub mod vwap;

pub use adx::calculate_adx;
pub use atr::calculate_atr;
pub use bollinger::{BollingerBands, calculate_bollinger};
pub use ema::{calculate_ema, ema_of_values};
pub use macd::{MacdLines, calculate_macd};
pub use rsi::calculate_rsi;
pub use sma::{calculate_sma, sma_of_values};
pub use stddev::calculate_stddev;
pub use stochastic::{StochasticLines, calculate_stochastic};
pub use volume::{DEFAULT_PROFILE_BINS, VolumeProfile, calculate_volume_profile};
pub use vwap::{calculate_anchored_vwap, calculate_vwap};

use crate::domain::candle::Candle;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IndicatorKind {
    Sma,
    Ema,
    Rsi,
    Macd,
    Bollinger,
    Atr,
    Vwap,
    Volume,
    Stochastic,
    Adx,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 10] = [
        IndicatorKind::Sma,
        IndicatorKind::Ema,
        IndicatorKind::Rsi,
        IndicatorKind::Macd,
        IndicatorKind::Bollinger,
        IndicatorKind::Atr,
        IndicatorKind::Vwap,
        IndicatorKind::Volume,
        IndicatorKind::Stochastic,
        IndicatorKind::Adx,
    ];

    pub fn default_period(self) -> usize {
        match self {
            IndicatorKind::Sma | IndicatorKind::Ema | IndicatorKind::Bollinger => 20,
            IndicatorKind::Rsi | IndicatorKind::Atr | IndicatorKind::Stochastic => 14,
            IndicatorKind::Adx => 14,
            IndicatorKind::Macd => macd::DEFAULT_FAST,
            IndicatorKind::Volume => volume::DEFAULT_AVERAGE_PERIOD,
            // VWAP has no period; kept for a uniform API.
            IndicatorKind::Vwap => 0,
        }
    }

    /// Overlays share the price axis; the rest go to the lower pane.
    pub fn is_overlay(self) -> bool {
        matches!(
            self,
            IndicatorKind::Sma | IndicatorKind::Ema | IndicatorKind::Bollinger | IndicatorKind::Vwap
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            IndicatorKind::Sma => "sma",
            IndicatorKind::Ema => "ema",
            IndicatorKind::Rsi => "rsi",
            IndicatorKind::Macd => "macd",
            IndicatorKind::Bollinger => "bollinger",
            IndicatorKind::Atr => "atr",
            IndicatorKind::Vwap => "vwap",
            IndicatorKind::Volume => "volume",
            IndicatorKind::Stochastic => "stochastic",
            IndicatorKind::Adx => "adx",
        }
    }
}

impl FromStr for IndicatorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        IndicatorKind::ALL
            .into_iter()
            .find(|k| k.name() == lower)
            .ok_or_else(|| format!("unknown indicator '{}'", s.trim()))
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name().to_uppercase())
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndicatorSpec {
    pub kind: IndicatorKind,
    pub period: Option<usize>,
    pub color: String,
    pub visible: bool,
    /// Bollinger band width in standard deviations.
    pub multiplier: Option<f64>,
    /// MACD signal period, Stochastic %D period.
    pub signal: Option<usize>,
}

impl IndicatorSpec {
    pub fn new(kind: IndicatorKind) -> Self {
        Self {
            kind,
            period: None,
            color: default_color(kind).to_string(),
            visible: true,
            multiplier: None,
            signal: None,
        }
    }

    pub fn with_period(mut self, period: usize) -> Self {
        self.period = Some(period);
        self
    }

    pub fn with_color(mut self, color: &str) -> Self {
        self.color = color.to_string();
        self
    }

    pub fn period(&self) -> usize {
        self.period.unwrap_or_else(|| self.kind.default_period())
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier.unwrap_or(bollinger::DEFAULT_MULTIPLIER)
    }

    pub fn signal_period(&self) -> usize {
        match self.kind {
            IndicatorKind::Stochastic => self.signal.unwrap_or(stochastic::DEFAULT_D_PERIOD),
            _ => self.signal.unwrap_or(macd::DEFAULT_SIGNAL),
        }
    }
}

impl fmt::Display for IndicatorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            IndicatorKind::Vwap => write!(f, "VWAP"),
            IndicatorKind::Macd => write!(
                f,
                "MACD({},{},{})",
                self.period(),
                macd::DEFAULT_SLOW,
                self.signal_period()
            ),
            IndicatorKind::Bollinger => {
                write!(f, "BOLLINGER({},{})", self.period(), self.multiplier())
            }
            IndicatorKind::Stochastic => {
                write!(f, "STOCHASTIC({},{})", self.period(), self.signal_period())
            }
            kind => write!(f, "{}({})", kind, self.period()),
        }
    }
}

pub fn default_color(kind: IndicatorKind) -> &'static str {
    match kind {
        IndicatorKind::Sma => "#f59e0b",
        IndicatorKind::Ema => "#0ea5e9",
        IndicatorKind::Rsi => "#a855f7",
        IndicatorKind::Macd => "#3b82f6",
        IndicatorKind::Bollinger => "#3b82f6",
        IndicatorKind::Atr => "#f97316",
        IndicatorKind::Vwap => "#eab308",
        IndicatorKind::Volume => "#64748b",
        IndicatorKind::Stochastic => "#ec4899",
        IndicatorKind::Adx => "#14b8a6",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorLine {
    pub name: &'static str,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorOutput {
    pub spec: IndicatorSpec,
    pub lines: Vec<IndicatorLine>,
}

impl IndicatorOutput {
    pub fn line(&self, name: &str) -> Option<&[f64]> {
        self.lines
            .iter()
            .find(|l| l.name == name)
            .map(|l| l.values.as_slice())
    }

    /// Last defined value of the first line.
    pub fn latest(&self) -> Option<f64> {
        self.lines
            .first()
            .and_then(|l| l.values.iter().rev().find(|v| v.is_finite()).copied())
    }

    /// Finite min/max over every line within `[start, end)`.
    pub fn value_range(&self, start: usize, end: usize) -> Option<(f64, f64)> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for line in &self.lines {
            let end = end.min(line.values.len());
            for &v in line.values.get(start.min(end)..end).unwrap_or(&[]) {
                if v.is_finite() {
                    min = min.min(v);
                    max = max.max(v);
                }
            }
        }
        (min <= max).then_some((min, max))
    }
}

/// Computes every line of `spec` over `candles`.
pub fn compute_indicator(candles: &[Candle], spec: &IndicatorSpec) -> IndicatorOutput {
    let period = spec.period();
    let lines = match spec.kind {
        IndicatorKind::Sma => vec![line("sma", calculate_sma(candles, period))],
        IndicatorKind::Ema => vec![line("ema", calculate_ema(candles, period))],
        IndicatorKind::Rsi => vec![line("rsi", calculate_rsi(candles, period))],
        IndicatorKind::Atr => vec![line("atr", calculate_atr(candles, period))],
        IndicatorKind::Vwap => vec![line("vwap", calculate_vwap(candles))],
        IndicatorKind::Macd => {
            let m = calculate_macd(candles, period, macd::DEFAULT_SLOW, spec.signal_period());
            vec![
                line("macd", m.macd),
                line("signal", m.signal),
                line("histogram", m.histogram),
            ]
        }
        IndicatorKind::Bollinger => {
            let b = calculate_bollinger(candles, period, spec.multiplier());
            vec![
                line("upper", b.upper),
                line("middle", b.middle),
                line("lower", b.lower),
            ]
        }
        IndicatorKind::Stochastic => {
            let s = calculate_stochastic(candles, period, spec.signal_period());
            vec![line("k", s.k), line("d", s.d)]
        }
        IndicatorKind::Adx => {
            let a = calculate_adx(candles, period);
            vec![
                line("adx", a.adx),
                line("plus_di", a.plus_di),
                line("minus_di", a.minus_di),
            ]
        }
        IndicatorKind::Volume => vec![
            line("volume", candles.iter().map(|c| c.volume).collect()),
            line("average", volume::average_volume(candles, period)),
        ],
    };
    tracing::debug!(indicator = %spec, len = candles.len(), "computed indicator");
    IndicatorOutput {
        spec: spec.clone(),
        lines,
    }
}

pub fn compute_all(candles: &[Candle], specs: &[IndicatorSpec]) -> Vec<IndicatorOutput> {
    specs.iter().map(|s| compute_indicator(candles, s)).collect()
}

fn line(name: &'static str, values: Vec<f64>) -> IndicatorLine {
    IndicatorLine { name, values }
}

pub(crate) fn nan_series(len: usize) -> Vec<f64> {
    vec![f64::NAN; len]
}


#[cfg(test)]
mod tests {
    use super::test_support::make_candles;
    use super::*;

    #[test]
    fn spec_display_sma() {
        let spec = IndicatorSpec::new(IndicatorKind::Sma).with_period(20);
        assert_eq!(spec.to_string(), "SMA(20)");
    }

    #[test]
    fn spec_display_macd() {
        assert_eq!(
            IndicatorSpec::new(IndicatorKind::Macd).to_string(),
            "MACD(12,26,9)"
        );
    }

    #[test]
    fn spec_display_bollinger() {
        assert_eq!(
            IndicatorSpec::new(IndicatorKind::Bollinger).to_string(),
            "BOLLINGER(20,2)"
        );
    }

    #[test]
    fn spec_display_vwap() {
        assert_eq!(IndicatorSpec::new(IndicatorKind::Vwap).to_string(), "VWAP");
    }

    #[test]
    fn kind_parses_case_insensitive() {
        assert_eq!("SMA".parse::<IndicatorKind>(), Ok(IndicatorKind::Sma));
        assert_eq!(" adx ".parse::<IndicatorKind>(), Ok(IndicatorKind::Adx));
        assert!("ichimoku".parse::<IndicatorKind>().is_err());
    }

    #[test]
    fn overlay_split() {
        assert!(IndicatorKind::Sma.is_overlay());
        assert!(IndicatorKind::Vwap.is_overlay());
        assert!(!IndicatorKind::Rsi.is_overlay());
        assert!(!IndicatorKind::Volume.is_overlay());
    }

    #[test]
    fn every_kind_yields_full_length_lines() {
        let candles = make_candles(&(0..60).map(|i| 100.0 + (i % 7) as f64).collect::<Vec<_>>());
        for kind in IndicatorKind::ALL {
            let out = compute_indicator(&candles, &IndicatorSpec::new(kind));
            assert!(!out.lines.is_empty());
            for l in &out.lines {
                assert_eq!(l.values.len(), candles.len(), "{kind} line {}", l.name);
            }
        }
    }

    #[test]
    fn empty_candles_yield_empty_lines() {
        for kind in IndicatorKind::ALL {
            let out = compute_indicator(&[], &IndicatorSpec::new(kind));
            assert!(out.lines.iter().all(|l| l.values.is_empty()));
        }
    }

    #[test]
    fn macd_output_has_three_named_lines() {
        let candles = make_candles(&[1.0; 40]);
        let out = compute_indicator(&candles, &IndicatorSpec::new(IndicatorKind::Macd));
        assert!(out.line("macd").is_some());
        assert!(out.line("signal").is_some());
        assert!(out.line("histogram").is_some());
        assert!(out.line("nope").is_none());
    }

    #[test]
    fn latest_skips_nan() {
        let out = IndicatorOutput {
            spec: IndicatorSpec::new(IndicatorKind::Sma),
            lines: vec![line("sma", vec![f64::NAN, 2.0, 3.0, f64::NAN])],
        };
        assert_eq!(out.latest(), Some(3.0));
    }

    #[test]
    fn value_range_ignores_nan_and_out_of_bounds() {
        let out = IndicatorOutput {
            spec: IndicatorSpec::new(IndicatorKind::Bollinger),
            lines: vec![
                line("upper", vec![f64::NAN, 12.0, 14.0]),
                line("lower", vec![f64::NAN, 8.0, 6.0]),
            ],
        };
        assert_eq!(out.value_range(0, 10), Some((6.0, 14.0)));
        assert_eq!(out.value_range(0, 1), None);
        assert_eq!(out.value_range(5, 10), None);
    }
}
