//! Colour palettes, one table keyed by theme.

use crate::domain::regime::Regime;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(format!("unknown theme '{other}', expected dark or light")),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Dark => f.write_str("dark"),
            Theme::Light => f.write_str("light"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: &'static str,
    pub grid: &'static str,
    pub text: &'static str,
    pub candle_up: &'static str,
    pub candle_down: &'static str,
    pub wick_up: &'static str,
    pub wick_down: &'static str,
    pub crosshair: &'static str,
    pub price_line: &'static str,
    pub volume_up: &'static str,
    pub volume_down: &'static str,
    pub label_background: &'static str,
    pub ema_fast: &'static str,
    pub ema_slow: &'static str,
    pub profile: &'static str,
    /// Point-of-control bar of the volume profile.
    pub profile_poc: &'static str,
}

const PALETTES: [(Theme, Palette); 2] = [
    (
        Theme::Dark,
        Palette {
            background: "#0a0a12",
            grid: "#1a1a24",
            text: "#6b7280",
            candle_up: "#10b981",
            candle_down: "#ef4444",
            wick_up: "#10b981",
            wick_down: "#ef4444",
            crosshair: "#374151",
            price_line: "#374151",
            volume_up: "#10b981",
            volume_down: "#ef4444",
            label_background: "#1f2937",
            ema_fast: "#22d3ee",
            ema_slow: "#f97316",
            profile: "#3b82f6",
            profile_poc: "#ff9500",
        },
    ),
    (
        Theme::Light,
        Palette {
            background: "#ffffff",
            grid: "#e5e7eb",
            text: "#4b5563",
            candle_up: "#059669",
            candle_down: "#dc2626",
            wick_up: "#059669",
            wick_down: "#dc2626",
            crosshair: "#9ca3af",
            price_line: "#9ca3af",
            volume_up: "#34d399",
            volume_down: "#f87171",
            label_background: "#e5e7eb",
            ema_fast: "#0891b2",
            ema_slow: "#ea580c",
            profile: "#2563eb",
            profile_poc: "#d97706",
        },
    ),
];

impl Palette {
    pub fn for_theme(theme: Theme) -> Palette {
        PALETTES
            .iter()
            .find(|(t, _)| *t == theme)
            .map(|(_, p)| *p)
            .unwrap_or(PALETTES[0].1)
    }

    /// Background tint colour and opacity for a regime.
    pub fn regime_tint(&self, regime: Regime) -> (&'static str, f64) {
        match regime {
            Regime::Trend => ("#3b82f6", 0.05),
            Regime::Range => ("#a855f7", 0.05),
            Regime::Breakout => (self.candle_up, 0.07),
            Regime::Breakdown => (self.candle_down, 0.07),
            Regime::Chaos => ("#6b7280", 0.03),
        }
    }
}
