//! Typed chart settings built from a [`ConfigPort`].

use crate::domain::error::ChartError;
use crate::domain::indicator::{DEFAULT_PROFILE_BINS, IndicatorKind, IndicatorSpec};
use crate::domain::interaction::DEFAULT_ZOOM_SENSITIVITY;
use crate::domain::settings_validation::{optional_number, validate_chart_config};
use crate::domain::theme::Theme;
use crate::domain::viewport::Padding;
use crate::ports::config_port::ConfigPort;
use std::fmt;
use std::str::FromStr;

pub const INDICATOR_SECTION_PREFIX: &str = "indicator.";
pub const MAX_LOWER_PANE_RATIO: f64 = 0.6;
pub const DEFAULT_LOWER_PANE_RATIO: f64 = 0.25;
pub const MAX_PROFILE_BINS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChartType {
    #[default]
    Candles,
    Hollow,
    Ohlc,
    Line,
    Area,
}

impl FromStr for ChartType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "candles" | "candlestick" => Ok(ChartType::Candles),
            "hollow" => Ok(ChartType::Hollow),
            "ohlc" | "bars" => Ok(ChartType::Ohlc),
            "line" => Ok(ChartType::Line),
            "area" => Ok(ChartType::Area),
            other => Err(format!(
                "unknown chart type '{other}', expected candles, hollow, ohlc, line or area"
            )),
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChartType::Candles => "candles",
            ChartType::Hollow => "hollow",
            ChartType::Ohlc => "ohlc",
            ChartType::Line => "line",
            ChartType::Area => "area",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSettings {
    pub width: f64,
    pub height: f64,
    pub theme: Theme,
    pub chart_type: ChartType,
    pub show_grid: bool,
    pub show_crosshair: bool,
    pub show_volume: bool,
    pub show_regime_tint: bool,
    /// Draw the EMA(20)/EMA(50) pair the regime classifier uses.
    pub show_market_emas: bool,
    /// Right-edge volume profile over the visible candles.
    pub show_volume_profile: bool,
    pub volume_profile_bins: usize,
    pub candle_width: f64,
    /// Initial left-edge offset; `None` scrolls to the latest candle.
    pub offset: Option<f64>,
    pub zoom_sensitivity: f64,
    pub padding: Padding,
    /// Share of the surface height given to the lower pane when it is shown.
    pub lower_pane_ratio: f64,
    pub indicators: Vec<IndicatorSpec>,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 400.0,
            theme: Theme::Dark,
            chart_type: ChartType::Candles,
            show_grid: true,
            show_crosshair: true,
            show_volume: false,
            show_regime_tint: false,
            show_market_emas: false,
            show_volume_profile: false,
            volume_profile_bins: DEFAULT_PROFILE_BINS,
            candle_width: 10.0,
            offset: None,
            zoom_sensitivity: DEFAULT_ZOOM_SENSITIVITY,
            padding: Padding::default(),
            lower_pane_ratio: DEFAULT_LOWER_PANE_RATIO,
            indicators: Vec::new(),
        }
    }
}

impl ChartSettings {
    /// Validates `config` and builds settings, falling back to defaults for
    /// absent keys.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, ChartError> {
        validate_chart_config(config)?;
        let d = ChartSettings::default();
        let section = "chart";

        let theme = match config.get_string(section, "theme") {
            Some(raw) => raw
                .parse()
                .map_err(|reason| ChartError::invalid(section, "theme", reason))?,
            None => d.theme,
        };
        let chart_type = match config.get_string(section, "chart_type") {
            Some(raw) => raw
                .parse()
                .map_err(|reason| ChartError::invalid(section, "chart_type", reason))?,
            None => d.chart_type,
        };

        let padding = Padding {
            top: config.get_double(section, "padding_top", d.padding.top),
            right: config.get_double(section, "padding_right", d.padding.right),
            bottom: config.get_double(section, "padding_bottom", d.padding.bottom),
            left: config.get_double(section, "padding_left", d.padding.left),
        };

        Ok(Self {
            width: config.get_int(section, "width", d.width as i64) as f64,
            height: config.get_int(section, "height", d.height as i64) as f64,
            theme,
            chart_type,
            show_grid: config.get_bool(section, "show_grid", d.show_grid),
            show_crosshair: config.get_bool(section, "show_crosshair", d.show_crosshair),
            show_volume: config.get_bool(section, "show_volume", d.show_volume),
            show_regime_tint: config.get_bool(section, "show_regime_tint", d.show_regime_tint),
            show_market_emas: config.get_bool(section, "show_market_emas", d.show_market_emas),
            show_volume_profile: config.get_bool(
                section,
                "show_volume_profile",
                d.show_volume_profile,
            ),
            volume_profile_bins: config.get_int(
                section,
                "volume_profile_bins",
                d.volume_profile_bins as i64,
            ) as usize,
            candle_width: config.get_double(section, "candle_width", d.candle_width),
            offset: optional_number(config, section, "offset")?,
            zoom_sensitivity: config.get_double(section, "zoom_sensitivity", d.zoom_sensitivity),
            padding,
            lower_pane_ratio: config.get_double(section, "lower_pane_ratio", d.lower_pane_ratio),
            indicators: indicator_specs(config),
        })
    }
}

/// One spec per `[indicator.<kind>]` section, ordered by kind. Assumes the
/// config has already been validated.
fn indicator_specs(config: &dyn ConfigPort) -> Vec<IndicatorSpec> {
    let sections = config.sections();
    IndicatorKind::ALL
        .into_iter()
        .filter_map(|kind| {
            let section = format!("{INDICATOR_SECTION_PREFIX}{}", kind.name());
            sections.contains(&section).then(|| {
                let mut spec = IndicatorSpec::new(kind);
                let period = config.get_int(&section, "period", 0);
                if period > 0 {
                    spec.period = Some(period as usize);
                }
                let signal = config.get_int(&section, "signal", 0);
                if signal > 0 {
                    spec.signal = Some(signal as usize);
                }
                if let Some(color) = config.get_string(&section, "color") {
                    spec.color = normalize_color(&color);
                }
                spec.visible = config.get_bool(&section, "visible", true);
                let multiplier = config.get_double(&section, "multiplier", 0.0);
                if multiplier > 0.0 {
                    spec.multiplier = Some(multiplier);
                }
                spec
            })
        })
        .collect()
}

/// INI treats `#` as a comment marker, so bare hex digits get the prefix added back.
fn normalize_color(raw: &str) -> String {
    let raw = raw.trim();
    let is_hex = matches!(raw.len(), 3 | 6 | 8) && raw.chars().all(|c| c.is_ascii_hexdigit());
    if is_hex {
        format!("#{raw}")
    } else {
        raw.to_string()
    }
}
