//! Chart configuration validation.
//!
//! Validates every `[chart]` and `[indicator.<kind>]` field before settings are
//! built. The first problem found is returned.

use crate::domain::error::ChartError;
use crate::domain::indicator::IndicatorKind;
use crate::domain::settings::{
    ChartType, INDICATOR_SECTION_PREFIX, MAX_LOWER_PANE_RATIO, MAX_PROFILE_BINS,
};
use crate::domain::theme::Theme;
use crate::domain::viewport::{MAX_CANDLE_WIDTH, MIN_CANDLE_WIDTH};
use crate::ports::config_port::ConfigPort;

const CHART: &str = "chart";

pub fn validate_chart_config(config: &dyn ConfigPort) -> Result<(), ChartError> {
    validate_dimensions(config)?;
    validate_theme(config)?;
    validate_chart_type(config)?;
    validate_candle_width(config)?;
    validate_offset(config)?;
    validate_zoom_sensitivity(config)?;
    validate_padding(config)?;
    validate_lower_pane_ratio(config)?;
    validate_profile_bins(config)?;
    validate_indicators(config)?;
    Ok(())
}

/// Parses an optional numeric key. Present but non-numeric values are errors
/// rather than silently falling back to the default.
pub(crate) fn optional_number(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<f64>, ChartError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| ChartError::invalid(section, key, format!("{key} must be a number"))),
    }
}

fn optional_integer(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<i64>, ChartError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ChartError::invalid(section, key, format!("{key} must be an integer"))),
    }
}

fn validate_dimensions(config: &dyn ConfigPort) -> Result<(), ChartError> {
    for key in ["width", "height"] {
        if let Some(value) = optional_integer(config, CHART, key)? {
            if value <= 0 {
                return Err(ChartError::invalid(CHART, key, format!("{key} must be positive")));
            }
        }
    }
    Ok(())
}

fn validate_theme(config: &dyn ConfigPort) -> Result<(), ChartError> {
    if let Some(raw) = config.get_string(CHART, "theme") {
        raw.parse::<Theme>()
            .map_err(|reason| ChartError::invalid(CHART, "theme", reason))?;
    }
    Ok(())
}

fn validate_chart_type(config: &dyn ConfigPort) -> Result<(), ChartError> {
    if let Some(raw) = config.get_string(CHART, "chart_type") {
        raw.parse::<ChartType>()
            .map_err(|reason| ChartError::invalid(CHART, "chart_type", reason))?;
    }
    Ok(())
}

fn validate_candle_width(config: &dyn ConfigPort) -> Result<(), ChartError> {
    if let Some(value) = optional_number(config, CHART, "candle_width")? {
        if !(MIN_CANDLE_WIDTH..=MAX_CANDLE_WIDTH).contains(&value) {
            return Err(ChartError::invalid(
                CHART,
                "candle_width",
                format!("candle_width must be between {MIN_CANDLE_WIDTH} and {MAX_CANDLE_WIDTH}"),
            ));
        }
    }
    Ok(())
}

fn validate_offset(config: &dyn ConfigPort) -> Result<(), ChartError> {
    optional_number(config, CHART, "offset")?;
    Ok(())
}

fn validate_zoom_sensitivity(config: &dyn ConfigPort) -> Result<(), ChartError> {
    if let Some(value) = optional_number(config, CHART, "zoom_sensitivity")? {
        if value <= 0.0 {
            return Err(ChartError::invalid(
                CHART,
                "zoom_sensitivity",
                "zoom_sensitivity must be positive",
            ));
        }
    }
    Ok(())
}

fn validate_padding(config: &dyn ConfigPort) -> Result<(), ChartError> {
    for key in ["padding_top", "padding_right", "padding_bottom", "padding_left"] {
        if let Some(value) = optional_number(config, CHART, key)? {
            if value < 0.0 {
                return Err(ChartError::invalid(
                    CHART,
                    key,
                    format!("{key} must be non-negative"),
                ));
            }
        }
    }
    Ok(())
}

fn validate_lower_pane_ratio(config: &dyn ConfigPort) -> Result<(), ChartError> {
    if let Some(value) = optional_number(config, CHART, "lower_pane_ratio")? {
        if !(0.0..=MAX_LOWER_PANE_RATIO).contains(&value) {
            return Err(ChartError::invalid(
                CHART,
                "lower_pane_ratio",
                format!("lower_pane_ratio must be between 0 and {MAX_LOWER_PANE_RATIO}"),
            ));
        }
    }
    Ok(())
}

fn validate_profile_bins(config: &dyn ConfigPort) -> Result<(), ChartError> {
    if let Some(value) = optional_integer(config, CHART, "volume_profile_bins")? {
        if !(1..=MAX_PROFILE_BINS as i64).contains(&value) {
            return Err(ChartError::invalid(
                CHART,
                "volume_profile_bins",
                format!("volume_profile_bins must be between 1 and {MAX_PROFILE_BINS}"),
            ));
        }
    }
    Ok(())
}

fn validate_indicators(config: &dyn ConfigPort) -> Result<(), ChartError> {
    for section in config.sections() {
        let Some(name) = section.strip_prefix(INDICATOR_SECTION_PREFIX) else {
            continue;
        };
        name.parse::<IndicatorKind>()
            .map_err(|reason| ChartError::invalid(&section, "kind", reason))?;

        for key in ["period", "signal"] {
            if let Some(value) = optional_integer(config, &section, key)? {
                if value < 1 {
                    return Err(ChartError::invalid(
                        &section,
                        key,
                        format!("{key} must be at least 1"),
                    ));
                }
            }
        }

        if let Some(value) = optional_number(config, &section, "multiplier")? {
            if value <= 0.0 {
                return Err(ChartError::invalid(
                    &section,
                    "multiplier",
                    "multiplier must be positive",
                ));
            }
        }

        if let Some(color) = config.get_string(&section, "color") {
            if color.trim().is_empty() {
                return Err(ChartError::ConfigMissing {
                    section: section.clone(),
                    key: "color".to_string(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    fn invalid_key(content: &str) -> String {
        match validate_chart_config(&make_config(content)).unwrap_err() {
            ChartError::ConfigInvalid { key, .. } => key,
            other => panic!("expected ConfigInvalid, got {other:?}"),
        }
    }

    #[test]
    fn empty_config_is_valid() {
        assert!(validate_chart_config(&make_config("")).is_ok());
    }

    #[test]
    fn full_config_passes() {
        let config = make_config(
            r#"
[chart]
width = 1200
height = 600
theme = light
chart_type = hollow
candle_width = 8
offset = 120.5
zoom_sensitivity = 0.002
padding_top = 10
padding_right = 70
padding_bottom = 25
padding_left = 0
lower_pane_ratio = 0.3
show_market_emas = yes
show_volume_profile = true
volume_profile_bins = 24

[indicator.sma]
period = 50
color = #ff0000

[indicator.bollinger]
period = 20
multiplier = 2.5

[indicator.macd]
signal = 9
"#,
        );
        assert!(validate_chart_config(&config).is_ok());
    }

    #[test]
    fn width_must_be_positive() {
        assert_eq!(invalid_key("[chart]\nwidth = 0\n"), "width");
        assert_eq!(invalid_key("[chart]\nheight = -5\n"), "height");
    }

    #[test]
    fn width_must_be_integer() {
        assert_eq!(invalid_key("[chart]\nwidth = wide\n"), "width");
    }

    #[test]
    fn unknown_theme_fails() {
        assert_eq!(invalid_key("[chart]\ntheme = neon\n"), "theme");
    }

    #[test]
    fn unknown_chart_type_fails() {
        assert_eq!(invalid_key("[chart]\nchart_type = renko\n"), "chart_type");
    }

    #[test]
    fn candle_width_out_of_range_fails() {
        assert_eq!(invalid_key("[chart]\ncandle_width = 0.5\n"), "candle_width");
        assert_eq!(invalid_key("[chart]\ncandle_width = 101\n"), "candle_width");
    }

    #[test]
    fn candle_width_boundaries_pass() {
        assert!(validate_chart_config(&make_config("[chart]\ncandle_width = 1\n")).is_ok());
        assert!(validate_chart_config(&make_config("[chart]\ncandle_width = 100\n")).is_ok());
    }

    #[test]
    fn offset_must_be_numeric() {
        assert_eq!(invalid_key("[chart]\noffset = left\n"), "offset");
    }

    #[test]
    fn zoom_sensitivity_must_be_positive() {
        assert_eq!(invalid_key("[chart]\nzoom_sensitivity = 0\n"), "zoom_sensitivity");
        assert_eq!(invalid_key("[chart]\nzoom_sensitivity = inf\n"), "zoom_sensitivity");
    }

    #[test]
    fn negative_padding_fails() {
        assert_eq!(invalid_key("[chart]\npadding_left = -1\n"), "padding_left");
    }

    #[test]
    fn lower_pane_ratio_out_of_range_fails() {
        assert_eq!(invalid_key("[chart]\nlower_pane_ratio = 0.9\n"), "lower_pane_ratio");
    }

    #[test]
    fn volume_profile_bins_out_of_range_fails() {
        assert_eq!(invalid_key("[chart]\nvolume_profile_bins = 0\n"), "volume_profile_bins");
        assert_eq!(invalid_key("[chart]\nvolume_profile_bins = 500\n"), "volume_profile_bins");
    }

    #[test]
    fn unknown_indicator_fails() {
        let err = validate_chart_config(&make_config("[indicator.ichimoku]\nperiod = 9\n")).unwrap_err();
        assert!(
            matches!(err, ChartError::ConfigInvalid { section, key, .. } if section == "indicator.ichimoku" && key == "kind")
        );
    }

    #[test]
    fn indicator_period_zero_fails() {
        assert_eq!(invalid_key("[indicator.rsi]\nperiod = 0\n"), "period");
    }

    #[test]
    fn indicator_signal_zero_fails() {
        assert_eq!(invalid_key("[indicator.macd]\nsignal = 0\n"), "signal");
    }

    #[test]
    fn bollinger_multiplier_must_be_positive() {
        assert_eq!(invalid_key("[indicator.bollinger]\nmultiplier = -2\n"), "multiplier");
    }

    #[test]
    fn first_error_wins() {
        assert_eq!(invalid_key("[chart]\nwidth = 0\ntheme = neon\n"), "width");
    }
}
