//! INI file configuration adapter.
//!
//! Section and key names are case-insensitive. Values are returned verbatim;
//! configparser treats `#` and `;` as comment starts, so colours may be given
//! as bare hex (`22c55e`).

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_ref()
            .and_then(|v| Self::parse_bool(v))
            .unwrap_or(default)
    }

    fn sections(&self) -> Vec<String> {
        let mut sections = self.config.sections();
        sections.sort();
        sections
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    const CHART_INI: &str = r#"
[chart]
width = 1200
height = 600
theme = light
candle_width = 8.5
show_grid = no

[indicator.sma]
period = 50
color = f59e0b

[Indicator.RSI]
period = 14
"#;

    #[test]
    fn from_string_parses_chart_section() {
        let adapter = FileConfigAdapter::from_string(CHART_INI).unwrap();
        assert_eq!(adapter.get_string("chart", "theme"), Some("light".to_string()));
        assert_eq!(adapter.get_int("chart", "width", 0), 1200);
        assert_eq!(adapter.get_double("chart", "candle_width", 0.0), 8.5);
        assert!(!adapter.get_bool("chart", "show_grid", true));
    }

    #[test]
    fn sections_are_listed_lowercase_and_sorted() {
        let adapter = FileConfigAdapter::from_string(CHART_INI).unwrap();
        assert_eq!(
            adapter.sections(),
            vec!["chart", "indicator.rsi", "indicator.sma"]
        );
        assert_eq!(adapter.get_int("indicator.rsi", "period", 0), 14);
    }

    #[test]
    fn bare_hex_colour_survives_parsing() {
        let adapter = FileConfigAdapter::from_string(CHART_INI).unwrap();
        assert_eq!(
            adapter.get_string("indicator.sma", "color"),
            Some("f59e0b".to_string())
        );
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[chart]\nwidth = 100\n").unwrap();
        assert_eq!(adapter.get_string("chart", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn numeric_getters_fall_back_to_default() {
        let adapter =
            FileConfigAdapter::from_string("[chart]\nwidth = wide\nzoom_sensitivity = fast\n")
                .unwrap();
        assert_eq!(adapter.get_int("chart", "width", 42), 42);
        assert_eq!(adapter.get_int("chart", "missing", 7), 7);
        assert_eq!(adapter.get_double("chart", "zoom_sensitivity", 0.5), 0.5);
        assert_eq!(adapter.get_double("chart", "missing", 99.9), 99.9);
    }

    #[test]
    fn get_bool_accepts_word_and_digit_forms() {
        let adapter = FileConfigAdapter::from_string(
            "[chart]\na = true\nb = yes\nc = 1\nd = false\ne = no\nf = 0\ng = maybe\n",
        )
        .unwrap();
        for key in ["a", "b", "c"] {
            assert!(adapter.get_bool("chart", key, false), "{key}");
        }
        for key in ["d", "e", "f"] {
            assert!(!adapter.get_bool("chart", key, true), "{key}");
        }
        assert!(adapter.get_bool("chart", "g", true));
        assert!(!adapter.get_bool("chart", "missing", false));
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[chart]\nchart_type = ohlc\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(adapter.get_string("chart", "chart_type"), Some("ohlc".to_string()));
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/chart.ini");
        assert!(result.is_err());
    }

    #[test]
    fn empty_document_has_no_sections() {
        let adapter = FileConfigAdapter::from_string("").unwrap();
        assert!(adapter.sections().is_empty());
    }
}
