//! Error types for the configuration, data and rendering edges.
//!
//! The engine itself (transforms, indicators, interaction, planning) never fails;
//! only loading settings, reading candles and writing output return these.

#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no candles available from {source_name}")]
    NoData { source_name: String },

    #[error("render error: {reason}")]
    Render { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ChartError {
    pub fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        ChartError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&ChartError> for std::process::ExitCode {
    fn from(err: &ChartError) -> Self {
        let code: u8 = match err {
            ChartError::Io(_) => 1,
            ChartError::ConfigParse { .. }
            | ChartError::ConfigMissing { .. }
            | ChartError::ConfigInvalid { .. } => 2,
            ChartError::Data { .. } | ChartError::NoData { .. } => 3,
            ChartError::Render { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_message_names_section_and_key() {
        let err = ChartError::invalid("chart", "width", "width must be positive");
        assert_eq!(
            err.to_string(),
            "invalid config value [chart] width: width must be positive"
        );
    }

    #[test]
    fn io_error_is_transparent() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: ChartError = io.into();
        assert_eq!(err.to_string(), "gone");
    }

    #[test]
    fn no_data_message() {
        let err = ChartError::NoData {
            source_name: "btc.csv".into(),
        };
        assert_eq!(err.to_string(), "no candles available from btc.csv");
    }
}
