//! CSV file candle adapter.
//!
//! Files are looked up as `<base_path>/<symbol>.csv` and need a header row with
//! `time` (or `date`/`timestamp`), `open`, `high`, `low`, `close` and an optional
//! `volume` column, in any order. Times may be unix seconds, `YYYY-MM-DD`,
//! `YYYY-MM-DD HH:MM:SS` or RFC 3339.

use crate::domain::candle::Candle;
use crate::domain::error::ChartError;
use crate::ports::candle_port::CandlePort;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

struct Columns {
    time: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, ChartError> {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
        };
        let require = |names: &[&str]| {
            find(names).ok_or_else(|| ChartError::Data {
                reason: format!("missing {} column", names[0]),
            })
        };
        Ok(Self {
            time: require(&["time", "date", "timestamp"])?,
            open: require(&["open"])?,
            high: require(&["high"])?,
            low: require(&["low"])?,
            close: require(&["close"])?,
            volume: find(&["volume"]),
        })
    }
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        if symbol.ends_with(".csv") {
            self.base_path.join(symbol)
        } else {
            self.base_path.join(format!("{}.csv", symbol))
        }
    }
}

fn parse_time(value: &str) -> Result<i64, ChartError> {
    let value = value.trim();
    if let Ok(secs) = value.parse::<i64>() {
        return Ok(secs);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.timestamp());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.and_utc().timestamp());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
        .ok_or_else(|| ChartError::Data {
            reason: format!("invalid time value: {}", value),
        })
}

fn parse_field(record: &csv::StringRecord, index: usize, name: &str) -> Result<f64, ChartError> {
    let raw = record.get(index).ok_or_else(|| ChartError::Data {
        reason: format!("missing {} value", name),
    })?;
    let value: f64 = raw.trim().parse().map_err(|e| ChartError::Data {
        reason: format!("invalid {} value: {}", name, e),
    })?;
    if !value.is_finite() {
        return Err(ChartError::Data {
            reason: format!("non-finite {} value: {}", name, raw),
        });
    }
    Ok(value)
}

impl CandlePort for CsvAdapter {
    fn fetch_candles(&self, symbol: &str) -> Result<Vec<Candle>, ChartError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| ChartError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| ChartError::Data {
            reason: format!("CSV header error: {}", e),
        })?;
        let cols = Columns::from_headers(headers)?;

        let mut candles = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| ChartError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;
            let time = parse_time(record.get(cols.time).unwrap_or_default())?;
            let volume = match cols.volume {
                Some(i) => parse_field(&record, i, "volume")?,
                None => 0.0,
            };
            candles.push(Candle::new(
                time,
                parse_field(&record, cols.open, "open")?,
                parse_field(&record, cols.high, "high")?,
                parse_field(&record, cols.low, "low")?,
                parse_field(&record, cols.close, "close")?,
                volume,
            ));
        }

        if candles.is_empty() {
            return Err(ChartError::NoData {
                source_name: path.display().to_string(),
            });
        }

        candles.sort_by_key(|c| c.time);
        if let Some(pair) = candles.windows(2).find(|w| w[0].time == w[1].time) {
            return Err(ChartError::Data {
                reason: format!("duplicate candle time {} in {}", pair[0].time, path.display()),
            });
        }
        tracing::debug!(path = %path.display(), candles = candles.len(), "candles loaded");
        Ok(candles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        fs::write(
            path.join("BTCUSD.csv"),
            "time,open,high,low,close,volume\n\
             1700007200,105.0,115.0,100.0,110.0,60000\n\
             1700000000,100.0,110.0,90.0,105.0,50000\n\
             1700003600,110.0,120.0,105.0,115.0,55000\n",
        )
        .unwrap();
        fs::write(
            path.join("DAILY.csv"),
            "Date,Close,Open,Low,High\n2024-01-16,11,10,9,12\n2024-01-15,10,9,8,11\n",
        )
        .unwrap();
        fs::write(path.join("EMPTY.csv"), "time,open,high,low,close,volume\n").unwrap();
        fs::write(
            path.join("DUP.csv"),
            "time,open,high,low,close\n60,1,2,0,1\n60,1,2,0,1\n",
        )
        .unwrap();

        (dir, path)
    }

    #[test]
    fn fetch_candles_sorts_by_time() {
        let (_dir, path) = setup_test_data();
        let candles = CsvAdapter::new(path).fetch_candles("BTCUSD").unwrap();
        assert_eq!(candles.len(), 3);
        assert_eq!(candles[0], Candle::new(1_700_000_000, 100.0, 110.0, 90.0, 105.0, 50_000.0));
        assert!(candles.windows(2).all(|w| w[0].time < w[1].time));
    }

    #[test]
    fn columns_are_found_by_name_and_volume_is_optional() {
        let (_dir, path) = setup_test_data();
        let candles = CsvAdapter::new(path).fetch_candles("DAILY.csv").unwrap();
        // 2024-01-15T00:00:00Z
        assert_eq!(candles[0].time, 1_705_276_800);
        assert_eq!(candles[0].open, 9.0);
        assert_eq!(candles[0].high, 11.0);
        assert_eq!(candles[0].volume, 0.0);
    }

    #[test]
    fn empty_file_is_no_data() {
        let (_dir, path) = setup_test_data();
        let result = CsvAdapter::new(path).fetch_candles("EMPTY");
        assert!(matches!(result, Err(ChartError::NoData { .. })));
    }

    #[test]
    fn duplicate_times_are_rejected() {
        let (_dir, path) = setup_test_data();
        let err = CsvAdapter::new(path).fetch_candles("DUP").unwrap_err();
        assert!(err.to_string().contains("duplicate candle time 60"));
    }

    #[test]
    fn missing_file_is_a_data_error() {
        let (_dir, path) = setup_test_data();
        let result = CsvAdapter::new(path).fetch_candles("XYZ");
        assert!(matches!(result, Err(ChartError::Data { .. })));
    }

    #[test]
    fn missing_column_is_reported() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bad.csv"), "time,open,high,close\n1,1,1,1\n").unwrap();
        let err = CsvAdapter::new(dir.path().to_path_buf())
            .fetch_candles("bad")
            .unwrap_err();
        assert_eq!(err.to_string(), "data error: missing low column");
    }

    #[test]
    fn parse_time_accepts_common_forms() {
        assert_eq!(parse_time("86400").unwrap(), 86_400);
        assert_eq!(parse_time("1970-01-02").unwrap(), 86_400);
        assert_eq!(parse_time("1970-01-02 00:01:00").unwrap(), 86_460);
        assert_eq!(parse_time("1970-01-02T00:00:00+01:00").unwrap(), 82_800);
        assert!(parse_time("yesterday").is_err());
    }
}
