#![allow(dead_code)]

pub use candlechart::domain::candle::Candle;
use candlechart::domain::error::ChartError;
use candlechart::domain::paint::FramePlan;
use candlechart::ports::alert_port::AlertPort;
use candlechart::ports::candle_port::CandlePort;
use candlechart::ports::surface_port::SurfacePort;
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

pub const START_TIME: i64 = 1_700_000_000;
pub const HOUR: i64 = 3_600;

pub struct MockCandlePort {
    pub data: HashMap<String, Vec<Candle>>,
    pub errors: HashMap<String, String>,
}

impl MockCandlePort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_candles(mut self, symbol: &str, candles: Vec<Candle>) -> Self {
        self.data.insert(symbol.to_string(), candles);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl CandlePort for MockCandlePort {
    fn fetch_candles(&self, symbol: &str) -> Result<Vec<Candle>, ChartError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(ChartError::Data {
                reason: reason.clone(),
            });
        }
        match self.data.get(symbol) {
            Some(candles) if !candles.is_empty() => Ok(candles.clone()),
            _ => Err(ChartError::NoData {
                source_name: symbol.to_string(),
            }),
        }
    }
}

/// Surface that keeps every presented plan.
#[derive(Default)]
pub struct RecordingSurface {
    pub frames: Vec<FramePlan>,
}

impl SurfacePort for RecordingSurface {
    fn present(&mut self, plan: &FramePlan) -> Result<(), ChartError> {
        self.frames.push(plan.clone());
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct RecordingAlerts {
    pub prices: Rc<RefCell<Vec<f64>>>,
}

impl AlertPort for RecordingAlerts {
    fn create_alert(&mut self, price: f64) -> Result<(), ChartError> {
        self.prices.borrow_mut().push(price);
        Ok(())
    }
}

pub struct FailingAlerts;

impl AlertPort for FailingAlerts {
    fn create_alert(&mut self, _price: f64) -> Result<(), ChartError> {
        Err(ChartError::Data {
            reason: "alert service unavailable".into(),
        })
    }
}

pub fn candle_from_close(i: usize, prev: f64, close: f64) -> Candle {
    let high = prev.max(close) + 0.5;
    let low = prev.min(close) - 0.5;
    Candle::new(START_TIME + i as i64 * HOUR, prev, high, low, close, 1_000.0 + i as f64)
}

/// Candles whose closes follow `closes`; each opens at the previous close.
pub fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
    let mut prev = closes.first().copied().unwrap_or(0.0);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let c = candle_from_close(i, prev, close);
            prev = close;
            c
        })
        .collect()
}

pub fn rising_candles(n: usize) -> Vec<Candle> {
    let closes: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
    candles_from_closes(&closes)
}

/// Deterministic zig-zag walk around 100.
pub fn wave_candles(n: usize) -> Vec<Candle> {
    let closes: Vec<f64> = (0..n)
        .map(|i| 100.0 + 10.0 * (i as f64 / 7.0).sin() + (i % 3) as f64)
        .collect();
    candles_from_closes(&closes)
}

pub fn flat_candles(n: usize, price: f64) -> Vec<Candle> {
    (0..n)
        .map(|i| Candle::flat(START_TIME + i as i64 * HOUR, price, 0.0))
        .collect()
}

pub fn candles_csv(candles: &[Candle]) -> String {
    let mut out = String::from("time,open,high,low,close,volume\n");
    for c in candles {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            c.time, c.open, c.high, c.low, c.close, c.volume
        ));
    }
    out
}

pub fn write_temp(content: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
