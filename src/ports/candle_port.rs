//! Candle source port trait.

use crate::domain::candle::Candle;
use crate::domain::error::ChartError;

pub trait CandlePort {
    /// Candles for `symbol`, sorted by ascending time with no duplicate times.
    fn fetch_candles(&self, symbol: &str) -> Result<Vec<Candle>, ChartError>;
}
