//! Target-price alert port trait.

use crate::domain::error::ChartError;

/// Collaborator that receives target-price requests raised by a double click
/// on the chart.
pub trait AlertPort {
    fn create_alert(&mut self, price: f64) -> Result<(), ChartError>;
}
