//! Raster surface port trait.

use crate::domain::error::ChartError;
use crate::domain::paint::FramePlan;

/// Consumer of planned frames. Commands arrive already ordered back to front.
pub trait SurfacePort {
    fn present(&mut self, plan: &FramePlan) -> Result<(), ChartError>;
}
