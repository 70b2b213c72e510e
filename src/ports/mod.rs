//! Port traits at the engine's I/O seams.

pub mod alert_port;
pub mod candle_port;
pub mod config_port;
pub mod surface_port;
