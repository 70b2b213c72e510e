//! Core chart engine: coordinate transforms, indicators, interaction and paint
//! planning.

pub mod candle;
pub mod viewport;
pub mod indicator;
pub mod regime;
pub mod drawing;
pub mod interaction;
pub mod theme;
pub mod paint;
pub mod settings;
pub mod settings_validation;
pub mod chart_state;
pub mod error;
