//! Paint planning: turns one frame snapshot into an ordered list of draw
//! operations for an external surface.
//!
//! Operations are emitted strictly back to front by [`Layer`]. Any command whose
//! geometry is not finite is dropped, so a degenerate element simply draws
//! nothing instead of poisoning the frame.

pub mod annotations;
pub mod axes;
pub mod layout;
pub mod series;

pub use layout::{
    FrameLayout, LowerPane, PaneContent, compute_layout, price_range, price_range_with,
};

use crate::domain::candle::Candle;
use crate::domain::drawing::{Drawing, DrawingKind, Point};
use crate::domain::indicator::IndicatorOutput;
use crate::domain::interaction::Crosshair;
use crate::domain::regime::MarketState;
use crate::domain::settings::ChartSettings;
use crate::domain::theme::Palette;
use crate::domain::viewport::{Viewport, index_to_x};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Clear,
    Background,
    Grid,
    Indicators,
    PriceSeries,
    LowerPane,
    Annotations,
    PriceLine,
    Crosshair,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    pub color: String,
    pub width: f64,
    /// (dash, gap) in pixels.
    pub dash: Option<(f64, f64)>,
}

impl StrokeStyle {
    pub fn solid(color: &str, width: f64) -> Self {
        Self {
            color: color.to_string(),
            width,
            dash: None,
        }
    }

    pub fn dashed(color: &str, width: f64, dash: f64, gap: f64) -> Self {
        Self {
            color: color.to_string(),
            width,
            dash: Some((dash, gap)),
        }
    }

    pub fn is_dashed(&self) -> bool {
        self.dash.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub color: String,
    pub opacity: f64,
}

impl Fill {
    pub fn solid(color: &str) -> Self {
        Self::translucent(color, 1.0)
    }

    pub fn translucent(color: &str, opacity: f64) -> Self {
        Self {
            color: color.to_string(),
            opacity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    Clear {
        width: f64,
        height: f64,
    },
    FillRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Fill,
    },
    StrokeRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        stroke: StrokeStyle,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        stroke: StrokeStyle,
    },
    Path {
        points: Vec<(f64, f64)>,
        stroke: StrokeStyle,
    },
    FillPath {
        points: Vec<(f64, f64)>,
        fill: Fill,
    },
    Ellipse {
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
        stroke: StrokeStyle,
        fill: Option<Fill>,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        color: String,
        size: f64,
        anchor: TextAnchor,
    },
}

impl PaintCommand {
    /// Every coordinate and size is finite.
    pub fn is_finite(&self) -> bool {
        let all = |vals: &[f64]| vals.iter().all(|v| v.is_finite());
        match self {
            PaintCommand::Clear { width, height } => all(&[*width, *height]),
            PaintCommand::FillRect {
                x, y, width, height, ..
            }
            | PaintCommand::StrokeRect {
                x, y, width, height, ..
            } => all(&[*x, *y, *width, *height]),
            PaintCommand::Line { x1, y1, x2, y2, .. } => all(&[*x1, *y1, *x2, *y2]),
            PaintCommand::Path { points, .. } | PaintCommand::FillPath { points, .. } => {
                points.iter().all(|(x, y)| x.is_finite() && y.is_finite())
            }
            PaintCommand::Ellipse { cx, cy, rx, ry, .. } => all(&[*cx, *cy, *rx, *ry]),
            PaintCommand::Text { x, y, .. } => all(&[*x, *y]),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawOp {
    pub layer: Layer,
    pub command: PaintCommand,
}

/// Consistent read-only snapshot of everything one frame needs.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    pub candles: &'a [Candle],
    pub indicators: &'a [IndicatorOutput],
    pub market: &'a MarketState,
    pub annotations: &'a [Drawing],
    /// Drawing in progress: kind, start and current end point.
    pub pending: Option<(DrawingKind, Point, Point)>,
    pub viewport: Viewport,
    pub crosshair: Option<Crosshair>,
    pub settings: &'a ChartSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    pub ops: Vec<DrawOp>,
    pub layout: FrameLayout,
    pub crosshair: Option<Crosshair>,
}

impl FramePlan {
    pub fn ops_in(&self, layer: Layer) -> impl Iterator<Item = &PaintCommand> {
        self.ops
            .iter()
            .filter(move |op| op.layer == layer)
            .map(|op| &op.command)
    }
}

/// Frame-wide values shared by the layer painters.
pub(crate) struct Frame<'a> {
    pub input: &'a FrameInput<'a>,
    pub layout: &'a FrameLayout,
    pub palette: Palette,
    ops: Vec<DrawOp>,
}

impl<'a> Frame<'a> {
    fn new(input: &'a FrameInput<'a>, layout: &'a FrameLayout) -> Self {
        Self {
            input,
            layout,
            palette: Palette::for_theme(input.settings.theme),
            ops: Vec::new(),
        }
    }

    pub fn push(&mut self, layer: Layer, command: PaintCommand) {
        if command.is_finite() {
            self.ops.push(DrawOp { layer, command });
        }
    }

    /// Centre of the slot for candle `index`.
    pub fn center_x(&self, index: f64) -> f64 {
        let vp = &self.input.viewport;
        index_to_x(index, vp.offset, vp.candle_width, self.layout.padding.left)
            + vp.candle_width / 2.0
    }

    /// Left edge of the slot for fractional candle `index`, as used by annotation anchors.
    pub fn slot_x(&self, index: f64) -> f64 {
        let vp = &self.input.viewport;
        index_to_x(index, vp.offset, vp.candle_width, self.layout.padding.left)
    }

    pub fn price_y(&self, price: f64) -> f64 {
        self.layout.price_scale.to_y(price)
    }

    pub fn plot_left(&self) -> f64 {
        self.layout.padding.left
    }

    pub fn plot_right(&self) -> f64 {
        self.layout.padding.left + self.layout.dims.chart_width
    }

    pub fn candle_width(&self) -> f64 {
        self.input.viewport.candle_width
    }

    /// Visible candle indices widened by one on each side so lines reach the edges.
    pub fn line_span(&self, len: usize) -> std::ops::Range<usize> {
        let v = self.layout.visible;
        v.start.saturating_sub(1).min(len)..(v.end + 1).min(len)
    }
}

/// Plans one frame. Pure: the same snapshot always yields the same plan.
pub fn plan_frame(input: &FrameInput<'_>) -> FramePlan {
    let layout = compute_layout(
        input.settings,
        &input.viewport,
        input.candles,
        input.indicators,
        input.market,
    );
    let ops = {
        let mut frame = Frame::new(input, &layout);
        axes::paint_background(&mut frame);
        if input.settings.show_grid {
            axes::paint_grid(&mut frame);
        }
        if input.settings.show_market_emas {
            series::paint_market_emas(&mut frame);
        }
        if input.settings.show_volume_profile {
            series::paint_volume_profile(&mut frame);
        }
        series::paint_overlays(&mut frame);
        series::paint_price_series(&mut frame);
        series::paint_lower_panes(&mut frame);
        annotations::paint_annotations(&mut frame);
        axes::paint_price_line(&mut frame);
        if input.settings.show_crosshair {
            axes::paint_crosshair(&mut frame);
        }
        frame.ops
    };
    tracing::debug!(
        ops = ops.len(),
        start = layout.visible.start,
        end = layout.visible.end,
        "frame planned"
    );
    FramePlan {
        ops,
        layout,
        crosshair: input.crosshair,
    }
}
