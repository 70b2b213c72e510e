//! Viewport math: time index <-> pixel x, price <-> pixel y.
//!
//! Everything here is pure and allocation free. Degenerate inputs (zero price
//! span, zero candle width, empty series) produce finite fallbacks so that no
//! `NaN` or infinity reaches the paint stage.

pub const MIN_CANDLE_WIDTH: f64 = 1.0;
pub const MAX_CANDLE_WIDTH: f64 = 100.0;
/// Candles of allowed over-scroll before the first candle.
pub const OVERSCROLL_LEFT: f64 = 5.0;
/// Candles of allowed over-scroll past the last candle.
pub const OVERSCROLL_RIGHT: f64 = 20.0;
/// `scale` is always `candle_width / SCALE_BASE`.
pub const SCALE_BASE: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewport {
    /// Fractional candle index of the left edge.
    pub offset: f64,
    pub scale: f64,
    /// Slot width of one candle in pixels.
    pub candle_width: f64,
}

impl Viewport {
    pub fn new(offset: f64, candle_width: f64) -> Self {
        let candle_width = clamp_candle_width(candle_width);
        Self {
            offset: if offset.is_finite() { offset } else { 0.0 },
            scale: candle_width / SCALE_BASE,
            candle_width,
        }
    }

    /// Viewport whose right edge sits just past the last candle.
    pub fn fit_latest(total_candles: usize, chart_width: f64, candle_width: f64) -> Self {
        let candle_width = clamp_candle_width(candle_width);
        let visible = if chart_width > 0.0 {
            chart_width / candle_width
        } else {
            0.0
        };
        let offset = clamp_offset(total_candles as f64 - visible + 2.0, total_candles);
        Self::new(offset, candle_width)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0.0, 10.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Padding {
    fn default() -> Self {
        Self {
            top: 20.0,
            right: 60.0,
            bottom: 30.0,
            left: 0.0,
        }
    }
}

/// Surface size plus the plot area left after padding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartDimensions {
    pub width: f64,
    pub height: f64,
    pub chart_width: f64,
    pub chart_height: f64,
}

impl ChartDimensions {
    pub fn new(width: f64, height: f64, padding: &Padding) -> Self {
        let width = width.max(0.0);
        let height = height.max(0.0);
        Self {
            width,
            height,
            chart_width: (width - padding.left - padding.right).max(0.0),
            chart_height: (height - padding.top - padding.bottom).max(0.0),
        }
    }
}

/// Half-open candle index range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisibleRange {
    pub start: usize,
    pub end: usize,
}

impl VisibleRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end
    }
}

pub fn index_to_x(index: f64, offset: f64, candle_width: f64, padding_left: f64) -> f64 {
    (index - offset) * candle_width + padding_left
}

pub fn x_to_index(x: f64, offset: f64, candle_width: f64, padding_left: f64) -> f64 {
    if candle_width == 0.0 {
        return offset;
    }
    (x - padding_left) / candle_width + offset
}

/// Linear price map with Y inverted. A zero span maps every price to the
/// vertical midpoint of the plot area.
pub fn price_to_y(
    price: f64,
    min: f64,
    max: f64,
    height: f64,
    pad_top: f64,
    pad_bottom: f64,
) -> f64 {
    let plot = height - pad_top - pad_bottom;
    let span = max - min;
    if span == 0.0 || !span.is_finite() {
        return pad_top + plot / 2.0;
    }
    pad_top + plot - ((price - min) / span) * plot
}

/// Inverse of [`price_to_y`]. A zero span or zero plot height returns the
/// range midpoint.
pub fn y_to_price(y: f64, min: f64, max: f64, height: f64, pad_top: f64, pad_bottom: f64) -> f64 {
    let plot = height - pad_top - pad_bottom;
    let span = max - min;
    if span == 0.0 || plot == 0.0 || !span.is_finite() {
        return (min + max) / 2.0;
    }
    min + ((pad_top + plot - y) / plot) * span
}

/// Vertical mapping for one pane: a price range laid over `height` pixels
/// starting `origin` pixels from the top of the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceScale {
    pub min: f64,
    pub max: f64,
    pub origin: f64,
    pub height: f64,
    pub pad_top: f64,
    pub pad_bottom: f64,
}

impl PriceScale {
    pub fn to_y(&self, price: f64) -> f64 {
        self.origin + price_to_y(price, self.min, self.max, self.height, self.pad_top, self.pad_bottom)
    }

    pub fn to_price(&self, y: f64) -> f64 {
        y_to_price(y - self.origin, self.min, self.max, self.height, self.pad_top, self.pad_bottom)
    }

    pub fn top(&self) -> f64 {
        self.origin + self.pad_top
    }

    pub fn bottom(&self) -> f64 {
        self.origin + self.height - self.pad_bottom
    }
}

/// Clamps to `[-OVERSCROLL_LEFT, total + OVERSCROLL_RIGHT]`. Non-finite input
/// resets to 0 clamped into range.
pub fn clamp_offset(offset: f64, total_candles: usize) -> f64 {
    let lo = -OVERSCROLL_LEFT;
    let hi = total_candles as f64 + OVERSCROLL_RIGHT;
    let offset = if offset.is_finite() { offset } else { 0.0 };
    offset.clamp(lo, hi)
}

pub fn clamp_candle_width(width: f64) -> f64 {
    if width.is_nan() {
        return MIN_CANDLE_WIDTH;
    }
    width.clamp(MIN_CANDLE_WIDTH, MAX_CANDLE_WIDTH)
}

/// Indices of the candles that intersect the plot area. Always yields
/// `start <= end <= total_candles`.
pub fn visible_range(
    viewport: &Viewport,
    dims: &ChartDimensions,
    total_candles: usize,
) -> VisibleRange {
    if total_candles == 0 || viewport.candle_width <= 0.0 || !viewport.offset.is_finite() {
        return VisibleRange::default();
    }
    let visible_count = (dims.chart_width.max(0.0) / viewport.candle_width).ceil();
    let start = viewport.offset.floor().max(0.0);
    let end = (viewport.offset + visible_count).ceil() + 1.0;

    let total = total_candles as f64;
    let start = start.min(total) as usize;
    let end = end.clamp(0.0, total) as usize;
    VisibleRange {
        start: start.min(end),
        end,
    }
}
