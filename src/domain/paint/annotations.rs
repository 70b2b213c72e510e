//! Committed, suggested and in-progress annotations.

use super::{Fill, Frame, Layer, PaintCommand, StrokeStyle, TextAnchor};
use crate::domain::drawing::{AnnotationSource, DEFAULT_DRAWING_COLOR, Drawing, DrawingKind, Point};

pub const SUGGESTED_FILL_OPACITY: f64 = 0.15;
pub const SUGGESTED_DASH: (f64, f64) = (6.0, 4.0);
pub const USER_ZONE_OPACITY: f64 = 0.1;
const STROKE_WIDTH: f64 = 1.5;
const LABEL_SIZE: f64 = 10.0;

struct Style {
    stroke: StrokeStyle,
    /// Fill for closed shapes; `None` leaves them outlined only.
    fill: Option<Fill>,
}

fn style_for(color: &str, source: &AnnotationSource) -> Style {
    match source {
        AnnotationSource::User => Style {
            stroke: StrokeStyle::solid(color, STROKE_WIDTH),
            fill: None,
        },
        AnnotationSource::Suggested { .. } => Style {
            stroke: StrokeStyle::dashed(color, STROKE_WIDTH, SUGGESTED_DASH.0, SUGGESTED_DASH.1),
            fill: Some(Fill::translucent(color, SUGGESTED_FILL_OPACITY)),
        },
    }
}

pub(crate) fn paint_annotations(frame: &mut Frame<'_>) {
    let input = frame.input;
    for drawing in input.annotations.iter().filter(|d| d.visible) {
        let (Some(start), Some(end)) = (drawing.start(), drawing.end()) else {
            continue;
        };
        let style = style_for(&drawing.color, &drawing.source);
        paint_shape(frame, drawing.kind, start, end, &style);
        if let Some(label) = &drawing.label {
            let color = drawing.color.clone();
            frame.push(
                Layer::Annotations,
                PaintCommand::Text {
                    x: frame.slot_x(start.x) + 4.0,
                    y: frame.price_y(start.y) - 4.0,
                    text: label.clone(),
                    color,
                    size: LABEL_SIZE,
                    anchor: TextAnchor::Start,
                },
            );
        }
    }

    if let Some((kind, start, end)) = input.pending {
        let style = Style {
            stroke: StrokeStyle::solid(DEFAULT_DRAWING_COLOR, STROKE_WIDTH),
            fill: None,
        };
        paint_shape(frame, kind, start, end, &style);
    }
}

fn paint_shape(frame: &mut Frame<'_>, kind: DrawingKind, start: Point, end: Point, style: &Style) {
    let (x1, y1) = (frame.slot_x(start.x), frame.price_y(start.y));
    let (x2, y2) = (frame.slot_x(end.x), frame.price_y(end.y));
    let (left, right) = (frame.plot_left(), frame.plot_right());
    let (top, bottom) = (frame.layout.price_scale.top(), frame.layout.price_scale.bottom());
    let stroke = || style.stroke.clone();

    match kind {
        DrawingKind::Trendline => {
            frame.push(Layer::Annotations, PaintCommand::Line { x1, y1, x2, y2, stroke: stroke() });
        }
        DrawingKind::Ray => {
            let (ex, ey) = ray_end(x1, y1, x2, y2, left, right);
            frame.push(
                Layer::Annotations,
                PaintCommand::Line { x1, y1, x2: ex, y2: ey, stroke: stroke() },
            );
        }
        DrawingKind::Horizontal => {
            frame.push(
                Layer::Annotations,
                PaintCommand::Line { x1: left, y1, x2: right, y2: y1, stroke: stroke() },
            );
        }
        DrawingKind::Vertical => {
            frame.push(
                Layer::Annotations,
                PaintCommand::Line { x1, y1: top, x2: x1, y2: bottom, stroke: stroke() },
            );
        }
        DrawingKind::Rectangle => {
            let (x, y) = (x1.min(x2), y1.min(y2));
            let (width, height) = ((x2 - x1).abs(), (y2 - y1).abs());
            if let Some(fill) = &style.fill {
                frame.push(
                    Layer::Annotations,
                    PaintCommand::FillRect { x, y, width, height, fill: fill.clone() },
                );
            }
            frame.push(
                Layer::Annotations,
                PaintCommand::StrokeRect { x, y, width, height, stroke: stroke() },
            );
        }
        DrawingKind::Ellipse => {
            frame.push(
                Layer::Annotations,
                PaintCommand::Ellipse {
                    cx: (x1 + x2) / 2.0,
                    cy: (y1 + y2) / 2.0,
                    rx: (x2 - x1).abs() / 2.0,
                    ry: (y2 - y1).abs() / 2.0,
                    stroke: stroke(),
                    fill: style.fill.clone(),
                },
            );
        }
        DrawingKind::Zone => {
            let fill = style
                .fill
                .clone()
                .unwrap_or_else(|| Fill::translucent(&style.stroke.color, USER_ZONE_OPACITY));
            let (y, height) = (y1.min(y2), (y2 - y1).abs());
            frame.push(
                Layer::Annotations,
                PaintCommand::FillRect { x: left, y, width: right - left, height, fill },
            );
            for edge in [y1, y2] {
                frame.push(
                    Layer::Annotations,
                    PaintCommand::Line { x1: left, y1: edge, x2: right, y2: edge, stroke: stroke() },
                );
            }
        }
        DrawingKind::Fibonacci => {
            let levels = Drawing::user(0, kind, start, end, &style.stroke.color).fib_prices();
            let (fx1, fx2) = (x1.min(x2), x1.max(x2));
            for (level, price) in levels {
                let y = frame.price_y(price);
                frame.push(
                    Layer::Annotations,
                    PaintCommand::Line { x1: fx1, y1: y, x2: fx2, y2: y, stroke: stroke() },
                );
                frame.push(
                    Layer::Annotations,
                    PaintCommand::Text {
                        x: fx1 + 2.0,
                        y: y - 2.0,
                        text: format!("{:.1}% {:.2}", level * 100.0, price),
                        color: style.stroke.color.clone(),
                        size: LABEL_SIZE,
                        anchor: TextAnchor::Start,
                    },
                );
            }
        }
    }
}

/// Extends the segment from (x1, y1) through (x2, y2) to the plot edge in the
/// direction of travel. A vertical or zero-length ray stays as drawn.
fn ray_end(x1: f64, y1: f64, x2: f64, y2: f64, left: f64, right: f64) -> (f64, f64) {
    let dx = x2 - x1;
    if dx == 0.0 {
        return (x2, y2);
    }
    let edge = if dx > 0.0 { right } else { left };
    let t = (edge - x1) / dx;
    if t < 1.0 {
        return (x2, y2);
    }
    (edge, y1 + (y2 - y1) * t)
}
