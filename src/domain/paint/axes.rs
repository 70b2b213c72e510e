//! Background, grid with axis labels, current-price line and crosshair.

use super::{Fill, Frame, Layer, PaintCommand, StrokeStyle, TextAnchor};
use chrono::DateTime;

pub const GRID_STEPS: usize = 8;
/// Minimum horizontal spacing between time labels, in pixels.
pub const TIME_LABEL_SPACING: f64 = 80.0;
const AXIS_FONT_SIZE: f64 = 10.0;
const TAG_HEIGHT: f64 = 16.0;
const SECONDS_PER_DAY: i64 = 86_400;

/// Decimal places for price labels given the visible span.
pub fn price_precision(span: f64) -> usize {
    match span.abs() {
        s if s == 0.0 || !s.is_finite() => 2,
        s if s < 1.0 => 5,
        s if s < 10.0 => 4,
        s if s < 100.0 => 3,
        _ => 2,
    }
}

pub fn format_price(price: f64, span: f64) -> String {
    format!("{:.*}", price_precision(span), price)
}

/// Intraday data shows time of day; daily or coarser shows the date.
pub fn format_time(time: i64, spacing: i64) -> String {
    let Some(dt) = DateTime::from_timestamp(time, 0) else {
        return time.to_string();
    };
    if spacing >= SECONDS_PER_DAY {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%m-%d %H:%M").to_string()
    }
}

pub(crate) fn paint_background(frame: &mut Frame<'_>) {
    let dims = frame.layout.dims;
    frame.push(
        Layer::Clear,
        PaintCommand::Clear {
            width: dims.width,
            height: dims.height,
        },
    );
    frame.push(
        Layer::Background,
        PaintCommand::FillRect {
            x: 0.0,
            y: 0.0,
            width: dims.width,
            height: dims.height,
            fill: Fill::solid(frame.palette.background),
        },
    );

    let input = frame.input;
    if input.settings.show_regime_tint && !input.candles.is_empty() {
        let (color, opacity) = frame.palette.regime_tint(input.market.regime);
        let (top, bottom) = (
            frame.layout.price_scale.top(),
            frame.layout.price_scale.bottom(),
        );
        frame.push(
            Layer::Background,
            PaintCommand::FillRect {
                x: frame.plot_left(),
                y: top,
                width: frame.plot_right() - frame.plot_left(),
                height: bottom - top,
                fill: Fill::translucent(color, opacity),
            },
        );
    }
}

pub(crate) fn paint_grid(frame: &mut Frame<'_>) {
    let (min, max) = frame.layout.price_range();
    let span = max - min;
    let width = frame.layout.dims.width;
    let label_x = frame.plot_right() + 4.0;
    let grid = StrokeStyle::solid(frame.palette.grid, 1.0);
    let text = frame.palette.text.to_string();

    let prices: Vec<f64> = if span > 0.0 && span.is_finite() {
        let step = span / GRID_STEPS as f64;
        (1..GRID_STEPS).map(|i| min + i as f64 * step).collect()
    } else {
        vec![min]
    };

    for price in prices {
        let y = crisp(frame.price_y(price));
        frame.push(
            Layer::Grid,
            PaintCommand::Line {
                x1: 0.0,
                y1: y,
                x2: width,
                y2: y,
                stroke: grid.clone(),
            },
        );
        frame.push(
            Layer::Grid,
            PaintCommand::Text {
                x: label_x,
                y: y + AXIS_FONT_SIZE / 3.0,
                text: format_price(price, span),
                color: text.clone(),
                size: AXIS_FONT_SIZE,
                anchor: TextAnchor::Start,
            },
        );
    }

    paint_time_axis(frame, &grid, &text);
}

fn paint_time_axis(frame: &mut Frame<'_>, grid: &StrokeStyle, text: &str) {
    let candles = frame.input.candles;
    let visible = frame.layout.visible;
    if visible.is_empty() {
        return;
    }
    let every = (TIME_LABEL_SPACING / frame.candle_width()).ceil().max(1.0) as usize;
    let spacing = match candles {
        [a, b, ..] => b.time - a.time,
        _ => 0,
    };
    let top = frame.layout.price_scale.top();
    let bottom = frame.layout.plot_bottom();
    let label_y = bottom + AXIS_FONT_SIZE + 4.0;

    for i in (visible.start..visible.end).filter(|i| i % every == 0) {
        let x = crisp(frame.center_x(i as f64));
        if x < frame.plot_left() || x > frame.plot_right() {
            continue;
        }
        frame.push(
            Layer::Grid,
            PaintCommand::Line {
                x1: x,
                y1: top,
                x2: x,
                y2: bottom,
                stroke: grid.clone(),
            },
        );
        frame.push(
            Layer::Grid,
            PaintCommand::Text {
                x,
                y: label_y,
                text: format_time(candles[i].time, spacing),
                color: text.to_string(),
                size: AXIS_FONT_SIZE,
                anchor: TextAnchor::Middle,
            },
        );
    }
}

pub(crate) fn paint_price_line(frame: &mut Frame<'_>) {
    let Some(last) = frame.input.candles.last() else {
        return;
    };
    let y = crisp(frame.price_y(last.close));
    let (min, max) = frame.layout.price_range();
    let tag_color = if last.is_bullish() {
        frame.palette.candle_up
    } else {
        frame.palette.candle_down
    };
    frame.push(
        Layer::PriceLine,
        PaintCommand::Line {
            x1: 0.0,
            y1: y,
            x2: frame.layout.dims.width,
            y2: y,
            stroke: StrokeStyle::dashed(frame.palette.price_line, 1.0, 4.0, 4.0),
        },
    );
    paint_axis_tag(
        frame,
        Layer::PriceLine,
        y,
        tag_color,
        format_price(last.close, max - min),
    );
}

pub(crate) fn paint_crosshair(frame: &mut Frame<'_>) {
    let Some(cross) = frame.input.crosshair else {
        return;
    };
    let stroke = StrokeStyle::dashed(frame.palette.crosshair, 1.0, 3.0, 3.0);
    let (top, bottom) = (frame.layout.price_scale.top(), frame.layout.plot_bottom());
    frame.push(
        Layer::Crosshair,
        PaintCommand::Line {
            x1: cross.pixel_x,
            y1: top,
            x2: cross.pixel_x,
            y2: bottom,
            stroke: stroke.clone(),
        },
    );
    frame.push(
        Layer::Crosshair,
        PaintCommand::Line {
            x1: frame.plot_left(),
            y1: cross.pixel_y,
            x2: frame.plot_right(),
            y2: cross.pixel_y,
            stroke,
        },
    );

    let (min, max) = frame.layout.price_range();
    let label_bg = frame.palette.label_background;
    paint_axis_tag(
        frame,
        Layer::Crosshair,
        cross.pixel_y,
        label_bg,
        format_price(cross.price, max - min),
    );

    if let Some(time) = cross.time {
        let spacing = match frame.input.candles {
            [a, b, ..] => b.time - a.time,
            _ => 0,
        };
        let text = format_time(time, spacing);
        let width = text.len() as f64 * AXIS_FONT_SIZE * 0.6 + 8.0;
        frame.push(
            Layer::Crosshair,
            PaintCommand::FillRect {
                x: cross.pixel_x - width / 2.0,
                y: bottom + 2.0,
                width,
                height: TAG_HEIGHT,
                fill: Fill::solid(label_bg),
            },
        );
        frame.push(
            Layer::Crosshair,
            PaintCommand::Text {
                x: cross.pixel_x,
                y: bottom + 2.0 + AXIS_FONT_SIZE + 2.0,
                text,
                color: frame.palette.text.to_string(),
                size: AXIS_FONT_SIZE,
                anchor: TextAnchor::Middle,
            },
        );
    }
}

/// Filled tag on the right price axis with `text` centred on `y`.
fn paint_axis_tag(frame: &mut Frame<'_>, layer: Layer, y: f64, background: &str, text: String) {
    let x = frame.plot_right();
    frame.push(
        layer,
        PaintCommand::FillRect {
            x,
            y: y - TAG_HEIGHT / 2.0,
            width: frame.layout.padding.right,
            height: TAG_HEIGHT,
            fill: Fill::solid(background),
        },
    );
    frame.push(
        layer,
        PaintCommand::Text {
            x: x + 4.0,
            y: y + AXIS_FONT_SIZE / 3.0,
            text,
            color: frame.palette.text.to_string(),
            size: AXIS_FONT_SIZE,
            anchor: TextAnchor::Start,
        },
    );
}

/// Snaps a line coordinate to the pixel centre.
fn crisp(value: f64) -> f64 {
    value.floor() + 0.5
}
