//! Price series, indicator overlays and lower-pane series.

use super::layout::{LowerPane, PaneContent};
use super::{Fill, Frame, Layer, PaintCommand, StrokeStyle, TextAnchor};
use crate::domain::candle::Candle;
use crate::domain::indicator::{IndicatorKind, IndicatorOutput, calculate_volume_profile};
use crate::domain::settings::ChartType;
use crate::domain::viewport::PriceScale;

const BODY_RATIO: f64 = 0.8;
const GAP_RATIO: f64 = 0.1;
const AREA_OPACITY: f64 = 0.2;
const VOLUME_OPACITY: f64 = 0.5;
const PANE_LABEL_SIZE: f64 = 10.0;
const MARKET_EMA_WIDTH: f64 = 1.8;
/// Pixel width of the largest volume-profile bar.
const PROFILE_WIDTH: f64 = 50.0;
const PROFILE_OPACITY: f64 = 0.3;
const PROFILE_POC_OPACITY: f64 = 0.5;

/// Splits `values[span]` at undefined points into polylines of at least two points.
fn polylines(
    values: &[f64],
    span: std::ops::Range<usize>,
    x: impl Fn(usize) -> f64,
    y: impl Fn(f64) -> f64,
) -> Vec<Vec<(f64, f64)>> {
    let mut lines = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();
    for i in span {
        match values.get(i) {
            Some(&v) if v.is_finite() => current.push((x(i), y(v))),
            _ => {
                if current.len() > 1 {
                    lines.push(std::mem::take(&mut current));
                } else {
                    current.clear();
                }
            }
        }
    }
    if current.len() > 1 {
        lines.push(current);
    }
    lines
}

fn line_width(kind: IndicatorKind, line: &str) -> f64 {
    match (kind, line) {
        (IndicatorKind::Bollinger, "middle") => 1.0,
        (IndicatorKind::Bollinger, _) => 1.2,
        _ => 1.5,
    }
}

/// Second lines (signal, %D, DI) are drawn in a muted colour.
fn line_color<'c>(out: &'c IndicatorOutput, index: usize, muted: &'c str) -> &'c str {
    if index == 0 || out.spec.kind == IndicatorKind::Bollinger {
        &out.spec.color
    } else {
        muted
    }
}

pub(crate) fn paint_overlays(frame: &mut Frame<'_>) {
    let input = frame.input;
    for out in input
        .indicators
        .iter()
        .filter(|o| o.spec.visible && o.spec.kind.is_overlay())
    {
        for line in &out.lines {
            let span = frame.line_span(line.values.len());
            let stroke = StrokeStyle::solid(&out.spec.color, line_width(out.spec.kind, line.name));
            for points in polylines(&line.values, span, |i| frame.center_x(i as f64), |v| frame.price_y(v)) {
                frame.push(
                    Layer::Indicators,
                    PaintCommand::Path {
                        points,
                        stroke: stroke.clone(),
                    },
                );
            }
        }
    }
}

/// The EMA(20)/EMA(50) pair behind the price series.
pub(crate) fn paint_market_emas(frame: &mut Frame<'_>) {
    let market = frame.input.market;
    let series = [
        (&market.ema20, frame.palette.ema_fast),
        (&market.ema50, frame.palette.ema_slow),
    ];
    for (values, color) in series {
        let span = frame.line_span(values.len());
        let stroke = StrokeStyle::solid(color, MARKET_EMA_WIDTH);
        for points in polylines(values, span, |i| frame.center_x(i as f64), |v| frame.price_y(v)) {
            frame.push(
                Layer::Indicators,
                PaintCommand::Path {
                    points,
                    stroke: stroke.clone(),
                },
            );
        }
    }
}

/// Horizontal bars at the right edge of the price pane, one per price bucket
/// of the visible candles. The point-of-control bar gets its own colour.
pub(crate) fn paint_volume_profile(frame: &mut Frame<'_>) {
    let v = frame.layout.visible;
    let candles = frame.input.candles;
    let end = v.end.min(candles.len());
    let Some(window) = candles.get(v.start.min(end)..end) else {
        return;
    };
    let profile = calculate_volume_profile(window, frame.input.settings.volume_profile_bins);
    let max = profile.volumes.iter().copied().fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return;
    }

    let right = frame.plot_right();
    let half = profile.bin_size / 2.0;
    for (i, (&price, &volume)) in profile.prices.iter().zip(&profile.volumes).enumerate() {
        if volume <= 0.0 {
            continue;
        }
        let (top, bottom) = (frame.price_y(price + half), frame.price_y(price - half));
        let height = ((bottom - top).abs() - 1.0).max(1.0);
        let width = volume / max * PROFILE_WIDTH;
        let fill = if i == profile.poc_index {
            Fill::translucent(frame.palette.profile_poc, PROFILE_POC_OPACITY)
        } else {
            Fill::translucent(frame.palette.profile, PROFILE_OPACITY)
        };
        frame.push(
            Layer::Indicators,
            PaintCommand::FillRect {
                x: right - width,
                y: top.min(bottom),
                width,
                height,
                fill,
            },
        );
    }
}

pub(crate) fn paint_price_series(frame: &mut Frame<'_>) {
    let input = frame.input;
    if input.candles.is_empty() {
        return;
    }
    match input.settings.chart_type {
        ChartType::Candles => paint_candles(frame, false),
        ChartType::Hollow => paint_candles(frame, true),
        ChartType::Ohlc => paint_ohlc(frame),
        ChartType::Line => paint_close_line(frame, false),
        ChartType::Area => paint_close_line(frame, true),
    }
}

fn visible_candles<'a>(frame: &Frame<'a>) -> impl Iterator<Item = (usize, &'a Candle)> + use<'a> {
    let v = frame.layout.visible;
    let candles = frame.input.candles;
    (v.start..v.end.min(candles.len())).map(move |i| (i, &candles[i]))
}

fn paint_candles(frame: &mut Frame<'_>, hollow: bool) {
    let cw = frame.candle_width();
    let body_width = (cw * BODY_RATIO).max(1.0);
    let gap = cw * GAP_RATIO;
    for (i, c) in visible_candles(frame) {
        let x = frame.slot_x(i as f64);
        let cx = frame.center_x(i as f64);
        let (open_y, close_y) = (frame.price_y(c.open), frame.price_y(c.close));
        let up = c.is_bullish();
        let (body, wick) = if up {
            (frame.palette.candle_up, frame.palette.wick_up)
        } else {
            (frame.palette.candle_down, frame.palette.wick_down)
        };

        frame.push(
            Layer::PriceSeries,
            PaintCommand::Line {
                x1: cx,
                y1: frame.price_y(c.high),
                x2: cx,
                y2: frame.price_y(c.low),
                stroke: StrokeStyle::solid(wick, 1.0),
            },
        );

        let top = open_y.min(close_y);
        let height = (close_y - open_y).abs().max(1.0);
        let command = if hollow && up {
            PaintCommand::StrokeRect {
                x: x + gap,
                y: top,
                width: body_width,
                height,
                stroke: StrokeStyle::solid(body, 1.0),
            }
        } else {
            PaintCommand::FillRect {
                x: x + gap,
                y: top,
                width: body_width,
                height,
                fill: Fill::solid(body),
            }
        };
        frame.push(Layer::PriceSeries, command);
    }
}

fn paint_ohlc(frame: &mut Frame<'_>) {
    let tick = (frame.candle_width() * 0.4).max(1.0);
    for (i, c) in visible_candles(frame) {
        let cx = frame.center_x(i as f64);
        let color = if c.is_bullish() {
            frame.palette.candle_up
        } else {
            frame.palette.candle_down
        };
        let stroke = StrokeStyle::solid(color, 1.0);
        let (open_y, close_y) = (frame.price_y(c.open), frame.price_y(c.close));
        let segments = [
            (cx, frame.price_y(c.high), cx, frame.price_y(c.low)),
            (cx - tick, open_y, cx, open_y),
            (cx, close_y, cx + tick, close_y),
        ];
        for (x1, y1, x2, y2) in segments {
            frame.push(
                Layer::PriceSeries,
                PaintCommand::Line {
                    x1,
                    y1,
                    x2,
                    y2,
                    stroke: stroke.clone(),
                },
            );
        }
    }
}

fn paint_close_line(frame: &mut Frame<'_>, area: bool) {
    let candles = frame.input.candles;
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let span = frame.line_span(closes.len());
    let color = frame.palette.candle_up;
    let bottom = frame.layout.price_scale.bottom();
    for points in polylines(&closes, span, |i| frame.center_x(i as f64), |v| frame.price_y(v)) {
        if area {
            let mut outline = points.clone();
            if let (Some(&(first_x, _)), Some(&(last_x, _))) = (points.first(), points.last()) {
                outline.push((last_x, bottom));
                outline.push((first_x, bottom));
            }
            frame.push(
                Layer::PriceSeries,
                PaintCommand::FillPath {
                    points: outline,
                    fill: Fill::translucent(color, AREA_OPACITY),
                },
            );
        }
        frame.push(
            Layer::PriceSeries,
            PaintCommand::Path {
                points,
                stroke: StrokeStyle::solid(color, 1.5),
            },
        );
    }
}

pub(crate) fn paint_lower_panes(frame: &mut Frame<'_>) {
    let (layout, input) = (frame.layout, frame.input);
    for pane in &layout.lower_panes {
        paint_pane_frame(frame, pane);
        match pane.content {
            PaneContent::Volume => paint_volume_bars(frame, &pane.scale),
            PaneContent::Indicator(i) => {
                if let Some(out) = input.indicators.get(i) {
                    paint_pane_indicator(frame, out, &pane.scale);
                }
            }
        }
    }
}

fn paint_pane_frame(frame: &mut Frame<'_>, pane: &LowerPane) {
    let label = match pane.content {
        PaneContent::Volume => "VOLUME".to_string(),
        PaneContent::Indicator(i) => frame
            .input
            .indicators
            .get(i)
            .map(|o| o.spec.to_string())
            .unwrap_or_default(),
    };
    let (left, right) = (frame.plot_left(), frame.layout.dims.width);
    let top = pane.scale.origin;
    frame.push(
        Layer::LowerPane,
        PaintCommand::Line {
            x1: left,
            y1: top,
            x2: right,
            y2: top,
            stroke: StrokeStyle::solid(frame.palette.grid, 1.0),
        },
    );
    frame.push(
        Layer::LowerPane,
        PaintCommand::Text {
            x: left + 4.0,
            y: top + PANE_LABEL_SIZE + 2.0,
            text: label,
            color: frame.palette.text.to_string(),
            size: PANE_LABEL_SIZE,
            anchor: TextAnchor::Start,
        },
    );
}

fn paint_volume_bars(frame: &mut Frame<'_>, scale: &PriceScale) {
    let cw = frame.candle_width();
    let width = (cw * BODY_RATIO).max(1.0);
    let base = scale.to_y(0.0);
    for (i, c) in visible_candles(frame) {
        let color = if c.is_bullish() {
            frame.palette.volume_up
        } else {
            frame.palette.volume_down
        };
        let top = scale.to_y(c.volume);
        frame.push(
            Layer::LowerPane,
            PaintCommand::FillRect {
                x: frame.slot_x(i as f64) + cw * GAP_RATIO,
                y: top.min(base),
                width,
                height: (base - top).abs(),
                fill: Fill::translucent(color, VOLUME_OPACITY),
            },
        );
    }
}

/// Horizontal reference levels drawn behind bounded oscillators.
fn reference_levels(kind: IndicatorKind) -> &'static [f64] {
    match kind {
        IndicatorKind::Rsi => &[30.0, 70.0],
        IndicatorKind::Stochastic => &[20.0, 80.0],
        IndicatorKind::Adx => &[25.0],
        IndicatorKind::Macd => &[0.0],
        _ => &[],
    }
}

fn paint_pane_indicator(frame: &mut Frame<'_>, out: &IndicatorOutput, scale: &PriceScale) {
    let (left, right) = (frame.plot_left(), frame.plot_right());
    for &level in reference_levels(out.spec.kind) {
        let y = scale.to_y(level);
        frame.push(
            Layer::LowerPane,
            PaintCommand::Line {
                x1: left,
                y1: y,
                x2: right,
                y2: y,
                stroke: StrokeStyle::dashed(frame.palette.grid, 1.0, 3.0, 3.0),
            },
        );
    }

    let muted = frame.palette.text;
    for (index, line) in out.lines.iter().enumerate() {
        let is_bars = matches!(
            (out.spec.kind, line.name),
            (IndicatorKind::Macd, "histogram") | (IndicatorKind::Volume, "volume")
        );
        if is_bars {
            paint_value_bars(frame, out, &line.values, scale);
            continue;
        }
        let span = frame.line_span(line.values.len());
        let stroke = StrokeStyle::solid(line_color(out, index, muted), line_width(out.spec.kind, line.name));
        for points in polylines(&line.values, span, |i| frame.center_x(i as f64), |v| scale.to_y(v)) {
            frame.push(
                Layer::LowerPane,
                PaintCommand::Path {
                    points,
                    stroke: stroke.clone(),
                },
            );
        }
    }
}

/// Bars from zero to each value; volume bars follow candle direction,
/// histogram bars follow their own sign.
fn paint_value_bars(frame: &mut Frame<'_>, out: &IndicatorOutput, values: &[f64], scale: &PriceScale) {
    let cw = frame.candle_width();
    let width = (cw * BODY_RATIO).max(1.0);
    let base = scale.to_y(0.0);
    let v = frame.layout.visible;
    for i in v.start..v.end.min(values.len()) {
        let value = values[i];
        if !value.is_finite() {
            continue;
        }
        let up = match out.spec.kind {
            IndicatorKind::Volume => frame.input.candles.get(i).is_none_or(Candle::is_bullish),
            _ => value >= 0.0,
        };
        let color = if up {
            frame.palette.volume_up
        } else {
            frame.palette.volume_down
        };
        let y = scale.to_y(value);
        frame.push(
            Layer::LowerPane,
            PaintCommand::FillRect {
                x: frame.slot_x(i as f64) + cw * GAP_RATIO,
                y: y.min(base),
                width,
                height: (base - y).abs(),
                fill: Fill::translucent(color, VOLUME_OPACITY),
            },
        );
    }
}
