//! Pane geometry and vertical ranges for one frame.

use crate::domain::candle::Candle;
use crate::domain::indicator::{IndicatorKind, IndicatorOutput};
use crate::domain::regime::MarketState;
use crate::domain::settings::ChartSettings;
use crate::domain::viewport::{
    ChartDimensions, Padding, PriceScale, Viewport, VisibleRange, visible_range,
};

/// Fraction of the visible span added above and below the price range.
pub const PRICE_RANGE_PADDING: f64 = 0.1;
/// Pixels between the price pane and the first lower pane.
pub const LOWER_PANE_GAP: f64 = 8.0;
pub const LOWER_PANE_PAD_TOP: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneContent {
    Volume,
    /// Index into the frame's indicator outputs.
    Indicator(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowerPane {
    pub content: PaneContent,
    pub scale: PriceScale,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameLayout {
    pub dims: ChartDimensions,
    pub padding: Padding,
    pub visible: VisibleRange,
    pub price_scale: PriceScale,
    pub lower_panes: Vec<LowerPane>,
}

impl FrameLayout {
    /// Bottom edge of the lowest pane.
    pub fn plot_bottom(&self) -> f64 {
        self.lower_panes
            .last()
            .map(|p| p.scale.bottom())
            .unwrap_or_else(|| self.price_scale.bottom())
    }

    pub fn price_range(&self) -> (f64, f64) {
        (self.price_scale.min, self.price_scale.max)
    }
}

pub fn compute_layout(
    settings: &ChartSettings,
    viewport: &Viewport,
    candles: &[Candle],
    indicators: &[IndicatorOutput],
    market: &MarketState,
) -> FrameLayout {
    let padding = settings.padding;
    let dims = ChartDimensions::new(settings.width, settings.height, &padding);
    let visible = visible_range(viewport, &dims, candles.len());

    let contents = lower_pane_contents(settings, indicators);
    let lower_total = if contents.is_empty() {
        0.0
    } else {
        dims.height * settings.lower_pane_ratio
    };
    let main_height = dims.height - lower_total;
    let market_emas: Vec<&[f64]> = if settings.show_market_emas {
        vec![market.ema20.as_slice(), market.ema50.as_slice()]
    } else {
        Vec::new()
    };
    let (min, max) = price_range_with(candles, indicators, &market_emas, visible);

    let price_scale = PriceScale {
        min,
        max,
        origin: 0.0,
        height: main_height,
        pad_top: padding.top,
        pad_bottom: if contents.is_empty() {
            padding.bottom
        } else {
            LOWER_PANE_GAP
        },
    };

    let pane_height = if contents.is_empty() {
        0.0
    } else {
        lower_total / contents.len() as f64
    };
    let last = contents.len().saturating_sub(1);
    let lower_panes = contents
        .into_iter()
        .enumerate()
        .map(|(i, content)| {
            let (min, max) = pane_range(content, candles, indicators, visible);
            LowerPane {
                content,
                scale: PriceScale {
                    min,
                    max,
                    origin: main_height + i as f64 * pane_height,
                    height: pane_height,
                    pad_top: LOWER_PANE_PAD_TOP,
                    pad_bottom: if i == last { padding.bottom } else { 0.0 },
                },
            }
        })
        .collect();

    FrameLayout {
        dims,
        padding,
        visible,
        price_scale,
        lower_panes,
    }
}

fn lower_pane_contents(settings: &ChartSettings, indicators: &[IndicatorOutput]) -> Vec<PaneContent> {
    if settings.lower_pane_ratio <= 0.0 {
        return Vec::new();
    }
    let oscillators: Vec<PaneContent> = indicators
        .iter()
        .enumerate()
        .filter(|(_, out)| out.spec.visible && !out.spec.kind.is_overlay())
        .map(|(i, _)| PaneContent::Indicator(i))
        .collect();
    let has_volume_indicator = indicators
        .iter()
        .any(|out| out.spec.visible && out.spec.kind == IndicatorKind::Volume);

    let mut contents = Vec::with_capacity(oscillators.len() + 1);
    if settings.show_volume && !has_volume_indicator {
        contents.push(PaneContent::Volume);
    }
    contents.extend(oscillators);
    contents
}

/// Min/max of the visible candle highs and lows plus every visible point of
/// every visible overlay, padded by [`PRICE_RANGE_PADDING`] on both sides.
/// Falls back to `(0, 1)` when nothing finite is visible.
pub fn price_range(
    candles: &[Candle],
    indicators: &[IndicatorOutput],
    visible: VisibleRange,
) -> (f64, f64) {
    price_range_with(candles, indicators, &[], visible)
}

/// [`price_range`] with extra price-axis series drawn alongside the overlays.
pub fn price_range_with(
    candles: &[Candle],
    indicators: &[IndicatorOutput],
    extra: &[&[f64]],
    visible: VisibleRange,
) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let end = visible.end.min(candles.len());
    for c in candles.get(visible.start.min(end)..end).unwrap_or(&[]) {
        if c.low.is_finite() {
            min = min.min(c.low);
        }
        if c.high.is_finite() {
            max = max.max(c.high);
        }
    }
    for out in indicators
        .iter()
        .filter(|o| o.spec.visible && o.spec.kind.is_overlay())
    {
        if let Some((lo, hi)) = out.value_range(visible.start, visible.end) {
            min = min.min(lo);
            max = max.max(hi);
        }
    }
    for series in extra {
        let end = visible.end.min(series.len());
        for &v in series.get(visible.start.min(end)..end).unwrap_or(&[]) {
            if v.is_finite() {
                min = min.min(v);
                max = max.max(v);
            }
        }
    }
    if min > max {
        return (0.0, 1.0);
    }
    let pad = (max - min) * PRICE_RANGE_PADDING;
    (min - pad, max + pad)
}

fn pane_range(
    content: PaneContent,
    candles: &[Candle],
    indicators: &[IndicatorOutput],
    visible: VisibleRange,
) -> (f64, f64) {
    let volume_range = || {
        let end = visible.end.min(candles.len());
        let max = candles
            .get(visible.start.min(end)..end)
            .unwrap_or(&[])
            .iter()
            .map(|c| c.volume)
            .filter(|v| v.is_finite())
            .fold(0.0_f64, f64::max);
        (0.0, if max > 0.0 { max } else { 1.0 })
    };
    match content {
        PaneContent::Volume => volume_range(),
        PaneContent::Indicator(i) => match indicators.get(i).map(|o| (o.spec.kind, o)) {
            Some((IndicatorKind::Rsi | IndicatorKind::Stochastic | IndicatorKind::Adx, _)) => {
                (0.0, 100.0)
            }
            Some((IndicatorKind::Volume, _)) => volume_range(),
            Some((_, out)) => out.value_range(visible.start, visible.end).unwrap_or((0.0, 1.0)),
            None => (0.0, 1.0),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::{IndicatorLine, IndicatorSpec};

    fn overlay(kind: IndicatorKind, values: Vec<f64>) -> IndicatorOutput {
        IndicatorOutput {
            spec: IndicatorSpec::new(kind),
            lines: vec![IndicatorLine {
                name: "line",
                values,
            }],
        }
    }

    fn candles() -> Vec<Candle> {
        vec![
            Candle::new(0, 100.0, 110.0, 90.0, 105.0, 10.0),
            Candle::new(60, 105.0, 120.0, 100.0, 110.0, 30.0),
            Candle::new(120, 110.0, 115.0, 95.0, 100.0, 20.0),
        ]
    }

    #[test]
    fn price_range_pads_ten_percent() {
        let (min, max) = price_range(&candles(), &[], VisibleRange { start: 0, end: 3 });
        // 90..120, span 30, pad 3
        assert!((min - 87.0).abs() < 1e-9);
        assert!((max - 123.0).abs() < 1e-9);
    }

    #[test]
    fn overlay_points_extend_range() {
        let sma = overlay(IndicatorKind::Sma, vec![f64::NAN, 130.0, 80.0]);
        let (min, max) = price_range(&candles(), &[sma], VisibleRange { start: 0, end: 3 });
        // 80..130, span 50, pad 5
        assert!((min - 75.0).abs() < 1e-9);
        assert!((max - 135.0).abs() < 1e-9);
    }

    #[test]
    fn oscillators_do_not_join_price_range() {
        let rsi = overlay(IndicatorKind::Rsi, vec![10.0, 90.0, 50.0]);
        let (min, max) = price_range(&candles(), &[rsi], VisibleRange { start: 0, end: 3 });
        assert!((min - 87.0).abs() < 1e-9);
        assert!((max - 123.0).abs() < 1e-9);
    }

    #[test]
    fn hidden_overlays_are_ignored() {
        let mut sma = overlay(IndicatorKind::Sma, vec![500.0, 500.0, 500.0]);
        sma.spec.visible = false;
        let (_, max) = price_range(&candles(), &[sma], VisibleRange { start: 0, end: 3 });
        assert!(max < 200.0);
    }

    #[test]
    fn only_visible_candles_count() {
        let (min, max) = price_range(&candles(), &[], VisibleRange { start: 1, end: 2 });
        // 100..120, span 20, pad 2
        assert!((min - 98.0).abs() < 1e-9);
        assert!((max - 122.0).abs() < 1e-9);
    }

    #[test]
    fn empty_range_falls_back() {
        assert_eq!(price_range(&[], &[], VisibleRange::default()), (0.0, 1.0));
    }

    #[test]
    fn flat_range_stays_degenerate() {
        let flat = vec![Candle::flat(0, 50.0, 0.0), Candle::flat(60, 50.0, 0.0)];
        assert_eq!(
            price_range(&flat, &[], VisibleRange { start: 0, end: 2 }),
            (50.0, 50.0)
        );
    }

    #[test]
    fn layout_without_lower_pane_uses_full_height() {
        let settings = ChartSettings::default();
        let layout = compute_layout(&settings, &Viewport::default(), &candles(), &[], &MarketState::empty());
        assert!(layout.lower_panes.is_empty());
        assert_eq!(layout.price_scale.height, 400.0);
        assert_eq!(layout.price_scale.bottom(), 370.0);
    }

    #[test]
    fn lower_panes_split_the_reserved_height() {
        let settings = ChartSettings {
            show_volume: true,
            lower_pane_ratio: 0.5,
            ..ChartSettings::default()
        };
        let rsi = overlay(IndicatorKind::Rsi, vec![10.0, 90.0, 50.0]);
        let layout = compute_layout(&settings, &Viewport::default(), &candles(), &[rsi], &MarketState::empty());
        assert_eq!(layout.lower_panes.len(), 2);
        assert_eq!(layout.lower_panes[0].content, PaneContent::Volume);
        assert_eq!(layout.lower_panes[1].content, PaneContent::Indicator(0));
        assert_eq!(layout.price_scale.height, 200.0);
        assert_eq!(layout.lower_panes[0].scale.origin, 200.0);
        assert_eq!(layout.lower_panes[1].scale.origin, 300.0);
        assert_eq!(layout.lower_panes[0].scale.max, 30.0);
        assert_eq!(layout.lower_panes[1].scale.max, 100.0);
        assert_eq!(layout.plot_bottom(), 370.0);
    }

    #[test]
    fn volume_indicator_replaces_volume_bars() {
        let settings = ChartSettings {
            show_volume: true,
            ..ChartSettings::default()
        };
        let vol = overlay(IndicatorKind::Volume, vec![1.0, 2.0, 3.0]);
        let layout = compute_layout(&settings, &Viewport::default(), &candles(), &[vol], &MarketState::empty());
        assert_eq!(layout.lower_panes.len(), 1);
        assert_eq!(layout.lower_panes[0].content, PaneContent::Indicator(0));
    }

    #[test]
    fn extra_series_extend_range() {
        let ema = [f64::NAN, 140.0, 100.0];
        let (min, max) =
            price_range_with(&candles(), &[], &[&ema], VisibleRange { start: 0, end: 3 });
        // 90..140, span 50, pad 5
        assert!((min - 85.0).abs() < 1e-9);
        assert!((max - 145.0).abs() < 1e-9);
    }

    #[test]
    fn market_emas_join_range_only_when_shown() {
        let market = MarketState {
            ema20: vec![150.0, 150.0, 150.0],
            ema50: vec![60.0, 60.0, 60.0],
            ..MarketState::empty()
        };
        let hidden = compute_layout(
            &ChartSettings::default(),
            &Viewport::default(),
            &candles(),
            &[],
            &market,
        );
        assert!((hidden.price_scale.max - 123.0).abs() < 1e-9);

        let settings = ChartSettings {
            show_market_emas: true,
            ..ChartSettings::default()
        };
        let shown = compute_layout(&settings, &Viewport::default(), &candles(), &[], &market);
        // 60..150, span 90, pad 9
        assert!((shown.price_scale.min - 51.0).abs() < 1e-9);
        assert!((shown.price_scale.max - 159.0).abs() < 1e-9);
    }
}
