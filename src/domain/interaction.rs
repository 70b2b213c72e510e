//! Pointer interaction state machine.
//!
//! [`reduce`] is a pure function of the current state and one event. It never
//! commits anything itself: completed drawings and target-price requests come
//! back as an [`Effect`] for the caller to act on.

use crate::domain::candle::Candle;
use crate::domain::drawing::{DrawingKind, Point};
use crate::domain::viewport::{
    ChartDimensions, Padding, PriceScale, SCALE_BASE, Viewport, clamp_candle_width, clamp_offset,
    x_to_index,
};

pub const DEFAULT_ZOOM_SENSITIVITY: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode {
    Idle,
    Panning {
        start_x: f64,
        start_offset: f64,
    },
    Drawing {
        kind: DrawingKind,
        start: Point,
        end: Option<Point>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crosshair {
    pub pixel_x: f64,
    pub pixel_y: f64,
    pub price: f64,
    /// Time of the candle under the cursor, if there is one.
    pub time: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up { x: f64, y: f64 },
    Wheel { delta_y: f64 },
    DoubleClick { x: f64, y: f64 },
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    Commit {
        kind: DrawingKind,
        start: Point,
        end: Point,
    },
    Cancelled {
        kind: DrawingKind,
    },
    TargetPrice(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionState {
    pub mode: Mode,
    pub viewport: Viewport,
    pub tool: Option<DrawingKind>,
    pub crosshair: Option<Crosshair>,
}

impl InteractionState {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            mode: Mode::Idle,
            viewport,
            tool: None,
            crosshair: None,
        }
    }

    /// The drawing in progress as (kind, start, end), end defaulting to start.
    pub fn pending_drawing(&self) -> Option<(DrawingKind, Point, Point)> {
        match self.mode {
            Mode::Drawing { kind, start, end } => Some((kind, start, end.unwrap_or(start))),
            _ => None,
        }
    }
}

impl Default for InteractionState {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

/// Read-only frame information the reducer needs to turn pixels into
/// (index, price) coordinates.
#[derive(Debug, Clone, Copy)]
pub struct InteractionContext<'a> {
    pub candles: &'a [Candle],
    pub dims: ChartDimensions,
    pub padding: Padding,
    pub price_scale: PriceScale,
    pub zoom_sensitivity: f64,
    pub crosshair_enabled: bool,
}

impl InteractionContext<'_> {
    fn to_point(&self, viewport: &Viewport, x: f64, y: f64) -> Point {
        Point::new(
            x_to_index(x, viewport.offset, viewport.candle_width, self.padding.left),
            self.price_scale.to_price(y),
        )
    }

    fn crosshair(&self, viewport: &Viewport, x: f64, y: f64) -> Option<Crosshair> {
        if !self.crosshair_enabled || !x.is_finite() || !y.is_finite() {
            return None;
        }
        let left = self.padding.left;
        let inside_x = x >= left && x <= left + self.dims.chart_width;
        let inside_y = y >= self.price_scale.top() && y <= self.price_scale.bottom();
        if !inside_x || !inside_y {
            return None;
        }
        let index = x_to_index(x, viewport.offset, viewport.candle_width, left).floor();
        let time = (index >= 0.0)
            .then(|| self.candles.get(index as usize))
            .flatten()
            .map(|c| c.time);
        Some(Crosshair {
            pixel_x: x,
            pixel_y: y,
            price: self.price_scale.to_price(y),
            time,
        })
    }
}

/// Applies one pointer event.
pub fn reduce(
    state: &InteractionState,
    event: &PointerEvent,
    ctx: &InteractionContext<'_>,
) -> (InteractionState, Option<Effect>) {
    let mut next = *state;
    let total = ctx.candles.len();

    let effect = match (*event, state.mode) {
        (PointerEvent::Down { x, y }, Mode::Idle | Mode::Panning { .. }) => {
            next.mode = match state.tool {
                Some(kind) => Mode::Drawing {
                    kind,
                    start: ctx.to_point(&state.viewport, x, y),
                    end: None,
                },
                None => Mode::Panning {
                    start_x: x,
                    start_offset: state.viewport.offset,
                },
            };
            None
        }
        // A second press while drawing does not start another one.
        (PointerEvent::Down { .. }, Mode::Drawing { .. }) => None,

        (PointerEvent::Move { x, y }, mode) => {
            match mode {
                Mode::Panning {
                    start_x,
                    start_offset,
                } => {
                    if x.is_finite() {
                        let candles_moved = (x - start_x) / state.viewport.candle_width;
                        next.viewport.offset = clamp_offset(start_offset - candles_moved, total);
                    }
                }
                Mode::Drawing { kind, start, .. } => {
                    next.mode = Mode::Drawing {
                        kind,
                        start,
                        end: Some(ctx.to_point(&state.viewport, x, y)),
                    };
                }
                Mode::Idle => {}
            }
            next.crosshair = ctx.crosshair(&next.viewport, x, y);
            None
        }

        (PointerEvent::Up { .. }, Mode::Panning { .. }) => {
            next.mode = Mode::Idle;
            None
        }
        (PointerEvent::Up { .. }, Mode::Drawing { kind, start, end }) => {
            next.mode = Mode::Idle;
            next.tool = None;
            Some(Effect::Commit {
                kind,
                start,
                end: end.unwrap_or(start),
            })
        }
        (PointerEvent::Up { .. }, Mode::Idle) => None,

        (PointerEvent::Wheel { delta_y }, _) => {
            next.viewport = zoom(&state.viewport, delta_y, ctx.zoom_sensitivity, total);
            // The candle under a stationary cursor changes with the width.
            next.crosshair = state
                .crosshair
                .and_then(|c| ctx.crosshair(&next.viewport, c.pixel_x, c.pixel_y));
            None
        }

        (PointerEvent::DoubleClick { .. }, Mode::Drawing { kind, .. }) => {
            next.mode = Mode::Idle;
            next.tool = None;
            Some(Effect::Cancelled { kind })
        }
        (PointerEvent::DoubleClick { y, .. }, _) => {
            next.mode = Mode::Idle;
            let price = ctx.price_scale.to_price(y);
            price.is_finite().then_some(Effect::TargetPrice(price))
        }

        (PointerEvent::Leave, mode) => {
            next.mode = Mode::Idle;
            next.crosshair = None;
            match mode {
                Mode::Drawing { kind, .. } => Some(Effect::Cancelled { kind }),
                _ => None,
            }
        }
    };

    match effect {
        Some(Effect::Commit { kind, .. }) => tracing::debug!(%kind, "drawing committed"),
        Some(Effect::Cancelled { kind }) => tracing::debug!(%kind, "drawing cancelled"),
        _ => {}
    }
    (next, effect)
}

/// Left-edge anchored zoom. Non-finite deltas leave the viewport unchanged.
pub fn zoom(viewport: &Viewport, delta_y: f64, sensitivity: f64, total_candles: usize) -> Viewport {
    if !delta_y.is_finite() || !sensitivity.is_finite() {
        return *viewport;
    }
    let candle_width = clamp_candle_width(viewport.candle_width * (-delta_y * sensitivity).exp());
    Viewport {
        offset: clamp_offset(viewport.offset, total_candles),
        scale: candle_width / SCALE_BASE,
        candle_width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::viewport::MAX_CANDLE_WIDTH;
    use approx::assert_relative_eq;

    fn candles(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| Candle::flat(i as i64 * 60, 100.0 + i as f64, 10.0))
            .collect()
    }

    fn ctx(candles: &[Candle]) -> InteractionContext<'_> {
        let padding = Padding::default();
        InteractionContext {
            candles,
            dims: ChartDimensions::new(800.0, 400.0, &padding),
            padding,
            price_scale: PriceScale {
                min: 100.0,
                max: 200.0,
                origin: 0.0,
                height: 400.0,
                pad_top: padding.top,
                pad_bottom: padding.bottom,
            },
            zoom_sensitivity: DEFAULT_ZOOM_SENSITIVITY,
            crosshair_enabled: true,
        }
    }

    fn armed(kind: DrawingKind) -> InteractionState {
        InteractionState {
            tool: Some(kind),
            ..InteractionState::new(Viewport::new(0.0, 10.0))
        }
    }

    #[test]
    fn down_without_tool_starts_panning() {
        let data = candles(100);
        let state = InteractionState::new(Viewport::new(10.0, 10.0));
        let (next, effect) = reduce(&state, &PointerEvent::Down { x: 300.0, y: 100.0 }, &ctx(&data));
        assert_eq!(
            next.mode,
            Mode::Panning {
                start_x: 300.0,
                start_offset: 10.0
            }
        );
        assert!(effect.is_none());
    }

    #[test]
    fn panning_moves_offset_by_pixel_delta() {
        let data = candles(100);
        let c = ctx(&data);
        let state = InteractionState::new(Viewport::new(10.0, 10.0));
        let (s, _) = reduce(&state, &PointerEvent::Down { x: 300.0, y: 100.0 }, &c);
        // Dragging right by 50px moves 5 candles back in time.
        let (s, _) = reduce(&s, &PointerEvent::Move { x: 350.0, y: 100.0 }, &c);
        assert_relative_eq!(s.viewport.offset, 5.0);
        let (s, _) = reduce(&s, &PointerEvent::Move { x: 250.0, y: 100.0 }, &c);
        assert_relative_eq!(s.viewport.offset, 15.0);
        let (s, _) = reduce(&s, &PointerEvent::Up { x: 250.0, y: 100.0 }, &c);
        assert_eq!(s.mode, Mode::Idle);
        assert_relative_eq!(s.viewport.offset, 15.0);
    }

    #[test]
    fn panning_is_clamped() {
        let data = candles(100);
        let c = ctx(&data);
        let state = InteractionState::new(Viewport::new(0.0, 10.0));
        let (s, _) = reduce(&state, &PointerEvent::Down { x: 0.0, y: 100.0 }, &c);
        let (s, _) = reduce(&s, &PointerEvent::Move { x: 10_000.0, y: 100.0 }, &c);
        assert_eq!(s.viewport.offset, -5.0);
    }

    #[test]
    fn click_without_move_commits_two_identical_points() {
        let data = candles(100);
        let c = ctx(&data);
        let state = armed(DrawingKind::Trendline);
        let (s, _) = reduce(&state, &PointerEvent::Down { x: 120.0, y: 150.0 }, &c);
        let (s, effect) = reduce(&s, &PointerEvent::Up { x: 120.0, y: 150.0 }, &c);
        match effect {
            Some(Effect::Commit { kind, start, end }) => {
                assert_eq!(kind, DrawingKind::Trendline);
                assert_eq!(start, end);
            }
            other => panic!("expected commit, got {other:?}"),
        }
        assert_eq!(s.mode, Mode::Idle);
        assert_eq!(s.tool, None);
    }

    #[test]
    fn move_replaces_second_point() {
        let data = candles(100);
        let c = ctx(&data);
        let (s, _) = reduce(&armed(DrawingKind::Rectangle), &PointerEvent::Down { x: 100.0, y: 100.0 }, &c);
        let (s, _) = reduce(&s, &PointerEvent::Move { x: 150.0, y: 120.0 }, &c);
        let (s, _) = reduce(&s, &PointerEvent::Move { x: 200.0, y: 140.0 }, &c);
        let (kind, start, end) = s.pending_drawing().unwrap();
        assert_eq!(kind, DrawingKind::Rectangle);
        assert_relative_eq!(start.x, 10.0);
        assert_relative_eq!(end.x, 20.0);
        let (_, effect) = reduce(&s, &PointerEvent::Up { x: 200.0, y: 140.0 }, &c);
        assert!(matches!(effect, Some(Effect::Commit { end: e, .. }) if e == end));
    }

    #[test]
    fn drawing_points_are_index_and_price() {
        let data = candles(100);
        let c = ctx(&data);
        // y = 20 is the top of the plot, mapped to the max price.
        let (s, _) = reduce(&armed(DrawingKind::Horizontal), &PointerEvent::Down { x: 55.0, y: 20.0 }, &c);
        let (_, start, _) = s.pending_drawing().unwrap();
        assert_relative_eq!(start.x, 5.5);
        assert_relative_eq!(start.y, 200.0);
    }

    #[test]
    fn up_without_down_is_noop() {
        let data = candles(10);
        let state = InteractionState::default();
        let (next, effect) = reduce(&state, &PointerEvent::Up { x: 1.0, y: 1.0 }, &ctx(&data));
        assert_eq!(next, state);
        assert!(effect.is_none());
    }

    #[test]
    fn second_down_while_drawing_is_ignored() {
        let data = candles(10);
        let c = ctx(&data);
        let (s, _) = reduce(&armed(DrawingKind::Ray), &PointerEvent::Down { x: 10.0, y: 100.0 }, &c);
        let (s2, effect) = reduce(&s, &PointerEvent::Down { x: 90.0, y: 200.0 }, &c);
        assert_eq!(s2, s);
        assert!(effect.is_none());
    }

    #[test]
    fn double_click_cancels_drawing_and_disarms() {
        let data = candles(10);
        let c = ctx(&data);
        let (s, _) = reduce(&armed(DrawingKind::Ellipse), &PointerEvent::Down { x: 10.0, y: 100.0 }, &c);
        let (s, effect) = reduce(&s, &PointerEvent::DoubleClick { x: 10.0, y: 100.0 }, &c);
        assert_eq!(effect, Some(Effect::Cancelled { kind: DrawingKind::Ellipse }));
        assert_eq!(s.mode, Mode::Idle);
        assert_eq!(s.tool, None);
    }

    #[test]
    fn double_click_when_idle_requests_target_price() {
        let data = candles(10);
        // Middle of a 20..370 plot over 100..200.
        let (_, effect) = reduce(
            &InteractionState::default(),
            &PointerEvent::DoubleClick { x: 100.0, y: 195.0 },
            &ctx(&data),
        );
        match effect {
            Some(Effect::TargetPrice(p)) => assert_relative_eq!(p, 150.0),
            other => panic!("expected target price, got {other:?}"),
        }
    }

    #[test]
    fn leave_cancels_drawing_without_commit() {
        let data = candles(10);
        let c = ctx(&data);
        let (s, _) = reduce(&armed(DrawingKind::Trendline), &PointerEvent::Down { x: 10.0, y: 100.0 }, &c);
        let (s, _) = reduce(&s, &PointerEvent::Move { x: 50.0, y: 120.0 }, &c);
        let (s, effect) = reduce(&s, &PointerEvent::Leave, &c);
        assert_eq!(effect, Some(Effect::Cancelled { kind: DrawingKind::Trendline }));
        assert_eq!(s.mode, Mode::Idle);
        assert!(s.crosshair.is_none());
        // Releasing afterwards must not commit the abandoned drawing.
        let (_, effect) = reduce(&s, &PointerEvent::Up { x: 50.0, y: 120.0 }, &c);
        assert!(effect.is_none());
    }

    #[test]
    fn leave_ends_panning() {
        let data = candles(10);
        let c = ctx(&data);
        let (s, _) = reduce(&InteractionState::default(), &PointerEvent::Down { x: 10.0, y: 100.0 }, &c);
        let (s, effect) = reduce(&s, &PointerEvent::Leave, &c);
        assert_eq!(s.mode, Mode::Idle);
        assert!(effect.is_none());
    }

    #[test]
    fn zoom_in_saturates_at_max_width() {
        let data = candles(500);
        let c = ctx(&data);
        let mut s = InteractionState::default();
        for _ in 0..1000 {
            s = reduce(&s, &PointerEvent::Wheel { delta_y: -100.0 }, &c).0;
            assert!(s.viewport.candle_width <= MAX_CANDLE_WIDTH);
            assert!(!s.viewport.candle_width.is_nan());
        }
        assert_eq!(s.viewport.candle_width, MAX_CANDLE_WIDTH);
        assert_eq!(s.viewport.scale, MAX_CANDLE_WIDTH / SCALE_BASE);
    }

    #[test]
    fn zoom_out_saturates_at_min_width() {
        let mut vp = Viewport::default();
        for _ in 0..1000 {
            vp = zoom(&vp, 100.0, DEFAULT_ZOOM_SENSITIVITY, 50);
        }
        assert_eq!(vp.candle_width, 1.0);
    }

    #[test]
    fn zoom_keeps_left_edge() {
        let vp = Viewport::new(12.5, 10.0);
        let zoomed = zoom(&vp, -200.0, DEFAULT_ZOOM_SENSITIVITY, 100);
        assert_eq!(zoomed.offset, 12.5);
        assert!(zoomed.candle_width > 10.0);
    }

    #[test]
    fn zoom_ignores_non_finite_delta() {
        let vp = Viewport::new(3.0, 10.0);
        assert_eq!(zoom(&vp, f64::NAN, DEFAULT_ZOOM_SENSITIVITY, 10), vp);
        assert_eq!(zoom(&vp, f64::INFINITY, DEFAULT_ZOOM_SENSITIVITY, 10), vp);
    }

    #[test]
    fn crosshair_tracks_candle_time() {
        let data = candles(100);
        let c = ctx(&data);
        let state = InteractionState::new(Viewport::new(10.0, 10.0));
        let (s, _) = reduce(&state, &PointerEvent::Move { x: 25.0, y: 195.0 }, &c);
        let cross = s.crosshair.unwrap();
        assert_eq!(cross.time, Some(12 * 60));
        assert_relative_eq!(cross.price, 150.0);
    }

    #[test]
    fn zoom_moves_crosshair_to_candle_under_cursor() {
        let data = candles(100);
        let c = ctx(&data);
        let state = InteractionState::new(Viewport::new(10.0, 10.0));
        let (s, _) = reduce(&state, &PointerEvent::Move { x: 110.0, y: 195.0 }, &c);
        assert_eq!(s.crosshair.unwrap().time, Some(21 * 60));

        // exp(0.693) doubles the width: x = 110 now lands on candle 15.
        let (s, _) = reduce(&s, &PointerEvent::Wheel { delta_y: -693.0 }, &c);
        let cross = s.crosshair.unwrap();
        assert_eq!(cross.time, Some(15 * 60));
        assert_eq!(cross.pixel_x, 110.0);
    }

    #[test]
    fn zoom_without_crosshair_keeps_none() {
        let data = candles(100);
        let (s, _) = reduce(
            &InteractionState::default(),
            &PointerEvent::Wheel { delta_y: -100.0 },
            &ctx(&data),
        );
        assert!(s.crosshair.is_none());
    }

    #[test]
    fn crosshair_outside_plot_is_cleared() {
        let data = candles(100);
        let c = ctx(&data);
        let (s, _) = reduce(&InteractionState::default(), &PointerEvent::Move { x: 790.0, y: 100.0 }, &c);
        assert!(s.crosshair.is_none());
    }

    #[test]
    fn crosshair_disabled() {
        let data = candles(100);
        let mut c = ctx(&data);
        c.crosshair_enabled = false;
        let (s, _) = reduce(&InteractionState::default(), &PointerEvent::Move { x: 100.0, y: 100.0 }, &c);
        assert!(s.crosshair.is_none());
    }
}
