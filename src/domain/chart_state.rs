//! Chart state container.
//!
//! [`ChartStore`] is the single writer of chart state. Mutators update the
//! snapshot, notify subscribers and mark the store dirty; the rendering side
//! calls [`ChartStore::take_frame`] once per display refresh, so any number of
//! changes between two refreshes produce a single plan.

use crate::domain::candle::Candle;
use crate::domain::drawing::{DEFAULT_DRAWING_COLOR, Drawing, DrawingKind};
use crate::domain::indicator::{IndicatorOutput, IndicatorSpec, compute_all};
use crate::domain::interaction::{
    Crosshair, Effect, InteractionContext, InteractionState, Mode, PointerEvent, reduce,
};
use crate::domain::paint::{FrameInput, FrameLayout, FramePlan, compute_layout, plan_frame};
use crate::domain::regime::{MarketState, compute_market_state};
use crate::domain::settings::ChartSettings;
use crate::domain::viewport::{ChartDimensions, Viewport, VisibleRange, clamp_offset};
use crate::ports::alert_port::AlertPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Change {
    Candles,
    Viewport,
    Annotations,
    Indicators,
    Tool,
    /// Crosshair or in-progress drawing moved.
    Interaction,
}

pub type SubscriberId = usize;

type Subscriber = Box<dyn FnMut(Change)>;

pub struct ChartStore {
    candles: Vec<Candle>,
    settings: ChartSettings,
    indicators: Vec<IndicatorOutput>,
    market: MarketState,
    interaction: InteractionState,
    annotations: Vec<Drawing>,
    next_drawing_id: u64,
    dirty: bool,
    subscribers: Vec<(SubscriberId, Subscriber)>,
    next_subscriber: SubscriberId,
    alerts: Option<Box<dyn AlertPort>>,
}

impl ChartStore {
    pub fn new(settings: ChartSettings) -> Self {
        let viewport = Viewport::new(settings.offset.unwrap_or(0.0), settings.candle_width);
        Self {
            candles: Vec::new(),
            settings,
            indicators: Vec::new(),
            market: MarketState::empty(),
            interaction: InteractionState::new(viewport),
            annotations: Vec::new(),
            next_drawing_id: 1,
            dirty: true,
            subscribers: Vec::new(),
            next_subscriber: 0,
            alerts: None,
        }
    }

    pub fn with_alerts(mut self, alerts: Box<dyn AlertPort>) -> Self {
        self.alerts = Some(alerts);
        self
    }

    pub fn subscribe(&mut self, callback: impl FnMut(Change) + 'static) -> SubscriberId {
        let id = self.next_subscriber;
        self.next_subscriber += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    fn changed(&mut self, change: Change) {
        self.dirty = true;
        for (_, callback) in &mut self.subscribers {
            callback(change);
        }
    }

    /// Replaces the candle series and recomputes every derived series.
    pub fn set_candles(&mut self, candles: Vec<Candle>) {
        let previous = self.market.regime;
        self.candles = candles;
        self.indicators = compute_all(&self.candles, &self.settings.indicators);
        self.market = compute_market_state(&self.candles);
        if self.market.regime != previous {
            tracing::debug!(from = %previous, to = %self.market.regime, "regime changed");
        }

        let total = self.candles.len();
        let candle_width = self.interaction.viewport.candle_width;
        self.interaction.viewport = match self.settings.offset {
            Some(offset) => Viewport::new(clamp_offset(offset, total), candle_width),
            None => {
                let s = &self.settings;
                let dims = ChartDimensions::new(s.width, s.height, &s.padding);
                Viewport::fit_latest(total, dims.chart_width, candle_width)
            }
        };
        tracing::debug!(candles = total, indicators = self.indicators.len(), "candles replaced");
        self.changed(Change::Candles);
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        let clamped = Viewport::new(
            clamp_offset(viewport.offset, self.candles.len()),
            viewport.candle_width,
        );
        self.interaction.viewport = clamped;
        self.changed(Change::Viewport);
    }

    pub fn set_annotations(&mut self, annotations: Vec<Drawing>) {
        let max_id = annotations.iter().map(|d| d.id).max().unwrap_or(0);
        self.next_drawing_id = self.next_drawing_id.max(max_id.saturating_add(1));
        self.annotations = annotations;
        self.changed(Change::Annotations);
    }

    /// Replaces the indicator list. Regime state is left untouched.
    pub fn set_indicator_config(&mut self, specs: Vec<IndicatorSpec>) {
        self.settings.indicators = specs;
        self.indicators = compute_all(&self.candles, &self.settings.indicators);
        self.changed(Change::Indicators);
    }

    /// Arms or disarms a drawing tool. Any drawing in progress is abandoned.
    pub fn set_tool(&mut self, tool: Option<DrawingKind>) {
        if matches!(self.interaction.mode, Mode::Drawing { .. }) {
            self.interaction.mode = Mode::Idle;
        }
        self.interaction.tool = tool;
        self.changed(Change::Tool);
    }

    pub fn set_annotation_visible(&mut self, id: u64, visible: bool) -> bool {
        self.update_annotation(id, |d| d.set_visible(visible))
    }

    pub fn set_annotation_locked(&mut self, id: u64, locked: bool) -> bool {
        self.update_annotation(id, |d| d.set_locked(locked))
    }

    fn update_annotation(&mut self, id: u64, update: impl FnOnce(&mut Drawing)) -> bool {
        let Some(drawing) = self.annotations.iter_mut().find(|d| d.id == id) else {
            return false;
        };
        update(drawing);
        self.changed(Change::Annotations);
        true
    }

    /// Runs one pointer event through the interaction reducer and applies its effect.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Option<Effect> {
        let layout = self.layout();
        let ctx = InteractionContext {
            candles: &self.candles,
            dims: layout.dims,
            padding: layout.padding,
            price_scale: layout.price_scale,
            zoom_sensitivity: self.settings.zoom_sensitivity,
            crosshair_enabled: self.settings.show_crosshair,
        };
        let before = self.interaction;
        let (next, effect) = reduce(&before, &event, &ctx);
        self.interaction = next;

        if next.viewport != before.viewport {
            self.changed(Change::Viewport);
        }
        if next.mode != before.mode || next.crosshair != before.crosshair {
            self.changed(Change::Interaction);
        }
        if next.tool != before.tool {
            self.changed(Change::Tool);
        }

        match effect {
            Some(Effect::Commit { kind, start, end }) => {
                let id = self.allocate_drawing_id();
                self.annotations
                    .push(Drawing::user(id, kind, start, end, DEFAULT_DRAWING_COLOR));
                self.changed(Change::Annotations);
            }
            Some(Effect::TargetPrice(price)) => {
                if let Some(alerts) = self.alerts.as_mut() {
                    if let Err(e) = alerts.create_alert(price) {
                        tracing::warn!(price, error = %e, "alert creation failed");
                    }
                }
            }
            Some(Effect::Cancelled { .. }) | None => {}
        }
        effect
    }

    /// Next id not held by any annotation. Wraps to 1 once the id space is exhausted.
    fn allocate_drawing_id(&mut self) -> u64 {
        let mut id = self.next_drawing_id;
        while self.annotations.iter().any(|d| d.id == id) {
            id = id.checked_add(1).unwrap_or(1);
        }
        self.next_drawing_id = id.saturating_add(1);
        id
    }

    /// The plan for the current snapshot if anything changed since the last call.
    pub fn take_frame(&mut self) -> Option<FramePlan> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(self.derive_frame())
    }

    pub fn derive_frame(&self) -> FramePlan {
        plan_frame(&FrameInput {
            candles: &self.candles,
            indicators: &self.indicators,
            market: &self.market,
            annotations: &self.annotations,
            pending: self.interaction.pending_drawing(),
            viewport: self.interaction.viewport,
            crosshair: self.interaction.crosshair,
            settings: &self.settings,
        })
    }

    pub fn layout(&self) -> FrameLayout {
        compute_layout(
            &self.settings,
            &self.interaction.viewport,
            &self.candles,
            &self.indicators,
            &self.market,
        )
    }

    pub fn visible_range(&self) -> VisibleRange {
        self.layout().visible
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn indicators(&self) -> &[IndicatorOutput] {
        &self.indicators
    }

    pub fn market(&self) -> &MarketState {
        &self.market
    }

    pub fn annotations(&self) -> &[Drawing] {
        &self.annotations
    }

    pub fn viewport(&self) -> Viewport {
        self.interaction.viewport
    }

    pub fn crosshair(&self) -> Option<Crosshair> {
        self.interaction.crosshair
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn settings(&self) -> &ChartSettings {
        &self.settings
    }
}
