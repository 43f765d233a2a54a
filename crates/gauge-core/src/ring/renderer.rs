//! Ring composition.
//!
//! [`render_ring`] is the pure mapping from a displayed value and a container
//! size to a [`RingView`]. [`RingRenderer`] wires a [`ValueInterpolator`] and a
//! [`SizeTracker`] together and renders from their latest values.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use gauge_config::GaugeConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::color::{LinearRgba, RingTone, track_color};
use super::geometry::{RingGeometry, RingSizing, compute_geometry, label_percent};
use crate::animation::{
    AnimationEvent, AnimationState, FrameScheduler, ValueInterpolator, clamp_percent,
};
use crate::layout::{ResizeSource, SizeSample, SizeTracker};

/// Gap between the outer ring and the inner disc holding the label.
pub const DEFAULT_INSET_PX: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RingStyle {
    pub sizing: RingSizing,
    pub tone: RingTone,
    pub inset_px: f64,
}

impl Default for RingStyle {
    fn default() -> Self {
        Self {
            sizing: RingSizing::RESPONSIVE,
            tone: RingTone::default(),
            inset_px: DEFAULT_INSET_PX,
        }
    }
}

impl RingStyle {
    pub fn with_sizing(mut self, sizing: RingSizing) -> Self {
        self.sizing = sizing;
        self
    }

    pub fn with_tone(mut self, tone: RingTone) -> Self {
        self.tone = tone;
        self
    }
}

/// Everything a backend needs to draw one ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingView {
    pub geometry: RingGeometry,
    pub inner_diameter_px: f64,
    pub percent: u32,
    pub label: String,
    pub tone: RingTone,
    pub color: LinearRgba,
    pub track_color: LinearRgba,
}

pub fn render_ring(value: f64, size: SizeSample, style: &RingStyle) -> RingView {
    let geometry = compute_geometry(value, size, &style.sizing);
    let percent = label_percent(value);
    let inset = if style.inset_px.is_finite() {
        style.inset_px.max(0.0)
    } else {
        0.0
    };
    RingView {
        geometry,
        inner_diameter_px: (geometry.diameter_px - 2.0 * inset).max(0.0),
        percent,
        label: format!("{percent}%"),
        tone: style.tone,
        color: style.tone.color(),
        track_color: track_color(),
    }
}

/// An animated ring bound to a container.
pub struct RingRenderer<S: ResizeSource> {
    value: ValueInterpolator,
    size: SizeTracker<S>,
    style: RingStyle,
    redraw: Rc<Cell<bool>>,
}

impl<S: ResizeSource> RingRenderer<S> {
    pub fn new(scheduler: Rc<dyn FrameScheduler>, source: S, style: RingStyle) -> Self {
        Self::with_interpolator(ValueInterpolator::new(scheduler), source, style)
    }

    pub fn from_config(scheduler: Rc<dyn FrameScheduler>, source: S, config: &GaugeConfig) -> Self {
        let style = RingStyle::default().with_sizing(RingSizing::from_config(&config.sizing));
        Self::with_interpolator(
            ValueInterpolator::from_config(scheduler, &config.animation),
            source,
            style,
        )
    }

    pub fn with_interpolator(value: ValueInterpolator, source: S, style: RingStyle) -> Self {
        let size = SizeTracker::new(source);
        let redraw = Rc::new(Cell::new(true));

        let flag = redraw.clone();
        value.on_value(move |_| flag.set(true));
        let flag = redraw.clone();
        size.on_resize(move |_| flag.set(true));

        Self {
            value,
            size,
            style,
            redraw,
        }
    }

    /// Animate toward `target` with the interpolator's duration.
    pub fn set_percent(&mut self, target: f64) {
        let duration_ms = self.value.duration_ms();
        self.set_percent_with_duration(target, duration_ms);
    }

    /// Animate toward `target`. Asking for the run already in flight, or for
    /// the value already settled on, leaves the interpolator alone.
    pub fn set_percent_with_duration(&mut self, target: f64, duration_ms: f64) {
        if self.is_current(target, duration_ms) {
            return;
        }
        self.value.retarget(target, duration_ms);
    }

    fn is_current(&self, target: f64, duration_ms: f64) -> bool {
        let Some(to) = clamp_percent(target) else {
            return false;
        };
        match self.value.current_run() {
            Some(run) => run.to_value == to && run.duration_ms == duration_ms,
            None => self.value.state() == AnimationState::Idle && self.value.value() == to,
        }
    }

    pub fn set_tone(&mut self, tone: RingTone) {
        if self.style.tone != tone {
            debug!(?tone, "ring tone changed");
            self.style.tone = tone;
            self.redraw.set(true);
        }
    }

    pub fn set_sizing(&mut self, sizing: RingSizing) {
        if self.style.sizing != sizing {
            self.style.sizing = sizing;
            self.redraw.set(true);
        }
    }

    /// Bind to a container element, or detach with `None`.
    pub fn observe(&mut self, element: Option<S::Element>) {
        if self.size.element() != element.as_ref() {
            self.redraw.set(true);
        }
        self.size.observe(element);
    }

    pub fn render(&self) -> RingView {
        render_ring(self.value.value(), self.size.size(), &self.style)
    }

    pub fn geometry(&self) -> RingGeometry {
        compute_geometry(self.value.value(), self.size.size(), &self.style.sizing)
    }

    pub fn needs_redraw(&self) -> bool {
        self.redraw.get()
    }

    /// Returns whether a redraw was pending and clears the flag.
    pub fn take_redraw(&self) -> bool {
        self.redraw.replace(false)
    }

    pub fn interpolator(&self) -> &ValueInterpolator {
        &self.value
    }

    pub fn interpolator_mut(&mut self) -> &mut ValueInterpolator {
        &mut self.value
    }

    /// Lifecycle events since the last call.
    pub fn drain_events(&self) -> Vec<AnimationEvent> {
        self.value.drain_events()
    }

    pub fn tracker(&self) -> &SizeTracker<S> {
        &self.size
    }

    pub fn style(&self) -> &RingStyle {
        &self.style
    }

    pub fn is_animating(&self) -> bool {
        self.value.is_running()
    }

    /// Cancel the animation and release the container subscription.
    pub fn teardown(&mut self) {
        self.value.cancel();
        self.size.unobserve();
    }
}

impl<S: ResizeSource> fmt::Debug for RingRenderer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingRenderer")
            .field("value", &self.value)
            .field("size", &self.size)
            .field("style", &self.style)
            .field("needs_redraw", &self.redraw.get())
            .finish()
    }
}
