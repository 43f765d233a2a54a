//! Animated percentage driven by display-refresh callbacks.
//!
//! A [`ValueInterpolator`] owns one displayed value. Each
//! [`retarget`](ValueInterpolator::retarget) starts a run from whatever is
//! currently displayed, so retargeting mid-flight never jumps. The run
//! advances one sample per frame through the injected [`FrameScheduler`]
//! and keeps at most one frame callback pending.
//!
//! ```
//! use std::rc::Rc;
//! use gauge_core::animation::{FrameQueue, ValueInterpolator};
//!
//! let frames = FrameQueue::new();
//! let mut value = ValueInterpolator::new(Rc::new(frames.clone()));
//! value.retarget(80.0, 800.0);
//! assert_eq!(value.value(), 0.0); // nothing happens until the next frame
//!
//! frames.run_until_idle(0.0, 16.0, 100);
//! assert_eq!(value.value(), 80.0);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use gauge_config::AnimationConfig;
use tracing::{debug, trace, warn};

use super::easing::{Easing, EasingFunction};
use super::events::{AnimationEvent, EventQueue};
use super::scheduler::{FrameHandle, FrameScheduler};
use super::types::{AnimationRun, AnimationState, Generation, clamp_percent};

/// Transition length used when none is configured.
pub const DEFAULT_DURATION_MS: f64 = 700.0;

type Listener = Box<dyn FnMut(f64)>;

struct Shared {
    displayed: f64,
    state: AnimationState,
    generation: Generation,
    run: Option<AnimationRun>,
    pending: Option<FrameHandle>,
    easing: Rc<dyn Easing>,
    listeners: Vec<Listener>,
    events: EventQueue,
}

/// One animated percentage in `[0, 100]`.
pub struct ValueInterpolator {
    shared: Rc<RefCell<Shared>>,
    scheduler: Rc<dyn FrameScheduler>,
    duration_ms: f64,
}

// Frame callbacks hold `Rc`s; the value lives on the thread that renders it.
static_assertions::assert_not_impl_any!(ValueInterpolator: Send, Sync);

impl ValueInterpolator {
    /// Idle at 0 with cubic ease-out and the default duration.
    pub fn new(scheduler: Rc<dyn FrameScheduler>) -> Self {
        Self {
            shared: Rc::new(RefCell::new(Shared {
                displayed: 0.0,
                state: AnimationState::Idle,
                generation: Generation::default(),
                run: None,
                pending: None,
                easing: Rc::new(EasingFunction::EaseOutCubic),
                listeners: Vec::new(),
                events: EventQueue::new(),
            })),
            scheduler,
            duration_ms: DEFAULT_DURATION_MS,
        }
    }

    /// Build from configuration. Unknown easing names fall back to cubic ease-out.
    pub fn from_config(scheduler: Rc<dyn FrameScheduler>, config: &AnimationConfig) -> Self {
        let easing = config.easing.parse::<EasingFunction>().unwrap_or_else(|err| {
            warn!("{err}; falling back to {}", EasingFunction::EaseOutCubic);
            EasingFunction::EaseOutCubic
        });
        Self::new(scheduler)
            .with_duration(config.duration_ms)
            .with_easing(easing)
    }

    /// Replace the easing curve. Applies to runs started afterwards and to
    /// the remaining frames of the current one.
    pub fn with_easing(self, easing: impl Easing + 'static) -> Self {
        self.shared.borrow_mut().easing = Rc::new(easing);
        self
    }

    /// Bound the lifecycle event queue. Oldest events are dropped when the
    /// owner does not drain fast enough.
    pub fn with_event_capacity(self, capacity: usize) -> Self {
        self.shared.borrow_mut().events = EventQueue::with_capacity(capacity);
        self
    }

    /// Duration used by [`set_target`](Self::set_target).
    pub fn with_duration(mut self, duration_ms: f64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    /// Last emitted value.
    pub fn value(&self) -> f64 {
        self.shared.borrow().displayed
    }

    pub fn state(&self) -> AnimationState {
        self.shared.borrow().state
    }

    pub fn is_running(&self) -> bool {
        self.state() == AnimationState::Running
    }

    pub fn generation(&self) -> Generation {
        self.shared.borrow().generation
    }

    /// Where the value is heading: the current run's target, or the
    /// displayed value when idle.
    pub fn target(&self) -> f64 {
        let shared = self.shared.borrow();
        shared.run.map_or(shared.displayed, |run| run.to_value)
    }

    /// The in-flight run, if any.
    pub fn current_run(&self) -> Option<AnimationRun> {
        self.shared.borrow().run
    }

    /// Register a listener called with every emitted value.
    pub fn on_value(&self, listener: impl FnMut(f64) + 'static) {
        self.shared.borrow_mut().listeners.push(Box::new(listener));
    }

    /// Retarget using the configured duration.
    pub fn set_target(&mut self, target: f64) {
        self.retarget(target, self.duration_ms);
    }

    /// Start a run toward `target`, superseding any run in flight.
    ///
    /// `target` is clamped into `[0, 100]`; a non-finite target leaves the
    /// value untouched. `duration_ms <= 0` snaps on the next frame. When the
    /// displayed value already equals the target it is emitted once and no
    /// frame is scheduled.
    pub fn retarget(&mut self, target: f64, duration_ms: f64) {
        let Some(to) = clamp_percent(target) else {
            warn!(requested = target, "ignoring non-finite gauge target");
            return;
        };

        let settled = {
            let mut shared = self.shared.borrow_mut();
            if shared.state == AnimationState::Cancelled {
                debug!(requested = to, "retarget after teardown ignored");
                return;
            }

            if let Some(handle) = shared.pending.take() {
                self.scheduler.cancel_frame(handle);
            }
            let superseded = shared.run.take().map(|run| run.generation);
            let generation = shared.generation.next();
            shared.generation = generation;
            let from = shared.displayed;

            if let Some(superseded) = superseded {
                debug!(generation = generation.0, from, to, "gauge run retargeted");
                shared.events.push(AnimationEvent::Retargeted {
                    generation,
                    superseded,
                    from,
                    to,
                });
            }

            if from == to {
                shared.state = AnimationState::Idle;
                if superseded.is_some() {
                    shared.events.push(AnimationEvent::Ended {
                        generation,
                        value: to,
                    });
                }
                true
            } else {
                if superseded.is_none() {
                    debug!(generation = generation.0, from, to, duration_ms, "gauge run started");
                    shared.events.push(AnimationEvent::Started {
                        generation,
                        from,
                        to,
                    });
                }
                shared.run = Some(AnimationRun::new(generation, from, to, duration_ms));
                shared.state = AnimationState::Running;
                shared.pending = Some(schedule_frame(
                    Rc::downgrade(&self.shared),
                    self.scheduler.clone(),
                    generation,
                ));
                false
            }
        };

        if settled {
            notify(&self.shared, to);
        }
    }

    /// Tear the value down: cancel the pending frame, drop listeners, and
    /// refuse further retargets. Idempotent.
    pub fn cancel(&mut self) {
        let mut shared = self.shared.borrow_mut();
        if shared.state == AnimationState::Cancelled {
            return;
        }
        if let Some(handle) = shared.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
        shared.run = None;
        shared.generation = shared.generation.next();
        shared.state = AnimationState::Cancelled;
        shared.listeners.clear();
        let generation = shared.generation;
        let value = shared.displayed;
        shared.events.push(AnimationEvent::Cancelled { generation, value });
        debug!(generation = generation.0, value, "gauge value torn down");
    }

    /// Remove and return queued lifecycle events.
    pub fn drain_events(&self) -> Vec<AnimationEvent> {
        self.shared.borrow_mut().events.drain()
    }
}

impl Drop for ValueInterpolator {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for ValueInterpolator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shared = self.shared.borrow();
        f.debug_struct("ValueInterpolator")
            .field("displayed", &shared.displayed)
            .field("state", &shared.state)
            .field("generation", &shared.generation)
            .field("run", &shared.run)
            .field("pending", &shared.pending)
            .field("duration_ms", &self.duration_ms)
            .finish()
    }
}

fn schedule_frame(
    shared: Weak<RefCell<Shared>>,
    scheduler: Rc<dyn FrameScheduler>,
    generation: Generation,
) -> FrameHandle {
    let next = scheduler.clone();
    scheduler.request_frame(Box::new(move |now_ms| {
        on_frame(&shared, &next, generation, now_ms)
    }))
}

fn on_frame(
    weak: &Weak<RefCell<Shared>>,
    scheduler: &Rc<dyn FrameScheduler>,
    generation: Generation,
    now_ms: f64,
) {
    let Some(shared_rc) = weak.upgrade() else {
        return;
    };

    let value = {
        let mut shared = shared_rc.borrow_mut();
        if shared.generation != generation || shared.state != AnimationState::Running {
            trace!(generation = generation.0, "stale gauge frame dropped");
            return;
        }
        shared.pending = None;
        let Some(run) = shared.run else {
            return;
        };

        let run = run.started_at(now_ms);
        let sample = run.sample(now_ms, shared.easing.as_ref());
        shared.displayed = sample.value;
        trace!(generation = generation.0, progress = sample.progress, value = sample.value, "gauge frame");

        if sample.finished {
            shared.run = None;
            shared.state = AnimationState::Idle;
            shared.events.push(AnimationEvent::Ended {
                generation,
                value: sample.value,
            });
            debug!(generation = generation.0, value = sample.value, "gauge run settled");
        } else {
            shared.run = Some(run);
            shared.pending = Some(schedule_frame(weak.clone(), scheduler.clone(), generation));
        }
        sample.value
    };

    notify(&shared_rc, value);
}

/// Call listeners without holding the borrow, so they may read the value.
fn notify(shared: &Rc<RefCell<Shared>>, value: f64) {
    let mut listeners = std::mem::take(&mut shared.borrow_mut().listeners);
    for listener in listeners.iter_mut() {
        listener(value);
    }
    let mut shared = shared.borrow_mut();
    if shared.state == AnimationState::Cancelled {
        return;
    }
    listeners.append(&mut shared.listeners);
    shared.listeners = listeners;
}
