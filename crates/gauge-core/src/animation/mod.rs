//! Animated percentage values.
//!
//! This module provides:
//! - **Easing**: replaceable progress curves, cubic ease-out by default
//! - **Scheduling**: the display-refresh abstraction frames are driven by
//! - **Interpolation**: one animated value with restart-safe retargeting
//! - **Events**: lifecycle notifications for runs
//!
//! # Architecture
//!
//! ```text
//! host refresh ──► FrameScheduler ──► ValueInterpolator ──► listeners
//!                                      └── AnimationRun (generation-tagged)
//! ```

pub mod easing;
pub mod events;
pub mod interpolator;
pub mod scheduler;
pub mod types;

pub use easing::{Easing, EasingFunction, UnknownEasing};
pub use events::{AnimationEvent, DEFAULT_EVENT_CAPACITY, EventQueue};
pub use interpolator::{DEFAULT_DURATION_MS, ValueInterpolator};
pub use scheduler::{FrameCallback, FrameHandle, FrameQueue, FrameScheduler};
pub use types::{
    AnimationRun, AnimationState, Generation, MAX_PERCENT, MIN_PERCENT, RunSample, clamp_percent,
    percent_from_fraction,
};
