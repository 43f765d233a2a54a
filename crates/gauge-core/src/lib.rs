//! gauge-core: animated metric rings.
//!
//! An animated percentage ([`ValueInterpolator`]) driven by an injectable
//! display-refresh scheduler, container size tracking ([`SizeTracker`]) and
//! the pure ring mapping ([`render_ring`]) that turns both into something a
//! backend can draw.

pub mod animation;
pub mod layout;
pub mod ring;

/// Re-export taffy so hosts can build panel styles without a direct dependency.
pub use taffy;

pub use animation::{
    AnimationEvent, AnimationState, Easing, EasingFunction, FrameQueue, FrameScheduler,
    ValueInterpolator,
};
pub use layout::{LayoutError, LayoutHost, ResizeSource, SizeSample, SizeTracker, Subscription};
pub use ring::{
    RingGeometry, RingRenderer, RingSizing, RingStyle, RingTone, RingView, Verdict,
    compute_geometry, render_ring,
};
