//! Container measurement for responsive gauges.

pub mod host;
pub mod size_tracker;

pub use host::{LayoutError, LayoutHost};
pub use size_tracker::{ResizeListener, ResizeSource, SizeSample, SizeTracker, Subscription};
