//! The metric ring: sizing policy, tone colors, and the renderer that
//! combines an animated value with a tracked container size.

pub mod color;
pub mod geometry;
pub mod renderer;

pub use color::{LinearRgba, RingTone, TrustBand, UnknownVerdict, Verdict, track_color};
pub use geometry::{RingGeometry, RingSizing, compute_geometry, label_percent, sweep_angle};
pub use renderer::{DEFAULT_INSET_PX, RingRenderer, RingStyle, RingView, render_ring};
