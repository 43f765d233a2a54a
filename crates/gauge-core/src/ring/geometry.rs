//! Ring sizing and sweep math.

use gauge_config::{SizingConfig, SizingMode};
use serde::{Deserialize, Serialize};

use crate::animation::clamp_percent;
use crate::layout::SizeSample;

/// Degrees of sweep per percentage point.
pub const DEGREES_PER_PERCENT: f64 = 3.6;

/// How the ring diameter is chosen.
///
/// Panels that size the ring from their own width use
/// [`RingSizing::RESPONSIVE`]; detail views with no responsive parent use
/// the literal [`RingSizing::FIXED`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RingSizing {
    /// `floor(width * scale)` bounded to `[min_px, max_px]`.
    Responsive { scale: f64, min_px: f64, max_px: f64 },
    /// Same diameter regardless of layout.
    Fixed { diameter_px: f64 },
}

impl RingSizing {
    pub const RESPONSIVE: RingSizing = RingSizing::Responsive {
        scale: 0.28,
        min_px: 140.0,
        max_px: 260.0,
    };

    pub const FIXED: RingSizing = RingSizing::Fixed { diameter_px: 220.0 };

    pub const fn fixed(diameter_px: f64) -> Self {
        Self::Fixed { diameter_px }
    }

    pub fn from_config(config: &SizingConfig) -> Self {
        match config.mode {
            SizingMode::Responsive => Self::Responsive {
                scale: config.scale,
                min_px: config.min_px,
                max_px: config.max_px,
            },
            SizingMode::Fixed => Self::Fixed {
                diameter_px: config.fixed_diameter_px,
            },
        }
    }

    /// Diameter for a container of `size`.
    ///
    /// An unmeasured container gets `min_px` rather than collapsing.
    pub fn diameter(&self, size: SizeSample) -> f64 {
        match *self {
            Self::Fixed { diameter_px } => diameter_px,
            Self::Responsive {
                scale,
                min_px,
                max_px,
            } => {
                if !size.is_measured() {
                    return min_px;
                }
                let scaled = (size.width * scale).floor();
                if scaled.is_nan() {
                    return min_px;
                }
                // max-then-min so inverted bounds degrade instead of panicking.
                scaled.max(min_px).min(max_px)
            }
        }
    }
}

impl Default for RingSizing {
    fn default() -> Self {
        Self::RESPONSIVE
    }
}

/// Derived ring shape. Recomputed on every render.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RingGeometry {
    pub diameter_px: f64,
    /// 0 to 360.
    pub sweep_angle_deg: f64,
}

/// Sweep angle for a percentage; out-of-range values are clamped, NaN is 0.
pub fn sweep_angle(value: f64) -> f64 {
    clamp_percent(value).unwrap_or(0.0) * DEGREES_PER_PERCENT
}

/// Rounded percentage shown inside the ring.
pub fn label_percent(value: f64) -> u32 {
    clamp_percent(value).unwrap_or(0.0).round() as u32
}

pub fn compute_geometry(value: f64, size: SizeSample, sizing: &RingSizing) -> RingGeometry {
    RingGeometry {
        diameter_px: sizing.diameter(size),
        sweep_angle_deg: sweep_angle(value),
    }
}
