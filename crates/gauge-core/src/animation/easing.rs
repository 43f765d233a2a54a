//! Easing curves for value interpolation.
//!
//! An easing curve maps linear progress in `[0, 1]` to eased progress. The
//! interpolator only talks to the [`Easing`] trait, so any curve can be
//! swapped in without touching scheduling:
//!
//! ```
//! use gauge_core::animation::easing::{Easing, EasingFunction};
//!
//! let ease = EasingFunction::EaseOutCubic;
//! assert_eq!(ease.ease(1.0), 1.0);
//!
//! // Plain closures are curves too.
//! let quad = |p: f64| p * p;
//! assert_eq!(quad.ease(0.5), 0.25);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maps linear progress to eased progress.
///
/// Implementations receive `p` already clamped to `[0, 1]` and should return
/// `0.0` at `p = 0` and `1.0` at `p = 1`.
pub trait Easing {
    fn ease(&self, p: f64) -> f64;
}

impl<F> Easing for F
where
    F: Fn(f64) -> f64,
{
    fn ease(&self, p: f64) -> f64 {
        self(p)
    }
}

/// Built-in easing curves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EasingFunction {
    /// Linear interpolation (no easing).
    Linear,

    /// `1 - (1 - p)^3`: fast start, slow settle.
    #[default]
    EaseOutCubic,

    /// CSS `ease`, `cubic-bezier(0.25, 0.1, 0.25, 1.0)`.
    Ease,

    /// CSS `ease-in`, `cubic-bezier(0.42, 0, 1, 1)`.
    EaseIn,

    /// CSS `ease-out`, `cubic-bezier(0, 0, 0.58, 1)`.
    EaseOut,

    /// CSS `ease-in-out`, `cubic-bezier(0.42, 0, 0.58, 1)`.
    EaseInOut,

    /// Custom cubic bezier curve through `(x1, y1)` and `(x2, y2)`.
    /// x values must be in [0, 1].
    CubicBezier { x1: f64, y1: f64, x2: f64, y2: f64 },
}

impl EasingFunction {
    /// Evaluate the curve at `t`, clamping the input to `[0, 1]`.
    pub fn evaluate(&self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        match self {
            Self::Linear => t,
            Self::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Self::Ease => cubic_bezier(0.25, 0.1, 0.25, 1.0, t),
            Self::EaseIn => cubic_bezier(0.42, 0.0, 1.0, 1.0, t),
            Self::EaseOut => cubic_bezier(0.0, 0.0, 0.58, 1.0, t),
            Self::EaseInOut => cubic_bezier(0.42, 0.0, 0.58, 1.0, t),
            Self::CubicBezier { x1, y1, x2, y2 } => cubic_bezier(*x1, *y1, *x2, *y2, t),
        }
    }

    /// Create a custom cubic bezier curve.
    ///
    /// Returns `None` if x1 or x2 fall outside [0, 1].
    pub fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64) -> Option<Self> {
        if (0.0..=1.0).contains(&x1) && (0.0..=1.0).contains(&x2) {
            Some(Self::CubicBezier { x1, y1, x2, y2 })
        } else {
            None
        }
    }

    /// Config name of this curve; `CubicBezier` has none.
    pub fn name(&self) -> Option<&'static str> {
        match self {
            Self::Linear => Some("linear"),
            Self::EaseOutCubic => Some("ease_out_cubic"),
            Self::Ease => Some("ease"),
            Self::EaseIn => Some("ease_in"),
            Self::EaseOut => Some("ease_out"),
            Self::EaseInOut => Some("ease_in_out"),
            Self::CubicBezier { .. } => None,
        }
    }
}

impl Easing for EasingFunction {
    fn ease(&self, p: f64) -> f64 {
        self.evaluate(p)
    }
}

/// Unknown easing name in configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown easing curve: {0}")]
pub struct UnknownEasing(pub String);

impl FromStr for EasingFunction {
    type Err = UnknownEasing;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "linear" => Ok(Self::Linear),
            "ease_out_cubic" | "cubic_out" => Ok(Self::EaseOutCubic),
            "ease" => Ok(Self::Ease),
            "ease_in" => Ok(Self::EaseIn),
            "ease_out" => Ok(Self::EaseOut),
            "ease_in_out" => Ok(Self::EaseInOut),
            other => Err(UnknownEasing(other.to_string())),
        }
    }
}

impl fmt::Display for EasingFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CubicBezier { x1, y1, x2, y2 } => {
                write!(f, "cubic-bezier({x1}, {y1}, {x2}, {y2})")
            }
            named => f.write_str(named.name().unwrap_or("custom")),
        }
    }
}

/// Evaluate a cubic bezier timing curve at `progress`.
///
/// Newton-Raphson finds the curve parameter whose x matches `progress`,
/// then the y coordinate at that parameter is returned.
fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64, progress: f64) -> f64 {
    if progress <= 0.0 {
        return 0.0;
    }
    if progress >= 1.0 {
        return 1.0;
    }

    let t = solve_bezier_x(x1, x2, progress);
    bezier_axis(y1, y2, t)
}

fn solve_bezier_x(x1: f64, x2: f64, target_x: f64) -> f64 {
    let mut t = target_x;

    for _ in 0..8 {
        let x = bezier_axis(x1, x2, t) - target_x;
        if x.abs() < 1e-7 {
            break;
        }

        let dx = bezier_axis_derivative(x1, x2, t);
        if dx.abs() < 1e-7 {
            break;
        }

        t = (t - x / dx).clamp(0.0, 1.0);
    }

    t
}

/// One coordinate of the curve: 3(1-t)²t·c1 + 3(1-t)t²·c2 + t³
#[inline]
fn bezier_axis(c1: f64, c2: f64, t: f64) -> f64 {
    let mt = 1.0 - t;
    3.0 * mt * mt * t * c1 + 3.0 * mt * t * t * c2 + t * t * t
}

/// d/dt = 3(1-t)²·c1 + 6(1-t)t·(c2-c1) + 3t²·(1-c2)
#[inline]
fn bezier_axis_derivative(c1: f64, c2: f64, t: f64) -> f64 {
    let mt = 1.0 - t;
    3.0 * mt * mt * c1 + 6.0 * mt * t * (c2 - c1) + 3.0 * t * t * (1.0 - c2)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 0.001;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_ease_out_cubic_values() {
        let ease = EasingFunction::EaseOutCubic;
        assert_eq!(ease.evaluate(0.0), 0.0);
        assert_eq!(ease.evaluate(1.0), 1.0);
        assert!(approx_eq(ease.evaluate(0.5), 0.875));
        assert!(approx_eq(ease.evaluate(0.25), 0.578125));
    }

    #[test]
    fn test_ease_out_cubic_is_fast_then_slow() {
        let ease = EasingFunction::EaseOutCubic;
        let first_step = ease.evaluate(0.1) - ease.evaluate(0.0);
        let last_step = ease.evaluate(1.0) - ease.evaluate(0.9);
        assert!(first_step > last_step * 10.0);
    }

    #[test]
    fn test_input_is_clamped() {
        let ease = EasingFunction::EaseOutCubic;
        assert_eq!(ease.evaluate(-1.0), 0.0);
        assert_eq!(ease.evaluate(2.0), 1.0);
        assert_eq!(ease.evaluate(f64::NAN), 0.0);
    }

    #[test]
    fn test_linear() {
        let ease = EasingFunction::Linear;
        assert!(approx_eq(ease.evaluate(0.25), 0.25));
        assert!(approx_eq(ease.evaluate(0.75), 0.75));
    }

    #[test]
    fn test_css_curves_hit_endpoints_and_increase() {
        for ease in [
            EasingFunction::Ease,
            EasingFunction::EaseIn,
            EasingFunction::EaseOut,
            EasingFunction::EaseInOut,
        ] {
            assert!(approx_eq(ease.evaluate(0.0), 0.0), "{ease} at 0");
            assert!(approx_eq(ease.evaluate(1.0), 1.0), "{ease} at 1");
            let mut prev = 0.0;
            for i in 1..=20 {
                let v = ease.evaluate(i as f64 / 20.0);
                assert!(v + 1e-9 >= prev, "{ease} decreased at step {i}");
                prev = v;
            }
        }
    }

    #[test]
    fn test_ease_in_out_symmetric() {
        let ease = EasingFunction::EaseInOut;
        assert!(approx_eq(ease.evaluate(0.5), 0.5));
        assert!(approx_eq(ease.evaluate(0.3) + ease.evaluate(0.7), 1.0));
    }

    #[test]
    fn test_cubic_bezier_validation() {
        assert!(EasingFunction::cubic_bezier(0.4, 0.0, 0.2, 1.0).is_some());
        assert!(EasingFunction::cubic_bezier(1.5, 0.0, 0.2, 1.0).is_none());
        assert!(EasingFunction::cubic_bezier(0.4, -2.0, 0.2, 3.0).is_some());
    }

    #[test]
    fn test_closure_is_easing() {
        let quad = |p: f64| p * p;
        assert!(approx_eq(quad.ease(0.5), 0.25));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("ease_out_cubic".parse(), Ok(EasingFunction::EaseOutCubic));
        assert_eq!("Ease-In-Out".parse(), Ok(EasingFunction::EaseInOut));
        assert_eq!("linear".parse(), Ok(EasingFunction::Linear));
        assert!("bounce".parse::<EasingFunction>().is_err());
    }

    #[test]
    fn test_display_round_trips_names() {
        for ease in [
            EasingFunction::Linear,
            EasingFunction::EaseOutCubic,
            EasingFunction::Ease,
            EasingFunction::EaseIn,
            EasingFunction::EaseOut,
            EasingFunction::EaseInOut,
        ] {
            assert_eq!(ease.to_string().parse(), Ok(ease));
        }
    }

    #[test]
    fn test_serde_roundtrip() {
        let ease = EasingFunction::EaseOutCubic;
        let json = serde_json::to_string(&ease).unwrap();
        assert_eq!(json, r#"{"type":"ease_out_cubic"}"#);
        let parsed: EasingFunction = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ease);
    }
}
