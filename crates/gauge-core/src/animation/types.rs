//! Core animation types.
//!
//! - `AnimationState`: lifecycle of one animated value
//! - `AnimationRun`: one in-flight transition, as a plain value
//! - `Generation`: token that invalidates superseded frame callbacks

use serde::{Deserialize, Serialize};

use super::easing::Easing;

/// Lower bound of an animated percentage.
pub const MIN_PERCENT: f64 = 0.0;
/// Upper bound of an animated percentage.
pub const MAX_PERCENT: f64 = 100.0;

/// Clamp a finite value into `[0, 100]`. Returns `None` for NaN and infinities.
pub fn clamp_percent(value: f64) -> Option<f64> {
    value
        .is_finite()
        .then(|| value.clamp(MIN_PERCENT, MAX_PERCENT))
}

/// Convert a `0..1` score into a percentage.
pub fn percent_from_fraction(fraction: f64) -> Option<f64> {
    clamp_percent(fraction * 100.0)
}

/// Monotonic run counter for one animated value.
///
/// Every retarget or teardown bumps the generation; a frame callback that
/// carries an older generation must not emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Generation(pub u64);

impl Generation {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Current state of an animated value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationState {
    /// No run in flight, displayed value is stable.
    #[default]
    Idle,
    /// Interpolating toward the current run's target.
    Running,
    /// Torn down. Terminal: no further emissions.
    Cancelled,
}

/// One frame's worth of output from a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSample {
    pub value: f64,
    /// Linear progress in `[0, 1]`.
    pub progress: f64,
    pub finished: bool,
}

/// One transition from a captured start value to a target.
///
/// Runs are immutable values; [`AnimationRun::started_at`] and
/// [`AnimationRun::sample`] return new state instead of mutating in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationRun {
    pub generation: Generation,
    /// Displayed value when the run was requested.
    pub from_value: f64,
    /// Clamped target.
    pub to_value: f64,
    /// Timestamp of the first frame, in milliseconds. Unset until then.
    pub start_time: Option<f64>,
    /// `<= 0` means snap on the first frame.
    pub duration_ms: f64,
}

impl AnimationRun {
    pub fn new(generation: Generation, from_value: f64, to_value: f64, duration_ms: f64) -> Self {
        Self {
            generation,
            from_value,
            to_value,
            start_time: None,
            duration_ms,
        }
    }

    /// Pin the start time if it has not been set yet.
    pub fn started_at(self, now_ms: f64) -> Self {
        Self {
            start_time: Some(self.start_time.unwrap_or(now_ms)),
            ..self
        }
    }

    /// Linear progress at `now_ms`. A run without a start time has made none.
    pub fn progress(&self, now_ms: f64) -> f64 {
        let Some(start) = self.start_time else {
            return 0.0;
        };
        if !self.duration_ms.is_finite() || self.duration_ms <= 0.0 {
            return 1.0;
        }
        let p = (now_ms - start) / self.duration_ms;
        if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) }
    }

    /// Value at `now_ms` under `easing`.
    ///
    /// A finished run yields exactly `to_value`; intermediate values stay
    /// inside `[0, 100]` even for curves that overshoot.
    pub fn sample(&self, now_ms: f64, easing: &dyn Easing) -> RunSample {
        let progress = self.progress(now_ms);
        if progress >= 1.0 {
            return RunSample {
                value: self.to_value,
                progress: 1.0,
                finished: true,
            };
        }

        let eased = easing.ease(progress);
        let value = self.from_value + (self.to_value - self.from_value) * eased;
        RunSample {
            value: clamp_percent(value).unwrap_or(self.from_value),
            progress,
            finished: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::easing::EasingFunction;

    const EPSILON: f64 = 0.0001;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_clamp_percent() {
        assert_eq!(clamp_percent(150.0), Some(100.0));
        assert_eq!(clamp_percent(-20.0), Some(0.0));
        assert_eq!(clamp_percent(42.5), Some(42.5));
        assert_eq!(clamp_percent(f64::NAN), None);
        assert_eq!(clamp_percent(f64::INFINITY), None);
    }

    #[test]
    fn test_percent_from_fraction() {
        assert_eq!(percent_from_fraction(0.5), Some(50.0));
        assert_eq!(percent_from_fraction(1.7), Some(100.0));
        assert_eq!(percent_from_fraction(f64::NAN), None);
    }

    #[test]
    fn test_start_time_is_pinned_once() {
        let run = AnimationRun::new(Generation(1), 0.0, 80.0, 800.0);
        assert_eq!(run.start_time, None);
        let run = run.started_at(100.0).started_at(500.0);
        assert_eq!(run.start_time, Some(100.0));
    }

    #[test]
    fn test_unstarted_run_has_no_progress() {
        let run = AnimationRun::new(Generation(1), 10.0, 80.0, 800.0);
        assert_eq!(run.progress(1_000_000.0), 0.0);
    }

    #[test]
    fn test_sample_midpoint_cubic() {
        let run = AnimationRun::new(Generation(1), 0.0, 80.0, 800.0).started_at(0.0);
        let sample = run.sample(400.0, &EasingFunction::EaseOutCubic);
        assert!(approx_eq(sample.value, 70.0));
        assert!(approx_eq(sample.progress, 0.5));
        assert!(!sample.finished);
    }

    #[test]
    fn test_sample_end_is_exact() {
        let run = AnimationRun::new(Generation(1), 13.7, 61.3, 700.0).started_at(5.0);
        let sample = run.sample(705.0, &EasingFunction::EaseOutCubic);
        assert!(sample.finished);
        assert_eq!(sample.value, 61.3);
    }

    #[test]
    fn test_zero_duration_finishes_immediately() {
        let run = AnimationRun::new(Generation(1), 0.0, 55.0, 0.0).started_at(10.0);
        let sample = run.sample(10.0, &EasingFunction::EaseOutCubic);
        assert!(sample.finished);
        assert_eq!(sample.value, 55.0);
    }

    #[test]
    fn test_overshooting_curve_is_bounded() {
        let back = EasingFunction::cubic_bezier(0.3, 1.8, 0.6, 1.8).unwrap();
        let run = AnimationRun::new(Generation(1), 50.0, 100.0, 100.0).started_at(0.0);
        for t in 0..100 {
            let v = run.sample(t as f64, &back).value;
            assert!((0.0..=100.0).contains(&v), "sample {v} at {t}ms");
        }
    }

    #[test]
    fn test_generation_next() {
        assert_eq!(Generation(0).next(), Generation(1));
        assert_eq!(Generation(u64::MAX).next(), Generation(0));
    }
}
