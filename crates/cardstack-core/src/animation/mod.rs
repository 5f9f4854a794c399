#![forbid(unsafe_code)]

//! Frame-driven animation primitives.
//!
//! Everything here advances on explicit `tick(dt)` calls; there is no clock.
//! The runtime's animator owns one primitive per animated card property and
//! ticks them once per rendered frame.
//!
//! - [`Spring`]: damped harmonic oscillator, tuned either by raw
//!   stiffness/damping or by a [`SpringSpec`](crate::motion::SpringSpec).
//! - [`Tween`]: fixed-duration interpolation with an easing curve.

pub mod spring;

use std::time::Duration;

pub use spring::Spring;

/// Common interface of tickable animations.
pub trait Animation {
    /// Advance by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has reached its end state.
    fn is_complete(&self) -> bool;

    /// Normalized progress in [0.0, 1.0].
    fn value(&self) -> f32;

    /// Return to the initial state.
    fn reset(&mut self);

    /// Time consumed past completion by the last tick.
    fn overshoot(&self) -> Duration {
        Duration::ZERO
    }
}

// ---------------------------------------------------------------------------
// Easing
// ---------------------------------------------------------------------------

/// Easing curve mapping normalized time to normalized progress.
pub type EasingFn = fn(f32) -> f32;

#[must_use]
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

#[must_use]
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

// ---------------------------------------------------------------------------
// Tween
// ---------------------------------------------------------------------------

/// Interpolates between two values over a fixed duration.
#[derive(Debug, Clone)]
pub struct Tween {
    from: f64,
    to: f64,
    duration: Duration,
    elapsed: Duration,
    easing: EasingFn,
    overshoot: Duration,
}

impl Tween {
    /// Tween from `from` to `to` over `duration` (zero clamps to 1ns).
    #[must_use]
    pub fn new(from: f64, to: f64, duration: Duration) -> Self {
        Self {
            from,
            to,
            duration: duration.max(Duration::from_nanos(1)),
            elapsed: Duration::ZERO,
            easing: ease_out_cubic,
            overshoot: Duration::ZERO,
        }
    }

    /// Set the easing curve (builder pattern).
    #[must_use]
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    /// Current interpolated value.
    #[must_use]
    pub fn position(&self) -> f64 {
        let p = f64::from((self.easing)(self.value()));
        self.from + (self.to - self.from) * p
    }

    #[must_use]
    pub fn target(&self) -> f64 {
        self.to
    }
}

impl Animation for Tween {
    fn tick(&mut self, dt: Duration) {
        let next = self.elapsed + dt;
        if next >= self.duration {
            self.overshoot = next - self.duration;
            self.elapsed = self.duration;
        } else {
            self.overshoot = Duration::ZERO;
            self.elapsed = next;
        }
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn value(&self) -> f32 {
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0) as f32
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
        self.overshoot = Duration::ZERO;
    }

    fn overshoot(&self) -> Duration {
        self.overshoot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_endpoints() {
        for easing in [ease_out, ease_out_cubic] {
            assert!((easing(0.0) - 0.0).abs() < 1e-6);
            assert!((easing(1.0) - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn tween_reaches_target() {
        let mut t = Tween::new(1.0, 0.0, Duration::from_millis(300));
        assert_eq!(t.position(), 1.0);
        t.tick(Duration::from_millis(150));
        assert!(t.position() > 0.0 && t.position() < 1.0);
        assert!(!t.is_complete());
        t.tick(Duration::from_millis(200));
        assert!(t.is_complete());
        assert_eq!(t.position(), 0.0);
        assert_eq!(t.overshoot(), Duration::from_millis(50));
    }

    #[test]
    fn tween_reset() {
        let mut t = Tween::new(0.0, 10.0, Duration::from_millis(100)).easing(ease_out);
        t.tick(Duration::from_millis(50));
        assert!((t.position() - 7.5).abs() < 1e-6);
        t.reset();
        assert_eq!(t.position(), 0.0);
    }

    #[test]
    fn zero_duration_tween_completes_on_first_tick() {
        let mut t = Tween::new(0.0, 1.0, Duration::ZERO);
        t.tick(Duration::from_nanos(1));
        assert!(t.is_complete());
    }
}
