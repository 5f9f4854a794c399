#![forbid(unsafe_code)]

//! Damped harmonic oscillator (spring) animation.
//!
//! Card properties animate toward their pose targets with the classical
//! damped spring:
//!
//!   F = -stiffness × (position - target) - damping × velocity
//!
//! # Parameters
//!
//! Springs are usually built from a [`SpringSpec`] (perceived duration plus
//! bounce), which maps onto physical parameters with unit mass:
//!
//! - damping ratio ζ = clamp(1 - bounce, 0.05, 1)
//! - stiffness k = (2π / (1.2 × duration))²
//! - damping c = 2ζ√k
//!
//! A bounce of 0 is critically damped; higher bounce overshoots more.
//! Raw stiffness/damping can still be set with the builder methods.
//!
//! # Integration
//!
//! Semi-implicit Euler, subdivided into steps of at most 4ms, and shorter
//! still for stiff or heavily damped springs, so that `ω·dt` and `c·dt` stay
//! at or below 0.5 for every step.
//!
//! # Invariants
//!
//! 1. A spring at rest stays at rest until [`Spring::retarget`],
//!    [`Spring::impulse`], or [`Animation::reset`] wakes it.
//! 2. `retarget` keeps the current position and velocity, so interrupting a
//!    motion mid-flight never produces a jump.
//! 3. Stiffness is always ≥ 0.1 and damping ≥ 0.

use std::f64::consts::TAU;
use std::time::Duration;

use super::Animation;
use crate::motion::SpringSpec;

/// Maximum dt per integration step (4ms).
const MAX_STEP_SECS: f64 = 0.004;

const DEFAULT_REST_THRESHOLD: f64 = 0.001;
const DEFAULT_VELOCITY_THRESHOLD: f64 = 0.01;
const MIN_STIFFNESS: f64 = 0.1;

/// Largest `ω·dt` and `c·dt` allowed in a single integration step.
const MAX_STEP_PRODUCT: f64 = 0.5;

/// Shortest perceived duration a [`SpringSpec`] maps to.
const MIN_SPEC_DURATION: f64 = 0.05;
/// Duration-to-period factor of the duration/bounce mapping.
const PERCEPTUAL_PERIOD_FACTOR: f64 = 1.2;
const MIN_DAMPING_RATIO: f64 = 0.05;

/// A damped spring moving a scalar toward a target.
#[derive(Debug, Clone)]
pub struct Spring {
    position: f64,
    velocity: f64,
    target: f64,
    initial: f64,
    stiffness: f64,
    damping: f64,
    rest_threshold: f64,
    velocity_threshold: f64,
    at_rest: bool,
}

impl Spring {
    /// Spring starting at `initial` and targeting `target`
    /// (stiffness 170, damping 26).
    #[must_use]
    pub fn new(initial: f64, target: f64) -> Self {
        Self {
            position: initial,
            velocity: 0.0,
            target,
            initial,
            stiffness: 170.0,
            damping: 26.0,
            rest_threshold: DEFAULT_REST_THRESHOLD,
            velocity_threshold: DEFAULT_VELOCITY_THRESHOLD,
            at_rest: false,
        }
    }

    /// Spring tuned by perceived duration and bounce.
    #[must_use]
    pub fn from_spec(initial: f64, target: f64, spec: SpringSpec) -> Self {
        let (stiffness, damping) = physical_params(spec);
        Self::new(initial, target)
            .with_stiffness(stiffness)
            .with_damping(damping)
    }

    /// Set stiffness (builder pattern). Clamped to minimum 0.1.
    #[must_use]
    pub fn with_stiffness(mut self, k: f64) -> Self {
        self.stiffness = k.max(MIN_STIFFNESS);
        self
    }

    /// Set damping (builder pattern). Clamped to minimum 0.0.
    #[must_use]
    pub fn with_damping(mut self, c: f64) -> Self {
        self.damping = c.max(0.0);
        self
    }

    /// Set rest threshold (builder pattern).
    #[must_use]
    pub fn with_rest_threshold(mut self, threshold: f64) -> Self {
        self.rest_threshold = threshold.abs();
        self
    }

    /// Set velocity threshold (builder pattern).
    #[must_use]
    pub fn with_velocity_threshold(mut self, threshold: f64) -> Self {
        self.velocity_threshold = threshold.abs();
        self
    }

    /// Current position (unclamped).
    #[inline]
    #[must_use]
    pub fn position(&self) -> f64 {
        self.position
    }

    #[inline]
    #[must_use]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    #[inline]
    #[must_use]
    pub fn target(&self) -> f64 {
        self.target
    }

    #[inline]
    #[must_use]
    pub fn stiffness(&self) -> f64 {
        self.stiffness
    }

    #[inline]
    #[must_use]
    pub fn damping(&self) -> f64 {
        self.damping
    }

    #[inline]
    #[must_use]
    pub fn is_at_rest(&self) -> bool {
        self.at_rest
    }

    /// Aim at a new target with new tuning, keeping position and velocity.
    pub fn retarget(&mut self, target: f64, spec: SpringSpec) {
        let (stiffness, damping) = physical_params(spec);
        self.stiffness = stiffness.max(MIN_STIFFNESS);
        self.damping = damping.max(0.0);
        if (self.target - target).abs() > self.rest_threshold || !self.settled() {
            self.target = target;
            self.at_rest = false;
        }
    }

    /// Add to the velocity. Wakes the spring.
    pub fn impulse(&mut self, velocity_delta: f64) {
        self.velocity += velocity_delta;
        self.at_rest = false;
    }

    /// Critical damping coefficient for the current stiffness.
    #[must_use]
    pub fn critical_damping(&self) -> f64 {
        2.0 * self.stiffness.sqrt()
    }

    fn settled(&self) -> bool {
        (self.position - self.target).abs() < self.rest_threshold
            && self.velocity.abs() < self.velocity_threshold
    }

    /// Longest stable step for the current stiffness and damping.
    fn max_step(&self) -> f64 {
        let mut limit = MAX_STEP_SECS.min(MAX_STEP_PRODUCT / self.stiffness.sqrt());
        if self.damping > 0.0 {
            limit = limit.min(MAX_STEP_PRODUCT / self.damping);
        }
        limit
    }

    fn step(&mut self, dt: f64) {
        let displacement = self.position - self.target;
        let acceleration = -self.stiffness * displacement - self.damping * self.velocity;
        self.velocity += acceleration * dt;
        self.position += self.velocity * dt;
    }

    /// Advance by `dt`, subdividing for stability.
    pub fn advance(&mut self, dt: Duration) {
        if self.at_rest {
            return;
        }
        let max_step = self.max_step();
        let mut remaining = dt.as_secs_f64();
        while remaining > 0.0 {
            let step_dt = remaining.min(max_step);
            self.step(step_dt);
            remaining -= step_dt;
        }
        if self.settled() {
            self.position = self.target;
            self.velocity = 0.0;
            self.at_rest = true;
        }
    }
}

impl Animation for Spring {
    fn tick(&mut self, dt: Duration) {
        self.advance(dt);
    }

    fn is_complete(&self) -> bool {
        self.at_rest
    }

    /// Progress from the initial position toward the target, clamped to
    /// [0, 1]. A spring whose initial position equals its target reports 1.
    fn value(&self) -> f32 {
        let span = self.target - self.initial;
        if span.abs() < f64::EPSILON {
            return 1.0;
        }
        (((self.position - self.initial) / span) as f32).clamp(0.0, 1.0)
    }

    fn reset(&mut self) {
        self.position = self.initial;
        self.velocity = 0.0;
        self.at_rest = false;
    }
}

/// Map a perceived duration/bounce pair onto (stiffness, damping).
#[must_use]
pub fn physical_params(spec: SpringSpec) -> (f64, f64) {
    let duration = if spec.duration.is_finite() {
        spec.duration.max(MIN_SPEC_DURATION)
    } else {
        MIN_SPEC_DURATION
    };
    let bounce = if spec.bounce.is_finite() { spec.bounce } else { 0.0 };
    let omega = TAU / (duration * PERCEPTUAL_PERIOD_FACTOR);
    let stiffness = omega * omega;
    let zeta = (1.0 - bounce).clamp(MIN_DAMPING_RATIO, 1.0);
    (stiffness, 2.0 * zeta * stiffness.sqrt())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const MS_16: Duration = Duration::from_millis(16);

    fn simulate(spring: &mut Spring, frames: usize) {
        for _ in 0..frames {
            spring.tick(MS_16);
        }
    }

    fn peak(spring: &mut Spring, frames: usize) -> f64 {
        let mut max = f64::MIN;
        for _ in 0..frames {
            spring.tick(MS_16);
            max = max.max(spring.position());
        }
        max
    }

    #[test]
    fn spec_spring_reaches_target() {
        let mut spring = Spring::from_spec(0.0, 62.0, SpringSpec::new(0.5, 0.1));
        simulate(&mut spring, 200);
        assert!(spring.is_complete(), "pos {}", spring.position());
        assert_eq!(spring.position(), 62.0);
    }

    #[test]
    fn zero_bounce_is_critically_damped() {
        let spring = Spring::from_spec(0.0, 1.0, SpringSpec::new(0.3, 0.0));
        assert!((spring.damping() - spring.critical_damping()).abs() < 1e-9);

        let mut spring = spring;
        assert!(peak(&mut spring, 200) < 1.01);
    }

    #[test]
    fn bounce_overshoots() {
        let mut spring = Spring::from_spec(0.0, 1.0, SpringSpec::new(0.3, 0.5));
        assert!(peak(&mut spring, 200) > 1.01);
    }

    #[test]
    fn shorter_duration_is_stiffer() {
        let (fast, _) = physical_params(SpringSpec::new(0.1, 0.3));
        let (slow, _) = physical_params(SpringSpec::new(1.0, 0.3));
        assert!(fast > slow);
    }

    #[test]
    fn malformed_spec_is_sanitized() {
        let (k, c) = physical_params(SpringSpec::new(f64::NAN, f64::INFINITY));
        assert!(k.is_finite() && k > 0.0);
        assert!(c.is_finite() && c > 0.0);
        let (k, _) = physical_params(SpringSpec::new(-3.0, 0.3));
        assert!(k.is_finite());
    }

    #[test]
    fn retarget_keeps_velocity() {
        let mut spring = Spring::from_spec(0.0, 100.0, SpringSpec::new(0.3, 0.3));
        simulate(&mut spring, 3);
        let (pos, vel) = (spring.position(), spring.velocity());
        spring.retarget(-50.0, SpringSpec::new(0.5, 0.1));
        assert_eq!(spring.position(), pos);
        assert_eq!(spring.velocity(), vel);
        assert_eq!(spring.target(), -50.0);
        simulate(&mut spring, 300);
        assert!((spring.position() + 50.0).abs() < 0.01);
    }

    #[test]
    fn retarget_same_value_at_rest_stays_at_rest() {
        let mut spring = Spring::new(0.0, 1.0);
        simulate(&mut spring, 200);
        assert!(spring.is_complete());
        spring.retarget(1.0, SpringSpec::new(0.3, 0.3));
        assert!(spring.is_complete());
        spring.retarget(2.0, SpringSpec::new(0.3, 0.3));
        assert!(!spring.is_complete());
    }

    #[test]
    fn impulse_wakes() {
        let mut spring = Spring::new(0.0, 0.0);
        simulate(&mut spring, 10);
        assert!(spring.is_complete());
        spring.impulse(50.0);
        assert!(!spring.is_complete());
        spring.tick(MS_16);
        assert!(spring.position() > 0.0);
    }

    #[test]
    fn zero_duration_settles_without_blowing_up() {
        for duration in [0.0, 0.01, 0.02, 0.03, f64::NAN] {
            let mut spring = Spring::from_spec(1.0, 0.8, SpringSpec::new(duration, 0.3));
            for _ in 0..200 {
                spring.tick(MS_16);
                assert!(spring.position().is_finite(), "duration {duration}");
            }
            assert!(spring.is_complete(), "duration {duration}");
            assert_eq!(spring.position(), 0.8);
        }
    }

    #[test]
    fn stiff_raw_spring_stays_finite() {
        let mut spring = Spring::new(0.0, 100.0)
            .with_stiffness(1.0e6)
            .with_damping(2_000.0);
        for _ in 0..100 {
            spring.tick(MS_16);
            assert!(spring.position().is_finite());
        }
        assert!(spring.is_complete());
    }

    #[test]
    fn large_dt_subdivided() {
        let mut spring = Spring::from_spec(0.0, 1.0, SpringSpec::new(0.3, 0.3));
        spring.tick(Duration::from_secs(5));
        assert!((spring.position() - 1.0).abs() < 0.01);
    }

    #[test]
    fn zero_dt_noop() {
        let mut spring = Spring::new(0.0, 1.0);
        spring.tick(Duration::ZERO);
        assert_eq!(spring.position(), 0.0);
    }

    #[test]
    fn builder_clamps() {
        let spring = Spring::new(0.0, 1.0)
            .with_stiffness(-1.0)
            .with_damping(-5.0)
            .with_rest_threshold(-0.05)
            .with_velocity_threshold(-0.3);
        assert!(spring.stiffness() >= MIN_STIFFNESS);
        assert_eq!(spring.damping(), 0.0);
        assert!((spring.rest_threshold - 0.05).abs() < f64::EPSILON);
        assert!((spring.velocity_threshold - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn value_reports_progress() {
        let mut spring = Spring::from_spec(1.0, 0.8, SpringSpec::new(0.3, 0.0));
        assert_eq!(spring.value(), 0.0);
        simulate(&mut spring, 200);
        assert_eq!(spring.value(), 1.0);

        let still = Spring::new(5.0, 5.0);
        assert_eq!(still.value(), 1.0);
    }

    #[test]
    fn reset_restores_initial() {
        let mut spring = Spring::new(42.0, 100.0);
        simulate(&mut spring, 200);
        spring.reset();
        assert_eq!(spring.position(), 42.0);
        assert_eq!(spring.velocity(), 0.0);
        assert!(!spring.is_complete());
    }

    #[test]
    fn deterministic_across_runs() {
        let run = || {
            let mut spring = Spring::from_spec(0.0, 1.0, SpringSpec::new(0.3, 0.3));
            (0..50)
                .map(|_| {
                    spring.tick(MS_16);
                    spring.position()
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}
