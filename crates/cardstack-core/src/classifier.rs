#![forbid(unsafe_code)]

//! Swipe classification: does a released drag commit?
//!
//! Distance and velocity are fused into a single *swipe power*,
//! `|offset| * velocity`. The shorter the drag, the more velocity it needs to
//! register, so both a long drag and a short flick can commit while a drag
//! that barely moved, or one released at rest, never does.
//!
//! # Invariants
//!
//! 1. Commit iff `power < -threshold || power > threshold` (strict).
//! 2. `offset == 0` or `velocity == 0` never commits.
//! 3. NaN anywhere never commits: every comparison with NaN is false, which
//!    doubles as the "never commit on an invalid sample" policy.
//! 4. For fixed positive velocity, growing `|offset|` never turns a commit
//!    into a non-commit.

/// Outcome of classifying a released drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeDecision {
    /// Whether the stack should rotate.
    pub commit: bool,
    /// The fused swipe power the decision was made on.
    pub power: f64,
}

/// Fused distance/velocity scalar.
#[inline]
#[must_use]
pub fn swipe_power(offset: f64, velocity: f64) -> f64 {
    offset.abs() * velocity
}

/// Classify a drag that ended at `offset` moving at `velocity`.
#[must_use]
pub fn classify(offset: f64, velocity: f64, threshold: f64) -> SwipeDecision {
    let power = swipe_power(offset, velocity);
    SwipeDecision {
        commit: power < -threshold || power > threshold,
        power,
    }
}
