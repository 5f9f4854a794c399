#![forbid(unsafe_code)]

//! Pointer input for the stack: samples, events, and drag tracking.
//!
//! The controller consumes [`PointerEvent`]s whose samples already carry a
//! cumulative offset and an instantaneous velocity along the drag axis.
//! Hosts that only see raw pointer positions can derive both with a
//! [`DragTracker`] fed through [`DragTracker::track_position`].
//!
//! # Elasticity
//!
//! The dragged card is constrained to its rest position (offset 0) and may
//! leave it only elastically: the visual offset is the pointer travel scaled
//! by the elasticity factor. The card resists, but follows the pointer.
//!
//! # Failure Modes
//!
//! - Non-finite samples are not errors. [`GestureSample::is_well_formed`]
//!   reports them and the controller treats such a release as a snap-back.
//! - A velocity window with fewer than two points reports zero velocity.

use std::collections::VecDeque;
use std::time::Duration;

use web_time::Instant;

/// Window of pointer history used for velocity estimation.
const DEFAULT_VELOCITY_WINDOW: Duration = Duration::from_millis(100);

/// Upper bound on retained pointer history points.
const MAX_HISTORY: usize = 32;

// ---------------------------------------------------------------------------
// Samples and events
// ---------------------------------------------------------------------------

/// Cumulative offset and instantaneous velocity along the drag axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureSample {
    pub offset: f64,
    pub velocity: f64,
}

impl GestureSample {
    #[must_use]
    pub const fn new(offset: f64, velocity: f64) -> Self {
        Self { offset, velocity }
    }

    /// Both components are finite.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.offset.is_finite() && self.velocity.is_finite()
    }
}

/// Pointer input delivered to the stack controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Pointer pressed on the card in slot `position`.
    Down { position: usize },
    /// Pointer moved while pressed.
    Move(GestureSample),
    /// Pointer released.
    Up(GestureSample),
    /// The platform aborted the gesture.
    Cancel,
    /// Click/tap on the card in slot `position`, with no drag data.
    Tap { position: usize },
}

/// Visual offset of a card dragged away from its rest position.
///
/// Non-finite travel renders at rest.
#[must_use]
pub fn elastic_offset(raw: f64, elasticity: f64) -> f64 {
    let visual = raw * elasticity;
    if visual.is_finite() { visual } else { 0.0 }
}

// ---------------------------------------------------------------------------
// Velocity estimation
// ---------------------------------------------------------------------------

/// Estimates pointer velocity (units per second) from timestamped positions.
#[derive(Debug, Clone)]
pub struct VelocityEstimator {
    window: Duration,
    history: VecDeque<(Instant, f64)>,
}

impl Default for VelocityEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl VelocityEstimator {
    #[must_use]
    pub fn new() -> Self {
        Self::with_window(DEFAULT_VELOCITY_WINDOW)
    }

    /// Estimator looking back over `window` (zero clamps to 1ms).
    #[must_use]
    pub fn with_window(window: Duration) -> Self {
        Self {
            window: window.max(Duration::from_millis(1)),
            history: VecDeque::with_capacity(MAX_HISTORY),
        }
    }

    /// Record the pointer at `position` at time `at`.
    pub fn record(&mut self, at: Instant, position: f64) {
        if self.history.len() == MAX_HISTORY {
            self.history.pop_front();
        }
        self.history.push_back((at, position));
    }

    /// Velocity across the newest point and the oldest point still inside
    /// the window.
    #[must_use]
    pub fn velocity(&self) -> f64 {
        let Some(&(newest_at, newest_pos)) = self.history.back() else {
            return 0.0;
        };
        let oldest = self
            .history
            .iter()
            .find(|(at, _)| newest_at.duration_since(*at) <= self.window);
        let Some(&(oldest_at, oldest_pos)) = oldest else {
            return 0.0;
        };
        let dt = newest_at.duration_since(oldest_at).as_secs_f64();
        if dt <= 0.0 {
            return 0.0;
        }
        (newest_pos - oldest_pos) / dt
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }
}

// ---------------------------------------------------------------------------
// DragTracker
// ---------------------------------------------------------------------------

/// Tracks one drag from pointer-down to release.
#[derive(Debug, Clone, Default)]
pub struct DragTracker {
    origin: Option<f64>,
    last: GestureSample,
    moves: u32,
    estimator: VelocityEstimator,
}

impl DragTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking. `origin` is the pointer position at press time, used
    /// only by [`track_position`](Self::track_position).
    pub fn begin(&mut self, origin: Option<f64>) {
        self.origin = origin;
        self.last = GestureSample::default();
        self.moves = 0;
        self.estimator.reset();
    }

    /// Record a host-computed sample.
    pub fn update(&mut self, sample: GestureSample) {
        self.last = sample;
        self.moves += 1;
    }

    /// Record a raw pointer position and derive the sample from it.
    pub fn track_position(&mut self, at: Instant, position: f64) -> GestureSample {
        let origin = *self.origin.get_or_insert(position);
        self.estimator.record(at, position);
        let sample = GestureSample::new(position - origin, self.estimator.velocity());
        self.update(sample);
        sample
    }

    /// Most recent sample (zero before any movement).
    #[inline]
    #[must_use]
    pub fn last(&self) -> GestureSample {
        self.last
    }

    /// Number of samples since [`begin`](Self::begin).
    #[inline]
    #[must_use]
    pub fn moves(&self) -> u32 {
        self.moves
    }

    /// Visual offset of the dragged card under `elasticity`.
    #[must_use]
    pub fn visual_offset(&self, elasticity: f64) -> f64 {
        elastic_offset(self.last.offset, elasticity)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
