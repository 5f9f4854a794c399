#![forbid(unsafe_code)]

//! Motion parameter set: the knobs that tune how the stack moves.
//!
//! A [`MotionParams`] value is read-only per render. Hosts replace it
//! wholesale (or through [`MotionParams::set`]) and the controller picks the
//! new values up on its next recompute; poses already handed to the renderer
//! keep the parameters they were built with.
//!
//! # Ranges
//!
//! Every knob has a documented slider range ([`MotionKnob::range`]). The
//! ranges are advisory: out-of-range values are accepted and simply produce
//! unusual motion. Only *malformed* values (non-finite or negative) are
//! rejected, and only when a caller asks via [`MotionParams::checked`].

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, StackError};

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const DEFAULT_SPRING_DURATION: f64 = 0.3;
const DEFAULT_SPRING_BOUNCE: f64 = 0.3;
const DEFAULT_X_SPRING_DURATION: f64 = 0.5;
const DEFAULT_X_SPRING_BOUNCE: f64 = 0.1;
const DEFAULT_DRAG_ELASTIC: f64 = 0.7;
const DEFAULT_SWIPE_THRESHOLD: f64 = 10_000.0;
const DEFAULT_Z_INDEX_DELAY: f64 = 0.05;

// ---------------------------------------------------------------------------
// SpringSpec
// ---------------------------------------------------------------------------

/// Duration/bounce pair describing a spring transition.
///
/// `duration` is in seconds; `bounce` is in [0, 1] where 0 is critically
/// damped and 1 never settles.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpringSpec {
    pub duration: f64,
    pub bounce: f64,
}

impl SpringSpec {
    #[must_use]
    pub const fn new(duration: f64, bounce: f64) -> Self {
        Self { duration, bounce }
    }
}

// ---------------------------------------------------------------------------
// MotionKnob
// ---------------------------------------------------------------------------

/// Slider range of a knob: inclusive bounds plus the slider step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnobRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl KnobRange {
    const fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    /// Whether `value` lies within the inclusive bounds.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Names of the individual motion knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionKnob {
    SpringDuration,
    SpringBounce,
    HorizontalSpringDuration,
    HorizontalSpringBounce,
    DragElasticity,
    SwipeThreshold,
    ZIndexDelay,
}

impl MotionKnob {
    /// All knobs in settings-panel order.
    pub const ALL: [MotionKnob; 7] = [
        MotionKnob::SpringDuration,
        MotionKnob::SpringBounce,
        MotionKnob::HorizontalSpringDuration,
        MotionKnob::HorizontalSpringBounce,
        MotionKnob::DragElasticity,
        MotionKnob::SwipeThreshold,
        MotionKnob::ZIndexDelay,
    ];

    /// Stable machine name, matching the config-file field name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SpringDuration => "spring_duration",
            Self::SpringBounce => "spring_bounce",
            Self::HorizontalSpringDuration => "x_spring_duration",
            Self::HorizontalSpringBounce => "x_spring_bounce",
            Self::DragElasticity => "drag_elastic",
            Self::SwipeThreshold => "swipe_confidence_threshold",
            Self::ZIndexDelay => "z_index_delay",
        }
    }

    /// Human-facing label for a settings control.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SpringDuration => "Animation Duration",
            Self::SpringBounce => "Animation Bounce",
            Self::HorizontalSpringDuration => "Duration",
            Self::HorizontalSpringBounce => "Bounce",
            Self::DragElasticity => "Drag Elasticity",
            Self::SwipeThreshold => "Swipe Sensitivity",
            Self::ZIndexDelay => "Z-Index Delay",
        }
    }

    /// Documented slider range for this knob.
    #[must_use]
    pub const fn range(self) -> KnobRange {
        match self {
            Self::SpringDuration => KnobRange::new(0.1, 1.0, 0.05),
            Self::SpringBounce => KnobRange::new(0.0, 1.0, 0.05),
            Self::HorizontalSpringDuration => KnobRange::new(0.1, 1.5, 0.05),
            Self::HorizontalSpringBounce => KnobRange::new(0.0, 0.5, 0.01),
            Self::DragElasticity => KnobRange::new(0.1, 1.5, 0.05),
            Self::SwipeThreshold => KnobRange::new(1000.0, 20_000.0, 500.0),
            Self::ZIndexDelay => KnobRange::new(0.0, 0.2, 0.01),
        }
    }

    /// Quantize a raw slider value onto the step grid, clamped into range.
    ///
    /// Non-finite input snaps to the knob's default.
    #[must_use]
    pub fn snap(self, value: f64) -> f64 {
        if !value.is_finite() {
            return MotionParams::with_defaults().get(self);
        }
        let KnobRange { min, max, step } = self.range();
        let steps = ((value.clamp(min, max) - min) / step).round();
        let snapped = (min + steps * step).clamp(min, max);
        // Strip accumulated float noise (0.30000000000000004 → 0.3).
        (snapped * 1e6).round() / 1e6
    }

    /// Display text for a value of this knob, as a settings panel shows it.
    #[must_use]
    pub fn format_value(self, value: f64) -> String {
        match self {
            Self::SpringDuration | Self::HorizontalSpringDuration => format!("{value:.2}s"),
            Self::ZIndexDelay => format!("{value:.3}s"),
            Self::SwipeThreshold => group_thousands(value.round() as i64),
            Self::SpringBounce | Self::HorizontalSpringBounce | Self::DragElasticity => {
                format!("{value:.2}")
            }
        }
    }

    const fn is_duration(self) -> bool {
        matches!(
            self,
            Self::SpringDuration | Self::HorizontalSpringDuration | Self::ZIndexDelay
        )
    }
}

impl fmt::Display for MotionKnob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MotionKnob {
    type Err = StackError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|knob| knob.name() == s)
            .ok_or_else(|| StackError::config(format!("unknown motion knob `{s}`")))
    }
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// ---------------------------------------------------------------------------
// MotionParams
// ---------------------------------------------------------------------------

/// Configuration bundle for spring timing, drag feel, and swipe sensitivity.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MotionParams {
    /// Primary spring duration (scale, vertical offset), seconds.
    pub spring_duration: f64,
    /// Primary spring bounce.
    pub spring_bounce: f64,
    /// Horizontal-offset spring duration, seconds.
    pub x_spring_duration: f64,
    /// Horizontal-offset spring bounce.
    pub x_spring_bounce: f64,
    /// Fraction of the pointer travel the dragged card follows.
    pub drag_elastic: f64,
    /// Swipe power a release must exceed (in magnitude) to commit.
    pub swipe_confidence_threshold: f64,
    /// Delay before a card's z-order change applies, seconds.
    pub z_index_delay: f64,
}

impl Default for MotionParams {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl MotionParams {
    /// The stock parameter set.
    #[must_use]
    pub const fn with_defaults() -> Self {
        Self {
            spring_duration: DEFAULT_SPRING_DURATION,
            spring_bounce: DEFAULT_SPRING_BOUNCE,
            x_spring_duration: DEFAULT_X_SPRING_DURATION,
            x_spring_bounce: DEFAULT_X_SPRING_BOUNCE,
            drag_elastic: DEFAULT_DRAG_ELASTIC,
            swipe_confidence_threshold: DEFAULT_SWIPE_THRESHOLD,
            z_index_delay: DEFAULT_Z_INDEX_DELAY,
        }
    }

    /// Read a knob.
    #[must_use]
    pub fn get(&self, knob: MotionKnob) -> f64 {
        match knob {
            MotionKnob::SpringDuration => self.spring_duration,
            MotionKnob::SpringBounce => self.spring_bounce,
            MotionKnob::HorizontalSpringDuration => self.x_spring_duration,
            MotionKnob::HorizontalSpringBounce => self.x_spring_bounce,
            MotionKnob::DragElasticity => self.drag_elastic,
            MotionKnob::SwipeThreshold => self.swipe_confidence_threshold,
            MotionKnob::ZIndexDelay => self.z_index_delay,
        }
    }

    /// Write a knob. Out-of-range values are accepted and logged.
    pub fn set(&mut self, knob: MotionKnob, value: f64) {
        if !knob.range().contains(value) {
            tracing::warn!(knob = knob.name(), value, "motion knob outside documented range");
        }
        let slot = match knob {
            MotionKnob::SpringDuration => &mut self.spring_duration,
            MotionKnob::SpringBounce => &mut self.spring_bounce,
            MotionKnob::HorizontalSpringDuration => &mut self.x_spring_duration,
            MotionKnob::HorizontalSpringBounce => &mut self.x_spring_bounce,
            MotionKnob::DragElasticity => &mut self.drag_elastic,
            MotionKnob::SwipeThreshold => &mut self.swipe_confidence_threshold,
            MotionKnob::ZIndexDelay => &mut self.z_index_delay,
        };
        *slot = value;
    }

    /// Set a knob (builder pattern).
    #[must_use]
    pub fn with(mut self, knob: MotionKnob, value: f64) -> Self {
        self.set(knob, value);
        self
    }

    /// Restore the stock values.
    pub fn reset(&mut self) {
        *self = Self::with_defaults();
    }

    /// Spring used for scale and vertical offset.
    #[must_use]
    pub fn spring(&self) -> SpringSpec {
        SpringSpec::new(self.spring_duration, self.spring_bounce)
    }

    /// Spring used for horizontal offset.
    #[must_use]
    pub fn horizontal_spring(&self) -> SpringSpec {
        SpringSpec::new(self.x_spring_duration, self.x_spring_bounce)
    }

    /// Delay before z-order changes take effect.
    ///
    /// Malformed (negative or non-finite) delays collapse to zero.
    #[must_use]
    pub fn z_index_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.z_index_delay).unwrap_or(Duration::ZERO)
    }

    /// Advisory range check.
    ///
    /// Returns one message per knob outside its documented range. An empty
    /// list means every knob is in range.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        MotionKnob::ALL
            .into_iter()
            .filter_map(|knob| {
                let range = knob.range();
                let value = self.get(knob);
                (!range.contains(value)).then(|| {
                    format!(
                        "{} should be in [{}, {}], got {}",
                        knob.name(),
                        range.min,
                        range.max,
                        value
                    )
                })
            })
            .collect()
    }

    /// Reject malformed parameter sets with
    /// [`StackError::InvalidConfiguration`](crate::error::StackError::InvalidConfiguration):
    /// non-finite values, negative durations, or a negative elasticity or
    /// threshold.
    ///
    /// Out-of-range but well-formed values pass; see [`validate`](Self::validate).
    pub fn checked(self) -> Result<Self> {
        for knob in MotionKnob::ALL {
            let value = self.get(knob);
            if !value.is_finite() {
                return Err(StackError::config(format!(
                    "{} must be finite, got {value}",
                    knob.name()
                )));
            }
            if value < 0.0 {
                let what = if knob.is_duration() { "duration" } else { "value" };
                return Err(StackError::config(format!(
                    "{} is a {what} and cannot be negative, got {value}",
                    knob.name()
                )));
            }
        }
        Ok(self)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
