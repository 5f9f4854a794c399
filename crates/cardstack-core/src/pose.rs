#![forbid(unsafe_code)]

//! Position-to-visual mapping.
//!
//! [`PoseMapper::pose_for`] turns a slot position into the [`Pose`] the card
//! in that slot should animate toward. The mapping is a pure table lookup
//! plus the transition list derived from the current [`MotionParams`].
//!
//! # Transition policy
//!
//! | property | transition |
//! |---|---|
//! | z-order | step change after `z_index_delay` |
//! | scale, y | primary spring |
//! | x | horizontal spring |
//! | opacity, rotation | host default |
//!
//! The z-order change is deferred so a card's stacking order flips only
//! after its geometric motion has begun; otherwise a card moving to the
//! back pops behind a stationary one on the first frame.
//!
//! Cards leaving the stack animate to the exit pose (opacity 0, scale 0.5,
//! y +50) with host-default transitions only. Exits are not spring-tuned.

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, StackError};
use crate::motion::{MotionParams, SpringSpec};

/// Perspective distance applied to every card.
pub const PERSPECTIVE: f64 = 400.0;

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// A property of a card the renderer animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AnimatedProperty {
    Opacity,
    Scale,
    Y,
    Rotation,
    X,
    ZIndex,
}

/// How one property moves toward its target.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum Transition {
    /// Spring with the given duration/bounce.
    Spring(SpringSpec),
    /// Jump to the target once `delay` has elapsed.
    Step {
        #[cfg_attr(feature = "serde", serde(with = "secs"))]
        delay: Duration,
    },
    /// Whatever the rendering layer uses when nothing is specified.
    Default,
}

/// One entry of a pose's transition list.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PropertyTransition {
    pub property: AnimatedProperty,
    pub transition: Transition,
}

impl PropertyTransition {
    #[must_use]
    pub const fn new(property: AnimatedProperty, transition: Transition) -> Self {
        Self {
            property,
            transition,
        }
    }
}

#[cfg(feature = "serde")]
mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Pose
// ---------------------------------------------------------------------------

/// Visual target for one card, plus how to get there.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pose {
    pub opacity: f64,
    pub scale: f64,
    /// Vertical offset.
    pub y: f64,
    /// Rotation in degrees.
    pub rotation: f64,
    /// Horizontal offset.
    pub x: f64,
    pub z_index: i32,
    pub perspective: f64,
    /// Ordered per-property transitions. Unlisted properties use
    /// [`Transition::Default`].
    pub transitions: Vec<PropertyTransition>,
}

impl Pose {
    const EXIT_OPACITY: f64 = 0.0;
    const EXIT_SCALE: f64 = 0.5;
    const EXIT_Y: f64 = 50.0;

    /// Exit pose for a card currently at `from`.
    ///
    /// Only opacity, scale, and y are part of the exit; the other properties
    /// stay where they are. No transitions are listed.
    #[must_use]
    pub fn exit_from(from: &Pose) -> Pose {
        Pose {
            opacity: Self::EXIT_OPACITY,
            scale: Self::EXIT_SCALE,
            y: Self::EXIT_Y,
            transitions: Vec::new(),
            ..from.clone()
        }
    }

    /// Whether this pose matches the exit values.
    #[must_use]
    pub fn is_exit(&self) -> bool {
        self.opacity == Self::EXIT_OPACITY
            && self.scale == Self::EXIT_SCALE
            && self.y == Self::EXIT_Y
    }

    /// Transition configured for `property`.
    #[must_use]
    pub fn transition_for(&self, property: AnimatedProperty) -> Transition {
        self.transitions
            .iter()
            .find(|t| t.property == property)
            .map_or(Transition::Default, |t| t.transition)
    }

    /// Value of a numeric property (z-order as `f64`).
    #[must_use]
    pub fn value(&self, property: AnimatedProperty) -> f64 {
        match property {
            AnimatedProperty::Opacity => self.opacity,
            AnimatedProperty::Scale => self.scale,
            AnimatedProperty::Y => self.y,
            AnimatedProperty::Rotation => self.rotation,
            AnimatedProperty::X => self.x,
            AnimatedProperty::ZIndex => f64::from(self.z_index),
        }
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
struct PoseRow {
    opacity: f64,
    scale: f64,
    y: f64,
    rotation: f64,
    x: f64,
    z_index: i32,
}

const fn row(opacity: f64, scale: f64, y: f64, rotation: f64, x: f64, z_index: i32) -> PoseRow {
    PoseRow {
        opacity,
        scale,
        y,
        rotation,
        x,
        z_index,
    }
}

const PRIMARY_ROWS: [PoseRow; 4] = [
    row(1.0, 1.0, 0.0, 0.0, 0.0, 4),
    row(1.0, 0.9, -12.0, 2.0, 32.0, 3),
    row(1.0, 0.85, 0.0, 4.0, 48.0, 2),
    row(1.0, 0.8, 12.0, 7.0, 62.0, 1),
];

const BEFORE_AFTER_ROWS: [PoseRow; 2] = [
    row(1.0, 1.0, 0.0, 0.0, 0.0, 4),
    row(1.0, 0.9, -12.0, 2.0, 32.0, 3),
];

/// Which per-position table a stack uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PoseTable {
    /// Four-card swipe stack.
    #[default]
    Primary,
    /// Two-card before/after stack.
    BeforeAfter,
}

impl PoseTable {
    fn rows(self) -> &'static [PoseRow] {
        match self {
            Self::Primary => &PRIMARY_ROWS,
            Self::BeforeAfter => &BEFORE_AFTER_ROWS,
        }
    }

    /// Number of rows the table defines.
    #[must_use]
    pub fn defined_rows(self) -> usize {
        self.rows().len()
    }

    /// Row for `position`, falling back to the last row past the end.
    fn row(self, position: usize) -> PoseRow {
        let rows = self.rows();
        rows[position.min(rows.len() - 1)]
    }
}

// ---------------------------------------------------------------------------
// SlotPosition
// ---------------------------------------------------------------------------

/// A validated slot index within a stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotPosition(usize);

impl SlotPosition {
    /// Validate a position arriving as a plain number from a host boundary.
    ///
    /// Negative, non-integer, non-finite, or `>= len` values fail with
    /// [`StackError::InvalidPosition`].
    pub fn from_f64(position: f64, len: usize) -> Result<Self> {
        let valid = position.is_finite()
            && position >= 0.0
            && position.fract() == 0.0
            && position < len as f64;
        if valid {
            Ok(Self(position as usize))
        } else {
            Err(StackError::InvalidPosition { position, len })
        }
    }

    /// Validate an index against a stack of `len` slots.
    pub fn new(position: usize, len: usize) -> Result<Self> {
        if position < len {
            Ok(Self(position))
        } else {
            Err(StackError::InvalidPosition {
                position: position as f64,
                len,
            })
        }
    }

    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }

    #[inline]
    #[must_use]
    pub fn is_front(self) -> bool {
        self.0 == 0
    }
}

// ---------------------------------------------------------------------------
// PoseMapper
// ---------------------------------------------------------------------------

/// Pure mapping from slot position to [`Pose`] for a stack of `len` slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoseMapper {
    table: PoseTable,
    len: usize,
}

impl PoseMapper {
    /// Mapper over `table` for a stack of `len` slots.
    ///
    /// `len` may exceed the table's rows; extra positions reuse the last row.
    pub fn new(table: PoseTable, len: usize) -> Result<Self> {
        if len == 0 {
            return Err(StackError::config("pose mapper needs at least one slot"));
        }
        if len > table.defined_rows() {
            tracing::debug!(
                ?table,
                len,
                rows = table.defined_rows(),
                "stack deeper than pose table, back slots share the last row"
            );
        }
        Ok(Self { table, len })
    }

    #[must_use]
    pub fn table(&self) -> PoseTable {
        self.table
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Target pose for `position`.
    ///
    /// Fails with [`StackError::InvalidPosition`] outside `[0, len)`.
    pub fn pose_for(&self, position: usize, params: &MotionParams) -> Result<Pose> {
        let slot = SlotPosition::new(position, self.len)?;
        Ok(self.build(slot, params))
    }

    /// Target pose for a validated slot.
    #[must_use]
    pub fn pose_at(&self, slot: SlotPosition, params: &MotionParams) -> Pose {
        self.build(SlotPosition(slot.0.min(self.len - 1)), params)
    }

    /// Render-path variant of [`pose_for`](Self::pose_for): out-of-range
    /// positions clamp to the back slot and log a warning instead of failing.
    #[must_use]
    pub fn pose_for_clamped(&self, position: usize, params: &MotionParams) -> Pose {
        let last = self.len - 1;
        if position > last {
            tracing::warn!(position, len = self.len, "slot position out of range, clamping");
        }
        self.build(SlotPosition(position.min(last)), params)
    }

    /// Poses for every slot, front to back.
    #[must_use]
    pub fn poses(&self, params: &MotionParams) -> Vec<Pose> {
        (0..self.len)
            .map(|i| self.build(SlotPosition(i), params))
            .collect()
    }

    fn build(&self, slot: SlotPosition, params: &MotionParams) -> Pose {
        let r = self.table.row(slot.0);
        Pose {
            opacity: r.opacity,
            scale: r.scale,
            y: r.y,
            rotation: r.rotation,
            x: r.x,
            z_index: r.z_index,
            perspective: PERSPECTIVE,
            transitions: visible_transitions(params),
        }
    }
}

fn visible_transitions(params: &MotionParams) -> Vec<PropertyTransition> {
    use AnimatedProperty::{Scale, X, Y, ZIndex};
    let spring = Transition::Spring(params.spring());
    vec![
        PropertyTransition::new(
            ZIndex,
            Transition::Step {
                delay: params.z_index_delay(),
            },
        ),
        PropertyTransition::new(Scale, spring),
        PropertyTransition::new(Y, spring),
        PropertyTransition::new(X, Transition::Spring(params.horizontal_spring())),
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::MotionKnob;

    fn primary() -> PoseMapper {
        PoseMapper::new(PoseTable::Primary, 4).unwrap()
    }

    fn assert_geometry(p: &Pose, scale: f64, y: f64, rotation: f64, x: f64, z: i32) {
        assert_eq!(p.opacity, 1.0);
        assert_eq!(p.scale, scale);
        assert_eq!(p.y, y);
        assert_eq!(p.rotation, rotation);
        assert_eq!(p.x, x);
        assert_eq!(p.z_index, z);
        assert_eq!(p.perspective, PERSPECTIVE);
    }

    #[test]
    fn primary_table_rows() {
        let params = MotionParams::with_defaults();
        let m = primary();
        assert_geometry(&m.pose_for(0, &params).unwrap(), 1.0, 0.0, 0.0, 0.0, 4);
        assert_geometry(&m.pose_for(1, &params).unwrap(), 0.9, -12.0, 2.0, 32.0, 3);
        assert_geometry(&m.pose_for(2, &params).unwrap(), 0.85, 0.0, 4.0, 48.0, 2);
        assert_geometry(&m.pose_for(3, &params).unwrap(), 0.8, 12.0, 7.0, 62.0, 1);
    }

    #[test]
    fn before_after_table_rows() {
        let params = MotionParams::with_defaults();
        let m = PoseMapper::new(PoseTable::BeforeAfter, 2).unwrap();
        assert_geometry(&m.pose_for(0, &params).unwrap(), 1.0, 0.0, 0.0, 0.0, 4);
        assert_geometry(&m.pose_for(1, &params).unwrap(), 0.9, -12.0, 2.0, 32.0, 3);
    }

    #[test]
    fn positions_past_table_reuse_last_row() {
        let params = MotionParams::with_defaults();
        let m = PoseMapper::new(PoseTable::BeforeAfter, 5).unwrap();
        for pos in 1..5 {
            assert_geometry(&m.pose_for(pos, &params).unwrap(), 0.9, -12.0, 2.0, 32.0, 3);
        }
        let m = PoseMapper::new(PoseTable::Primary, 6).unwrap();
        assert_geometry(&m.pose_for(5, &params).unwrap(), 0.8, 12.0, 7.0, 62.0, 1);
    }

    #[test]
    #[tracing_test::traced_test]
    fn deeper_stack_than_table_is_reported() {
        assert_eq!(PoseTable::BeforeAfter.defined_rows(), 2);
        PoseMapper::new(PoseTable::BeforeAfter, 2).unwrap();
        assert!(!logs_contain("back slots share the last row"));
        PoseMapper::new(PoseTable::BeforeAfter, 3).unwrap();
        assert!(logs_contain("back slots share the last row"));
    }

    #[test]
    fn out_of_range_position_is_an_error() {
        let params = MotionParams::with_defaults();
        let err = primary().pose_for(4, &params).unwrap_err();
        assert_eq!(
            err,
            StackError::InvalidPosition {
                position: 4.0,
                len: 4
            }
        );
    }

    #[test]
    #[tracing_test::traced_test]
    fn clamped_lookup_uses_back_slot() {
        let params = MotionParams::with_defaults();
        let m = primary();
        assert_eq!(
            m.pose_for_clamped(17, &params),
            m.pose_for(3, &params).unwrap()
        );
        assert!(logs_contain("slot position out of range"));
    }

    #[test]
    #[tracing_test::traced_test]
    fn in_range_clamped_lookup_is_silent() {
        let params = MotionParams::with_defaults();
        let m = primary();
        assert_eq!(
            m.pose_for_clamped(2, &params),
            m.pose_for(2, &params).unwrap()
        );
        assert!(!logs_contain("slot position out of range"));
    }

    #[test]
    fn zero_len_mapper_is_invalid() {
        assert!(PoseMapper::new(PoseTable::Primary, 0).is_err());
    }

    #[test]
    fn slot_position_from_number() {
        assert_eq!(SlotPosition::from_f64(2.0, 4).unwrap().index(), 2);
        assert!(SlotPosition::from_f64(0.0, 4).unwrap().is_front());
        for bad in [-1.0, 1.5, 4.0, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(
                    SlotPosition::from_f64(bad, 4),
                    Err(StackError::InvalidPosition { .. })
                ),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn transitions_follow_motion_params() {
        let params = MotionParams::with_defaults()
            .with(MotionKnob::SpringDuration, 0.4)
            .with(MotionKnob::HorizontalSpringBounce, 0.2)
            .with(MotionKnob::ZIndexDelay, 0.1);
        let pose = primary().pose_for(1, &params).unwrap();

        assert_eq!(
            pose.transition_for(AnimatedProperty::Scale),
            Transition::Spring(SpringSpec::new(0.4, 0.3))
        );
        assert_eq!(
            pose.transition_for(AnimatedProperty::Y),
            Transition::Spring(SpringSpec::new(0.4, 0.3))
        );
        assert_eq!(
            pose.transition_for(AnimatedProperty::X),
            Transition::Spring(SpringSpec::new(0.5, 0.2))
        );
        assert_eq!(
            pose.transition_for(AnimatedProperty::ZIndex),
            Transition::Step {
                delay: Duration::from_millis(100)
            }
        );
        assert_eq!(
            pose.transition_for(AnimatedProperty::Opacity),
            Transition::Default
        );
        assert_eq!(
            pose.transition_for(AnimatedProperty::Rotation),
            Transition::Default
        );
    }

    #[test]
    fn transition_list_order_puts_z_first() {
        let pose = primary().pose_for(0, &MotionParams::with_defaults()).unwrap();
        let order: Vec<_> = pose.transitions.iter().map(|t| t.property).collect();
        assert_eq!(
            order,
            vec![
                AnimatedProperty::ZIndex,
                AnimatedProperty::Scale,
                AnimatedProperty::Y,
                AnimatedProperty::X
            ]
        );
    }

    #[test]
    fn exit_pose_keeps_horizontal_geometry() {
        let params = MotionParams::with_defaults();
        let from = primary().pose_for(2, &params).unwrap();
        let exit = Pose::exit_from(&from);
        assert_eq!(exit.opacity, 0.0);
        assert_eq!(exit.scale, 0.5);
        assert_eq!(exit.y, 50.0);
        assert_eq!(exit.x, from.x);
        assert_eq!(exit.rotation, from.rotation);
        assert!(exit.transitions.is_empty());
        assert!(exit.is_exit());
        assert!(!from.is_exit());
    }

    #[test]
    fn recompute_is_idempotent() {
        let params = MotionParams::with_defaults();
        let m = primary();
        assert_eq!(m.poses(&params), m.poses(&params));
    }
}
