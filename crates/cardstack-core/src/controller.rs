#![forbid(unsafe_code)]

//! Stack controller: the gesture-driven state machine.
//!
//! [`StackController`] owns the slot binding and turns pointer input into
//! rotations and pose updates.
//!
//! # State Machine
//!
//! ```text
//!            down(0)            up
//!   Idle ─────────────▶ Dragging ───▶ Resolving ──commit──▶ Committing ──▶ Idle
//!    ▲                     │                    └─no commit─▶ Snapping ──settle──▶ Idle
//!    │                     └────────── cancel ────────────────▶ Snapping
//!    └──── tap(0) (tap interaction) ──▶ Committing ──▶ Idle
//! ```
//!
//! `Resolving` and `Committing` are momentary: they are entered and left
//! within one call and show up only in [`StackUpdate::trail`]. `Snapping`
//! lasts until the rendering layer reports the snap-back finished via
//! [`StackController::settle`].
//!
//! # Invariants
//!
//! 1. Only the card in slot 0 reacts to input; other slots are ignored.
//! 2. Within one release, classification precedes rotation, which precedes
//!    pose recomputation.
//! 3. A pointer-down while the same card is snapping back is ignored, so one
//!    card can never trigger two overlapping resolutions.
//! 4. The binding only changes through [`StackOrder::rotate`] (or an
//!    explicit [`StackController::reset`]).
//! 5. Recomputing poses in `Idle` with unchanged binding and parameters
//!    yields identical poses.
//!
//! # Failure Modes
//!
//! - A release carrying a non-finite sample snaps back without rotating.
//! - A stalled pointer leaves the controller in `Dragging` indefinitely.

use crate::classifier::{SwipeDecision, classify};
use crate::error::Result;
use crate::gesture::{DragTracker, GestureSample, PointerEvent};
use crate::item::{Item, ItemId};
use crate::motion::MotionParams;
use crate::ordering::StackOrder;
use crate::pose::{Pose, PoseMapper, PoseTable};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How the front card is operated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    /// Drag and release; the classifier decides.
    Swipe,
    /// Click/tap; every tap on the front card commits.
    Tap,
}

impl Interaction {
    /// Interaction a table is normally paired with.
    #[must_use]
    pub fn for_table(table: PoseTable) -> Self {
        match table {
            PoseTable::Primary => Self::Swipe,
            PoseTable::BeforeAfter => Self::Tap,
        }
    }
}

/// Controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackPhase {
    Idle,
    Dragging { card: ItemId },
    Resolving { card: ItemId },
    Committing { card: ItemId },
    Snapping { card: ItemId },
}

impl StackPhase {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Dragging { .. } => "dragging",
            Self::Resolving { .. } => "resolving",
            Self::Committing { .. } => "committing",
            Self::Snapping { .. } => "snapping",
        }
    }

    /// Card the phase concerns, if any.
    #[must_use]
    pub const fn card(self) -> Option<ItemId> {
        match self {
            Self::Idle => None,
            Self::Dragging { card }
            | Self::Resolving { card }
            | Self::Committing { card }
            | Self::Snapping { card } => Some(card),
        }
    }

    #[must_use]
    pub const fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// Why an input was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Input targeted a card other than the front one.
    NotFront,
    /// The front card is still resolving or snapping back.
    Debounced,
    /// A drag is already in progress.
    AlreadyDragging,
    /// Move/release/cancel without an active drag.
    NotDragging,
    /// `settle` without a snap-back in flight.
    NothingToSettle,
    /// Drag input on a tap stack, or a tap on a swipe stack.
    WrongInteraction,
}

/// What a controller call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    Ignored(IgnoreReason),
    DragStarted,
    DragMoved,
    /// The stack rotated by one.
    Committed,
    /// The dragged card is returning to its slot-0 pose.
    SnappingBack,
    /// Snap-back finished; back to idle.
    Settled,
    /// Binding restored to its initial order.
    Reset,
}

/// A dragged card returning to rest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapBack {
    pub card: ItemId,
    /// Visual offset the card was released at.
    pub from_offset: f64,
}

/// Target pose of the card in one slot.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotPose {
    pub position: usize,
    pub item: ItemId,
    pub pose: Pose,
}

/// Result of every controller call, consumed by the rendering layer.
#[derive(Debug, Clone, PartialEq)]
pub struct StackUpdate {
    pub kind: UpdateKind,
    /// Phase after the call.
    pub phase: StackPhase,
    /// Phases entered during the call, in order.
    pub trail: Vec<StackPhase>,
    /// Classifier verdict, for releases.
    pub decision: Option<SwipeDecision>,
    /// Binding after the call, slot 0 first.
    pub binding: Vec<ItemId>,
    /// Elastic visual offset of the front card while dragging.
    pub drag_offset: Option<f64>,
    pub snap_back: Option<SnapBack>,
    /// Target poses for every slot; empty when the input was ignored.
    pub poses: Vec<SlotPose>,
}

impl StackUpdate {
    #[must_use]
    pub fn is_ignored(&self) -> bool {
        matches!(self.kind, UpdateKind::Ignored(_))
    }

    #[must_use]
    pub fn committed(&self) -> bool {
        self.kind == UpdateKind::Committed
    }
}

// ---------------------------------------------------------------------------
// StackController
// ---------------------------------------------------------------------------

/// Gesture-driven card stack state machine.
#[derive(Debug, Clone)]
pub struct StackController {
    order: StackOrder,
    mapper: PoseMapper,
    params: MotionParams,
    interaction: Interaction,
    phase: StackPhase,
    drag: DragTracker,
}

impl StackController {
    /// Controller over `ids` (front first) using `table`.
    ///
    /// The interaction follows the table. Fails with
    /// [`StackError::InvalidConfiguration`](crate::error::StackError::InvalidConfiguration)
    /// for an empty or duplicated id list, or a malformed parameter set.
    pub fn new(
        ids: impl IntoIterator<Item = ItemId>,
        table: PoseTable,
        params: MotionParams,
    ) -> Result<Self> {
        let order = StackOrder::new(ids)?;
        let mapper = PoseMapper::new(table, order.len())?;
        let params = params.checked()?;
        for issue in params.validate() {
            tracing::warn!(%issue, "motion parameters outside documented range");
        }
        Ok(Self {
            order,
            mapper,
            params,
            interaction: Interaction::for_table(table),
            phase: StackPhase::Idle,
            drag: DragTracker::new(),
        })
    }

    /// Four-card swipe stack over `items`.
    pub fn primary(items: &[Item], params: MotionParams) -> Result<Self> {
        Self::new(items.iter().map(|i| i.id), PoseTable::Primary, params)
    }

    /// Two-card tap stack: `before` in front, `after` behind.
    pub fn before_after(before: ItemId, after: ItemId, params: MotionParams) -> Result<Self> {
        Self::new([before, after], PoseTable::BeforeAfter, params)
    }

    #[inline]
    #[must_use]
    pub fn phase(&self) -> StackPhase {
        self.phase
    }

    #[inline]
    #[must_use]
    pub fn order(&self) -> &StackOrder {
        &self.order
    }

    #[inline]
    #[must_use]
    pub fn binding(&self) -> &[ItemId] {
        self.order.slots()
    }

    #[inline]
    #[must_use]
    pub fn params(&self) -> &MotionParams {
        &self.params
    }

    #[inline]
    #[must_use]
    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    #[inline]
    #[must_use]
    pub fn mapper(&self) -> &PoseMapper {
        &self.mapper
    }

    /// Replace the motion parameters. Poses already emitted keep their
    /// transitions; the new values apply from the next update on.
    ///
    /// A malformed set is rejected like in [`new`](Self::new) and the
    /// current parameters stay in place.
    pub fn set_params(&mut self, params: MotionParams) -> Result<()> {
        let params = params.checked()?;
        for issue in params.validate() {
            tracing::warn!(%issue, "motion parameters outside documented range");
        }
        self.params = params;
        Ok(())
    }

    /// Target poses for every slot under the current binding.
    #[must_use]
    pub fn poses(&self) -> Vec<SlotPose> {
        self.mapper
            .poses(&self.params)
            .into_iter()
            .zip(self.order.iter())
            .map(|(pose, (position, item))| SlotPose {
                position,
                item,
                pose,
            })
            .collect()
    }

    /// Dispatch a pointer event.
    pub fn handle(&mut self, event: PointerEvent) -> StackUpdate {
        match event {
            PointerEvent::Down { position } => self.pointer_down(position),
            PointerEvent::Move(sample) => self.pointer_move(sample),
            PointerEvent::Up(sample) => self.pointer_up(sample),
            PointerEvent::Cancel => self.pointer_cancel(),
            PointerEvent::Tap { position } => self.tap(position),
        }
    }

    /// Pointer pressed on the card in slot `position`.
    pub fn pointer_down(&mut self, position: usize) -> StackUpdate {
        if self.interaction != Interaction::Swipe {
            return self.ignored(IgnoreReason::WrongInteraction);
        }
        if position != 0 {
            return self.ignored(IgnoreReason::NotFront);
        }
        let front = self.order.front();
        match self.phase {
            StackPhase::Idle => {
                self.drag.begin(None);
                self.phase = StackPhase::Dragging { card: front };
                tracing::debug!(card = %front, "drag started");
                self.update(UpdateKind::DragStarted, vec![self.phase], None)
            }
            StackPhase::Dragging { .. } => self.ignored(IgnoreReason::AlreadyDragging),
            StackPhase::Resolving { card }
            | StackPhase::Committing { card }
            | StackPhase::Snapping { card } => {
                if card == front {
                    tracing::debug!(
                        card = %card,
                        phase = self.phase.name(),
                        "pointer-down debounced"
                    );
                    self.ignored(IgnoreReason::Debounced)
                } else {
                    self.drag.begin(None);
                    self.phase = StackPhase::Dragging { card: front };
                    self.update(UpdateKind::DragStarted, vec![self.phase], None)
                }
            }
        }
    }

    /// Pointer moved while pressed.
    pub fn pointer_move(&mut self, sample: GestureSample) -> StackUpdate {
        if !matches!(self.phase, StackPhase::Dragging { .. }) {
            return self.ignored(IgnoreReason::NotDragging);
        }
        self.drag.update(sample);
        tracing::trace!(offset = sample.offset, velocity = sample.velocity, "drag sample");
        self.update(UpdateKind::DragMoved, Vec::new(), None)
    }

    /// Pointer released: classify, then rotate or snap back.
    pub fn pointer_up(&mut self, sample: GestureSample) -> StackUpdate {
        let StackPhase::Dragging { card } = self.phase else {
            return self.ignored(IgnoreReason::NotDragging);
        };
        self.drag.update(sample);
        let released_at = self.drag.visual_offset(self.params.drag_elastic);

        self.phase = StackPhase::Resolving { card };
        let mut trail = vec![self.phase];

        let decision = if sample.is_well_formed() {
            classify(
                sample.offset,
                sample.velocity,
                self.params.swipe_confidence_threshold,
            )
        } else {
            tracing::debug!(?sample, "malformed release sample, snapping back");
            SwipeDecision {
                commit: false,
                power: f64::NAN,
            }
        };
        tracing::debug!(
            card = %card,
            power = decision.power,
            threshold = self.params.swipe_confidence_threshold,
            commit = decision.commit,
            "drag resolved"
        );

        if decision.commit {
            let mut update = self.commit(card, &mut trail);
            update.decision = Some(decision);
            update.snap_back = Some(SnapBack {
                card,
                from_offset: released_at,
            });
            update
        } else {
            self.phase = StackPhase::Snapping { card };
            trail.push(self.phase);
            let mut update = self.update(UpdateKind::SnappingBack, trail, Some(decision));
            update.snap_back = Some(SnapBack {
                card,
                from_offset: released_at,
            });
            update
        }
    }

    /// The platform aborted the drag: snap back without classifying.
    pub fn pointer_cancel(&mut self) -> StackUpdate {
        let StackPhase::Dragging { card } = self.phase else {
            return self.ignored(IgnoreReason::NotDragging);
        };
        let released_at = self.drag.visual_offset(self.params.drag_elastic);
        self.phase = StackPhase::Snapping { card };
        tracing::debug!(card = %card, "drag cancelled");
        let mut update = self.update(UpdateKind::SnappingBack, vec![self.phase], None);
        update.snap_back = Some(SnapBack {
            card,
            from_offset: released_at,
        });
        update
    }

    /// Tap on the card in slot `position`. On a tap stack the front card
    /// commits unconditionally.
    pub fn tap(&mut self, position: usize) -> StackUpdate {
        if self.interaction != Interaction::Tap {
            return self.ignored(IgnoreReason::WrongInteraction);
        }
        if position != 0 {
            return self.ignored(IgnoreReason::NotFront);
        }
        if !self.phase.is_idle() {
            return self.ignored(IgnoreReason::Debounced);
        }
        let card = self.order.front();
        let mut trail = Vec::with_capacity(2);
        self.commit(card, &mut trail)
    }

    /// The rendering layer finished the snap-back animation.
    pub fn settle(&mut self) -> StackUpdate {
        let StackPhase::Snapping { card } = self.phase else {
            return self.ignored(IgnoreReason::NothingToSettle);
        };
        self.phase = StackPhase::Idle;
        tracing::debug!(card = %card, "snap-back settled");
        self.update(UpdateKind::Settled, vec![self.phase], None)
    }

    /// Restore the initial binding and drop any gesture in flight.
    pub fn reset(&mut self) -> StackUpdate {
        self.order.reset();
        self.drag.begin(None);
        self.phase = StackPhase::Idle;
        self.update(UpdateKind::Reset, vec![self.phase], None)
    }

    fn commit(&mut self, card: ItemId, trail: &mut Vec<StackPhase>) -> StackUpdate {
        self.phase = StackPhase::Committing { card };
        trail.push(self.phase);
        let binding = self.order.rotate();
        tracing::info!(card = %card, binding = ?binding, "stack rotated");
        self.phase = StackPhase::Idle;
        trail.push(self.phase);
        self.update(UpdateKind::Committed, std::mem::take(trail), None)
    }

    fn update(
        &self,
        kind: UpdateKind,
        trail: Vec<StackPhase>,
        decision: Option<SwipeDecision>,
    ) -> StackUpdate {
        let drag_offset = matches!(self.phase, StackPhase::Dragging { .. })
            .then(|| self.drag.visual_offset(self.params.drag_elastic));
        StackUpdate {
            kind,
            phase: self.phase,
            trail,
            decision,
            binding: self.order.slots().to_vec(),
            drag_offset,
            snap_back: None,
            poses: self.poses(),
        }
    }

    fn ignored(&self, reason: IgnoreReason) -> StackUpdate {
        tracing::trace!(?reason, phase = self.phase.name(), "input ignored");
        StackUpdate {
            kind: UpdateKind::Ignored(reason),
            phase: self.phase,
            trail: Vec::new(),
            decision: None,
            binding: self.order.slots().to_vec(),
            drag_offset: None,
            snap_back: None,
            poses: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
