#![forbid(unsafe_code)]

//! Frame-driven animation of stack poses.
//!
//! The controller emits target [`Pose`]s; this module moves each card toward
//! its target one tick at a time using the springs and tweens from
//! [`cardstack_core::animation`].
//!
//! # Transition resolution
//!
//! | transition | behaviour |
//! |---|---|
//! | `Spring(spec)` | spring tuned by duration/bounce |
//! | `Step { delay }` | value jumps after `delay` (z-order) |
//! | `Default`, opacity | 0.3s ease-out tween |
//! | `Default`, transforms | spring, stiffness 500, damping 25 |
//!
//! A property is only retargeted when its target value changes. Motion
//! already in flight keeps the tuning it started with.
//!
//! The drag offset is animated separately from the slot `x`. While dragging
//! it follows the pointer exactly; on release it springs back to zero with
//! stiffness 200 and damping 40.

use std::collections::BTreeMap;
use std::time::Duration;

use cardstack_core::animation::{Animation, Spring, Tween, ease_out};
use cardstack_core::controller::{SlotPose, StackUpdate};
use cardstack_core::pose::{AnimatedProperty, Transition};
use cardstack_core::{ItemId, Pose};
use serde::Serialize;

const DEFAULT_TWEEN: Duration = Duration::from_millis(300);
const DEFAULT_STIFFNESS: f64 = 500.0;
const DEFAULT_DAMPING: f64 = 25.0;
const SNAP_BACK_STIFFNESS: f64 = 200.0;
const SNAP_BACK_DAMPING: f64 = 40.0;

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

/// One animated scalar.
#[derive(Debug, Clone)]
enum Channel {
    Still(f64),
    Spring(Spring),
    Tween(Tween),
}

impl Channel {
    fn value(&self) -> f64 {
        match self {
            Self::Still(v) => *v,
            Self::Spring(s) => s.position(),
            Self::Tween(t) => t.position(),
        }
    }

    fn velocity(&self) -> f64 {
        match self {
            Self::Spring(s) => s.velocity(),
            Self::Still(_) | Self::Tween(_) => 0.0,
        }
    }

    fn target(&self) -> f64 {
        match self {
            Self::Still(v) => *v,
            Self::Spring(s) => s.target(),
            Self::Tween(t) => t.target(),
        }
    }

    fn is_settled(&self) -> bool {
        match self {
            Self::Still(_) => true,
            Self::Spring(s) => s.is_at_rest(),
            Self::Tween(t) => t.is_complete(),
        }
    }

    fn tick(&mut self, dt: Duration) {
        match self {
            Self::Still(_) => {}
            Self::Spring(s) => s.tick(dt),
            Self::Tween(t) => t.tick(dt),
        }
        if self.is_settled() {
            *self = Self::Still(self.target());
        }
    }

    /// Aim at `target` unless already heading there.
    fn retarget(&mut self, target: f64, property: AnimatedProperty, transition: Transition) {
        if self.target() == target {
            return;
        }
        let from = self.value();
        let velocity = self.velocity();
        *self = match transition {
            Transition::Spring(spec) => {
                let mut spring = Spring::from_spec(from, target, spec);
                spring.impulse(velocity);
                Self::Spring(spring)
            }
            Transition::Default if property == AnimatedProperty::Opacity => {
                Self::Tween(Tween::new(from, target, DEFAULT_TWEEN).easing(ease_out))
            }
            Transition::Default | Transition::Step { .. } => {
                let mut spring = Spring::new(from, target)
                    .with_stiffness(DEFAULT_STIFFNESS)
                    .with_damping(DEFAULT_DAMPING);
                spring.impulse(velocity);
                Self::Spring(spring)
            }
        };
    }
}

// ---------------------------------------------------------------------------
// Z-order
// ---------------------------------------------------------------------------

/// Stacking order with an optional deferred change.
#[derive(Debug, Clone, Copy)]
struct ZOrder {
    current: i32,
    pending: Option<(i32, Duration)>,
}

impl ZOrder {
    fn new(z: i32) -> Self {
        Self {
            current: z,
            pending: None,
        }
    }

    fn target(&self) -> i32 {
        self.pending.map_or(self.current, |(z, _)| z)
    }

    fn retarget(&mut self, z: i32, transition: Transition) {
        if self.target() == z {
            return;
        }
        match transition {
            Transition::Step { delay } if !delay.is_zero() => self.pending = Some((z, delay)),
            _ => {
                self.current = z;
                self.pending = None;
            }
        }
    }

    fn tick(&mut self, dt: Duration) {
        if let Some((z, remaining)) = self.pending {
            if dt >= remaining {
                self.current = z;
                self.pending = None;
            } else {
                self.pending = Some((z, remaining - dt));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// CardAnimator
// ---------------------------------------------------------------------------

/// Rendered state of one card at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CardFrame {
    pub id: ItemId,
    pub opacity: f64,
    pub scale: f64,
    pub y: f64,
    pub rotation: f64,
    /// Slot offset plus drag offset.
    pub x: f64,
    pub z_index: i32,
    pub perspective: f64,
    /// Whether the card is on its way out of the stack.
    pub leaving: bool,
}

/// Animated state of one card.
#[derive(Debug, Clone)]
pub struct CardAnimator {
    id: ItemId,
    opacity: Channel,
    scale: Channel,
    y: Channel,
    rotation: Channel,
    x: Channel,
    z: ZOrder,
    drag: Channel,
    perspective: f64,
    target: Pose,
    leaving: bool,
}

impl CardAnimator {
    /// Card resting at `pose`.
    #[must_use]
    pub fn at_rest(id: ItemId, pose: &Pose) -> Self {
        Self {
            id,
            opacity: Channel::Still(pose.opacity),
            scale: Channel::Still(pose.scale),
            y: Channel::Still(pose.y),
            rotation: Channel::Still(pose.rotation),
            x: Channel::Still(pose.x),
            z: ZOrder::new(pose.z_index),
            drag: Channel::Still(0.0),
            perspective: pose.perspective,
            target: pose.clone(),
            leaving: false,
        }
    }

    /// Card entering from the exit pose toward `pose`.
    #[must_use]
    pub fn entering(id: ItemId, pose: &Pose) -> Self {
        let mut card = Self::at_rest(id, &Pose::exit_from(pose));
        card.retarget(pose);
        card
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Pose the card is heading toward.
    #[inline]
    #[must_use]
    pub fn target(&self) -> &Pose {
        &self.target
    }

    #[inline]
    #[must_use]
    pub fn is_leaving(&self) -> bool {
        self.leaving
    }

    /// Head toward `pose` using its transitions.
    pub fn retarget(&mut self, pose: &Pose) {
        use AnimatedProperty::{Opacity, Rotation, Scale, X, Y, ZIndex};
        for (property, channel) in [
            (Opacity, &mut self.opacity),
            (Scale, &mut self.scale),
            (Y, &mut self.y),
            (Rotation, &mut self.rotation),
            (X, &mut self.x),
        ] {
            channel.retarget(pose.value(property), property, pose.transition_for(property));
        }
        self.z.retarget(pose.z_index, pose.transition_for(ZIndex));
        self.perspective = pose.perspective;
        self.target = pose.clone();
        self.leaving = false;
    }

    /// Animate out of the stack.
    pub fn exit(&mut self) {
        let exit = Pose::exit_from(&self.target);
        self.retarget(&exit);
        self.leaving = true;
    }

    /// Follow the pointer: the drag offset jumps to `offset`.
    pub fn drag_to(&mut self, offset: f64) {
        self.drag = Channel::Still(offset);
    }

    /// Spring the drag offset from `from` back to zero.
    pub fn snap_back(&mut self, from: f64) {
        self.drag = Channel::Spring(
            Spring::new(from, 0.0)
                .with_stiffness(SNAP_BACK_STIFFNESS)
                .with_damping(SNAP_BACK_DAMPING),
        );
    }

    /// Current drag offset.
    #[must_use]
    pub fn drag_offset(&self) -> f64 {
        self.drag.value()
    }

    /// Whether the drag offset has come to rest.
    #[must_use]
    pub fn drag_settled(&self) -> bool {
        self.drag.is_settled()
    }

    pub fn tick(&mut self, dt: Duration) {
        for channel in [
            &mut self.opacity,
            &mut self.scale,
            &mut self.y,
            &mut self.rotation,
            &mut self.x,
            &mut self.drag,
        ] {
            channel.tick(dt);
        }
        self.z.tick(dt);
    }

    /// Every property, z-order included, at its target.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.z.pending.is_none()
            && [
                &self.opacity,
                &self.scale,
                &self.y,
                &self.rotation,
                &self.x,
                &self.drag,
            ]
            .iter()
            .all(|c| c.is_settled())
    }

    #[must_use]
    pub fn frame(&self) -> CardFrame {
        CardFrame {
            id: self.id,
            opacity: self.opacity.value(),
            scale: self.scale.value(),
            y: self.y.value(),
            rotation: self.rotation.value(),
            x: self.x.value() + self.drag.value(),
            z_index: self.z.current,
            perspective: self.perspective,
            leaving: self.leaving,
        }
    }
}

// ---------------------------------------------------------------------------
// StackAnimator
// ---------------------------------------------------------------------------

/// Snapshot of every card at one instant, back to front.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    /// Time since the animator was created.
    #[serde(serialize_with = "as_secs")]
    pub elapsed: Duration,
    pub cards: Vec<CardFrame>,
}

impl Frame {
    /// Frame of `id`, if it is on screen.
    #[must_use]
    pub fn card(&self, id: ItemId) -> Option<&CardFrame> {
        self.cards.iter().find(|c| c.id == id)
    }

    /// Topmost card.
    #[must_use]
    pub fn top(&self) -> Option<&CardFrame> {
        self.cards.last()
    }
}

fn as_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

/// Animated state of a whole stack.
#[derive(Debug, Clone, Default)]
pub struct StackAnimator {
    cards: BTreeMap<ItemId, CardAnimator>,
    elapsed: Duration,
}

impl StackAnimator {
    /// Cards resting at `poses`.
    #[must_use]
    pub fn at_rest(poses: &[SlotPose]) -> Self {
        Self {
            cards: poses
                .iter()
                .map(|slot| (slot.item, CardAnimator::at_rest(slot.item, &slot.pose)))
                .collect(),
            elapsed: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn card(&self, id: ItemId) -> Option<&CardAnimator> {
        self.cards.get(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Apply a controller update. Ignored updates are no-ops.
    pub fn apply(&mut self, update: &StackUpdate) {
        if update.is_ignored() {
            return;
        }
        for slot in &update.poses {
            match self.cards.get_mut(&slot.item) {
                Some(card) => card.retarget(&slot.pose),
                None => {
                    self.cards
                        .insert(slot.item, CardAnimator::entering(slot.item, &slot.pose));
                }
            }
        }
        if let (Some(offset), Some(front)) = (update.drag_offset, update.binding.first()) {
            if let Some(card) = self.cards.get_mut(front) {
                card.drag_to(offset);
            }
        }
        if let Some(snap) = update.snap_back {
            if let Some(card) = self.cards.get_mut(&snap.card) {
                card.snap_back(snap.from_offset);
            }
        }
    }

    /// Swap the whole card set: cards not in `poses` exit, new ones enter.
    pub fn replace(&mut self, poses: &[SlotPose]) {
        for card in self.cards.values_mut() {
            if !poses.iter().any(|slot| slot.item == card.id) {
                card.exit();
            }
        }
        for slot in poses {
            match self.cards.get_mut(&slot.item) {
                Some(card) => card.retarget(&slot.pose),
                None => {
                    self.cards
                        .insert(slot.item, CardAnimator::entering(slot.item, &slot.pose));
                }
            }
        }
        tracing::debug!(entering = poses.len(), "card set replaced");
    }

    /// Advance every card by `dt`. Cards that finished leaving are dropped.
    pub fn tick(&mut self, dt: Duration) {
        self.elapsed += dt;
        for card in self.cards.values_mut() {
            card.tick(dt);
        }
        self.cards
            .retain(|_, card| !(card.is_leaving() && card.is_settled()));
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.cards.values().all(CardAnimator::is_settled)
    }

    /// Whether the drag offset of `id` is at rest (true for unknown cards).
    #[must_use]
    pub fn drag_settled(&self, id: ItemId) -> bool {
        self.cards.get(&id).is_none_or(CardAnimator::drag_settled)
    }

    /// Snapshot, painted back to front.
    #[must_use]
    pub fn frame(&self) -> Frame {
        let mut cards: Vec<CardFrame> = self.cards.values().map(CardAnimator::frame).collect();
        cards.sort_by_key(|c| c.z_index);
        Frame {
            elapsed: self.elapsed,
            cards,
        }
    }
}
