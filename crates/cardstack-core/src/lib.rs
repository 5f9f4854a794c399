#![forbid(unsafe_code)]

//! Core: stack rotation, swipe classification, and pose mapping.
//!
//! # Role in cardstack
//! `cardstack-core` is the deterministic model behind the swipeable card
//! stack. It owns the slot binding, decides whether a drag commits, and maps
//! every slot to a target [`Pose`](pose::Pose). It never renders anything;
//! poses are plain data consumed by whatever layer draws the cards.
//!
//! # Primary responsibilities
//! - **MotionParams**: spring, elasticity, threshold, and z-delay knobs.
//! - **classify**: fuses drag offset and velocity into a commit decision.
//! - **StackOrder**: the slot binding and its left rotation.
//! - **PoseMapper**: per-position visual targets and transition lists.
//! - **StackController**: the `Idle → Dragging → Resolving → …` state machine.
//!
//! # How it fits in the system
//! `cardstack-runtime` feeds pointer events into a [`StackController`]
//! and animates the resulting poses frame by frame with the springs in
//! [`animation`].
//!
//! [`StackController`]: controller::StackController

pub mod animation;
pub mod classifier;
pub mod controller;
pub mod error;
pub mod gesture;
pub mod item;
pub mod motion;
pub mod ordering;
pub mod pose;

pub use classifier::{SwipeDecision, classify, swipe_power};
pub use controller::{Interaction, StackController, StackPhase, StackUpdate};
pub use error::{Result, StackError};
pub use gesture::{GestureSample, PointerEvent};
pub use item::{Item, ItemId};
pub use motion::{MotionKnob, MotionParams, SpringSpec};
pub use ordering::StackOrder;
pub use pose::{Pose, PoseMapper, PoseTable, SlotPosition};
