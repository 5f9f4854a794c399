#![forbid(unsafe_code)]

//! Runtime: animation, sessions, and configuration for cardstack.
//!
//! # Key Components
//!
//! - [`StackAnimator`] - moves every card toward its target pose, frame by frame
//! - [`StackSession`] - swipe stack: controller, animator, and snap-back settling
//! - [`BeforeAfterSession`] - two-card before/after photo stack with tap to swap
//! - [`StackConfig`] - TOML/JSON configuration for motion knobs and card payloads
//!
//! # How it fits in the system
//! `cardstack-core` decides *what* each card should look like; this crate
//! decides *how it gets there* over time and produces [`Frame`] snapshots a
//! renderer can paint directly.

pub mod animator;
pub mod before_after;
pub mod config;
pub mod session;

pub use animator::{CardAnimator, CardFrame, Frame, StackAnimator};
pub use before_after::{BeforeAfterPhoto, BeforeAfterSession, Side};
pub use config::{ConfigError, StackConfig};
pub use session::StackSession;
