#![forbid(unsafe_code)]

//! Error taxonomy for the stack model.
//!
//! Both variants are precondition violations. `InvalidConfiguration` is
//! fatal and only surfaces at construction time. `InvalidPosition` should
//! never happen on the render path, which clamps instead (see
//! [`PoseMapper::pose_for_clamped`](crate::pose::PoseMapper::pose_for_clamped)).

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StackError {
    #[error("invalid stack configuration: {reason}")]
    InvalidConfiguration { reason: String },
    #[error("invalid slot position {position} for a stack of {len}")]
    InvalidPosition { position: f64, len: usize },
}

impl StackError {
    pub(crate) fn config(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StackError>;
