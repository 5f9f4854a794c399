#![forbid(unsafe_code)]

//! Headless driver for cardstack: replays gestures and prints the
//! resulting bindings, poses, and animation frames as JSON.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;

pub use cli::run_from_env;
pub use error::{DemoError, Result};
