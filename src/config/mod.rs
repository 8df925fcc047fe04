//! Configuration module.
//!
//! Provides configuration constants and CLI option types.

pub mod constants;
pub mod types;

pub use constants::*;
pub use types::{Config, LogFormat, LogLevel};
