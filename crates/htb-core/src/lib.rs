//! Core of the Telegram inference relay.
//!
//! Framework-agnostic: Telegram and the inference HTTP endpoint live behind
//! ports (traits) implemented in adapter crates.

pub mod config;
pub mod domain;
pub mod errors;
pub mod inference;
pub mod logging;
pub mod messaging;
pub mod relay;

pub use errors::{Error, Result};
