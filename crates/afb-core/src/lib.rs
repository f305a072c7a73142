//! Core domain + application logic for the AquaFrost Discord bot.
//!
//! This crate is intentionally framework-agnostic. Discord lives behind ports
//! (traits) implemented in the `afb-discord` adapter crate.

pub mod audit;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod errors;
pub mod fetch;
pub mod formatting;
pub mod logging;
pub mod messaging;
pub mod presence;
pub mod utils;
pub mod webhooks;

#[cfg(test)]
mod testing;

pub use errors::{Error, Result};
