//! Core domain + application logic for the profile-photo bot.
//!
//! This crate is intentionally framework-agnostic. Telegram and the liveness
//! HTTP server live in adapter crates; the chat platform sits behind the
//! ports (traits) in [`ports`] and [`messaging::port`].

pub mod config;
pub mod dispatcher;
pub mod domain;
pub mod errors;
pub mod fetcher;
pub mod logging;
pub mod messaging;
pub mod pending;
pub mod ports;
pub mod status;
pub mod transfer;
pub mod utils;

#[cfg(test)]
mod fakes;

pub use errors::{Error, ErrorKind, Result};
