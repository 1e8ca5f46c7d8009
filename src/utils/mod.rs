//! Utility functions and helpers for the fintrack client.
//!
//! # Submodules
//!
//! - `logging`: Tracing initialization and credential redaction.
//! - `currency`: NGN-based currency conversion and amount formatting.
//!
//! Author: kelexine (<https://github.com/kelexine>)

pub mod currency;
pub mod logging;
