// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for consistent human-readable
//! output and [`StructuredLog`] to emit itself at the right level with its
//! fields attached.
//!
//! # Organization
//!
//! * `scheduler` - scheduler and pipeline events
//! * `commander` - commander lifecycle and request outcomes
//! * `device` - device graph construction and message delivery
//! * `controller` - parallelism and race decisions
//! * `coroutine` - coroutine lifecycle events
//! * `config` - configuration loading and validation

use tracing::Span;

pub mod commander;
pub mod config;
pub mod controller;
pub mod coroutine;
pub mod device;
pub mod scheduler;

/// A message that knows its own log level and structured fields.
pub trait StructuredLog {
    /// Emit the message as a tracing event.
    fn log(&self);

    /// Open a span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}
