// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for commanders.
//!
//! This module contains message types for logging events related to:
//! * Commander lifecycle
//! * Requests answered or failed on the way through the fabric

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A commander began accepting requests.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_switchyard::observability::messages::commander::CommanderStarted;
///
/// let msg = CommanderStarted { commander: "Bus:Cli", encoding: "json", tps_limit: 20.0 };
/// assert_eq!(msg.to_string(), "Commander 'Bus:Cli' accepting requests (encoding json, tps limit 20)");
/// ```
pub struct CommanderStarted<'a> {
    pub commander: &'a str,
    pub encoding: &'a str,
    pub tps_limit: f64,
}

impl Display for CommanderStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.tps_limit < 0.0 {
            write!(
                f,
                "Commander '{}' accepting requests (encoding {}, unthrottled)",
                self.commander, self.encoding
            )
        } else {
            write!(
                f,
                "Commander '{}' accepting requests (encoding {}, tps limit {})",
                self.commander, self.encoding, self.tps_limit
            )
        }
    }
}

impl StructuredLog for CommanderStarted<'_> {
    fn log(&self) {
        tracing::info!(
            commander = self.commander,
            encoding = self.encoding,
            tps_limit = self.tps_limit,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("commander", span_name = name, commander = self.commander)
    }
}

/// A request came back with a response.
///
/// # Log Level
/// `trace!` - Emitted for every request
pub struct RequestAnswered<'a> {
    pub id: u64,
    pub target: &'a str,
    pub coroutine: Option<&'a str>,
}

impl Display for RequestAnswered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.coroutine {
            Some(coroutine) => write!(
                f,
                "Request {} to {} answered, resuming {}",
                self.id, self.target, coroutine
            ),
            None => write!(f, "Request {} to {} answered", self.id, self.target),
        }
    }
}

impl StructuredLog for RequestAnswered<'_> {
    fn log(&self) {
        tracing::trace!(id = self.id, target = self.target, coroutine = self.coroutine, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!("request", span_name = name, id = self.id, target = self.target)
    }
}

/// A request could not be answered; the response carries the error.
///
/// # Log Level
/// `warn!` - The caller sees the failure
pub struct RequestFailed<'a> {
    pub id: u64,
    pub target: &'a str,
    pub error: &'a str,
}

impl Display for RequestFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Request {} to {} failed: {}", self.id, self.target, self.error)
    }
}

impl StructuredLog for RequestFailed<'_> {
    fn log(&self) {
        tracing::warn!(id = self.id, target = self.target, error = self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("request", span_name = name, id = self.id, target = self.target)
    }
}

/// A response had nowhere to go: its coroutine was gone or the response
/// channel was closed.
///
/// # Log Level
/// `error!` - The caller never hears back
///
/// # Example
/// ```
/// use the_switchyard::observability::messages::commander::ResponseUndeliverable;
///
/// let msg = ResponseUndeliverable { id: 9, error: "response channel closed" };
/// assert_eq!(msg.to_string(), "Response to request 9 undeliverable: response channel closed");
/// ```
pub struct ResponseUndeliverable<'a> {
    pub id: u64,
    pub error: &'a str,
}

impl Display for ResponseUndeliverable<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Response to request {} undeliverable: {}", self.id, self.error)
    }
}

impl StructuredLog for ResponseUndeliverable<'_> {
    fn log(&self) {
        tracing::error!(id = self.id, error = self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("response", span_name = name, id = self.id)
    }
}
