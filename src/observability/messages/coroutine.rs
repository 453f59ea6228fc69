// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for coroutine lifecycle events.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A wrapped coroutine began running.
///
/// # Log Level
/// `trace!` - Emitted for every call
pub struct CoroutineStarted<'a> {
    pub id: &'a str,
}

impl Display for CoroutineStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Coroutine {} started", self.id)
    }
}

impl StructuredLog for CoroutineStarted<'_> {
    fn log(&self) {
        tracing::trace!(coroutine_id = self.id, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!("coroutine", span_name = name, coroutine_id = self.id)
    }
}

/// A coroutine body returned and was deregistered.
///
/// # Log Level
/// `trace!` on success, `warn!` when the body returned an error
///
/// # Example
/// ```
/// use the_switchyard::observability::messages::coroutine::CoroutineFinished;
///
/// let msg = CoroutineFinished { id: "coroutine-3", error: Some("peer went away") };
/// assert_eq!(msg.to_string(), "Coroutine coroutine-3 failed: peer went away");
/// ```
pub struct CoroutineFinished<'a> {
    pub id: &'a str,
    pub error: Option<&'a str>,
}

impl Display for CoroutineFinished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.error {
            Some(error) => write!(f, "Coroutine {} failed: {}", self.id, error),
            None => write!(f, "Coroutine {} finished", self.id),
        }
    }
}

impl StructuredLog for CoroutineFinished<'_> {
    fn log(&self) {
        match self.error {
            Some(error) => tracing::warn!(coroutine_id = self.id, error = error, "{}", self),
            None => tracing::trace!(coroutine_id = self.id, "{}", self),
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!(
            "coroutine_finished",
            span_name = name,
            coroutine_id = self.id,
            failed = self.error.is_some(),
        )
    }
}

/// A yield or resume handoff exceeded the coroutine timeout.
///
/// # Log Level
/// `warn!` - The coroutine is now dead
pub struct CoroutineTimedOut<'a> {
    pub id: &'a str,
    pub waiting: &'static str,
}

impl Display for CoroutineTimedOut<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Coroutine {} timed out in {}", self.id, self.waiting)
    }
}

impl StructuredLog for CoroutineTimedOut<'_> {
    fn log(&self) {
        tracing::warn!(coroutine_id = self.id, waiting = self.waiting, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "coroutine_timeout",
            span_name = name,
            coroutine_id = self.id,
            waiting = self.waiting,
        )
    }
}
