// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for controller decisions.
//!
//! This module contains message types for logging events related to:
//! * Pipeline growth requested by the TPS governor
//! * The TPS limit being reached
//! * Race outcomes

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// The governor asked its scheduler for more pipelines.
///
/// # Log Level
/// `debug!` - Emitted at most once per tick
///
/// # Example
/// ```
/// use the_switchyard::observability::messages::controller::ParallelRequested;
///
/// let msg = ParallelRequested { added: 1, parallel: 3, tps: 12.0, tps_max: 14.0, backlog: 40 };
/// assert!(msg.to_string().starts_with("Requesting 1 more pipelines"));
/// ```
pub struct ParallelRequested {
    pub added: usize,
    pub parallel: usize,
    pub tps: f64,
    pub tps_max: f64,
    pub backlog: usize,
}

impl Display for ParallelRequested {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Requesting {} more pipelines (running {}, tps {:.1}, peak {:.1}, {} queued)",
            self.added, self.parallel, self.tps, self.tps_max, self.backlog
        )
    }
}

impl StructuredLog for ParallelRequested {
    fn log(&self) {
        tracing::debug!(
            added = self.added,
            parallel = self.parallel,
            tps = self.tps,
            tps_max = self.tps_max,
            backlog = self.backlog,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "tps_governor",
            span_name = name,
            parallel = self.parallel,
            tps_max = self.tps_max,
        )
    }
}

/// Peak throughput reached the configured limit; growth stops.
///
/// # Log Level
/// `info!` - Logged once per controller
pub struct TpsLimitReached {
    pub tps_max: f64,
    pub limit: f64,
}

impl Display for TpsLimitReached {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Peak throughput {:.1} tps reached the limit of {:.1}",
            self.tps_max, self.limit
        )
    }
}

impl StructuredLog for TpsLimitReached {
    fn log(&self) {
        tracing::info!(tps_max = self.tps_max, limit = self.limit, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "tps_limit",
            span_name = name,
            tps_max = self.tps_max,
            limit = self.limit,
        )
    }
}

/// A raced task was still unfinished at the deadline.
///
/// # Log Level
/// `warn!` - The task keeps running but is no longer awaited
pub struct RaceTaskTimedOut<'a> {
    pub id: u64,
    pub name: &'a str,
}

impl Display for RaceTaskTimedOut<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Task {} ({}) missed the race deadline", self.id, self.name)
    }
}

impl StructuredLog for RaceTaskTimedOut<'_> {
    fn log(&self) {
        tracing::warn!(task_id = self.id, task_name = self.name, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "race_timeout",
            span_name = name,
            task_id = self.id,
            task_name = self.name,
        )
    }
}

/// A race finished waiting.
///
/// # Log Level
/// `info!` - Important operational event
pub struct RaceFinished {
    pub done: usize,
    pub failed: usize,
    pub timeout: usize,
    pub elapsed: Duration,
}

impl Display for RaceFinished {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Race finished in {:?}: {} done, {} failed, {} timed out",
            self.elapsed, self.done, self.failed, self.timeout
        )
    }
}

impl StructuredLog for RaceFinished {
    fn log(&self) {
        tracing::info!(
            done = self.done,
            failed = self.failed,
            timeout = self.timeout,
            elapsed_ms = self.elapsed.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "race",
            span_name = name,
            done = self.done,
            failed = self.failed,
            timeout = self.timeout,
        )
    }
}
