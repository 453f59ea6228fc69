// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for scheduler lifecycle and task outcomes.
//!
//! This module contains message types for logging events related to:
//! * Scheduler start and shutdown
//! * Pipeline growth
//! * Task publication, completion and failure
//! * Worker panics and their recovery

use crate::errors::TaskError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Scheduler began serving.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_switchyard::observability::messages::scheduler::SchedulerStarted;
///
/// let msg = SchedulerStarted { parallel: 4, backlog: 1024, safety: true };
/// assert!(msg.to_string().contains("4 pipelines"));
/// ```
pub struct SchedulerStarted {
    pub parallel: usize,
    pub backlog: usize,
    pub safety: bool,
}

impl Display for SchedulerStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Scheduler serving with {} pipelines, backlog={}, safety={}",
            self.parallel, self.backlog, self.safety
        )
    }
}

impl StructuredLog for SchedulerStarted {
    fn log(&self) {
        tracing::info!(
            parallel = self.parallel,
            backlog = self.backlog,
            safety = self.safety,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "scheduler",
            span_name = name,
            parallel = self.parallel,
            backlog = self.backlog,
            safety = self.safety,
        )
    }
}

/// Pipelines were added to a running scheduler.
///
/// # Log Level
/// `debug!` - Tuning detail
pub struct ParallelismIncreased {
    pub added: usize,
    pub parallel: usize,
}

impl Display for ParallelismIncreased {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Added {} pipelines, now running {}",
            self.added, self.parallel
        )
    }
}

impl StructuredLog for ParallelismIncreased {
    fn log(&self) {
        tracing::debug!(added = self.added, parallel = self.parallel, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "parallelism",
            span_name = name,
            added = self.added,
            parallel = self.parallel,
        )
    }
}

/// Scheduler stopped all of its pipelines.
///
/// # Log Level
/// `info!` - Important operational event
pub struct SchedulerClosed {
    pub parallel: usize,
}

impl Display for SchedulerClosed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Scheduler closed after stopping {} pipelines", self.parallel)
    }
}

impl StructuredLog for SchedulerClosed {
    fn log(&self) {
        tracing::info!(parallel = self.parallel, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("scheduler_closed", span_name = name, parallel = self.parallel)
    }
}

/// Task accepted into the backlog.
///
/// # Log Level
/// `trace!` - Emitted for every task
///
/// # Example
/// ```
/// use the_switchyard::observability::messages::scheduler::TaskPublished;
///
/// let msg = TaskPublished { id: 7, name: "resize-images" };
/// assert_eq!(msg.to_string(), "Task 7 (resize-images) published");
/// ```
pub struct TaskPublished<'a> {
    pub id: u64,
    pub name: &'a str,
}

impl Display for TaskPublished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Task {} ({}) published", self.id, self.name)
    }
}

impl StructuredLog for TaskPublished<'_> {
    fn log(&self) {
        tracing::trace!(task_id = self.id, task_name = self.name, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!(
            "task",
            span_name = name,
            task_id = self.id,
            task_name = self.name,
        )
    }
}

/// Task ran every stage.
///
/// # Log Level
/// `debug!` - Emitted for every task
pub struct TaskFinished<'a> {
    pub id: u64,
    pub name: &'a str,
    pub stages: usize,
    pub duration: Duration,
}

impl Display for TaskFinished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Task {} ({}) finished {} stages in {:?}",
            self.id, self.name, self.stages, self.duration
        )
    }
}

impl StructuredLog for TaskFinished<'_> {
    fn log(&self) {
        tracing::debug!(
            task_id = self.id,
            task_name = self.name,
            stages = self.stages,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "task_finished",
            span_name = name,
            task_id = self.id,
            task_name = self.name,
            stages = self.stages,
            duration = ?self.duration,
        )
    }
}

/// Task stopped before its last stage.
///
/// # Log Level
/// `warn!` - The task failed but the scheduler is healthy
pub struct TaskFailed<'a> {
    pub id: u64,
    pub name: &'a str,
    pub error: &'a TaskError,
}

impl Display for TaskFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Task {} ({}) failed: {}", self.id, self.name, self.error)
    }
}

impl StructuredLog for TaskFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            task_id = self.id,
            task_name = self.name,
            timeout = self.error.is_timeout(),
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "task_failed",
            span_name = name,
            task_id = self.id,
            task_name = self.name,
            error = %self.error,
        )
    }
}

/// A pipeline's worker panicked outside of any stage.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct WorkerPanicked<'a> {
    pub pipeline: usize,
    pub reason: &'a str,
    pub recovered: bool,
}

impl Display for WorkerPanicked<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.recovered {
            write!(f, "Pipeline {} panicked and was restarted: {}", self.pipeline, self.reason)
        } else {
            write!(f, "Pipeline {} panicked: {}", self.pipeline, self.reason)
        }
    }
}

impl StructuredLog for WorkerPanicked<'_> {
    fn log(&self) {
        tracing::error!(
            pipeline = self.pipeline,
            reason = self.reason,
            recovered = self.recovered,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "worker_panic",
            span_name = name,
            pipeline = self.pipeline,
            recovered = self.recovered,
        )
    }
}
