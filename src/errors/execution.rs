// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for task execution and the scheduler that runs tasks.

use std::time::Duration;
use thiserror::Error;

/// Terminal error of a failed task.
#[derive(Debug, Clone, Error)]
pub enum TaskError {
    /// The per-task deadline expired while a stage was running.
    #[error("task '{name}' timed out after {timeout:?} (deadline exceeded)")]
    Timeout { name: String, timeout: Duration },

    /// The parent context was cancelled.
    #[error("task '{name}' cancelled")]
    Cancelled { name: String },

    /// A stage returned an error.
    #[error("stage {stage} of task '{name}' failed: {reason}")]
    Stage {
        name: String,
        stage: usize,
        reason: String,
    },

    /// A stage panicked; the panic was recovered by the worker.
    #[error("stage {stage} of task '{name}' panicked: {reason}")]
    Panic {
        name: String,
        stage: usize,
        reason: String,
    },
}

impl TaskError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, TaskError::Timeout { .. })
    }
}

/// Errors raised by the scheduler itself rather than by user stages.
#[derive(Debug, Clone, Error)]
pub enum SchedulerError {
    /// The scheduler has been closed and no longer accepts tasks.
    #[error("scheduler is closed")]
    Closed,

    /// `serve` was called twice on the same scheduler.
    #[error("scheduler is already serving")]
    AlreadyServing,

    /// Publication was abandoned because the task's parent context was cancelled.
    #[error("publication of task '{0}' cancelled")]
    PublishCancelled(String),

    /// A worker pipeline panicked outside of stage execution.
    #[error("worker pipeline {pipeline} panicked: {reason}")]
    WorkerPanic { pipeline: usize, reason: String },

    /// The serve loop itself panicked.
    #[error("scheduler serve loop panicked: {0}")]
    ServePanic(String),
}
