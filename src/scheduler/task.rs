// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::{Report, ReportKind, Scheduler};
use crate::context::Context;
use crate::errors::{SchedulerError, TaskError};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

/// Lifecycle of a task. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskState {
    Created,
    Pending,
    Running,
    Done,
    Failed,
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Done | TaskState::Failed)
    }
}

impl Display for TaskState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TaskState::Created => "created",
            TaskState::Pending => "pending",
            TaskState::Running => "running",
            TaskState::Done => "done",
            TaskState::Failed => "failed",
        };
        f.write_str(name)
    }
}

pub type StageFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

/// One unit of work. Runs at most once.
pub type Stage = Box<dyn FnOnce(TaskScope) -> StageFuture + Send>;

/// What a stage sees of its task while it runs.
#[derive(Debug, Clone)]
pub struct TaskScope {
    pub id: u64,
    pub name: String,
    pub stage: usize,
    pub context: Context,
    params: Arc<Mutex<HashMap<String, Value>>>,
}

impl TaskScope {
    pub async fn param(&self, key: &str) -> Option<Value> {
        self.params.lock().await.get(key).cloned()
    }

    /// Visible to every later stage of the same task.
    pub async fn set_param(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.params.lock().await.insert(key.into(), value.into());
    }
}

/// An ordered list of stages scheduled as one unit.
pub struct Task {
    pub(crate) id: u64,
    pub(crate) name: String,
    pub(crate) stages: Vec<Stage>,
    pub(crate) params: HashMap<String, Value>,
    pub(crate) parent: Context,
    pub(crate) timeout: Option<Duration>,
    pub(crate) state: TaskState,
    pub(crate) progress: usize,
    pub(crate) stage_count: usize,
    pub(crate) created_at: Instant,
    pub(crate) state_since: Instant,
}

impl Task {
    pub fn builder() -> TaskBuilder {
        TaskBuilder::default()
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    pub fn progress(&self) -> usize {
        self.progress
    }

    pub fn stage_count(&self) -> usize {
        self.stage_count
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Hand the task to `scheduler`; blocks while its queue is full.
    pub async fn publish(self, scheduler: &Scheduler) -> Result<u64, SchedulerError> {
        scheduler.publish(self).await
    }

    pub(crate) fn switch(&mut self, state: TaskState) {
        self.state = state;
        self.state_since = Instant::now();
    }

    pub(crate) fn report(&self, kind: ReportKind, stage: Duration, error: Option<TaskError>) -> Report {
        Report {
            id: self.id,
            name: self.name.clone(),
            kind,
            state: self.state,
            progress: self.progress,
            stages: self.stage_count,
            durations: super::Durations {
                task: self.created_at.elapsed(),
                state: self.state_since.elapsed(),
                stage,
            },
            error,
        }
    }

    pub(crate) fn scope(&self, stage: usize, context: Context, params: Arc<Mutex<HashMap<String, Value>>>) -> TaskScope {
        TaskScope {
            id: self.id,
            name: self.name.clone(),
            stage,
            context,
            params,
        }
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state)
            .field("progress", &self.progress)
            .field("stages", &self.stage_count)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Default)]
pub struct TaskBuilder {
    name: Option<String>,
    stages: Vec<Stage>,
    params: HashMap<String, Value>,
    parent: Option<Context>,
    timeout: Option<Duration>,
}

impl TaskBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn stage<F, Fut>(mut self, stage: F) -> Self
    where
        F: FnOnce(TaskScope) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.stages.push(Box::new(move |scope| Box::pin(stage(scope))));
        self
    }

    /// Copied into the task's own storage before the first stage runs.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn parent(mut self, context: Context) -> Self {
        self.parent = Some(context);
        self
    }

    /// Zero means unlimited.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }

    pub fn build(self) -> Task {
        let id = NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed);
        let now = Instant::now();
        let stage_count = self.stages.len();
        Task {
            id,
            name: self.name.unwrap_or_else(|| format!("task-{}", id)),
            stages: self.stages,
            params: self.params,
            parent: self.parent.unwrap_or_default(),
            timeout: self.timeout,
            state: TaskState::Created,
            progress: 0,
            stage_count,
            created_at: now,
            state_since: now,
        }
    }
}
