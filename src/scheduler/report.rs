// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::TaskState;
use crate::errors::TaskError;
use std::time::Duration;

/// Why a report was emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// The task entered `state`.
    StateSwitch,
    /// A non-final stage finished; `state` is still `Running`.
    Progress,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Durations {
    /// Since the task was built.
    pub task: Duration,
    /// Since the task entered its current state.
    pub state: Duration,
    /// Time spent in the stage that just ended, zero for pure state switches.
    pub stage: Duration,
}

/// An observation of a task, emitted on every state switch and stage advance.
///
/// For a task with `n` stages a successful run emits
/// `Pending, Running, Progress(1) .. Progress(n-1), Done(n)`.
#[derive(Debug, Clone)]
pub struct Report {
    pub id: u64,
    pub name: String,
    pub kind: ReportKind,
    pub state: TaskState,
    pub progress: usize,
    pub stages: usize,
    pub durations: Durations,
    pub error: Option<TaskError>,
}

impl Report {
    pub fn is_state_switch(&self) -> bool {
        self.kind == ReportKind::StateSwitch
    }

    pub fn is_finished(&self) -> bool {
        self.is_state_switch() && self.state.is_terminal()
    }
}
