// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{default_parallelism, DEFAULT_BACKLOG};
use serde::Deserialize;

/// Scheduler tuning.
///
/// # Fields
/// * `backlog` - Capacity of the task queue; `publish` waits while it is full
/// * `parallel` - Pipelines started by `serve` (at least one)
/// * `safety` - Recover panics in pipelines and the serve loop and report them
///   on the error channel instead of unwinding
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SchedulerOptions {
    pub backlog: usize,
    pub parallel: usize,
    pub safety: bool,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            backlog: DEFAULT_BACKLOG,
            parallel: default_parallelism(),
            safety: false,
        }
    }
}
