// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    DEFAULT_BACKLOG, DEFAULT_CHANNEL_BACKLOG, DEFAULT_PARALLEL_INCREASE,
    DEFAULT_PARALLEL_TICK_MS, UNLIMITED_TPS,
};
use crate::scheduler::SchedulerOptions;
use serde::Deserialize;
use std::time::Duration;

/// Tuning for a [`TpsController`](super::TpsController).
///
/// # Fields
/// * `safety` - Passed through to the controlled scheduler
/// * `parallel` - Pipelines at startup
/// * `parallel_tick_ms` - Sampling period of the throughput governor
/// * `parallel_increase` - Pipelines requested per tick while under the limit
/// * `tps_limit` - Completions per second to stay under; negative is unlimited
/// * `task_backlog` - Capacity of the scheduler's task queue
/// * `parallel_backlog` - Capacity of the channel carrying growth requests
/// * `report_backlog` - Capacity of the channel carrying task reports
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TpsOptions {
    pub safety: bool,
    pub parallel: usize,
    pub parallel_tick_ms: u64,
    pub parallel_increase: usize,
    pub tps_limit: f64,
    pub task_backlog: usize,
    pub parallel_backlog: usize,
    pub report_backlog: usize,
}

impl Default for TpsOptions {
    fn default() -> Self {
        Self {
            safety: true,
            parallel: 1,
            parallel_tick_ms: DEFAULT_PARALLEL_TICK_MS,
            parallel_increase: DEFAULT_PARALLEL_INCREASE,
            tps_limit: UNLIMITED_TPS,
            task_backlog: DEFAULT_BACKLOG,
            parallel_backlog: DEFAULT_CHANNEL_BACKLOG,
            report_backlog: DEFAULT_CHANNEL_BACKLOG,
        }
    }
}

impl TpsOptions {
    pub fn parallel_tick(&self) -> Duration {
        Duration::from_millis(self.parallel_tick_ms.max(1))
    }

    pub fn is_unlimited(&self) -> bool {
        self.tps_limit < 0.0
    }

    pub(crate) fn scheduler_options(&self) -> SchedulerOptions {
        SchedulerOptions {
            backlog: self.task_backlog,
            parallel: self.parallel,
            safety: self.safety,
        }
    }
}

/// Tuning for a [`RaceController`](super::RaceController).
#[derive(Debug, Clone, PartialEq)]
pub struct RaceOptions {
    pub scheduler: SchedulerOptions,
    /// Tasks still unfinished this long after `wait` starts count as timed out.
    pub deadline: Option<Duration>,
    pub report_backlog: usize,
}

impl Default for RaceOptions {
    fn default() -> Self {
        Self {
            scheduler: SchedulerOptions {
                safety: true,
                ..SchedulerOptions::default()
            },
            deadline: None,
            report_backlog: DEFAULT_CHANNEL_BACKLOG,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tps_defaults_are_unlimited() {
        let options = TpsOptions::default();
        assert!(options.is_unlimited());
        assert_eq!(options.parallel_tick(), Duration::from_millis(100));
        assert_eq!(options.scheduler_options().parallel, 1);
    }

    #[test]
    fn test_tps_options_from_yaml() {
        let yaml = "parallel: 2\nparallel_tick_ms: 250\ntps_limit: 20\n";
        let options: TpsOptions = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(options.parallel, 2);
        assert_eq!(options.tps_limit, 20.0);
        assert_eq!(options.parallel_increase, DEFAULT_PARALLEL_INCREASE);
        assert!(!options.is_unlimited());
    }

    #[test]
    fn test_zero_tick_is_clamped() {
        let options = TpsOptions {
            parallel_tick_ms: 0,
            ..TpsOptions::default()
        };
        assert_eq!(options.parallel_tick(), Duration::from_millis(1));
    }
}
