// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::TpsOptions;
use crate::errors::SchedulerError;
use crate::observability::messages::controller::{ParallelRequested, TpsLimitReached};
use crate::observability::messages::StructuredLog;
use crate::scheduler::{Report, Scheduler, Task, TaskState};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Throughput bookkeeping fed by task reports and sampled once per tick.
#[derive(Debug)]
pub(crate) struct Governor {
    tick: Duration,
    states: HashMap<TaskState, usize>,
    finished: usize,
    window: VecDeque<usize>,
    window_len: usize,
    tps_max: f64,
    tick_tps: f64,
    tick_tps_max: f64,
    running_since: HashMap<u64, Instant>,
    abandoned: usize,
    run_total: Duration,
    run_count: u32,
    capped: bool,
}

impl Governor {
    pub(crate) fn new(tick: Duration) -> Self {
        // Throughput is averaged over at least one second of ticks.
        let per_second = Duration::from_secs(1).as_nanos() / tick.as_nanos().max(1);
        Self {
            tick,
            states: HashMap::new(),
            finished: 0,
            window: VecDeque::new(),
            window_len: (per_second as usize).max(1),
            tps_max: 0.0,
            tick_tps: 0.0,
            tick_tps_max: 0.0,
            running_since: HashMap::new(),
            abandoned: 0,
            run_total: Duration::ZERO,
            run_count: 0,
            capped: false,
        }
    }

    pub(crate) fn observe(&mut self, report: &Report, now: Instant) {
        if !report.is_state_switch() {
            return;
        }
        *self.states.entry(report.state).or_default() += 1;
        match report.state {
            TaskState::Running => {
                self.running_since.insert(report.id, now);
            }
            TaskState::Done | TaskState::Failed => {
                self.finished += 1;
                match self.running_since.remove(&report.id) {
                    Some(started) => {
                        self.run_total += now.saturating_duration_since(started);
                        self.run_count += 1;
                    }
                    None => self.abandoned += 1,
                }
            }
            _ => {}
        }
    }

    /// Close the current sampling period and return the measured TPS.
    ///
    /// The governing rate is averaged over the last second of ticks. The raw
    /// rate of this tick alone, `finished * second / tick`, is kept next to it
    /// as `tick_tps`.
    pub(crate) fn sample(&mut self) -> f64 {
        let finished = std::mem::take(&mut self.finished);
        self.tick_tps = finished as f64 / self.tick.as_secs_f64();
        self.tick_tps_max = self.tick_tps_max.max(self.tick_tps);

        self.window.push_back(finished);
        while self.window.len() > self.window_len {
            self.window.pop_front();
        }
        let finished: usize = self.window.iter().sum();
        let span = self.tick.as_secs_f64() * self.window.len() as f64;
        let tps = finished as f64 / span;
        self.tps_max = self.tps_max.max(tps);
        tps
    }

    pub(crate) fn state_count(&self, state: TaskState) -> usize {
        self.states.get(&state).copied().unwrap_or(0)
    }

    /// Tasks published but not yet picked up by a pipeline.
    pub(crate) fn backlog(&self) -> usize {
        self.state_count(TaskState::Pending)
            .saturating_sub(self.state_count(TaskState::Running))
            .saturating_sub(self.abandoned)
    }

    pub(crate) fn mean_run(&self) -> Option<Duration> {
        (self.run_count > 0).then(|| self.run_total / self.run_count)
    }

    /// Whether another `increase` pipelines may be requested.
    ///
    /// Growth needs queued work and a peak TPS under the limit. Once task
    /// durations are known, growth also stops when the added pipelines would
    /// push the projected rate past the limit.
    pub(crate) fn should_grow(&self, options: &TpsOptions, parallel: usize) -> bool {
        if self.backlog() == 0 {
            return false;
        }
        if options.is_unlimited() {
            return true;
        }
        if self.tps_max >= options.tps_limit {
            return false;
        }
        match self.mean_run() {
            Some(mean) if !mean.is_zero() => {
                let projected = (parallel + options.parallel_increase) as f64 / mean.as_secs_f64();
                projected <= options.tps_limit
            }
            _ => true,
        }
    }
}

/// A scheduler whose parallelism follows measured throughput.
///
/// The controller consumes the scheduler's reports, counts state switches
/// and completions, and every tick asks the scheduler for
/// `parallel_increase` more pipelines while work is queued and throughput is
/// under `tps_limit`. Pipelines are never removed.
///
/// ```text
/// publish ──▶ Scheduler ──reports──▶ Governor ──tick──▶ parallel channel ─┐
///                ▲                                                       │
///                └───────────────────── grow(n) ◀────────────────────────┘
/// ```
pub struct TpsController {
    options: TpsOptions,
    scheduler: Scheduler,
    governor: Arc<Mutex<Governor>>,
    reports: Mutex<Option<mpsc::Receiver<Report>>>,
    parallel_tx: mpsc::Sender<usize>,
    observer: Option<mpsc::Sender<Report>>,
    die: CancellationToken,
    handles: tokio::sync::Mutex<Vec<JoinHandle<()>>>,
}

impl TpsController {
    pub fn new(options: TpsOptions) -> Self {
        Self::with_channels(options, None, None)
    }

    /// Like [`new`](Self::new), also forwarding every report to `observer`.
    pub fn observed(options: TpsOptions, observer: mpsc::Sender<Report>) -> Self {
        Self::with_channels(options, Some(observer), None)
    }

    pub fn with_channels(
        options: TpsOptions,
        observer: Option<mpsc::Sender<Report>>,
        errors: Option<mpsc::Sender<SchedulerError>>,
    ) -> Self {
        let (report_tx, report_rx) = mpsc::channel(options.report_backlog.max(1));
        let (parallel_tx, parallel_rx) = mpsc::channel(options.parallel_backlog.max(1));

        let mut builder = Scheduler::builder()
            .options(options.scheduler_options())
            .reports(report_tx)
            .parallel_channel(parallel_rx);
        if let Some(errors) = errors {
            builder = builder.errors(errors);
        }

        Self {
            governor: Arc::new(Mutex::new(Governor::new(options.parallel_tick()))),
            scheduler: builder.build(),
            reports: Mutex::new(Some(report_rx)),
            parallel_tx,
            observer,
            die: CancellationToken::new(),
            handles: tokio::sync::Mutex::new(Vec::new()),
            options,
        }
    }

    pub fn options(&self) -> &TpsOptions {
        &self.options
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Start the scheduler and the governing loop on the current runtime.
    pub async fn start(&self) -> Result<(), SchedulerError> {
        let reports = self
            .reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(SchedulerError::AlreadyServing)?;

        let serving = self.scheduler.start();
        let governing = tokio::spawn(govern(
            Arc::clone(&self.governor),
            reports,
            self.parallel_tx.clone(),
            self.scheduler.clone(),
            self.options.clone(),
            self.observer.clone(),
            self.die.clone(),
        ));
        self.handles.lock().await.extend([serving, governing]);
        Ok(())
    }

    pub async fn publish(&self, task: Task) -> Result<u64, SchedulerError> {
        self.scheduler.publish(task).await
    }

    /// Highest TPS measured so far.
    pub fn tps_max(&self) -> f64 {
        self.governor().tps_max
    }

    /// Rate of the last tick alone, `finished * second / tick`.
    pub fn tick_tps(&self) -> f64 {
        self.governor().tick_tps
    }

    /// Highest single-tick rate seen so far.
    pub fn tick_tps_max(&self) -> f64 {
        self.governor().tick_tps_max
    }

    /// How many tasks have switched into `state`.
    pub fn state_count(&self, state: TaskState) -> usize {
        self.governor().state_count(state)
    }

    pub fn parallel(&self) -> usize {
        self.scheduler.parallel()
    }

    /// Stop the scheduler, then the governing loop once it has drained the
    /// last reports.
    pub async fn close(&self) {
        self.scheduler.close().await;
        self.die.cancel();
        for handle in self.handles.lock().await.drain(..) {
            let _ = handle.await;
        }
    }

    fn governor(&self) -> MutexGuard<'_, Governor> {
        self.governor.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn govern(
    governor: Arc<Mutex<Governor>>,
    mut reports: mpsc::Receiver<Report>,
    parallel_tx: mpsc::Sender<usize>,
    scheduler: Scheduler,
    options: TpsOptions,
    observer: Option<mpsc::Sender<Report>>,
    die: CancellationToken,
) {
    let mut ticker = tokio::time::interval_at(
        Instant::now() + options.parallel_tick(),
        options.parallel_tick(),
    );
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = die.cancelled() => break,
            _ = ticker.tick() => {
                let (tps, tps_max, backlog, grow) = {
                    let mut governor = governor.lock().unwrap_or_else(PoisonError::into_inner);
                    let tps = governor.sample();
                    let grow = governor.should_grow(&options, scheduler.parallel());
                    let newly_capped = !options.is_unlimited()
                        && governor.tps_max >= options.tps_limit
                        && !std::mem::replace(&mut governor.capped, true);
                    if newly_capped {
                        TpsLimitReached { tps_max: governor.tps_max, limit: options.tps_limit }.log();
                    }
                    (tps, governor.tps_max, governor.backlog(), grow)
                };
                if grow && parallel_tx.try_send(options.parallel_increase).is_ok() {
                    ParallelRequested {
                        added: options.parallel_increase,
                        parallel: scheduler.parallel(),
                        tps,
                        tps_max,
                        backlog,
                    }
                    .log();
                }
            }
            report = reports.recv() => {
                let Some(report) = report else { break };
                governor
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .observe(&report, Instant::now());
                if let Some(observer) = &observer {
                    let _ = observer.send(report).await;
                }
            }
        }
    }

    // Reports already queued still count.
    while let Ok(report) = reports.try_recv() {
        governor
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .observe(&report, Instant::now());
        if let Some(observer) = &observer {
            let _ = observer.send(report).await;
        }
    }
}
