// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::RaceOptions;
use crate::errors::SchedulerError;
use crate::observability::messages::controller::{RaceFinished, RaceTaskTimedOut};
use crate::observability::messages::StructuredLog;
use crate::scheduler::{Report, Scheduler, Task, TaskState};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tokio::time::Instant;

type ReportHook = Arc<dyn Fn(&Report) + Send + Sync>;
type TimeoutHook = Box<dyn Fn(u64, &str) + Send + Sync>;

/// Final tally of a [`RaceController::wait`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RaceSummary {
    pub done: usize,
    pub failed: usize,
    pub timeout: usize,
}

/// Outcome counters shared with the task that drains reports.
#[derive(Default)]
struct Tally {
    outstanding: StdMutex<HashMap<u64, String>>,
    done: AtomicUsize,
    failed: AtomicUsize,
    timeout: AtomicUsize,
    settled: Notify,
}

impl Tally {
    fn outstanding(&self) -> MutexGuard<'_, HashMap<u64, String>> {
        self.outstanding.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Runs a batch of tasks and waits for every one of them to finish.
///
/// Reports are consumed as they arrive, so a batch larger than the report
/// backlog never stalls the scheduler. Tasks still running when the deadline
/// passes are counted as timed out; they keep running until the controller is
/// closed.
pub struct RaceController {
    options: RaceOptions,
    scheduler: Scheduler,
    reports: StdMutex<Option<mpsc::Receiver<Report>>>,
    drain: StdMutex<Option<JoinHandle<()>>>,
    tally: Arc<Tally>,
    on_done: Option<ReportHook>,
    on_failed: Option<ReportHook>,
    on_timeout: Option<TimeoutHook>,
}

impl RaceController {
    pub fn new(options: RaceOptions) -> Self {
        let (report_tx, report_rx) = mpsc::channel(options.report_backlog.max(1));
        let scheduler = Scheduler::builder()
            .options(options.scheduler.clone())
            .reports(report_tx)
            .build();
        Self {
            options,
            scheduler,
            reports: StdMutex::new(Some(report_rx)),
            drain: StdMutex::new(None),
            tally: Arc::new(Tally::default()),
            on_done: None,
            on_failed: None,
            on_timeout: None,
        }
    }

    pub fn on_done(mut self, hook: impl Fn(&Report) + Send + Sync + 'static) -> Self {
        self.on_done = Some(Arc::new(hook));
        self
    }

    pub fn on_failed(mut self, hook: impl Fn(&Report) + Send + Sync + 'static) -> Self {
        self.on_failed = Some(Arc::new(hook));
        self
    }

    /// Called with the id and name of each task the deadline cut off.
    pub fn on_timeout(mut self, hook: impl Fn(u64, &str) + Send + Sync + 'static) -> Self {
        self.on_timeout = Some(Box::new(hook));
        self
    }

    /// Start the scheduler and the task that tallies finished reports.
    pub fn start(&self) {
        let reports = self.reports.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(reports) = reports {
            let handle = tokio::spawn(drain(
                reports,
                Arc::clone(&self.tally),
                self.on_done.clone(),
                self.on_failed.clone(),
            ));
            *self.drain.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        }
        self.scheduler.start();
    }

    pub async fn submit(&self, task: Task) -> Result<u64, SchedulerError> {
        let id = task.id();
        self.tally.outstanding().insert(id, task.name().to_string());
        match self.scheduler.publish(task).await {
            Ok(id) => Ok(id),
            Err(error) => {
                self.tally.outstanding().remove(&id);
                self.tally.settled.notify_waiters();
                Err(error)
            }
        }
    }

    /// Wait until every submitted task is done or failed, or the deadline passes.
    pub async fn wait(&self) -> RaceSummary {
        let started = Instant::now();
        let deadline = self.options.deadline.map(|deadline| started + deadline);

        loop {
            let settled = self.tally.settled.notified();
            tokio::pin!(settled);
            settled.as_mut().enable();
            if self.tally.outstanding().is_empty() {
                break;
            }
            match deadline {
                Some(deadline) => tokio::select! {
                    _ = &mut settled => {}
                    _ = tokio::time::sleep_until(deadline) => break,
                },
                None => settled.await,
            }
        }

        let cut_off: Vec<(u64, String)> = self.tally.outstanding().drain().collect();
        for (id, name) in cut_off {
            self.tally.timeout.fetch_add(1, Ordering::SeqCst);
            RaceTaskTimedOut { id, name: &name }.log();
            if let Some(hook) = &self.on_timeout {
                hook(id, &name);
            }
        }

        let summary = self.summary();
        RaceFinished {
            done: summary.done,
            failed: summary.failed,
            timeout: summary.timeout,
            elapsed: started.elapsed(),
        }
        .log();
        summary
    }

    pub fn done(&self) -> usize {
        self.tally.done.load(Ordering::SeqCst)
    }

    pub fn failed(&self) -> usize {
        self.tally.failed.load(Ordering::SeqCst)
    }

    pub fn timeout(&self) -> usize {
        self.tally.timeout.load(Ordering::SeqCst)
    }

    pub fn summary(&self) -> RaceSummary {
        RaceSummary {
            done: self.done(),
            failed: self.failed(),
            timeout: self.timeout(),
        }
    }

    /// Stop the scheduler, discarding reports of tasks that finish meanwhile.
    pub async fn close(&self) {
        self.scheduler.close().await;
        let drain = self.drain.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(drain) = drain {
            drain.abort();
        }
    }
}

/// Count every finished report against the outstanding set and wake `wait`.
async fn drain(
    mut reports: mpsc::Receiver<Report>,
    tally: Arc<Tally>,
    on_done: Option<ReportHook>,
    on_failed: Option<ReportHook>,
) {
    while let Some(report) = reports.recv().await {
        if !report.is_finished() {
            continue;
        }
        if tally.outstanding().remove(&report.id).is_none() {
            continue;
        }
        let (counter, hook) = if report.state == TaskState::Done {
            (&tally.done, &on_done)
        } else {
            (&tally.failed, &on_failed)
        };
        counter.fetch_add(1, Ordering::SeqCst);
        if let Some(hook) = hook {
            hook(&report);
        }
        tally.settled.notify_waiters();
    }
}
