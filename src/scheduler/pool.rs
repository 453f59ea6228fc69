// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::pipeline::Pipeline;
use super::{Report, ReportKind, SchedulerOptions, Task, TaskState};
use crate::errors::{SchedulerError, TaskError};
use crate::observability::messages::scheduler::{
    ParallelismIncreased, SchedulerClosed, SchedulerStarted, TaskPublished,
};
use crate::observability::messages::StructuredLog;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::runtime::{Handle, Runtime};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A pool of worker pipelines consuming a bounded task queue.
///
/// Cloning is cheap; clones share the queue, the pipelines and the channels.
///
/// ```text
/// publish ──▶ [ backlog ] ──▶ pipeline 0 ─┐
///                         ──▶ pipeline 1 ─┼──▶ reports
///                         ──▶ pipeline n ─┘
/// parallel channel ──▶ serve ──▶ grow(n)
/// ```
#[derive(Clone)]
pub struct Scheduler {
    pub(crate) inner: Arc<Inner>,
}

pub(crate) struct Inner {
    pub(crate) options: SchedulerOptions,
    task_tx: mpsc::Sender<Task>,
    pub(crate) task_rx: Mutex<mpsc::Receiver<Task>>,
    reports: Option<mpsc::Sender<Report>>,
    errors: Option<mpsc::Sender<SchedulerError>>,
    parallel_rx: Mutex<Option<mpsc::Receiver<usize>>>,
    pipelines: Mutex<Vec<Pipeline>>,
    parallel: AtomicUsize,
    serving: AtomicBool,
    pub(crate) closed: CancellationToken,
}

impl Inner {
    pub(crate) async fn report(&self, report: Report) {
        if let Some(reports) = &self.reports {
            let _ = reports.send(report).await;
        }
    }

    /// Deliver a recovered failure; dropped when nobody listens or the channel is full.
    pub(crate) fn raise(&self, error: SchedulerError) {
        tracing::error!(error = %error, "scheduler failure");
        if let Some(errors) = &self.errors {
            let _ = errors.try_send(error);
        }
    }
}

#[derive(Default)]
pub struct SchedulerBuilder {
    options: SchedulerOptions,
    reports: Option<mpsc::Sender<Report>>,
    errors: Option<mpsc::Sender<SchedulerError>>,
    parallel_rx: Option<mpsc::Receiver<usize>>,
}

impl SchedulerBuilder {
    pub fn options(mut self, options: SchedulerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn backlog(mut self, backlog: usize) -> Self {
        self.options.backlog = backlog;
        self
    }

    pub fn parallel(mut self, parallel: usize) -> Self {
        self.options.parallel = parallel;
        self
    }

    pub fn safety(mut self, safety: bool) -> Self {
        self.options.safety = safety;
        self
    }

    /// Every report is forwarded here.
    pub fn reports(mut self, reports: mpsc::Sender<Report>) -> Self {
        self.reports = Some(reports);
        self
    }

    /// Recovered panics are offered here without blocking.
    pub fn errors(mut self, errors: mpsc::Sender<SchedulerError>) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Each `n` received adds `n` pipelines while serving.
    pub fn parallel_channel(mut self, parallel_rx: mpsc::Receiver<usize>) -> Self {
        self.parallel_rx = Some(parallel_rx);
        self
    }

    pub fn build(self) -> Scheduler {
        let mut options = self.options;
        options.backlog = options.backlog.max(1);
        options.parallel = options.parallel.max(1);
        let (task_tx, task_rx) = mpsc::channel(options.backlog);
        Scheduler {
            inner: Arc::new(Inner {
                options,
                task_tx,
                task_rx: Mutex::new(task_rx),
                reports: self.reports,
                errors: self.errors,
                parallel_rx: Mutex::new(self.parallel_rx),
                pipelines: Mutex::new(Vec::new()),
                parallel: AtomicUsize::new(0),
                serving: AtomicBool::new(false),
                closed: CancellationToken::new(),
            }),
        }
    }
}

enum Signal {
    Close,
    Grow(usize),
    Detached,
}

impl Scheduler {
    pub fn builder() -> SchedulerBuilder {
        SchedulerBuilder::default()
    }

    pub fn new(options: SchedulerOptions) -> Self {
        Self::builder().options(options).build()
    }

    pub fn options(&self) -> &SchedulerOptions {
        &self.inner.options
    }

    /// Pipelines currently running.
    pub fn parallel(&self) -> usize {
        self.inner.parallel.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.is_cancelled()
    }

    /// Start the configured pipelines and run until [`close`](Self::close).
    pub async fn serve(&self) -> Result<(), SchedulerError> {
        if self.inner.serving.swap(true, Ordering::SeqCst) {
            return Err(SchedulerError::AlreadyServing);
        }
        if self.is_closed() {
            return Err(SchedulerError::Closed);
        }

        let options = &self.inner.options;
        SchedulerStarted {
            parallel: options.parallel,
            backlog: options.backlog,
            safety: options.safety,
        }
        .log();

        self.grow(options.parallel).await;

        let mut parallel_rx = self.inner.parallel_rx.lock().await.take();
        loop {
            let signal = match parallel_rx.as_mut() {
                Some(rx) => tokio::select! {
                    _ = self.inner.closed.cancelled() => Signal::Close,
                    n = rx.recv() => n.map_or(Signal::Detached, Signal::Grow),
                },
                None => {
                    self.inner.closed.cancelled().await;
                    Signal::Close
                }
            };
            match signal {
                Signal::Close => break,
                Signal::Grow(n) => self.grow(n).await,
                Signal::Detached => parallel_rx = None,
            }
        }
        Ok(())
    }

    /// Serve in the background on the current runtime.
    pub fn start(&self) -> JoinHandle<()> {
        self.start_on(&Handle::current())
    }

    pub fn start_on(&self, handle: &Handle) -> JoinHandle<()> {
        let scheduler = self.clone();
        handle.spawn(async move {
            let inner = Arc::clone(&scheduler.inner);
            let serving = tokio::spawn(async move { scheduler.serve().await });
            match serving.await {
                Ok(Ok(())) => {}
                Ok(Err(error)) => tracing::warn!(error = %error, "scheduler did not serve"),
                Err(join) if join.is_panic() => {
                    let payload = join.into_panic();
                    if !inner.options.safety {
                        std::panic::resume_unwind(payload);
                    }
                    inner.raise(SchedulerError::ServePanic(panic_message(payload.as_ref())));
                }
                Err(_) => {}
            }
        })
    }

    /// Add `n` pipelines. Parallelism never shrinks.
    pub async fn grow(&self, n: usize) {
        if n == 0 || self.is_closed() {
            return;
        }
        let mut pipelines = self.inner.pipelines.lock().await;
        for _ in 0..n {
            let id = pipelines.len();
            pipelines.push(Pipeline::spawn(Arc::clone(&self.inner), id));
        }
        let parallel = pipelines.len();
        self.inner.parallel.store(parallel, Ordering::SeqCst);
        ParallelismIncreased { added: n, parallel }.log();
    }

    /// Queue `task`, waiting while the backlog is full.
    ///
    /// The `Pending` report is emitted before the task becomes visible to
    /// workers. If the task's parent context is cancelled while waiting the
    /// task is reported `Failed` and never runs.
    pub async fn publish(&self, mut task: Task) -> Result<u64, SchedulerError> {
        if self.is_closed() {
            return Err(SchedulerError::Closed);
        }

        let id = task.id;
        let name = task.name.clone();
        let parent = task.parent.clone();

        task.switch(TaskState::Pending);
        self.inner
            .report(task.report(ReportKind::StateSwitch, Duration::ZERO, None))
            .await;
        TaskPublished { id, name: &name }.log();

        let queued = tokio::select! {
            sent = self.inner.task_tx.send(task) => match sent {
                Ok(()) => Ok(id),
                Err(_) => Err(SchedulerError::Closed),
            },
            _ = parent.cancelled() => Err(SchedulerError::PublishCancelled(name.clone())),
            _ = self.inner.closed.cancelled() => Err(SchedulerError::Closed),
        };

        if let Err(error) = &queued {
            let failed = Report {
                id,
                name: name.clone(),
                kind: ReportKind::StateSwitch,
                state: TaskState::Failed,
                progress: 0,
                stages: 0,
                durations: Default::default(),
                error: Some(TaskError::Cancelled { name }),
            };
            tracing::debug!(task_id = id, error = %error, "publication abandoned");
            self.inner.report(failed).await;
        }
        queued
    }

    /// Stop every pipeline and wait for them to exit.
    ///
    /// Tasks already running finish; tasks still queued are dropped.
    pub async fn close(&self) {
        self.inner.closed.cancel();
        let pipelines = std::mem::take(&mut *self.inner.pipelines.lock().await);
        let parallel = pipelines.len();
        for pipeline in pipelines {
            pipeline.shutdown().await;
        }
        self.inner.parallel.store(0, Ordering::SeqCst);
        SchedulerClosed { parallel }.log();
    }
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic".to_string()
    }
}

struct DefaultScheduler {
    scheduler: Scheduler,
    _runtime: Option<Runtime>,
}

/// The process-wide scheduler used by services without their own dispatcher.
///
/// Safety is enabled. It runs on a dedicated runtime so that callers from any
/// runtime (including short-lived test runtimes) can publish to it.
pub fn default_scheduler() -> Scheduler {
    static DEFAULT: OnceLock<DefaultScheduler> = OnceLock::new();
    DEFAULT
        .get_or_init(|| {
            let scheduler = Scheduler::builder().safety(true).build();
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .thread_name("switchyard-default")
                .enable_all()
                .build();
            match runtime {
                Ok(runtime) => {
                    scheduler.start_on(runtime.handle());
                    DefaultScheduler {
                        scheduler,
                        _runtime: Some(runtime),
                    }
                }
                Err(error) => {
                    tracing::warn!(error = %error, "default scheduler shares the caller's runtime");
                    scheduler.start();
                    DefaultScheduler {
                        scheduler,
                        _runtime: None,
                    }
                }
            }
        })
        .scheduler
        .clone()
}
