// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::pool::{panic_message, Inner};
use super::{ReportKind, Task, TaskState};
use crate::errors::{SchedulerError, TaskError};
use crate::observability::messages::scheduler::{TaskFailed, TaskFinished, WorkerPanicked};
use crate::observability::messages::StructuredLog;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// One worker and the token that stops it.
///
/// The supervisor restarts the worker after a panic when safety is on; the
/// handle completes only once the worker has exited for good.
pub(crate) struct Pipeline {
    die: CancellationToken,
    handle: JoinHandle<()>,
}

impl Pipeline {
    pub(crate) fn spawn(inner: Arc<Inner>, id: usize) -> Self {
        let die = inner.closed.child_token();
        let token = die.clone();
        let handle = tokio::spawn(async move {
            loop {
                let worker = tokio::spawn(work(Arc::clone(&inner), token.clone()));
                match worker.await {
                    Ok(()) => break,
                    Err(join) if join.is_panic() => {
                        let payload = join.into_panic();
                        let reason = panic_message(payload.as_ref());
                        WorkerPanicked {
                            pipeline: id,
                            reason: &reason,
                            recovered: inner.options.safety,
                        }
                        .log();
                        if !inner.options.safety {
                            std::panic::resume_unwind(payload);
                        }
                        inner.raise(SchedulerError::WorkerPanic {
                            pipeline: id,
                            reason,
                        });
                        if token.is_cancelled() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        });
        Self { die, handle }
    }

    pub(crate) async fn shutdown(self) {
        self.die.cancel();
        let _ = self.handle.await;
    }
}

async fn work(inner: Arc<Inner>, die: CancellationToken) {
    loop {
        let next = tokio::select! {
            biased;
            _ = die.cancelled() => None,
            task = async { inner.task_rx.lock().await.recv().await } => task,
        };
        let Some(task) = next else {
            break;
        };
        execute(&inner, task).await;
    }
}

/// Run every stage of `task` in order, reporting along the way.
async fn execute(inner: &Inner, mut task: Task) {
    task.switch(TaskState::Running);
    inner
        .report(task.report(ReportKind::StateSwitch, Duration::ZERO, None))
        .await;

    let context = match task.timeout {
        Some(timeout) => task.parent.with_timeout(timeout),
        None => task.parent.child(),
    };
    let params = Arc::new(Mutex::new(std::mem::take(&mut task.params)));
    let stages = std::mem::take(&mut task.stages);
    let total = stages.len();

    for (index, stage) in stages.into_iter().enumerate() {
        let started = Instant::now();
        let scope = task.scope(index, context.clone(), Arc::clone(&params));
        let running = tokio::spawn(async move { stage(scope).await });
        let abort = running.abort_handle();

        let outcome = tokio::select! {
            joined = running => match joined {
                Ok(Ok(())) => Ok(()),
                Ok(Err(error)) => Err(TaskError::Stage {
                    name: task.name.clone(),
                    stage: index,
                    reason: format!("{:#}", error),
                }),
                Err(join) if join.is_panic() => Err(TaskError::Panic {
                    name: task.name.clone(),
                    stage: index,
                    reason: panic_message(join.into_panic().as_ref()),
                }),
                Err(_) => Err(TaskError::Cancelled { name: task.name.clone() }),
            },
            _ = context.cancelled() => {
                abort.abort();
                Err(interrupted(&task, &context))
            }
        };

        match outcome {
            Ok(()) => {
                task.progress += 1;
                if task.progress < total {
                    inner
                        .report(task.report(ReportKind::Progress, started.elapsed(), None))
                        .await;
                }
            }
            Err(error) => {
                task.switch(TaskState::Failed);
                TaskFailed {
                    id: task.id,
                    name: &task.name,
                    error: &error,
                }
                .log();
                inner
                    .report(task.report(ReportKind::StateSwitch, started.elapsed(), Some(error)))
                    .await;
                return;
            }
        }
    }

    let lifetime = task.created_at.elapsed();
    task.switch(TaskState::Done);
    TaskFinished {
        id: task.id,
        name: &task.name,
        stages: total,
        duration: lifetime,
    }
    .log();
    inner
        .report(task.report(ReportKind::StateSwitch, Duration::ZERO, None))
        .await;
}

fn interrupted(task: &Task, context: &crate::context::Context) -> TaskError {
    let expired = context
        .deadline()
        .is_some_and(|deadline| Instant::now() >= deadline);
    if expired {
        TaskError::Timeout {
            name: task.name.clone(),
            timeout: task.timeout.unwrap_or_default(),
        }
    } else {
        TaskError::Cancelled {
            name: task.name.clone(),
        }
    }
}
