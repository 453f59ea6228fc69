// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::*;
use crate::context::Context;
use crate::errors::{SchedulerError, TaskError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

fn scheduler_with_reports(parallel: usize) -> (Scheduler, mpsc::Receiver<Report>) {
    let (tx, rx) = mpsc::channel(256);
    let scheduler = Scheduler::builder().parallel(parallel).reports(tx).build();
    (scheduler, rx)
}

async fn until_finished(rx: &mut mpsc::Receiver<Report>, count: usize) -> Vec<Report> {
    let mut reports = Vec::new();
    let mut finished = 0;
    while finished < count {
        let report = rx.recv().await.expect("report channel closed");
        if report.is_finished() {
            finished += 1;
        }
        reports.push(report);
    }
    reports
}

fn sleeper(name: &str, seconds: u64) -> Task {
    Task::builder()
        .name(name)
        .stage(move |_| async move {
            tokio::time::sleep(Duration::from_secs(seconds)).await;
            Ok(())
        })
        .build()
}

#[tokio::test(start_paused = true)]
async fn test_parallel_pipelines_overlap_sleeping_tasks() {
    let n = 5;
    let (scheduler, mut reports) = scheduler_with_reports(n);
    scheduler.start();

    let started = Instant::now();
    for i in 0..n {
        scheduler.publish(sleeper(&format!("sleeper-{}", i), 1)).await.unwrap();
    }
    let reports = until_finished(&mut reports, n).await;

    assert!(started.elapsed() < Duration::from_millis(1500));
    assert_eq!(
        reports.iter().filter(|r| r.is_finished() && r.state == TaskState::Done).count(),
        n
    );
    scheduler.close().await;
}

#[tokio::test]
async fn test_single_stage_report_states() {
    let (scheduler, mut reports) = scheduler_with_reports(1);
    scheduler.start();

    let task = Task::builder().name("once").stage(|_| async { Ok(()) }).build();
    let id = scheduler.publish(task).await.unwrap();
    let reports = until_finished(&mut reports, 1).await;

    let states: Vec<TaskState> = reports.iter().filter(|r| r.id == id).map(|r| r.state).collect();
    assert_eq!(states, vec![TaskState::Pending, TaskState::Running, TaskState::Done]);
    assert!(reports.iter().all(|r| r.state != TaskState::Created));
    scheduler.close().await;
}

#[tokio::test]
async fn test_progress_is_monotonic_and_completes_with_done() {
    let (scheduler, mut reports) = scheduler_with_reports(1);
    scheduler.start();

    let task = Task::builder()
        .name("three")
        .stage(|_| async { Ok(()) })
        .stage(|_| async { Ok(()) })
        .stage(|_| async { Ok(()) })
        .build();
    scheduler.publish(task).await.unwrap();
    let reports = until_finished(&mut reports, 1).await;

    let progress: Vec<usize> = reports.iter().map(|r| r.progress).collect();
    assert_eq!(progress, vec![0, 0, 1, 2, 3]);
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));

    let first_complete = reports.iter().find(|r| r.progress == 3).unwrap();
    assert_eq!(first_complete.state, TaskState::Done);
    assert_eq!(first_complete.kind, ReportKind::StateSwitch);
    assert!(reports
        .iter()
        .filter(|r| r.kind == ReportKind::Progress)
        .all(|r| r.state == TaskState::Running));
    scheduler.close().await;
}

#[tokio::test(start_paused = true)]
async fn test_task_timeout_fails_with_deadline_exceeded() {
    let (scheduler, mut reports) = scheduler_with_reports(1);
    scheduler.start();

    let task = Task::builder()
        .name("slow")
        .timeout(Duration::from_secs(1))
        .stage(|_| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Ok(())
        })
        .build();

    let started = Instant::now();
    scheduler.publish(task).await.unwrap();
    let reports = until_finished(&mut reports, 1).await;
    let elapsed = started.elapsed();

    let last = reports.last().unwrap();
    assert_eq!(last.state, TaskState::Failed);
    let error = last.error.as_ref().unwrap();
    assert!(error.is_timeout());
    assert!(error.to_string().contains("deadline exceeded"));
    assert!(elapsed >= Duration::from_secs(1));
    assert!(elapsed < Duration::from_millis(1050));
    scheduler.close().await;
}

#[tokio::test]
async fn test_failed_stage_skips_remaining_stages() {
    let (scheduler, mut reports) = scheduler_with_reports(1);
    scheduler.start();

    let ran = Arc::new(AtomicUsize::new(0));
    let (first, third) = (Arc::clone(&ran), Arc::clone(&ran));
    let task = Task::builder()
        .name("broken")
        .stage(move |_| async move {
            first.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .stage(|_| async { Err(anyhow::anyhow!("disk on fire")) })
        .stage(move |_| async move {
            third.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .build();
    scheduler.publish(task).await.unwrap();
    let reports = until_finished(&mut reports, 1).await;

    let last = reports.last().unwrap();
    assert_eq!(last.state, TaskState::Failed);
    assert_eq!(last.progress, 1);
    match last.error.as_ref().unwrap() {
        TaskError::Stage { stage, reason, .. } => {
            assert_eq!(*stage, 1);
            assert!(reason.contains("disk on fire"));
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(ran.load(Ordering::SeqCst), 1);
    scheduler.close().await;
}

#[tokio::test]
async fn test_panicking_stage_is_recovered() {
    let (scheduler, mut reports) = scheduler_with_reports(1);
    scheduler.start();

    let task = Task::builder()
        .name("panics")
        .stage(|_| async {
            if true {
                panic!("stage exploded");
            }
            Ok(())
        })
        .build();
    scheduler.publish(task).await.unwrap();
    let panicked = until_finished(&mut reports, 1).await;
    match panicked.last().unwrap().error.as_ref().unwrap() {
        TaskError::Panic { reason, .. } => assert!(reason.contains("stage exploded")),
        other => panic!("unexpected error {:?}", other),
    }

    // the same pipeline keeps working
    scheduler.publish(sleeper("after", 0)).await.unwrap();
    let after = until_finished(&mut reports, 1).await;
    assert_eq!(after.last().unwrap().state, TaskState::Done);
    scheduler.close().await;
}

#[tokio::test]
async fn test_single_pipeline_runs_in_publication_order() {
    let (scheduler, mut reports) = scheduler_with_reports(1);
    let order = Arc::new(std::sync::Mutex::new(Vec::new()));

    for i in 0..4 {
        let order = Arc::clone(&order);
        let task = Task::builder()
            .stage(move |_| async move {
                order.lock().unwrap().push(i);
                Ok(())
            })
            .build();
        scheduler.publish(task).await.unwrap();
    }
    scheduler.start();
    until_finished(&mut reports, 4).await;

    assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3]);
    scheduler.close().await;
}

#[tokio::test]
async fn test_parallel_channel_adds_pipelines() {
    let (parallel_tx, parallel_rx) = mpsc::channel(4);
    let scheduler = Scheduler::builder().parallel(1).parallel_channel(parallel_rx).build();
    scheduler.start();

    parallel_tx.send(3).await.unwrap();
    for _ in 0..100 {
        if scheduler.parallel() == 4 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(scheduler.parallel(), 4);

    scheduler.grow(2).await;
    assert_eq!(scheduler.parallel(), 6);
    scheduler.close().await;
    assert_eq!(scheduler.parallel(), 0);
}

#[tokio::test]
async fn test_closed_scheduler_rejects_work() {
    let scheduler = Scheduler::builder().parallel(1).build();
    scheduler.start();
    scheduler.close().await;

    let err = scheduler.publish(sleeper("late", 0)).await.unwrap_err();
    assert!(matches!(err, SchedulerError::Closed));
    assert!(scheduler.serve().await.is_err());
}

#[tokio::test]
async fn test_params_flow_between_stages() {
    let (scheduler, mut reports) = scheduler_with_reports(1);
    scheduler.start();

    let (tx, rx) = tokio::sync::oneshot::channel();
    let task = Task::builder()
        .param("greeting", "hello")
        .stage(|scope| async move {
            let greeting = scope.param("greeting").await.unwrap();
            scope
                .set_param("message", format!("{} world", greeting.as_str().unwrap()))
                .await;
            Ok(())
        })
        .stage(move |scope| async move {
            let message = scope.param("message").await.unwrap();
            let _ = tx.send(message);
            Ok(())
        })
        .build();
    scheduler.publish(task).await.unwrap();
    until_finished(&mut reports, 1).await;

    assert_eq!(rx.await.unwrap(), serde_json::json!("hello world"));
    scheduler.close().await;
}

#[tokio::test]
async fn test_parent_cancellation_fails_running_task() {
    let (scheduler, mut reports) = scheduler_with_reports(1);
    scheduler.start();

    let parent = Context::new();
    let (started_tx, started_rx) = tokio::sync::oneshot::channel();
    let task = Task::builder()
        .parent(parent.clone())
        .stage(move |_| async move {
            let _ = started_tx.send(());
            std::future::pending::<()>().await;
            Ok(())
        })
        .build();
    scheduler.publish(task).await.unwrap();
    started_rx.await.unwrap();
    parent.cancel();

    let reports = until_finished(&mut reports, 1).await;
    assert!(matches!(
        reports.last().unwrap().error,
        Some(TaskError::Cancelled { .. })
    ));
    scheduler.close().await;
}

#[tokio::test]
async fn test_default_scheduler_is_shared_and_serving() {
    let a = default_scheduler();
    let b = default_scheduler();
    assert!(a.options().safety);

    let (tx, rx) = tokio::sync::oneshot::channel();
    Task::builder()
        .stage(move |_| async move {
            let _ = tx.send(42);
            Ok(())
        })
        .build()
        .publish(&b)
        .await
        .unwrap();
    assert_eq!(rx.await.unwrap(), 42);
    assert!(Arc::ptr_eq(&a.inner, &b.inner));
}
