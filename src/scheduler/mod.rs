// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Task scheduler with dynamically growing parallelism.
//!
//! Work enters as a [`Task`]: an ordered list of async stages plus a name,
//! parameters, an optional parent [`Context`](crate::context::Context) and an
//! optional timeout. A [`Scheduler`] keeps a bounded queue and a set of worker
//! pipelines; each pipeline pulls one task at a time and runs its stages in
//! order.
//!
//! # Task lifecycle
//!
//! ```text
//! Created ─publish─▶ Pending ─dequeue─▶ Running ─all stages ok─▶ Done
//!                                         │
//!                                         └─ error / panic / timeout ─▶ Failed
//! ```
//!
//! Every transition and every stage advance produces a [`Report`]. A stage
//! that returns an error, panics, or outlives the task timeout fails the task
//! and skips the remaining stages; the scheduler stays usable.
//!
//! # Examples
//!
//! ```rust
//! use the_switchyard::scheduler::{Scheduler, Task};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let scheduler = Scheduler::builder().parallel(2).build();
//! scheduler.start();
//!
//! let (tx, rx) = tokio::sync::oneshot::channel();
//! Task::builder()
//!     .name("greet")
//!     .stage(move |scope| async move {
//!         let _ = tx.send(format!("hello from {}", scope.name));
//!         Ok(())
//!     })
//!     .build()
//!     .publish(&scheduler)
//!     .await?;
//!
//! assert_eq!(rx.await?, "hello from greet");
//! scheduler.close().await;
//! # Ok(())
//! # }
//! ```

mod options;
mod pipeline;
mod pool;
mod report;
mod task;

#[cfg(test)]
mod integration_tests;

pub use options::SchedulerOptions;
pub use pool::{default_scheduler, Scheduler, SchedulerBuilder};
pub use report::{Durations, Report, ReportKind};
pub use task::{Stage, StageFuture, Task, TaskBuilder, TaskScope, TaskState};
