// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Controllers that drive a [`Scheduler`](crate::scheduler::Scheduler) from
//! its own reports.
//!
//! * [`TpsController`] grows parallelism while work is queued and measured
//!   completions per second stay under a limit.
//! * [`RaceController`] runs a batch of tasks to completion, optionally
//!   bounded by a wall-clock deadline, and tallies each outcome.
//!
//! # Examples
//!
//! ```rust
//! use std::time::Duration;
//! use the_switchyard::controller::{RaceController, RaceOptions};
//! use the_switchyard::scheduler::Task;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let race = RaceController::new(RaceOptions::default());
//! race.start();
//! for i in 0..3u64 {
//!     let task = Task::builder()
//!         .stage(move |_| async move {
//!             tokio::time::sleep(Duration::from_millis(5 * i)).await;
//!             Ok(())
//!         })
//!         .build();
//!     race.submit(task).await?;
//! }
//! let summary = race.wait().await;
//! assert_eq!(summary.done, 3);
//! race.close().await;
//! # Ok(())
//! # }
//! ```

mod options;
mod race;
mod tps;


pub use options::{RaceOptions, TpsOptions};
pub use race::{RaceController, RaceSummary};
pub use tps::TpsController;
