// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Suspend/resume primitive keyed by an identifier.
//!
//! A coroutine is an async body that receives a [`Yielder`]. Inside the body,
//! [`Yielder::yield_`] hands a value out and suspends until someone outside
//! calls [`Coroutines::resume`] with the next input. This turns the
//! publish-and-forget fabric into synchronous-looking call sites: the caller
//! publishes a request carrying the coroutine id, yields, and the reply
//! handler resumes it with the answer.
//!
//! ```text
//!   wrap ──▶ Created ──call──▶ Running ──yield_──▶ Suspended
//!                                 ▲                    │
//!                                 └──────resume────────┘
//!   body returns / panics / times out ──▶ Dead (deregistered)
//! ```
//!
//! Every send and receive on either side is bounded by the registry's
//! timeout (30 seconds unless configured). A timeout kills the coroutine.
//!
//! # Examples
//!
//! ```rust
//! use the_switchyard::context::Context;
//! use the_switchyard::coroutine::{CoroutineOptions, Coroutines, CoroutineState};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let coroutines: Coroutines<u32, u32> = Coroutines::new(CoroutineOptions::default());
//! let (id, handle) = coroutines.start(Context::new(), |mut y| async move {
//!     let mut total = 0;
//!     loop {
//!         let next = y.yield_(total).await?;
//!         if next == 0 {
//!             return Ok(());
//!         }
//!         total += next;
//!     }
//! })?;
//!
//! assert_eq!(coroutines.resume(&id, 5).await?, 0);
//! assert_eq!(coroutines.resume(&id, 7).await?, 5);
//! assert_eq!(coroutines.resume(&id, 0).await?, 12);
//! handle.await??;
//! assert_eq!(coroutines.status(&id), CoroutineState::Dead);
//! # Ok(())
//! # }
//! ```

mod coroutines;

pub use coroutines::{Body, CoroutineOptions, CoroutineState, Coroutines, Yielder};
