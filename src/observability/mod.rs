// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structured logging for the fabric.
//!
//! Every diagnostic the crate emits goes through a message struct that
//! implements `Display` for the human-readable text and
//! [`StructuredLog`](messages::StructuredLog) for the structured fields. Call
//! sites never carry free-form strings, so the wording of each event lives in
//! one place.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::scheduler` - worker pool lifecycle and task outcomes
//! * `messages::device` - routing, binding and delivery events
//! * `messages::controller` - TPS and race controller decisions
//! * `messages::coroutine` - coroutine lifecycle
//! * `messages::commander` - commander requests and responses
//! * `messages::config` - configuration loading and fabric construction
//!
//! # Usage
//!
//! ```rust
//! use the_switchyard::observability::messages::scheduler::TaskPublished;
//! use the_switchyard::observability::messages::StructuredLog;
//!
//! let msg = TaskPublished { id: 7, name: "resize-images" };
//! assert_eq!(msg.to_string(), "Task 7 (resize-images) published");
//! msg.log();
//! ```
//!
//! Nothing here installs a subscriber; the binary does that with
//! `tracing-subscriber` and an `EnvFilter`.

pub mod messages;
