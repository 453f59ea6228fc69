// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! # The Switchyard
//!
//! An in-process messaging fabric. Components are bound as services inside a
//! tree of devices, clients send encoded messages along routes through that
//! tree, and replies find their way back to the client that asked.
//!
//! ```text
//!            Bus
//!           /    \
//!      Router    Client
//!        |
//!     Service
//!      /   \
//! Handler  Handler
//! ```
//!
//! Around the tree sit the pieces that keep it running:
//! * a bounded [`scheduler`] with a worker pool and per-task deadlines
//! * [`controller`]s that throttle or race work against that scheduler
//! * [`coroutine`]s for request/reply conversations that suspend mid-flight
//! * a [`commander`] that turns JSON requests into routed calls
//! * the [`encoding`] registry with composable codec chains
//!
//! Fabrics are usually described in YAML or TOML and built through
//! [`config::RuntimeBuilder`].

pub mod address;       // normalized device addresses
pub mod backends;      // built-in components
pub mod commander;     // JSON request front door
pub mod config;        // config loading + fabric construction
pub mod context;       // cancellation + deadlines
pub mod controller;    // TPS and race controllers
pub mod coroutine;     // suspendable conversations
pub mod device;        // the device graph
pub mod encoding;      // codecs and chains
pub mod errors;        // error handling
pub mod observability;
pub mod route;         // routes and messages
pub mod scheduler;     // worker pool
pub mod traits;        // unified abstractions
