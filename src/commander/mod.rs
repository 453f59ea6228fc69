// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Commanders: request/response front ends for the fabric.
//!
//! A [`Commander`] is a client attached to a bus that owns a TPS-controlled
//! scheduler. Callers hand it [`ServiceRequest`]s; each one becomes a task
//! that marshals the JSON body under the commander's encoding, routes it to
//! the target service and waits for the reply.
//!
//! ```text
//! submit ──▶ inbound channel ──▶ intake ──▶ TpsController ──▶ task
//!                                                              │ client.call
//!                                                              ▼
//!          responses() ◀── outbound channel ◀── (no coroutine) reply
//!          call()      ◀── coroutine resumed ◀── (coroutine)    reply
//! ```
//!
//! # Examples
//!
//! ```rust
//! use serde_json::json;
//! use the_switchyard::backends::local::Try;
//! use the_switchyard::commander::{Commander, CommanderOptions, ServiceRequest};
//! use the_switchyard::context::Context;
//! use the_switchyard::device::{Bus, Dispatcher, Service};
//! use the_switchyard::encoding::Chain;
//! use the_switchyard::traits::Device;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let bus = Bus::new("bus");
//! bus.integrate(Service::new("try", Try, Chain::parse("json")?, Dispatcher::default()));
//!
//! let commander = Commander::new("commander", &*bus, CommanderOptions::default());
//! commander.start().await?;
//!
//! let response = commander
//!     .call(&Context::new(), ServiceRequest::new("try/echo", json!({"text": "hi"})))
//!     .await?;
//! assert_eq!(response.body, json!({"text": "hi"}));
//! commander.close().await;
//! # Ok(())
//! # }
//! ```

mod request;
mod runner;


pub use request::{ServiceRequest, ServiceResponse};
pub use runner::{Commander, CommanderOptions};
