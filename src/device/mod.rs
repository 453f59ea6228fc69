// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The device graph: buses, routers, services, handlers and clients.
//!
//! Devices form a tree rooted at a [`Bus`]. A message travels in two phases.
//! While its route is *assembling* (cursor on the first segment) it bubbles
//! up through gateways until it reaches the bus; the bus then *dispatches*
//! it down, one destination segment per hop, until a leaf consumes it.
//!
//! ```text
//!                      ┌──────────┐
//!                      │ Bus: bus │
//!                      └────┬─────┘
//!               ┌───────────┴───────────┐
//!        ┌──────┴───────┐        ┌──────┴──────┐
//!        │ Client: cli  │        │ Router: 1.0 │
//!        └──────────────┘        └──────┬──────┘
//!                                ┌──────┴───────┐
//!                                │ Service: try │
//!                                └──────┬───────┘
//!                                ┌──────┴───────┐
//!                                │ Handler: echo│
//!                                └──────────────┘
//! ```
//!
//! A handler publishes its work on the scheduler its service's [`Dispatcher`]
//! selects and sends the reply back along the reversed route. The reply
//! climbs to the bus and descends to the client that sent the request.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use the_switchyard::context::Context;
//! use the_switchyard::device::{Bus, Client, Dispatcher, Handlers, Service};
//! use the_switchyard::encoding::Chain;
//! use the_switchyard::traits::{Component, Device};
//!
//! struct Greeter;
//!
//! impl Component for Greeter {
//!     fn register(handlers: &mut Handlers<Self>) {
//!         handlers.handle("greet", |_: Arc<Greeter>, _, name: String| async move {
//!             Ok(format!("hello, {}", name))
//!         });
//!     }
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bus = Bus::new("bus");
//! bus.integrate(Service::new("greeter", Greeter, Chain::parse("json")?, Dispatcher::default()));
//! let client = Client::new("cli", None);
//! bus.integrate(client.clone());
//!
//! let reply: String = client
//!     .call(&Context::new(), "greeter/greet", Chain::parse("json")?, &"ada".to_string(), Duration::from_secs(5))
//!     .await?;
//! assert_eq!(reply, "hello, ada");
//! # Ok(())
//! # }
//! ```

mod binding;
mod bus;
mod client;
mod core;
mod dispatcher;
mod handler;
mod hole;
mod router;
mod service;

#[cfg(test)]
mod integration_tests;

pub use self::core::DeviceCore;
pub use binding::Handlers;
pub use bus::{bus, Bus};
pub use client::{ChannelProcessor, Client};
pub use dispatcher::Dispatcher;
pub use handler::Handler;
pub use hole::Hole;
pub use router::Router;
pub use service::Service;
