// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Built-in components that configuration files can bind as services.
//!
//! # Available Components
//!
//! ## `try`
//! Echo service used to exercise the fabric end to end:
//! - **echo**: returns its [`Text`](local::Text) request
//! - **echo-bytes**: returns its raw byte request
//!
//! ## `text`
//! Text transformation and analysis:
//! - **upper / lower / title / reverse**: return a transformed [`Text`](local::Text)
//! - **count-tokens**: returns a [`TokenCount`](local::TokenCount)
//!
//! # Architecture
//!
//! ```text
//! ServiceConfig → ComponentFactory → Service (one Handler per method) → Router
//! ```
//!
//! # Examples
//!
//! ```rust
//! use the_switchyard::backends::local::ComponentFactory;
//! use the_switchyard::config::ServiceConfig;
//! use the_switchyard::device::Dispatcher;
//! use the_switchyard::traits::Device;
//!
//! let config = ServiceConfig {
//!     name: "try".to_string(),
//!     component: "try".to_string(),
//!     encoding: "json".to_string(),
//! };
//! let service = ComponentFactory::bind(&config, Dispatcher::default())?;
//! assert_eq!(service.name(), "Try");
//! # Ok::<(), the_switchyard::errors::ComponentError>(())
//! ```

pub mod local;

#[cfg(test)]
mod integration_tests;
