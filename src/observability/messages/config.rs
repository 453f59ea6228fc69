// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for configuration loading and fabric construction.
//!
//! This module contains message types for logging events related to:
//! * Reading a configuration file
//! * Validation outcomes
//! * Building the device graph from configuration

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A configuration file was parsed.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_switchyard::observability::messages::config::ConfigLoaded;
///
/// let msg = ConfigLoaded { path: "fabric.yaml", routers: 1, services: 2 };
/// assert_eq!(msg.to_string(), "Loaded configuration from fabric.yaml: 1 routers, 2 services");
/// ```
pub struct ConfigLoaded<'a> {
    pub path: &'a str,
    pub routers: usize,
    pub services: usize,
}

impl Display for ConfigLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded configuration from {}: {} routers, {} services",
            self.path, self.routers, self.services
        )
    }
}

impl StructuredLog for ConfigLoaded<'_> {
    fn log(&self) {
        tracing::info!(
            path = self.path,
            routers = self.routers,
            services = self.services,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::INFO,
            "span_name",
            name = name,
            path = self.path,
        )
    }
}

/// Configuration validation started.
///
/// # Log Level
/// `debug!`
pub struct ValidationStarted {
    pub routers: usize,
    pub services: usize,
}

impl Display for ValidationStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Validating configuration with {} routers and {} services",
            self.routers, self.services
        )
    }
}

impl StructuredLog for ValidationStarted {
    fn log(&self) {
        tracing::debug!(routers = self.routers, services = self.services, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::DEBUG,
            "span_name",
            name = name,
            routers = self.routers,
            services = self.services,
        )
    }
}

/// Configuration validation completed successfully.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ValidationCompleted {
    pub routers: usize,
    pub services: usize,
}

impl Display for ValidationCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Configuration valid: {} routers, {} services",
            self.routers, self.services
        )
    }
}

impl StructuredLog for ValidationCompleted {
    fn log(&self) {
        tracing::info!(routers = self.routers, services = self.services, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::INFO,
            "span_name",
            name = name,
            routers = self.routers,
            services = self.services,
        )
    }
}

/// Configuration validation failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use the_switchyard::observability::messages::config::ValidationFailed;
///
/// let msg = ValidationFailed { error_count: 3 };
/// assert_eq!(msg.to_string(), "Configuration validation failed with 3 errors");
/// ```
pub struct ValidationFailed {
    pub error_count: usize,
}

impl Display for ValidationFailed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Configuration validation failed with {} errors", self.error_count)
    }
}

impl StructuredLog for ValidationFailed {
    fn log(&self) {
        tracing::error!(error_count = self.error_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::ERROR,
            "span_name",
            name = name,
            error_count = self.error_count,
        )
    }
}

/// The device graph described by a configuration is ready for traffic.
///
/// # Log Level
/// `info!` - Important operational event
pub struct FabricBuilt<'a> {
    pub bus: &'a str,
    pub routers: usize,
    pub services: usize,
    pub parallel: usize,
}

impl Display for FabricBuilt<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Fabric '{}' built with {} routers and {} services on {} pipelines",
            self.bus, self.routers, self.services, self.parallel
        )
    }
}

impl StructuredLog for FabricBuilt<'_> {
    fn log(&self) {
        tracing::info!(
            bus = self.bus,
            routers = self.routers,
            services = self.services,
            parallel = self.parallel,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("fabric", span_name = name, bus = self.bus)
    }
}
