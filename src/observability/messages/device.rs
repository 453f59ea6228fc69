// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the device graph.
//!
//! This module contains message types for logging events related to:
//! * Attaching devices to the graph and binding services
//! * Dispatching messages to handlers
//! * Handler failures and replies that could not be delivered

use crate::errors::RouteError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A device was attached below a parent.
///
/// # Log Level
/// `trace!` - Graph construction detail
///
/// # Example
/// ```
/// use the_switchyard::observability::messages::device::DeviceIntegrated;
///
/// let msg = DeviceIntegrated { parent: "Bus", child: "1.0.0" };
/// assert_eq!(msg.to_string(), "Device '1.0.0' integrated under 'Bus'");
/// ```
pub struct DeviceIntegrated<'a> {
    pub parent: &'a str,
    pub child: &'a str,
}

impl Display for DeviceIntegrated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Device '{}' integrated under '{}'", self.child, self.parent)
    }
}

impl StructuredLog for DeviceIntegrated<'_> {
    fn log(&self) {
        tracing::trace!(parent = self.parent, child = self.child, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!("device_integration", span_name = name, parent = self.parent, child = self.child)
    }
}

/// A component was bound as a service.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_switchyard::observability::messages::device::ServiceBound;
///
/// let handlers = ["Echo", "EchoBytes"];
/// let msg = ServiceBound { service: "Try", handlers: &handlers, encoding: "json" };
/// assert_eq!(msg.to_string(), "Service 'Try' bound with 2 handlers [Echo, EchoBytes] (encoding json)");
/// ```
pub struct ServiceBound<'a> {
    pub service: &'a str,
    pub handlers: &'a [&'a str],
    pub encoding: &'a str,
}

impl Display for ServiceBound<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Service '{}' bound with {} handlers [{}] (encoding {})",
            self.service,
            self.handlers.len(),
            self.handlers.join(", "),
            self.encoding
        )
    }
}

impl StructuredLog for ServiceBound<'_> {
    fn log(&self) {
        tracing::info!(
            service = self.service,
            handler_count = self.handlers.len(),
            handlers = self.handlers.join(","),
            encoding = self.encoding,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "service",
            span_name = name,
            service = self.service,
            encoding = self.encoding,
        )
    }
}

/// A handler accepted a message and published its work.
///
/// # Log Level
/// `trace!` - Emitted for every request
pub struct MessageDispatched<'a> {
    pub handler: &'a str,
    pub id: u64,
    pub route: &'a str,
}

impl Display for MessageDispatched<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Message {} dispatched to handler '{}' via {}", self.id, self.handler, self.route)
    }
}

impl StructuredLog for MessageDispatched<'_> {
    fn log(&self) {
        tracing::trace!(handler = self.handler, id = self.id, route = self.route, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!("dispatch", span_name = name, handler = self.handler, id = self.id)
    }
}

/// A handler method returned an error; the reply carries it.
///
/// # Log Level
/// `warn!` - The caller sees the failure, the fabric keeps running
///
/// # Example
/// ```
/// use the_switchyard::observability::messages::device::HandlerFailed;
///
/// let msg = HandlerFailed { handler: "Bus:1.0.0:Try:Echo", id: 4, error: "empty text" };
/// assert_eq!(msg.to_string(), "Handler 'Bus:1.0.0:Try:Echo' failed on message 4: empty text");
/// ```
pub struct HandlerFailed<'a> {
    pub handler: &'a str,
    pub id: u64,
    pub error: &'a str,
}

impl Display for HandlerFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Handler '{}' failed on message {}: {}", self.handler, self.id, self.error)
    }
}

impl StructuredLog for HandlerFailed<'_> {
    fn log(&self) {
        tracing::warn!(handler = self.handler, id = self.id, error = self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("handler", span_name = name, handler = self.handler, id = self.id)
    }
}

/// The reply to a message could not be routed back to its sender.
///
/// # Log Level
/// `error!` - The sender will never see an answer
pub struct ReplyUndeliverable<'a> {
    pub handler: &'a str,
    pub id: u64,
    pub error: &'a RouteError,
}

impl Display for ReplyUndeliverable<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Reply to message {} from '{}' could not be delivered: {}",
            self.id, self.handler, self.error
        )
    }
}

impl StructuredLog for ReplyUndeliverable<'_> {
    fn log(&self) {
        tracing::error!(
            handler = self.handler,
            id = self.id,
            error_kind = self.error.kind(),
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "reply",
            span_name = name,
            handler = self.handler,
            id = self.id,
            error_kind = self.error.kind(),
        )
    }
}

/// A reply reached the client that sent the request.
///
/// # Log Level
/// `trace!` - Emitted for every reply
pub struct ReplyReceived<'a> {
    pub client: &'a str,
    pub id: u64,
    pub failed: bool,
}

impl Display for ReplyReceived<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.failed {
            write!(f, "Client '{}' received failed reply to message {}", self.client, self.id)
        } else {
            write!(f, "Client '{}' received reply to message {}", self.client, self.id)
        }
    }
}

impl StructuredLog for ReplyReceived<'_> {
    fn log(&self) {
        tracing::trace!(client = self.client, id = self.id, failed = self.failed, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!("reply", span_name = name, client = self.client, id = self.id)
    }
}

/// A hole swallowed a message.
///
/// # Log Level
/// `debug!`
pub struct MessageDiscarded<'a> {
    pub device: &'a str,
    pub id: u64,
}

impl Display for MessageDiscarded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Message {} discarded by '{}'", self.id, self.device)
    }
}

impl StructuredLog for MessageDiscarded<'_> {
    fn log(&self) {
        tracing::debug!(device = self.device, id = self.id, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("discard", span_name = name, device = self.device, id = self.id)
    }
}
