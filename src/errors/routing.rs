// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while walking a message through the device graph.

use crate::errors::{EncodingError, SchedulerError};
use thiserror::Error;

/// Routing failures returned synchronously from `Device::process`.
#[derive(Debug, Error)]
pub enum RouteError {
    /// Dispatching ran past the last destination segment.
    #[error("route dead end at '{device}': {route}")]
    DeadEnd { device: String, route: String },

    /// The destination names a child that is not attached to the graph.
    #[error("missing device '{name}' under '{device}': {route}")]
    MissingDevice {
        device: String,
        name: String,
        route: String,
    },

    /// An assembling message reached a device without a parent.
    #[error("gateway not found for '{device}': {route}")]
    GatewayNotFound { device: String, route: String },

    /// A reply reached a client that has no processor for it.
    #[error("no processor registered on '{device}' for message {id}")]
    MissingProcessor { device: String, id: u64 },

    /// A client gave up waiting for a reply.
    #[error("reply to message {id} timed out")]
    ReplyTimeout { id: u64 },

    /// The reply carried an error produced by the remote handler.
    #[error("handler failed: {0}")]
    Remote(String),

    /// Handing work to the dispatcher's scheduler failed.
    #[error("dispatch failed: {0}")]
    Dispatch(#[from] SchedulerError),

    /// Payload conversion failed on the way in or out of a device.
    #[error("encoding failed: {0}")]
    Encoding(#[from] EncodingError),

    /// Any other error annotated with the route it happened on.
    #[error("{source} (route {route})")]
    Wrapped {
        route: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl RouteError {
    /// Short stable identifier, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            RouteError::DeadEnd { .. } => "route_dead_end",
            RouteError::MissingDevice { .. } => "route_missing_device",
            RouteError::GatewayNotFound { .. } => "gateway_not_found",
            RouteError::MissingProcessor { .. } => "missing_processor",
            RouteError::ReplyTimeout { .. } => "reply_timeout",
            RouteError::Remote(_) => "remote",
            RouteError::Dispatch(_) => "dispatch",
            RouteError::Encoding(_) => "encoding",
            RouteError::Wrapped { .. } => "wrapped",
        }
    }
}
