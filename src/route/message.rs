// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::Route;
use crate::encoding::Chain;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_MESSAGE_ID: AtomicU64 = AtomicU64::new(1);

/// The envelope moved through the device graph.
///
/// `data` is valid under `encoding`. Only `route` changes while the message
/// travels; replies keep the request id so that clients can match them.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: u64,
    pub route: Route,
    pub encoding: Chain,
    pub data: Vec<u8>,
    /// Set on replies whose handler failed.
    pub error: Option<String>,
}

impl Message {
    pub fn new(route: Route, encoding: Chain, data: Vec<u8>) -> Self {
        Self {
            id: Self::next_id(),
            route,
            encoding,
            data,
            error: None,
        }
    }

    /// Allocate a process-wide unique message id.
    pub fn next_id() -> u64 {
        NEXT_MESSAGE_ID.fetch_add(1, Ordering::Relaxed)
    }

    pub fn with_route(mut self, route: Route) -> Self {
        self.route = route;
        self
    }

    /// A reply travelling back along the reversed route.
    pub fn reply(&self, data: Vec<u8>) -> Message {
        Message {
            id: self.id,
            route: self.route.reverse(),
            encoding: self.encoding.clone(),
            data,
            error: None,
        }
    }

    /// A reply that carries a handler failure instead of data.
    pub fn failure(&self, error: impl Into<String>) -> Message {
        Message {
            id: self.id,
            route: self.route.reverse(),
            encoding: self.encoding.clone(),
            data: Vec::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
