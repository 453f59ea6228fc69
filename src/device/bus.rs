// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::DeviceCore;
use crate::config::consts::DEFAULT_BUS_NAME;
use crate::context::Context;
use crate::errors::RouteError;
use crate::route::Message;
use crate::traits::Device;
use async_trait::async_trait;
use std::sync::{Arc, OnceLock, Weak};

/// The root of a device graph and the entry point of new messages.
///
/// A bus never walks up: an assembling message whose destination starts at
/// this bus is advanced and routed to the bus's own children.
pub struct Bus {
    core: DeviceCore,
}

impl Bus {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new_cyclic(|this: &Weak<Self>| Bus {
            core: DeviceCore::new(name, this.clone()),
        })
    }
}

#[async_trait]
impl Device for Bus {
    fn core(&self) -> &DeviceCore {
        &self.core
    }

    async fn process(&self, ctx: &Context, msg: Message) -> Result<(), RouteError> {
        if msg.route.assembling() && msg.route.position() != Some(self.name()) {
            return Err(RouteError::MissingDevice {
                device: self.name().to_string(),
                name: msg.route.position().unwrap_or_default().to_string(),
                route: msg.route.to_string(),
            });
        }
        self.core.descend(ctx, msg).await
    }
}

/// The process-wide bus.
pub fn bus() -> Arc<Bus> {
    static BUS: OnceLock<Arc<Bus>> = OnceLock::new();
    Arc::clone(BUS.get_or_init(|| Bus::new(DEFAULT_BUS_NAME)))
}
