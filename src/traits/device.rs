// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::address::Address;
use crate::context::Context;
use crate::device::DeviceCore;
use crate::errors::RouteError;
use crate::route::Message;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

/// A node of the device graph.
///
/// Implementors only provide [`core`](Device::core); the tree operations and
/// the default routing behaviour come from [`DeviceCore`]. Devices with
/// their own semantics (bus, handler, client, hole) override
/// [`process`](Device::process).
#[async_trait]
pub trait Device: Send + Sync {
    fn core(&self) -> &DeviceCore;

    /// Normalized name; the segment a route uses to reach this device.
    fn name(&self) -> &str {
        self.core().name()
    }

    fn gateway(&self) -> Option<Arc<dyn Device>> {
        self.core().gateway()
    }

    fn set_gateway(&self, gateway: Weak<dyn Device>) {
        self.core().set_gateway(gateway)
    }

    /// Attach `child` below this device and make this device its gateway.
    fn integrate(&self, child: Arc<dyn Device>) {
        self.core().integrate(child)
    }

    /// A child named `name`, chosen at random among duplicates.
    fn locate(&self, name: &str) -> Option<Arc<dyn Device>> {
        self.core().locate(name)
    }

    fn children(&self) -> HashMap<String, Vec<Arc<dyn Device>>> {
        self.core().children()
    }

    /// Names from the root down to this device.
    fn address(&self) -> Address {
        self.core().address()
    }

    /// Route `msg` one step: up through the gateway while assembling, down to
    /// the next child while dispatching.
    async fn process(&self, ctx: &Context, msg: Message) -> Result<(), RouteError> {
        self.core().relay(ctx, msg).await
    }
}
