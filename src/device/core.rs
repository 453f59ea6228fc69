// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::address::{normalize, Address, Separator};
use crate::context::Context;
use crate::errors::RouteError;
use crate::observability::messages::device::DeviceIntegrated;
use crate::observability::messages::StructuredLog;
use crate::route::{Message, Route};
use crate::traits::Device;
use rand::seq::SliceRandom;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, Weak};

/// State and tree operations shared by every device.
///
/// `this` points back at the device that owns the core so that `integrate`
/// can hand children a gateway reference. Gateways are weak: a parent owns its
/// children, never the other way round.
pub struct DeviceCore {
    name: String,
    this: Weak<dyn Device>,
    gateway: RwLock<Option<Weak<dyn Device>>>,
    children: RwLock<HashMap<String, Vec<Arc<dyn Device>>>>,
}

impl DeviceCore {
    /// `name` is normalized the same way route segments are.
    pub fn new(name: &str, this: Weak<dyn Device>) -> Self {
        Self::normalized(normalize(name, Separator::Dash), this)
    }

    /// A core for a name that is already in normalized form, such as a
    /// handler name produced at registration. Normalizing twice would fold
    /// `EchoBytes` into `Echobytes`.
    pub fn normalized(name: String, this: Weak<dyn Device>) -> Self {
        Self {
            name,
            this,
            gateway: RwLock::new(None),
            children: RwLock::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn gateway(&self) -> Option<Arc<dyn Device>> {
        self.gateway
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(Weak::upgrade)
    }

    pub fn set_gateway(&self, gateway: Weak<dyn Device>) {
        *self.gateway.write().unwrap_or_else(PoisonError::into_inner) = Some(gateway);
    }

    pub fn integrate(&self, child: Arc<dyn Device>) {
        child.set_gateway(self.this.clone());
        DeviceIntegrated {
            parent: &self.name,
            child: child.name(),
        }
        .log();
        self.children
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(child.name().to_string())
            .or_default()
            .push(child);
    }

    pub fn locate(&self, name: &str) -> Option<Arc<dyn Device>> {
        self.children
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .and_then(|candidates| candidates.choose(&mut rand::thread_rng()))
            .cloned()
    }

    pub fn children(&self) -> HashMap<String, Vec<Arc<dyn Device>>> {
        self.children
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn address(&self) -> Address {
        let mut names = vec![self.name.clone()];
        let mut next = self.gateway();
        while let Some(device) = next {
            names.push(device.name().to_string());
            next = device.gateway();
        }
        names.reverse();
        Address(names)
    }

    /// Default routing: bubble up while assembling, descend while dispatching.
    pub async fn relay(&self, ctx: &Context, msg: Message) -> Result<(), RouteError> {
        if msg.route.assembling() {
            self.ascend(ctx, msg).await
        } else {
            self.descend(ctx, msg).await
        }
    }

    /// Hand `msg` unchanged to the gateway.
    pub async fn ascend(&self, ctx: &Context, msg: Message) -> Result<(), RouteError> {
        match self.gateway() {
            Some(gateway) => gateway.process(ctx, msg).await,
            None => Err(RouteError::GatewayNotFound {
                device: self.name.clone(),
                route: msg.route.to_string(),
            }),
        }
    }

    /// Advance the route and hand `msg` to the child under the cursor.
    pub async fn descend(&self, ctx: &Context, msg: Message) -> Result<(), RouteError> {
        if msg.route.at_end() {
            return Err(RouteError::DeadEnd {
                device: self.name.clone(),
                route: msg.route.to_string(),
            });
        }
        let route = msg.route.forward();
        let name = route.position().unwrap_or_default().to_string();
        let child = self.locate(&name).ok_or_else(|| RouteError::MissingDevice {
            device: self.name.clone(),
            name,
            route: route.to_string(),
        })?;
        child.process(ctx, msg.with_route(route)).await
    }

    /// Check that a dispatching route ends exactly at this leaf.
    pub fn arrive(&self, route: &Route) -> Result<(), RouteError> {
        if route.position() != Some(self.name.as_str()) {
            return Err(RouteError::MissingDevice {
                device: self.name.clone(),
                name: route.position().unwrap_or_default().to_string(),
                route: route.to_string(),
            });
        }
        if !route.at_end() {
            let next = route.dst.segments().get(route.index() + 1).cloned().unwrap_or_default();
            return Err(RouteError::MissingDevice {
                device: self.name.clone(),
                name: next,
                route: route.to_string(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for DeviceCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let children = self.children.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("DeviceCore")
            .field("name", &self.name)
            .field("children", &children.keys().collect::<Vec<_>>())
            .finish()
    }
}
