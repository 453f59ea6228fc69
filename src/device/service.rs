// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::binding::Handlers;
use super::{Dispatcher, DeviceCore, Handler};
use crate::encoding::Chain;
use crate::observability::messages::device::ServiceBound;
use crate::observability::messages::StructuredLog;
use crate::traits::{Component, Device};
use std::sync::{Arc, Weak};

/// A router whose children are the handlers of a bound [`Component`].
///
/// Inbound, a service routes like any intermediate device. Its handlers use
/// the service's encoding when a message arrives without one, and publish
/// their work on the scheduler its dispatcher selects.
pub struct Service<C: Component> {
    core: DeviceCore,
    component: Arc<C>,
    encoding: Chain,
    dispatcher: Dispatcher,
}

impl<C: Component> Service<C> {
    /// Bind `component`: one handler child per registered method.
    pub fn new(name: &str, component: C, encoding: Chain, dispatcher: Dispatcher) -> Arc<Self> {
        let service = Arc::new_cyclic(|this: &Weak<Self>| Service {
            core: DeviceCore::new(name, this.clone()),
            component: Arc::new(component),
            encoding,
            dispatcher,
        });

        let methods = Handlers::<C>::collect().into_methods();
        let names: Vec<&str> = methods.iter().map(|(name, _)| name.as_str()).collect();
        ServiceBound {
            service: service.name(),
            handlers: &names,
            encoding: &service.encoding.to_string(),
        }
        .log();

        for (method, invoke) in methods {
            service.integrate(Handler::new(
                method,
                Arc::clone(&service.component),
                invoke,
                service.encoding.clone(),
                service.dispatcher.clone(),
            ));
        }
        service
    }

    pub fn component(&self) -> &Arc<C> {
        &self.component
    }

    pub fn encoding(&self) -> &Chain {
        &self.encoding
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Names of the handler children, sorted.
    pub fn handler_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.children().into_keys().collect();
        names.sort();
        names
    }
}

impl<C: Component> Device for Service<C> {
    fn core(&self) -> &DeviceCore {
        &self.core
    }
}
