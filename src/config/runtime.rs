// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::backends::local::ComponentFactory;
use crate::config::FabricConfig;
use crate::device::{Bus, Client, Dispatcher, Router};
use crate::errors::ConfigError;
use crate::observability::messages::config::FabricBuilt;
use crate::observability::messages::StructuredLog;
use crate::scheduler::Scheduler;
use crate::traits::{Device, Processor};
use std::sync::Arc;
use std::time::Duration;

/// A device graph built from configuration, with the scheduler its handlers
/// publish on.
pub struct Fabric {
    config: FabricConfig,
    bus: Arc<Bus>,
    scheduler: Scheduler,
}

impl Fabric {
    pub fn config(&self) -> &FabricConfig {
        &self.config
    }

    pub fn bus(&self) -> &Arc<Bus> {
        &self.bus
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn reply_timeout(&self) -> Duration {
        self.config.reply_timeout()
    }

    /// A new client attached directly under the bus.
    pub fn client(&self, name: &str, processor: Option<Arc<dyn Processor>>) -> Arc<Client> {
        let client = Client::new(name, processor);
        self.bus.integrate(client.clone());
        client
    }

    /// Stop the scheduler; queued handler work is abandoned.
    pub async fn close(&self) {
        self.scheduler.close().await;
    }
}

/// Fabric builder - turns a [`FabricConfig`] into a running device graph.
///
/// # Examples
///
/// ```
/// use the_switchyard::config::{FabricConfig, RouterConfig, RuntimeBuilder, ServiceConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = FabricConfig {
///     routers: vec![RouterConfig {
///         name: "1.0.0".to_string(),
///         services: vec![ServiceConfig {
///             name: "try".to_string(),
///             component: "try".to_string(),
///             encoding: "json".to_string(),
///         }],
///     }],
///     ..FabricConfig::default()
/// };
///
/// let fabric = RuntimeBuilder::from_config(&config)?;
/// assert_eq!(fabric.scheduler().options().parallel, config.scheduler.parallel);
/// fabric.close().await;
/// # Ok(())
/// # }
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    /// Build the bus, start the dispatching scheduler on the current Tokio
    /// runtime and bind every configured service.
    ///
    /// The configuration is expected to be validated already; binding errors
    /// are still reported rather than skipped.
    pub fn from_config(cfg: &FabricConfig) -> Result<Fabric, ConfigError> {
        let handle = tokio::runtime::Handle::try_current().map_err(|_| ConfigError::NoRuntime)?;

        let scheduler = Scheduler::new(cfg.scheduler.clone());
        let bus = Bus::new(&cfg.bus);
        let dispatcher = Dispatcher::fixed(scheduler.clone());

        for router_cfg in &cfg.routers {
            let router = Router::new(&router_cfg.name);
            for service_cfg in &router_cfg.services {
                router.integrate(ComponentFactory::bind(service_cfg, dispatcher.clone())?);
            }
            bus.integrate(router);
        }

        scheduler.start_on(&handle);
        FabricBuilt {
            bus: bus.name(),
            routers: cfg.routers.len(),
            services: cfg.services().count(),
            parallel: cfg.scheduler.parallel,
        }
        .log();

        Ok(Fabric {
            config: cfg.clone(),
            bus,
            scheduler,
        })
    }
}
