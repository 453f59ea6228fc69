// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::components::{TextTools, Try};
use crate::config::ServiceConfig;
use crate::device::{Dispatcher, Service};
use crate::encoding::Chain;
use crate::errors::ComponentError;
use crate::traits::Device;
use std::sync::Arc;

/// Binds built-in components as services.
pub struct ComponentFactory;

impl ComponentFactory {
    /// Build the service a configuration entry describes.
    ///
    /// The `component` field selects the implementation:
    /// - "try" -> [`Try`] (`echo`, `echo-bytes`)
    /// - "text" -> [`TextTools`] (`upper`, `lower`, `reverse`, `title`, `count-tokens`)
    pub fn bind(config: &ServiceConfig, dispatcher: Dispatcher) -> Result<Arc<dyn Device>, ComponentError> {
        let encoding = Chain::parse(&config.encoding).map_err(|e| ComponentError::BindingFailed {
            service: config.name.clone(),
            component: config.component.clone(),
            reason: e.to_string(),
        })?;

        match config.component.to_lowercase().as_str() {
            "try" => Ok(Service::new(&config.name, Try, encoding, dispatcher)),
            "text" => Ok(Service::new(&config.name, TextTools, encoding, dispatcher)),
            _ => Err(ComponentError::UnknownComponent {
                service: config.name.clone(),
                component: config.component.clone(),
            }),
        }
    }

    pub fn list_available_components() -> Vec<&'static str> {
        vec!["try", "text"]
    }

    pub fn is_component_available(component: &str) -> bool {
        Self::list_available_components().contains(&component.to_lowercase().as_str())
    }
}
