// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for binding built-in components into services.

use std::error::Error;
use std::fmt;

/// Errors that can occur while the component factory builds a service
#[derive(Debug)]
pub enum ComponentError {
    /// The configuration names a component that is not built in
    UnknownComponent { service: String, component: String },

    /// The component exists but the service could not be bound
    BindingFailed {
        service: String,
        component: String,
        reason: String,
    },
}

impl fmt::Display for ComponentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentError::UnknownComponent { service, component } => {
                write!(
                    f,
                    "Component '{}' for service '{}' is not available. Known components: {}",
                    component,
                    service,
                    crate::backends::local::ComponentFactory::list_available_components().join(", ")
                )
            }
            ComponentError::BindingFailed {
                service,
                component,
                reason,
            } => {
                write!(
                    f,
                    "Failed to bind component '{}' as service '{}': {}",
                    component, service, reason
                )
            }
        }
    }
}

impl Error for ComponentError {}
