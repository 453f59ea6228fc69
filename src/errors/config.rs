// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::{ComponentError, EncodingError};
use std::fmt;
use thiserror::Error;

/// Problems found while validating a fabric configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Two routers normalize to the same segment.
    DuplicateRouter {
        router: String,
    },
    /// Two services under one router normalize to the same segment.
    DuplicateService {
        router: String,
        service: String,
    },
    /// A service names a component the factory does not know.
    UnknownComponent {
        service: String,
        component: String,
    },
    /// A service references a codec that is not registered.
    UnknownEncoding {
        service: String,
        encoding: String,
    },
    /// A numeric setting is outside its allowed range.
    InvalidSetting {
        field: &'static str,
        reason: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::DuplicateRouter { router } => {
                write!(f, "Duplicate router name: '{}'", router)
            }
            ValidationError::DuplicateService { router, service } => {
                write!(
                    f,
                    "Router '{}' declares service '{}' more than once",
                    router, service
                )
            }
            ValidationError::UnknownComponent { service, component } => {
                write!(
                    f,
                    "Service '{}' uses component '{}' which does not exist",
                    service, component
                )
            }
            ValidationError::UnknownEncoding { service, encoding } => {
                write!(
                    f,
                    "Service '{}' uses encoding '{}' which is not registered",
                    service, encoding
                )
            }
            ValidationError::InvalidSetting { field, reason } => {
                write!(f, "Invalid setting '{}': {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Errors raised while loading a configuration or building a runtime from it.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unsupported config format: '{0}' (expected .yaml, .yml or .toml)")]
    UnsupportedFormat(String),

    #[error("Configuration validation failed:\n{}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Component(#[from] ComponentError),

    #[error("no Tokio runtime is running to host the fabric scheduler")]
    NoRuntime,
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
