// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::address::{normalize, Separator};
use crate::backends::local::ComponentFactory;
use crate::config::FabricConfig;
use crate::encoding::Chain;
use crate::errors::ValidationError;
use crate::observability::messages::config::{ValidationCompleted, ValidationStarted};
use crate::observability::messages::StructuredLog;
use std::collections::HashSet;

/// Check a fabric configuration before anything is built from it.
///
/// Names are compared after normalization, so `try` and `Try` collide just
/// as they would in the device graph. Every problem is collected; the
/// function does not stop at the first one.
pub fn validate_config(cfg: &FabricConfig) -> Result<(), Vec<ValidationError>> {
    ValidationStarted {
        routers: cfg.routers.len(),
        services: cfg.services().count(),
    }
    .log();

    let mut errors = validate_settings(cfg);

    let mut routers = HashSet::new();
    for router in &cfg.routers {
        if !routers.insert(normalize(&router.name, Separator::Dash)) {
            errors.push(ValidationError::DuplicateRouter {
                router: router.name.clone(),
            });
        }

        let mut services = HashSet::new();
        for service in &router.services {
            if !services.insert(normalize(&service.name, Separator::Dash)) {
                errors.push(ValidationError::DuplicateService {
                    router: router.name.clone(),
                    service: service.name.clone(),
                });
            }
            if !ComponentFactory::is_component_available(&service.component) {
                errors.push(ValidationError::UnknownComponent {
                    service: service.name.clone(),
                    component: service.component.clone(),
                });
            }
            if Chain::parse(&service.encoding).is_err() {
                errors.push(ValidationError::UnknownEncoding {
                    service: service.name.clone(),
                    encoding: service.encoding.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        ValidationCompleted {
            routers: cfg.routers.len(),
            services: cfg.services().count(),
        }
        .log();
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_settings(cfg: &FabricConfig) -> Vec<ValidationError> {
    let positive = [
        ("scheduler.parallel", cfg.scheduler.parallel as u64),
        ("scheduler.backlog", cfg.scheduler.backlog as u64),
        ("tps.parallel", cfg.tps.parallel as u64),
        ("tps.parallel_tick_ms", cfg.tps.parallel_tick_ms),
        ("tps.task_backlog", cfg.tps.task_backlog as u64),
        ("tps.parallel_backlog", cfg.tps.parallel_backlog as u64),
        ("tps.report_backlog", cfg.tps.report_backlog as u64),
        ("coroutine.timeout_ms", cfg.coroutine.timeout_ms),
        ("reply_timeout_ms", cfg.reply_timeout_ms),
    ];

    let mut errors: Vec<ValidationError> = positive
        .into_iter()
        .filter(|(_, value)| *value == 0)
        .map(|(field, _)| ValidationError::InvalidSetting {
            field,
            reason: "must be greater than zero".to_string(),
        })
        .collect();

    if cfg.tps.tps_limit.is_nan() {
        errors.push(ValidationError::InvalidSetting {
            field: "tps.tps_limit",
            reason: "must be a number; use a negative value for unlimited".to_string(),
        });
    }
    if cfg.bus.trim().is_empty() {
        errors.push(ValidationError::InvalidSetting {
            field: "bus",
            reason: "must not be empty".to_string(),
        });
    }
    errors
}
