// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::DEFAULT_BUS_NAME;
use crate::controller::TpsOptions;
use crate::coroutine::CoroutineOptions;
use crate::errors::ConfigError;
use crate::observability::messages::config::{ConfigLoaded, ValidationFailed};
use crate::observability::messages::StructuredLog;
use crate::scheduler::SchedulerOptions;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Complete description of a fabric: the bus, its routers and services, and
/// the tuning of the schedulers and coroutines that serve them.
///
/// # Fields
/// * `bus` - Name of the root bus (defaults to `bus`)
/// * `scheduler` - Options of the scheduler handlers publish their work on
/// * `tps` - Options of the TPS controller a commander owns
/// * `coroutine` - Options of the coroutine registry
/// * `reply_timeout_ms` - How long clients wait for a reply
/// * `routers` - Top-level routers, each with its services
///
/// # Example
/// ```yaml
/// bus: bus
/// scheduler: { backlog: 1024, parallel: 4, safety: true }
/// tps: { parallel: 1, parallel_tick_ms: 100, parallel_increase: 1, tps_limit: -1 }
/// coroutine: { timeout_ms: 30000 }
/// routers:
///   - name: "1.0.0"
///     services:
///       - name: try
///         component: try
///         encoding: json
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct FabricConfig {
    #[serde(default = "default_bus")]
    pub bus: String,
    #[serde(default)]
    pub scheduler: SchedulerOptions,
    #[serde(default)]
    pub tps: TpsOptions,
    #[serde(default)]
    pub coroutine: CoroutineOptions,
    #[serde(default = "default_reply_timeout_ms")]
    pub reply_timeout_ms: u64,
    #[serde(default)]
    pub routers: Vec<RouterConfig>,
}

impl FabricConfig {
    pub fn reply_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.reply_timeout_ms)
    }

    /// Every service in declaration order, paired with its router.
    pub fn services(&self) -> impl Iterator<Item = (&RouterConfig, &ServiceConfig)> {
        self.routers
            .iter()
            .flat_map(|router| router.services.iter().map(move |service| (router, service)))
    }
}

impl Default for FabricConfig {
    fn default() -> Self {
        Self {
            bus: default_bus(),
            scheduler: SchedulerOptions::default(),
            tps: TpsOptions::default(),
            coroutine: CoroutineOptions::default(),
            reply_timeout_ms: default_reply_timeout_ms(),
            routers: Vec::new(),
        }
    }
}

/// An intermediate device, typically a version such as `1.0.0`.
#[derive(Debug, Clone, Deserialize)]
pub struct RouterConfig {
    pub name: String,
    #[serde(default)]
    pub services: Vec<ServiceConfig>,
}

/// A built-in component bound under a name with a default encoding.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub component: String,
    #[serde(default = "default_encoding")]
    pub encoding: String,
}

fn default_bus() -> String {
    DEFAULT_BUS_NAME.to_string()
}

fn default_encoding() -> String {
    "json".to_string()
}

fn default_reply_timeout_ms() -> u64 {
    crate::config::consts::DEFAULT_REPLY_TIMEOUT_MS
}

/// Parse a configuration file; `.toml` files use TOML, `.yaml`/`.yml` YAML.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<FabricConfig, ConfigError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    let content = fs::read_to_string(path)?;

    let cfg: FabricConfig = match extension.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&content)?,
        "toml" => toml::from_str(&content)?,
        _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
    };

    ConfigLoaded {
        path: &path.display().to_string(),
        routers: cfg.routers.len(),
        services: cfg.services().count(),
    }
    .log();
    Ok(cfg)
}

pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<FabricConfig, ConfigError> {
    let cfg = load_config(path)?;

    if let Err(errors) = crate::config::validate_config(&cfg) {
        ValidationFailed {
            error_count: errors.len(),
        }
        .log();
        return Err(ConfigError::Validation(errors));
    }

    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parse_basic_yaml() {
        let yaml = r#"
routers:
  - name: "1.0.0"
    services:
      - name: try
        component: try
      - name: text
        component: text
        encoding: json.base64
"#;
        let cfg: FabricConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.bus, "bus");
        assert_eq!(cfg.routers.len(), 1);
        assert_eq!(cfg.routers[0].services[0].encoding, "json");
        assert_eq!(cfg.routers[0].services[1].encoding, "json.base64");
        assert_eq!(cfg.tps, TpsOptions::default());
        assert_eq!(cfg.coroutine.timeout_ms, 30_000);
        assert_eq!(cfg.services().count(), 2);
    }

    #[test]
    fn parse_partial_sections_keep_defaults() {
        let yaml = r#"
bus: backbone
scheduler: { parallel: 2 }
tps: { tps_limit: 20.0 }
"#;
        let cfg: FabricConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.bus, "backbone");
        assert_eq!(cfg.scheduler.parallel, 2);
        assert_eq!(cfg.scheduler.backlog, 1024);
        assert_eq!(cfg.tps.tps_limit, 20.0);
        assert_eq!(cfg.tps.parallel_tick_ms, 100);
        assert!(cfg.routers.is_empty());
    }

    #[test]
    fn load_yaml_and_toml_files() {
        let yaml = write_temp(
            ".yaml",
            "routers:\n  - name: v1\n    services:\n      - name: try\n        component: try\n",
        );
        let cfg = load_config(yaml.path()).unwrap();
        assert_eq!(cfg.routers[0].name, "v1");

        let toml = write_temp(
            ".toml",
            r#"
bus = "bus"

[scheduler]
parallel = 3

[[routers]]
name = "1.0.0"

[[routers.services]]
name = "text"
component = "text"
encoding = "yaml"
"#,
        );
        let cfg = load_config(toml.path()).unwrap();
        assert_eq!(cfg.scheduler.parallel, 3);
        assert_eq!(cfg.routers[0].services[0].component, "text");
        assert_eq!(cfg.routers[0].services[0].encoding, "yaml");
    }

    #[test]
    fn load_rejects_unknown_extension() {
        let file = write_temp(".ini", "bus = bus");
        let error = load_config(file.path()).unwrap_err();
        assert!(matches!(error, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn load_reports_missing_file() {
        let error = load_config("does/not/exist.yaml").unwrap_err();
        assert!(matches!(error, ConfigError::Io(_)));
    }

    #[test]
    fn load_and_validate_rejects_unknown_component() {
        let file = write_temp(
            ".yaml",
            "routers:\n  - name: v1\n    services:\n      - name: cache\n        component: redis\n",
        );
        let error = load_and_validate_config(file.path()).unwrap_err();
        let message = error.to_string();
        assert!(message.contains("Configuration validation failed"), "{}", message);
        assert!(message.contains("'redis'"), "{}", message);
    }
}
