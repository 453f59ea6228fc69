// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod integration_tests {
    use crate::backends::local::{Text, TokenCount};
    use crate::config::{load_and_validate_config, RuntimeBuilder};
    use crate::context::Context;
    use crate::encoding::Chain;
    use crate::errors::{ConfigError, RouteError};
    use crate::traits::Device;

    /// The shipped YAML configuration parses and validates.
    #[test]
    fn test_fabric_yaml_loading() {
        let config = load_and_validate_config("configs/fabric.yaml").unwrap();

        assert_eq!(config.bus, "bus");
        assert_eq!(config.scheduler.parallel, 2);
        assert!(config.scheduler.safety);
        assert!(config.tps.is_unlimited());
        assert_eq!(config.routers.len(), 2);
        assert_eq!(config.routers[0].name, "1.0.0");
        assert_eq!(config.routers[1].services[0].encoding, "json.base64");
    }

    /// The TOML variant describes the same graph with a TPS limit.
    #[test]
    fn test_fabric_toml_loading() {
        let yaml = load_and_validate_config("configs/fabric.yaml").unwrap();
        let toml = load_and_validate_config("configs/fabric.toml").unwrap();

        assert_eq!(toml.tps.tps_limit, 20.0);
        assert_eq!(toml.scheduler, yaml.scheduler);
        let names = |cfg: &crate::config::FabricConfig| {
            cfg.services()
                .map(|(router, service)| format!("{}/{}", router.name, service.name))
                .collect::<Vec<_>>()
        };
        assert_eq!(names(&toml), names(&yaml));
    }

    /// A runtime built from the YAML file answers requests end to end.
    #[tokio::test]
    async fn test_runtime_from_yaml_serves_requests() {
        let config = load_and_validate_config("configs/fabric.yaml").unwrap();
        let fabric = RuntimeBuilder::from_config(&config).unwrap();
        let client = fabric.client("cli", None);
        let ctx = Context::new();

        assert_eq!(fabric.bus().children().len(), 3);

        let echoed: Text = client
            .call(&ctx, "/1.0.0/try/echo", Chain::parse("json").unwrap(), &Text::new("hi"), fabric.reply_timeout())
            .await
            .unwrap();
        assert_eq!(echoed.text, "hi");

        let count: TokenCount = client
            .call(
                &ctx,
                "tools/text/count-tokens",
                Chain::parse("json.base64").unwrap(),
                &Text::new("a b c d"),
                fabric.reply_timeout(),
            )
            .await
            .unwrap();
        assert_eq!(count.words, 4);

        let missing = client
            .call::<Text, Text>(&ctx, "/2.0.0/try/echo", Chain::parse("json").unwrap(), &Text::new("x"), fabric.reply_timeout())
            .await
            .unwrap_err();
        assert!(matches!(missing, RouteError::MissingDevice { .. }));

        fabric.close().await;
        assert!(fabric.scheduler().is_closed());
    }

    /// Building outside of a Tokio runtime is an error, not a panic.
    #[test]
    fn test_runtime_needs_tokio() {
        let config = load_and_validate_config("configs/fabric.yaml").unwrap();
        let error = RuntimeBuilder::from_config(&config).err().unwrap();
        assert!(matches!(error, ConfigError::NoRuntime));
    }
}
