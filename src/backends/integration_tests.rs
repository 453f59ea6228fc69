// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::local::{ComponentFactory, Text, TokenCount};
use crate::config::ServiceConfig;
use crate::context::Context;
use crate::device::{Bus, ChannelProcessor, Client, Dispatcher, Router};
use crate::encoding::{Chain, Codec};
use crate::traits::Device;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

const WAIT: Duration = Duration::from_secs(5);

fn fabric(processor: Option<Arc<dyn crate::traits::Processor>>) -> (Arc<Bus>, Arc<Client>) {
    let bus = Bus::new("bus");
    let version = Router::new("1.0.0");
    for (name, component) in [("try", "try"), ("text", "text")] {
        let config = ServiceConfig {
            name: name.to_string(),
            component: component.to_string(),
            encoding: "json".to_string(),
        };
        version.integrate(ComponentFactory::bind(&config, Dispatcher::default()).unwrap());
    }
    bus.integrate(version);
    let client = Client::new("client", processor);
    bus.integrate(client.clone());
    (bus, client)
}

#[tokio::test]
async fn test_try_echo_through_json_base64_lazy() {
    let (tx, mut rx) = mpsc::channel(1);
    let (_bus, client) = fabric(Some(ChannelProcessor::new(tx)));

    let msg = client
        .message("/1.0.0/try/echo", Chain::parse("json.base64.lazy").unwrap(), &Text::new("hi"))
        .unwrap();
    client.invoke(&Context::new(), msg, None).await.unwrap();

    let reply = tokio::time::timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    let text: Text = reply.encoding.reverse().unmarshal(&reply.data).unwrap();
    assert_eq!(text, Text::new("hi"));
}

#[tokio::test]
async fn test_try_echo_bytes_through_base64() {
    let (_bus, client) = fabric(None);

    let reply: Vec<u8> = client
        .call(
            &Context::new(),
            "/1.0.0/try/echo-bytes",
            Chain::parse("base64").unwrap(),
            &b"hello, world".to_vec(),
            WAIT,
        )
        .await
        .unwrap();
    assert_eq!(reply, b"hello, world");
}

#[tokio::test]
async fn test_text_service_over_several_encodings() {
    let (_bus, client) = fabric(None);
    let ctx = Context::new();

    for encoding in ["json", "yaml", "xml", "protobuf", "json.base64"] {
        let upper: Text = client
            .call(&ctx, "/1.0.0/text/upper", Chain::parse(encoding).unwrap(), &Text::new("quiet"), WAIT)
            .await
            .unwrap();
        assert_eq!(upper.text, "QUIET", "encoding {}", encoding);
    }

    let count: TokenCount = client
        .call(
            &ctx,
            "/1.0.0/text/count-tokens",
            Chain::single(Codec::Json),
            &Text::new("one two three"),
            WAIT,
        )
        .await
        .unwrap();
    assert_eq!(count.words, 3);
    assert_eq!(count.chars, 13);
}
