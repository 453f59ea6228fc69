// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::*;
use crate::context::Context;
use crate::encoding::{Chain, Codec, Record};
use crate::errors::RouteError;
use crate::route::{Message, Route};
use crate::scheduler::{Report, Scheduler, TaskState};
use crate::traits::{Component, Device};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

const WAIT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Text {
    text: String,
}
impl Record for Text {}

struct Echo;

impl Component for Echo {
    fn register(handlers: &mut Handlers<Self>) {
        handlers
            .handle("echo", |_: Arc<Echo>, _, req: Text| async move { Ok(req) })
            .handle("echo_bytes", |_: Arc<Echo>, _, req: Vec<u8>| async move { Ok(req) })
            .handle("refuse", |_: Arc<Echo>, _, _req: Text| async move {
                Err::<Text, _>(anyhow::anyhow!("refusing to echo"))
            })
            .handle("stall", |_: Arc<Echo>, _, req: Text| async move {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(req)
            });
    }
}

struct Tagged(&'static str);

impl Component for Tagged {
    fn register(handlers: &mut Handlers<Self>) {
        handlers.handle("whoami", |me: Arc<Tagged>, _, _req: Text| async move {
            Ok(Text {
                text: me.0.to_string(),
            })
        });
    }
}

/// bus ─┬─ 1.0.0 ── try ── {echo, echo-bytes, refuse, stall}
///      └─ client
fn topology(dispatcher: Dispatcher, processor: Option<Arc<dyn crate::traits::Processor>>) -> (Arc<Bus>, Arc<Client>) {
    let bus = Bus::new("bus");
    let version = Router::new("1.0.0");
    version.integrate(Service::new("try", Echo, Chain::single(Codec::Json), dispatcher));
    bus.integrate(version);
    let client = Client::new("client", processor);
    bus.integrate(client.clone());
    (bus, client)
}

#[tokio::test]
async fn test_echo_reaches_client_processor() {
    let (tx, mut rx) = mpsc::channel(4);
    let (_bus, client) = topology(Dispatcher::default(), Some(ChannelProcessor::new(tx)));

    let chain = Chain::parse("json.base64.lazy").unwrap();
    let msg = client
        .message("/1.0.0/try/echo", chain, &Text { text: "hi".to_string() })
        .unwrap();
    client.invoke(&Context::new(), msg, None).await.unwrap();

    let reply = tokio::time::timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert!(!reply.is_error());
    let text: Text = reply.encoding.reverse().unmarshal(&reply.data).unwrap();
    assert_eq!(text.text, "hi");
}

#[tokio::test]
async fn test_echo_bytes_with_base64() {
    let (_bus, client) = topology(Dispatcher::default(), None);

    let reply: Vec<u8> = client
        .call(
            &Context::new(),
            "/1.0.0/try/echo-bytes",
            Chain::single(Codec::Base64 { url: false }),
            &b"hello, world".to_vec(),
            WAIT,
        )
        .await
        .unwrap();
    assert_eq!(reply, b"hello, world");
    assert_eq!(client.in_flight(), 0);
}

#[tokio::test]
async fn test_message_without_encoding_uses_service_encoding() {
    let (_bus, client) = topology(Dispatcher::default(), None);

    let mut msg = client
        .message("/1.0.0/try/echo", Chain::single(Codec::Json), &Text { text: "plain".to_string() })
        .unwrap();
    msg.encoding = Chain::default();
    let reply = client.request(&Context::new(), msg, WAIT).await.unwrap();

    assert_eq!(reply.encoding.to_string(), Chain::single(Codec::Json).to_string());
    let text: Text = reply.encoding.reverse().unmarshal(&reply.data).unwrap();
    assert_eq!(text.text, "plain");
}

#[tokio::test]
async fn test_unknown_method_is_missing_device_at_service() {
    let (_bus, client) = topology(Dispatcher::default(), None);

    let msg = client
        .message("/1.0.0/try/does-not-exist", Chain::single(Codec::Json), &Text { text: "x".to_string() })
        .unwrap();
    let error = client.invoke(&Context::new(), msg, None).await.unwrap_err();

    match error {
        RouteError::MissingDevice { device, name, .. } => {
            assert_eq!(device, "Try");
            assert_eq!(name, "DoesNotExist");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(client.in_flight(), 0);
}

#[tokio::test]
async fn test_handler_error_comes_back_as_remote() {
    let (_bus, client) = topology(Dispatcher::default(), None);

    let error = client
        .call::<Text, Text>(
            &Context::new(),
            "/1.0.0/try/refuse",
            Chain::single(Codec::Json),
            &Text { text: "x".to_string() },
            WAIT,
        )
        .await
        .unwrap_err();
    match error {
        RouteError::Remote(reason) => assert!(reason.contains("refusing to echo"), "{}", reason),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_route_ending_at_service_is_dead_end() {
    let (_bus, client) = topology(Dispatcher::default(), None);

    let msg = client
        .message("/1.0.0/try", Chain::single(Codec::Json), &Text { text: "x".to_string() })
        .unwrap();
    let error = client.invoke(&Context::new(), msg, None).await.unwrap_err();
    assert!(matches!(error, RouteError::DeadEnd { ref device, .. } if device == "Try"), "{:?}", error);
}

#[tokio::test]
async fn test_route_past_handler_is_missing_device() {
    let (_bus, client) = topology(Dispatcher::default(), None);

    let msg = client
        .message("/1.0.0/try/echo/deeper", Chain::single(Codec::Json), &Text { text: "x".to_string() })
        .unwrap();
    let error = client.invoke(&Context::new(), msg, None).await.unwrap_err();
    assert!(
        matches!(error, RouteError::MissingDevice { ref name, .. } if name == "Deeper"),
        "{:?}",
        error
    );
}

#[tokio::test]
async fn test_detached_client_has_no_gateway() {
    let client = Client::new("loner", None);
    let msg = client
        .message("/1.0.0/try/echo", Chain::single(Codec::Json), &Text { text: "x".to_string() })
        .unwrap();

    let error = client.request(&Context::new(), msg, WAIT).await.unwrap_err();
    assert!(matches!(error, RouteError::GatewayNotFound { .. }), "{:?}", error);
    assert_eq!(client.in_flight(), 0);
}

#[tokio::test]
async fn test_bus_rejects_foreign_root() {
    let (bus, client) = topology(Dispatcher::default(), None);

    let msg = Message::new(
        Route::new(client.address(), "/elsewhere/1.0.0/try/echo"),
        Chain::single(Codec::Json),
        Vec::new(),
    );
    let error = bus.process(&Context::new(), msg).await.unwrap_err();
    match error {
        RouteError::MissingDevice { device, name, .. } => {
            assert_eq!(device, "Bus");
            assert_eq!(name, "Elsewhere");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_hole_swallows_messages() {
    let (bus, client) = topology(Dispatcher::default(), None);
    bus.integrate(Hole::new("sink"));

    let msg = client
        .message("/sink", Chain::single(Codec::Json), &Text { text: "gone".to_string() })
        .unwrap();
    client.invoke(&Context::new(), msg, None).await.unwrap();
    assert_eq!(client.in_flight(), 0);
}

#[test]
fn test_addresses_run_from_root_to_device() {
    let (bus, client) = topology(Dispatcher::default(), None);

    assert_eq!(client.address().to_string(), "Bus:Client");
    let version = bus.locate("1.0.0").unwrap();
    let service = version.locate("Try").unwrap();
    let echo = service.locate("EchoBytes").unwrap();
    assert_eq!(echo.address().to_string(), "Bus:1.0.0:Try:EchoBytes");
    assert!(bus.gateway().is_none());
    assert_eq!(client.destination("1.0.0/try/echo").to_string(), "Bus:1.0.0:Try:Echo");
    assert_eq!(client.destination("/bus/1.0.0/try/echo").to_string(), "Bus:1.0.0:Try:Echo");
}

#[test]
fn test_multi_word_handler_keeps_its_registered_name() {
    let service = Service::new("try", Echo, Chain::single(Codec::Json), Dispatcher::default());
    let handler = service.locate("EchoBytes").expect("handler registered as EchoBytes");
    assert_eq!(handler.name(), "EchoBytes");
    assert!(service.locate("Echobytes").is_none());

    let router = Router::new("front-door");
    assert_eq!(router.name(), "FrontDoor");
}

#[test]
fn test_service_lists_normalized_handler_names() {
    let service = Service::new("try", Echo, Chain::single(Codec::Json), Dispatcher::default());
    assert_eq!(service.name(), "Try");
    assert_eq!(service.handler_names(), vec!["Echo", "EchoBytes", "Refuse", "Stall"]);
}

#[tokio::test]
async fn test_duplicate_children_share_the_load() {
    let bus = Bus::new("bus");
    bus.integrate(Service::new("who", Tagged("left"), Chain::single(Codec::Json), Dispatcher::default()));
    bus.integrate(Service::new("who", Tagged("right"), Chain::single(Codec::Json), Dispatcher::default()));
    let client = Client::new("client", None);
    bus.integrate(client.clone());

    let mut seen = HashSet::new();
    for _ in 0..64 {
        let reply: Text = client
            .call(
                &Context::new(),
                "/who/whoami",
                Chain::single(Codec::Json),
                &Text { text: String::new() },
                WAIT,
            )
            .await
            .unwrap();
        seen.insert(reply.text);
    }
    assert_eq!(seen, HashSet::from(["left".to_string(), "right".to_string()]));
}

#[tokio::test]
async fn test_per_request_processor_wins_over_default() {
    let (default_tx, mut default_rx) = mpsc::channel(4);
    let (own_tx, mut own_rx) = mpsc::channel(4);
    let (_bus, client) = topology(Dispatcher::default(), Some(ChannelProcessor::new(default_tx)));

    let msg = client
        .message("/1.0.0/try/echo", Chain::single(Codec::Json), &Text { text: "mine".to_string() })
        .unwrap();
    let id = msg.id;
    client
        .invoke(&Context::new(), msg, Some(ChannelProcessor::new(own_tx)))
        .await
        .unwrap();

    let reply = tokio::time::timeout(WAIT, own_rx.recv()).await.unwrap().unwrap();
    assert_eq!(reply.id, id);
    assert!(default_rx.try_recv().is_err());
}

#[tokio::test]
async fn test_reply_without_processor_fails_the_handler_task() {
    let (reports_tx, mut reports) = mpsc::channel::<Report>(64);
    let scheduler = Scheduler::builder().parallel(1).reports(reports_tx).build();
    scheduler.start();
    let (_bus, client) = topology(Dispatcher::fixed(scheduler.clone()), None);

    let msg = client
        .message("/1.0.0/try/echo", Chain::single(Codec::Json), &Text { text: "lost".to_string() })
        .unwrap();
    client.invoke(&Context::new(), msg, None).await.unwrap();

    let failed = loop {
        let report = tokio::time::timeout(WAIT, reports.recv()).await.unwrap().unwrap();
        if report.is_finished() {
            break report;
        }
    };
    assert_eq!(failed.state, TaskState::Failed);
    let error = failed.error.unwrap().to_string();
    assert!(error.contains("no processor"), "{}", error);
    scheduler.close().await;
}

#[tokio::test(start_paused = true)]
async fn test_request_times_out_without_reply() {
    let scheduler = Scheduler::builder().parallel(1).build();
    scheduler.start();
    let (_bus, client) = topology(Dispatcher::fixed(scheduler.clone()), None);

    let msg = client
        .message("/1.0.0/try/stall", Chain::single(Codec::Json), &Text { text: "slow".to_string() })
        .unwrap();
    let id = msg.id;
    let error = client
        .request(&Context::new(), msg, Duration::from_secs(1))
        .await
        .unwrap_err();

    assert!(matches!(error, RouteError::ReplyTimeout { id: timed_out } if timed_out == id));
    assert_eq!(client.in_flight(), 0);
}
