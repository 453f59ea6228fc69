// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::DeviceCore;
use crate::address::Address;
use crate::context::Context;
use crate::encoding::{Chain, Payload};
use crate::errors::RouteError;
use crate::observability::messages::device::ReplyReceived;
use crate::observability::messages::StructuredLog;
use crate::route::{Message, Route};
use crate::traits::{Device, Processor};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

enum Pending {
    Processor(Arc<dyn Processor>),
    Waiter(oneshot::Sender<Message>),
}

/// An active leaf: originates messages and receives their replies.
///
/// Replies are matched to requests by message id. A reply with no
/// per-request processor or waiter goes to the client's default processor.
pub struct Client {
    core: DeviceCore,
    processor: Option<Arc<dyn Processor>>,
    pending: Mutex<HashMap<u64, Pending>>,
}

impl Client {
    pub fn new(name: &str, processor: Option<Arc<dyn Processor>>) -> Arc<Self> {
        Arc::new_cyclic(|this: &Weak<Self>| Client {
            core: DeviceCore::new(name, this.clone()),
            processor,
            pending: Mutex::new(HashMap::new()),
        })
    }

    /// `path` made absolute by prefixing the root bus name when missing.
    pub fn destination(&self, path: &str) -> Address {
        let dst = Address::parse(path);
        match self.address().first() {
            Some(root) if root != self.name() => dst.prefixed(root),
            _ => dst,
        }
    }

    /// A message from this client to `path` carrying `payload` marshalled
    /// under `encoding`.
    pub fn message<P: Payload>(&self, path: &str, encoding: Chain, payload: &P) -> Result<Message, RouteError> {
        let data = encoding.marshal(payload)?;
        Ok(Message::new(
            Route::new(self.address(), self.destination(path)),
            encoding,
            data,
        ))
    }

    /// Send `msg`, delivering its reply to `processor` or, when `None`, to the
    /// client's default processor.
    pub async fn invoke(
        &self,
        ctx: &Context,
        msg: Message,
        processor: Option<Arc<dyn Processor>>,
    ) -> Result<(), RouteError> {
        let id = msg.id;
        if let Some(processor) = processor {
            self.pending().insert(id, Pending::Processor(processor));
        }
        let sent = self.core.ascend(ctx, msg).await;
        if sent.is_err() {
            self.pending().remove(&id);
        }
        sent
    }

    /// Send `msg` and wait up to `timeout` for its reply.
    pub async fn request(&self, ctx: &Context, msg: Message, timeout: Duration) -> Result<Message, RouteError> {
        let id = msg.id;
        let (tx, rx) = oneshot::channel();
        self.pending().insert(id, Pending::Waiter(tx));

        if let Err(error) = self.core.ascend(ctx, msg).await {
            self.pending().remove(&id);
            return Err(error);
        }
        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(reply)) => Ok(reply),
            _ => {
                self.pending().remove(&id);
                Err(RouteError::ReplyTimeout { id })
            }
        }
    }

    /// Marshal `request`, send it to `path`, and decode the reply.
    ///
    /// A reply carrying a handler error is returned as [`RouteError::Remote`].
    pub async fn call<Req, Resp>(
        &self,
        ctx: &Context,
        path: &str,
        encoding: Chain,
        request: &Req,
        timeout: Duration,
    ) -> Result<Resp, RouteError>
    where
        Req: Payload,
        Resp: Payload,
    {
        let msg = self.message(path, encoding, request)?;
        let reply = self.request(ctx, msg, timeout).await?;
        if let Some(error) = reply.error {
            return Err(RouteError::Remote(error));
        }
        Ok(reply.encoding.reverse().unmarshal(&reply.data)?)
    }

    /// Requests still waiting for a reply.
    pub fn in_flight(&self) -> usize {
        self.pending().len()
    }

    fn pending(&self) -> std::sync::MutexGuard<'_, HashMap<u64, Pending>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Device for Client {
    fn core(&self) -> &DeviceCore {
        &self.core
    }

    async fn process(&self, ctx: &Context, msg: Message) -> Result<(), RouteError> {
        if msg.route.assembling() {
            return self.core.ascend(ctx, msg).await;
        }
        self.core.arrive(&msg.route)?;
        ReplyReceived {
            client: self.name(),
            id: msg.id,
            failed: msg.is_error(),
        }
        .log();

        let pending = self.pending().remove(&msg.id);
        let processor = match pending {
            Some(Pending::Waiter(waiter)) => {
                let _ = waiter.send(msg);
                return Ok(());
            }
            Some(Pending::Processor(processor)) => processor,
            None => match &self.processor {
                Some(processor) => Arc::clone(processor),
                None => {
                    return Err(RouteError::MissingProcessor {
                        device: self.name().to_string(),
                        id: msg.id,
                    })
                }
            },
        };

        let route = msg.route.to_string();
        processor
            .process(ctx, msg)
            .await
            .map_err(|error| RouteError::Wrapped {
                route,
                source: error.into(),
            })
    }
}

/// A processor that forwards every reply into a channel.
pub struct ChannelProcessor {
    replies: mpsc::Sender<Message>,
}

impl ChannelProcessor {
    pub fn new(replies: mpsc::Sender<Message>) -> Arc<Self> {
        Arc::new(Self { replies })
    }
}

#[async_trait]
impl Processor for ChannelProcessor {
    async fn process(&self, _ctx: &Context, reply: Message) -> anyhow::Result<()> {
        self.replies
            .send(reply)
            .await
            .map_err(|_| anyhow::anyhow!("reply channel closed"))
    }

    fn name(&self) -> &'static str {
        "channel"
    }
}
