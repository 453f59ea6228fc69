// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::binding::HandlerFn;
use super::{DeviceCore, Dispatcher};
use crate::context::Context;
use crate::encoding::Chain;
use crate::errors::RouteError;
use crate::observability::messages::device::{HandlerFailed, MessageDispatched, ReplyUndeliverable};
use crate::observability::messages::StructuredLog;
use crate::route::Message;
use crate::scheduler::Task;
use crate::traits::{Component, Device};
use async_trait::async_trait;
use std::sync::{Arc, Weak};

/// A leaf bound to one method of a component.
///
/// On dispatch the handler publishes a task that decodes the request, calls
/// the method, encodes the response and sends the reply back along the
/// reversed route. A failing method still replies, with
/// [`Message::error`] set, and fails its task.
pub struct Handler<C: Component> {
    core: DeviceCore,
    component: Arc<C>,
    invoke: HandlerFn<C>,
    encoding: Chain,
    dispatcher: Dispatcher,
}

impl<C: Component> Handler<C> {
    pub(crate) fn new(
        method: String,
        component: Arc<C>,
        invoke: HandlerFn<C>,
        encoding: Chain,
        dispatcher: Dispatcher,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this: &Weak<Self>| Handler {
            core: DeviceCore::normalized(method, this.clone()),
            component,
            invoke,
            encoding,
            dispatcher,
        })
    }

    fn task(&self, ctx: &Context, msg: Message) -> Task {
        let component = Arc::clone(&self.component);
        let invoke = Arc::clone(&self.invoke);
        let gateway = self.gateway();
        let handler = self.address().to_string();
        let chain = if msg.encoding.is_empty() {
            self.encoding.clone()
        } else {
            msg.encoding.clone()
        };

        Task::builder()
            .name(format!("{}#{}", handler, msg.id))
            .parent(ctx.clone())
            .stage(move |scope| async move {
                let outcome = invoke(component, scope.context.clone(), chain.clone(), msg.data.clone()).await;
                let reply = match outcome {
                    Ok(data) => Message {
                        encoding: chain,
                        ..msg.reply(data)
                    },
                    Err(error) => {
                        let reason = format!("{:#}", error);
                        HandlerFailed {
                            handler: &handler,
                            id: msg.id,
                            error: &reason,
                        }
                        .log();
                        Message {
                            encoding: chain,
                            ..msg.failure(reason)
                        }
                    }
                };

                let failure = reply.error.clone();
                let delivered = match gateway {
                    Some(gateway) => gateway.process(&scope.context, reply).await,
                    None => Err(RouteError::GatewayNotFound {
                        device: handler.clone(),
                        route: reply.route.to_string(),
                    }),
                };
                if let Err(error) = delivered {
                    ReplyUndeliverable {
                        handler: &handler,
                        id: msg.id,
                        error: &error,
                    }
                    .log();
                    return Err(error.into());
                }

                match failure {
                    Some(reason) => Err(anyhow::anyhow!(reason)),
                    None => Ok(()),
                }
            })
            .build()
    }
}

#[async_trait]
impl<C: Component> Device for Handler<C> {
    fn core(&self) -> &DeviceCore {
        &self.core
    }

    async fn process(&self, ctx: &Context, msg: Message) -> Result<(), RouteError> {
        if msg.route.assembling() {
            return self.core.ascend(ctx, msg).await;
        }
        self.core.arrive(&msg.route)?;

        let scheduler = self.dispatcher.scheduler(ctx, &msg.route);
        let id = msg.id;
        let route = msg.route.to_string();
        scheduler.publish(self.task(ctx, msg)).await?;
        MessageDispatched {
            handler: self.name(),
            id,
            route: &route,
        }
        .log();
        Ok(())
    }
}
