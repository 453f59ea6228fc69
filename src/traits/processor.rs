// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::context::Context;
use crate::route::Message;
use async_trait::async_trait;

/// Consumer of the replies a [`Client`](crate::device::Client) receives.
///
/// Reply messages keep the id of the request they answer and carry the
/// handler's error, if any, in [`Message::error`].
#[async_trait]
pub trait Processor: Send + Sync {
    async fn process(&self, ctx: &Context, reply: Message) -> anyhow::Result<()>;

    fn name(&self) -> &'static str;
}
