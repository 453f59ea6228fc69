// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::Text;
use crate::context::Context;
use crate::device::Handlers;
use crate::traits::Component;
use std::sync::Arc;

/// Echoes whatever it receives; the smallest useful service.
#[derive(Debug, Default, Clone, Copy)]
pub struct Try;

impl Try {
    async fn echo(self: Arc<Self>, _ctx: Context, request: Text) -> anyhow::Result<Text> {
        Ok(request)
    }

    async fn echo_bytes(self: Arc<Self>, _ctx: Context, request: Vec<u8>) -> anyhow::Result<Vec<u8>> {
        Ok(request)
    }
}

impl Component for Try {
    fn register(handlers: &mut Handlers<Self>) {
        handlers.handle("echo", Try::echo).handle("echo_bytes", Try::echo_bytes);
    }
}
