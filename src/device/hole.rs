// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::DeviceCore;
use crate::context::Context;
use crate::errors::RouteError;
use crate::observability::messages::device::MessageDiscarded;
use crate::observability::messages::StructuredLog;
use crate::route::Message;
use crate::traits::Device;
use async_trait::async_trait;
use std::sync::{Arc, Weak};

/// Swallows every message it receives.
pub struct Hole {
    core: DeviceCore,
}

impl Hole {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new_cyclic(|this: &Weak<Self>| Hole {
            core: DeviceCore::new(name, this.clone()),
        })
    }
}

#[async_trait]
impl Device for Hole {
    fn core(&self) -> &DeviceCore {
        &self.core
    }

    async fn process(&self, _ctx: &Context, msg: Message) -> Result<(), RouteError> {
        MessageDiscarded {
            device: self.name(),
            id: msg.id,
        }
        .log();
        Ok(())
    }
}
