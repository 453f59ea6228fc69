// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::context::Context;
use crate::route::Route;
use crate::scheduler::{default_scheduler, Scheduler};
use std::sync::Arc;

/// Chooses the scheduler that runs a handler's work for a given message.
#[derive(Clone)]
pub struct Dispatcher(Arc<dyn Fn(&Context, &Route) -> Scheduler + Send + Sync>);

impl Dispatcher {
    pub fn new(select: impl Fn(&Context, &Route) -> Scheduler + Send + Sync + 'static) -> Self {
        Self(Arc::new(select))
    }

    /// Every message goes to `scheduler`.
    pub fn fixed(scheduler: Scheduler) -> Self {
        Self::new(move |_, _| scheduler.clone())
    }

    /// Every message goes to the process-wide default scheduler.
    pub fn default_scheduler() -> Self {
        Self::new(|_, _| default_scheduler())
    }

    pub fn scheduler(&self, ctx: &Context, route: &Route) -> Scheduler {
        (self.0)(ctx, route)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::default_scheduler()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Dispatcher")
    }
}
