// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::DeviceCore;
use crate::traits::Device;
use std::sync::{Arc, Weak};

/// A named intermediate node, such as a version (`1.0.0`) or a package.
pub struct Router {
    core: DeviceCore,
}

impl Router {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new_cyclic(|this: &Weak<Self>| Router {
            core: DeviceCore::new(name, this.clone()),
        })
    }
}

impl Device for Router {
    fn core(&self) -> &DeviceCore {
        &self.core
    }
}
