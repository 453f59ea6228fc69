// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod components;
pub mod factory;

pub use components::*;
pub use factory::ComponentFactory;
