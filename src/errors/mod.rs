// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod component;
mod config;
mod coroutine;
mod encoding;
mod execution;
mod routing;

pub use component::ComponentError;
pub use config::{ConfigError, ValidationError};
pub use coroutine::CoroutineError;
pub use encoding::EncodingError;
pub use execution::{SchedulerError, TaskError};
pub use routing::RouteError;
