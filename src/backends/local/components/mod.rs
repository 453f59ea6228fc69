// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod records;
mod text;
mod try_echo;

pub use records::{Text, TokenCount};
pub use text::TextTools;
pub use try_echo::Try;
