// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

/// A piece of text, the request and response of most built-in handlers.
///
/// Also a protobuf message, so every codec in the standard registry accepts it.
#[derive(Clone, PartialEq, Eq, prost::Message, Serialize, Deserialize)]
pub struct Text {
    #[prost(string, tag = "1")]
    pub text: String,
}

impl Text {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Result of `text/count-tokens`.
#[derive(Clone, PartialEq, Eq, prost::Message, Serialize, Deserialize)]
pub struct TokenCount {
    #[prost(uint64, tag = "1")]
    pub chars: u64,
    #[prost(uint64, tag = "2")]
    pub words: u64,
    #[prost(uint64, tag = "3")]
    pub lines: u64,
}

crate::protobuf_record!(Text, TokenCount);
