// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors produced by codecs, chains and the codec registry.
#[derive(Debug, Error)]
pub enum EncodingError {
    /// A chain references a codec name that is not registered.
    #[error("missing encoding: '{0}'")]
    MissingEncoding(String),

    /// The codec cannot handle the kind of value it was given.
    #[error("codec '{codec}' does not accept {value}")]
    WrongValueType { codec: &'static str, value: String },

    /// The chain has no codecs to apply.
    #[error("encoding chain is empty")]
    EmptyChain,

    /// The codec accepted the value but failed to convert it.
    #[error("codec '{codec}' failed: {reason}")]
    Codec { codec: &'static str, reason: String },
}

impl EncodingError {
    pub(crate) fn codec(codec: &'static str, reason: impl std::fmt::Display) -> Self {
        EncodingError::Codec {
            codec,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn wrong_type(codec: &'static str, value: impl Into<String>) -> Self {
        EncodingError::WrongValueType {
            codec,
            value: value.into(),
        }
    }
}
