// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::EncodingError;
use ::base64::engine::general_purpose::{STANDARD, URL_SAFE};
use ::base64::Engine;

pub(crate) fn encode(data: &[u8], url: bool) -> Vec<u8> {
    let encoded = if url {
        URL_SAFE.encode(data)
    } else {
        STANDARD.encode(data)
    };
    encoded.into_bytes()
}

pub(crate) fn decode(data: &[u8], url: bool) -> Result<Vec<u8>, EncodingError> {
    if url {
        URL_SAFE
            .decode(data)
            .map_err(|e| EncodingError::codec("Base64URL", e))
    } else {
        STANDARD
            .decode(data)
            .map_err(|e| EncodingError::codec("Base64", e))
    }
}
