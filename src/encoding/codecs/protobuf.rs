// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::EncodingError;
use prost::Message;

/// Byte holders travel as a `google.protobuf.BytesValue`.
pub(crate) fn encode_bytes(data: &[u8]) -> Vec<u8> {
    data.to_vec().encode_to_vec()
}

pub(crate) fn decode_bytes(data: &[u8]) -> Result<Vec<u8>, EncodingError> {
    Vec::<u8>::decode(data).map_err(|e| EncodingError::codec("Protobuf", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_value_layout() {
        // field 1, wire type 2, length 2
        assert_eq!(encode_bytes(b"hi"), vec![0x0a, 0x02, b'h', b'i']);
        assert_eq!(decode_bytes(&[0x0a, 0x02, b'h', b'i']).unwrap(), b"hi".to_vec());
        assert!(encode_bytes(b"").is_empty());
    }
}
