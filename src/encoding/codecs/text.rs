// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::encoding::Record;
use crate::errors::EncodingError;

const XML: &str = "XML";

pub(crate) fn xml_encode<T: Record>(value: &T) -> Result<Vec<u8>, EncodingError> {
    quick_xml::se::to_string(value)
        .map(String::into_bytes)
        .map_err(|e| EncodingError::codec(XML, e))
}

pub(crate) fn xml_decode<T: Record>(data: &[u8]) -> Result<T, EncodingError> {
    let text = std::str::from_utf8(data).map_err(|e| EncodingError::codec(XML, e))?;
    quick_xml::de::from_str(text).map_err(|e| EncodingError::codec(XML, e))
}
