// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::codecs::{base64, binary, csv, hash, protobuf, text};
use super::Record;
use crate::errors::EncodingError;
use std::any::type_name;
use std::fmt::{Display, Formatter};

/// Which kinds of value a codec accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// Typed records only.
    Struct,
    /// Raw byte holders only.
    Bytes,
    /// Either.
    Mix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endian {
    Big,
    Little,
}

/// Every codec the fabric knows how to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    Json,
    Xml,
    Yaml,
    Csv { headers: bool },
    Base64 { url: bool },
    /// Identity over byte holders.
    Lazy,
    Protobuf,
    /// JSON over a list of `[path, value]` pairs.
    Hash,
    /// Fixed-size binary layout.
    Binary(Endian),
}

impl Codec {
    pub fn name(&self) -> &'static str {
        match self {
            Codec::Json => "JSON",
            Codec::Xml => "XML",
            Codec::Yaml => "YAML",
            Codec::Csv { headers: false } => "CSV",
            Codec::Csv { headers: true } => "CSVWithHeaders",
            Codec::Base64 { url: false } => "Base64",
            Codec::Base64 { url: true } => "Base64URL",
            Codec::Lazy => "Lazy",
            Codec::Protobuf => "Protobuf",
            Codec::Hash => "Hash",
            Codec::Binary(Endian::Big) => "BigEndian",
            Codec::Binary(Endian::Little) => "LittleEndian",
        }
    }

    pub fn style(&self) -> Style {
        match self {
            Codec::Json | Codec::Xml | Codec::Yaml | Codec::Csv { .. } | Codec::Hash => Style::Struct,
            Codec::Base64 { .. } | Codec::Lazy => Style::Bytes,
            Codec::Protobuf | Codec::Binary(_) => Style::Mix,
        }
    }

    /// Codecs are their own inverse; chains do the reordering.
    pub fn reverse(&self) -> Codec {
        *self
    }

    pub fn accepts_bytes(&self) -> bool {
        self.style() != Style::Struct
    }

    pub fn accepts_records(&self) -> bool {
        self.style() != Style::Bytes
    }

    pub fn encode_bytes(&self, data: &[u8]) -> Result<Vec<u8>, EncodingError> {
        match self {
            Codec::Base64 { url } => Ok(base64::encode(data, *url)),
            Codec::Lazy | Codec::Binary(_) => Ok(data.to_vec()),
            Codec::Protobuf => Ok(protobuf::encode_bytes(data)),
            _ => Err(EncodingError::wrong_type(self.name(), "a byte holder")),
        }
    }

    pub fn decode_bytes(&self, data: &[u8]) -> Result<Vec<u8>, EncodingError> {
        match self {
            Codec::Base64 { url } => base64::decode(data, *url),
            Codec::Lazy | Codec::Binary(_) => Ok(data.to_vec()),
            Codec::Protobuf => protobuf::decode_bytes(data),
            _ => Err(EncodingError::wrong_type(self.name(), "a byte holder")),
        }
    }

    pub fn encode_record<T: Record>(&self, value: &T) -> Result<Vec<u8>, EncodingError> {
        let name = self.name();
        match self {
            Codec::Json => serde_json::to_vec(value).map_err(|e| EncodingError::codec(name, e)),
            Codec::Yaml => serde_yaml::to_string(value)
                .map(String::into_bytes)
                .map_err(|e| EncodingError::codec(name, e)),
            Codec::Xml => text::xml_encode(value),
            Codec::Csv { headers } => csv::encode(value, *headers),
            Codec::Hash => hash::encode(value),
            Codec::Binary(endian) => binary::to_bytes(value, *endian),
            Codec::Protobuf => value
                .to_protobuf()
                .ok_or_else(|| EncodingError::wrong_type(name, type_name::<T>())),
            Codec::Base64 { .. } | Codec::Lazy => {
                Err(EncodingError::wrong_type(name, type_name::<T>()))
            }
        }
    }

    pub fn decode_record<T: Record>(&self, data: &[u8]) -> Result<T, EncodingError> {
        let name = self.name();
        match self {
            Codec::Json => serde_json::from_slice(data).map_err(|e| EncodingError::codec(name, e)),
            Codec::Yaml => serde_yaml::from_slice(data).map_err(|e| EncodingError::codec(name, e)),
            Codec::Xml => text::xml_decode(data),
            Codec::Csv { headers } => csv::decode(data, *headers),
            Codec::Hash => hash::decode(data),
            Codec::Binary(endian) => binary::from_bytes(data, *endian),
            Codec::Protobuf => match T::from_protobuf(data) {
                Some(decoded) => decoded.map_err(|e| EncodingError::codec(name, e)),
                None => Err(EncodingError::wrong_type(name, type_name::<T>())),
            },
            Codec::Base64 { .. } | Codec::Lazy => {
                Err(EncodingError::wrong_type(name, type_name::<T>()))
            }
        }
    }
}

impl Display for Codec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Text {
        text: String,
    }
    crate::record!(Text);

    #[test]
    fn test_styles() {
        assert_eq!(Codec::Json.style(), Style::Struct);
        assert_eq!(Codec::Base64 { url: true }.style(), Style::Bytes);
        assert_eq!(Codec::Protobuf.style(), Style::Mix);
        assert!(Codec::Binary(Endian::Big).accepts_bytes());
        assert!(!Codec::Lazy.accepts_records());
    }

    #[test]
    fn test_reverse_is_involution() {
        for codec in [Codec::Json, Codec::Csv { headers: true }, Codec::Binary(Endian::Little)] {
            assert_eq!(codec.reverse().reverse(), codec);
        }
    }

    #[test]
    fn test_struct_codec_rejects_bytes() {
        let err = Codec::Json.encode_bytes(b"raw").unwrap_err();
        assert!(matches!(err, EncodingError::WrongValueType { codec: "JSON", .. }));
    }

    #[test]
    fn test_bytes_codec_rejects_records() {
        let value = Text { text: "hi".into() };
        let err = Codec::Base64 { url: false }.encode_record(&value).unwrap_err();
        assert!(matches!(err, EncodingError::WrongValueType { codec: "Base64", .. }));
    }

    #[test]
    fn test_protobuf_rejects_plain_records() {
        let value = Text { text: "hi".into() };
        let err = Codec::Protobuf.encode_record(&value).unwrap_err();
        assert!(matches!(err, EncodingError::WrongValueType { .. }));
    }
}
