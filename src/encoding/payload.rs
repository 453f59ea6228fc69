// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::Codec;
use crate::errors::EncodingError;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A typed value that structured codecs can convert.
///
/// Every serde type can opt in with [`record!`](crate::record). Types that
/// are also `prost` messages use [`protobuf_record!`](crate::protobuf_record)
/// so that the `Protobuf` codec accepts them as well.
pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {
    fn to_protobuf(&self) -> Option<Vec<u8>> {
        None
    }

    fn from_protobuf(_data: &[u8]) -> Option<Result<Self, prost::DecodeError>> {
        None
    }
}

/// Anything a chain can marshal: the raw byte holder or a [`Record`].
pub trait Payload: Send + Sync + Sized + 'static {
    fn encode_with(&self, codec: &Codec) -> Result<Vec<u8>, EncodingError>;

    fn decode_with(codec: &Codec, data: &[u8]) -> Result<Self, EncodingError>;
}

impl Payload for Vec<u8> {
    fn encode_with(&self, codec: &Codec) -> Result<Vec<u8>, EncodingError> {
        codec.encode_bytes(self)
    }

    fn decode_with(codec: &Codec, data: &[u8]) -> Result<Self, EncodingError> {
        codec.decode_bytes(data)
    }
}

impl<T: Record> Payload for T {
    fn encode_with(&self, codec: &Codec) -> Result<Vec<u8>, EncodingError> {
        codec.encode_record(self)
    }

    fn decode_with(codec: &Codec, data: &[u8]) -> Result<Self, EncodingError> {
        codec.decode_record(data)
    }
}

/// Implement [`Record`] for serde types.
#[macro_export]
macro_rules! record {
    ($($ty:ty),+ $(,)?) => {
        $(impl $crate::encoding::Record for $ty {})+
    };
}

/// Implement [`Record`] for types that are both serde and `prost` messages.
#[macro_export]
macro_rules! protobuf_record {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::encoding::Record for $ty {
                fn to_protobuf(&self) -> Option<Vec<u8>> {
                    Some($crate::encoding::prost::Message::encode_to_vec(self))
                }

                fn from_protobuf(
                    data: &[u8],
                ) -> Option<Result<Self, $crate::encoding::prost::DecodeError>> {
                    Some(<$ty as $crate::encoding::prost::Message>::decode(data))
                }
            }
        )+
    };
}

record!(String, serde_json::Value);

impl<T: Record> Record for Vec<T> {}

