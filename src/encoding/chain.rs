// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::{registry, Codec, Payload, Registry};
use crate::errors::EncodingError;
use std::fmt::{Display, Formatter};

/// A reversible composition of codecs.
///
/// `marshal` applies `encoder` left to right: the first codec sees the value,
/// the rest see the previous output as a byte holder. `unmarshal` applies
/// `decoder` left to right: intermediate codecs produce bytes, the last one
/// produces the value. For chains of reversible codecs
/// `chain.reverse().unmarshal(&chain.marshal(&v)?)? == v`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chain {
    pub encoder: Vec<Codec>,
    pub decoder: Vec<Codec>,
}

impl Chain {
    pub fn new(encoder: Vec<Codec>, decoder: Vec<Codec>) -> Self {
        Self { encoder, decoder }
    }

    /// Same codec list for both directions.
    pub fn of(codecs: &[Codec]) -> Self {
        Self::new(codecs.to_vec(), codecs.to_vec())
    }

    pub fn single(codec: Codec) -> Self {
        Self::of(&[codec])
    }

    /// Parse a dotted path against the process-wide registry.
    pub fn parse(path: &str) -> Result<Self, EncodingError> {
        Self::parse_with(registry(), path)
    }

    pub fn parse_with(registry: &Registry, path: &str) -> Result<Self, EncodingError> {
        let codecs = registry.resolve(path)?;
        Ok(Self::of(&codecs))
    }

    pub fn is_empty(&self) -> bool {
        self.encoder.is_empty() && self.decoder.is_empty()
    }

    pub fn marshal<P: Payload>(&self, value: &P) -> Result<Vec<u8>, EncodingError> {
        let (first, rest) = self.encoder.split_first().ok_or(EncodingError::EmptyChain)?;
        let mut data = value.encode_with(first)?;
        for codec in rest {
            data = codec.encode_bytes(&data)?;
        }
        Ok(data)
    }

    pub fn unmarshal<P: Payload>(&self, data: &[u8]) -> Result<P, EncodingError> {
        let (last, init) = self.decoder.split_last().ok_or(EncodingError::EmptyChain)?;
        let mut bytes = data.to_vec();
        for codec in init {
            bytes = codec.decode_bytes(&bytes)?;
        }
        P::decode_with(last, &bytes)
    }

    pub fn reverse(&self) -> Chain {
        Chain {
            encoder: self.decoder.iter().rev().map(Codec::reverse).collect(),
            decoder: self.encoder.iter().rev().map(Codec::reverse).collect(),
        }
    }
}

fn dotted(codecs: &[Codec]) -> String {
    codecs.iter().map(Codec::name).collect::<Vec<_>>().join(".")
}

impl Display for Chain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.encoder == self.decoder {
            write!(f, "{}", dotted(&self.encoder))
        } else {
            write!(f, "{} | {}", dotted(&self.encoder), dotted(&self.decoder))
        }
    }
}
