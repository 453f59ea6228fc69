// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::{Codec, Endian};
use crate::address::{normalize, split_path, Separator};
use crate::errors::EncodingError;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Codecs known to the fabric out of the box.
pub const STANDARD_CODECS: &[Codec] = &[
    Codec::Json,
    Codec::Xml,
    Codec::Yaml,
    Codec::Csv { headers: false },
    Codec::Csv { headers: true },
    Codec::Base64 { url: false },
    Codec::Base64 { url: true },
    Codec::Lazy,
    Codec::Protobuf,
    Codec::Hash,
    Codec::Binary(Endian::Little),
    Codec::Binary(Endian::Big),
];

/// Maps codec names to codecs.
///
/// Lookups normalize the name with `-` between words and ignore case, so
/// `"csv-with-headers"`, `"CSVWithHeaders"` and `"csvwithheaders"` agree.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    codecs: HashMap<String, Codec>,
}

fn key(name: &str) -> String {
    normalize(name, Separator::Dash).to_lowercase()
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every standard codec under its own name, plus `Binary` as big-endian.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for codec in STANDARD_CODECS {
            registry.register(codec.name(), *codec);
        }
        registry.register("binary", Codec::Binary(Endian::Big));
        registry
    }

    pub fn register(&mut self, alias: &str, codec: Codec) {
        self.codecs.insert(key(alias), codec);
    }

    pub fn get(&self, name: &str) -> Result<Codec, EncodingError> {
        self.codecs
            .get(&key(name))
            .copied()
            .ok_or_else(|| EncodingError::MissingEncoding(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.codecs.contains_key(&key(name))
    }

    /// Resolve a dotted encoding path such as `"json.base64"`.
    pub fn resolve(&self, path: &str) -> Result<Vec<Codec>, EncodingError> {
        split_path(path, Separator::Dot, Separator::Dash)
            .iter()
            .map(|name| self.get(name))
            .collect()
    }

    pub fn codecs(&self) -> impl Iterator<Item = (&str, Codec)> {
        self.codecs.iter().map(|(name, codec)| (name.as_str(), *codec))
    }

    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }
}

/// The process-wide registry, populated on first use and read-only afterwards.
pub fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(Registry::standard)
}
