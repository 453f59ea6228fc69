// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::normalize::{split_path, Separator};
use std::fmt::{Display, Formatter};

/// An ordered chain of normalized segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Address(pub Vec<String>);

impl Address {
    /// Parse with `/` between segments and `-` between words.
    pub fn parse(path: &str) -> Self {
        Self::parse_with(path, Separator::Slash, Separator::Dash)
    }

    pub fn parse_with(path: &str, chain: Separator, word: Separator) -> Self {
        Address(split_path(path, chain, word))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Append `other` after this address.
    pub fn join(&self, other: &Address) -> Address {
        let mut segments = self.0.clone();
        segments.extend(other.0.iter().cloned());
        Address(segments)
    }

    /// Put `segment` in front unless it is already the first segment.
    pub fn prefixed(&self, segment: &str) -> Address {
        if self.first() == Some(segment) {
            return self.clone();
        }
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.push(segment.to_string());
        segments.extend(self.0.iter().cloned());
        Address(segments)
    }
}

impl From<Vec<String>> for Address {
    fn from(segments: Vec<String>) -> Self {
        Address(segments)
    }
}

impl From<&str> for Address {
    fn from(path: &str) -> Self {
        Address::parse(path)
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join(":"))
    }
}
