// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;

/// Words kept in upper case after normalization.
pub const ABBREVIATIONS: &[&str] = &[
    "ACL", "API", "ASCII", "CPU", "CSS", "DNS", "EOF", "GUID", "HTML", "HTTP", "HTTPS", "ID", "IP",
    "JSON", "QPS", "RAM", "RPC", "SLA", "SMTP", "SQL", "SSH", "TCP", "TLS", "TTL", "UDP", "UI",
    "UID", "UUID", "URI", "URL", "UTF8", "VIP", "VM", "XML", "XMPP", "XSRF", "XSS", "LHS", "RHS",
];

/// Separator used to split a path into segments or a segment into words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Separator {
    Slash,
    Dot,
    Colon,
    Dash,
    Underscore,
    /// Never splits.
    None,
}

impl Separator {
    pub fn as_char(self) -> Option<char> {
        match self {
            Separator::Slash => Some('/'),
            Separator::Dot => Some('.'),
            Separator::Colon => Some(':'),
            Separator::Dash => Some('-'),
            Separator::Underscore => Some('_'),
            Separator::None => None,
        }
    }
}

/// Normalize a single word: lower-case the remainder, upper-case an ASCII
/// first letter, then substitute a known abbreviation. Other first
/// characters are kept as they are so the result is stable under repeat
/// application.
pub fn standardize(word: &str) -> String {
    let upper = word.to_ascii_uppercase();
    if let Some(abbr) = ABBREVIATIONS.iter().find(|a| **a == upper) {
        return (*abbr).to_string();
    }

    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            let mut out = String::with_capacity(word.len());
            out.push(first.to_ascii_uppercase());
            out.push_str(&chars.as_str().to_lowercase());
            out
        }
        None => String::new(),
    }
}

/// Normalize one path piece into a single PascalCase segment.
pub fn normalize(piece: &str, word: Separator) -> String {
    match word.as_char() {
        Some(sep) => piece
            .split(sep)
            .filter(|w| !w.is_empty())
            .map(standardize)
            .collect(),
        None => standardize(piece),
    }
}

/// Split a raw path into normalized segments, dropping empty pieces.
pub fn split_path(path: &str, chain: Separator, word: Separator) -> Vec<String> {
    let pieces: Vec<&str> = match chain.as_char() {
        Some(sep) => path.split(sep).collect(),
        None => vec![path],
    };

    pieces
        .into_iter()
        .filter(|p| !p.is_empty())
        .map(|p| normalize(p, word))
        .filter(|s| !s.is_empty())
        .collect()
}
