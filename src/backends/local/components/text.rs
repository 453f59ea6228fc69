// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::{Text, TokenCount};
use crate::context::Context;
use crate::device::Handlers;
use crate::traits::Component;
use std::sync::Arc;

/// Words kept lower case by `title` unless they open the text.
const MINOR_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
];

/// Text transformations and analysis, bound as the `text` component.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextTools;

impl TextTools {
    pub fn upper(text: &str) -> String {
        text.to_uppercase()
    }

    pub fn lower(text: &str) -> String {
        text.to_lowercase()
    }

    /// Characters in reverse order.
    pub fn reverse(text: &str) -> String {
        text.chars().rev().collect()
    }

    /// Capitalize every word except minor words after the first.
    pub fn title(text: &str) -> String {
        text.split_whitespace()
            .enumerate()
            .map(|(i, word)| {
                let lower = word.to_lowercase();
                if i > 0 && MINOR_WORDS.contains(&lower.as_str()) {
                    lower
                } else {
                    capitalize(&lower)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Counts characters, whitespace separated words and lines (at least one).
    pub fn count_tokens(text: &str) -> TokenCount {
        TokenCount {
            chars: text.chars().count() as u64,
            words: text.split_whitespace().count() as u64,
            lines: text.lines().count().max(1) as u64,
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

impl Component for TextTools {
    fn register(handlers: &mut Handlers<Self>) {
        handlers
            .handle("upper", |_: Arc<Self>, _: Context, req: Text| async move {
                Ok(Text::new(TextTools::upper(&req.text)))
            })
            .handle("lower", |_: Arc<Self>, _: Context, req: Text| async move {
                Ok(Text::new(TextTools::lower(&req.text)))
            })
            .handle("reverse", |_: Arc<Self>, _: Context, req: Text| async move {
                Ok(Text::new(TextTools::reverse(&req.text)))
            })
            .handle("title", |_: Arc<Self>, _: Context, req: Text| async move {
                Ok(Text::new(TextTools::title(&req.text)))
            })
            .handle("count_tokens", |_: Arc<Self>, _: Context, req: Text| async move {
                Ok(TextTools::count_tokens(&req.text))
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_changes() {
        let cases = vec![
            (TextTools::upper("hello"), "HELLO"),
            (TextTools::lower("HeLLo"), "hello"),
            (TextTools::reverse("hello"), "olleh"),
            (TextTools::reverse("añb"), "bña"),
            (TextTools::title("the quick brown fox of the woods"), "The Quick Brown Fox of the Woods"),
        ];
        for (actual, expected) in cases {
            assert_eq!(actual, expected);
        }
    }

    #[test]
    fn test_count_tokens() {
        let count = TextTools::count_tokens("hello world\nsecond line");
        assert_eq!(count.chars, 23);
        assert_eq!(count.words, 4);
        assert_eq!(count.lines, 2);

        let empty = TextTools::count_tokens("");
        assert_eq!(empty.words, 0);
        assert_eq!(empty.lines, 1);
    }

    #[test]
    fn test_registered_names() {
        let handlers = Handlers::<TextTools>::collect();
        assert_eq!(
            handlers.names().collect::<Vec<_>>(),
            vec!["Upper", "Lower", "Reverse", "Title", "CountTokens"]
        );
    }
}
