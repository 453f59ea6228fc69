// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::address::Address;
use crate::errors::RouteError;
use std::fmt::{Display, Formatter};

/// Source and destination chains plus the dispatch cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Route {
    pub src: Address,
    pub dst: Address,
    index: usize,
}

impl Route {
    pub fn new(src: impl Into<Address>, dst: impl Into<Address>) -> Self {
        Self {
            src: src.into(),
            dst: dst.into(),
            index: 0,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// A copy advanced by one segment, clamped to the last destination segment.
    pub fn forward(&self) -> Route {
        let last = self.dst.len().saturating_sub(1);
        Route {
            src: self.src.clone(),
            dst: self.dst.clone(),
            index: (self.index + 1).min(last),
        }
    }

    /// A new route travelling back to the source, cursor reset.
    pub fn reverse(&self) -> Route {
        Route {
            src: self.dst.clone(),
            dst: self.src.clone(),
            index: 0,
        }
    }

    /// The destination segment under the cursor.
    pub fn position(&self) -> Option<&str> {
        self.dst.0.get(self.index).map(String::as_str)
    }

    pub fn dispatching(&self) -> bool {
        self.index > 0
    }

    pub fn assembling(&self) -> bool {
        self.index == 0
    }

    /// True when the cursor sits on the last destination segment.
    pub fn at_end(&self) -> bool {
        self.index + 1 >= self.dst.len()
    }

    /// Annotate `err` with this route for diagnostics.
    pub fn error<E>(&self, err: E) -> RouteError
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        RouteError::Wrapped {
            route: self.to_string(),
            source: Box::new(err),
        }
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let dst: Vec<String> = self
            .dst
            .0
            .iter()
            .enumerate()
            .map(|(i, segment)| {
                if i == self.index {
                    format!("<{}>", segment)
                } else {
                    segment.clone()
                }
            })
            .collect();
        write!(f, "[{}] -> [{}]", self.src, dst.join(":"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Route {
        Route::new("/bus/client", "/bus/1.0.0/try/echo")
    }

    #[test]
    fn test_new_route_is_assembling() {
        let route = sample();
        assert!(route.assembling());
        assert!(!route.dispatching());
        assert_eq!(route.position(), Some("Bus"));
    }

    #[test]
    fn test_double_reverse_restores_route() {
        let samples = [
            sample(),
            Route::new("", "/a"),
            Route::new("/a/b/c", ""),
            sample().forward().forward(),
        ];
        for route in samples {
            let twice = route.reverse().reverse();
            assert_eq!(twice.src, route.src);
            assert_eq!(twice.dst, route.dst);
            assert_eq!(twice.index(), 0);
        }
    }

    #[test]
    fn test_forward_clamps_to_last_segment() {
        let mut route = sample();
        for _ in 0..10 {
            route = route.forward();
            assert!(route.index() <= route.dst.len() - 1);
        }
        assert_eq!(route.position(), Some("Echo"));
        assert!(route.at_end());

        let empty = Route::new("/a", "").forward();
        assert_eq!(empty.index(), 0);
        assert_eq!(empty.position(), None);
    }

    #[test]
    fn test_forward_is_pure() {
        let route = sample();
        let next = route.forward();
        assert_eq!(route.index(), 0);
        assert_eq!(next.index(), 1);
        assert_eq!(next.position(), Some("1.0.0"));
    }

    #[test]
    fn test_display_marks_cursor() {
        let route = sample().forward();
        assert_eq!(route.to_string(), "[Bus:Client] -> [Bus:<1.0.0>:Try:Echo]");
    }

    #[test]
    fn test_error_mentions_route() {
        let err = sample().error(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        let text = err.to_string();
        assert!(text.contains("boom"));
        assert!(text.contains("[Bus:Client]"));
        assert_eq!(err.kind(), "wrapped");
    }
}
