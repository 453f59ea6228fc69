// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Codecs and reversible encoding chains for message payloads.
//!
//! A payload is either the raw byte holder `Vec<u8>` or a typed [`Record`].
//! Each [`Codec`] advertises a [`Style`] saying which of the two it accepts.
//! A [`Chain`] strings codecs together so that a service can be addressed with
//! `"json.base64"` and answer with the same chain reversed:
//!
//! ```text
//! marshal:    value ─JSON─▶ bytes ─Base64─▶ bytes
//! unmarshal:  bytes ─Base64⁻¹─▶ bytes ─JSON⁻¹─▶ value   (chain.reverse())
//! ```
//!
//! # Examples
//!
//! ```rust
//! use the_switchyard::encoding::Chain;
//!
//! let chain = Chain::parse("json.base64")?;
//! let wire = chain.marshal(&"hello".to_string())?;
//! let back: String = chain.reverse().unmarshal(&wire)?;
//! assert_eq!(back, "hello");
//! # Ok::<(), the_switchyard::errors::EncodingError>(())
//! ```

mod chain;
mod codec;
pub mod codecs;
mod payload;
mod registry;

#[cfg(test)]
mod integration_tests;

pub use chain::Chain;
pub use codec::{Codec, Endian, Style};
pub use payload::{Payload, Record};
pub use registry::{registry, Registry, STANDARD_CODECS};

#[doc(hidden)]
pub use prost;
