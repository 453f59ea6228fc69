// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Hierarchical addressing for the device graph.
//!
//! Every device, route segment and encoding name passes through the same
//! normalizer so that `"/file-system/read-bytes"`, `"file_system.read_bytes"`
//! and `"FileSystem:ReadBytes"` all name the same chain:
//!
//! ```text
//! raw path ──split(chain sep)──▶ pieces ──split(word sep)──▶ words
//!          ──standardize──▶ "File" "System" ──join──▶ "FileSystem"
//! ```
//!
//! # Examples
//!
//! ```rust
//! use the_switchyard::address::{Address, standardize};
//!
//! let address = Address::parse("/file-system/read-bytes");
//! assert_eq!(address.segments(), &["FileSystem", "ReadBytes"]);
//! assert_eq!(standardize("http"), "HTTP");
//! ```

mod address;
mod normalize;

pub use address::Address;
pub use normalize::{normalize, split_path, standardize, Separator, ABBREVIATIONS};
