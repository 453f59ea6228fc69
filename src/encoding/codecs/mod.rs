// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-codec conversion routines used by [`Codec`](super::Codec).

pub(crate) mod base64;
pub(crate) mod binary;
pub(crate) mod csv;
pub mod hash;
pub(crate) mod protobuf;
pub(crate) mod text;
