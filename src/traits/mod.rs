// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The seams of the fabric: devices in the graph, processors consuming
//! replies, and components exposing handlers.

pub mod component;
pub mod device;
pub mod processor;

pub use component::Component;
pub use device::Device;
pub use processor::Processor;
