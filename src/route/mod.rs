// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Routes and the message envelope that carries them through the device graph.
//!
//! A route pairs a source and a destination address with a cursor into the
//! destination. While the cursor sits on the root segment the route is
//! *assembling* and devices pass it up towards the bus; once the bus advances
//! it the route is *dispatching* and every device moves it one step down.
//!
//! ```text
//! src: [Bus:Client]
//! dst: [Bus:<1.0.0>:Try:Echo]   index = 1, position = "1.0.0"
//! ```

mod message;
#[allow(clippy::module_inception)]
mod route;

pub use message::Message;
pub use route::Route;
