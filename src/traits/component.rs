// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::device::Handlers;

/// A user object whose methods are exposed as handlers of a
/// [`Service`](crate::device::Service).
///
/// Binding calls [`register`](Component::register) once; each registered
/// method becomes a handler device named after the normalized method name.
///
/// ```rust
/// use std::sync::Arc;
/// use the_switchyard::context::Context;
/// use the_switchyard::device::Handlers;
/// use the_switchyard::traits::Component;
///
/// struct Shout;
///
/// impl Shout {
///     async fn shout(self: Arc<Self>, _ctx: Context, body: Vec<u8>) -> anyhow::Result<Vec<u8>> {
///         Ok(body.to_ascii_uppercase())
///     }
/// }
///
/// impl Component for Shout {
///     fn register(handlers: &mut Handlers<Self>) {
///         handlers.handle("shout", Shout::shout);
///     }
/// }
/// ```
pub trait Component: Send + Sync + Sized + 'static {
    fn register(handlers: &mut Handlers<Self>);
}
