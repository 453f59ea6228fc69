// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::address::{normalize, Separator};
use crate::context::Context;
use crate::encoding::{Chain, Payload};
use crate::traits::Component;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub(crate) type HandlerFuture = Pin<Box<dyn Future<Output = anyhow::Result<Vec<u8>>> + Send>>;

/// A registered method with the payload conversion folded in: decode the
/// request under the reversed chain, call the method, encode the response
/// under the chain itself.
pub(crate) type HandlerFn<C> =
    Arc<dyn Fn(Arc<C>, Context, Chain, Vec<u8>) -> HandlerFuture + Send + Sync>;

/// The handler table a [`Component`] fills in when it is bound.
pub struct Handlers<C> {
    methods: Vec<(String, HandlerFn<C>)>,
}

impl<C: Component> Handlers<C> {
    pub(crate) fn collect() -> Self {
        let mut handlers = Self {
            methods: Vec::new(),
        };
        C::register(&mut handlers);
        handlers
    }

    /// Expose `handler` under `method`.
    ///
    /// Method names are normalized like route segments, with `-` and `_`
    /// both separating words: `echo_bytes` registers the handler that the
    /// route segment `echo-bytes` reaches. Registering a name twice
    /// replaces the earlier handler.
    pub fn handle<Req, Resp, F, Fut>(&mut self, method: &str, handler: F) -> &mut Self
    where
        Req: Payload,
        Resp: Payload,
        F: Fn(Arc<C>, Context, Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Resp>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        let erased: HandlerFn<C> = Arc::new(move |component, ctx, chain, data| {
            let handler = Arc::clone(&handler);
            Box::pin(async move {
                let request: Req = chain.reverse().unmarshal(&data)?;
                let response = handler(component, ctx, request).await?;
                Ok(chain.marshal(&response)?)
            })
        });

        let name = method_name(method);
        self.methods.retain(|(existing, _)| *existing != name);
        self.methods.push((name, erased));
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.methods.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub(crate) fn into_methods(self) -> Vec<(String, HandlerFn<C>)> {
        self.methods
    }
}

pub(crate) fn method_name(method: &str) -> String {
    normalize(&method.replace('_', "-"), Separator::Dash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{Codec, Record};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Greeting {
        name: String,
    }
    impl Record for Greeting {}

    struct Greeter;

    impl Component for Greeter {
        fn register(handlers: &mut Handlers<Self>) {
            handlers
                .handle("say_hello", |_: Arc<Self>, _, req: Greeting| async move {
                    Ok(Greeting {
                        name: format!("hello {}", req.name),
                    })
                })
                .handle("raw-bytes", |_: Arc<Self>, _, req: Vec<u8>| async move { Ok(req) });
        }
    }

    #[test]
    fn test_method_names_are_normalized() {
        assert_eq!(method_name("echo"), "Echo");
        assert_eq!(method_name("echo_bytes"), "EchoBytes");
        assert_eq!(method_name("echo-bytes"), "EchoBytes");
        assert_eq!(method_name("get_http_url"), "GetHTTPURL");
    }

    #[test]
    fn test_collect_registers_every_method() {
        let handlers = Handlers::<Greeter>::collect();
        assert_eq!(handlers.names().collect::<Vec<_>>(), vec!["SayHello", "RawBytes"]);
    }

    #[tokio::test]
    async fn test_erased_handler_converts_payloads() {
        let methods = Handlers::<Greeter>::collect().into_methods();
        let (_, say_hello) = &methods[0];
        let chain = Chain::of(&[Codec::Json]);
        let request = chain
            .marshal(&Greeting {
                name: "ada".to_string(),
            })
            .unwrap();

        let response = say_hello(Arc::new(Greeter), Context::new(), chain.clone(), request)
            .await
            .unwrap();
        let decoded: Greeting = chain.reverse().unmarshal(&response).unwrap();
        assert_eq!(decoded.name, "hello ada");
    }

    #[tokio::test]
    async fn test_erased_handler_reports_decode_errors() {
        let methods = Handlers::<Greeter>::collect().into_methods();
        let (_, say_hello) = &methods[0];
        let chain = Chain::of(&[Codec::Json]);
        let error = say_hello(Arc::new(Greeter), Context::new(), chain, b"not json".to_vec())
            .await
            .unwrap_err();
        assert!(error.to_string().contains("JSON"), "{}", error);
    }
}
