// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::DEFAULT_COROUTINE_TIMEOUT_MS;
use crate::context::Context;
use crate::errors::CoroutineError;
use crate::observability::messages::coroutine::{
    CoroutineFinished, CoroutineStarted, CoroutineTimedOut,
};
use crate::observability::messages::StructuredLog;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoroutineState {
    Created,
    Suspended,
    Running,
    Dead,
}

impl Display for CoroutineState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CoroutineState::Created => "created",
            CoroutineState::Suspended => "suspended",
            CoroutineState::Running => "running",
            CoroutineState::Dead => "dead",
        };
        f.write_str(name)
    }
}

/// # Fields
/// * `timeout_ms` - Budget for every yield and resume handoff
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CoroutineOptions {
    pub timeout_ms: u64,
}

impl Default for CoroutineOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_COROUTINE_TIMEOUT_MS,
        }
    }
}

impl CoroutineOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

type BodyFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

/// A coroutine body, boxed by [`Coroutines::wrap`].
pub type Body<I, O> = Box<dyn FnOnce(Yielder<I, O>) -> BodyFuture + Send>;

/// Shared between the registry slot and the coroutine's [`Yielder`].
#[derive(Clone)]
struct SharedState(Arc<Mutex<CoroutineState>>);

impl SharedState {
    fn new() -> Self {
        Self(Arc::new(Mutex::new(CoroutineState::Created)))
    }

    fn get(&self) -> CoroutineState {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set(&self, state: CoroutineState) {
        let mut current = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        // dead is final
        if *current != CoroutineState::Dead {
            *current = state;
        }
    }
}

struct Slot<I, O> {
    state: SharedState,
    // serializes resume with itself
    resuming: tokio::sync::Mutex<()>,
    inbound: mpsc::Sender<I>,
    outbound: tokio::sync::Mutex<mpsc::Receiver<O>>,
    pending: Mutex<Option<(Body<I, O>, Yielder<I, O>)>>,
}

type Slots<I, O> = Arc<RwLock<HashMap<String, Arc<Slot<I, O>>>>>;

/// The inside half of a coroutine, handed to its body.
pub struct Yielder<I, O> {
    id: String,
    context: Context,
    timeout: Duration,
    state: SharedState,
    outbound: mpsc::Sender<O>,
    inbound: mpsc::Receiver<I>,
}

impl<I, O> Yielder<I, O> {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Hand `out` to the resumer and wait for the next input.
    pub async fn yield_(&mut self, out: O) -> Result<I, CoroutineError> {
        let Self {
            id,
            context,
            timeout,
            state,
            outbound,
            inbound,
        } = self;

        if state.get() == CoroutineState::Dead {
            return Err(CoroutineError::IsDead(id.clone()));
        }
        state.set(CoroutineState::Suspended);

        let dead = || CoroutineError::IsDead(id.clone());
        let handoff = async {
            outbound.send(out).await.map_err(|_| dead())?;
            inbound.recv().await.ok_or_else(dead)
        };

        let received = tokio::select! {
            received = tokio::time::timeout(*timeout, handoff) => match received {
                Ok(received) => received,
                Err(_) => {
                    CoroutineTimedOut { id: id.as_str(), waiting: "yield" }.log();
                    Err(CoroutineError::Timeout(id.clone()))
                }
            },
            _ = context.cancelled() => Err(dead()),
        };

        match received {
            Ok(input) => {
                state.set(CoroutineState::Running);
                Ok(input)
            }
            Err(error) => {
                state.set(CoroutineState::Dead);
                Err(error)
            }
        }
    }
}

/// A registry of coroutines exchanging `I` inputs for `O` outputs.
///
/// Cloning shares the registry.
pub struct Coroutines<I, O> {
    slots: Slots<I, O>,
    options: CoroutineOptions,
    next_id: Arc<AtomicU64>,
}

impl<I, O> Clone for Coroutines<I, O> {
    fn clone(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
            options: self.options.clone(),
            next_id: Arc::clone(&self.next_id),
        }
    }
}

impl<I, O> Coroutines<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    pub fn new(options: CoroutineOptions) -> Self {
        Self {
            slots: Arc::new(RwLock::new(HashMap::new())),
            options,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn options(&self) -> &CoroutineOptions {
        &self.options
    }

    /// Register `body` under a fresh id without starting it.
    ///
    /// A coroutine that is not called within the timeout is dropped from the
    /// registry and reads as dead.
    pub fn wrap<F, Fut>(&self, context: Context, body: F) -> String
    where
        F: FnOnce(Yielder<I, O>) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let id = self.fresh_id();
        let slot = self.register(id.clone(), context, Box::new(move |y| Box::pin(body(y))));
        self.expire_uncalled(&id, &slot);
        id
    }

    fn fresh_id(&self) -> String {
        format!("coroutine-{}", self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Register `body` under `id`; fails if that id is still alive.
    pub fn wrap_as<F, Fut>(&self, id: impl Into<String>, context: Context, body: F) -> Result<(), CoroutineError>
    where
        F: FnOnce(Yielder<I, O>) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let id = id.into();
        if self.slot(&id).is_some() {
            return Err(CoroutineError::AlreadyStarted(id));
        }
        let slot = self.register(id.clone(), context, Box::new(move |y| Box::pin(body(y))));
        self.expire_uncalled(&id, &slot);
        Ok(())
    }

    fn register(&self, id: String, context: Context, body: Body<I, O>) -> Arc<Slot<I, O>> {
        let (inbound_tx, inbound_rx) = mpsc::channel(1);
        let (outbound_tx, outbound_rx) = mpsc::channel(1);
        let state = SharedState::new();
        let slot = Arc::new(Slot {
            state: state.clone(),
            resuming: tokio::sync::Mutex::new(()),
            inbound: inbound_tx,
            outbound: tokio::sync::Mutex::new(outbound_rx),
            pending: Mutex::new(None),
        });
        let yielder = Yielder {
            id: id.clone(),
            context,
            timeout: self.options.timeout(),
            state,
            outbound: outbound_tx,
            inbound: inbound_rx,
        };
        *slot.pending.lock().unwrap_or_else(PoisonError::into_inner) = Some((body, yielder));
        self.slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::clone(&slot));
        slot
    }

    /// Evict `slot` once the timeout passes if nobody called it. Needs a
    /// runtime; outside one, wrapped coroutines stay until called.
    fn expire_uncalled(&self, id: &str, slot: &Arc<Slot<I, O>>) {
        let Ok(runtime) = Handle::try_current() else {
            return;
        };
        runtime.spawn(evict_uncalled(
            id.to_string(),
            Arc::downgrade(slot),
            Arc::downgrade(&self.slots),
            self.options.timeout(),
        ));
    }

    /// Run a wrapped coroutine on the current runtime.
    pub fn call(&self, id: &str) -> Result<JoinHandle<anyhow::Result<()>>, CoroutineError> {
        self.call_on(id, &Handle::current())
    }

    /// Run a wrapped coroutine on `handle`. The coroutine is deregistered
    /// when its body returns or panics.
    pub fn call_on(&self, id: &str, handle: &Handle) -> Result<JoinHandle<anyhow::Result<()>>, CoroutineError> {
        let slot = self
            .slot(id)
            .ok_or_else(|| CoroutineError::IsDead(id.to_string()))?;
        let (body, yielder) = slot
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or_else(|| CoroutineError::AlreadyStarted(id.to_string()))?;
        slot.state.set(CoroutineState::Running);
        CoroutineStarted { id }.log();

        let guard = Deregister {
            id: id.to_string(),
            slot,
            slots: Arc::clone(&self.slots),
        };
        Ok(handle.spawn(async move {
            let result = body(yielder).await;
            CoroutineFinished {
                id: &guard.id,
                error: result.as_ref().err().map(|e| format!("{:#}", e)).as_deref(),
            }
            .log();
            drop(guard);
            result
        }))
    }

    /// `wrap` followed by `call`.
    pub fn start<F, Fut>(&self, context: Context, body: F) -> Result<(String, JoinHandle<anyhow::Result<()>>), CoroutineError>
    where
        F: FnOnce(Yielder<I, O>) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let id = self.fresh_id();
        self.register(id.clone(), context, Box::new(move |y| Box::pin(body(y))));
        let handle = self.call(&id)?;
        Ok((id, handle))
    }

    /// Read the coroutine's next output, then send it `input`.
    ///
    /// Waits for the coroutine to yield if it is still running.
    pub async fn resume(&self, id: &str, input: I) -> Result<O, CoroutineError> {
        let slot = self
            .slot(id)
            .ok_or_else(|| CoroutineError::IsDead(id.to_string()))?;
        if slot.state.get() == CoroutineState::Dead {
            return Err(CoroutineError::IsDead(id.to_string()));
        }
        self.handoff(id, &slot, input).await
    }

    /// Like [`resume`](Self::resume) but only when the coroutine is
    /// currently suspended in a yield.
    pub async fn try_resume(&self, id: &str, input: I) -> Result<O, CoroutineError> {
        let slot = self
            .slot(id)
            .ok_or_else(|| CoroutineError::IsDead(id.to_string()))?;
        match slot.state.get() {
            CoroutineState::Suspended => self.handoff(id, &slot, input).await,
            CoroutineState::Dead => Err(CoroutineError::IsDead(id.to_string())),
            _ => Err(CoroutineError::NotSuspended(id.to_string())),
        }
    }

    async fn handoff(&self, id: &str, slot: &Slot<I, O>, input: I) -> Result<O, CoroutineError> {
        let _resuming = slot.resuming.lock().await;
        let exchange = async {
            let output = slot
                .outbound
                .lock()
                .await
                .recv()
                .await
                .ok_or_else(|| CoroutineError::IsDead(id.to_string()))?;
            slot.inbound
                .send(input)
                .await
                .map_err(|_| CoroutineError::IsDead(id.to_string()))?;
            Ok::<O, CoroutineError>(output)
        };
        match tokio::time::timeout(self.options.timeout(), exchange).await {
            Ok(result) => result,
            Err(_) => {
                CoroutineTimedOut { id, waiting: "resume" }.log();
                slot.state.set(CoroutineState::Dead);
                Err(CoroutineError::Timeout(id.to_string()))
            }
        }
    }

    /// Unknown ids read as [`CoroutineState::Dead`].
    pub fn status(&self, id: &str) -> CoroutineState {
        self.slot(id)
            .map(|slot| slot.state.get())
            .unwrap_or(CoroutineState::Dead)
    }

    /// Coroutines registered and not yet returned.
    pub fn len(&self) -> usize {
        self.slots.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, id: &str) -> Option<Arc<Slot<I, O>>> {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }
}

async fn evict_uncalled<I, O>(
    id: String,
    slot: Weak<Slot<I, O>>,
    slots: Weak<RwLock<HashMap<String, Arc<Slot<I, O>>>>>,
    timeout: Duration,
) {
    tokio::time::sleep(timeout).await;
    let (Some(slot), Some(slots)) = (slot.upgrade(), slots.upgrade()) else {
        return;
    };
    let uncalled = slot
        .pending
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take()
        .is_some();
    if !uncalled {
        return;
    }

    slot.state.set(CoroutineState::Dead);
    {
        let mut slots = slots.write().unwrap_or_else(PoisonError::into_inner);
        if slots.get(&id).is_some_and(|live| Arc::ptr_eq(live, &slot)) {
            slots.remove(&id);
        }
    }
    CoroutineTimedOut { id: &id, waiting: "call" }.log();
}

struct Deregister<I, O> {
    id: String,
    slot: Arc<Slot<I, O>>,
    slots: Slots<I, O>,
}

impl<I, O> Drop for Deregister<I, O> {
    fn drop(&mut self) {
        self.slot.state.set(CoroutineState::Dead);
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        // a later coroutine may have reused the id
        if slots.get(&self.id).is_some_and(|slot| Arc::ptr_eq(slot, &self.slot)) {
            slots.remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    fn registry<I: Send + 'static, O: Send + 'static>() -> Coroutines<I, O> {
        Coroutines::new(CoroutineOptions::default())
    }

    #[tokio::test]
    async fn test_ping_pong_ordering() {
        let coroutines = registry::<String, String>();
        let events = Arc::new(StdMutex::new(Vec::new()));

        let log = Arc::clone(&events);
        let (id, handle) = coroutines
            .start(Context::new(), move |mut y| async move {
                log.lock().unwrap().push("yield B".to_string());
                let a = y.yield_("B".to_string()).await?;
                log.lock().unwrap().push(format!("got {}", a));
                let c = y.yield_("D".to_string()).await?;
                log.lock().unwrap().push(format!("got {}", c));
                Ok(())
            })
            .unwrap();

        let first = coroutines.resume(&id, "A".to_string()).await.unwrap();
        events.lock().unwrap().push(format!("resumed with {}", first));
        let second = coroutines.resume(&id, "C".to_string()).await.unwrap();
        events.lock().unwrap().push(format!("resumed with {}", second));
        handle.await.unwrap().unwrap();

        let events = events.lock().unwrap().clone();
        let position = |needle: &str| events.iter().position(|e| e == needle).unwrap();
        assert!(position("yield B") < position("resumed with B"));
        assert!(position("got A") < position("resumed with D"));
        assert!(position("resumed with B") < position("got C"));
        assert_eq!(events.len(), 5);
    }

    #[tokio::test]
    async fn test_unknown_coroutine_is_dead() {
        let coroutines = registry::<(), ()>();
        assert_eq!(
            coroutines.resume("does-not-exist", ()).await,
            Err(CoroutineError::IsDead("does-not-exist".to_string()))
        );
        assert_eq!(coroutines.status("does-not-exist"), CoroutineState::Dead);
        assert!(matches!(
            coroutines.try_resume("does-not-exist", ()).await,
            Err(CoroutineError::IsDead(_))
        ));
    }

    #[tokio::test]
    async fn test_status_transitions() {
        let coroutines = registry::<u8, u8>();
        let (entered_tx, entered_rx) = tokio::sync::oneshot::channel();
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
        let id = coroutines.wrap(Context::new(), move |mut y| async move {
            let _ = entered_tx.send(());
            let _ = release_rx.await;
            y.yield_(1).await?;
            Ok(())
        });
        assert_eq!(coroutines.status(&id), CoroutineState::Created);

        let handle = coroutines.call(&id).unwrap();
        entered_rx.await.unwrap();
        assert_eq!(coroutines.status(&id), CoroutineState::Running);
        assert_eq!(
            coroutines.try_resume(&id, 0).await,
            Err(CoroutineError::NotSuspended(id.clone()))
        );

        release_tx.send(()).unwrap();
        while coroutines.status(&id) != CoroutineState::Suspended {
            tokio::task::yield_now().await;
        }
        assert_eq!(coroutines.try_resume(&id, 9).await, Ok(1));
        handle.await.unwrap().unwrap();
        assert_eq!(coroutines.status(&id), CoroutineState::Dead);
        assert!(coroutines.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_uncalled_coroutine_expires() {
        let coroutines: Coroutines<(), ()> = Coroutines::new(CoroutineOptions { timeout_ms: 500 });
        let id = coroutines.wrap(Context::new(), |_| async { Ok(()) });
        assert_eq!(coroutines.status(&id), CoroutineState::Created);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(coroutines.status(&id), CoroutineState::Dead);
        assert!(coroutines.is_empty());
        assert!(matches!(coroutines.call(&id), Err(CoroutineError::IsDead(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_called_coroutine_outlives_expiry() {
        let coroutines: Coroutines<(), ()> = Coroutines::new(CoroutineOptions { timeout_ms: 500 });
        let id = coroutines.wrap(Context::new(), |mut y| async move {
            y.yield_(()).await?;
            Ok(())
        });
        let handle = coroutines.call(&id).unwrap();

        tokio::time::sleep(Duration::from_millis(300)).await;
        coroutines.resume(&id, ()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_call_twice_is_rejected() {
        let coroutines = registry::<(), ()>();
        let id = coroutines.wrap(Context::new(), |mut y| async move {
            y.yield_(()).await?;
            Ok(())
        });
        let handle = coroutines.call(&id).unwrap();
        assert!(matches!(coroutines.call(&id), Err(CoroutineError::AlreadyStarted(_))));
        coroutines.resume(&id, ()).await.unwrap();
        handle.await.unwrap().unwrap();
        assert!(matches!(coroutines.call(&id), Err(CoroutineError::IsDead(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_yield_times_out_and_kills() {
        let coroutines: Coroutines<(), ()> = Coroutines::new(CoroutineOptions { timeout_ms: 1_000 });
        let (id, handle) = coroutines
            .start(Context::new(), |mut y| async move {
                y.yield_(()).await?;
                Ok(())
            })
            .unwrap();

        let result = handle.await.unwrap();
        let error = result.unwrap_err().downcast::<CoroutineError>().unwrap();
        assert_eq!(error, CoroutineError::Timeout(id.clone()));
        assert_eq!(coroutines.status(&id), CoroutineState::Dead);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_times_out_when_body_never_yields() {
        let coroutines: Coroutines<(), ()> = Coroutines::new(CoroutineOptions { timeout_ms: 500 });
        let (id, _handle) = coroutines
            .start(Context::new(), |yielder| async move {
                // holding the yielder keeps the outbound side open
                let _yielder = yielder;
                std::future::pending::<()>().await;
                Ok(())
            })
            .unwrap();

        let started = tokio::time::Instant::now();
        assert_eq!(
            coroutines.resume(&id, ()).await,
            Err(CoroutineError::Timeout(id.clone()))
        );
        assert!(started.elapsed() >= Duration::from_millis(500));
        assert_eq!(coroutines.status(&id), CoroutineState::Dead);
        assert!(matches!(coroutines.resume(&id, ()).await, Err(CoroutineError::IsDead(_))));
    }

    #[tokio::test]
    async fn test_panicking_body_is_deregistered() {
        let coroutines = registry::<(), ()>();
        let (id, handle) = coroutines
            .start(Context::new(), |_| async move {
                if true {
                    panic!("body exploded");
                }
                Ok(())
            })
            .unwrap();
        assert!(handle.await.unwrap_err().is_panic());
        assert_eq!(coroutines.status(&id), CoroutineState::Dead);
        assert!(coroutines.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_context_ends_yield() {
        let coroutines = registry::<(), ()>();
        let context = Context::new();
        let (id, handle) = coroutines
            .start(context.clone(), |mut y| async move {
                y.yield_(()).await?;
                y.yield_(()).await?;
                Ok(())
            })
            .unwrap();
        coroutines.resume(&id, ()).await.unwrap();
        context.cancel();
        let error = handle.await.unwrap().unwrap_err();
        assert!(matches!(
            error.downcast_ref::<CoroutineError>(),
            Some(CoroutineError::IsDead(_))
        ));
    }

    #[tokio::test]
    async fn test_wrap_as_rejects_live_id() {
        let coroutines = registry::<(), ()>();
        coroutines
            .wrap_as("caller-1", Context::new(), |_| async { Ok(()) })
            .unwrap();
        assert_eq!(
            coroutines.wrap_as("caller-1", Context::new(), |_| async { Ok(()) }),
            Err(CoroutineError::AlreadyStarted("caller-1".to_string()))
        );
        assert_eq!(coroutines.len(), 1);
    }
}
