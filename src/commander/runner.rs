// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::{ServiceRequest, ServiceResponse};
use crate::config::consts::{DEFAULT_CHANNEL_BACKLOG, DEFAULT_REPLY_TIMEOUT_MS};
use crate::config::FabricConfig;
use crate::context::Context;
use crate::controller::{TpsController, TpsOptions};
use crate::coroutine::{CoroutineOptions, Coroutines, Yielder};
use crate::device::Client;
use crate::encoding::{Chain, Codec};
use crate::errors::SchedulerError;
use crate::observability::messages::commander::{
    CommanderStarted, RequestAnswered, RequestFailed, ResponseUndeliverable,
};
use crate::observability::messages::StructuredLog;
use crate::scheduler::Task;
use crate::traits::Device;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Commander tuning.
///
/// # Fields
/// * `tps` - Options of the controller that runs request tasks
/// * `coroutine` - Options of the registry behind [`Commander::call`]
/// * `encoding` - Chain request bodies are marshalled with
/// * `reply_timeout` - How long one request waits for its reply
/// * `backlog` - Capacity of the request and response channels
#[derive(Debug, Clone)]
pub struct CommanderOptions {
    pub tps: TpsOptions,
    pub coroutine: CoroutineOptions,
    pub encoding: Chain,
    pub reply_timeout: Duration,
    pub backlog: usize,
}

impl Default for CommanderOptions {
    fn default() -> Self {
        Self {
            tps: TpsOptions::default(),
            coroutine: CoroutineOptions::default(),
            encoding: Chain::single(Codec::Json),
            reply_timeout: Duration::from_millis(DEFAULT_REPLY_TIMEOUT_MS),
            backlog: DEFAULT_CHANNEL_BACKLOG,
        }
    }
}

impl CommanderOptions {
    /// Controller, coroutine and timeout settings taken from a fabric
    /// configuration; JSON encoding.
    pub fn from_config(cfg: &FabricConfig) -> Self {
        Self {
            tps: cfg.tps.clone(),
            coroutine: cfg.coroutine.clone(),
            reply_timeout: cfg.reply_timeout(),
            ..Self::default()
        }
    }
}

struct Shared {
    client: Arc<Client>,
    controller: TpsController,
    coroutines: Coroutines<ServiceResponse, ()>,
    encoding: Chain,
    reply_timeout: Duration,
    responses: mpsc::Sender<ServiceResponse>,
    context: Context,
}

impl Shared {
    /// Send `request.body` to its target and wait for the decoded reply.
    async fn invoke(&self, ctx: &Context, request: &ServiceRequest) -> ServiceResponse {
        let reply = self
            .client
            .call::<serde_json::Value, serde_json::Value>(
                ctx,
                &request.target,
                self.encoding.clone(),
                &request.body,
                self.reply_timeout,
            )
            .await;
        match reply {
            Ok(body) => ServiceResponse::ok(request.id, body),
            Err(error) => {
                let reason = error.to_string();
                RequestFailed {
                    id: request.id,
                    target: &request.target,
                    error: &reason,
                }
                .log();
                ServiceResponse::failed(request.id, reason)
            }
        }
    }

    /// Answer one request: through its coroutine when it has one, on the
    /// response channel otherwise.
    async fn serve(self: Arc<Self>, ctx: Context, request: ServiceRequest) -> anyhow::Result<()> {
        let response = self.invoke(&ctx, &request).await;
        RequestAnswered {
            id: request.id,
            target: &request.target,
            coroutine: request.coroutine.as_deref(),
        }
        .log();

        match &request.coroutine {
            Some(coroutine) => self.coroutines.resume(coroutine, response).await?,
            None => self
                .responses
                .send(response)
                .await
                .map_err(|_| anyhow::anyhow!("response channel closed"))?,
        }
        Ok(())
    }

    fn task(self: &Arc<Self>, request: ServiceRequest) -> Task {
        let shared = Arc::clone(self);
        Task::builder()
            .name(format!("request-{}", request.id))
            .parent(self.context.clone())
            .stage(move |scope| shared.serve(scope.context, request))
            .build()
    }
}

/// A client that turns [`ServiceRequest`]s into fabric messages.
///
/// Requests enter on an inbound channel, each becomes a task on the
/// commander's own TPS-controlled scheduler, and each response either goes
/// out on the response channel or resumes the coroutine that asked for it.
/// [`call`](Commander::call) uses the second path to give callers a plain
/// request/response API.
pub struct Commander {
    shared: Arc<Shared>,
    requests: mpsc::Sender<ServiceRequest>,
    inbound: Mutex<Option<mpsc::Receiver<ServiceRequest>>>,
    outbound: Mutex<Option<mpsc::Receiver<ServiceResponse>>>,
    die: CancellationToken,
    intake: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl Commander {
    /// A commander whose client `name` is attached under `gateway`.
    pub fn new(name: &str, gateway: &dyn Device, options: CommanderOptions) -> Self {
        let client = Client::new(name, None);
        gateway.integrate(client.clone());

        let backlog = options.backlog.max(1);
        let (requests, inbound) = mpsc::channel(backlog);
        let (responses, outbound) = mpsc::channel(backlog);

        Self {
            shared: Arc::new(Shared {
                client,
                controller: TpsController::new(options.tps),
                coroutines: Coroutines::new(options.coroutine),
                encoding: options.encoding,
                reply_timeout: options.reply_timeout,
                responses,
                context: Context::new(),
            }),
            requests,
            inbound: Mutex::new(Some(inbound)),
            outbound: Mutex::new(Some(outbound)),
            die: CancellationToken::new(),
            intake: tokio::sync::Mutex::new(None),
        }
    }

    pub fn client(&self) -> &Arc<Client> {
        &self.shared.client
    }

    pub fn controller(&self) -> &TpsController {
        &self.shared.controller
    }

    pub fn coroutines(&self) -> &Coroutines<ServiceResponse, ()> {
        &self.shared.coroutines
    }

    /// Start the controller and the loop that turns requests into tasks.
    pub async fn start(&self) -> Result<(), SchedulerError> {
        let inbound = self
            .inbound
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(SchedulerError::AlreadyServing)?;
        self.shared.controller.start().await?;

        CommanderStarted {
            commander: &self.shared.client.address().to_string(),
            encoding: &self.shared.encoding.to_string(),
            tps_limit: self.shared.controller.options().tps_limit,
        }
        .log();

        let handle = tokio::spawn(intake(Arc::clone(&self.shared), inbound, self.die.clone()));
        *self.intake.lock().await = Some(handle);
        Ok(())
    }

    /// Queue `request`; its response arrives on [`responses`](Self::responses)
    /// unless it names a coroutine.
    pub async fn submit(&self, request: ServiceRequest) -> Result<(), SchedulerError> {
        if self.die.is_cancelled() {
            return Err(SchedulerError::Closed);
        }
        self.requests
            .send(request)
            .await
            .map_err(|_| SchedulerError::Closed)
    }

    /// The response channel. Only the first call gets it.
    pub fn responses(&self) -> Option<mpsc::Receiver<ServiceResponse>> {
        self.outbound.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    /// Send `request` and wait for its response.
    ///
    /// The wait happens in a coroutine: it submits the request tagged with its
    /// own id, then yields until the request task resumes it with the
    /// response.
    pub async fn call(&self, ctx: &Context, mut request: ServiceRequest) -> anyhow::Result<ServiceResponse> {
        if self.die.is_cancelled() {
            return Err(SchedulerError::Closed.into());
        }
        let (answer, answered) = oneshot::channel();
        let requests = self.requests.clone();

        let (_, body) = self.shared.coroutines.start(
            ctx.clone(),
            move |mut yielder: Yielder<ServiceResponse, ()>| async move {
                request.coroutine = Some(yielder.id().to_string());
                requests
                    .send(request)
                    .await
                    .map_err(|_| anyhow::Error::from(SchedulerError::Closed))?;
                let response = yielder.yield_(()).await?;
                let _ = answer.send(response);
                Ok(())
            },
        )?;

        match answered.await {
            Ok(response) => Ok(response),
            Err(_) => match body.await {
                Ok(Err(error)) => Err(error),
                Ok(Ok(())) => Err(anyhow::anyhow!("coroutine returned without a response")),
                Err(join) => Err(join.into()),
            },
        }
    }

    /// Stop taking requests and close the controller. Request tasks already
    /// running finish; queued ones are dropped.
    pub async fn close(&self) {
        self.die.cancel();
        if let Some(handle) = self.intake.lock().await.take() {
            let _ = handle.await;
        }
        self.shared.controller.close().await;
    }
}

async fn intake(shared: Arc<Shared>, mut inbound: mpsc::Receiver<ServiceRequest>, die: CancellationToken) {
    loop {
        let request = tokio::select! {
            biased;
            _ = die.cancelled() => break,
            request = inbound.recv() => match request {
                Some(request) => request,
                None => break,
            },
        };

        let id = request.id;
        let target = request.target.clone();
        let coroutine = request.coroutine.clone();
        if let Err(error) = shared.controller.publish(shared.task(request)).await {
            let reason = error.to_string();
            RequestFailed {
                id,
                target: &target,
                error: &reason,
            }
            .log();
            let response = ServiceResponse::failed(id, reason);
            let delivered = match coroutine {
                Some(coroutine) => shared
                    .coroutines
                    .resume(&coroutine, response)
                    .await
                    .map_err(|e| e.to_string()),
                None => shared
                    .responses
                    .send(response)
                    .await
                    .map_err(|_| "response channel closed".to_string()),
            };
            if let Err(error) = delivered {
                ResponseUndeliverable { id, error: &error }.log();
            }
        }
    }
}
