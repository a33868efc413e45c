//! Request coordinator: per-capability bootstrap-then-swap state machine.
//!
//! Every capability slot starts in [`HandlerState::Bootstrapping`], where
//! requests are parked. The first `(Model, ClientConfiguration)` emission
//! moves all slots to [`HandlerState::Ready`] and answers the parked requests
//! as one wave. Afterwards each emission swaps the bound [`Context`]; a
//! request clones the current `Arc<Context>` and keeps it for its whole call.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::Value;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use super::error::RequestError;
use super::progress::{ProgressKind, ProgressReporter};
use crate::base::constants::REQUEST_PROGRESS_TITLE;
use crate::config::ClientConfiguration;
use crate::core::CombinedCell;
use crate::ide::{Capability, CapabilityHandler, Context, HandlerError};
use crate::model::Model;

type Response = Result<Value, RequestError>;

struct PendingRequest {
    params: Value,
    cancel: CancellationToken,
    respond: oneshot::Sender<Response>,
}

enum HandlerState {
    /// Waiting for the first context; parked requests in arrival order.
    Bootstrapping(Vec<PendingRequest>),
    /// Bound to the latest context.
    Ready(Arc<Context>),
}

struct Slot {
    handler: Arc<dyn CapabilityHandler>,
    state: HandlerState,
}

#[derive(Default)]
struct State {
    slots: FxHashMap<Capability, Slot>,
    latest: Option<Arc<Context>>,
    closed: bool,
}

struct Wave {
    capability: Capability,
    handler: Arc<dyn CapabilityHandler>,
    pending: Vec<PendingRequest>,
}

enum Dispatch {
    Now(Arc<dyn CapabilityHandler>, Arc<Context>, Value),
    Parked(oneshot::Receiver<Response>),
}

/// Dispatches capability requests against the latest bound context.
#[derive(Clone)]
pub struct RequestCoordinator {
    state: Arc<Mutex<State>>,
    progress: ProgressReporter,
}

impl RequestCoordinator {
    pub fn new(progress: ProgressReporter) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            progress,
        }
    }

    /// Install (or replace) the handler of `capability`.
    ///
    /// A new slot starts ready if a context was already bound. Replacing a
    /// handler keeps the slot's state and parked requests.
    pub fn register(&self, capability: Capability, handler: Arc<dyn CapabilityHandler>) {
        let mut state = self.state.lock();
        let initial = match &state.latest {
            Some(context) => HandlerState::Ready(Arc::clone(context)),
            None => HandlerState::Bootstrapping(Vec::new()),
        };
        match state.slots.get_mut(&capability) {
            Some(slot) => slot.handler = handler,
            None => {
                state.slots.insert(capability, Slot { handler, state: initial });
            }
        }
    }

    /// Rebind every slot to the emitted pair.
    pub fn attach(&self, combined: &CombinedCell<Model, ClientConfiguration>) {
        let coordinator = self.clone();
        combined.subscribe(move |model, config| {
            coordinator.bind(Arc::new(Context::new(Arc::clone(model), Arc::clone(config))));
        });
    }

    /// Swap the bound context of every slot. Slots leaving `Bootstrapping`
    /// have their parked requests answered against `context`.
    pub fn bind(&self, context: Arc<Context>) {
        let waves: Vec<Wave> = {
            let mut state = self.state.lock();
            state.latest = Some(Arc::clone(&context));

            let mut waves = Vec::new();
            for (capability, slot) in state.slots.iter_mut() {
                let previous =
                    std::mem::replace(&mut slot.state, HandlerState::Ready(Arc::clone(&context)));
                if let HandlerState::Bootstrapping(pending) = previous {
                    if !pending.is_empty() {
                        waves.push(Wave {
                            capability: capability.clone(),
                            handler: Arc::clone(&slot.handler),
                            pending,
                        });
                    }
                }
            }
            waves
        };

        tracing::debug!(
            generation = context.model.generation(),
            "capability handlers rebound"
        );

        if !waves.is_empty() {
            self.answer_wave(waves, &context);
        }
    }

    /// Parked requests released by the first context, under one progress token.
    fn answer_wave(&self, waves: Vec<Wave>, context: &Context) {
        let total: usize = waves.iter().map(|w| w.pending.len()).sum();
        let guard = self.progress.begin(ProgressKind::Request, REQUEST_PROGRESS_TITLE);
        tracing::debug!(token = %guard.token(), requests = total, "answering parked requests");

        let mut answered = 0;
        for wave in waves {
            for request in wave.pending {
                answered += 1;
                if request.cancel.is_cancelled() || request.respond.is_closed() {
                    continue;
                }
                let response = invoke(
                    &wave.capability,
                    wave.handler.as_ref(),
                    &request.params,
                    context,
                    &request.cancel,
                );
                guard.report(format!("{} ({answered}/{total})", wave.capability));
                // The requester may have gone away meanwhile.
                let _ = request.respond.send(response);
            }
        }
        guard.finish(None);
    }

    /// Answer one request.
    ///
    /// Before the first context is bound the request is parked; it resolves
    /// once the first context arrives, or with [`RequestError::Cancelled`]
    /// as soon as `cancel` fires.
    pub async fn request(
        &self,
        capability: &Capability,
        params: Value,
        cancel: CancellationToken,
    ) -> Result<Value, RequestError> {
        if cancel.is_cancelled() {
            return Err(RequestError::Cancelled);
        }

        let dispatch = {
            let mut state = self.state.lock();
            if state.closed {
                return Err(RequestError::Shutdown);
            }
            let slot = state
                .slots
                .get_mut(capability)
                .ok_or_else(|| RequestError::UnknownCapability(capability.clone()))?;

            match &mut slot.state {
                HandlerState::Ready(context) => {
                    Dispatch::Now(Arc::clone(&slot.handler), Arc::clone(context), params)
                }
                HandlerState::Bootstrapping(pending) => {
                    let (respond, receiver) = oneshot::channel();
                    pending.push(PendingRequest {
                        params,
                        cancel: cancel.clone(),
                        respond,
                    });
                    tracing::debug!(capability = %capability, "no context yet; parking request");
                    Dispatch::Parked(receiver)
                }
            }
        };

        match dispatch {
            Dispatch::Now(handler, context, params) => {
                let guard = self.progress.begin(ProgressKind::Request, REQUEST_PROGRESS_TITLE);
                let response = invoke(capability, handler.as_ref(), &params, &context, &cancel);
                guard.finish(None);
                response
            }
            Dispatch::Parked(receiver) => tokio::select! {
                _ = cancel.cancelled() => Err(RequestError::Cancelled),
                response = receiver => response.unwrap_or(Err(RequestError::Shutdown)),
            },
        }
    }

    /// Refuse new requests and fail every parked one with `Shutdown`.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        for slot in state.slots.values_mut() {
            if let HandlerState::Bootstrapping(pending) = &mut slot.state {
                pending.clear();
            }
        }
    }

    pub fn is_ready(&self, capability: &Capability) -> bool {
        matches!(
            self.state.lock().slots.get(capability).map(|s| &s.state),
            Some(HandlerState::Ready(_))
        )
    }

    /// Number of requests parked on `capability`.
    pub fn pending_count(&self, capability: &Capability) -> usize {
        match self.state.lock().slots.get(capability).map(|s| &s.state) {
            Some(HandlerState::Bootstrapping(pending)) => pending.len(),
            _ => 0,
        }
    }

    /// The context new requests would be answered against.
    pub fn bound_context(&self) -> Option<Arc<Context>> {
        self.state.lock().latest.clone()
    }
}

impl fmt::Debug for RequestCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("RequestCoordinator")
            .field("slots", &state.slots.len())
            .field("bound", &state.latest.is_some())
            .field("closed", &state.closed)
            .finish()
    }
}

/// Run a handler, turning failures and panics into a `null` response.
fn invoke(
    capability: &Capability,
    handler: &dyn CapabilityHandler,
    params: &Value,
    context: &Context,
    cancel: &CancellationToken,
) -> Response {
    if cancel.is_cancelled() {
        return Err(RequestError::Cancelled);
    }

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler.handle(params, context, cancel)));
    match outcome {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(HandlerError::Cancelled)) => Err(RequestError::Cancelled),
        Ok(Err(error)) => {
            tracing::error!(capability = %capability, params = %params, "handler failed: {error}");
            Ok(Value::Null)
        }
        Err(payload) => {
            tracing::error!(
                capability = %capability,
                params = %params,
                "handler panicked: {}",
                panic_message(payload.as_ref())
            );
            Ok(Value::Null)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
