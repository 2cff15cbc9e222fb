//! A single server-backed resource and its generation guard.
//!
//! Every dispatch bumps the resource's generation and remembers the value it
//! was issued under.  When the response arrives the two are compared under the
//! slot lock; a mismatch means a newer request (re-declare, revalidate,
//! [`Resource::replace_data`], unmount) has taken over and the response is
//! dropped without touching the [`ViewState`].

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::deps::Dependencies;
use crate::errors::FetchError;
use crate::state::ViewState;
use crate::transport::{ApiRequest, Transport};

/// Stable logical name of a resource slot, e.g. `"wallet.balance"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        ResourceId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        ResourceId::new(id)
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        ResourceId(id)
    }
}

impl From<&ResourceId> for ResourceId {
    fn from(id: &ResourceId) -> Self {
        id.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RequestKey {
    endpoint: String,
    deps: Dependencies,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    key: Option<RequestKey>,
    in_flight: Option<CancellationToken>,
    detached: bool,
}

/// Type-erased view of a resource, held weakly by the controller's registry.
pub(crate) trait Revalidate: Send + Sync {
    fn revalidate(self: Arc<Self>) -> bool;

    /// Retire this resource; used when another resource takes over the id.
    fn abandon(&self);
}

pub(crate) struct Shared<P> {
    id: ResourceId,
    transport: Arc<dyn Transport>,
    abort_superseded: bool,
    slot: Mutex<Slot>,
    state: watch::Sender<ViewState<P>>,
}

impl<P> Shared<P>
where
    P: DeserializeOwned + Send + Sync + 'static,
{
    pub(crate) fn new(id: ResourceId, transport: Arc<dyn Transport>, abort_superseded: bool) -> Self {
        let (state, _) = watch::channel(ViewState::Idle);
        Shared {
            id,
            transport,
            abort_superseded,
            slot: Mutex::new(Slot::default()),
            state,
        }
    }

    fn slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Advance the generation so anything still in flight loses.
    fn supersede(&self, slot: &mut Slot, abort: bool) {
        slot.generation += 1;
        if let Some(previous) = slot.in_flight.take() {
            if abort {
                previous.cancel();
            }
        }
    }

    fn dispatch(self: &Arc<Self>, slot: &mut Slot, key: &RequestKey) {
        self.supersede(slot, self.abort_superseded);
        let generation = slot.generation;
        let token = CancellationToken::new();
        slot.in_flight = Some(token.clone());

        self.state.send_modify(|state| {
            let stale = state.carry_forward();
            *state = ViewState::Loading { stale };
        });

        debug!(
            "resource {} → GET {} (generation {generation})",
            self.id, key.endpoint
        );

        let shared = Arc::clone(self);
        let request = ApiRequest::get(key.endpoint.clone());
        tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = token.cancelled() => {
                    debug!("resource {} generation {generation} cancelled", shared.id);
                    return;
                }
                outcome = shared.fetch(request) => outcome,
            };
            shared.settle(generation, outcome);
        });
    }

    async fn fetch(&self, request: ApiRequest) -> Result<P, FetchError> {
        let response = self.transport.send(request).await?;
        response.decode::<P>()
    }

    fn settle(&self, generation: u64, outcome: Result<P, FetchError>) {
        let mut slot = self.slot();
        if slot.generation != generation {
            debug!(
                "resource {}: discarding stale response (generation {generation}, current {})",
                self.id, slot.generation
            );
            return;
        }
        slot.in_flight = None;

        match outcome {
            Ok(data) => {
                debug!("resource {} settled (generation {generation})", self.id);
                self.state.send_replace(ViewState::Success(Arc::new(data)));
            }
            Err(err) => {
                warn!("resource {} failed: {err}", self.id);
                self.state.send_replace(ViewState::Error(err));
            }
        }
    }
}

impl<P> Revalidate for Shared<P>
where
    P: DeserializeOwned + Send + Sync + 'static,
{
    fn revalidate(self: Arc<Self>) -> bool {
        let mut slot = self.slot();
        if slot.detached {
            return false;
        }
        let Some(key) = slot.key.clone() else {
            debug!("resource {}: nothing declared, skipping revalidation", self.id);
            return false;
        };
        self.dispatch(&mut slot, &key);
        true
    }

    fn abandon(&self) {
        let mut slot = self.slot();
        slot.detached = true;
        self.supersede(&mut slot, true);
        self.state.send_replace(ViewState::Idle);
    }
}

/// Handle to one mounted resource.  Dropping it unmounts the resource and
/// abandons any request still in flight.
pub struct Resource<P>
where
    P: DeserializeOwned + Send + Sync + 'static,
{
    shared: Arc<Shared<P>>,
}

impl<P> Resource<P>
where
    P: DeserializeOwned + Send + Sync + 'static,
{
    pub(crate) fn new(shared: Arc<Shared<P>>) -> Self {
        Resource { shared }
    }

    pub fn id(&self) -> &ResourceId {
        &self.shared.id
    }

    /// Register interest in `endpoint` with the given dependencies.
    ///
    /// Fetches on the first call and whenever the endpoint or any dependency
    /// differs from the previous call; otherwise does nothing.  Must be called
    /// from within a tokio runtime.  A resource superseded by a newer mount
    /// of the same id stays `Idle` and never fetches again.
    pub fn declare(&self, endpoint: impl Into<String>, deps: Dependencies) -> ViewState<P> {
        let key = RequestKey {
            endpoint: endpoint.into(),
            deps,
        };

        {
            let mut slot = self.shared.slot();
            if slot.detached || slot.key.as_ref() == Some(&key) {
                return self.state();
            }
            slot.key = Some(key.clone());
            self.shared.dispatch(&mut slot, &key);
        }

        self.state()
    }

    /// Re-run the last declared fetch.  Returns `false` if nothing was declared.
    pub fn revalidate(&self) -> bool {
        Arc::clone(&self.shared).revalidate()
    }

    /// Adopt state returned by the server (e.g. by a mutation) without a
    /// round trip.  Any fetch still in flight is superseded.
    pub fn replace_data(&self, data: P) {
        let mut slot = self.shared.slot();
        if slot.detached {
            return;
        }
        self.shared.supersede(&mut slot, self.shared.abort_superseded);
        self.shared.state.send_replace(ViewState::Success(Arc::new(data)));
    }

    pub fn state(&self) -> ViewState<P> {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState<P>> {
        self.shared.state.subscribe()
    }

    /// Wait until the current request has settled, then return the state.
    /// Returns immediately when nothing has been declared.
    pub async fn settled(&self) -> ViewState<P> {
        let mut rx = self.subscribe();
        let result = rx
            .wait_for(|state| state.is_settled() || matches!(state, ViewState::Idle))
            .await
            .map(|state| state.clone());
        result.unwrap_or_else(|_| self.state())
    }

    /// Current generation; advances on every dispatch or supersession.
    pub fn generation(&self) -> u64 {
        self.shared.slot().generation
    }
}

impl<P> Drop for Resource<P>
where
    P: DeserializeOwned + Send + Sync + 'static,
{
    fn drop(&mut self) {
        let mut slot = self.shared.slot();
        slot.detached = true;
        self.shared.supersede(&mut slot, true);
    }
}

impl<P> fmt::Debug for Resource<P>
where
    P: DeserializeOwned + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("id", &self.shared.id)
            .field("generation", &self.generation())
            .finish()
    }
}
