//! One-shot writes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;

use crate::controller::ResourceController;
use crate::errors::FetchError;
use crate::resource::ResourceId;
use crate::state::MutationState;
use crate::transport::{ApiRequest, Method};

pub type MutationResult<R> = Result<R, FetchError>;

#[derive(Debug, Clone, PartialEq)]
pub struct MutationRequest {
    method: Method,
    endpoint: String,
    body: Option<Value>,
}

impl MutationRequest {
    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Method::Post, endpoint)
    }

    pub fn put(endpoint: impl Into<String>) -> Self {
        Self::new(Method::Put, endpoint)
    }

    pub fn patch(endpoint: impl Into<String>) -> Self {
        Self::new(Method::Patch, endpoint)
    }

    fn new(method: Method, endpoint: impl Into<String>) -> Self {
        MutationRequest {
            method,
            endpoint: endpoint.into(),
            body: None,
        }
    }

    /// Attach a JSON body.  Encoding failures are reported as decode errors.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, FetchError> {
        let value = serde_json::to_value(body)
            .map_err(|e| FetchError::decode(format!("Request body could not be encoded: {e}")))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub(crate) fn into_api_request(self) -> ApiRequest {
        ApiRequest {
            method: self.method,
            path: self.endpoint,
            body: self.body,
        }
    }
}

/// A write with its own observable [`MutationState`], e.g. to drive a
/// "Processing..." button.  Runs may overlap; the state tracks the latest one.
pub struct Mutation<R> {
    controller: ResourceController,
    runs: AtomicU64,
    state: watch::Sender<MutationState<R>>,
}

impl<R> Mutation<R>
where
    R: DeserializeOwned + Send + Sync + 'static,
{
    pub(crate) fn new(controller: ResourceController) -> Self {
        let (state, _) = watch::channel(MutationState::Idle);
        Mutation {
            controller,
            runs: AtomicU64::new(0),
            state,
        }
    }

    pub async fn run(
        &self,
        request: MutationRequest,
        revalidate: &[ResourceId],
    ) -> MutationResult<Arc<R>> {
        let run = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_replace(MutationState::Pending);

        let result = self
            .controller
            .mutate::<R>(request, revalidate)
            .await
            .map(Arc::new);

        if self.runs.load(Ordering::SeqCst) == run {
            self.state.send_replace(match &result {
                Ok(data) => MutationState::Success(Arc::clone(data)),
                Err(err) => MutationState::Error(err.clone()),
            });
        }
        result
    }

    pub fn state(&self) -> MutationState<R> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<MutationState<R>> {
        self.state.subscribe()
    }

    /// Back to `Idle`, e.g. after the view has shown the outcome.
    pub fn reset(&self) {
        self.runs.fetch_add(1, Ordering::SeqCst);
        self.state.send_replace(MutationState::Idle);
    }
}
