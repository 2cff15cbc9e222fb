//! Entry point for views: mounts resources, runs mutations, revalidates.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::errors::Result;
use crate::mutation::{Mutation, MutationRequest, MutationResult};
use crate::resource::{Resource, ResourceId, Revalidate, Shared};
use crate::session::Session;
use crate::transport::{HttpTransport, Transport};

struct ControllerInner {
    transport: Arc<dyn Transport>,
    session: Session,
    abort_superseded: bool,
    registry: Mutex<HashMap<ResourceId, Weak<dyn Revalidate>>>,
}

/// Cheap to clone; clones share the transport and the resource registry.
#[derive(Clone)]
pub struct ResourceController {
    inner: Arc<ControllerInner>,
}

impl ResourceController {
    pub fn new(transport: Arc<dyn Transport>, session: Session) -> Self {
        Self::with_options(transport, session, true)
    }

    pub fn with_options(
        transport: Arc<dyn Transport>,
        session: Session,
        abort_superseded: bool,
    ) -> Self {
        ResourceController {
            inner: Arc::new(ControllerInner {
                transport,
                session,
                abort_superseded,
                registry: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Build a controller backed by [`HttpTransport`].
    pub fn from_config(config: &ClientConfig, session: Session) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(config)?);
        Ok(Self::with_options(transport, session, config.abort_superseded))
    }

    /// Same transport (and therefore the same cookies), different session.
    pub fn with_session(&self, session: Session) -> Self {
        Self::with_options(
            Arc::clone(&self.inner.transport),
            session,
            self.inner.abort_superseded,
        )
    }

    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    fn registry(&self) -> MutexGuard<'_, HashMap<ResourceId, Weak<dyn Revalidate>>> {
        self.inner
            .registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Mount a resource slot under `id`.  A live resource already registered
    /// under the same id is superseded: its in-flight request is abandoned, it
    /// goes back to `Idle` for good and revalidation by id targets the new one.
    pub fn resource<P>(&self, id: impl Into<ResourceId>) -> Resource<P>
    where
        P: DeserializeOwned + Send + Sync + 'static,
    {
        let id = id.into();
        let shared = Arc::new(Shared::<P>::new(
            id.clone(),
            Arc::clone(&self.inner.transport),
            self.inner.abort_superseded,
        ));
        let weak: Weak<dyn Revalidate> = Arc::downgrade(&shared) as Weak<dyn Revalidate>;

        let previous = {
            let mut registry = self.registry();
            registry.retain(|_, entry| entry.strong_count() > 0);
            registry.insert(id.clone(), weak)
        };
        if let Some(previous) = previous.and_then(|w| w.upgrade()) {
            debug!("resource {id} superseded by a new mount");
            previous.abandon();
        }

        Resource::new(shared)
    }

    pub fn mutation<R>(&self) -> Mutation<R>
    where
        R: DeserializeOwned + Send + Sync + 'static,
    {
        Mutation::new(self.clone())
    }

    /// Perform a one-shot write.  On success, every resource in `revalidate`
    /// re-fetches; on failure no resource state is touched.
    pub async fn mutate<R>(
        &self,
        request: MutationRequest,
        revalidate: &[ResourceId],
    ) -> MutationResult<R>
    where
        R: DeserializeOwned,
    {
        let method = request.method();
        let endpoint = request.endpoint().to_string();

        let outcome = match self.inner.transport.send(request.into_api_request()).await {
            Ok(response) => response.decode::<R>(),
            Err(err) => Err(err),
        };

        match &outcome {
            Ok(_) => {
                info!("{} {endpoint} succeeded", method.as_str());
                for id in revalidate {
                    self.revalidate(id);
                }
            }
            Err(err) => warn!("{} {endpoint} failed: {err}", method.as_str()),
        }

        outcome
    }

    /// Force the resource mounted under `id` to re-fetch.  Returns `false` if
    /// no live, declared resource has that id.
    pub fn revalidate(&self, id: &ResourceId) -> bool {
        let target = self.registry().get(id).and_then(Weak::upgrade);
        match target {
            Some(resource) => resource.revalidate(),
            None => {
                debug!("revalidate {id}: no live resource");
                false
            }
        }
    }
}

impl std::fmt::Debug for ResourceController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceController")
            .field("session", &self.inner.session)
            .field("abort_superseded", &self.inner.abort_superseded)
            .finish()
    }
}
