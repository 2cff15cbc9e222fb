//! Test doubles for the [`Transport`] seam.
//!
//! [`ScriptedTransport`] works in two modes:
//!
//! * **held** — every request is parked until the test resolves it through the
//!   [`CallQueue`], in whatever order the test likes;
//! * **auto** — every request is answered immediately by a closure.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use crate::errors::FetchError;
use crate::transport::{ApiRequest, ApiResponse, Transport};

type Responder = dyn Fn(&ApiRequest) -> Result<ApiResponse, FetchError> + Send + Sync;

enum Mode {
    Held(mpsc::UnboundedSender<PendingCall>),
    Auto(Box<Responder>),
}

pub struct ScriptedTransport {
    mode: Mode,
    sent: AtomicUsize,
    log: Mutex<Vec<ApiRequest>>,
}

/// A request parked by a held [`ScriptedTransport`].
#[derive(Debug)]
pub struct PendingCall {
    pub request: ApiRequest,
    reply: oneshot::Sender<Result<ApiResponse, FetchError>>,
}

impl PendingCall {
    /// Answer with `200 OK` and a JSON body.  A caller that has already given
    /// up on the request is ignored.
    pub fn respond_json(self, body: Value) {
        self.respond(Ok(ApiResponse::json(&body)));
    }

    pub fn respond_status(self, status: u16, body: Value) {
        self.respond(Ok(ApiResponse::with_status(status, &body)));
    }

    pub fn fail(self, err: FetchError) {
        self.respond(Err(err));
    }

    pub fn respond(self, outcome: Result<ApiResponse, FetchError>) {
        let _ = self.reply.send(outcome);
    }

    /// `true` once the caller stopped waiting (its task was cancelled).
    pub fn is_abandoned(&self) -> bool {
        self.reply.is_closed()
    }
}

/// Test-side end of a held transport.
pub struct CallQueue {
    rx: mpsc::UnboundedReceiver<PendingCall>,
}

impl CallQueue {
    /// Next parked request.  Panics if the transport is gone.
    pub async fn next(&mut self) -> PendingCall {
        self.rx.recv().await.expect("transport dropped")
    }

    /// A parked request, if one is already waiting.
    pub fn try_next(&mut self) -> Option<PendingCall> {
        self.rx.try_recv().ok()
    }
}

impl ScriptedTransport {
    pub fn held() -> (Arc<Self>, CallQueue) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self::with_mode(Mode::Held(tx))), CallQueue { rx })
    }

    pub fn auto<F>(responder: F) -> Arc<Self>
    where
        F: Fn(&ApiRequest) -> Result<ApiResponse, FetchError> + Send + Sync + 'static,
    {
        Arc::new(Self::with_mode(Mode::Auto(Box::new(responder))))
    }

    fn with_mode(mode: Mode) -> Self {
        ScriptedTransport {
            mode,
            sent: AtomicUsize::new(0),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Number of requests sent so far.
    pub fn sent(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, FetchError> {
        self.sent.fetch_add(1, Ordering::SeqCst);
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        match &self.mode {
            Mode::Auto(responder) => responder(&request),
            Mode::Held(tx) => {
                let (reply, rx) = oneshot::channel();
                tx.send(PendingCall { request, reply })
                    .map_err(|_| FetchError::network("scripted transport closed"))?;
                rx.await
                    .unwrap_or_else(|_| Err(FetchError::network("scripted call dropped")))
            }
        }
    }
}

/// Let spawned fetch tasks run to completion on a current-thread runtime.
pub async fn drain() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}
