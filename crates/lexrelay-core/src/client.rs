//! HTTP client for the relay's chat endpoint

use reqwest::{Client, Response, header};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::{RelayError, Result, truncate_error_body};
use crate::http_client::build_http_client;
use crate::reconstructor::{SessionEvent, StreamSession};
use crate::request::{CHAT_PATH, ChatRequest};

/// Relay client
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl RelayClient {
    /// Create a client for the relay at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: build_http_client(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    /// Send `Authorization: Bearer <key>` with every request
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|key| !key.trim().is_empty());
        self
    }

    pub fn chat_url(&self) -> String {
        format!("{}{}", self.base_url, CHAT_PATH)
    }

    /// Send `request` and return the response once its headers arrived.
    ///
    /// Network failures and non-2xx replies are both open failures; the body
    /// of a successful response has not been read yet.
    pub async fn open(&self, request: &ChatRequest) -> Result<Response> {
        let mut builder = self
            .client
            .post(self.chat_url())
            .header(header::ACCEPT, "text/event-stream")
            .json(request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| RelayError::StreamOpen(format!("Request failed: {}", err)))?;

        if !response.status().is_success() {
            return Err(response_to_error(response).await);
        }
        Ok(response)
    }

    /// Start a streaming exchange on a background task.
    pub fn start(&self, request: ChatRequest) -> StreamHandle {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let mut session = StreamSession::new(CancellationToken::new());
        let id = session.id();
        let cancel = session.cancel_token();
        let client = self.clone();

        tracing::info!(session = %id, turns = request.messages.len(), "Starting relay session");

        let task_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            session.begin_sending();
            let opened = tokio::select! {
                biased;
                _ = task_cancel.cancelled() => None,
                opened = client.open(&request) => Some(opened),
            };

            match opened {
                None => {
                    session.abort(&events_tx);
                }
                Some(Err(err)) => {
                    tracing::warn!(
                        session = %session.id(),
                        error = %err,
                        "Failed to open relay stream"
                    );
                    session.fail_open(err.to_string(), &events_tx);
                }
                Some(Ok(response)) => {
                    session.run(Some(response.bytes_stream()), &events_tx).await;
                }
            }
            session
        });

        StreamHandle {
            id,
            cancel,
            events: events_rx,
            task,
        }
    }
}

async fn response_to_error(response: Response) -> RelayError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    RelayError::UpstreamHttp {
        status,
        message: truncate_error_body(body),
    }
}

/// Owner side of a running session
#[derive(Debug)]
pub struct StreamHandle {
    id: Uuid,
    cancel: CancellationToken,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    task: JoinHandle<StreamSession>,
}

impl StreamHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Stop receiving more of the reply. Idempotent.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Next event from the session, `None` once the session task is gone.
    pub async fn recv(&mut self) -> Option<SessionEvent> {
        self.events.recv().await
    }

    /// Wait for the session task and return its final state.
    pub async fn join(self) -> Option<StreamSession> {
        self.task.await.ok()
    }
}
