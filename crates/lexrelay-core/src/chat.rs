//! Conversation owner that applies stream events to display state

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::client::{RelayClient, StreamHandle};
use crate::conversation::{Attachment, Conversation, Turn};
use crate::error::{RelayError, Result};
use crate::reconstructor::{FailureKind, SessionEvent, SessionState};
use crate::request::{ChatRequest, DEFAULT_MODEL};

/// Shown in place of a reply that failed before any text arrived.
pub const DEFAULT_FAILURE_TEXT: &str = "Error: Unable to get response. Please try again.";

/// Shown in place of a reply that was cancelled before any text arrived.
pub const CANCELLED_TEXT: &str = "Response cancelled.";

/// In-flight exchange owned by a [`ChatSession`]
#[derive(Debug)]
struct ActiveReply {
    handle: StreamHandle,
    turn_index: usize,
}

/// Owns one conversation and at most one in-flight reply.
///
/// Sending while a reply is still streaming supersedes it: the earlier
/// session is cancelled, its partial text stays in its turn, and its event
/// channel is dropped so nothing it still produces can reach this state.
#[derive(Debug)]
pub struct ChatSession {
    client: RelayClient,
    model: String,
    failure_text: String,
    conversation: Conversation,
    active: Option<ActiveReply>,
    state: SessionState,
    last_failure: Option<(FailureKind, String)>,
}

impl ChatSession {
    pub fn new(client: RelayClient) -> Self {
        Self {
            client,
            model: DEFAULT_MODEL.to_string(),
            failure_text: DEFAULT_FAILURE_TEXT.to_string(),
            conversation: Conversation::new(),
            active: None,
            state: SessionState::Idle,
            last_failure: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Text shown when a reply fails before producing anything
    pub fn with_failure_text(mut self, text: impl Into<String>) -> Self {
        self.failure_text = text.into();
        self
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// State of the current or most recent reply
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_streaming(&self) -> bool {
        self.active.is_some()
    }

    /// Failure of the most recent reply, if it errored
    pub fn last_failure(&self) -> Option<(FailureKind, &str)> {
        self.last_failure
            .as_ref()
            .map(|(kind, message)| (*kind, message.as_str()))
    }

    /// Content of the latest assistant turn
    pub fn reply(&self) -> &str {
        self.conversation
            .last()
            .filter(|turn| turn.role == crate::Role::Assistant)
            .map(|turn| turn.content.as_str())
            .unwrap_or_default()
    }

    /// Token that cancels the in-flight reply
    pub fn cancel_token(&self) -> Option<CancellationToken> {
        self.active.as_ref().map(|active| active.handle.cancel_token())
    }

    /// Cancel the in-flight reply, if any. Idempotent.
    pub fn cancel(&self) {
        if let Some(active) = &self.active {
            active.handle.cancel();
        }
    }

    /// Append a user turn and start streaming the assistant reply.
    pub fn send(&mut self, text: impl Into<String>, attachments: Vec<Attachment>) -> Result<Uuid> {
        let text = text.into();
        if text.trim().is_empty() && attachments.is_empty() {
            return Err(RelayError::EmptyTurn);
        }

        self.supersede();

        self.conversation
            .push(Turn::user_with_attachments(text, attachments));
        let request = ChatRequest::from_conversation(&self.conversation).with_model(&self.model);
        let turn_index = self.conversation.push(Turn::assistant(""));

        let handle = self.client.start(request);
        let id = handle.id();
        self.active = Some(ActiveReply { handle, turn_index });
        self.state = SessionState::Sending;
        self.last_failure = None;
        Ok(id)
    }

    fn supersede(&mut self) {
        let Some(previous) = self.active.take() else {
            return;
        };
        tracing::debug!(session = %previous.handle.id(), "Superseding in-flight reply");
        previous.handle.cancel();
        if let Some(content) = self.conversation.content_mut(previous.turn_index)
            && content.is_empty()
        {
            content.push_str(CANCELLED_TEXT);
        }
    }

    /// Wait for the next event of the in-flight reply and apply it.
    ///
    /// Returns `None` when nothing is streaming.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        let active = self.active.as_mut()?;
        let event = match active.handle.recv().await {
            Some(event) => event,
            None => SessionEvent::Failed {
                kind: FailureKind::StreamIncomplete,
                message: "Session ended without a result".to_string(),
            },
        };
        self.apply(&event);
        Some(event)
    }

    /// Apply events until the in-flight reply reaches a terminal state.
    pub async fn wait(&mut self) -> SessionState {
        while let Some(event) = self.next_event().await {
            if event.is_terminal() {
                break;
            }
        }
        self.state
    }

    fn apply(&mut self, event: &SessionEvent) {
        let Some(turn_index) = self.active.as_ref().map(|active| active.turn_index) else {
            return;
        };

        match event {
            SessionEvent::Streaming => self.state = SessionState::Streaming,
            SessionEvent::Text(text) => {
                if let Some(content) = self.conversation.content_mut(turn_index) {
                    content.push_str(text);
                }
            }
            SessionEvent::Completed => self.settle(SessionState::Completed, None),
            SessionEvent::Cancelled => self.settle(SessionState::Cancelled, Some(CANCELLED_TEXT)),
            SessionEvent::Failed { kind, message } => {
                self.last_failure = Some((*kind, message.clone()));
                let placeholder = self.failure_text.clone();
                self.settle(SessionState::Errored, Some(&placeholder));
            }
        }
    }

    /// Finish the active reply. `placeholder` fills a reply that is still empty.
    fn settle(&mut self, state: SessionState, placeholder: Option<&str>) {
        if let Some(active) = self.active.take()
            && let Some(placeholder) = placeholder
            && let Some(content) = self.conversation.content_mut(active.turn_index)
            && content.is_empty()
        {
            content.push_str(placeholder);
        }
        self.state = state;
    }
}
