//! Stream reconstruction
//!
//! A [`StreamSession`] folds the frames of one response body into an
//! append-only text buffer. [`StreamSession::run`] drives it over a byte
//! stream with a single suspension point per iteration (awaiting the next
//! chunk) and reports every observable change as a [`SessionEvent`] on a
//! single-consumer channel. The session never touches display state itself.

use futures::{Stream, StreamExt};
use std::fmt::Display;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::frame::{FrameDecoder, StreamFrame};

/// Lifecycle of one request/response exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    /// Request dispatched, no body yet
    Sending,
    /// Body opened, frames being folded
    Streaming,
    Completed,
    Cancelled,
    Errored,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionState::Completed | SessionState::Cancelled | SessionState::Errored
        )
    }
}

/// Why a session ended in [`SessionState::Errored`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The relay could not be reached or returned no readable body
    StreamOpen,
    /// The connection dropped before end of stream
    StreamIncomplete,
}

/// Change reported by a running session, in the order it happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The response body is open
    Streaming,
    /// Text folded since the previous `Text` event. The reply is the
    /// concatenation of every `Text` in order.
    Text(String),
    Completed,
    Cancelled,
    Failed { kind: FailureKind, message: String },
}

impl SessionEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionEvent::Completed | SessionEvent::Cancelled | SessionEvent::Failed { .. }
        )
    }
}

pub type EventSender = mpsc::UnboundedSender<SessionEvent>;

/// State owned by the reconstructor for one request
#[derive(Debug)]
pub struct StreamSession {
    id: Uuid,
    state: SessionState,
    decoder: FrameDecoder,
    accumulated: String,
    /// Bytes of `accumulated` already sent to the owner
    reported: usize,
    folded: usize,
    cancel: CancellationToken,
}

impl Default for StreamSession {
    fn default() -> Self {
        Self::new(CancellationToken::new())
    }
}

impl StreamSession {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SessionState::Idle,
            decoder: FrameDecoder::new(),
            accumulated: String::new(),
            reported: 0,
            folded: 0,
            cancel,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Text accumulated so far
    pub fn text(&self) -> &str {
        &self.accumulated
    }

    /// Number of deltas folded into the text
    pub fn folded_deltas(&self) -> usize {
        self.folded
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Request cancellation. Safe to call any number of times.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Mark the request as dispatched.
    pub fn begin_sending(&mut self) {
        self.transition(SessionState::Sending);
    }

    /// Feed one chunk of the body. Returns whether the text changed.
    ///
    /// Stops folding at the first frame seen after cancellation.
    pub fn ingest(&mut self, chunk: &[u8]) -> bool {
        let frames = self.decoder.push(chunk);
        self.fold(frames)
    }

    /// Flush the final partial line at end of stream. Returns whether the
    /// text changed.
    pub fn finish_input(&mut self) -> bool {
        let frames = self.decoder.finish();
        self.fold(frames)
    }

    fn fold(&mut self, frames: Vec<StreamFrame>) -> bool {
        let mut changed = false;
        for frame in frames {
            if self.cancel.is_cancelled() {
                break;
            }
            if let Some(delta) = frame.delta() {
                self.accumulated.push_str(delta);
                self.folded += 1;
                changed = true;
            }
        }
        changed
    }

    /// Move to `next` unless the session already reached a terminal state.
    fn transition(&mut self, next: SessionState) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        tracing::debug!(session = %self.id, from = ?self.state, to = ?next, "Session transition");
        self.state = next;
        true
    }

    /// Record a failure to open the body and report it.
    pub fn fail_open(&mut self, message: impl Into<String>, events: &EventSender) -> SessionState {
        self.finish_with(
            SessionEvent::Failed {
                kind: FailureKind::StreamOpen,
                message: message.into(),
            },
            events,
        )
    }

    /// Record a cancellation that happened before any body was opened.
    pub fn abort(&mut self, events: &EventSender) -> SessionState {
        self.cancel.cancel();
        self.finish_with(SessionEvent::Cancelled, events)
    }

    /// Fold `body` until it ends, fails, or the session is cancelled.
    ///
    /// A missing body completes immediately with no frames.
    pub async fn run<S, B, E>(&mut self, body: Option<S>, events: &EventSender) -> SessionState
    where
        S: Stream<Item = std::result::Result<B, E>>,
        B: AsRef<[u8]>,
        E: Display,
    {
        if self.state.is_terminal() {
            return self.state;
        }
        if self.cancel.is_cancelled() {
            return self.finish_with(SessionEvent::Cancelled, events);
        }

        let Some(body) = body else {
            return self.finish_with(SessionEvent::Completed, events);
        };
        let mut body = std::pin::pin!(body);

        self.transition(SessionState::Streaming);
        self.emit(SessionEvent::Streaming, events);

        let cancel = self.cancel.clone();
        loop {
            if cancel.is_cancelled() {
                return self.finish_with(SessionEvent::Cancelled, events);
            }

            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return self.finish_with(SessionEvent::Cancelled, events);
                }
                next = body.next() => next,
            };

            match next {
                Some(Ok(chunk)) => {
                    if self.ingest(chunk.as_ref()) {
                        self.report_text(events);
                    }
                }
                Some(Err(err)) => {
                    tracing::warn!(
                        session = %self.id,
                        error = %err,
                        folded = self.folded,
                        "Response stream failed before completion"
                    );
                    return self.finish_with(
                        SessionEvent::Failed {
                            kind: FailureKind::StreamIncomplete,
                            message: err.to_string(),
                        },
                        events,
                    );
                }
                None => {
                    if self.finish_input() {
                        self.report_text(events);
                    }
                    if cancel.is_cancelled() {
                        return self.finish_with(SessionEvent::Cancelled, events);
                    }
                    return self.finish_with(SessionEvent::Completed, events);
                }
            }
        }
    }

    fn finish_with(&mut self, event: SessionEvent, events: &EventSender) -> SessionState {
        let next = match &event {
            SessionEvent::Completed => SessionState::Completed,
            SessionEvent::Cancelled => SessionState::Cancelled,
            SessionEvent::Failed { .. } => SessionState::Errored,
            SessionEvent::Streaming | SessionEvent::Text(_) => return self.state,
        };
        if self.transition(next) {
            tracing::debug!(
                session = %self.id,
                state = ?next,
                folded = self.folded,
                skipped = self.decoder.skipped(),
                "Session finished"
            );
            self.emit(event, events);
        }
        self.state
    }

    /// Report the text folded since the last report.
    fn report_text(&mut self, events: &EventSender) {
        let appended = self.accumulated[self.reported..].to_string();
        self.reported = self.accumulated.len();
        self.emit(SessionEvent::Text(appended), events);
    }

    /// Send an event to the owner. An owner that hung up cancels the session.
    fn emit(&self, event: SessionEvent, events: &EventSender) {
        if events.send(event).is_err() {
            self.cancel.cancel();
        }
    }
}
