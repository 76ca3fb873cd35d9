//! LexRelay core
//!
//! This crate provides:
//! - Conversation, turn and attachment types shared by client and relay
//! - Attachment encoding (images as data URLs, everything else as text)
//! - The `data: ` frame decoder and the cancellable stream reconstructor
//! - A relay client and a conversation owner that applies stream events
//! - Prompt builders for the drafting and search pages

pub mod attachment;
pub mod chat;
pub mod client;
pub mod conversation;
pub mod error;
pub mod frame;
mod http_client;
pub mod prompts;
pub mod reconstructor;
pub mod request;

// Re-export commonly used types
pub use attachment::{encode_bytes, encode_file, encode_path};
pub use chat::{CANCELLED_TEXT, ChatSession, DEFAULT_FAILURE_TEXT};
pub use client::{RelayClient, StreamHandle};
pub use conversation::{Attachment, AttachmentPayload, Conversation, Role, Turn};
pub use error::{FrameParseError, RelayError, Result};
pub use http_client::build_http_client;
pub use frame::{DATA_PREFIX, FrameDecoder, StreamFrame, parse_line};
pub use prompts::{DocumentKind, GuideKind, OsintKind, Page};
pub use reconstructor::{FailureKind, SessionEvent, SessionState, StreamSession};
pub use request::{
    ATTACHMENT_PREVIEW_CHARS, CHAT_PATH, ChatRequest, DEFAULT_MODEL, ProviderMessage,
    render_content,
};
