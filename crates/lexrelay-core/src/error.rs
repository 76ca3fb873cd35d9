//! Error types for the relay core

use thiserror::Error;

/// Upstream error bodies are cut to this many bytes before they reach a message.
pub const MAX_ERROR_BODY: usize = 512;

/// Relay core error types
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Failed to read attachment {name}: {source}")]
    AttachmentRead {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open response stream: {0}")]
    StreamOpen(String),

    #[error("Relay returned HTTP {status}: {message}")]
    UpstreamHttp { status: u16, message: String },

    #[error("Response stream ended before completion: {0}")]
    StreamIncomplete(String),

    #[error("Nothing to send: message text and attachments are both empty")]
    EmptyTurn,
}

impl RelayError {
    /// Name of the attachment that could not be read, if this is a read failure.
    pub fn attachment_name(&self) -> Option<&str> {
        match self {
            RelayError::AttachmentRead { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// A single `data: ` line whose record could not be parsed.
///
/// Never escapes the decoder: the line is skipped and decoding continues.
#[derive(Error, Debug)]
#[error("Malformed frame: {0}")]
pub struct FrameParseError(#[from] serde_json::Error);

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, RelayError>;

/// Cut an error body to [`MAX_ERROR_BODY`] bytes on a char boundary.
pub fn truncate_error_body(body: String) -> String {
    if body.len() <= MAX_ERROR_BODY {
        return body;
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... [truncated]", &body[..end])
}
