//! Attachment encoding
//!
//! Turns a user-selected file into an [`Attachment`] before the turn that
//! carries it is sent. Images become base64 data URLs. Everything else is read
//! as text; non-UTF-8 bytes are replaced, so arbitrary binaries do not survive
//! the trip intact.

use base64::Engine;
use std::path::Path;

use crate::conversation::{Attachment, AttachmentPayload, is_image_mime};
use crate::error::{RelayError, Result};

/// Encode the file at `path`, guessing the MIME type from its extension.
pub async fn encode_file(path: impl AsRef<Path>) -> Result<Attachment> {
    let path = path.as_ref();
    let mime_type = mime_guess::from_path(path).first_or_octet_stream();
    encode_path(path, mime_type.essence_str()).await
}

/// Encode the file at `path` with a caller-declared MIME type.
pub async fn encode_path(path: impl AsRef<Path>, mime_type: &str) -> Result<Attachment> {
    let path = path.as_ref();
    let name = display_name(path);
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| RelayError::AttachmentRead {
            name: name.clone(),
            source,
        })?;
    tracing::debug!(name = %name, mime_type, size = bytes.len(), "Encoded attachment");
    Ok(encode_bytes(name, mime_type, &bytes))
}

/// Encode bytes that are already in memory.
pub fn encode_bytes(name: impl Into<String>, mime_type: &str, bytes: &[u8]) -> Attachment {
    let payload = if is_image_mime(mime_type) {
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        AttachmentPayload::Base64(format!("data:{};base64,{}", mime_type, encoded))
    } else {
        AttachmentPayload::Text(String::from_utf8_lossy(bytes).into_owned())
    };

    Attachment {
        name: name.into(),
        mime_type: mime_type.to_string(),
        payload,
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
