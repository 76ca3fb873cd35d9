//! Conversation, turn and attachment types

use base64::Engine;
use serde::{Deserialize, Serialize};

/// Speaker of a turn
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Attachment content in transmissible form
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "encoding", content = "data", rename_all = "lowercase")]
pub enum AttachmentPayload {
    /// A `data:<mime>;base64,<bytes>` URL
    Base64(String),
    /// Best-effort decoded text
    Text(String),
}

/// A file attached to a user turn
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub name: String,
    pub mime_type: String,
    pub payload: AttachmentPayload,
}

impl Attachment {
    pub fn is_image(&self) -> bool {
        is_image_mime(&self.mime_type)
    }

    /// Original bytes of a base64 payload. `None` for text payloads or a
    /// malformed data URL.
    pub fn decoded_bytes(&self) -> Option<Vec<u8>> {
        let AttachmentPayload::Base64(data_url) = &self.payload else {
            return None;
        };
        let (_, encoded) = data_url.split_once(";base64,")?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .ok()
    }

    /// Text handed to the prompt renderer: the decoded text, or the data URL
    /// for binary payloads.
    pub fn text(&self) -> &str {
        match &self.payload {
            AttachmentPayload::Base64(data) | AttachmentPayload::Text(data) => data,
        }
    }
}

pub(crate) fn is_image_mime(mime_type: &str) -> bool {
    mime_type.starts_with("image/")
}

/// One message of a conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl Turn {
    /// Create a user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            attachments: Vec::new(),
        }
    }

    /// Create a user turn carrying attachments
    pub fn user_with_attachments(content: impl Into<String>, attachments: Vec<Attachment>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            attachments,
        }
    }

    /// Create an assistant turn
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            attachments: Vec::new(),
        }
    }
}

/// Client-held ordered list of turns.
///
/// Turns are append-only. The only turn whose content changes after it was
/// appended is the in-flight assistant reply, and only its owning
/// [`ChatSession`](crate::ChatSession) may change it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Append a turn and return its index.
    pub fn push(&mut self, turn: Turn) -> usize {
        self.turns.push(turn);
        self.turns.len() - 1
    }

    pub(crate) fn content_mut(&mut self, index: usize) -> Option<&mut String> {
        self.turns.get_mut(index).map(|turn| &mut turn.content)
    }

    /// Plain-text transcript, one `ROLE: content` block per turn.
    pub fn transcript(&self) -> String {
        self.turns
            .iter()
            .map(|turn| {
                format!(
                    "{}: {}\n\n",
                    turn.role.as_str().to_uppercase(),
                    turn.content
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
        let role: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, Role::User);
    }

    #[test]
    fn test_attachment_wire_shape() {
        let attachment = Attachment {
            name: "notes.txt".into(),
            mime_type: "text/plain".into(),
            payload: AttachmentPayload::Text("hello".into()),
        };
        let value = serde_json::to_value(&attachment).unwrap();
        assert_eq!(value["mimeType"], "text/plain");
        assert_eq!(value["payload"]["encoding"], "text");
        assert_eq!(value["payload"]["data"], "hello");
    }

    #[test]
    fn test_decoded_bytes_only_for_base64() {
        let image = Attachment {
            name: "dot.png".into(),
            mime_type: "image/png".into(),
            payload: AttachmentPayload::Base64("data:image/png;base64,AAEC".into()),
        };
        assert_eq!(image.decoded_bytes(), Some(vec![0, 1, 2]));
        assert!(image.is_image());

        let text = Attachment {
            name: "a.txt".into(),
            mime_type: "text/plain".into(),
            payload: AttachmentPayload::Text("AAEC".into()),
        };
        assert_eq!(text.decoded_bytes(), None);
    }

    #[test]
    fn test_conversation_preserves_order_and_duplicates() {
        let mut conversation = Conversation::new();
        conversation.push(Turn::user("same"));
        conversation.push(Turn::user("same"));
        let index = conversation.push(Turn::assistant(""));
        assert_eq!(index, 2);
        assert_eq!(conversation.len(), 3);
        assert_eq!(conversation.turns()[0].content, "same");
    }

    #[test]
    fn test_transcript_format() {
        let mut conversation = Conversation::new();
        conversation.push(Turn::user("Can I break my lease?"));
        conversation.push(Turn::assistant("It depends on your state."));
        assert_eq!(
            conversation.transcript(),
            "USER: Can I break my lease?\n\nASSISTANT: It depends on your state.\n\n"
        );
    }
}
