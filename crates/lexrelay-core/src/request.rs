//! Relay request shape and prompt rendering

use serde::{Deserialize, Serialize};

use crate::conversation::{Attachment, Conversation, Role, Turn};

/// Model used when a request does not name one.
pub const DEFAULT_MODEL: &str = "gpt-5-nano";

/// Characters of a non-image attachment embedded in the prompt.
pub const ATTACHMENT_PREVIEW_CHARS: usize = 5000;

/// Path of the relay's chat endpoint.
pub const CHAT_PATH: &str = "/api/ai/chat";

/// Body of `POST /api/ai/chat`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatRequest {
    pub messages: Vec<Turn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ChatRequest {
    pub fn new(messages: Vec<Turn>) -> Self {
        Self {
            messages,
            model: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Build a request from the turns of a conversation.
    ///
    /// Assistant turns with no content (an in-flight or aborted reply) are
    /// left out.
    pub fn from_conversation(conversation: &Conversation) -> Self {
        let messages = conversation
            .turns()
            .iter()
            .filter(|turn| turn.role == Role::User || !turn.content.is_empty())
            .cloned()
            .collect();
        Self::new(messages)
    }

    /// Model to use, falling back to `default_model`.
    pub fn model_or<'a>(&'a self, default_model: &'a str) -> &'a str {
        self.model
            .as_deref()
            .filter(|model| !model.trim().is_empty())
            .unwrap_or(default_model)
    }

    /// Flatten every turn into the role/content pairs sent to the provider.
    pub fn rendered_messages(&self) -> Vec<ProviderMessage> {
        self.messages
            .iter()
            .map(|turn| ProviderMessage {
                role: turn.role,
                content: render_content(&turn.content, &turn.attachments),
            })
            .collect()
    }
}

/// A turn as the model provider sees it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderMessage {
    pub role: Role,
    pub content: String,
}

/// Inline attachments into the turn text.
///
/// Images are referenced by name only. Other files contribute their first
/// [`ATTACHMENT_PREVIEW_CHARS`] characters.
pub fn render_content(content: &str, attachments: &[Attachment]) -> String {
    if attachments.is_empty() {
        return content.to_string();
    }

    let mut rendered = String::from(content);
    rendered.push_str("\n\n[Attachments uploaded:]");
    for attachment in attachments {
        if attachment.is_image() {
            rendered.push_str(&format!("\n- Image: {}", attachment.name));
        } else {
            rendered.push_str(&format!(
                "\n- Document: {}\nContent: {}",
                attachment.name,
                truncate_chars(attachment.text(), ATTACHMENT_PREVIEW_CHARS)
            ));
        }
    }
    rendered
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::AttachmentPayload;

    fn document(name: &str, text: String) -> Attachment {
        Attachment {
            name: name.into(),
            mime_type: "text/plain".into(),
            payload: AttachmentPayload::Text(text),
        }
    }

    #[test]
    fn test_plain_content_unchanged() {
        assert_eq!(render_content("hello", &[]), "hello");
    }

    #[test]
    fn test_image_rendered_by_name_only() {
        let image = Attachment {
            name: "photo.png".into(),
            mime_type: "image/png".into(),
            payload: AttachmentPayload::Base64("data:image/png;base64,AAAA".into()),
        };
        let rendered = render_content("look", &[image]);
        assert_eq!(rendered, "look\n\n[Attachments uploaded:]\n- Image: photo.png");
    }

    #[test]
    fn test_document_truncated_deterministically() {
        let long = "ab".repeat(ATTACHMENT_PREVIEW_CHARS);
        let attachments = vec![document("lease.txt", long)];
        let first = render_content("review", &attachments);
        let second = render_content("review", &attachments);
        assert_eq!(first, second);

        let preview = first.split("Content: ").nth(1).unwrap();
        assert_eq!(preview.chars().count(), ATTACHMENT_PREVIEW_CHARS);
    }

    #[test]
    fn test_truncation_counts_chars_not_bytes() {
        let text = "§".repeat(ATTACHMENT_PREVIEW_CHARS + 10);
        assert_eq!(
            truncate_chars(&text, ATTACHMENT_PREVIEW_CHARS).chars().count(),
            ATTACHMENT_PREVIEW_CHARS
        );
        assert_eq!(truncate_chars("short", ATTACHMENT_PREVIEW_CHARS), "short");
    }

    #[test]
    fn test_from_conversation_skips_empty_assistant_turns() {
        let mut conversation = Conversation::new();
        conversation.push(Turn::user("first"));
        conversation.push(Turn::assistant("answer"));
        conversation.push(Turn::user("second"));
        conversation.push(Turn::assistant(""));

        let request = ChatRequest::from_conversation(&conversation);
        let roles: Vec<Role> = request.messages.iter().map(|turn| turn.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User]);
    }

    #[test]
    fn test_model_fallback() {
        let request = ChatRequest::new(vec![Turn::user("hi")]);
        assert_eq!(request.model_or(DEFAULT_MODEL), DEFAULT_MODEL);
        let request = request.with_model("gpt-5");
        assert_eq!(request.model_or(DEFAULT_MODEL), "gpt-5");
        let blank = ChatRequest::new(vec![]).with_model("  ");
        assert_eq!(blank.model_or(DEFAULT_MODEL), DEFAULT_MODEL);
    }

    #[test]
    fn test_request_shape_without_attachments() {
        let request = ChatRequest::new(vec![Turn::user("hi")]).with_model("gpt-5-nano");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "messages": [{"role": "user", "content": "hi"}],
                "model": "gpt-5-nano"
            })
        );
    }
}
