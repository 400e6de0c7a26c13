use chrono::{ DateTime, Utc };
use serde::{ Deserialize, Serialize };
use std::sync::atomic::{ AtomicI64, Ordering };

pub const DEFAULT_TITLE: &str = "New Chat";
pub const TITLE_MAX_CHARS: usize = 30;

pub type ConversationId = i64;
pub type MessageId = i64;

static LAST_ID: AtomicI64 = AtomicI64::new(0);

/// Returns a millisecond timestamp that is strictly greater than any id
/// handed out before, so ids sort in creation order.
pub fn next_id() -> i64 {
    let now = Utc::now().timestamp_millis();
    let mut last = LAST_ID.load(Ordering::Relaxed);
    loop {
        let candidate = if now > last { now } else { last + 1 };
        match LAST_ID.compare_exchange_weak(last, candidate, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return candidate,
            Err(current) => last = current,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    pub fn label(&self) -> &'static str {
        match self {
            Sender::User => "User",
            Sender::Assistant => "Assistant",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    Text {
        id: MessageId,
        sender: Sender,
        text: String,
        timestamp: DateTime<Utc>,
    },
    Attachment {
        id: MessageId,
        sender: Sender,
        file_name: String,
        size_kb: f64,
        content: String,
        preview: String,
        timestamp: DateTime<Utc>,
    },
}

impl Message {
    pub fn text(sender: Sender, text: impl Into<String>) -> Self {
        Message::Text {
            id: next_id(),
            sender,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn id(&self) -> MessageId {
        match self {
            Message::Text { id, .. } | Message::Attachment { id, .. } => *id,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Message::Text { timestamp, .. } | Message::Attachment { timestamp, .. } => *timestamp,
        }
    }

    /// Text used to title a conversation when this is its first message.
    pub fn title_source(&self) -> &str {
        match self {
            Message::Text { text, .. } => text,
            Message::Attachment { file_name, .. } => file_name,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub title: String,
    pub messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            id: next_id(),
            title: DEFAULT_TITLE.to_string(),
            messages: Vec::new(),
        }
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: ConversationId,
    pub title: String,
    pub active: bool,
}

pub fn truncate_title(text: &str) -> String {
    let mut title: String = text.chars().take(TITLE_MAX_CHARS).collect();
    if text.chars().count() > TITLE_MAX_CHARS {
        title.push_str("...");
    }
    title
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_strictly_increase() {
        let ids: Vec<i64> = (0..100).map(|_| next_id()).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_truncate_title_long() {
        let title = truncate_title("Hello, how can I get started with this amazing product today?");
        assert_eq!(title, "Hello, how can I get started w...");
    }

    #[test]
    fn test_truncate_title_exact_length_kept() {
        let text = "a".repeat(30);
        assert_eq!(truncate_title(&text), text);
    }

    #[test]
    fn test_truncate_title_counts_chars_not_bytes() {
        let text = "é".repeat(31);
        assert_eq!(truncate_title(&text), format!("{}...", "é".repeat(30)));
    }

    #[test]
    fn test_message_serializes_with_type_tag() {
        let msg = Message::text(Sender::Assistant, "hi");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["sender"], "assistant");
        assert_eq!(json["text"], "hi");
    }

    #[test]
    fn test_new_conversation_defaults() {
        let conv = Conversation::new();
        assert_eq!(conv.title, DEFAULT_TITLE);
        assert!(conv.messages.is_empty());
    }
}
