use serde::{ Serialize, Deserialize };

use crate::models::chat::{ Conversation, ConversationId, ConversationSummary, Message };

/// A file picked in the browser, sent inline as base64.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FileUpload {
    pub name: String,
    #[serde(rename = "type", default)]
    pub mime_type: String,
    pub size: u64,
    #[serde(default)]
    pub data: String,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "new_chat")]
    NewChat,
    #[serde(rename = "send")] Send {
        content: String,
    },
    #[serde(rename = "attach")] Attach {
        files: Vec<FileUpload>,
    },
    #[serde(rename = "select")] Select {
        conversation_id: ConversationId,
    },
    #[serde(rename = "export")] Export {
        #[serde(default)]
        conversation_id: Option<ConversationId>,
    },
    #[serde(rename = "clear_all")]
    ClearAll,
    #[serde(rename = "voice")] Voice {
        #[serde(default)]
        transcript: Option<String>,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "ready")] Ready {
        has_messages: bool,
        conversations: Vec<ConversationSummary>,
    },
    #[serde(rename = "conversations")] Conversations {
        conversations: Vec<ConversationSummary>,
    },
    #[serde(rename = "conversation")] Conversation {
        conversation: Conversation,
    },
    #[serde(rename = "message")] Message {
        conversation_id: ConversationId,
        message: Message,
    },
    #[serde(rename = "typing")] Typing {
        conversation_id: ConversationId,
        active: bool,
    },
    #[serde(rename = "notice")] Notice {
        message: String,
        blocking: bool,
    },
    #[serde(rename = "export")] Export {
        file_name: String,
        content: String,
    },
    #[serde(rename = "cleared")]
    Cleared,
    #[serde(rename = "error")] Error {
        message: String,
    },
}
