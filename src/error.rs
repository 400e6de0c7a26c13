use crate::models::chat::ConversationId;

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("conversation not found: {0}")]
    NotFound(ConversationId),
    #[error("Speech recognition is not supported in your browser. Please use Chrome, Edge, or Safari.")]
    UnsupportedSpeechInput,
    #[error("no conversation to export")]
    NothingToExport,
    #[error("export failed: {0}")]
    Export(#[from] serde_json::Error),
}

impl ChatError {
    pub fn is_blocking(&self) -> bool {
        matches!(self, ChatError::UnsupportedSpeechInput)
    }
}
