use crate::attachment::{ read_attachment, FileSource };
use crate::error::ChatError;
use crate::history::snapshot::export_conversation;
use crate::history::{ build_prompt, ConversationStore, SnapshotStore };
use crate::llm::chat::ChatClient;
use crate::models::chat::{ ConversationId, Message, Sender };
use crate::models::websocket::{ ClientMessage, ServerMessage };

use log::{ debug, error, info, warn };
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

pub const APOLOGY_MESSAGE: &str =
    "Oops! Something went wrong with the AI response. Please try again.";

pub struct ChatAgent {
    chat_client: Arc<dyn ChatClient>,
    store: ConversationStore,
    snapshot: Option<SnapshotStore>,
    typing: Option<ConversationId>,
    events: UnboundedSender<ServerMessage>,
}

impl ChatAgent {
    pub fn new(
        chat_client: Arc<dyn ChatClient>,
        snapshot: Option<SnapshotStore>,
        events: UnboundedSender<ServerMessage>
    ) -> Self {
        let conversations = match &snapshot {
            Some(store) =>
                store.load().unwrap_or_else(|e| {
                    warn!("Ignoring unreadable conversation blob: {}", e);
                    Vec::new()
                }),
            None => Vec::new(),
        };

        Self {
            chat_client,
            store: ConversationStore::from_conversations(conversations),
            snapshot,
            typing: None,
            events,
        }
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn typing(&self) -> Option<ConversationId> {
        self.typing
    }

    pub fn ready(&self) {
        self.emit(ServerMessage::Ready {
            has_messages: self.store.has_messages(),
            conversations: self.store.summaries(),
        });
    }

    pub async fn dispatch(&mut self, command: ClientMessage) {
        let result = match command {
            ClientMessage::NewChat => {
                self.start_new_chat();
                Ok(())
            }
            ClientMessage::Send { content } => {
                self.send_message(&content).await;
                Ok(())
            }
            ClientMessage::Attach { files } => {
                let sources: Vec<&dyn FileSource> = files
                    .iter()
                    .map(|f| f as &dyn FileSource)
                    .collect();
                self.attach_files(&sources);
                Ok(())
            }
            ClientMessage::Select { conversation_id } => self.select_conversation(conversation_id),
            ClientMessage::Export { conversation_id } => self.export(conversation_id),
            ClientMessage::ClearAll => {
                self.clear_all();
                Ok(())
            }
            ClientMessage::Voice { transcript } => {
                match transcript.filter(|t| !t.trim().is_empty()) {
                    Some(text) => {
                        self.send_message(&text).await;
                        Ok(())
                    }
                    None => Err(ChatError::UnsupportedSpeechInput),
                }
            }
        };

        if let Err(e) = result {
            warn!("Command failed: {}", e);
            self.emit(ServerMessage::Notice {
                message: e.to_string(),
                blocking: e.is_blocking(),
            });
        }
    }

    pub fn start_new_chat(&mut self) -> ConversationId {
        let id = self.store.create_conversation().id;
        info!("Started conversation {}", id);
        self.emit_sidebar();
        self.persist();
        id
    }

    fn ensure_conversation(&mut self) -> ConversationId {
        match self.store.current_id() {
            Some(id) => id,
            None => self.start_new_chat(),
        }
    }

    pub async fn send_message(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            debug!("Ignoring empty message");
            return;
        }

        let conversation_id = self.ensure_conversation();
        let (prompt, first_message) = match self.store.get(conversation_id) {
            Ok(conversation) => (build_prompt(conversation, text), conversation.messages.is_empty()),
            Err(e) => {
                error!("Current conversation vanished: {}", e);
                return;
            }
        };

        self.append(conversation_id, Message::text(Sender::User, text));
        if first_message {
            self.emit_sidebar();
        }

        self.typing = Some(conversation_id);
        self.emit(ServerMessage::Typing { conversation_id, active: true });

        let reply = match self.chat_client.complete(&prompt).await {
            Ok(resp) => resp.response,
            Err(e) => {
                error!("Gemini API error for conversation {}: {}", conversation_id, e);
                APOLOGY_MESSAGE.to_string()
            }
        };

        self.typing = None;
        self.emit(ServerMessage::Typing { conversation_id, active: false });
        self.append(conversation_id, Message::text(Sender::Assistant, reply));
    }

    pub fn attach_files(&mut self, files: &[&dyn FileSource]) {
        if files.is_empty() {
            return;
        }
        let conversation_id = self.ensure_conversation();
        let was_empty = self.store
            .get(conversation_id)
            .map(|c| c.messages.is_empty())
            .unwrap_or(false);

        for file in files {
            self.append(conversation_id, read_attachment(*file));
        }
        if was_empty {
            self.emit_sidebar();
        }
        info!(
            "Files attached: {:?}",
            files.iter().map(|f| f.name()).collect::<Vec<_>>()
        );
    }

    pub fn select_conversation(&mut self, conversation_id: ConversationId) -> Result<(), ChatError> {
        let conversation = self.store.select_conversation(conversation_id)?.clone();
        self.emit(ServerMessage::Conversation { conversation });
        self.emit_sidebar();
        Ok(())
    }

    pub fn export(&self, conversation_id: Option<ConversationId>) -> Result<(), ChatError> {
        let conversation = match conversation_id {
            Some(id) => self.store.get(id)?,
            None => self.store.current().ok_or(ChatError::NothingToExport)?,
        };
        let (file_name, content) = export_conversation(conversation)?;
        info!("Exporting conversation {} as {}", conversation.id, file_name);
        self.emit(ServerMessage::Export { file_name, content });
        Ok(())
    }

    pub fn clear_all(&mut self) {
        if let Some(snapshot) = &self.snapshot {
            if let Err(e) = snapshot.clear() {
                error!("Failed to remove conversation blob: {}", e);
            }
        }
        self.store.clear();
        self.typing = None;
        info!("Cleared all conversations");
        self.emit(ServerMessage::Cleared);
        self.ready();
    }

    fn append(&mut self, conversation_id: ConversationId, message: Message) {
        match self.store.append_message(conversation_id, message.clone()) {
            Ok(()) => {
                self.emit(ServerMessage::Message { conversation_id, message });
                self.persist();
            }
            Err(e) => error!("Failed to append message: {}", e),
        }
    }

    fn emit_sidebar(&self) {
        self.emit(ServerMessage::Conversations { conversations: self.store.summaries() });
    }

    fn emit(&self, event: ServerMessage) {
        if self.events.send(event).is_err() {
            debug!("Renderer channel closed; dropping event");
        }
    }

    fn persist(&self) {
        if let Some(snapshot) = &self.snapshot {
            if let Err(e) = snapshot.save(self.store.conversations()) {
                warn!("Failed to save conversations: {}", e);
            }
        }
    }
}
