pub mod prompt;
pub mod snapshot;

use log::debug;
use crate::error::ChatError;
use crate::models::chat::{
    truncate_title,
    Conversation,
    ConversationId,
    ConversationSummary,
    Message,
};

pub use prompt::build_prompt;
pub use snapshot::SnapshotStore;

pub const SIDEBAR_LEN: usize = 10;

#[derive(Debug, Default)]
pub struct ConversationStore {
    conversations: Vec<Conversation>,
    current: Option<ConversationId>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_conversations(conversations: Vec<Conversation>) -> Self {
        Self { conversations, current: None }
    }

    pub fn create_conversation(&mut self) -> &Conversation {
        let conversation = Conversation::new();
        debug!("Created conversation {}", conversation.id);
        self.current = Some(conversation.id);
        self.conversations.insert(0, conversation);
        &self.conversations[0]
    }

    pub fn append_message(
        &mut self,
        conversation_id: ConversationId,
        message: Message
    ) -> Result<(), ChatError> {
        let conversation = self.get_mut(conversation_id)?;
        if conversation.messages.is_empty() {
            conversation.title = truncate_title(message.title_source());
        }
        conversation.messages.push(message);
        Ok(())
    }

    pub fn select_conversation(
        &mut self,
        conversation_id: ConversationId
    ) -> Result<&Conversation, ChatError> {
        let index = self.position(conversation_id)?;
        self.current = Some(conversation_id);
        Ok(&self.conversations[index])
    }

    pub fn get(&self, conversation_id: ConversationId) -> Result<&Conversation, ChatError> {
        self.position(conversation_id).map(|index| &self.conversations[index])
    }

    pub fn current(&self) -> Option<&Conversation> {
        self.current.and_then(|id| self.get(id).ok())
    }

    pub fn current_id(&self) -> Option<ConversationId> {
        self.current
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn has_messages(&self) -> bool {
        self.conversations.iter().any(|c| !c.messages.is_empty())
    }

    pub fn summaries(&self) -> Vec<ConversationSummary> {
        self.conversations
            .iter()
            .take(SIDEBAR_LEN)
            .map(|c| ConversationSummary {
                id: c.id,
                title: c.title.clone(),
                active: Some(c.id) == self.current,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.conversations.clear();
        self.current = None;
    }

    fn position(&self, conversation_id: ConversationId) -> Result<usize, ChatError> {
        self.conversations
            .iter()
            .position(|c| c.id == conversation_id)
            .ok_or(ChatError::NotFound(conversation_id))
    }

    fn get_mut(&mut self, conversation_id: ConversationId) -> Result<&mut Conversation, ChatError> {
        let index = self.position(conversation_id)?;
        Ok(&mut self.conversations[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::{ Sender, DEFAULT_TITLE };

    #[test]
    fn test_create_inserts_at_front_and_selects() {
        let mut store = ConversationStore::new();
        let first = store.create_conversation().id;
        let second = store.create_conversation().id;
        assert_eq!(store.conversations()[0].id, second);
        assert_eq!(store.conversations()[1].id, first);
        assert_eq!(store.current_id(), Some(second));
        assert_eq!(store.conversations()[0].title, DEFAULT_TITLE);
    }

    #[test]
    fn test_first_message_sets_title() {
        let mut store = ConversationStore::new();
        let id = store.create_conversation().id;
        store
            .append_message(
                id,
                Message::text(Sender::User, "Hello, how can I get started with this amazing product today?")
            )
            .unwrap();
        assert_eq!(store.get(id).unwrap().title, "Hello, how can I get started w...");
    }

    #[test]
    fn test_title_is_immutable_after_first_message() {
        let mut store = ConversationStore::new();
        let id = store.create_conversation().id;
        store.append_message(id, Message::text(Sender::User, "first")).unwrap();
        store.append_message(id, Message::text(Sender::Assistant, "second")).unwrap();
        store.append_message(id, Message::text(Sender::User, "third")).unwrap();
        assert_eq!(store.get(id).unwrap().title, "first");
    }

    #[test]
    fn test_messages_keep_insertion_order() {
        let mut store = ConversationStore::new();
        let id = store.create_conversation().id;
        for i in 0..20 {
            store.append_message(id, Message::text(Sender::User, format!("m{}", i))).unwrap();
        }
        let messages = &store.get(id).unwrap().messages;
        assert!(messages.windows(2).all(|w| w[0].id() < w[1].id()));
        assert!(messages.windows(2).all(|w| w[0].timestamp() <= w[1].timestamp()));
    }

    #[test]
    fn test_select_unknown_is_not_found() {
        let mut store = ConversationStore::new();
        store.create_conversation();
        let err = store.select_conversation(-1).unwrap_err();
        assert!(matches!(err, ChatError::NotFound(-1)));
    }

    #[test]
    fn test_append_to_unknown_is_not_found() {
        let mut store = ConversationStore::new();
        let err = store.append_message(5, Message::text(Sender::User, "x")).unwrap_err();
        assert!(matches!(err, ChatError::NotFound(5)));
    }

    #[test]
    fn test_select_changes_current_and_summary() {
        let mut store = ConversationStore::new();
        let older = store.create_conversation().id;
        store.create_conversation();
        store.select_conversation(older).unwrap();
        let summaries = store.summaries();
        assert!(summaries.iter().any(|s| s.id == older && s.active));
        assert_eq!(summaries.iter().filter(|s| s.active).count(), 1);
    }

    #[test]
    fn test_summaries_capped() {
        let mut store = ConversationStore::new();
        for _ in 0..15 {
            store.create_conversation();
        }
        assert_eq!(store.summaries().len(), SIDEBAR_LEN);
        assert_eq!(store.conversations().len(), 15);
    }

    #[test]
    fn test_clear_resets_state() {
        let mut store = ConversationStore::new();
        let id = store.create_conversation().id;
        store.append_message(id, Message::text(Sender::User, "x")).unwrap();
        assert!(store.has_messages());
        store.clear();
        assert!(store.conversations().is_empty());
        assert!(store.current().is_none());
        assert!(!store.has_messages());
    }
}
