use crate::models::chat::{ Conversation, Message };

/// How many prior messages are sent along with a new user message.
pub const HISTORY_FOR_PROMPT_LEN: usize = 10;

const HISTORY_HEADER: &str = "Chat history:";

pub fn format_message(message: &Message) -> String {
    match message {
        Message::Attachment { file_name, size_kb, content, preview, .. } => {
            let content = if content.is_empty() { "Binary file" } else { content.as_str() };
            format!(
                "Attachment: {} ({:.1} KB)\nContent: {}\nPreview: {}",
                file_name,
                size_kb,
                content,
                preview
            )
        }
        Message::Text { sender, text, .. } => format!("{}: {}", sender.label(), text),
    }
}

/// Builds the prompt for `new_user_message` from the last
/// [`HISTORY_FOR_PROMPT_LEN`] messages of `conversation`. The new message
/// must not have been appended to the conversation yet.
pub fn build_prompt(conversation: &Conversation, new_user_message: &str) -> String {
    let messages = &conversation.messages;
    let start = messages.len().saturating_sub(HISTORY_FOR_PROMPT_LEN);
    let history = messages[start..]
        .iter()
        .map(format_message)
        .collect::<Vec<_>>()
        .join("\n");

    format!("{}\n{}\n\nUser: {}\nAssistant:", HISTORY_HEADER, history, new_user_message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::{ next_id, Sender };
    use chrono::Utc;

    fn conversation_with(messages: Vec<Message>) -> Conversation {
        let mut conv = Conversation::new();
        conv.messages = messages;
        conv
    }

    #[test]
    fn test_empty_history_keeps_header() {
        let prompt = build_prompt(&Conversation::new(), "hi");
        assert_eq!(prompt, "Chat history:\n\n\nUser: hi\nAssistant:");
    }

    #[test]
    fn test_window_keeps_last_ten_in_order() {
        let messages = (0..15)
            .map(|i| {
                let sender = if i % 2 == 0 { Sender::User } else { Sender::Assistant };
                Message::text(sender, format!("msg-{:02}", i))
            })
            .collect();
        let prompt = build_prompt(&conversation_with(messages), "newest");

        for i in 0..5 {
            assert!(!prompt.contains(&format!("msg-{:02}", i)), "msg-{:02} should be dropped", i);
        }
        let positions: Vec<usize> = (5..15)
            .map(|i| prompt.find(&format!("msg-{:02}", i)).expect("kept message missing"))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(prompt.starts_with("Chat history:\nAssistant: msg-05\n"));
        assert!(prompt.ends_with("Assistant: msg-13\nUser: msg-14\n\nUser: newest\nAssistant:"));
    }

    #[test]
    fn test_fewer_than_window_uses_all() {
        let messages = vec![
            Message::text(Sender::User, "hello"),
            Message::text(Sender::Assistant, "hi there")
        ];
        let prompt = build_prompt(&conversation_with(messages), "how are you?");
        assert_eq!(
            prompt,
            "Chat history:\nUser: hello\nAssistant: hi there\n\nUser: how are you?\nAssistant:"
        );
    }

    #[test]
    fn test_attachment_rendering() {
        let text_file = Message::Attachment {
            id: next_id(),
            sender: Sender::User,
            file_name: "notes.txt".to_string(),
            size_kb: 1.3,
            content: "abc".to_string(),
            preview: "abc".to_string(),
            timestamp: Utc::now(),
        };
        let image = Message::Attachment {
            id: next_id(),
            sender: Sender::User,
            file_name: "cat.png".to_string(),
            size_kb: 12.0,
            content: String::new(),
            preview: "(Binary file - preview not available)".to_string(),
            timestamp: Utc::now(),
        };
        assert_eq!(format_message(&text_file), "Attachment: notes.txt (1.3 KB)\nContent: abc\nPreview: abc");
        assert_eq!(
            format_message(&image),
            "Attachment: cat.png (12.0 KB)\nContent: Binary file\nPreview: (Binary file - preview not available)"
        );
    }
}
