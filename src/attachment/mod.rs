pub mod ics;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use log::{ debug, warn };

use crate::models::chat::{ next_id, Message, Sender };
use crate::models::websocket::FileUpload;

pub const PREVIEW_MAX_CHARS: usize = 200;
pub const EVENT_DESCRIPTION_MAX_CHARS: usize = 100;
pub const BINARY_PREVIEW: &str = "(Binary file - preview not available)";
pub const UNREADABLE_PREVIEW: &str = "(Could not read content)";

const TEXT_EXTENSIONS: &[&str] = &[".txt", ".ics", ".md", ".csv", ".log"];
const TEXT_MIME_TYPES: &[&str] = &["text/plain", "text/calendar"];

#[derive(Debug, thiserror::Error)]
pub enum AttachmentError {
    #[error("invalid base64 payload: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub trait FileSource: Send + Sync {
    fn name(&self) -> &str;
    fn mime_type(&self) -> &str;
    fn byte_size(&self) -> u64;
    fn read(&self) -> Result<Vec<u8>, AttachmentError>;
}

impl FileSource for FileUpload {
    fn name(&self) -> &str {
        &self.name
    }

    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    fn byte_size(&self) -> u64 {
        self.size
    }

    fn read(&self) -> Result<Vec<u8>, AttachmentError> {
        Ok(BASE64.decode(self.data.trim())?)
    }
}

pub fn is_text_file(file: &dyn FileSource) -> bool {
    if TEXT_MIME_TYPES.contains(&file.mime_type()) {
        return true;
    }
    let name = file.name().to_lowercase();
    TEXT_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

pub fn is_calendar_file(file: &dyn FileSource) -> bool {
    file.mime_type() == "text/calendar" || file.name().to_lowercase().ends_with(".ics")
}

pub fn text_preview(content: &str) -> String {
    truncate_with_ellipsis(content, PREVIEW_MAX_CHARS)
}

fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        out.push_str("...");
    }
    out
}

pub fn size_kb(bytes: u64) -> f64 {
    ((bytes as f64) / 1024.0 * 10.0).round() / 10.0
}

fn event_preview(event: &ics::CalendarEvent) -> String {
    let description: String = event.description.chars().take(EVENT_DESCRIPTION_MAX_CHARS).collect();
    format!(
        "Event: {}\nDate: {} to {}\nDesc: {}...",
        event.summary,
        event.start,
        event.end,
        description
    )
}

pub fn read_attachment(file: &dyn FileSource) -> Message {
    let mut content = String::new();
    let preview;

    if is_text_file(file) {
        match file.read() {
            Ok(bytes) => {
                content = String::from_utf8_lossy(&bytes).into_owned();
                let parsed = if is_calendar_file(file) { ics::parse_ics(&content) } else { None };
                preview = match parsed {
                    Some(event) => event_preview(&event),
                    None => text_preview(&content),
                };
            }
            Err(e) => {
                warn!("Error reading file '{}': {}", file.name(), e);
                preview = UNREADABLE_PREVIEW.to_string();
            }
        }
    } else {
        debug!("Treating '{}' ({}) as binary", file.name(), file.mime_type());
        preview = BINARY_PREVIEW.to_string();
    }

    Message::Attachment {
        id: next_id(),
        sender: Sender::User,
        file_name: file.name().to_string(),
        size_kb: size_kb(file.byte_size()),
        content,
        preview,
        timestamp: Utc::now(),
    }
}
