use log::{ debug, info };
use std::fs;
use std::io::ErrorKind;
use std::path::{ Path, PathBuf };

use crate::models::chat::Conversation;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("conversation blob IO error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("conversation blob JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the saved conversations; a missing file is an empty list.
    pub fn load(&self) -> Result<Vec<Conversation>, SnapshotError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No conversation blob at {}", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(self.io_error(e)),
        };
        let conversations: Vec<Conversation> = serde_json::from_str(&content)?;
        info!("Loaded {} conversations from {}", conversations.len(), self.path.display());
        Ok(conversations)
    }

    pub fn save(&self, conversations: &[Conversation]) -> Result<(), SnapshotError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let json = serde_json::to_string(conversations)?;
        fs::write(&self.path, json).map_err(|e| self.io_error(e))
    }

    pub fn clear(&self) -> Result<bool, SnapshotError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Removed conversation blob {}", self.path.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn io_error(&self, source: std::io::Error) -> SnapshotError {
        SnapshotError::Io { path: self.path.clone(), source }
    }
}

pub fn export_conversation(conversation: &Conversation) -> Result<(String, String), serde_json::Error> {
    let content = serde_json::to_string_pretty(conversation)?;
    Ok((format!("conversation-{}.json", conversation.id), content))
}
