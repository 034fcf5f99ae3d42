//! Message store collaborators
//!
//! The extraction pipeline does no I/O. Stores enumerate and fetch raw
//! messages for it; [`summarize`] builds the list view a viewer shows.

use crate::error::{MailError, Result};
use crate::parser::parse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

/// Recipient shown when a message has no parseable `To` address
pub const UNKNOWN_RECIPIENT: &str = "Unknown";

/// Subject shown when a message has none
pub const NO_SUBJECT: &str = "No Subject";

/// Recipient and subject shown for a message that could not be fetched
pub const READ_ERROR: &str = "Error reading message";

/// Read-only access to stored raw messages
pub trait MessageStore {
    /// Enumerate stored messages, in no particular order
    fn list(&self) -> Result<Vec<StoredMessage>>;

    /// Raw bytes of one message
    fn fetch(&self, id: &str) -> Result<Vec<u8>>;
}

/// Listing entry for one stored message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

/// Configuration for [`DirStore`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding one raw message per file
    pub root: PathBuf,

    /// Only list files with this extension (e.g. "eml")
    pub extension: Option<String>,
}

impl StoreConfig {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: None,
        }
    }

    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| MailError::Config(e.to_string()))
    }

    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| MailError::io(path, e))?;
        Self::from_toml_str(&contents)
    }
}

/// Store backed by a directory of raw message files; the file name is the
/// message identifier
#[derive(Debug, Clone)]
pub struct DirStore {
    config: StoreConfig,
}

impl DirStore {
    pub fn new(config: StoreConfig) -> Result<Self> {
        if !config.root.is_dir() {
            return Err(MailError::Config(format!(
                "store root '{}' is not a directory",
                config.root.display()
            )));
        }
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn path_for(&self, id: &str) -> Result<PathBuf> {
        let unsafe_id = id.is_empty()
            || id == "."
            || id == ".."
            || id.contains(['/', '\\', '\0']);
        if unsafe_id {
            return Err(MailError::InvalidId(id.to_string()));
        }
        Ok(self.config.root.join(id))
    }

    fn wanted(&self, path: &Path) -> bool {
        self.config.extension.as_deref().is_none_or(|wanted| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(wanted))
        })
    }
}

impl MessageStore for DirStore {
    fn list(&self) -> Result<Vec<StoredMessage>> {
        let root = &self.config.root;
        let entries = fs::read_dir(root).map_err(|e| MailError::io(root, e))?;

        let mut messages = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| MailError::io(root, e))?;
            let path = entry.path();
            let metadata = entry.metadata().map_err(|e| MailError::io(&path, e))?;
            if !metadata.is_file() || !self.wanted(&path) {
                continue;
            }
            let Some(id) = entry.file_name().to_str().map(str::to_string) else {
                warn!("Skipping non UTF-8 file name {}", path.display());
                continue;
            };

            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            messages.push(StoredMessage {
                id,
                size: metadata.len(),
                last_modified: DateTime::<Utc>::from(modified),
            });
        }

        debug!("Listed {} messages in {}", messages.len(), root.display());
        messages.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(messages)
    }

    fn fetch(&self, id: &str) -> Result<Vec<u8>> {
        let path = self.path_for(id)?;
        fs::read(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MailError::NotFound(id.to_string())
            } else {
                MailError::io(path, e)
            }
        })
    }
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    messages: BTreeMap<String, (DateTime<Utc>, Vec<u8>)>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a message
    pub fn insert(&mut self, id: impl Into<String>, last_modified: DateTime<Utc>, raw: Vec<u8>) {
        self.messages.insert(id.into(), (last_modified, raw));
    }
}

impl MessageStore for MemoryStore {
    fn list(&self) -> Result<Vec<StoredMessage>> {
        Ok(self
            .messages
            .iter()
            .map(|(id, (last_modified, raw))| StoredMessage {
                id: id.clone(),
                size: raw.len() as u64,
                last_modified: *last_modified,
            })
            .collect())
    }

    fn fetch(&self, id: &str) -> Result<Vec<u8>> {
        self.messages
            .get(id)
            .map(|(_, raw)| raw.clone())
            .ok_or_else(|| MailError::NotFound(id.to_string()))
    }
}

/// One row of a message list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSummary {
    pub id: String,
    pub last_modified: DateTime<Utc>,

    /// First recipient address
    pub to: String,

    pub subject: String,
}

/// List a store newest first, with recipient and subject read from each
/// message. A message that cannot be fetched is listed with
/// [`READ_ERROR`] instead of failing the listing.
pub fn summarize<S: MessageStore + ?Sized>(store: &S) -> Result<Vec<MessageSummary>> {
    let mut entries = store.list()?;
    entries.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));

    Ok(entries
        .into_iter()
        .map(|entry| summary_of(store, entry))
        .collect())
}

fn summary_of<S: MessageStore + ?Sized>(store: &S, entry: StoredMessage) -> MessageSummary {
    let (to, subject) = match store.fetch(&entry.id) {
        Ok(raw) => {
            let headers = parse(&raw).headers;
            let to = headers
                .addresses("to")
                .and_then(|value| value.first_address().map(|m| m.address.clone()))
                .unwrap_or_else(|| UNKNOWN_RECIPIENT.to_string());
            let subject = headers
                .subject()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| NO_SUBJECT.to_string());
            (to, subject)
        }
        Err(err) => {
            warn!("Failed to read message {}: {err}", entry.id);
            (READ_ERROR.to_string(), READ_ERROR.to_string())
        }
    };

    MessageSummary {
        id: entry.id,
        last_modified: entry.last_modified,
        to,
        subject,
    }
}
