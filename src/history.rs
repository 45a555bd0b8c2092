//! The append-only log of prompt/response pairs.
//!
//! The log is a single JSON array, oldest entry first. Entries are never
//! rewritten once appended.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::AskError;
use crate::response::{normalize, null_as_empty, ApiResponse, Choice};

/// One prompt and the response it got
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub prompt: String,
    /// Seconds since epoch.
    pub created: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub choices: Vec<Choice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl LogEntry {
    /// Record `response` to `prompt`. Falls back to `now` when the API did not report `created`.
    pub fn from_response(prompt: &str, response: ApiResponse, now: DateTime<Utc>) -> Self {
        LogEntry {
            prompt: prompt.to_string(),
            created: response.created.unwrap_or_else(|| now.timestamp()),
            choices: response.choices,
            id: response.id,
            model: response.model,
        }
    }

    /// The raw text of the first choice, chat shape first. Empty when missing.
    pub fn response_text(&self) -> &str {
        self.choices
            .first()
            .and_then(Choice::text)
            .unwrap_or_default()
    }

    /// The first choice formatted the same way it was printed.
    pub fn display_text(&self) -> String {
        normalize(Some(&ApiResponse::from_choices(self.choices.clone())))
    }
}

/// Somewhere to keep the log between invocations.
pub trait LogStore {
    /// All entries, oldest first. An absent or unreadable log reads as empty.
    fn read(&self) -> Vec<LogEntry>;
    fn append(&mut self, entry: LogEntry) -> Result<(), AskError>;
}

/// A log kept as a pretty-printed JSON array in a single file
#[derive(Debug, Clone)]
pub struct JsonFileLog {
    path: PathBuf,
}

impl JsonFileLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        JsonFileLog {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse the whole log. A missing or blank file is an empty log.
    fn load(&self) -> Result<Vec<LogEntry>, AskError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    /// Move an unparsable log out of the way so appending starts a new one.
    fn set_aside(&self) -> Result<PathBuf, AskError> {
        let stamp = Utc::now().format("%Y%m%d%H%M%S");
        let aside = self.path.with_extension(format!("json.corrupt-{stamp}"));
        fs::rename(&self.path, &aside)?;
        Ok(aside)
    }
}

impl LogStore for JsonFileLog {
    fn read(&self) -> Vec<LogEntry> {
        self.load().unwrap_or_else(|e| {
            warn!(path = %self.path.display(), "ignoring unreadable log: {}", e);
            Vec::new()
        })
    }

    fn append(&mut self, entry: LogEntry) -> Result<(), AskError> {
        let mut entries = match self.load() {
            Ok(entries) => entries,
            Err(AskError::Json(e)) => {
                let aside = self.set_aside()?;
                warn!(
                    path = %self.path.display(),
                    moved_to = %aside.display(),
                    "log is not valid JSON, starting a new one: {}", e
                );
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        entries.push(entry);
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        // the file on disk is always a complete array
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&entries)?)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), entries = entries.len(), "appended log entry");
        Ok(())
    }
}

/// A log that lives only as long as the process
#[derive(Debug, Clone, Default)]
pub struct MemoryLog {
    entries: Vec<LogEntry>,
}

impl MemoryLog {
    pub fn new(entries: Vec<LogEntry>) -> Self {
        MemoryLog { entries }
    }
}

impl LogStore for MemoryLog {
    fn read(&self) -> Vec<LogEntry> {
        self.entries.clone()
    }

    fn append(&mut self, entry: LogEntry) -> Result<(), AskError> {
        self.entries.push(entry);
        Ok(())
    }
}
