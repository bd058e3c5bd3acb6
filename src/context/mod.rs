//! Conversation transcript and token accounting.
//!
//! The transcript is sent verbatim to the remote model on every request, so
//! every mutation here keeps it free of half-finished turns: responses are
//! validated before anything is appended, and loading a file only replaces
//! the transcript once the whole file has been parsed.

mod message;
mod usage;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::completion::CompletionResponse;
use crate::error::ChatError;

pub use message::{KERNEL_ROLE, Message, SYSTEM_ROLE, USER_ROLE};
pub use usage::{DEFAULT_COUNTERS, Usage};

/// `strftime` pattern for saved context file names.
const DUMP_FILE_PATTERN: &str = "context-%Y%m%d-%H%M%S.json";

/// How much of the transcript to drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truncate {
    /// Remove the last `n` entries, stopping at an empty transcript.
    Last(usize),
    /// Remove everything.
    All,
}

#[derive(Debug, Clone, Default)]
pub struct Context {
    transcript: Vec<Message>,
    usage: Usage,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a saved transcript, failing if the file is not a list of messages.
    pub fn from_path(path: &Path) -> Result<Self, ChatError> {
        let mut context = Self::new();
        context.load(path)?;
        Ok(context)
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub const fn usage(&self) -> &Usage {
        &self.usage
    }

    pub fn len(&self) -> usize {
        self.transcript.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcript.is_empty()
    }

    pub fn append_user(&mut self, content: impl Into<String>) {
        self.transcript.push(Message::user(content));
    }

    /// Commits every message of a response and adds its usage counters.
    ///
    /// Nothing is appended unless the response validates.
    pub fn append_from_response(
        &mut self,
        response: CompletionResponse,
    ) -> Result<&Message, ChatError> {
        let valid = response.validate()?;

        for (name, value) in &valid.usage {
            self.usage.add(name, *value);
        }
        self.transcript.extend(valid.messages);

        self.transcript
            .last()
            .ok_or_else(|| ChatError::MalformedResponse("no message appended".into()))
    }

    /// Drops entries from the end of the transcript. Never fails.
    pub fn truncate(&mut self, how: Truncate) {
        match how {
            Truncate::All => self.transcript.clear(),
            Truncate::Last(n) => {
                let keep = self.transcript.len().saturating_sub(n);
                self.transcript.truncate(keep);
            }
        }
    }

    /// Serializes the transcript as a pretty-printed JSON array.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.transcript)
    }

    /// Writes the transcript to a timestamp-named file inside `dir`.
    ///
    /// Two saves within the same second overwrite each other.
    pub fn save(&self, dir: &Path) -> Result<PathBuf, ChatError> {
        fs::create_dir_all(dir).map_err(|source| ChatError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = dir.join(Local::now().format(DUMP_FILE_PATTERN).to_string());
        self.to_json()
            .map_err(std::io::Error::from)
            .and_then(|json| crate::fs::atomic_write(&path, &json))
            .map_err(|source| ChatError::Io {
                path: path.clone(),
                source,
            })?;

        tracing::info!(path = %path.display(), entries = self.len(), "context saved");
        Ok(path)
    }

    /// Replaces the transcript with the one stored at `path`.
    ///
    /// The current transcript is untouched if reading or validation fails.
    /// Usage counters are kept.
    pub fn load(&mut self, path: &Path) -> Result<(), ChatError> {
        let contents = fs::read_to_string(path).map_err(|source| ChatError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        self.transcript = parse_transcript(path, &contents)?;
        tracing::info!(path = %path.display(), entries = self.len(), "context loaded");
        Ok(())
    }
}

fn parse_transcript(path: &Path, contents: &str) -> Result<Vec<Message>, ChatError> {
    serde_json::from_str::<Vec<Message>>(contents).map_err(|e| ChatError::InvalidCacheFormat {
        path: path.to_path_buf(),
        reason: format!("expected a JSON array of {{role, content}} records ({e})"),
    })
}
