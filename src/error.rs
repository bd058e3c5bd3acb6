//! Error types shared by the context, completion and command layers.

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while handling a single command.
///
/// None of these are fatal: the chat loop turns them into kernel messages.
#[derive(Error, Debug)]
pub enum ChatError {
    /// A command was invoked with the wrong number of arguments.
    #[error("Wrong number of arguments for command {opcode}.")]
    Arity { opcode: String },

    /// The remote reply is missing `choices`, `usage`, or any message payload.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// A stored context is not a JSON array of `{role, content}` records.
    #[error("Invalid cache format in {}: {reason}", path.display())]
    InvalidCacheFormat { path: PathBuf, reason: String },

    /// Network, HTTP status, or authentication failure from the remote call.
    #[error("Transport failure: {0}")]
    Transport(String),

    /// Reading or writing a context file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An interactive prompt could not be answered.
    #[error("Prompt failed: {0}")]
    Prompt(String),
}

impl ChatError {
    pub fn arity(opcode: impl Into<String>) -> Self {
        Self::Arity {
            opcode: opcode.into(),
        }
    }

    /// Returns `true` for errors that count as a failed remote attempt.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::MalformedResponse(_) | Self::Transport(_))
    }
}
