//! Interactive chat mode.
//!
//! Provides a REPL-style interface where backslash commands manage the
//! conversation and everything else is sent to the model.

/// Output sink and input source.
pub mod display;
mod handlers;
/// Backslash command registration and resolution.
pub mod registry;
mod session;

#[cfg(test)]
mod testing;

pub use display::{Display, Progress, TerminalDisplay};
pub use handlers::{REQUEST_FAILED, Services, handle, request};
pub use registry::{Command, CommandCompleter, CommandKind, ESCAPE, Entry, Registry};
pub use session::{ChatSession, SessionState};
