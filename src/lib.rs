//! # simchat - Terminal Chat Client
//!
//! `simchat` is an interactive terminal client for OpenAI-compatible chat
//! completion endpoints. Messages you type are appended to a conversation
//! context that is sent in full with every request; backslash commands
//! manage that context.
//!
//! ## Commands
//!
//! | command    | effect                                              |
//! |------------|-----------------------------------------------------|
//! | `\help`    | list commands                                       |
//! | `\quit`    | leave                                               |
//! | `\save`    | write the context to a timestamped JSON file        |
//! | `\load`    | replace the context with a saved file               |
//! | `\back`    | drop the last question/answer pair                  |
//! | `\clear`   | drop the whole context                              |
//! | `\change`  | switch model                                        |
//! | `\request` | send text explicitly (plain text does the same)     |
//!
//! Any unambiguous prefix works: `\q` quits.
//!
//! ## Configuration
//!
//! Settings are read from `~/.config/simchat/config.toml`:
//!
//! ```toml
//! [chat]
//! model = "gpt-3.5-turbo"
//! retry = 3
//! dump_dir = "/home/me/chats"
//!
//! [api]
//! endpoint = "https://api.openai.com"
//! api_key_env = "OPENAI_API_KEY"
//! models = ["gpt-3.5-turbo", "gpt-3.5-turbo-0301"]
//! ```

/// Interactive chat mode: command registry, handlers, session loop.
pub mod chat;

/// Command-line interface definitions and handlers.
pub mod cli;

/// Remote chat completion boundary.
pub mod completion;

/// Configuration file management.
pub mod config;

/// Conversation transcript and token usage.
pub mod context;

/// Error taxonomy for command handling.
pub mod error;

/// File system utilities.
pub mod fs;

/// Diagnostic logging setup.
pub mod logging;

/// XDG-style path utilities for configuration and logs.
pub mod paths;

/// Terminal UI components (spinner, colors).
pub mod ui;
