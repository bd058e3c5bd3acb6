//! Subcommand implementations.

/// Interactive chat session.
pub mod chat;

/// Known model listing.
pub mod models;
