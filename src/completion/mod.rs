//! Boundary to the remote chat completion service.

mod client;
mod types;

pub use client::{CompletionBackend, HttpCompletionClient};
pub use types::{Choice, CompletionRequest, CompletionResponse, ValidResponse};
