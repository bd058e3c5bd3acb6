use std::path::PathBuf;

use anyhow::Result;

use super::display::Display;
use super::handlers::{self, Services};
use super::registry::Registry;
use crate::completion::CompletionBackend;
use crate::context::{Context, Message};

/// Mutable settings of a running chat, changed only by command handlers.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Model sent with every request.
    pub model: String,
    /// Maximum attempts for one request.
    pub retry: u32,
    /// Where `\save` writes when no directory is given.
    pub dump_dir: Option<PathBuf>,
    /// Models offered by `\change`.
    pub known_models: Vec<String>,
    terminated: bool,
}

impl SessionState {
    pub fn new(
        model: String,
        retry: u32,
        dump_dir: Option<PathBuf>,
        known_models: Vec<String>,
    ) -> Self {
        Self {
            model,
            retry,
            dump_dir,
            known_models,
            terminated: false,
        }
    }

    pub const fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub const fn terminate(&mut self) {
        self.terminated = true;
    }

    pub fn is_known_model(&self, model: &str) -> bool {
        self.known_models.iter().any(|m| m == model)
    }
}

/// An interactive chat: reads a line, dispatches it, renders the result.
///
/// Strictly sequential. A command, retries included, finishes before the
/// next line is read.
pub struct ChatSession {
    state: SessionState,
    context: Context,
    registry: Registry,
    backend: Box<dyn CompletionBackend>,
}

impl ChatSession {
    pub fn new(
        state: SessionState,
        context: Context,
        backend: Box<dyn CompletionBackend>,
    ) -> Self {
        Self {
            state,
            context,
            registry: Registry::default(),
            backend,
        }
    }

    #[must_use]
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    pub const fn context(&self) -> &Context {
        &self.context
    }

    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Handles one line of input.
    ///
    /// Returns `None` for blank lines. Command errors come back as kernel
    /// messages; they never end the session.
    pub async fn dispatch(&mut self, line: &str, display: &mut dyn Display) -> Option<Message> {
        let command = self.registry.resolve(line)?;
        tracing::debug!(opcode = %command.opcode, args = command.args.len(), "dispatching");

        let services = Services {
            registry: &self.registry,
            backend: self.backend.as_ref(),
        };

        let reply = handlers::handle(
            &command,
            &mut self.state,
            &mut self.context,
            display,
            services,
        )
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(opcode = %command.opcode, error = %e, "command failed");
            Message::kernel(e.to_string())
        });

        Some(reply)
    }

    /// Runs until `\quit` or until the user cancels the prompt.
    pub async fn run(&mut self, display: &mut dyn Display) -> Result<()> {
        while !self.state.is_terminated() {
            let Some(line) = display.read_input()? else {
                break;
            };

            if let Some(reply) = self.dispatch(&line, display).await {
                display.show_message(&reply);
            }
        }

        tracing::info!(usage = %self.context.usage(), "session finished");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::chat::testing::{ScriptedBackend, ScriptedDisplay, hello_response};
    use crate::completion::CompletionResponse;
    use crate::error::ChatError;

    fn chat(replies: Vec<Result<CompletionResponse, ChatError>>) -> ChatSession {
        let state = SessionState::new(
            "gpt-3.5-turbo".to_string(),
            2,
            None,
            vec!["gpt-3.5-turbo".to_string()],
        );
        ChatSession::new(state, Context::new(), Box::new(ScriptedBackend::new(replies)))
    }

    #[test]
    fn test_session_state_new() {
        let state = SessionState::new(
            "gpt-3.5-turbo".to_string(),
            3,
            Some(PathBuf::from("dump")),
            vec!["gpt-3.5-turbo".to_string()],
        );
        assert_eq!(state.model, "gpt-3.5-turbo");
        assert_eq!(state.retry, 3);
        assert_eq!(state.dump_dir, Some(PathBuf::from("dump")));
        assert!(!state.is_terminated());
        assert!(state.is_known_model("gpt-3.5-turbo"));
        assert!(!state.is_known_model("gpt-4"));
    }

    #[tokio::test]
    async fn test_run_until_quit() {
        let mut session = chat(vec![Ok(hello_response())]);
        let mut display = ScriptedDisplay::with_inputs(vec!["hi", "", "\\quit", "never read"]);

        session.run(&mut display).await.unwrap();

        assert!(session.state().is_terminated());
        assert_eq!(
            display.shown(),
            vec![Message::new("assistant", "hello"), Message::kernel("Quit.")]
        );
        assert_eq!(session.context().len(), 2);
    }

    #[tokio::test]
    async fn test_run_ends_when_input_is_exhausted() {
        let mut session = chat(vec![]);
        let mut display = ScriptedDisplay::with_inputs(vec!["\\help"]);

        session.run(&mut display).await.unwrap();

        assert!(!session.state().is_terminated());
        assert_eq!(display.shown().len(), 1);
        assert!(display.shown()[0].is_kernel());
    }

    #[tokio::test]
    async fn test_errors_become_kernel_messages() {
        let mut session = chat(vec![]);
        let mut display = ScriptedDisplay::default();

        let reply = session.dispatch("\\clear now", &mut display).await.unwrap();
        assert!(reply.is_kernel());
        assert_eq!(reply.content, "Wrong number of arguments for command \\clear.");
    }

    #[tokio::test]
    async fn test_blank_line_dispatches_nothing() {
        let mut session = chat(vec![]);
        let mut display = ScriptedDisplay::default();
        assert!(session.dispatch("   ", &mut display).await.is_none());
    }

    #[tokio::test]
    async fn test_failed_request_leaves_no_orphan_turn() {
        let mut session = chat(vec![
            Err(ChatError::Transport("down".into())),
            Err(ChatError::Transport("down".into())),
            Ok(hello_response()),
        ]);
        let mut display = ScriptedDisplay::default();

        let reply = session.dispatch("first", &mut display).await.unwrap();
        assert!(reply.is_kernel());
        assert!(session.context().is_empty());

        let reply = session.dispatch("second", &mut display).await.unwrap();
        assert_eq!(reply.content, "hello");
        assert_eq!(
            session.context().transcript(),
            &[Message::user("second"), Message::new("assistant", "hello")]
        );
    }

    #[tokio::test]
    async fn test_custom_registry() {
        let mut registry = Registry::new("\\request");
        registry
            .register("\\bye", "Leave.", crate::chat::CommandKind::Quit)
            .register("\\request", "Ask.", crate::chat::CommandKind::Request);
        let mut session = chat(vec![]).with_registry(registry);
        let mut display = ScriptedDisplay::default();

        session.dispatch("\\b", &mut display).await.unwrap();
        assert!(session.state().is_terminated());
    }
}
