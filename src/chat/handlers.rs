//! One handler per command kind.
//!
//! Handlers validate their arguments before touching anything, so an arity
//! error never mutates the context or the session.

use std::path::PathBuf;

use super::display::Display;
use super::registry::{Command, CommandKind, Registry};
use super::session::SessionState;
use crate::completion::{CompletionBackend, CompletionRequest};
use crate::context::{Context, Message, Truncate};
use crate::error::ChatError;
use crate::ui::ordinal;

/// Shown when a request could not be completed within the retry budget.
pub const REQUEST_FAILED: &str = "Error receiving response from the model.";

/// Collaborators handlers need besides the mutable state.
#[derive(Clone, Copy)]
pub struct Services<'a> {
    pub registry: &'a Registry,
    pub backend: &'a dyn CompletionBackend,
}

/// Runs a resolved command and returns the message to render.
pub async fn handle(
    command: &Command,
    session: &mut SessionState,
    context: &mut Context,
    display: &mut dyn Display,
    services: Services<'_>,
) -> Result<Message, ChatError> {
    match command.kind {
        CommandKind::Help => help(command, services.registry),
        CommandKind::Quit => quit(command, session),
        CommandKind::Save => save(command, session, context, display),
        CommandKind::Load => load(command, context, display),
        CommandKind::Back => back(command, context, display),
        CommandKind::Clear => clear(command, context, display),
        CommandKind::Change => change(command, session, display),
        CommandKind::Request => {
            let text = single_arg(command)?;
            Ok(request(text, session, context, display, services.backend).await)
        }
    }
}

fn no_args(command: &Command) -> Result<(), ChatError> {
    if command.args.is_empty() {
        Ok(())
    } else {
        Err(ChatError::arity(&command.opcode))
    }
}

fn optional_arg(command: &Command) -> Result<Option<&str>, ChatError> {
    match command.args.as_slice() {
        [] => Ok(None),
        [arg] => Ok(Some(arg.as_str())),
        _ => Err(ChatError::arity(&command.opcode)),
    }
}

fn single_arg(command: &Command) -> Result<&str, ChatError> {
    match command.args.as_slice() {
        [arg] => Ok(arg.as_str()),
        _ => Err(ChatError::arity(&command.opcode)),
    }
}

/// Asks the user, rejecting a blank answer.
fn ask(display: &mut dyn Display, question: &str) -> Result<String, ChatError> {
    let answer = display.prompt(question)?;
    let answer = answer.trim();
    if answer.is_empty() {
        return Err(ChatError::Prompt("no value given".to_string()));
    }
    Ok(answer.to_string())
}

fn help(command: &Command, registry: &Registry) -> Result<Message, ChatError> {
    no_args(command)?;
    Ok(Message::kernel(registry.help_text()))
}

fn quit(command: &Command, session: &mut SessionState) -> Result<Message, ChatError> {
    no_args(command)?;
    session.terminate();
    Ok(Message::kernel("Quit."))
}

fn save(
    command: &Command,
    session: &SessionState,
    context: &Context,
    display: &mut dyn Display,
) -> Result<Message, ChatError> {
    let dir = match optional_arg(command)? {
        Some(dir) => PathBuf::from(dir),
        None => match &session.dump_dir {
            Some(dir) => dir.clone(),
            None => PathBuf::from(ask(display, "Specify a dump directory")?),
        },
    };

    let path = context.save(&dir)?;
    Ok(Message::kernel(format!("Cache saved to {}.", path.display())))
}

fn load(
    command: &Command,
    context: &mut Context,
    display: &mut dyn Display,
) -> Result<Message, ChatError> {
    let path = match optional_arg(command)? {
        Some(path) => PathBuf::from(path),
        None => PathBuf::from(ask(display, "Specify a cache path")?),
    };

    context.load(&path)?;
    display.clear_screen();
    display.show_transcript(context.transcript());
    Ok(Message::kernel("Context is changed."))
}

fn back(
    command: &Command,
    context: &mut Context,
    display: &mut dyn Display,
) -> Result<Message, ChatError> {
    no_args(command)?;
    context.truncate(Truncate::Last(2));
    display.clear_screen();
    display.show_transcript(context.transcript());
    Ok(Message::kernel("Now at last context."))
}

fn clear(
    command: &Command,
    context: &mut Context,
    display: &mut dyn Display,
) -> Result<Message, ChatError> {
    no_args(command)?;
    context.truncate(Truncate::All);
    display.clear_screen();
    Ok(Message::kernel("Now at a new context."))
}

fn change(
    command: &Command,
    session: &mut SessionState,
    display: &mut dyn Display,
) -> Result<Message, ChatError> {
    let model = match optional_arg(command)? {
        Some(model) => model.to_string(),
        None => ask(
            display,
            &format!(
                "Specify a model within [{}]",
                session.known_models.join(", ")
            ),
        )?,
    };

    let known = session.is_known_model(&model);
    if !known {
        tracing::warn!(model = %model, "switching to a model outside the known list");
    }
    session.model = model;

    let mut reply = format!("Model is changed to {}.", session.model);
    if !known {
        reply.push_str(" It is not in the known model list.");
    }
    Ok(Message::kernel(reply))
}

/// Sends `text` with the whole transcript, retrying up to the session budget.
///
/// On success the reply is in the context and returned. On failure the user
/// turn is rolled back so the next request never carries an unanswered turn.
pub async fn request(
    text: &str,
    session: &SessionState,
    context: &mut Context,
    display: &mut dyn Display,
    backend: &dyn CompletionBackend,
) -> Message {
    context.append_user(text);

    let progress = display.waiting();
    let mut outcome = Err(ChatError::Transport("no attempt made".into()));

    for attempt in 1..=session.retry {
        let request = CompletionRequest {
            model: &session.model,
            messages: context.transcript(),
        };

        outcome = backend.complete(&request).await.and_then(|reply| {
            if reply.is_complete() {
                Ok(reply)
            } else {
                Err(ChatError::MalformedResponse(
                    "response is missing choices or usage".into(),
                ))
            }
        });

        match &outcome {
            Ok(_) => break,
            Err(e) if e.is_retryable() => {
                tracing::warn!(attempt, error = %e, "completion attempt failed");
            }
            Err(e) => {
                tracing::error!(attempt, error = %e, "completion attempt failed unexpectedly");
            }
        }

        if attempt < session.retry {
            progress.set_postfix(&format!("Request failed, {} retrying.", ordinal(attempt)));
        }
    }
    progress.finish();

    let committed = outcome.and_then(|reply| context.append_from_response(reply).cloned());

    match committed {
        Ok(message) => message,
        Err(e) => {
            tracing::error!(error = %e, "rolling back unanswered user turn");
            context.truncate(Truncate::Last(1));
            Message::kernel(format!("{REQUEST_FAILED} {e}"))
        }
    }
}
