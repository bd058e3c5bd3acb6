//! Backslash command registration and resolution.
//!
//! Input whose first token starts with [`ESCAPE`] is matched against the
//! registered opcodes by prefix. Everything else becomes an invocation of the
//! default command with the raw text as its single argument.

use inquire::autocompletion::{Autocomplete, Replacement};

/// Marks the first token of a line as a command.
pub const ESCAPE: char = '\\';

/// The handler a registered opcode dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Help,
    Quit,
    Save,
    Load,
    Back,
    Clear,
    Change,
    Request,
}

/// A registered opcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub opcode: String,
    pub description: String,
    pub kind: CommandKind,
}

/// A resolved line of input, ready to be handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub opcode: String,
    pub kind: CommandKind,
    pub args: Vec<String>,
}

impl Command {
    pub fn new(opcode: impl Into<String>, kind: CommandKind, args: Vec<String>) -> Self {
        Self {
            opcode: opcode.into(),
            kind,
            args,
        }
    }
}

/// Ordered table of opcodes.
///
/// Registration order matters: it is the order `\help` lists commands in and
/// the tie-break when a prefix matches more than one opcode.
#[derive(Debug, Clone)]
pub struct Registry {
    entries: Vec<Entry>,
    default_opcode: String,
}

impl Default for Registry {
    fn default() -> Self {
        let mut registry = Self::new(format!("{ESCAPE}request"));
        registry
            .register("\\help", "Show available commands.", CommandKind::Help)
            .register("\\quit", "Quit program.", CommandKind::Quit)
            .register("\\save", "Save context cache.", CommandKind::Save)
            .register("\\load", "Load context cache.", CommandKind::Load)
            .register("\\back", "Return to last context.", CommandKind::Back)
            .register("\\clear", "Clear the whole context.", CommandKind::Clear)
            .register("\\change", "Change used model.", CommandKind::Change)
            .register(
                "\\request",
                "Send a message to the model.",
                CommandKind::Request,
            );
        registry
    }
}

impl Registry {
    /// Creates an empty registry whose fallback is `default_opcode`.
    ///
    /// The fallback must be registered before [`Registry::resolve`] can use it.
    pub fn new(default_opcode: impl Into<String>) -> Self {
        Self {
            entries: Vec::new(),
            default_opcode: default_opcode.into(),
        }
    }

    /// Adds an opcode. Registering an existing opcode again replaces its
    /// description and handler but keeps its position.
    pub fn register(
        &mut self,
        opcode: impl Into<String>,
        description: impl Into<String>,
        kind: CommandKind,
    ) -> &mut Self {
        let entry = Entry {
            opcode: opcode.into(),
            description: description.into(),
            kind,
        };

        match self.entries.iter_mut().find(|e| e.opcode == entry.opcode) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
        self
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Finds the opcode a token stands for.
    ///
    /// An exact match wins. Otherwise the first-registered opcode that starts
    /// with `token` is chosen.
    pub fn find(&self, token: &str) -> Option<&Entry> {
        if !token.starts_with(ESCAPE) {
            return None;
        }

        self.entries
            .iter()
            .find(|e| e.opcode == token)
            .or_else(|| self.entries.iter().find(|e| e.opcode.starts_with(token)))
    }

    /// Turns a typed message into a command.
    ///
    /// Only the first line is tokenized. Chat text keeps every line as typed.
    /// An explicit `\request` joins the words of its first line with single
    /// spaces and keeps any following lines verbatim. Other commands take
    /// their arguments from the first line alone.
    ///
    /// Returns `None` for blank input, or when the input is chat text but no
    /// default command is registered.
    pub fn resolve(&self, input: &str) -> Option<Command> {
        let input = input.trim();
        let (first_line, more) = input.split_once('\n').unwrap_or((input, ""));
        let mut words = first_line.split_whitespace();
        let token = words.next()?;

        let Some(entry) = self.find(token) else {
            let fallback = self.entries.iter().find(|e| e.opcode == self.default_opcode)?;
            return Some(Command::new(
                fallback.opcode.clone(),
                fallback.kind,
                vec![input.to_string()],
            ));
        };

        let args = if entry.kind == CommandKind::Request {
            let text = [words.collect::<Vec<_>>().join(" "), more.to_string()]
                .into_iter()
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join("\n");
            if text.is_empty() {
                Vec::new()
            } else {
                vec![text]
            }
        } else {
            if !more.is_empty() {
                tracing::debug!(opcode = %entry.opcode, "ignoring lines after command");
            }
            words.map(str::to_string).collect()
        };

        Some(Command::new(entry.opcode.clone(), entry.kind, args))
    }

    /// One `+ opcode: description` line per registered command.
    pub fn help_text(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("+ {}: {}", e.opcode, e.description))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn completer(&self) -> CommandCompleter {
        CommandCompleter {
            commands: self
                .entries
                .iter()
                .map(|e| (e.opcode.clone(), e.description.clone()))
                .collect(),
        }
    }
}

/// Backslash command autocompleter for the main prompt.
#[derive(Clone, Default)]
pub struct CommandCompleter {
    commands: Vec<(String, String)>,
}

impl Autocomplete for CommandCompleter {
    fn get_suggestions(&mut self, input: &str) -> Result<Vec<String>, inquire::CustomUserError> {
        if !input.starts_with(ESCAPE) || input.contains(char::is_whitespace) {
            return Ok(vec![]);
        }

        let suggestions: Vec<String> = self
            .commands
            .iter()
            .filter(|(cmd, _)| cmd.starts_with(input))
            .map(|(cmd, desc)| format!("{cmd}  {desc}"))
            .collect();

        Ok(suggestions)
    }

    fn get_completion(
        &mut self,
        _input: &str,
        highlighted_suggestion: Option<String>,
    ) -> Result<Replacement, inquire::CustomUserError> {
        let replacement =
            highlighted_suggestion.map(|s| s.split_whitespace().next().unwrap_or("").to_string());
        Ok(replacement)
    }
}
