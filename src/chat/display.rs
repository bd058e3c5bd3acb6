//! Where command output goes.
//!
//! Handlers only ever talk to a [`Display`]; the terminal implementation
//! lives here too, so the rest of the chat module never touches stdout.

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{self, Clear, ClearType};
use inquire::Text;
use inquire::ui::{Attributes, Color, RenderConfig, StyleSheet, Styled};

use super::registry::CommandCompleter;
use crate::context::{Message, SYSTEM_ROLE, USER_ROLE};
use crate::error::ChatError;
use crate::ui::{Spinner, Style, is_prompt_cancelled};

/// Role headers are padded to at least this width.
const MIN_HEADER_WIDTH: usize = 20;

const WELCOME_BANNER: &str = r"
================================================
  ___ _       ___ _         _    ___ _         _
 / __(_)_ __ / __| |_  __ _| |_ / __| |_  __ _| |_
 \__ \ | '  \ (__| ' \/ _` |  _| (__| ' \/ _` |  _|
 |___/_|_|_|_\___|_||_\__,_|\__|\___|_||_\__,_|\__|
================================================
";

/// Progress indicator for a request in flight.
pub trait Progress {
    /// Text appended after the indicator, e.g. the retry ordinal.
    fn set_postfix(&self, postfix: &str);
    /// Stops the indicator and waits for it to clear.
    fn finish(&self);
}

/// Output sink and input source for the chat loop.
pub trait Display {
    /// Reads the next line typed at the main prompt.
    ///
    /// `Ok(None)` means the user asked to leave (Ctrl+C, Esc, end of input).
    fn read_input(&mut self) -> Result<Option<String>, ChatError>;

    /// Asks a follow-up question, e.g. a path for `\load`.
    fn prompt(&mut self, message: &str) -> Result<String, ChatError>;

    fn clear_screen(&mut self);

    fn show_message(&mut self, message: &Message);

    fn show_transcript(&mut self, messages: &[Message]) {
        for message in messages {
            self.show_message(message);
        }
    }

    /// Starts a progress indicator.
    fn waiting(&mut self) -> Box<dyn Progress>;
}

impl Progress for Spinner {
    fn set_postfix(&self, postfix: &str) {
        self.set_message(postfix);
    }

    fn finish(&self) {
        self.stop();
    }
}

/// `# ROLE >` padded to [`MIN_HEADER_WIDTH`].
pub fn role_header(role: &str) -> String {
    let header = format!("# {} >", role.to_uppercase());
    format!("{header:<width$}", width = MIN_HEADER_WIDTH)
}

/// Drops the blank-line pair some replies start with.
pub fn display_content(content: &str) -> &str {
    content.strip_prefix("\n\n").unwrap_or(content)
}

/// Reads lines until the first empty one and joins them with `\n`.
///
/// `next_line` is told whether it is reading the first line. It returns
/// `None` when the user cancels, which abandons the whole message.
pub fn collect_message<F>(mut next_line: F) -> Result<Option<String>, ChatError>
where
    F: FnMut(bool) -> Result<Option<String>, ChatError>,
{
    let mut lines: Vec<String> = Vec::new();

    loop {
        let Some(line) = next_line(lines.is_empty())? else {
            return Ok(None);
        };
        if line.is_empty() {
            break;
        }
        lines.push(line);
    }

    Ok(Some(lines.join("\n")))
}

/// Width of the widest banner line.
fn banner_width() -> usize {
    WELCOME_BANNER
        .lines()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0)
}

/// Interactive terminal display.
pub struct TerminalDisplay {
    completer: CommandCompleter,
    render_config: RenderConfig<'static>,
}

impl TerminalDisplay {
    pub fn new(completer: CommandCompleter) -> Self {
        let prompt_style = Styled::new("❯")
            .with_fg(Color::LightBlue)
            .with_attr(Attributes::BOLD);
        let mut render_config = RenderConfig::default()
            .with_prompt_prefix(prompt_style)
            .with_answered_prompt_prefix(prompt_style);

        render_config.option = StyleSheet::new().with_fg(Color::Grey);
        render_config.selected_option = Some(StyleSheet::new().with_fg(Color::DarkMagenta));

        Self {
            completer,
            render_config,
        }
    }

    /// Prints the banner, or a notice when the terminal is too narrow for it.
    pub fn print_welcome(&mut self) {
        let needed = banner_width();
        let width = terminal::size().map_or(usize::MAX, |(cols, _)| usize::from(cols));

        if width < needed {
            self.show_message(&Message::new(
                SYSTEM_ROLE,
                format!(
                    "Change terminal width to no less than {needed} to get a better experience."
                ),
            ));
        } else {
            println!("{}", Style::header(WELCOME_BANNER));
        }
    }
}

impl Display for TerminalDisplay {
    fn read_input(&mut self) -> Result<Option<String>, ChatError> {
        println!("{}", Style::role(USER_ROLE, role_header(USER_ROLE)));

        let completer = &self.completer;
        let render_config = self.render_config;
        let input = collect_message(|first| {
            let text = if first {
                Text::new("")
                    .with_autocomplete(completer.clone())
                    .with_help_message(
                        "Finish with an empty line. \\help for commands, Ctrl+C to quit",
                    )
            } else {
                Text::new("")
            };

            match text.with_render_config(render_config).prompt() {
                Ok(line) => Ok(Some(line)),
                Err(e) if is_prompt_cancelled(&e) => Ok(None),
                Err(e) => Err(ChatError::Prompt(e.to_string())),
            }
        });

        println!();
        input
    }

    fn prompt(&mut self, message: &str) -> Result<String, ChatError> {
        Text::new(&format!("{message}:"))
            .with_render_config(self.render_config)
            .prompt()
            .map_err(|e| {
                if is_prompt_cancelled(&e) {
                    ChatError::Prompt("cancelled".to_string())
                } else {
                    ChatError::Prompt(e.to_string())
                }
            })
    }

    fn clear_screen(&mut self) {
        if let Err(e) = execute!(io::stdout(), Clear(ClearType::All), MoveTo(0, 0)) {
            tracing::warn!(error = %e, "failed to clear screen");
        }
    }

    fn show_message(&mut self, message: &Message) {
        println!("{}", Style::role(&message.role, role_header(&message.role)));
        println!();
        println!("{}", display_content(&message.content));
        println!();
        let _ = io::stdout().flush();
    }

    fn waiting(&mut self) -> Box<dyn Progress> {
        Box::new(Spinner::new(""))
    }
}
