//! Colors for chat output.

use owo_colors::OwoColorize;
use std::fmt::Display;

use crate::context::{KERNEL_ROLE, SYSTEM_ROLE, USER_ROLE};

pub struct Style;

impl Style {
    /// Banner and list headings.
    pub fn header<T: Display>(text: T) -> String {
        text.bold().to_string()
    }

    pub fn label<T: Display>(text: T) -> String {
        text.dimmed().to_string()
    }

    /// Model names and paths.
    pub fn value<T: Display>(text: T) -> String {
        text.cyan().to_string()
    }

    /// Usage statistics and other supplementary text.
    pub fn secondary<T: Display>(text: T) -> String {
        text.dimmed().italic().to_string()
    }

    pub fn success<T: Display>(text: T) -> String {
        text.green().to_string()
    }

    pub fn error<T: Display>(text: T) -> String {
        text.red().bold().to_string()
    }

    pub fn warning<T: Display>(text: T) -> String {
        text.yellow().to_string()
    }

    /// Marks the model a session starts with in `simchat models`.
    pub fn default_marker() -> String {
        "(default)".dimmed().to_string()
    }

    /// Transcript header colored by speaker. Assistant replies and any
    /// unrecognized role share one color.
    pub fn role<T: Display>(role: &str, text: T) -> String {
        match role {
            USER_ROLE => text.blue().bold().to_string(),
            KERNEL_ROLE => text.yellow().bold().to_string(),
            SYSTEM_ROLE => text.red().bold().to_string(),
            _ => text.magenta().bold().to_string(),
        }
    }
}
