use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const TICK_STRINGS: &[&str] = &["|", "/", "-", "\\", " "];
const TICK_INTERVAL: Duration = Duration::from_millis(200);

/// A terminal spinner shown while a request is in flight.
///
/// Ticks on indicatif's own thread, which only reads the message set here.
/// `stop` joins that thread; dropping the spinner does the same.
pub struct Spinner {
    progress_bar: ProgressBar,
}

impl Spinner {
    /// Starts a spinner followed by `message`.
    pub fn new(message: &str) -> Self {
        let style = ProgressStyle::default_spinner()
            .template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICK_STRINGS);

        let progress_bar = ProgressBar::new_spinner();
        progress_bar.set_style(style);
        progress_bar.set_message(message.to_string());
        progress_bar.enable_steady_tick(TICK_INTERVAL);

        Self { progress_bar }
    }

    /// Replaces the text shown after the spinner.
    pub fn set_message(&self, message: &str) {
        self.progress_bar.set_message(message.to_string());
    }

    /// Stops the spinner and clears its line.
    pub fn stop(&self) {
        if !self.progress_bar.is_finished() {
            self.progress_bar.finish_and_clear();
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.stop();
    }
}
