// Console abstraction used by the menu loop and the command handlers.
// `TerminalConsole` is the interactive implementation; tests drive the
// same handlers with a scripted one.

use std::io;
use std::time::Duration;

use crossterm::style::{style, Stylize};
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};

pub trait Console {
    /// Show `prompt` and read one line. An empty line is a valid answer.
    fn read_line(&mut self, prompt: &str) -> io::Result<String>;

    /// Plain output.
    fn show(&mut self, line: &str);

    /// A command refused to run.
    fn warn(&mut self, line: &str);

    /// A command failed.
    fn error(&mut self, line: &str);

    /// A remote call is starting; `end_task` always follows.
    fn begin_task(&mut self, _message: &str) {}

    fn end_task(&mut self) {}
}

/// Stdout/stderr console with a spinner while remote calls are in flight.
#[derive(Default)]
pub struct TerminalConsole {
    spinner: Option<ProgressBar>,
}

impl TerminalConsole {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Console for TerminalConsole {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        // `interact_text` echoes the prompt and edits the line in place.
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
    }

    fn show(&mut self, line: &str) {
        println!("{}", line);
    }

    fn warn(&mut self, line: &str) {
        println!("{}", style(line).yellow());
    }

    fn error(&mut self, line: &str) {
        eprintln!("{}", style(line).red());
    }

    fn begin_task(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        let template = ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(template);
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(spinner);
    }

    fn end_task(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}
