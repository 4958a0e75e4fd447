//! Line based prompting for the interactive commands.
use std::collections::VecDeque;

use rustyline::Helper;
use rustyline::error::ReadlineError;
use rustyline::history::History;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Input cancelled")]
    Cancelled,
    #[error("No more input")]
    Eof,
    #[error("Failed to read input: {0}")]
    Readline(#[from] ReadlineError),
}

/// Source of user answers.
pub trait Prompter {
    fn read_line(&mut self, prompt: &str) -> Result<String, InputError>;

    /// Shows a message about the last answer.
    fn notify(&mut self, message: &str);
}

/// Typed questions on top of [`Prompter::read_line`]. Invalid answers are reported and
/// asked again.
pub trait PromptExt: Prompter {
    fn read_int(&mut self, prompt: &str) -> Result<i64, InputError> {
        loop {
            match self.read_line(prompt)?.trim().parse::<i64>() {
                Ok(value) => return Ok(value),
                Err(_) => self.notify("Please enter a whole number."),
            }
        }
    }

    fn read_u32(&mut self, prompt: &str) -> Result<u32, InputError> {
        loop {
            match self.read_line(prompt)?.trim().parse::<u32>() {
                Ok(value) => return Ok(value),
                Err(_) => self.notify("Please enter a positive whole number."),
            }
        }
    }

    /// Like [`PromptExt::read_u32`], `None` for an empty answer.
    fn read_optional_u32(&mut self, prompt: &str) -> Result<Option<u32>, InputError> {
        loop {
            let line = self.read_line(prompt)?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            match trimmed.parse::<u32>() {
                Ok(value) => return Ok(Some(value)),
                Err(_) => self.notify("Please enter a positive whole number."),
            }
        }
    }

    fn read_f64(&mut self, prompt: &str) -> Result<f64, InputError> {
        loop {
            match self.read_line(prompt)?.trim().parse::<f64>() {
                Ok(value) if value.is_finite() => return Ok(value),
                _ => self.notify("Please enter a number."),
            }
        }
    }

    /// Menu option between 1 and `max`.
    fn read_in_range(&mut self, prompt: &str, max: u32) -> Result<u32, InputError> {
        loop {
            match self.read_line(prompt)?.trim().parse::<u32>() {
                Ok(value) if (1..=max).contains(&value) => return Ok(value),
                _ => self.notify(&format!("Please choose an option between 1 and {max}.")),
            }
        }
    }

    fn read_string(&mut self, prompt: &str) -> Result<String, InputError> {
        loop {
            let line = self.read_line(prompt)?;
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                return Ok(trimmed.to_string());
            }
            self.notify("The answer must not be empty.");
        }
    }
}

impl<P: Prompter + ?Sized> PromptExt for P {}

impl<H: Helper, I: History> Prompter for rustyline::Editor<H, I> {
    fn read_line(&mut self, prompt: &str) -> Result<String, InputError> {
        let prompt = format!("{prompt}\n> ");
        match self.readline(&prompt) {
            Ok(line) => Ok(line),
            Err(ReadlineError::Interrupted) => Err(InputError::Cancelled),
            Err(ReadlineError::Eof) => Err(InputError::Eof),
            Err(err) => Err(err.into()),
        }
    }

    fn notify(&mut self, message: &str) {
        eprintln!("{message}");
    }
}

/// Prompter for one-shot commands, where nobody can answer.
#[derive(Debug, Default)]
pub struct NonInteractive;

impl Prompter for NonInteractive {
    fn read_line(&mut self, _prompt: &str) -> Result<String, InputError> {
        Err(InputError::Eof)
    }

    fn notify(&mut self, _message: &str) {}
}

/// Replays canned answers, recording prompts and notices. Used by tests.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    pub prompts: Vec<String>,
    pub notices: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<S: AsRef<str>>(answers: &[S]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.as_ref().to_string()).collect(),
            ..Default::default()
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn read_line(&mut self, prompt: &str) -> Result<String, InputError> {
        self.prompts.push(prompt.to_string());
        self.answers.pop_front().ok_or(InputError::Eof)
    }

    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }
}
