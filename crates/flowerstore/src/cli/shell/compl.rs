use clap::Parser;
use rustyline::completion::{Candidate, Completer};
use rustyline::error::ReadlineError;
use rustyline::hint::Hinter;
use rustyline::{Helper, Highlighter, Validator};

use super::commands::{Command, ShellCommand};
use crate::cli::ux::{MessageType, style_text};

/// Completion candidate for the shell.
#[derive(Debug)]
pub struct CompletionCandidate {
    text: String,
    display_string: String,
}

impl CompletionCandidate {
    pub fn new(text: &str) -> Self {
        let display_string = style_text(text, MessageType::Footer).to_string();
        Self {
            text: text.to_owned(),
            display_string,
        }
    }
}

impl Candidate for CompletionCandidate {
    fn display(&self) -> &str {
        &self.display_string
    }

    fn replacement(&self) -> &str {
        &self.text
    }
}

/// Line editing state of the shell.
#[derive(Helper, Validator, Highlighter)]
pub struct Repl {
    pub command_names: Vec<String>,
    pub type_names: Vec<String>,
}

impl Completer for Repl {
    type Candidate = CompletionCandidate;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> Result<(usize, Vec<Self::Candidate>), ReadlineError> {
        if !line.starts_with('/') {
            return Ok((0, Vec::new()));
        }

        let line_to_pos = &line[..pos];
        if let Some(space_pos) = line_to_pos.rfind(' ') {
            let command_line = &line_to_pos[..space_pos];
            let args = shlex::split(command_line).unwrap_or_default();
            return match ShellCommand::try_parse_from(args).map(|c| c.command) {
                Ok(Command::List { .. } | Command::Stock { .. }) => {
                    type_compl(line_to_pos, space_pos + 1, &self.type_names)
                }
                _ => Ok((0, Vec::new())),
            };
        }

        let candidates = self
            .command_names
            .iter()
            .filter(|name| name.starts_with(line_to_pos))
            .map(|name| CompletionCandidate::new(name))
            .collect();

        Ok((0, candidates))
    }
}

impl Hinter for Repl {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<Self::Hint> {
        if line.is_empty() || pos < line.len() || !line.starts_with('/') {
            return None;
        }
        self.command_names
            .iter()
            .find(|&cmd_name| cmd_name.starts_with(line))
            .map(|cmd_name| cmd_name[line.len()..].into())
    }
}

// Product type argument completion
fn type_compl(
    line_to_pos: &str,
    prefix_start: usize,
    type_names: &[String],
) -> Result<(usize, Vec<CompletionCandidate>), ReadlineError> {
    let prefix = &line_to_pos[prefix_start..];
    let candidates = type_names
        .iter()
        .filter(|name| name.starts_with(prefix))
        .map(|name| CompletionCandidate::new(name))
        .collect();
    Ok((prefix_start, candidates))
}
