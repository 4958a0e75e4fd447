use std::io::{Write, stdout};

use anyhow::Result;
use clap::{CommandFactory, Parser, ValueEnum};
use flowerstore_core::config::StoreConfig;
use rustyline::error::ReadlineError;
use rustyline::{CompletionType, Editor};

use super::commands::{ShellCommand, ShellContext, TypeArg};
use super::compl::Repl;
use crate::cli::ux::{MessageType, style_text};
use crate::svc::inventory::Inventory;
use crate::svc::sales::Sales;

fn command_names() -> Vec<String> {
    ShellCommand::command()
        .get_subcommands()
        .flat_map(|c| c.get_name_and_visible_aliases())
        .map(|s| format!("/{s}"))
        .collect()
}

fn type_names() -> Vec<String> {
    TypeArg::value_variants()
        .iter()
        .filter_map(|v| v.to_possible_value())
        .map(|v| v.get_name().to_string())
        .collect()
}

/// Runs the interactive shell until `/exit` or end of input.
pub async fn run(inventory: &Inventory, sales: &Sales, store: &StoreConfig) -> Result<()> {
    let welcome = format!("Welcome to {}!", store.name);
    println!(
        "{} Type '/help' for commands, '/q' to exit.",
        style_text(&welcome, MessageType::Header)
    );

    let config = rustyline::Config::builder()
        .history_ignore_dups(true)?
        .history_ignore_space(true)
        .completion_type(CompletionType::List)
        .build();

    let mut rl = Editor::with_config(config)?;
    rl.set_helper(Some(Repl {
        command_names: command_names(),
        type_names: type_names(),
    }));

    let prompt = format!("\n{}", style_text("> ", MessageType::Prompt));
    let mut out = stdout();
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                rl.add_history_entry(&line)?;
                let trimmed_line = line.trim();
                if trimmed_line.is_empty() {
                    continue;
                }
                if !trimmed_line.starts_with('/') {
                    println!("Commands start with '/'. Type '/help' for the list.");
                    continue;
                }

                let args = shlex::split(trimmed_line).unwrap_or_default();
                match ShellCommand::try_parse_from(args) {
                    Ok(shell_command) => {
                        let mut ctx = ShellContext {
                            inventory,
                            sales,
                            store,
                            prompter: &mut rl,
                            out: &mut out,
                        };
                        let keep_going = shell_command.command.execute(&mut ctx).await?;
                        out.flush()?;
                        if !keep_going {
                            return Ok(());
                        }
                    }
                    Err(e) => {
                        e.print()?;
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("Type /quit to exit.");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nBye!");
                return Ok(());
            }
            Err(err) => {
                return Err(err.into());
            }
        }
    }
}
