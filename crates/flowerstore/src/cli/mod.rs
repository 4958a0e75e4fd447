//! Flowerstore cli definition and entrypoint.
pub mod shell;
pub mod ux;

use std::io::{Write, stdout};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use flowerstore_core::config::{Config, StoreConfig, get_config};
use flowerstore_core::stock::load_initial_stock;

use crate::cli::shell::commands::{Command, ShellContext, TypeArg};
use crate::cli::ux::Spinner;
use crate::input::NonInteractive;
use crate::storage::{Backend, open_backend};
use crate::svc::inventory::Inventory;
use crate::svc::sales::Sales;

/// Flowerstore - inventory and point of sale for a flower shop.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Show verbose logs.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file, created with defaults when missing.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Start the interactive shell. This is the default.
    Shell,
    /// Show the catalog.
    List {
        /// Only show products of this type.
        #[arg(short = 't', long = "type", value_enum)]
        product_type: Option<TypeArg>,
    },
    /// Show the value of everything in the shop.
    Value,
    /// Show the stock of one product type and its value.
    Stock {
        /// Product type to report.
        #[arg(short = 't', long = "type", value_enum)]
        product_type: TypeArg,
    },
    /// Show every sales ticket.
    Tickets,
    /// Show the total amount sold.
    Sales,
    /// Load the initial stock into an empty catalog.
    Seed,
}

impl Commands {
    /// Shell command producing the same report.
    fn report(&self) -> Option<Command> {
        match self {
            Commands::List { product_type } => Some(Command::List {
                product_type: *product_type,
            }),
            Commands::Value => Some(Command::Value),
            Commands::Stock { product_type } => Some(Command::Stock {
                product_type: Some(*product_type),
            }),
            Commands::Tickets => Some(Command::Tickets),
            Commands::Sales => Some(Command::Sales),
            Commands::Shell | Commands::Seed => None,
        }
    }
}

pub async fn run(cli: &Cli) -> Result<()> {
    // Load configuration
    let config = get_config(cli.config.clone()).context("Failed to load configuration")?;

    let spinner = Spinner::new(format!(
        "Opening {} storage...",
        config.storage.backend.as_str()
    ));
    let backend = open_backend(&config.storage).await;
    spinner.clear();
    let backend = backend.context("Failed to open storage")?;

    let command = cli.command.clone().unwrap_or(Commands::Shell);
    seed_on_startup(&command, &config, &backend).await?;
    execute(command, &config, backend).await
}

/// Seeds an empty catalog when configured to. `seed` reports its own load instead.
async fn seed_on_startup(command: &Commands, config: &Config, backend: &Backend) -> Result<()> {
    if config.store.seed_initial_stock && *command != Commands::Seed {
        load_initial_stock(&*backend.products)
            .await
            .context("Failed to load initial stock")?;
    }
    Ok(())
}

async fn seed(backend: &Backend, store: &StoreConfig) -> Result<String> {
    let count = load_initial_stock(&*backend.products)
        .await
        .context("Failed to load initial stock")?;
    Ok(if count == 0 {
        "The catalog is not empty, nothing was loaded.".to_string()
    } else {
        format!("Loaded {count} products into {}.", store.name)
    })
}

async fn execute(command: Commands, config: &Config, backend: Backend) -> Result<()> {
    let inventory = Inventory::new(backend.products.clone());
    let sales = Sales::new(backend.products.clone(), backend.tickets.clone());

    if let Some(report) = command.report() {
        let mut prompter = NonInteractive;
        let mut out = stdout();
        let mut ctx = ShellContext {
            inventory: &inventory,
            sales: &sales,
            store: &config.store,
            prompter: &mut prompter,
            out: &mut out,
        };
        report.run(&mut ctx).await?;
        out.flush()?;
        return Ok(());
    }

    match command {
        Commands::Seed => {
            println!("{}", seed(&backend, &config.store).await?);
            Ok(())
        }
        _ => shell::run(&inventory, &sales, &config.store).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowerstore_core::repository::ProductRepository;
    use std::fs;
    use tempfile::TempDir;

    fn memory_config(seed: bool) -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flowerstore.yml");
        let content = format!(
            "store:\n  name: Test Shop\n  seed_initial_stock: {seed}\nstorage:\n  backend: memory\n"
        );
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_parse_cli() {
        let cli = Cli::try_parse_from(["flowerstore"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);

        let cli = Cli::try_parse_from(["flowerstore", "-v", "list", "--type", "flower"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(
            cli.command,
            Some(Commands::List {
                product_type: Some(TypeArg::Flower)
            })
        );

        let cli =
            Cli::try_parse_from(["flowerstore", "stock", "-t", "tree", "--config", "x.yml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.yml")));
        assert_eq!(
            cli.command,
            Some(Commands::Stock {
                product_type: TypeArg::Tree
            })
        );

        assert!(Cli::try_parse_from(["flowerstore", "stock"]).is_err());
    }

    #[test]
    fn test_reports_map_to_shell_commands() {
        assert_eq!(Commands::Value.report(), Some(Command::Value));
        assert_eq!(
            Commands::Stock {
                product_type: TypeArg::Decoration
            }
            .report(),
            Some(Command::Stock {
                product_type: Some(TypeArg::Decoration)
            })
        );
        assert_eq!(Commands::Seed.report(), None);
        assert_eq!(Commands::Shell.report(), None);
    }

    #[tokio::test]
    async fn test_run_reports_with_memory_backend() {
        let (_dir, path) = memory_config(true);
        for command in [
            Commands::List { product_type: None },
            Commands::Value,
            Commands::Stock {
                product_type: TypeArg::Flower,
            },
            Commands::Tickets,
            Commands::Sales,
            Commands::Seed,
        ] {
            let cli = Cli {
                command: Some(command),
                verbose: false,
                config: Some(path.clone()),
            };
            run(&cli).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_seed_command_reports_its_own_load() {
        let (_dir, path) = memory_config(true);
        let config = get_config(Some(path)).unwrap();
        let expected = format!(
            "Loaded {} products into Test Shop.",
            flowerstore_core::stock::initial_stock().len()
        );

        let backend = open_backend(&config.storage).await.unwrap();
        seed_on_startup(&Commands::Seed, &config, &backend).await.unwrap();
        assert!(backend.products.is_empty().await.unwrap());
        assert_eq!(seed(&backend, &config.store).await.unwrap(), expected);

        let backend = open_backend(&config.storage).await.unwrap();
        seed_on_startup(&Commands::Value, &config, &backend).await.unwrap();
        assert_eq!(
            seed(&backend, &config.store).await.unwrap(),
            "The catalog is not empty, nothing was loaded."
        );
    }

    #[tokio::test]
    async fn test_run_fails_on_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flowerstore.yml");
        fs::write(&path, "store:\n  name: Shop\nstorage:\n  backend: sql\n").unwrap();

        let cli = Cli {
            command: Some(Commands::Value),
            verbose: false,
            config: Some(path),
        };
        let err = run(&cli).await.unwrap_err();
        assert!(err.to_string().contains("Failed to load configuration"));
    }
}
