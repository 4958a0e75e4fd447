use std::io::{self, Write};

use clap::{Parser, Subcommand, ValueEnum};
use flowerstore_core::config::StoreConfig;
use flowerstore_core::product::{Material, NewProduct, Product, ProductKind, ProductType};
use thiserror::Error;
use tracing::debug;

use crate::cli::ux::{MessageType, format_money, format_products, format_ticket, style_text};
use crate::input::{InputError, PromptExt, Prompter};
use crate::svc::ServiceError;
use crate::svc::inventory::Inventory;
use crate::svc::sales::{SaleItem, Sales};

const TYPE_MENU: &str = "What you want?\n1. TREE.\n2. FLOWER.\n3. DECORATION.";

// --------------
// Shell commands
// --------------
#[derive(Parser, Debug)]
#[command(multicall = true)]
pub struct ShellCommand {
    #[command(subcommand)]
    pub command: Command,
}

/// Product type argument.
#[derive(ValueEnum, Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum TypeArg {
    Tree,
    Flower,
    Decoration,
}

impl From<TypeArg> for ProductType {
    fn from(value: TypeArg) -> Self {
        match value {
            TypeArg::Tree => ProductType::Tree,
            TypeArg::Flower => ProductType::Flower,
            TypeArg::Decoration => ProductType::Decoration,
        }
    }
}

#[derive(Subcommand, Debug, Clone, Hash, PartialEq, Eq)]
pub enum Command {
    /// Show the catalog, optionally only one product type
    #[command(visible_alias = "ls")]
    List {
        /// Product type to show
        #[arg(value_enum)]
        product_type: Option<TypeArg>,
    },
    /// Add a product to the catalog
    #[command(visible_alias = "a")]
    Add,
    /// Set the stock and price of a product
    #[command(visible_alias = "u")]
    Update,
    /// Remove a product from the catalog
    #[command(visible_alias = "rm")]
    Delete,
    /// Show the value of everything in the shop
    Value,
    /// Show the stock of one product type and its value
    Stock {
        /// Product type, asked for when missing
        #[arg(value_enum)]
        product_type: Option<TypeArg>,
    },
    /// Sell products and print the ticket
    #[command(visible_alias = "s")]
    Sell,
    /// Show every sales ticket
    #[command(visible_alias = "t")]
    Tickets,
    /// Show the total amount sold
    Sales,
    /// Exit the shell
    #[command(visible_alias = "q", visible_alias = "quit")]
    Exit,
}

#[derive(Error, Debug)]
pub enum CommandError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),
}

/// Everything a command needs to run.
pub struct ShellContext<'a> {
    pub inventory: &'a Inventory,
    pub sales: &'a Sales,
    pub store: &'a StoreConfig,
    pub prompter: &'a mut dyn Prompter,
    pub out: &'a mut dyn Write,
}

impl Command {
    /// Executes a shell command, reporting user errors on the output.
    ///
    /// Returns `Ok(false)` if the shell should exit.
    pub async fn execute(self, ctx: &mut ShellContext<'_>) -> anyhow::Result<bool> {
        if self == Command::Exit {
            return Ok(false);
        }

        match self.run(ctx).await {
            Ok(()) => {}
            Err(CommandError::Input(InputError::Cancelled | InputError::Eof)) => {
                writeln!(ctx.out, "Cancelled.")?;
            }
            Err(CommandError::Service(e)) => {
                let message = e.to_string();
                writeln!(ctx.out, "{}", style_text(&message, MessageType::Error))?;
            }
            Err(e) => return Err(e.into()),
        }
        Ok(true)
    }

    /// Runs the command, returning every failure to the caller.
    pub async fn run(self, ctx: &mut ShellContext<'_>) -> Result<(), CommandError> {
        debug!(command = ?self, "Running command");
        match self {
            Command::List { product_type } => list(ctx, product_type.map(Into::into)).await,
            Command::Add => add(ctx).await,
            Command::Update => update(ctx).await,
            Command::Delete => delete(ctx).await,
            Command::Value => value(ctx).await,
            Command::Stock { product_type } => stock(ctx, product_type.map(Into::into)).await,
            Command::Sell => sell(ctx).await,
            Command::Tickets => tickets(ctx).await,
            Command::Sales => total_sales(ctx).await,
            Command::Exit => Ok(()),
        }
    }
}

async fn list(
    ctx: &mut ShellContext<'_>,
    product_type: Option<ProductType>,
) -> Result<(), CommandError> {
    let products = ctx.inventory.list(product_type).await?;
    if products.is_empty() {
        writeln!(ctx.out, "No products found")?;
    } else {
        writeln!(ctx.out, "{}", format_products(&products))?;
    }
    Ok(())
}

async fn add(ctx: &mut ShellContext<'_>) -> Result<(), CommandError> {
    let option = ctx.prompter.read_in_range(
        "Type\n1 for Tree.\n2 for Flower.\n3 for Decoration",
        3,
    )?;
    let name = ctx.prompter.read_string("Type a name for product.")?;
    let quantity = ctx.prompter.read_u32("Type a quantity stock.")?;
    let price = ctx.prompter.read_f64("Type a price.")?;

    let kind = match ProductType::from_menu_option(option) {
        Some(ProductType::Tree) => ProductKind::Tree {
            height: ctx.prompter.read_f64("Type height for the tree")?,
        },
        Some(ProductType::Flower) => ProductKind::Flower {
            color: ctx.prompter.read_string("Type color for the flower")?,
        },
        Some(ProductType::Decoration) | None => ProductKind::Decoration {
            material: read_material(ctx.prompter)?,
        },
    };

    let product = ctx
        .inventory
        .add(NewProduct::new(&name, quantity, price, kind))
        .await?;
    let message = format!("{} was added", product.name);
    writeln!(ctx.out, "{}", style_text(&message, MessageType::Success))?;
    Ok(())
}

fn read_material(prompter: &mut dyn Prompter) -> Result<Material, InputError> {
    loop {
        let answer = prompter
            .read_string("Type material for the decoration\nOnly \"madera\" or \"plastico\"")?;
        match answer.parse() {
            Ok(material) => return Ok(material),
            Err(_) => prompter
                .notify("Invalid material. Please enter either \"madera\" or \"plastico\"."),
        }
    }
}

async fn update(ctx: &mut ShellContext<'_>) -> Result<(), CommandError> {
    let Some(product) = select_product(ctx).await? else {
        return Ok(());
    };

    let quantity = ctx.prompter.read_int(&format!(
        "You selected {}\nPlease enter new stock for the product:",
        product.name
    ))?;
    if quantity <= 0 {
        return Err(ServiceError::QuantityNotPositive.into());
    }
    let price = ctx
        .prompter
        .read_f64(&format!("Choose a price for {}", product.name))?;

    let updated = ctx.inventory.update_stock(product.id, quantity, price).await?;
    let message = format!("{} updated.", updated.name);
    writeln!(ctx.out, "{}", style_text(&message, MessageType::Success))?;
    Ok(())
}

async fn delete(ctx: &mut ShellContext<'_>) -> Result<(), CommandError> {
    let Some(product) = select_product(ctx).await? else {
        return Ok(());
    };
    let deleted = ctx.inventory.delete(product.id).await?;
    let message = format!("Product: {} deleted", deleted.name);
    writeln!(ctx.out, "{}", style_text(&message, MessageType::Success))?;
    Ok(())
}

/// Asks for a type, shows its products and asks for one of their ids.
async fn select_product(ctx: &mut ShellContext<'_>) -> Result<Option<Product>, CommandError> {
    let product_type = read_product_type(ctx.prompter)?;
    let products = ctx.inventory.list(Some(product_type)).await?;
    if products.is_empty() {
        writeln!(ctx.out, "No products found")?;
        return Ok(None);
    }
    writeln!(ctx.out, "{}", format_products(&products))?;

    loop {
        let id = ctx
            .prompter
            .read_u32("Type the ID of the product to select:")?;
        match ctx.inventory.select(product_type, id).await {
            Ok(product) => return Ok(Some(product)),
            Err(e @ ServiceError::InvalidSelection(_)) => ctx.prompter.notify(&e.to_string()),
            Err(e) => return Err(e.into()),
        }
    }
}

fn read_product_type(prompter: &mut dyn Prompter) -> Result<ProductType, InputError> {
    let option = prompter.read_in_range(TYPE_MENU, 3)?;
    // Options are bounded to the menu above.
    Ok(ProductType::from_menu_option(option).unwrap_or(ProductType::Decoration))
}

async fn value(ctx: &mut ShellContext<'_>) -> Result<(), CommandError> {
    let total = ctx.inventory.total_value().await?;
    writeln!(
        ctx.out,
        "The flower store {} had a total value {}",
        ctx.store.name,
        format_money(total, &ctx.store.currency)
    )?;
    Ok(())
}

async fn stock(
    ctx: &mut ShellContext<'_>,
    product_type: Option<ProductType>,
) -> Result<(), CommandError> {
    let product_type = match product_type {
        Some(t) => t,
        None => read_product_type(ctx.prompter)?,
    };
    let summary = ctx.inventory.stock_value(product_type).await?;

    writeln!(ctx.out, "{}", format_products(&summary.products))?;
    let title = format!("The flower store {} had a stock value:", ctx.store.name);
    writeln!(
        ctx.out,
        "\n{}\nTOTAL TYPE STOCK: {}\nPRICE STOCK TYPE: {}.",
        style_text(&title, MessageType::Header),
        summary.units,
        format_money(summary.value, &ctx.store.currency)
    )?;
    Ok(())
}

async fn sell(ctx: &mut ShellContext<'_>) -> Result<(), CommandError> {
    let products = ctx.inventory.list(None).await?;
    if products.is_empty() {
        writeln!(ctx.out, "No products found")?;
        return Ok(());
    }
    writeln!(ctx.out, "{}", format_products(&products))?;

    let mut items = Vec::new();
    while let Some(product_id) = ctx
        .prompter
        .read_optional_u32("Type the ID of the product to sell, empty to finish:")?
    {
        let quantity = ctx.prompter.read_u32("How many units?")?;
        items.push(SaleItem {
            product_id,
            quantity,
        });
    }
    if items.is_empty() {
        writeln!(ctx.out, "Nothing sold.")?;
        return Ok(());
    }

    let ticket = ctx.sales.sell(&items).await?;
    writeln!(ctx.out, "{}", format_ticket(&ticket, &ctx.store.currency))?;
    Ok(())
}

async fn tickets(ctx: &mut ShellContext<'_>) -> Result<(), CommandError> {
    let tickets = ctx.sales.tickets().await?;
    if tickets.is_empty() {
        writeln!(ctx.out, "No tickets found")?;
        return Ok(());
    }
    let blocks: Vec<String> = tickets
        .iter()
        .map(|t| format_ticket(t, &ctx.store.currency))
        .collect();
    writeln!(ctx.out, "{}", blocks.join("\n\n"))?;
    Ok(())
}

async fn total_sales(ctx: &mut ShellContext<'_>) -> Result<(), CommandError> {
    let total = ctx.sales.total_sales().await?;
    writeln!(
        ctx.out,
        "The total sales of the FlowerShop {} is the: {}.",
        ctx.store.name,
        format_money(total, &ctx.store.currency)
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ScriptedPrompter;
    use crate::test_utils::{memory_services, seeded_inventory};

    /// Runs one command against the services with scripted answers.
    async fn run_command(
        command: Command,
        inventory: &Inventory,
        sales: &Sales,
        answers: &[&str],
    ) -> (bool, String, ScriptedPrompter) {
        let store = StoreConfig::default();
        let mut prompter = ScriptedPrompter::new(answers);
        let mut out = Vec::new();
        let keep_going = {
            let mut ctx = ShellContext {
                inventory,
                sales,
                store: &store,
                prompter: &mut prompter,
                out: &mut out,
            };
            command.execute(&mut ctx).await.unwrap()
        };
        let text = console::strip_ansi_codes(&String::from_utf8(out).unwrap()).to_string();
        (keep_going, text, prompter)
    }

    fn parse(line: &str) -> Command {
        let args = shlex::split(line).unwrap();
        ShellCommand::try_parse_from(args).unwrap().command
    }

    #[test]
    fn test_parse_commands_and_aliases() {
        assert_eq!(parse("/list"), Command::List { product_type: None });
        assert_eq!(
            parse("/ls flower"),
            Command::List {
                product_type: Some(TypeArg::Flower)
            }
        );
        assert_eq!(parse("/a"), Command::Add);
        assert_eq!(parse("/rm"), Command::Delete);
        assert_eq!(
            parse("/stock tree"),
            Command::Stock {
                product_type: Some(TypeArg::Tree)
            }
        );
        assert_eq!(parse("/s"), Command::Sell);
        assert_eq!(parse("/t"), Command::Tickets);
        assert_eq!(parse("/quit"), Command::Exit);
        assert_eq!(parse("/q"), Command::Exit);

        let args = shlex::split("/list shrub").unwrap();
        assert!(ShellCommand::try_parse_from(args).is_err());
        assert!(ShellCommand::try_parse_from(["/unknown"]).is_err());
    }

    #[tokio::test]
    async fn test_exit_stops_the_shell() {
        let (inventory, sales) = memory_services();
        let (keep_going, text, _) = run_command(Command::Exit, &inventory, &sales, &[]).await;
        assert!(!keep_going);
        assert!(text.is_empty());
    }

    #[tokio::test]
    async fn test_list_empty_and_filtered() {
        let (inventory, sales) = memory_services();
        let (keep_going, text, _) =
            run_command(Command::List { product_type: None }, &inventory, &sales, &[]).await;
        assert!(keep_going);
        assert_eq!(text, "No products found\n");

        let (inventory, sales) = seeded_inventory().await;
        let command = Command::List {
            product_type: Some(TypeArg::Flower),
        };
        let (_, text, _) = run_command(command, &inventory, &sales, &[]).await;
        assert!(text.contains("Rosa"));
        assert!(text.contains("Tulipan"));
        assert!(!text.contains("Olivo"));
    }

    #[tokio::test]
    async fn test_add_decoration_retries_material() {
        let (inventory, sales) = memory_services();
        let answers = ["3", "Cesta", "12", "9.9", "metal", "Madera"];

        let (_, text, prompter) = run_command(Command::Add, &inventory, &sales, &answers).await;

        assert_eq!(text, "Cesta was added\n");
        assert_eq!(
            prompter.notices,
            vec!["Invalid material. Please enter either \"madera\" or \"plastico\"."]
        );
        let products = inventory.list(None).await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(
            products[0].kind,
            ProductKind::Decoration {
                material: Material::Wood
            }
        );
    }

    #[tokio::test]
    async fn test_add_tree_with_invalid_height_reports_error() {
        let (inventory, sales) = memory_services();
        let answers = ["1", "Pino", "2", "30", "-1"];

        let (keep_going, text, _) = run_command(Command::Add, &inventory, &sales, &answers).await;

        assert!(keep_going);
        assert!(text.contains("Invalid tree height"));
        assert!(inventory.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_reprompts_invalid_id() {
        let (inventory, sales) = seeded_inventory().await;
        let rose = inventory.list(Some(ProductType::Flower)).await.unwrap()[0].clone();
        let olive = inventory.list(Some(ProductType::Tree)).await.unwrap()[0].clone();
        let rose_id = rose.id.to_string();
        let olive_id = olive.id.to_string();
        let answers = ["2", olive_id.as_str(), "99", rose_id.as_str(), "7", "3.10"];

        let (_, text, prompter) = run_command(Command::Update, &inventory, &sales, &answers).await;

        assert!(text.ends_with("Rosa updated.\n"));
        assert_eq!(
            prompter.notices,
            vec![
                "Invalid ID. Please enter a valid ID.",
                "Invalid ID. Please enter a valid ID."
            ]
        );
        let updated = inventory.select(ProductType::Flower, rose.id).await.unwrap();
        assert_eq!(updated.quantity, 7);
        assert_eq!(updated.price, 3.1);
    }

    #[tokio::test]
    async fn test_update_rejects_non_positive_stock() {
        let (inventory, sales) = seeded_inventory().await;
        let olive = inventory.list(Some(ProductType::Tree)).await.unwrap()[0].clone();
        let olive_id = olive.id.to_string();

        let answers = ["1", olive_id.as_str(), "0"];
        let (_, text, prompter) = run_command(Command::Update, &inventory, &sales, &answers).await;

        assert!(text.ends_with("Can't add under 0\n"));
        // No price is asked for.
        assert_eq!(prompter.prompts.len(), 3);
        let stored = inventory.select(ProductType::Tree, olive.id).await.unwrap();
        assert_eq!(stored, olive);
    }

    #[tokio::test]
    async fn test_delete_selected_product() {
        let (inventory, sales) = seeded_inventory().await;
        let vase = inventory.list(Some(ProductType::Decoration)).await.unwrap()[0].clone();
        let vase_id = vase.id.to_string();

        let answers = ["3", vase_id.as_str()];
        let (_, text, _) = run_command(Command::Delete, &inventory, &sales, &answers).await;

        assert!(text.ends_with("Product: Jarron deleted\n"));
        assert!(
            inventory
                .list(Some(ProductType::Decoration))
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_delete_without_products_of_type() {
        let (inventory, sales) = memory_services();
        let (_, text, _) = run_command(Command::Delete, &inventory, &sales, &["1"]).await;
        assert_eq!(text, "No products found\n");
    }

    #[tokio::test]
    async fn test_value_and_stock_reports() {
        let (inventory, sales) = seeded_inventory().await;

        let (_, text, _) = run_command(Command::Value, &inventory, &sales, &[]).await;
        assert_eq!(
            text,
            "The flower store Flores Bonitas had a total value 180.00€\n"
        );

        let command = Command::Stock { product_type: None };
        let (_, text, _) = run_command(command, &inventory, &sales, &["2"]).await;
        assert!(text.contains("Rosa"));
        assert!(text.ends_with(
            "The flower store Flores Bonitas had a stock value:\nTOTAL TYPE STOCK: 30\nPRICE STOCK TYPE: 50.00€.\n"
        ));
    }

    #[tokio::test]
    async fn test_sell_prints_ticket_and_total_sales() {
        let (inventory, sales) = seeded_inventory().await;
        let rose = inventory.list(Some(ProductType::Flower)).await.unwrap()[0].clone();
        let rose_id = rose.id.to_string();

        let answers = [rose_id.as_str(), "3", rose_id.as_str(), "1", ""];
        let (_, text, _) = run_command(Command::Sell, &inventory, &sales, &answers).await;
        assert!(text.contains("Ticket #1"));
        assert!(text.ends_with("Total: 8.00€\n"));

        let (_, text, _) = run_command(Command::Tickets, &inventory, &sales, &[]).await;
        assert!(text.starts_with("Ticket #1"));

        let (_, text, _) = run_command(Command::Sales, &inventory, &sales, &[]).await;
        assert_eq!(
            text,
            "The total sales of the FlowerShop Flores Bonitas is the: 8.00€.\n"
        );
    }

    #[tokio::test]
    async fn test_sell_insufficient_stock_is_reported() {
        let (inventory, sales) = seeded_inventory().await;
        let olive = inventory.list(Some(ProductType::Tree)).await.unwrap()[0].clone();
        let olive_id = olive.id.to_string();

        let answers = [olive_id.as_str(), "5", ""];
        let (keep_going, text, _) = run_command(Command::Sell, &inventory, &sales, &answers).await;

        assert!(keep_going);
        assert!(text.ends_with("Not enough stock of Olivo: 2 available, 5 requested\n"));
        let (_, text, _) = run_command(Command::Tickets, &inventory, &sales, &[]).await;
        assert_eq!(text, "No tickets found\n");
    }

    #[tokio::test]
    async fn test_running_out_of_answers_cancels() {
        let (inventory, sales) = memory_services();
        let (keep_going, text, _) = run_command(Command::Add, &inventory, &sales, &["1"]).await;
        assert!(keep_going);
        assert_eq!(text, "Cancelled.\n");
    }
}
