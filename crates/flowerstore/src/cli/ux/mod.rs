mod presenter;
mod progress;
mod table;

pub use presenter::{MessageType, format_money, style_text};
pub use progress::Spinner;
pub use table::{format_products, format_ticket};

use console::style;

/// Prints a formatted error message to stderr.
pub fn present_error(error: anyhow::Error) {
    eprintln!("\n{}", format_error(&error));
}

fn format_error(error: &anyhow::Error) -> String {
    let error_text = style("ERROR:").red().bold();
    // Alternate form prints the context chain.
    format!("{error_text} {error:#}")
}
