use console::{Style, StyledObject};

/// Kind of shell output, used for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    /// The prompt for user input.
    Prompt,
    /// Table headers and titles.
    Header,
    /// Secondary information, like hints and totals.
    Footer,
    /// A completed action.
    Success,
    /// An error message.
    Error,
}

/// Styles a string of text according to the specified `MessageType`.
pub fn style_text(text: &str, style: MessageType) -> StyledObject<&str> {
    let style_obj = match style {
        MessageType::Prompt => Style::new().blue().bold(),
        MessageType::Header => Style::new().bold(),
        MessageType::Footer => Style::new().white().dim(),
        MessageType::Success => Style::new().green(),
        MessageType::Error => Style::new().red().bold(),
    };
    style_obj.apply_to(text)
}

/// Amount with two decimals followed by the currency symbol.
pub fn format_money(amount: f64, currency: &str) -> String {
    format!("{amount:.2}{currency}")
}
