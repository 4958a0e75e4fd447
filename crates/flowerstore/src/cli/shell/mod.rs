//! Interactive shell for the shop.
pub mod commands;
mod compl;
mod repl;

pub use repl::run;
