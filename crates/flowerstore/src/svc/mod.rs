//! Services layer for the app. Uses flowerstore_core repositories to implement the shop's
//! operations for the cli.
pub mod inventory;
pub mod sales;

use flowerstore_core::repository::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Can't add under 0")]
    QuantityNotPositive,
    #[error("Invalid price: {0}")]
    InvalidPrice(f64),
    #[error("Invalid ID. Please enter a valid ID.")]
    InvalidSelection(u32),
    #[error("Product with id {0} not found")]
    ProductNotFound(u32),
    #[error("Not enough stock of {name}: {available} available, {requested} requested")]
    InsufficientStock {
        name: String,
        available: u32,
        requested: u32,
    },
    #[error("A sale needs at least one product")]
    EmptySale,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type Result<T> = std::result::Result<T, ServiceError>;
