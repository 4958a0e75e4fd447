//! Persistence seams for the catalog and the sales history.
//!
//! Backends implement [`ProductRepository`] and [`TicketRepository`]. Two live in this
//! crate, [`memory::MemoryStore`] and [`document::DocumentStore`]; the relational
//! backend lives in `flowerstore-store-sql`.
pub mod document;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::product::{NewProduct, Product, ProductError, ProductType};
use crate::ticket::{NewTicket, Ticket};

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    InvalidProduct(#[from] ProductError),
    #[error("Stored data is corrupted: {0}")]
    Corrupted(String),
    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Storage backend error: {0}")]
    Backend(String),
    #[error("Not enough stock of {name}: {available} available, {requested} requested")]
    InsufficientStock {
        name: String,
        available: u32,
        requested: u32,
    },
}

pub type Result<T, E = RepositoryError> = std::result::Result<T, E>;

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn get_product(&self, id: u32) -> Result<Option<Product>>;

    /// All products, trees first, then flowers, then decorations; by id within a type.
    async fn all_products(&self) -> Result<Vec<Product>>;

    /// Product with the highest id.
    async fn last_product(&self) -> Result<Option<Product>>;

    /// Validates and stores a product under the next free id.
    async fn add_product(&self, product: NewProduct) -> Result<Product>;

    /// Replaces quantity and price of the product with the same id.
    async fn update_product(&self, product: &Product) -> Result<()>;

    async fn delete_product(&self, id: u32) -> Result<()>;

    /// Removes `(product id, units)` from stock as one step. Every product must exist and
    /// hold enough units, otherwise nothing changes. Returns the products after the
    /// decrement, in request order.
    async fn take_stock(&self, items: &[(u32, u32)]) -> Result<Vec<Product>>;

    async fn products_of_type(&self, product_type: ProductType) -> Result<Vec<Product>> {
        let products = self.all_products().await?;
        Ok(products
            .into_iter()
            .filter(|p| p.product_type() == product_type)
            .collect())
    }

    async fn is_empty(&self) -> Result<bool> {
        Ok(self.last_product().await?.is_none())
    }
}

#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Stores a ticket under the next free id.
    async fn add_ticket(&self, ticket: NewTicket) -> Result<Ticket>;

    /// Ticket with the highest id.
    async fn last_ticket(&self) -> Result<Option<Ticket>>;

    /// All tickets by ascending id.
    async fn all_tickets(&self) -> Result<Vec<Ticket>>;
}

/// Catalog order shared by every backend.
pub fn sort_products(products: &mut [Product]) {
    products.sort_by(|a, b| {
        b.product_type()
            .as_str()
            .cmp(a.product_type().as_str())
            .then(a.id.cmp(&b.id))
    });
}

/// Next id after the highest one in use, starting at 1.
pub fn next_id(last: Option<u32>) -> u32 {
    last.map_or(1, |id| id + 1)
}

/// Applies a stock take to `products` in place. Callers discard `products` on error.
pub(crate) fn take_from(products: &mut [Product], items: &[(u32, u32)]) -> Result<Vec<Product>> {
    let mut taken = Vec::with_capacity(items.len());
    for &(id, quantity) in items {
        let product = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| product_not_found(id))?;
        if product.quantity < quantity {
            return Err(RepositoryError::InsufficientStock {
                name: product.name.clone(),
                available: product.quantity,
                requested: quantity,
            });
        }
        product.quantity -= quantity;
        taken.push(product.clone());
    }
    Ok(taken)
}

pub(crate) fn product_not_found(id: u32) -> RepositoryError {
    RepositoryError::NotFound(format!("product with id {id}"))
}
