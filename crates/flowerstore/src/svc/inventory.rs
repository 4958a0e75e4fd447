use std::sync::Arc;

use flowerstore_core::product::{NewProduct, Product, ProductType};
use flowerstore_core::repository::ProductRepository;
use tracing::{info, instrument};

use super::{Result, ServiceError};

/// Units and value held for one product type.
#[derive(Debug, Clone, PartialEq)]
pub struct StockSummary {
    pub product_type: ProductType,
    pub products: Vec<Product>,
    pub units: u64,
    pub value: f64,
}

/// Catalog management for the shop.
#[derive(Clone)]
pub struct Inventory {
    products: Arc<dyn ProductRepository>,
}

impl Inventory {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    /// Products of one type, or the whole catalog.
    pub async fn list(&self, product_type: Option<ProductType>) -> Result<Vec<Product>> {
        let products = match product_type {
            Some(t) => self.products.products_of_type(t).await?,
            None => self.products.all_products().await?,
        };
        Ok(products)
    }

    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn add(&self, product: NewProduct) -> Result<Product> {
        let product = self.products.add_product(product).await?;
        info!(id = product.id, "Product added");
        Ok(product)
    }

    /// Resolves an id picked from the listing of `product_type`.
    pub async fn select(&self, product_type: ProductType, id: u32) -> Result<Product> {
        let product = self
            .products
            .get_product(id)
            .await?
            .filter(|p| p.product_type() == product_type)
            .ok_or(ServiceError::InvalidSelection(id))?;
        Ok(product)
    }

    /// Sets the stock and price of a product.
    #[instrument(skip(self))]
    pub async fn update_stock(&self, id: u32, quantity: i64, price: f64) -> Result<Product> {
        if quantity <= 0 {
            return Err(ServiceError::QuantityNotPositive);
        }
        if !price.is_finite() || price < 0.0 {
            return Err(ServiceError::InvalidPrice(price));
        }
        let quantity = u32::try_from(quantity).map_err(|_| ServiceError::QuantityNotPositive)?;

        let mut product = self
            .products
            .get_product(id)
            .await?
            .ok_or(ServiceError::ProductNotFound(id))?;
        product.quantity = quantity;
        product.price = price;
        self.products.update_product(&product).await?;
        info!(name = %product.name, "Stock updated");
        Ok(product)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: u32) -> Result<Product> {
        let product = self
            .products
            .get_product(id)
            .await?
            .ok_or(ServiceError::ProductNotFound(id))?;
        self.products.delete_product(id).await?;
        info!(name = %product.name, "Product deleted");
        Ok(product)
    }

    /// Value of everything in the shop.
    pub async fn total_value(&self) -> Result<f64> {
        let products = self.products.all_products().await?;
        Ok(products.iter().map(Product::stock_value).sum())
    }

    pub async fn stock_value(&self, product_type: ProductType) -> Result<StockSummary> {
        let products = self.products.products_of_type(product_type).await?;
        let units = products.iter().map(|p| u64::from(p.quantity)).sum();
        let value = products.iter().map(Product::stock_value).sum();
        Ok(StockSummary {
            product_type,
            products,
            units,
            value,
        })
    }
}
