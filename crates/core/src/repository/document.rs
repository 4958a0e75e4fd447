//! Document backend. Each collection is a JSON array of documents in its own file:
//! `products.json` and `tickets.json` inside the store directory.
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use super::{
    ProductRepository, RepositoryError, Result, TicketRepository, next_id, product_not_found,
    sort_products, take_from,
};
use crate::product::{NewProduct, Product, ProductKind, ProductType};
use crate::ticket::{NewTicket, Ticket, TicketLine};

const PRODUCTS_FILE_NAME: &str = "products.json";
const TICKETS_FILE_NAME: &str = "tickets.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct ProductDocument {
    #[serde(rename = "productId")]
    product_id: u32,
    name: String,
    quantity: u32,
    price: f64,
    #[serde(rename = "type")]
    product_type: String,
    /// Height as a number for trees, text otherwise.
    attribute: Value,
}

impl From<&Product> for ProductDocument {
    fn from(product: &Product) -> Self {
        let attribute = match &product.kind {
            ProductKind::Tree { height } => Value::from(*height),
            other => Value::String(other.attribute()),
        };
        Self {
            product_id: product.id,
            name: product.name.clone(),
            quantity: product.quantity,
            price: product.price,
            product_type: product.product_type().to_string(),
            attribute,
        }
    }
}

impl TryFrom<ProductDocument> for Product {
    type Error = RepositoryError;

    fn try_from(doc: ProductDocument) -> Result<Self> {
        let product_type: ProductType = doc
            .product_type
            .parse()
            .map_err(|_| RepositoryError::Corrupted(format!("product type '{}'", doc.product_type)))?;
        let attribute = match &doc.attribute {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let kind = ProductKind::from_attribute(product_type, &attribute)
            .map_err(|e| RepositoryError::Corrupted(e.to_string()))?;
        Ok(Product {
            id: doc.product_id,
            name: doc.name,
            quantity: doc.quantity,
            price: doc.price,
            kind,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct TicketLineDocument {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Type")]
    product_type: String,
    #[serde(rename = "Features")]
    features: String,
    #[serde(rename = "Quantity")]
    quantity: u32,
    #[serde(rename = "Price")]
    price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct TicketDocument {
    #[serde(rename = "ticketID")]
    ticket_id: u32,
    date: DateTime<Utc>,
    products: Vec<TicketLineDocument>,
    #[serde(rename = "totalPrice")]
    total_price: f64,
}

impl From<&Ticket> for TicketDocument {
    fn from(ticket: &Ticket) -> Self {
        Self {
            ticket_id: ticket.id,
            date: ticket.date,
            products: ticket
                .lines
                .iter()
                .map(|line| TicketLineDocument {
                    name: line.name.clone(),
                    product_type: line.product_type.to_string(),
                    features: line.attribute.clone(),
                    quantity: line.quantity,
                    price: line.price,
                })
                .collect(),
            total_price: ticket.total,
        }
    }
}

impl TryFrom<TicketDocument> for Ticket {
    type Error = RepositoryError;

    fn try_from(doc: TicketDocument) -> Result<Self> {
        let lines = doc
            .products
            .into_iter()
            .map(|line| {
                let product_type = line.product_type.parse().map_err(|_| {
                    RepositoryError::Corrupted(format!(
                        "Invalid product type : {}",
                        line.product_type
                    ))
                })?;
                Ok(TicketLine {
                    name: line.name,
                    product_type,
                    attribute: line.features,
                    quantity: line.quantity,
                    price: line.price,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Ticket {
            id: doc.ticket_id,
            date: doc.date,
            lines,
            total: doc.total_price,
        })
    }
}

/// A JSON file holding an array of documents.
#[derive(Debug)]
struct Collection {
    path: PathBuf,
    lock: Mutex<()>,
}

impl Collection {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    async fn load<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Replaces the file contents; readers never observe a partial write.
    async fn save<T: Serialize>(&self, documents: &[T]) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(documents)?;
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, bytes).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}

#[derive(Debug)]
pub struct DocumentStore {
    directory: PathBuf,
    products: Collection,
    tickets: Collection,
}

impl DocumentStore {
    /// Opens the store in `directory`, creating it if missing.
    #[instrument(skip(directory))]
    pub async fn open(directory: impl Into<PathBuf>) -> Result<Self> {
        let directory = directory.into();
        tokio::fs::create_dir_all(&directory).await?;
        debug!(directory = %directory.display(), "Opened document store");
        Ok(Self {
            products: Collection::new(directory.join(PRODUCTS_FILE_NAME)),
            tickets: Collection::new(directory.join(TICKETS_FILE_NAME)),
            directory,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    async fn load_products(&self) -> Result<Vec<Product>> {
        let documents: Vec<ProductDocument> = self.products.load().await?;
        documents.into_iter().map(Product::try_from).collect()
    }

    async fn save_products(&self, products: &[Product]) -> Result<()> {
        let documents: Vec<ProductDocument> = products.iter().map(ProductDocument::from).collect();
        self.products.save(&documents).await
    }

    async fn load_tickets(&self) -> Result<Vec<Ticket>> {
        let documents: Vec<TicketDocument> = self.tickets.load().await?;
        documents.into_iter().map(Ticket::try_from).collect()
    }
}

#[async_trait]
impl ProductRepository for DocumentStore {
    async fn get_product(&self, id: u32) -> Result<Option<Product>> {
        let _guard = self.products.lock.lock().await;
        Ok(self.load_products().await?.into_iter().find(|p| p.id == id))
    }

    async fn all_products(&self) -> Result<Vec<Product>> {
        let _guard = self.products.lock.lock().await;
        let mut products = self.load_products().await?;
        sort_products(&mut products);
        Ok(products)
    }

    async fn last_product(&self) -> Result<Option<Product>> {
        let _guard = self.products.lock.lock().await;
        Ok(self.load_products().await?.into_iter().max_by_key(|p| p.id))
    }

    #[instrument(skip(self, product), fields(name = %product.name))]
    async fn add_product(&self, product: NewProduct) -> Result<Product> {
        product.validate()?;
        let _guard = self.products.lock.lock().await;
        let mut products = self.load_products().await?;
        let id = next_id(products.iter().map(|p| p.id).max());
        let product = Product::from_new(id, product);
        products.push(product.clone());
        self.save_products(&products).await?;
        debug!(id, "Product stored");
        Ok(product)
    }

    async fn update_product(&self, product: &Product) -> Result<()> {
        let _guard = self.products.lock.lock().await;
        let mut products = self.load_products().await?;
        let stored = products
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or_else(|| product_not_found(product.id))?;
        stored.quantity = product.quantity;
        stored.price = product.price;
        self.save_products(&products).await
    }

    async fn take_stock(&self, items: &[(u32, u32)]) -> Result<Vec<Product>> {
        let _guard = self.products.lock.lock().await;
        let mut products = self.load_products().await?;
        let taken = take_from(&mut products, items)?;
        self.save_products(&products).await?;
        Ok(taken)
    }

    async fn delete_product(&self, id: u32) -> Result<()> {
        let _guard = self.products.lock.lock().await;
        let mut products = self.load_products().await?;
        let before = products.len();
        products.retain(|p| p.id != id);
        if products.len() == before {
            return Err(product_not_found(id));
        }
        self.save_products(&products).await
    }
}

#[async_trait]
impl TicketRepository for DocumentStore {
    async fn add_ticket(&self, ticket: NewTicket) -> Result<Ticket> {
        let _guard = self.tickets.lock.lock().await;
        let mut documents: Vec<TicketDocument> = self.tickets.load().await?;
        let id = next_id(documents.iter().map(|d| d.ticket_id).max());
        let ticket = Ticket::from_new(id, ticket);
        documents.push(TicketDocument::from(&ticket));
        self.tickets.save(&documents).await?;
        debug!(id, total = ticket.total, "Ticket stored");
        Ok(ticket)
    }

    async fn last_ticket(&self) -> Result<Option<Ticket>> {
        let _guard = self.tickets.lock.lock().await;
        Ok(self.load_tickets().await?.into_iter().max_by_key(|t| t.id))
    }

    async fn all_tickets(&self) -> Result<Vec<Ticket>> {
        let _guard = self.tickets.lock.lock().await;
        let mut tickets = self.load_tickets().await?;
        tickets.sort_by_key(|t| t.id);
        Ok(tickets)
    }
}
