//! Volatile backend. Data lives as long as the store.
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::{
    ProductRepository, Result, TicketRepository, next_id, product_not_found, sort_products,
    take_from,
};
use crate::product::{NewProduct, Product};
use crate::ticket::{NewTicket, Ticket};

#[derive(Debug, Default)]
pub struct MemoryStore {
    products: RwLock<Vec<Product>>,
    tickets: RwLock<Vec<Ticket>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn get_product(&self, id: u32) -> Result<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.iter().find(|p| p.id == id).cloned())
    }

    async fn all_products(&self) -> Result<Vec<Product>> {
        let mut products = self.products.read().await.clone();
        sort_products(&mut products);
        Ok(products)
    }

    async fn last_product(&self) -> Result<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.iter().max_by_key(|p| p.id).cloned())
    }

    async fn add_product(&self, product: NewProduct) -> Result<Product> {
        product.validate()?;
        let mut products = self.products.write().await;
        let id = next_id(products.iter().map(|p| p.id).max());
        let product = Product::from_new(id, product);
        debug!(id, name = %product.name, "Adding product");
        products.push(product.clone());
        Ok(product)
    }

    async fn update_product(&self, product: &Product) -> Result<()> {
        let mut products = self.products.write().await;
        let stored = products
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or_else(|| product_not_found(product.id))?;
        stored.quantity = product.quantity;
        stored.price = product.price;
        Ok(())
    }

    async fn take_stock(&self, items: &[(u32, u32)]) -> Result<Vec<Product>> {
        let mut products = self.products.write().await;
        let mut updated = products.clone();
        let taken = take_from(&mut updated, items)?;
        *products = updated;
        Ok(taken)
    }

    async fn delete_product(&self, id: u32) -> Result<()> {
        let mut products = self.products.write().await;
        let position = products
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| product_not_found(id))?;
        products.remove(position);
        Ok(())
    }
}

#[async_trait]
impl TicketRepository for MemoryStore {
    async fn add_ticket(&self, ticket: NewTicket) -> Result<Ticket> {
        let mut tickets = self.tickets.write().await;
        let id = next_id(tickets.iter().map(|t| t.id).max());
        let ticket = Ticket::from_new(id, ticket);
        tickets.push(ticket.clone());
        Ok(ticket)
    }

    async fn last_ticket(&self) -> Result<Option<Ticket>> {
        let tickets = self.tickets.read().await;
        Ok(tickets.iter().max_by_key(|t| t.id).cloned())
    }

    async fn all_tickets(&self) -> Result<Vec<Ticket>> {
        let mut tickets = self.tickets.read().await.clone();
        tickets.sort_by_key(|t| t.id);
        Ok(tickets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::{Material, ProductType};
    use crate::repository::RepositoryError;
    use crate::test_utils::{decoration, flower, tree};
    use crate::ticket::TicketLine;

    #[tokio::test]
    async fn test_add_product_assigns_sequential_ids() {
        let store = MemoryStore::new();
        assert!(store.is_empty().await.unwrap());

        let first = store.add_product(tree("Olivo", 2, 40.0, 1.5)).await.unwrap();
        let second = store.add_product(flower("Rosa", 20, 1.5, "red")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert!(!store.is_empty().await.unwrap());
        assert_eq!(store.last_product().await.unwrap().unwrap().id, 2);
    }

    #[tokio::test]
    async fn test_add_product_rejects_invalid() {
        let store = MemoryStore::new();
        let err = store.add_product(flower("", 1, 1.0, "red")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidProduct(_)));
        assert!(store.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_ids_continue_after_delete_of_last() {
        let store = MemoryStore::new();
        store.add_product(tree("Olivo", 2, 40.0, 1.5)).await.unwrap();
        store.add_product(tree("Pino", 2, 30.0, 2.0)).await.unwrap();
        store.delete_product(2).await.unwrap();

        let again = store.add_product(tree("Abeto", 1, 35.0, 1.8)).await.unwrap();
        assert_eq!(again.id, 2);
    }

    #[tokio::test]
    async fn test_products_of_type_keeps_order() {
        let store = MemoryStore::new();
        store.add_product(flower("Rosa", 1, 1.0, "red")).await.unwrap();
        store
            .add_product(decoration("Jarron", 1, 8.0, Material::Wood))
            .await
            .unwrap();
        store.add_product(flower("Lirio", 1, 1.0, "white")).await.unwrap();

        let flowers = store.products_of_type(ProductType::Flower).await.unwrap();
        let names: Vec<_> = flowers.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Rosa", "Lirio"]);
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_product() {
        let store = MemoryStore::new();
        let mut product = store.add_product(tree("Olivo", 2, 40.0, 1.5)).await.unwrap();
        product.quantity = 9;
        product.price = 42.0;
        store.update_product(&product).await.unwrap();

        let stored = store.get_product(1).await.unwrap().unwrap();
        assert_eq!(stored.quantity, 9);
        assert_eq!(stored.price, 42.0);

        product.id = 99;
        assert!(matches!(
            store.update_product(&product).await,
            Err(RepositoryError::NotFound(_))
        ));
        assert!(matches!(
            store.delete_product(99).await,
            Err(RepositoryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_tickets_get_sequential_ids() {
        let store = MemoryStore::new();
        assert!(store.last_ticket().await.unwrap().is_none());

        let product = Product::from_new(1, flower("Rosa", 10, 2.0, "red"));
        let first = store
            .add_ticket(NewTicket::new(vec![TicketLine::from_product(&product, 3)]))
            .await
            .unwrap();
        let second = store.add_ticket(NewTicket::new(vec![])).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(first.total, 6.0);
        assert_eq!(second.id, 2);
        assert_eq!(store.last_ticket().await.unwrap().unwrap().id, 2);
        assert_eq!(store.all_tickets().await.unwrap().len(), 2);
    }
}
