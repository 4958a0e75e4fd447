use std::collections::BTreeMap;
use std::sync::Arc;

use flowerstore_core::repository::{ProductRepository, RepositoryError, TicketRepository};
use flowerstore_core::ticket::{NewTicket, Ticket, TicketLine};
use tracing::{info, instrument};

use super::{Result, ServiceError};

/// One requested product in a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleItem {
    pub product_id: u32,
    pub quantity: u32,
}

/// Point of sale: sells stock and keeps the ticket history.
#[derive(Clone)]
pub struct Sales {
    products: Arc<dyn ProductRepository>,
    tickets: Arc<dyn TicketRepository>,
}

impl Sales {
    pub fn new(products: Arc<dyn ProductRepository>, tickets: Arc<dyn TicketRepository>) -> Self {
        Self { products, tickets }
    }

    /// Sells every item or nothing. Stock is taken in one atomic step per sale.
    #[instrument(skip(self, items), fields(items = items.len()))]
    pub async fn sell(&self, items: &[SaleItem]) -> Result<Ticket> {
        if items.is_empty() {
            return Err(ServiceError::EmptySale);
        }

        // Merge repeated products, keeping first-seen order for the ticket.
        let mut order = Vec::new();
        let mut requested: BTreeMap<u32, u32> = BTreeMap::new();
        for item in items {
            if item.quantity == 0 {
                return Err(ServiceError::QuantityNotPositive);
            }
            let entry = requested.entry(item.product_id).or_insert_with(|| {
                order.push(item.product_id);
                0
            });
            *entry = entry.saturating_add(item.quantity);
        }

        // Checked up front for the error; the stock take below re-checks atomically.
        for &id in &order {
            let quantity = requested[&id];
            let product = self
                .products
                .get_product(id)
                .await?
                .ok_or(ServiceError::ProductNotFound(id))?;
            if product.quantity < quantity {
                return Err(ServiceError::InsufficientStock {
                    name: product.name,
                    available: product.quantity,
                    requested: quantity,
                });
            }
        }

        let wanted: Vec<(u32, u32)> = order.iter().map(|id| (*id, requested[id])).collect();
        let taken = match self.products.take_stock(&wanted).await {
            Ok(taken) => taken,
            Err(RepositoryError::InsufficientStock {
                name,
                available,
                requested,
            }) => {
                return Err(ServiceError::InsufficientStock {
                    name,
                    available,
                    requested,
                });
            }
            Err(e) => return Err(e.into()),
        };

        let lines = taken
            .iter()
            .zip(&wanted)
            .map(|(product, (_, quantity))| TicketLine::from_product(product, *quantity))
            .collect();
        let ticket = self.tickets.add_ticket(NewTicket::new(lines)).await?;
        info!(
            id = ticket.id,
            units = ticket.units(),
            total = ticket.total,
            "Ticket stored"
        );
        Ok(ticket)
    }

    pub async fn tickets(&self) -> Result<Vec<Ticket>> {
        Ok(self.tickets.all_tickets().await?)
    }

    pub async fn total_sales(&self) -> Result<f64> {
        let tickets = self.tickets.all_tickets().await?;
        Ok(tickets.iter().map(|t| t.total).sum())
    }
}
