//! Sales tickets.
use chrono::{DateTime, Utc};

use crate::product::{Product, ProductType};

/// A sold product, frozen at sale time.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketLine {
    pub name: String,
    pub product_type: ProductType,
    pub attribute: String,
    pub quantity: u32,
    pub price: f64,
}

impl TicketLine {
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            name: product.name.clone(),
            product_type: product.product_type(),
            attribute: product.attribute(),
            quantity,
            price: product.price,
        }
    }

    pub fn subtotal(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ticket {
    pub id: u32,
    pub date: DateTime<Utc>,
    pub lines: Vec<TicketLine>,
    pub total: f64,
}

impl Ticket {
    pub fn from_new(id: u32, ticket: NewTicket) -> Self {
        let total = ticket.total();
        Self {
            id,
            date: ticket.date,
            lines: ticket.lines,
            total,
        }
    }

    pub fn units(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

/// A ticket waiting for its id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTicket {
    pub date: DateTime<Utc>,
    pub lines: Vec<TicketLine>,
}

impl NewTicket {
    pub fn new(lines: Vec<TicketLine>) -> Self {
        Self {
            date: Utc::now(),
            lines,
        }
    }

    pub fn total(&self) -> f64 {
        self.lines.iter().map(TicketLine::subtotal).sum()
    }
}
