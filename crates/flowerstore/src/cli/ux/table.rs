use flowerstore_core::product::Product;
use flowerstore_core::ticket::Ticket;

use super::presenter::format_money;

const ID_WIDTH: usize = 5;
const NAME_WIDTH: usize = 15;
const QUANTITY_WIDTH: usize = 10;
const PRICE_WIDTH: usize = 10;
const TYPE_WIDTH: usize = 15;
const ATTRIBUTE_WIDTH: usize = 15;
const TABLE_WIDTH: usize =
    ID_WIDTH + NAME_WIDTH + QUANTITY_WIDTH + PRICE_WIDTH + TYPE_WIDTH + ATTRIBUTE_WIDTH + 5;

/// Fixed width product table, one row per product.
pub fn format_products(products: &[Product]) -> String {
    let mut lines = Vec::with_capacity(products.len() + 2);
    lines.push(format!(
        "{:<ID_WIDTH$} {:<NAME_WIDTH$} {:<QUANTITY_WIDTH$} {:<PRICE_WIDTH$} {:<TYPE_WIDTH$} {:<ATTRIBUTE_WIDTH$}",
        "ID", "Name", "Quantity", "Price", "Type", "Attributes"
    ));
    lines.push("-".repeat(TABLE_WIDTH));
    for product in products {
        lines.push(format!(
            "{:<ID_WIDTH$} {:<NAME_WIDTH$} {:<QUANTITY_WIDTH$} {:<PRICE_WIDTH$.2} {:<TYPE_WIDTH$} {:<ATTRIBUTE_WIDTH$}",
            product.id,
            product.name,
            product.quantity,
            product.price,
            product.product_type().as_str(),
            product.attribute(),
        ));
    }
    lines
        .iter()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Ticket with its lines and total.
pub fn format_ticket(ticket: &Ticket, currency: &str) -> String {
    let mut lines = vec![format!(
        "Ticket #{} {}",
        ticket.id,
        ticket.date.format("%Y-%m-%d %H:%M:%S UTC")
    )];
    lines.push(format!(
        "{:<NAME_WIDTH$} {:<TYPE_WIDTH$} {:<ATTRIBUTE_WIDTH$} {:<QUANTITY_WIDTH$} {:<PRICE_WIDTH$}",
        "Name", "Type", "Features", "Quantity", "Price"
    ));
    for line in &ticket.lines {
        lines.push(format!(
            "{:<NAME_WIDTH$} {:<TYPE_WIDTH$} {:<ATTRIBUTE_WIDTH$} {:<QUANTITY_WIDTH$} {:<PRICE_WIDTH$.2}",
            line.name,
            line.product_type.as_str(),
            line.attribute,
            line.quantity,
            line.price,
        ));
    }
    lines.push(format!("Total: {}", format_money(ticket.total, currency)));
    lines
        .iter()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use flowerstore_core::product::{Material, ProductKind};
    use flowerstore_core::ticket::{NewTicket, TicketLine};

    fn product(id: u32, name: &str, quantity: u32, price: f64, kind: ProductKind) -> Product {
        Product {
            id,
            name: name.to_string(),
            quantity,
            price,
            kind,
        }
    }

    #[test]
    fn test_format_products() {
        let products = vec![
            product(1, "Olivo", 5, 45.0, ProductKind::Tree { height: 1.5 }),
            product(
                9,
                "Maceta",
                25,
                6.5,
                ProductKind::Decoration {
                    material: Material::Plastic,
                },
            ),
        ];

        let table = format_products(&products);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "ID    Name            Quantity   Price      Type            Attributes"
        );
        assert_eq!(lines[1].len(), 75);
        assert_eq!(
            lines[2],
            "1     Olivo           5          45.00      TREE            1.5"
        );
        assert_eq!(
            lines[3],
            "9     Maceta          25         6.50       DECORATION      plastico"
        );
    }

    #[test]
    fn test_format_products_empty_keeps_header() {
        assert_eq!(format_products(&[]).lines().count(), 2);
    }

    #[test]
    fn test_format_ticket() {
        let rose = product(
            3,
            "Rosa",
            10,
            2.5,
            ProductKind::Flower {
                color: "Rojo".to_string(),
            },
        );
        let ticket = Ticket::from_new(
            7,
            NewTicket {
                date: Utc.with_ymd_and_hms(2024, 2, 14, 11, 0, 0).unwrap(),
                lines: vec![TicketLine::from_product(&rose, 4)],
            },
        );

        let text = format_ticket(&ticket, "€");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Ticket #7 2024-02-14 11:00:00 UTC");
        assert_eq!(
            lines[2],
            "Rosa            FLOWER          Rojo            4          2.50"
        );
        assert_eq!(lines[3], "Total: 10.00€");
    }
}
