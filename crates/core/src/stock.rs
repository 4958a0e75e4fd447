//! Opening catalog of the shop.
use tracing::{info, instrument};

use crate::product::{Material, NewProduct, ProductKind};
use crate::repository::{ProductRepository, Result};

pub fn initial_stock() -> Vec<NewProduct> {
    let tree = |name: &str, quantity: u32, price: f64, height: f64| {
        NewProduct::new(name, quantity, price, ProductKind::Tree { height })
    };
    let flower = |name: &str, quantity: u32, price: f64, color: &str| {
        NewProduct::new(
            name,
            quantity,
            price,
            ProductKind::Flower {
                color: color.to_string(),
            },
        )
    };
    let decoration = |name: &str, quantity: u32, price: f64, material: Material| {
        NewProduct::new(name, quantity, price, ProductKind::Decoration { material })
    };

    vec![
        tree("Olivo", 5, 45.0, 1.5),
        tree("Limonero", 8, 32.5, 1.2),
        tree("Bonsai", 3, 60.0, 0.4),
        flower("Rosa", 50, 2.5, "Rojo"),
        flower("Tulipan", 40, 1.8, "Amarillo"),
        flower("Margarita", 60, 1.2, "Blanco"),
        decoration("Jarron", 10, 15.0, Material::Wood),
        decoration("Maceta", 25, 6.5, Material::Plastic),
        decoration("Cesta", 12, 9.9, Material::Wood),
    ]
}

/// Seeds the catalog when it is empty. Returns how many products were inserted.
#[instrument(skip(repository))]
pub async fn load_initial_stock<R>(repository: &R) -> Result<usize>
where
    R: ProductRepository + ?Sized,
{
    if !repository.is_empty().await? {
        return Ok(0);
    }

    let stock = initial_stock();
    let count = stock.len();
    for product in stock {
        repository.add_product(product).await?;
    }
    info!(count, "Loaded initial stock");
    Ok(count)
}
