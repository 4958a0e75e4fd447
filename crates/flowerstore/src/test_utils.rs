//! Test helpers for the flowerstore binary crate.
use std::sync::Arc;

use flowerstore_core::product::{Material, NewProduct, ProductKind};
use flowerstore_core::repository::memory::MemoryStore;

use crate::svc::inventory::Inventory;
use crate::svc::sales::Sales;

pub fn tree(name: &str, quantity: u32, price: f64) -> NewProduct {
    NewProduct::new(name, quantity, price, ProductKind::Tree { height: 1.5 })
}

pub fn flower(name: &str, quantity: u32, price: f64) -> NewProduct {
    let color = "Rojo".to_string();
    NewProduct::new(name, quantity, price, ProductKind::Flower { color })
}

pub fn decoration(name: &str, quantity: u32, price: f64) -> NewProduct {
    let material = Material::Wood;
    NewProduct::new(name, quantity, price, ProductKind::Decoration { material })
}

/// Services sharing one in-memory store.
pub fn memory_services() -> (Inventory, Sales) {
    let store = Arc::new(MemoryStore::new());
    (Inventory::new(store.clone()), Sales::new(store.clone(), store))
}

/// Services over a small catalog: one tree, two flowers and one decoration.
pub async fn seeded_inventory() -> (Inventory, Sales) {
    let (inventory, sales) = memory_services();
    for product in [
        decoration("Jarron", 4, 12.5),
        tree("Olivo", 2, 40.0),
        flower("Rosa", 10, 2.0),
        flower("Tulipan", 20, 1.5),
    ] {
        inventory
            .add(product)
            .await
            .expect("Failed to add test product");
    }
    (inventory, sales)
}
