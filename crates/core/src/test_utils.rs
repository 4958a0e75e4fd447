//! Test utilities for flowerstore-core
#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::Builder;

use crate::product::{Material, NewProduct, ProductKind};

/// Serializes tests that modify the process environment.
pub static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Creates a temporary config file with the given content.
///
/// # Panics
/// Panics if temp directory creation or file writing fails.
pub fn create_temp_config(content: &str) -> PathBuf {
    let temp_dir = Builder::new()
        .prefix("flowerstore-test")
        .rand_bytes(8)
        .tempdir()
        .unwrap();
    let config_path = temp_dir.path().join("flowerstore.yml");
    File::create(&config_path)
        .unwrap()
        .write_all(content.as_bytes())
        .unwrap();
    // Keep the temp directory alive by leaking it (this is just for tests)
    let _ = Box::leak(Box::new(temp_dir));
    config_path
}

pub fn tree(name: &str, quantity: u32, price: f64, height: f64) -> NewProduct {
    NewProduct::new(name, quantity, price, ProductKind::Tree { height })
}

pub fn flower(name: &str, quantity: u32, price: f64, color: &str) -> NewProduct {
    NewProduct::new(
        name,
        quantity,
        price,
        ProductKind::Flower {
            color: color.to_string(),
        },
    )
}

pub fn decoration(name: &str, quantity: u32, price: f64, material: Material) -> NewProduct {
    NewProduct::new(name, quantity, price, ProductKind::Decoration { material })
}
