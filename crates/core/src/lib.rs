mod assets;

pub mod config;
pub mod product;
pub mod repository;
pub mod stock;
pub mod ticket;

#[cfg(test)]
mod test_utils;

pub use crate::assets::{get_config_dir, get_data_dir};
