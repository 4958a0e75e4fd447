//! Products sold by the shop: trees, flowers and decorations.
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProductError {
    #[error("Product name must not be empty")]
    EmptyName,
    #[error("Invalid price: {0}")]
    InvalidPrice(f64),
    #[error("Invalid tree height: {0}")]
    InvalidHeight(f64),
    #[error("Flower color must not be empty")]
    EmptyColor,
    #[error("Invalid material '{0}', only \"madera\" or \"plastico\" are allowed")]
    InvalidMaterial(String),
    #[error("Invalid product type: {0}")]
    InvalidType(String),
    #[error("Invalid attribute '{attribute}' for product type {product_type}")]
    InvalidAttribute {
        product_type: ProductType,
        attribute: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductType {
    Tree,
    Flower,
    Decoration,
}

impl ProductType {
    pub const ALL: [ProductType; 3] = [
        ProductType::Tree,
        ProductType::Flower,
        ProductType::Decoration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Tree => "TREE",
            ProductType::Flower => "FLOWER",
            ProductType::Decoration => "DECORATION",
        }
    }

    /// Menu position, 1-based: tree, flower, decoration.
    pub fn from_menu_option(option: u32) -> Option<ProductType> {
        match option {
            1 => Some(ProductType::Tree),
            2 => Some(ProductType::Flower),
            3 => Some(ProductType::Decoration),
            _ => None,
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductType {
    type Err = ProductError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TREE" => Ok(ProductType::Tree),
            "FLOWER" => Ok(ProductType::Flower),
            "DECORATION" => Ok(ProductType::Decoration),
            _ => Err(ProductError::InvalidType(s.to_string())),
        }
    }
}

/// Decoration materials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Material {
    Wood,
    Plastic,
}

impl Material {
    pub fn as_str(&self) -> &'static str {
        match self {
            Material::Wood => "madera",
            Material::Plastic => "plastico",
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Material {
    type Err = ProductError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("madera") {
            Ok(Material::Wood)
        } else if trimmed.eq_ignore_ascii_case("plastico") {
            Ok(Material::Plastic)
        } else {
            Err(ProductError::InvalidMaterial(s.to_string()))
        }
    }
}

/// The attribute that differs between product types.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductKind {
    Tree { height: f64 },
    Flower { color: String },
    Decoration { material: Material },
}

impl ProductKind {
    pub fn product_type(&self) -> ProductType {
        match self {
            ProductKind::Tree { .. } => ProductType::Tree,
            ProductKind::Flower { .. } => ProductType::Flower,
            ProductKind::Decoration { .. } => ProductType::Decoration,
        }
    }

    /// Attribute as stored in tickets and databases.
    pub fn attribute(&self) -> String {
        match self {
            ProductKind::Tree { height } => height.to_string(),
            ProductKind::Flower { color } => color.clone(),
            ProductKind::Decoration { material } => material.to_string(),
        }
    }

    /// Rebuilds a kind from its type and stored attribute text.
    pub fn from_attribute(product_type: ProductType, attribute: &str) -> Result<Self, ProductError> {
        match product_type {
            ProductType::Tree => attribute
                .trim()
                .parse::<f64>()
                .map(|height| ProductKind::Tree { height })
                .map_err(|_| ProductError::InvalidAttribute {
                    product_type,
                    attribute: attribute.to_string(),
                }),
            ProductType::Flower => Ok(ProductKind::Flower {
                color: attribute.to_string(),
            }),
            ProductType::Decoration => Ok(ProductKind::Decoration {
                material: attribute.parse()?,
            }),
        }
    }

    fn validate(&self) -> Result<(), ProductError> {
        match self {
            ProductKind::Tree { height } if !height.is_finite() || *height <= 0.0 => {
                Err(ProductError::InvalidHeight(*height))
            }
            ProductKind::Flower { color } if color.trim().is_empty() => {
                Err(ProductError::EmptyColor)
            }
            _ => Ok(()),
        }
    }
}

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: u32,
    pub name: String,
    pub quantity: u32,
    pub price: f64,
    pub kind: ProductKind,
}

impl Product {
    pub fn from_new(id: u32, product: NewProduct) -> Self {
        Self {
            id,
            name: product.name,
            quantity: product.quantity,
            price: product.price,
            kind: product.kind,
        }
    }

    pub fn product_type(&self) -> ProductType {
        self.kind.product_type()
    }

    pub fn attribute(&self) -> String {
        self.kind.attribute()
    }

    pub fn stock_value(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {}, Name: {}, Quantity: {}, Price: {:.2}, Type: {}",
            self.id,
            self.name,
            self.quantity,
            self.price,
            self.product_type()
        )?;
        match &self.kind {
            ProductKind::Tree { height } => write!(f, ", Height: {height}"),
            ProductKind::Flower { color } => write!(f, ", Color: {color}"),
            ProductKind::Decoration { material } => write!(f, ", Material: {material}"),
        }
    }
}

/// A product that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub quantity: u32,
    pub price: f64,
    pub kind: ProductKind,
}

impl NewProduct {
    pub fn new(name: &str, quantity: u32, price: f64, kind: ProductKind) -> Self {
        Self {
            name: name.to_string(),
            quantity,
            price,
            kind,
        }
    }

    pub fn validate(&self) -> Result<(), ProductError> {
        if self.name.trim().is_empty() {
            return Err(ProductError::EmptyName);
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(ProductError::InvalidPrice(self.price));
        }
        self.kind.validate()
    }
}
