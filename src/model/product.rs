use super::fields::{optional_text, positive_id, required_text, Fields};
use super::Record;
use crate::codec::{FlatMap, ObjectWriter, ToFlatJson};
use crate::error::ValidationError;
use crate::store::ProductRow;
use crate::validation::within;
use chrono::NaiveDateTime;
use std::fmt;

pub const MAX_PRICE: f64 = 999_999.99;
const NAME_MAX: usize = 100;
const CATEGORY_MAX: usize = 50;
const LOW_STOCK_BELOW: i32 = 10;

/// Stock classification; exactly one applies to any product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Available,
    LowStock,
    OutOfStock,
}

impl Availability {
    pub fn as_str(self) -> &'static str {
        match self {
            Availability::Available => "available",
            Availability::LowStock => "low",
            Availability::OutOfStock => "out of stock",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    id: Option<i32>,
    name: String,
    description: Option<String>,
    price: f64,
    stock: i32,
    category: Option<String>,
    active: bool,
    registered_at: Option<NaiveDateTime>,
}

impl Product {
    pub fn new(name: &str, price: f64) -> Result<Self, ValidationError> {
        let mut product = Self {
            id: None,
            name: String::new(),
            description: None,
            price: 0.0,
            stock: 0,
            category: None,
            active: true,
            registered_at: None,
        };
        product.set_name(name)?;
        product.set_price(Some(price))?;
        Ok(product)
    }

    /// Build from decoded request fields. A missing or unparsable stock leaves
    /// the default of 0; a missing price is an error.
    pub fn parse_validated(fields: &FlatMap) -> Result<Self, ValidationError> {
        let price = fields
            .parsed("preco")
            .ok_or_else(|| ValidationError::new("preco", "is required"))?;
        let mut product = Self::new(fields.text("nome").unwrap_or_default(), price)?;
        product.set_id(fields.parsed("idProduto"))?;
        product.set_description(fields.text("descricao"));
        product.set_stock(fields.parsed("estoque"))?;
        product.set_category(fields.text("categoria"))?;
        product.set_active(fields.flag("ativo"));
        Ok(product)
    }

    pub fn id(&self) -> Option<i32> {
        self.id
    }

    pub fn set_id(&mut self, id: Option<i32>) -> Result<(), ValidationError> {
        self.id = positive_id("idProduto", id)?;
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) -> Result<(), ValidationError> {
        self.name = required_text("nome", name, NAME_MAX)?;
        Ok(())
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: Option<&str>) {
        self.description = description.map(|d| d.trim().to_string());
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn set_price(&mut self, price: Option<f64>) -> Result<(), ValidationError> {
        let price = price.ok_or_else(|| ValidationError::new("preco", "is required"))?;
        if !within(price, 0.0, MAX_PRICE) {
            return Err(ValidationError::new(
                "preco",
                format!("must be between 0 and {:.2}", MAX_PRICE),
            ));
        }
        self.price = price;
        Ok(())
    }

    pub fn stock(&self) -> i32 {
        self.stock
    }

    /// `None` clamps to 0.
    pub fn set_stock(&mut self, stock: Option<i32>) -> Result<(), ValidationError> {
        let stock = stock.unwrap_or(0);
        if stock < 0 {
            return Err(ValidationError::new("estoque", "must not be negative"));
        }
        self.stock = stock;
        Ok(())
    }

    /// Upper-cased, e.g. "RACAO".
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn set_category(&mut self, category: Option<&str>) -> Result<(), ValidationError> {
        self.category = optional_text("categoria", category, CATEGORY_MAX)?.map(|c| c.to_uppercase());
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// `None` means active.
    pub fn set_active(&mut self, active: Option<bool>) {
        self.active = active.unwrap_or(true);
    }

    pub fn registered_at(&self) -> Option<NaiveDateTime> {
        self.registered_at
    }

    pub fn add_stock(&mut self, quantity: i32) -> Result<(), ValidationError> {
        if quantity <= 0 {
            return Err(ValidationError::new("quantidade", "must be positive"));
        }
        self.stock = self
            .stock
            .checked_add(quantity)
            .ok_or_else(|| ValidationError::new("quantidade", "stock would overflow"))?;
        Ok(())
    }

    pub fn remove_stock(&mut self, quantity: i32) -> Result<(), ValidationError> {
        if quantity <= 0 {
            return Err(ValidationError::new("quantidade", "must be positive"));
        }
        if quantity > self.stock {
            return Err(ValidationError::new(
                "quantidade",
                format!("insufficient stock: available {}, requested {}", self.stock, quantity),
            ));
        }
        self.stock -= quantity;
        Ok(())
    }

    /// Active with stock on hand.
    pub fn is_available(&self) -> bool {
        self.active && self.stock > 0
    }

    pub fn is_low_stock(&self) -> bool {
        self.stock > 0 && self.stock < LOW_STOCK_BELOW
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.stock == 0
    }

    /// First match of available, low, out of stock. An inactive product can
    /// never be available, so with 10 or more units it is out of stock too.
    pub fn availability(&self) -> Availability {
        if self.is_available() {
            Availability::Available
        } else if self.is_low_stock() {
            Availability::LowStock
        } else {
            Availability::OutOfStock
        }
    }
}

impl Record for Product {
    type Row = ProductRow;
    const ENTITY: &'static str = "Product";

    fn id(&self) -> Option<i32> {
        self.id
    }

    fn to_row(&self) -> ProductRow {
        ProductRow {
            id_produto: self.id.unwrap_or_default(),
            nome: Some(self.name.clone()),
            descricao: self.description.clone(),
            preco: Some(self.price),
            estoque: Some(self.stock),
            categoria: self.category.clone(),
            ativo: Some(self.active),
            data_cadastro: self.registered_at,
        }
    }

    fn revive_from_storage(row: ProductRow) -> Self {
        Self {
            id: Some(row.id_produto),
            name: row.nome.unwrap_or_default(),
            description: row.descricao,
            price: row.preco.unwrap_or_default(),
            stock: row.estoque.unwrap_or_default(),
            category: row.categoria,
            active: row.ativo.unwrap_or(true),
            registered_at: row.data_cadastro,
        }
    }
}

impl ToFlatJson for Product {
    fn to_flat_json(&self) -> String {
        ObjectWriter::new()
            .opt_int("idProduto", self.id.map(i64::from))
            .string("nome", &self.name)
            .opt_string("descricao", self.description())
            .float("preco", self.price)
            .int("estoque", i64::from(self.stock))
            .opt_string("categoria", self.category())
            .boolean("ativo", self.active)
            .opt_datetime("dataCadastro", self.registered_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode;

    fn product(stock: i32, active: bool) -> Product {
        let mut p = Product::new("Ração Premium", 89.9).unwrap();
        p.set_stock(Some(stock)).unwrap();
        p.set_active(Some(active));
        p
    }

    #[test]
    fn test_parse_validated_defaults() {
        let p = Product::parse_validated(&decode(r#"{"nome":"Coleira","preco":"19.90","categoria":"acessorios"}"#).unwrap())
            .unwrap();
        assert_eq!(p.price(), 19.9);
        assert_eq!(p.stock(), 0);
        assert_eq!(p.category(), Some("ACESSORIOS"));
        assert!(p.is_active());
    }

    #[test]
    fn test_price_required_and_bounded() {
        let err = Product::parse_validated(&decode(r#"{"nome":"Coleira"}"#).unwrap()).unwrap_err();
        assert_eq!(err.field, "preco");
        let err = Product::parse_validated(&decode(r#"{"nome":"Coleira","preco":"cheap"}"#).unwrap()).unwrap_err();
        assert_eq!(err.field, "preco");
        assert!(Product::new("x", -0.01).is_err());
        assert!(Product::new("x", 1_000_000.0).is_err());
        assert!(Product::new("x", MAX_PRICE).is_ok());
        assert!(Product::new("x", 0.0).is_ok());
    }

    #[test]
    fn test_stock_clamps_when_absent_but_rejects_negative() {
        let mut p = product(3, true);
        p.set_stock(None).unwrap();
        assert_eq!(p.stock(), 0);
        assert!(p.set_stock(Some(-1)).is_err());
        let p = Product::parse_validated(&decode(r#"{"nome":"x","preco":1,"estoque":"lots"}"#).unwrap()).unwrap();
        assert_eq!(p.stock(), 0);
    }

    #[test]
    fn test_remove_stock_boundary() {
        let mut p = product(5, true);
        p.remove_stock(5).unwrap();
        assert_eq!(p.stock(), 0);

        let mut p = product(5, true);
        let err = p.remove_stock(6).unwrap_err();
        assert!(err.reason.contains("available 5, requested 6"), "{}", err.reason);
        assert_eq!(p.stock(), 5);
    }

    #[test]
    fn test_quantities_must_be_positive() {
        let mut p = product(5, true);
        assert!(p.add_stock(0).is_err());
        assert!(p.remove_stock(0).is_err());
        assert!(p.add_stock(-3).is_err());
        p.add_stock(7).unwrap();
        assert_eq!(p.stock(), 12);
        assert!(p.add_stock(i32::MAX).is_err());
    }

    #[test]
    fn test_availability_is_exclusive() {
        for active in [true, false] {
            for stock in [0, 1, 5, 9, 10, 11, 500] {
                let p = product(stock, active);
                let class = p.availability();
                let expected = if stock == 0 {
                    Availability::OutOfStock
                } else if active {
                    Availability::Available
                } else if stock < 10 {
                    Availability::LowStock
                } else {
                    Availability::OutOfStock
                };
                assert_eq!(class, expected, "active={active} stock={stock}");
            }
        }
        assert_eq!(product(0, true).availability(), Availability::OutOfStock);
        assert_eq!(product(0, false).availability(), Availability::OutOfStock);
    }

    #[test]
    fn test_round_trip() {
        let mut p = product(42, false);
        p.set_id(Some(9)).unwrap();
        p.set_description(Some("15kg, adult dogs"));
        p.set_category(Some("racao")).unwrap();
        let back = Product::parse_validated(&decode(&p.to_flat_json()).unwrap()).unwrap();
        assert_eq!(back, p);
    }
}
