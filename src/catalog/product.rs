use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Category reference, populated from the categories table on reads.
/// Category lifecycle itself is managed elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub price: Decimal,
    pub category: Category,
    pub description: String,
    pub quantity: i32,
    pub sold: i32,
    pub shipping: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated create payload. Slug and hosted image URL are attached by the
/// lifecycle service, never supplied by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub title: String,
    pub price: Decimal,
    pub category: Uuid,
    #[serde(default)]
    pub description: String,
    pub quantity: i32,
    pub sold: Option<i32>,
    pub shipping: Option<bool>,
}

impl ProductInput {
    pub fn validate(&self) -> Result<(), HashMap<String, String>> {
        let mut errors = HashMap::new();
        if self.title.trim().is_empty() {
            errors.insert("title".to_string(), "title must not be empty".to_string());
        }
        if self.price < Decimal::ZERO {
            errors.insert("price".to_string(), "price must not be negative".to_string());
        }
        if self.quantity < 0 {
            errors.insert("quantity".to_string(), "quantity must not be negative".to_string());
        }
        if self.sold.is_some_and(|sold| sold < 0) {
            errors.insert("sold".to_string(), "sold must not be negative".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Fully resolved record handed to the store for insertion.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub title: String,
    pub slug: String,
    pub price: Decimal,
    pub category_id: Uuid,
    pub description: String,
    pub quantity: i32,
    pub sold: i32,
    pub shipping: bool,
    pub image: Option<String>,
}

/// Partial update payload. Absent fields are left untouched by the store.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPatch {
    pub title: Option<String>,
    #[serde(skip)]
    pub slug: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<Uuid>,
    pub description: Option<String>,
    pub quantity: Option<i32>,
    pub sold: Option<i32>,
    pub shipping: Option<bool>,
    #[serde(skip)]
    pub image: Option<String>,
}

impl ProductPatch {
    pub fn validate(&self) -> Result<(), HashMap<String, String>> {
        let mut errors = HashMap::new();
        if self.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            errors.insert("title".to_string(), "title must not be empty".to_string());
        }
        if self.price.is_some_and(|p| p < Decimal::ZERO) {
            errors.insert("price".to_string(), "price must not be negative".to_string());
        }
        if self.quantity.is_some_and(|q| q < 0) {
            errors.insert("quantity".to_string(), "quantity must not be negative".to_string());
        }
        if self.sold.is_some_and(|s| s < 0) {
            errors.insert("sold".to_string(), "sold must not be negative".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> ProductInput {
        ProductInput {
            title: "Red Shoes".to_string(),
            price: Decimal::from(2500),
            category: Uuid::new_v4(),
            description: String::new(),
            quantity: 10,
            sold: None,
            shipping: None,
        }
    }

    #[test]
    fn valid_input_passes() {
        assert!(input().validate().is_ok());
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut bad = input();
        bad.title = "   ".to_string();
        let errors = bad.validate().unwrap_err();
        assert!(errors.contains_key("title"));
    }

    #[test]
    fn negative_price_and_quantity_are_rejected() {
        let mut bad = input();
        bad.price = Decimal::from(-1);
        bad.quantity = -3;
        let errors = bad.validate().unwrap_err();
        assert!(errors.contains_key("price"));
        assert!(errors.contains_key("quantity"));
    }

    #[test]
    fn empty_patch_is_valid() {
        assert!(ProductPatch::default().validate().is_ok());
    }
}
