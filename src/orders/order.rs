use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: Decimal,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(OrderStatus::Pending),
            "processing" => Some(OrderStatus::Processing),
            "shipped" => Some(OrderStatus::Shipped),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub buyer: String,
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderInput {
    pub buyer: String,
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub status: OrderStatus,
}

impl OrderInput {
    pub fn validate(&self) -> Result<(), HashMap<String, String>> {
        let mut errors = HashMap::new();
        if self.buyer.trim().is_empty() {
            errors.insert("buyer".to_string(), "buyer must not be empty".to_string());
        }
        if self.items.is_empty() {
            errors.insert("items".to_string(), "order must contain at least one item".to_string());
        }
        validate_items(&self.items, &mut errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Fully validated record handed to the store for insertion.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub buyer: String,
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderPatch {
    pub buyer: Option<String>,
    pub items: Option<Vec<OrderItem>>,
    pub status: Option<OrderStatus>,
}

impl OrderPatch {
    pub fn validate(&self) -> Result<(), HashMap<String, String>> {
        let mut errors = HashMap::new();
        if self.buyer.as_deref().is_some_and(|b| b.trim().is_empty()) {
            errors.insert("buyer".to_string(), "buyer must not be empty".to_string());
        }
        if let Some(items) = &self.items {
            if items.is_empty() {
                errors.insert("items".to_string(), "order must contain at least one item".to_string());
            }
            validate_items(items, &mut errors);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn validate_items(items: &[OrderItem], errors: &mut HashMap<String, String>) {
    for (index, item) in items.iter().enumerate() {
        if item.quantity <= 0 {
            errors.insert(
                format!("items[{index}].quantity"),
                "quantity must be positive".to_string(),
            );
        }
        if item.price < Decimal::ZERO {
            errors.insert(
                format!("items[{index}].price"),
                "price must not be negative".to_string(),
            );
        }
    }
}
