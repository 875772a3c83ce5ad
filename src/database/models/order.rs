use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::{OrderStatus, PaymentMethod};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub delivery_zone_id: Option<Uuid>,
    pub delivery_zone_name: String,
    pub delivery_address: String,
    pub notes: Option<String>,
    pub payment_method: PaymentMethod,
    pub subtotal: i64,
    pub delivery_fee: i64,
    pub total: i64,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn item_count(&self) -> i32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub size: Option<String>,
    pub color: Option<String>,
    pub unit_price: i64,
    pub quantity: i32,
    pub line_total: i64,
}

/// Checkout payload sent by the storefront.
///
/// Prices are deliberately absent: totals are always recomputed from the
/// catalogue.
#[derive(Debug, Clone, Deserialize)]
pub struct NewOrderRequest {
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: String,
    pub customer_email: Option<String>,
    /// Zone id or zone name.
    #[serde(default)]
    pub delivery_zone: String,
    #[serde(default)]
    pub delivery_address: String,
    pub notes: Option<String>,
    pub payment_method: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderLineRequest>,
    pub subscribe_newsletter: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderLineRequest {
    pub product_id: Uuid,
    pub quantity: i32,
    pub size: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub phone: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl OrderFilter {
    pub const DEFAULT_LIMIT: i64 = 50;
    pub const MAX_LIMIT: i64 = 500;

    pub fn effective_limit(&self) -> i64 {
        self.limit.unwrap_or(Self::DEFAULT_LIMIT).clamp(1, Self::MAX_LIMIT)
    }

    pub fn effective_offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    pub fn matches(&self, order: &Order) -> bool {
        if let Some(status) = self.status {
            if order.status != status {
                return false;
            }
        }
        if let Some(phone) = &self.phone {
            if &order.customer_phone != phone {
                return false;
            }
        }
        true
    }
}
