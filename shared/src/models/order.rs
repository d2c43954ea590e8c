//! Order Model

use super::address::Address;
use super::id::{ItemId, OrderId, UserId};
use super::package::ShippingBox;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order status as reported by HQ
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    AwaitingShipment,
    Shipped,
    Completed,
    Cancelled,
    #[serde(other)]
    Other,
}

/// Order item (read-only for the lifetime of the screen)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub id: ItemId,
    pub name: String,
    pub quantity: u32,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Order as fetched from HQ
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default)]
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub ship_to: Option<Address>,
    /// Carrier chosen at checkout (or last updated from the station)
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
    /// User currently holding the order lock
    #[serde(default)]
    pub locked_by: Option<UserId>,
    /// Estimated parcel weight in pounds
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub estimated_weight: Option<Decimal>,
    /// Boxes available for this order
    #[serde(default)]
    pub boxes: Vec<ShippingBox>,
}

impl Order {
    /// Total unit count across all lines
    pub fn unit_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn item(&self, id: &ItemId) -> Option<&OrderItem> {
        self.items.iter().find(|i| &i.id == id)
    }

    /// Human-facing reference (order number when present)
    pub fn reference(&self) -> &str {
        self.order_number.as_deref().unwrap_or(self.id.as_str())
    }
}
