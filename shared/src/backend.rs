//! Capabilities the pack station consumes
//!
//! The screen controller only sees these traits; `hq-client` and
//! `pack-printer` provide the network and spooler implementations, tests
//! provide in-memory ones.

use crate::error::AppResult;
use crate::models::{
    Address, Label, LabelPurchase, MethodSelection, Order, OrderId, PrinterInfo, RateQuery,
    Shipment, ShipmentId, ShippingRate, UserId,
};
use async_trait::async_trait;

/// One method per HQ operation
///
/// Failures come back as [`AppError`](crate::error::AppError) carrying the
/// message HQ sent, ready to be shown in the matching screen region.
#[async_trait]
pub trait OrderBackend: Send + Sync {
    async fn fetch_order(&self, order_id: &OrderId) -> AppResult<Order>;

    async fn fetch_shipments(&self, order_id: &OrderId) -> AppResult<Vec<Shipment>>;

    /// Flat offer list across every provider
    async fn fetch_rates(&self, query: &RateQuery) -> AppResult<Vec<ShippingRate>>;

    async fn purchase_label(&self, request: &LabelPurchase) -> AppResult<Label>;

    async fn void_label(&self, shipment_id: &ShipmentId) -> AppResult<()>;

    async fn update_address(&self, order_id: &OrderId, address: &Address) -> AppResult<Order>;

    async fn update_method(
        &self,
        order_id: &OrderId,
        selection: &MethodSelection,
    ) -> AppResult<Order>;

    async fn fetch_label(&self, shipment_id: &ShipmentId) -> AppResult<Label>;

    async fn complete_order(&self, order_id: &OrderId, user_id: &UserId) -> AppResult<()>;

    async fn unlock_order(&self, order_id: &OrderId, user_id: &UserId) -> AppResult<()>;
}

/// Local print subsystem
#[async_trait]
pub trait PrintSpooler: Send + Sync {
    async fn list_printers(&self) -> AppResult<Vec<PrinterInfo>>;

    /// Submit a label for printing; completion of the physical print is not
    /// reported back
    async fn print_label(&self, label_url: &str, printer_name: &str) -> AppResult<()>;
}
