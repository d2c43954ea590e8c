//! Typed HQ API
//!
//! One method per remote operation the packing screen uses. Routes live
//! under `/api/`; bodies are plain JSON.

use crate::{ClientConfig, ClientResult, HttpClient};
use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use shared::backend::OrderBackend;
use shared::error::AppResult;
use shared::models::{
    Address, Label, LabelPurchase, MethodSelection, Order, OrderId, RateQuery, Shipment,
    ShipmentId, ShippingRate, UserId,
};
use tracing::{info, instrument};

#[derive(Serialize)]
struct UserBody<'a> {
    user_id: &'a UserId,
}

#[derive(Deserialize)]
struct RatesBody {
    #[serde(default)]
    rates: Vec<ShippingRate>,
}

/// HQ client
#[derive(Debug, Clone)]
pub struct HqClient {
    http: HttpClient,
}

impl HqClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        Ok(Self {
            http: HttpClient::new(config)?,
        })
    }

    pub fn from_http(http: HttpClient) -> Self {
        Self { http }
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    // ========== Orders ==========

    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: &OrderId) -> ClientResult<Order> {
        self.http.get(&format!("api/orders/{}", order_id)).await
    }

    #[instrument(skip(self, address), fields(order_id = %order_id))]
    pub async fn put_address(&self, order_id: &OrderId, address: &Address) -> ClientResult<Order> {
        self.http
            .put(&format!("api/orders/{}/address", order_id), address)
            .await
    }

    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn put_method(
        &self,
        order_id: &OrderId,
        selection: &MethodSelection,
    ) -> ClientResult<Order> {
        self.http
            .put(&format!("api/orders/{}/method", order_id), selection)
            .await
    }

    #[instrument(skip(self), fields(order_id = %order_id, user_id = %user_id))]
    pub async fn post_complete(&self, order_id: &OrderId, user_id: &UserId) -> ClientResult<()> {
        self.http
            .send_unit(
                Method::POST,
                &format!("api/orders/{}/complete", order_id),
                Some(&UserBody { user_id }),
            )
            .await?;
        info!("Order marked complete");
        Ok(())
    }

    #[instrument(skip(self), fields(order_id = %order_id, user_id = %user_id))]
    pub async fn post_unlock(&self, order_id: &OrderId, user_id: &UserId) -> ClientResult<()> {
        self.http
            .send_unit(
                Method::POST,
                &format!("api/orders/{}/unlock", order_id),
                Some(&UserBody { user_id }),
            )
            .await
    }

    // ========== Shipping ==========

    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_shipments(&self, order_id: &OrderId) -> ClientResult<Vec<Shipment>> {
        self.http
            .get(&format!("api/orders/{}/shipments", order_id))
            .await
    }

    #[instrument(skip(self, query), fields(order_id = %query.order_id, box_id = %query.box_id))]
    pub async fn post_rates(&self, query: &RateQuery) -> ClientResult<Vec<ShippingRate>> {
        let body: RatesBody = self.http.post("api/rates", query).await?;
        Ok(body.rates)
    }

    #[instrument(skip(self, request), fields(order_id = %request.order_id))]
    pub async fn post_label(&self, request: &LabelPurchase) -> ClientResult<Label> {
        let label: Label = self.http.post("api/labels", request).await?;
        info!(label_url = %label.label_url, "Label purchased");
        Ok(label)
    }

    #[instrument(skip(self), fields(shipment_id = %shipment_id))]
    pub async fn post_void(&self, shipment_id: &ShipmentId) -> ClientResult<()> {
        self.http
            .send_unit::<()>(
                Method::POST,
                &format!("api/shipments/{}/void", shipment_id),
                None,
            )
            .await?;
        info!("Label voided");
        Ok(())
    }

    #[instrument(skip(self), fields(shipment_id = %shipment_id))]
    pub async fn get_label(&self, shipment_id: &ShipmentId) -> ClientResult<Label> {
        self.http
            .get(&format!("api/shipments/{}/label", shipment_id))
            .await
    }
}

#[async_trait]
impl OrderBackend for HqClient {
    async fn fetch_order(&self, order_id: &OrderId) -> AppResult<Order> {
        Ok(self.get_order(order_id).await?)
    }

    async fn fetch_shipments(&self, order_id: &OrderId) -> AppResult<Vec<Shipment>> {
        Ok(self.get_shipments(order_id).await?)
    }

    async fn fetch_rates(&self, query: &RateQuery) -> AppResult<Vec<ShippingRate>> {
        Ok(self.post_rates(query).await?)
    }

    async fn purchase_label(&self, request: &LabelPurchase) -> AppResult<Label> {
        Ok(self.post_label(request).await?)
    }

    async fn void_label(&self, shipment_id: &ShipmentId) -> AppResult<()> {
        Ok(self.post_void(shipment_id).await?)
    }

    async fn update_address(&self, order_id: &OrderId, address: &Address) -> AppResult<Order> {
        Ok(self.put_address(order_id, address).await?)
    }

    async fn update_method(
        &self,
        order_id: &OrderId,
        selection: &MethodSelection,
    ) -> AppResult<Order> {
        Ok(self.put_method(order_id, selection).await?)
    }

    async fn fetch_label(&self, shipment_id: &ShipmentId) -> AppResult<Label> {
        Ok(self.get_label(shipment_id).await?)
    }

    async fn complete_order(&self, order_id: &OrderId, user_id: &UserId) -> AppResult<()> {
        Ok(self.post_complete(order_id, user_id).await?)
    }

    async fn unlock_order(&self, order_id: &OrderId, user_id: &UserId) -> AppResult<()> {
        Ok(self.post_unlock(order_id, user_id).await?)
    }
}
