//! Shipment and label models

use super::id::{BoxId, OrderId, ShipmentId, UserId};
use super::package::Weight;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A purchased (or voided) carrier label for an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Shipment {
    pub id: ShipmentId,
    pub order_id: OrderId,
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub label_url: Option<String>,
    #[serde(default)]
    pub voided: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Shipment {
    pub fn is_active(&self) -> bool {
        !self.voided
    }
}

/// True when at least one shipment has not been voided
pub fn has_active_shipment(shipments: &[Shipment]) -> bool {
    shipments.iter().any(Shipment::is_active)
}

/// Label purchase request body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LabelPurchase {
    pub order_id: OrderId,
    pub weight: Weight,
    pub box_id: BoxId,
    pub user_id: UserId,
}

/// Label document returned by purchase or lookup
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Label {
    #[serde(default)]
    pub shipment_id: Option<ShipmentId>,
    pub label_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shipment(id: &str, voided: bool) -> Shipment {
        Shipment {
            id: ShipmentId::from(id),
            order_id: OrderId::from("1"),
            carrier: Some("ups".into()),
            service: Some("ground".into()),
            tracking_number: None,
            label_url: None,
            voided,
            created_at: None,
        }
    }

    #[test]
    fn test_active_shipment_detection() {
        assert!(!has_active_shipment(&[]));
        assert!(!has_active_shipment(&[shipment("1", true)]));
        assert!(has_active_shipment(&[shipment("1", true), shipment("2", false)]));
    }

    #[test]
    fn test_deserialize_minimal_shipment() {
        let json = r#"{"id": 7, "order_id": 1, "created_at": "2026-03-01T10:00:00Z"}"#;
        let s: Shipment = serde_json::from_str(json).unwrap();
        assert_eq!(s.id, "7");
        assert!(s.is_active());
        assert!(s.created_at.is_some());
    }
}
