// hq-client/tests/hq_integration.rs
// Integration tests against an in-process stub HQ

use axum::{
    Json, Router,
    extract::Path,
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
};
use hq_client::{ClientConfig, HqClient};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use shared::OrderBackend;
use shared::error::ErrorCode;
use shared::models::{
    Address, BoxId, LabelPurchase, MethodSelection, OrderId, RateQuery, ShipmentId, UserId, Weight,
};

const TOKEN: &str = "station-token";

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", TOKEN))
}

async fn get_order(headers: HeaderMap, Path(id): Path<String>) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"code": 1001, "message": "Sign in again"})),
        );
    }
    if id == "404" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Order 404 does not exist"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "id": id.parse::<u64>().unwrap_or(0),
            "order_number": "A-1001",
            "items": [
                {"id": 100, "name": "Mug", "quantity": 1},
                {"id": "200", "name": "Tea", "quantity": 2}
            ],
            "estimated_weight": 1.75,
            "boxes": [
                {"id": 1, "name": "Small"},
                {"id": 2, "name": "Medium", "suggested": true}
            ]
        })),
    )
}

async fn get_shipments(Path(id): Path<String>) -> Json<Value> {
    Json(json!([
        {"id": 1, "order_id": id, "voided": true},
        {"id": 2, "order_id": id, "tracking_number": "1Z999", "label_url": "https://labels.test/2.pdf"}
    ]))
}

async fn post_rates(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["box_id"] == "oversize" {
        return (
            StatusCode::BAD_GATEWAY,
            Json(json!({"code": 5101, "message": "No carrier accepts this box"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({"rates": [
            {"provider": "easypost", "carrier": "usps", "service": "priority", "amount": 9.85},
            {"provider": "shipstation", "carrier": "ups", "service": "ground", "amount": 12.40}
        ]})),
    )
}

async fn post_label(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["user_id"] != "7" {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "unknown user"})));
    }
    (
        StatusCode::OK,
        Json(json!({"shipment_id": 3, "label_url": "https://labels.test/3.pdf"})),
    )
}

async fn void_label(Path(id): Path<String>) -> StatusCode {
    if id == "1" {
        StatusCode::CONFLICT
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn put_address(Path(id): Path<String>, Json(address): Json<Value>) -> Json<Value> {
    Json(json!({"id": id, "items": [], "ship_to": address}))
}

async fn put_method(Path(id): Path<String>, Json(sel): Json<Value>) -> Json<Value> {
    Json(json!({"id": id, "items": [], "carrier": sel["carrier"], "service": sel["service"]}))
}

async fn unlock(Json(body): Json<Value>) -> StatusCode {
    if body["user_id"] == "7" {
        StatusCode::OK
    } else {
        StatusCode::FORBIDDEN
    }
}

async fn spawn_stub() -> String {
    let app = Router::new()
        .route("/api/orders/{id}", get(get_order))
        .route("/api/orders/{id}/shipments", get(get_shipments))
        .route("/api/orders/{id}/address", put(put_address))
        .route("/api/orders/{id}/method", put(put_method))
        .route("/api/orders/{id}/unlock", post(unlock))
        .route("/api/orders/{id}/complete", post(unlock))
        .route("/api/rates", post(post_rates))
        .route("/api/labels", post(post_label))
        .route("/api/shipments/{id}/void", post(void_label));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn client() -> HqClient {
    let base = spawn_stub().await;
    ClientConfig::new(base)
        .with_token(TOKEN)
        .with_timeout(5)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_fetch_order_normalizes_ids() {
    let hq = client().await;
    let order = hq.fetch_order(&OrderId::from("55")).await.unwrap();
    assert_eq!(order.id, "55");
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.items[0].id, "100");
    assert_eq!(order.items[1].id, "200");
    assert_eq!(order.estimated_weight, Some(Decimal::new(175, 2)));
    assert_eq!(order.boxes[1].id, "2");
    assert!(order.boxes[1].suggested);
}

#[tokio::test]
async fn test_missing_token_surfaces_envelope_message() {
    let base = spawn_stub().await;
    let hq = ClientConfig::new(base).build().unwrap();
    let err = hq.fetch_order(&OrderId::from("55")).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotAuthenticated);
    assert_eq!(err.message, "Sign in again");
}

#[tokio::test]
async fn test_plain_error_body_message() {
    let hq = client().await;
    let err = hq.fetch_order(&OrderId::from("404")).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
    assert_eq!(err.message, "Order 404 does not exist");
}

#[tokio::test]
async fn test_shipments() {
    let hq = client().await;
    let shipments = hq.fetch_shipments(&OrderId::from("55")).await.unwrap();
    assert_eq!(shipments.len(), 2);
    assert!(shipments[0].voided);
    assert_eq!(shipments[1].tracking_number.as_deref(), Some("1Z999"));
}

#[tokio::test]
async fn test_rates_success_and_failure() {
    let hq = client().await;
    let weight = Weight::pounds(Decimal::new(15, 1)).unwrap();

    let rates = hq
        .fetch_rates(&RateQuery {
            order_id: OrderId::from("55"),
            weight,
            box_id: BoxId::from("1"),
        })
        .await
        .unwrap();
    assert_eq!(rates.len(), 2);
    assert_eq!(rates[0].provider, "easypost");
    assert_eq!(rates[0].amount, Decimal::new(985, 2));

    let err = hq
        .fetch_rates(&RateQuery {
            order_id: OrderId::from("55"),
            weight,
            box_id: BoxId::from("oversize"),
        })
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::RateUnavailable);
    assert_eq!(err.message, "No carrier accepts this box");
}

#[tokio::test]
async fn test_purchase_and_void() {
    let hq = client().await;
    let label = hq
        .purchase_label(&LabelPurchase {
            order_id: OrderId::from("55"),
            weight: Weight::pounds(Decimal::ONE).unwrap(),
            box_id: BoxId::from("1"),
            user_id: UserId::from("7"),
        })
        .await
        .unwrap();
    assert_eq!(label.label_url, "https://labels.test/3.pdf");
    assert_eq!(label.shipment_id, Some(ShipmentId::from("3")));

    hq.void_label(&ShipmentId::from("3")).await.unwrap();
    let err = hq.void_label(&ShipmentId::from("1")).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderLocked);
}

#[tokio::test]
async fn test_address_and_method_updates() {
    let hq = client().await;
    let address = Address {
        name: "Ada".into(),
        street1: "1 Main St".into(),
        city: "Springfield".into(),
        state: "IL".into(),
        postal_code: "62701".into(),
        country: "US".into(),
        ..Default::default()
    };
    let order = hq
        .update_address(&OrderId::from("55"), &address)
        .await
        .unwrap();
    assert_eq!(order.ship_to, Some(address));

    let order = hq
        .update_method(&OrderId::from("55"), &MethodSelection::new("ups", "ground"))
        .await
        .unwrap();
    assert_eq!(order.carrier.as_deref(), Some("ups"));
    assert_eq!(order.service.as_deref(), Some("ground"));
}

#[tokio::test]
async fn test_unlock_and_complete() {
    let hq = client().await;
    hq.unlock_order(&OrderId::from("55"), &UserId::from("7"))
        .await
        .unwrap();
    hq.complete_order(&OrderId::from("55"), &UserId::from("7"))
        .await
        .unwrap();

    let err = hq
        .unlock_order(&OrderId::from("55"), &UserId::from("8"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InternalError);
    assert_eq!(err.message, "Forbidden");
}
