//! End-to-end screen flows against in-memory HQ and printer fakes

use async_trait::async_trait;
use pack_station::core::{ErrorScope, ScreenController};
use pack_station::scan::KeyInput;
use rust_decimal::Decimal;
use shared::backend::{OrderBackend, PrintSpooler};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::*;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ========== Fakes ==========

#[derive(Default)]
struct FakeState {
    shipments: Vec<Shipment>,
    next_shipment: u64,
    calls: Vec<String>,
    rate_responses: VecDeque<(Duration, AppResult<Vec<ShippingRate>>)>,
    purchase_delay: Duration,
    address_error: Option<AppError>,
    estimated_weight: Option<Decimal>,
}

#[derive(Default)]
struct FakeHq {
    state: Mutex<FakeState>,
}

impl FakeHq {
    fn with_shipments(shipments: Vec<Shipment>) -> Self {
        let hq = Self::default();
        hq.state.lock().unwrap().shipments = shipments;
        hq
    }

    fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn count(&self, name: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == name).count()
    }

    fn record(&self, name: &str) {
        self.state.lock().unwrap().calls.push(name.to_string());
    }

    fn queue_rates(&self, delay: Duration, result: AppResult<Vec<ShippingRate>>) {
        self.state
            .lock()
            .unwrap()
            .rate_responses
            .push_back((delay, result));
    }
}

fn order() -> Order {
    Order {
        id: OrderId::from("55"),
        order_number: Some("A-1001".into()),
        status: OrderStatus::AwaitingShipment,
        items: ["100", "200"]
            .iter()
            .map(|id| OrderItem {
                id: ItemId::from(*id),
                name: format!("Item {}", id),
                quantity: 1,
                sku: None,
                image_url: None,
            })
            .collect(),
        ship_to: None,
        carrier: Some("ups".into()),
        service: Some("ground".into()),
        locked_by: Some(UserId::from("7")),
        estimated_weight: None,
        boxes: vec![ShippingBox {
            id: BoxId::from("3"),
            name: "12x10x4".into(),
            length: Some(12.0),
            width: Some(10.0),
            height: Some(4.0),
            suggested: false,
        }],
    }
}

fn shipment(id: &str, voided: bool) -> Shipment {
    Shipment {
        id: ShipmentId::from(id),
        order_id: OrderId::from("55"),
        carrier: Some("ups".into()),
        service: Some("ground".into()),
        tracking_number: Some(format!("1Z{}", id)),
        label_url: None,
        voided,
        created_at: None,
    }
}

fn rates(provider: &str, amount: i64) -> Vec<ShippingRate> {
    vec![ShippingRate {
        rate_id: None,
        provider: provider.into(),
        carrier: "usps".into(),
        service: "priority".into(),
        amount: Decimal::new(amount, 2),
        currency: "USD".into(),
        estimated_days: Some(2),
    }]
}

#[async_trait]
impl OrderBackend for FakeHq {
    async fn fetch_order(&self, _order_id: &OrderId) -> AppResult<Order> {
        self.record("fetch_order");
        let mut fetched = order();
        fetched.estimated_weight = self.state.lock().unwrap().estimated_weight;
        Ok(fetched)
    }

    async fn fetch_shipments(&self, _order_id: &OrderId) -> AppResult<Vec<Shipment>> {
        self.record("fetch_shipments");
        Ok(self.state.lock().unwrap().shipments.clone())
    }

    async fn fetch_rates(&self, _query: &RateQuery) -> AppResult<Vec<ShippingRate>> {
        self.record("fetch_rates");
        let next = self.state.lock().unwrap().rate_responses.pop_front();
        match next {
            Some((delay, result)) => {
                tokio::time::sleep(delay).await;
                result
            }
            None => Ok(rates("default", 999)),
        }
    }

    async fn purchase_label(&self, request: &LabelPurchase) -> AppResult<Label> {
        self.record("purchase_label");
        let delay = self.state.lock().unwrap().purchase_delay;
        tokio::time::sleep(delay).await;
        let mut state = self.state.lock().unwrap();
        state.next_shipment += 1;
        let id = ShipmentId::from(format!("s{}", state.next_shipment));
        let mut created = shipment(id.as_str(), false);
        created.order_id = request.order_id.clone();
        state.shipments.push(created);
        Ok(Label {
            shipment_id: Some(id.clone()),
            label_url: format!("https://labels.test/{}.zpl", id),
        })
    }

    async fn void_label(&self, shipment_id: &ShipmentId) -> AppResult<()> {
        self.record("void_label");
        let mut state = self.state.lock().unwrap();
        match state.shipments.iter_mut().find(|s| &s.id == shipment_id) {
            Some(s) if s.voided => Err(AppError::new(ErrorCode::ShipmentAlreadyVoided)),
            Some(s) => {
                s.voided = true;
                Ok(())
            }
            None => Err(AppError::new(ErrorCode::ShipmentNotFound)),
        }
    }

    async fn update_address(&self, _order_id: &OrderId, address: &Address) -> AppResult<Order> {
        self.record("update_address");
        if let Some(err) = self.state.lock().unwrap().address_error.clone() {
            return Err(err);
        }
        let mut updated = order();
        updated.ship_to = Some(address.clone());
        Ok(updated)
    }

    async fn update_method(
        &self,
        _order_id: &OrderId,
        selection: &MethodSelection,
    ) -> AppResult<Order> {
        self.record("update_method");
        let mut updated = order();
        updated.carrier = Some(selection.carrier.clone());
        updated.service = Some(selection.service.clone());
        Ok(updated)
    }

    async fn fetch_label(&self, shipment_id: &ShipmentId) -> AppResult<Label> {
        self.record("fetch_label");
        Ok(Label {
            shipment_id: None,
            label_url: format!("https://labels.test/{}.zpl", shipment_id),
        })
    }

    async fn complete_order(&self, _order_id: &OrderId, _user_id: &UserId) -> AppResult<()> {
        self.record("complete_order");
        Ok(())
    }

    async fn unlock_order(&self, _order_id: &OrderId, _user_id: &UserId) -> AppResult<()> {
        self.record("unlock_order");
        Ok(())
    }
}

#[derive(Default)]
struct FakeSpooler {
    printers: Vec<PrinterInfo>,
    jobs: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl FakeSpooler {
    fn with_printers(printers: Vec<PrinterInfo>) -> Self {
        Self {
            printers,
            ..Default::default()
        }
    }

    fn jobs(&self) -> Vec<(String, String)> {
        self.jobs.lock().unwrap().clone()
    }
}

#[async_trait]
impl PrintSpooler for FakeSpooler {
    async fn list_printers(&self) -> AppResult<Vec<PrinterInfo>> {
        Ok(self.printers.clone())
    }

    async fn print_label(&self, label_url: &str, printer_name: &str) -> AppResult<()> {
        if self.fail {
            return Err(AppError::with_message(
                ErrorCode::PrinterNotAvailable,
                format!("Printer not found: {}", printer_name),
            ));
        }
        self.jobs
            .lock()
            .unwrap()
            .push((label_url.to_string(), printer_name.to_string()));
        Ok(())
    }
}

// ========== Helpers ==========

fn zebra() -> Vec<PrinterInfo> {
    vec![
        PrinterInfo::new("Backup", false),
        PrinterInfo::new("Zebra", true),
    ]
}

async fn loaded(hq: Arc<FakeHq>, spooler: Arc<FakeSpooler>) -> ScreenController {
    let mut controller = ScreenController::new(
        OrderId::from("55"),
        Some(UserId::from("7")),
        hq,
        spooler,
    );
    controller.load();
    controller.settle().await;
    controller
}

fn type_keys(controller: &mut ScreenController, text: &str) -> Vec<String> {
    let mut scans = Vec::new();
    for c in text.chars() {
        scans.extend(controller.on_key(KeyInput::Char(c)));
    }
    scans.extend(controller.on_key(KeyInput::Enter));
    scans
}

fn packed(controller: &ScreenController, id: &str) -> bool {
    controller
        .screen()
        .pack()
        .get(&ItemId::from(id))
        .map(|e| e.packed)
        .unwrap_or(false)
}

fn ready_to_ship(controller: &mut ScreenController) {
    type_keys(controller, "100");
    type_keys(controller, "200");
    controller.set_weight(Decimal::new(25, 1)).unwrap();
    controller.select_box(BoxId::from("3")).unwrap();
}

// ========== Tests ==========

#[tokio::test(start_paused = true)]
async fn test_load_initializes_screen() {
    let hq = Arc::new(FakeHq::default());
    let spooler = Arc::new(FakeSpooler::with_printers(zebra()));
    let controller = loaded(hq.clone(), spooler).await;

    let screen = controller.screen();
    assert_eq!(screen.pack().len(), 2);
    assert_eq!(screen.pack().remaining(), 2);
    assert_eq!(screen.selected_printer(), Some("Zebra"));
    assert_eq!(screen.boxes().len(), 1);
    assert!(screen.errors().is_empty());
    assert_eq!(hq.count("fetch_order"), 1);
    assert_eq!(hq.count("fetch_shipments"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_scanner_keystrokes_toggle_items() {
    let hq = Arc::new(FakeHq::default());
    let mut controller = loaded(hq, Arc::new(FakeSpooler::default())).await;

    assert_eq!(type_keys(&mut controller, "100"), vec!["100".to_string()]);
    assert!(packed(&controller, "100"));

    // Too short to be a scan
    assert!(type_keys(&mut controller, "10").is_empty());
    tokio::time::advance(Duration::from_millis(150)).await;

    // A pause mid-scan throws the prefix away
    controller.on_key(KeyInput::Char('2'));
    tokio::time::advance(Duration::from_millis(150)).await;
    assert!(type_keys(&mut controller, "00").is_empty());
    assert!(!packed(&controller, "200"));

    // Scanning again unpacks
    tokio::time::advance(Duration::from_millis(150)).await;
    type_keys(&mut controller, "100");
    assert!(!packed(&controller, "100"));
}

#[tokio::test(start_paused = true)]
async fn test_shift_is_transparent() {
    let mut controller =
        loaded(Arc::new(FakeHq::default()), Arc::new(FakeSpooler::default())).await;
    controller.on_key(KeyInput::Char('2'));
    controller.on_key(KeyInput::Shift);
    controller.on_key(KeyInput::Char('0'));
    controller.on_key(KeyInput::Shift);
    controller.on_key(KeyInput::Char('0'));
    assert_eq!(controller.on_key(KeyInput::Enter).as_deref(), Some("200"));
}

#[tokio::test(start_paused = true)]
async fn test_unknown_scan_is_silent() {
    let mut controller =
        loaded(Arc::new(FakeHq::default()), Arc::new(FakeSpooler::default())).await;
    let before = controller.screen().pack().clone();
    type_keys(&mut controller, "999");
    assert!(controller.screen().pack().same_snapshot(&before));
    assert!(controller.screen().errors().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_gating_follows_pack_state() {
    let hq = Arc::new(FakeHq::with_shipments(vec![shipment("1", false)]));
    let spooler = Arc::new(FakeSpooler::with_printers(zebra()));
    let mut controller = loaded(hq, spooler).await;

    let gates = controller.snapshot().gates;
    assert!(!gates.print_label);
    assert!(!gates.complete_order);

    type_keys(&mut controller, "100");
    assert!(!controller.snapshot().gates.print_label);

    type_keys(&mut controller, "200");
    let gates = controller.snapshot().gates;
    assert!(gates.print_label);
    assert!(gates.complete_order);

    type_keys(&mut controller, "100");
    let gates = controller.snapshot().gates;
    assert!(!gates.print_label);
    assert!(!gates.complete_order);
}

#[tokio::test(start_paused = true)]
async fn test_print_label_purchases_when_no_active_shipment() {
    let hq = Arc::new(FakeHq::with_shipments(vec![shipment("1", true)]));
    let spooler = Arc::new(FakeSpooler::with_printers(zebra()));
    let mut controller = loaded(hq.clone(), spooler.clone()).await;
    ready_to_ship(&mut controller);

    controller.print_label();
    controller.settle().await;

    assert_eq!(hq.count("purchase_label"), 1);
    assert_eq!(
        spooler.jobs(),
        vec![("https://labels.test/s1.zpl".to_string(), "Zebra".to_string())]
    );
    // Shipments were refreshed after the purchase
    assert_eq!(controller.screen().shipments().len(), 2);
    assert!(controller.snapshot().gates.complete_order);
}

#[tokio::test(start_paused = true)]
async fn test_print_label_reprints_active_shipment() {
    let hq = Arc::new(FakeHq::with_shipments(vec![shipment("8", false)]));
    let spooler = Arc::new(FakeSpooler::with_printers(zebra()));
    let mut controller = loaded(hq.clone(), spooler.clone()).await;
    type_keys(&mut controller, "100");
    type_keys(&mut controller, "200");

    controller.print_label();
    controller.settle().await;

    assert_eq!(hq.count("purchase_label"), 0);
    assert_eq!(hq.count("fetch_label"), 1);
    assert_eq!(spooler.jobs()[0].0, "https://labels.test/8.zpl");
    assert_eq!(
        controller
            .screen()
            .last_label()
            .and_then(|l| l.shipment_id.clone()),
        Some(ShipmentId::from("8"))
    );
}

#[tokio::test(start_paused = true)]
async fn test_print_blocked_until_packed() {
    let hq = Arc::new(FakeHq::default());
    let spooler = Arc::new(FakeSpooler::with_printers(zebra()));
    let mut controller = loaded(hq.clone(), spooler.clone()).await;
    type_keys(&mut controller, "100");

    controller.print_label();
    controller.settle().await;

    assert!(spooler.jobs().is_empty());
    assert_eq!(hq.count("purchase_label"), 0);
    let err = controller.screen().errors().get(ErrorScope::Printing).unwrap();
    assert_eq!(err.code, ErrorCode::OrderNotPacked);
}

#[tokio::test(start_paused = true)]
async fn test_print_failure_lands_in_printing_scope() {
    let hq = Arc::new(FakeHq::with_shipments(vec![shipment("8", false)]));
    let spooler = Arc::new(FakeSpooler {
        printers: zebra(),
        fail: true,
        ..Default::default()
    });
    let mut controller = loaded(hq, spooler).await;
    type_keys(&mut controller, "100");
    type_keys(&mut controller, "200");

    controller.print_label();
    controller.settle().await;

    let errors = controller.screen().errors();
    assert_eq!(
        errors.message(ErrorScope::Printing),
        Some("Printer not found: Zebra")
    );
    assert!(errors.get(ErrorScope::Order).is_none());
}

#[tokio::test(start_paused = true)]
async fn test_rates_validated_before_network() {
    let hq = Arc::new(FakeHq::default());
    let mut controller = loaded(hq.clone(), Arc::new(FakeSpooler::default())).await;

    controller.request_rates();
    controller.settle().await;
    assert_eq!(hq.count("fetch_rates"), 0);
    let err = controller.screen().errors().get(ErrorScope::Rates).unwrap();
    assert_eq!(err.code, ErrorCode::WeightRequired);

    controller.purchase_label();
    assert_eq!(controller.in_flight(), 0);
    assert!(controller.screen().errors().get(ErrorScope::Order).is_some());
}

#[tokio::test(start_paused = true)]
async fn test_stale_rates_discarded() {
    let hq = Arc::new(FakeHq::default());
    let mut controller = loaded(hq.clone(), Arc::new(FakeSpooler::default())).await;
    ready_to_ship(&mut controller);

    // The first request answers last
    hq.queue_rates(Duration::from_millis(500), Ok(rates("slow", 1500)));
    hq.queue_rates(Duration::from_millis(10), Ok(rates("fast", 1200)));
    controller.request_rates();
    controller.request_rates();
    controller.settle().await;

    assert_eq!(hq.count("fetch_rates"), 2);
    let current = controller.screen().rates();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].provider, "fast");
}

#[tokio::test(start_paused = true)]
async fn test_error_scopes_are_independent() {
    let hq = Arc::new(FakeHq::default());
    hq.state.lock().unwrap().address_error = Some(AppError::with_message(
        ErrorCode::AddressInvalid,
        "Postal code does not match state",
    ));
    let mut controller = loaded(hq.clone(), Arc::new(FakeSpooler::default())).await;
    ready_to_ship(&mut controller);

    hq.queue_rates(
        Duration::ZERO,
        Err(AppError::with_message(ErrorCode::RateUnavailable, "Carrier timeout")),
    );
    controller.request_rates();
    controller.update_address(Address {
        name: "Ada".into(),
        street1: "1 Main St".into(),
        city: "Springfield".into(),
        state: "IL".into(),
        postal_code: "99999".into(),
        country: "US".into(),
        ..Default::default()
    });
    controller.settle().await;

    let errors = controller.screen().errors();
    assert_eq!(errors.message(ErrorScope::Rates), Some("Carrier timeout"));
    assert_eq!(
        errors.message(ErrorScope::ShippingForm),
        Some("Postal code does not match state")
    );
    assert!(errors.get(ErrorScope::Order).is_none());
    assert!(controller.screen().order().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_invalid_address_never_sent() {
    let hq = Arc::new(FakeHq::default());
    let mut controller = loaded(hq.clone(), Arc::new(FakeSpooler::default())).await;

    controller.update_address(Address::default());
    controller.settle().await;

    assert_eq!(hq.count("update_address"), 0);
    let err = controller
        .screen()
        .errors()
        .get(ErrorScope::ShippingForm)
        .unwrap();
    assert_eq!(err.code, ErrorCode::RequiredField);
}

#[tokio::test(start_paused = true)]
async fn test_update_method_replaces_order() {
    let hq = Arc::new(FakeHq::default());
    let mut controller = loaded(hq, Arc::new(FakeSpooler::default())).await;
    type_keys(&mut controller, "200");

    controller.update_method(MethodSelection::new("usps", "priority"));
    controller.settle().await;

    let snap = controller.snapshot();
    assert_eq!(snap.carrier.as_deref(), Some("usps"));
    assert_eq!(snap.service.as_deref(), Some("priority"));
    // Pack progress survives the order refresh
    assert!(packed(&controller, "200"));
}

#[tokio::test(start_paused = true)]
async fn test_void_then_complete() {
    let hq = Arc::new(FakeHq::with_shipments(vec![shipment("1", false)]));
    let mut controller = loaded(hq.clone(), Arc::new(FakeSpooler::default())).await;
    type_keys(&mut controller, "100");
    type_keys(&mut controller, "200");
    assert!(controller.snapshot().gates.complete_order);

    controller.void_label(ShipmentId::from("1"));
    controller.settle().await;
    assert!(!controller.snapshot().gates.complete_order);

    controller.complete_order();
    controller.settle().await;
    assert_eq!(hq.count("complete_order"), 0);
    assert_eq!(
        controller
            .screen()
            .errors()
            .get(ErrorScope::Order)
            .map(|e| e.code),
        Some(ErrorCode::NoActiveShipment)
    );

    controller.purchase_label();
    controller.set_weight(Decimal::ONE).unwrap();
    controller.select_box(BoxId::from("3")).unwrap();
    controller.purchase_label();
    controller.settle().await;
    controller.complete_order();
    controller.settle().await;

    assert_eq!(hq.count("complete_order"), 1);
    assert!(controller.screen().is_completed());
}

#[tokio::test(start_paused = true)]
async fn test_void_twice_reports_backend_message() {
    let hq = Arc::new(FakeHq::with_shipments(vec![shipment("1", true)]));
    let mut controller = loaded(hq, Arc::new(FakeSpooler::default())).await;

    controller.void_label(ShipmentId::from("1"));
    controller.settle().await;
    assert_eq!(
        controller.screen().errors().message(ErrorScope::Order),
        Some("Shipment has already been voided")
    );
}

#[tokio::test(start_paused = true)]
async fn test_unlock_and_dispose() {
    let hq = Arc::new(FakeHq::default());
    let mut controller = loaded(hq.clone(), Arc::new(FakeSpooler::default())).await;
    controller.on_key(KeyInput::Char('1'));
    assert!(controller.scan_deadline().is_some());

    controller.unlock();
    controller.dispose();
    controller.settle().await;

    assert_eq!(hq.count("unlock_order"), 1);
    assert!(controller.screen().is_unlocked());
    assert!(controller.scan_deadline().is_none());
    assert!(type_keys(&mut controller, "100").is_empty());
    assert!(!packed(&controller, "100"));
}

#[tokio::test(start_paused = true)]
async fn test_scan_deadline_expires_buffer() {
    let mut controller =
        loaded(Arc::new(FakeHq::default()), Arc::new(FakeSpooler::default())).await;
    controller.on_key(KeyInput::Char('1'));
    controller.on_key(KeyInput::Char('0'));
    let deadline = controller.scan_deadline().unwrap();

    tokio::time::sleep_until(deadline).await;
    controller.flush_scan();
    assert!(controller.scan_deadline().is_none());

    controller.on_key(KeyInput::Char('0'));
    assert_eq!(controller.on_key(KeyInput::Enter), None);
}

#[tokio::test(start_paused = true)]
async fn test_second_purchase_refused_while_first_in_flight() {
    let hq = Arc::new(FakeHq::default());
    hq.state.lock().unwrap().purchase_delay = Duration::from_millis(300);
    let spooler = Arc::new(FakeSpooler::with_printers(zebra()));
    let mut controller = loaded(hq.clone(), spooler.clone()).await;
    ready_to_ship(&mut controller);

    controller.print_label();
    controller.purchase_label();
    controller.print_label();
    assert_eq!(
        controller
            .screen()
            .errors()
            .get(ErrorScope::Order)
            .map(|e| e.code),
        Some(ErrorCode::LabelPurchasePending)
    );
    controller.settle().await;

    // One label bought, and it still went to the printer
    assert_eq!(hq.count("purchase_label"), 1);
    assert_eq!(
        spooler.jobs(),
        vec![("https://labels.test/s1.zpl".to_string(), "Zebra".to_string())]
    );
    assert_eq!(controller.screen().shipments().len(), 1);

    // Once it settled, buying again is allowed
    controller.purchase_label();
    controller.settle().await;
    assert_eq!(hq.count("purchase_label"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_keys_processed_while_request_in_flight() {
    let hq = Arc::new(FakeHq::default());
    let mut controller = loaded(hq.clone(), Arc::new(FakeSpooler::default())).await;
    controller.set_weight(Decimal::ONE).unwrap();
    controller.select_box(BoxId::from("3")).unwrap();

    hq.queue_rates(Duration::from_millis(500), Ok(rates("easypost", 985)));
    controller.request_rates();
    tokio::time::advance(Duration::from_millis(10)).await;

    assert_eq!(type_keys(&mut controller, "100"), vec!["100".to_string()]);
    assert!(packed(&controller, "100"));
    assert_eq!(controller.in_flight(), 1);
    assert!(controller.screen().rates().is_empty());

    controller.settle().await;
    assert_eq!(controller.screen().rates()[0].provider, "easypost");
    assert!(packed(&controller, "100"));
}

#[tokio::test(start_paused = true)]
async fn test_load_prefills_estimated_weight() {
    let hq = Arc::new(FakeHq::default());
    hq.state.lock().unwrap().estimated_weight = Some(Decimal::new(175, 2));
    let mut controller = loaded(hq.clone(), Arc::new(FakeSpooler::default())).await;

    let weight = controller.screen().weight().unwrap();
    assert_eq!(weight.value, Decimal::new(175, 2));
    assert_eq!(weight.unit, WeightUnit::Lb);

    controller.select_box(BoxId::from("3")).unwrap();
    controller.request_rates();
    controller.settle().await;
    assert_eq!(hq.count("fetch_rates"), 1);
    assert!(controller.screen().errors().get(ErrorScope::Rates).is_none());
}
