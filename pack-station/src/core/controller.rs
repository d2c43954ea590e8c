//! Screen controller
//!
//! Single owner of the order screen. User actions mutate the screen
//! synchronously; backend calls run as spawned tasks that report an
//! [`Outcome`] back over a channel. Outcomes are applied in arrival order
//! and stale ones (superseded by a newer request of the same kind) are
//! dropped. Label purchases never overlap, so a bought label is never
//! discarded.

use super::requests::{Operation, RequestId, RequestTracker};
use super::screen::{ErrorScope, Followup, OrderScreen, Outcome, PrintPlan, ScreenSnapshot};
use crate::scan::{KeyInput, ScanRecognizer};
use rust_decimal::Decimal;
use shared::backend::{OrderBackend, PrintSpooler};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Address, BoxId, ItemId, MethodSelection, OrderId, ShipmentId, UserId};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};
use tracing::{debug, info, instrument};

type Completion = (RequestId, Outcome);

pub struct ScreenController {
    screen: OrderScreen,
    scanner: ScanRecognizer,
    backend: Arc<dyn OrderBackend>,
    spooler: Arc<dyn PrintSpooler>,
    requests: RequestTracker,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
}

impl ScreenController {
    pub fn new(
        order_id: OrderId,
        user_id: Option<UserId>,
        backend: Arc<dyn OrderBackend>,
        spooler: Arc<dyn PrintSpooler>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            screen: OrderScreen::new(order_id, user_id),
            scanner: ScanRecognizer::default(),
            backend,
            spooler,
            requests: RequestTracker::new(),
            tx,
            rx,
        }
    }

    pub fn with_scan_timeout(mut self, timeout: Duration) -> Self {
        self.scanner = ScanRecognizer::new(timeout);
        self
    }

    pub fn screen(&self) -> &OrderScreen {
        &self.screen
    }

    pub fn snapshot(&self) -> ScreenSnapshot {
        self.screen.snapshot()
    }

    pub fn in_flight(&self) -> usize {
        self.requests.in_flight()
    }

    // ========== Input ==========

    /// Feed a key to the scan recognizer; a completed scan toggles items
    pub fn on_key(&mut self, key: KeyInput) -> Option<String> {
        let code = self.scanner.on_key(key)?;
        info!(code = %code, "Barcode scanned");
        self.screen.apply_scan(&code);
        Some(code)
    }

    /// Deadline the event loop should wake at to expire a partial scan
    pub fn scan_deadline(&self) -> Option<Instant> {
        self.scanner.deadline()
    }

    pub fn flush_scan(&mut self) {
        self.scanner.flush_expired(Instant::now());
    }

    pub fn pack_item(&mut self, item_id: &ItemId) {
        self.screen.pack_item(item_id);
    }

    pub fn unpack_item(&mut self, item_id: &ItemId) {
        self.screen.unpack_item(item_id);
    }

    pub fn select_printer(&mut self, name: &str) -> AppResult<()> {
        self.screen.select_printer(name)
    }

    pub fn select_box(&mut self, box_id: BoxId) -> AppResult<()> {
        self.screen.select_box(box_id)
    }

    pub fn set_weight(&mut self, value: Decimal) -> AppResult<()> {
        self.screen.set_weight(value)
    }

    // ========== Backend operations ==========

    /// Fetch the order (with its boxes), its shipments and the printers
    #[instrument(skip(self), fields(order_id = %self.screen.order_id()))]
    pub fn load(&mut self) {
        let backend = self.backend.clone();
        let order_id = self.screen.order_id().clone();
        self.spawn(Operation::LoadOrder, async move {
            Outcome::OrderLoaded(backend.fetch_order(&order_id).await)
        });

        self.refresh_shipments();

        let spooler = self.spooler.clone();
        self.spawn(Operation::Printers, async move {
            Outcome::PrintersLoaded(spooler.list_printers().await)
        });
    }

    pub fn refresh_shipments(&mut self) {
        let backend = self.backend.clone();
        let order_id = self.screen.order_id().clone();
        self.spawn(Operation::Shipments, async move {
            Outcome::ShipmentsLoaded(backend.fetch_shipments(&order_id).await)
        });
    }

    pub fn request_rates(&mut self) {
        let Ok(query) = self.screen.rate_query() else {
            return;
        };
        let backend = self.backend.clone();
        self.spawn(Operation::Rates, async move {
            Outcome::RatesLoaded(backend.fetch_rates(&query).await)
        });
    }

    pub fn update_address(&mut self, address: Address) {
        if self.screen.address_update(&address).is_err() {
            return;
        }
        let backend = self.backend.clone();
        let order_id = self.screen.order_id().clone();
        self.spawn(Operation::Address, async move {
            Outcome::AddressUpdated(backend.update_address(&order_id, &address).await)
        });
    }

    pub fn update_method(&mut self, selection: MethodSelection) {
        if self.screen.method_update(&selection).is_err() {
            return;
        }
        let backend = self.backend.clone();
        let order_id = self.screen.order_id().clone();
        self.spawn(Operation::Method, async move {
            Outcome::MethodUpdated(backend.update_method(&order_id, &selection).await)
        });
    }

    /// Buy a label without printing it
    pub fn purchase_label(&mut self) {
        if self.purchase_pending() {
            return;
        }
        let Ok(request) = self.screen.label_purchase() else {
            return;
        };
        let backend = self.backend.clone();
        self.spawn(Operation::PurchaseLabel, async move {
            Outcome::LabelPurchased {
                result: backend.purchase_label(&request).await,
                print_on: None,
            }
        });
    }

    /// Fetch an existing label so its URL can be shown
    pub fn view_label(&mut self, shipment_id: ShipmentId) {
        self.fetch_label(shipment_id, None);
    }

    pub fn void_label(&mut self, shipment_id: ShipmentId) {
        let backend = self.backend.clone();
        let id = shipment_id.clone();
        self.spawn(Operation::VoidLabel(shipment_id), async move {
            Outcome::LabelVoided {
                result: backend.void_label(&id).await,
                shipment_id: id,
            }
        });
    }

    /// Print the active shipment's label, buying one first if none exists
    pub fn print_label(&mut self) {
        let Ok(plan) = self.screen.print_plan() else {
            return;
        };
        match plan {
            PrintPlan::Existing {
                shipment_id,
                printer,
            } => self.fetch_label(shipment_id, Some(printer)),
            PrintPlan::Purchase { request, printer } => {
                if self.purchase_pending() {
                    return;
                }
                let backend = self.backend.clone();
                self.spawn(Operation::PurchaseLabel, async move {
                    Outcome::LabelPurchased {
                        result: backend.purchase_label(&request).await,
                        print_on: Some(printer),
                    }
                });
            }
        }
    }

    pub fn complete_order(&mut self) {
        let Ok(user_id) = self.screen.completion() else {
            return;
        };
        let backend = self.backend.clone();
        let order_id = self.screen.order_id().clone();
        self.spawn(Operation::CompleteOrder, async move {
            Outcome::OrderCompleted(backend.complete_order(&order_id, &user_id).await)
        });
    }

    /// Release the order lock held by the signed-in packer
    pub fn unlock(&mut self) {
        let Ok(user_id) = self.screen.unlock_user() else {
            return;
        };
        let backend = self.backend.clone();
        let order_id = self.screen.order_id().clone();
        self.spawn(Operation::Unlock, async move {
            Outcome::OrderUnlocked(backend.unlock_order(&order_id, &user_id).await)
        });
    }

    /// Stop reacting to scans; outstanding requests still settle
    pub fn dispose(&mut self) {
        self.scanner.dispose();
    }

    /// Refuse to start a purchase while another one is outstanding
    fn purchase_pending(&mut self) -> bool {
        if !self.requests.is_pending(&Operation::PurchaseLabel) {
            return false;
        }
        debug!("Label purchase already in flight");
        self.screen.errors_mut().set(
            ErrorScope::Order,
            AppError::new(ErrorCode::LabelPurchasePending),
        );
        true
    }

    fn fetch_label(&mut self, shipment_id: ShipmentId, print_on: Option<String>) {
        let backend = self.backend.clone();
        let id = shipment_id.clone();
        self.spawn(Operation::FetchLabel(shipment_id), async move {
            Outcome::LabelFetched {
                result: backend.fetch_label(&id).await,
                shipment_id: id,
                print_on,
            }
        });
    }

    fn print_on(&mut self, label_url: String, printer: String) {
        let spooler = self.spooler.clone();
        self.spawn(Operation::PrintLabel, async move {
            Outcome::LabelPrinted(spooler.print_label(&label_url, &printer).await)
        });
    }

    fn spawn<F>(&mut self, op: Operation, fut: F)
    where
        F: Future<Output = Outcome> + Send + 'static,
    {
        let id = self.requests.begin(op.clone());
        debug!(request = %id, op = %op, "Request started");
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = fut.await;
            // The receiver lives as long as the controller
            let _ = tx.send((id, outcome));
        });
    }

    // ========== Completions ==========

    /// Wait for the next backend completion
    pub async fn recv_completion(&mut self) -> Option<Completion> {
        self.rx.recv().await
    }

    /// Apply a completion; returns false when it was discarded as stale
    pub fn apply_completion(&mut self, id: RequestId, outcome: Outcome) -> bool {
        let op = outcome.operation();
        if !self.requests.finish(&op, id) {
            debug!(request = %id, op = %op, "Discarding stale response");
            return false;
        }
        debug!(request = %id, op = %op, "Request finished");

        for followup in self.screen.apply(outcome) {
            match followup {
                Followup::RefreshShipments => self.refresh_shipments(),
                Followup::Print { label_url, printer } => self.print_on(label_url, printer),
            }
        }
        true
    }

    /// Apply completions until nothing is in flight
    pub async fn settle(&mut self) {
        while self.requests.in_flight() > 0 {
            match self.rx.recv().await {
                Some((id, outcome)) => {
                    self.apply_completion(id, outcome);
                }
                None => break,
            }
        }
    }
}
