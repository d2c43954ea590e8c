//! Order review screen state
//!
//! [`OrderScreen`] owns everything the packer sees for one order. It never
//! talks to the network itself: the controller issues requests and feeds the
//! results back through [`OrderScreen::apply`].

use super::requests::Operation;
use crate::gating::Gates;
use crate::pack::PackState;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    Address, BoxId, ItemId, Label, LabelPurchase, MethodSelection, Order, OrderId, PrinterInfo,
    ProviderRates, RateQuery, Shipment, ShipmentId, ShippingBox, ShippingRate, UserId, Weight,
    default_printer, group_by_provider, suggested_box,
};
use tracing::{debug, warn};

/// Independently reported error areas of the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorScope {
    Order,
    ShippingForm,
    Rates,
    Printing,
}

#[derive(Debug, Clone, Default)]
pub struct ScreenErrors {
    order: Option<AppError>,
    shipping_form: Option<AppError>,
    rates: Option<AppError>,
    printing: Option<AppError>,
}

impl ScreenErrors {
    fn slot(&mut self, scope: ErrorScope) -> &mut Option<AppError> {
        match scope {
            ErrorScope::Order => &mut self.order,
            ErrorScope::ShippingForm => &mut self.shipping_form,
            ErrorScope::Rates => &mut self.rates,
            ErrorScope::Printing => &mut self.printing,
        }
    }

    pub fn get(&self, scope: ErrorScope) -> Option<&AppError> {
        match scope {
            ErrorScope::Order => self.order.as_ref(),
            ErrorScope::ShippingForm => self.shipping_form.as_ref(),
            ErrorScope::Rates => self.rates.as_ref(),
            ErrorScope::Printing => self.printing.as_ref(),
        }
    }

    pub fn message(&self, scope: ErrorScope) -> Option<&str> {
        self.get(scope).map(|e| e.message.as_str())
    }

    pub fn set(&mut self, scope: ErrorScope, err: AppError) {
        warn!(scope = ?scope, code = %err.code, message = %err.message, "Screen error");
        *self.slot(scope) = Some(err);
    }

    pub fn clear(&mut self, scope: ErrorScope) {
        *self.slot(scope) = None;
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_none()
            && self.shipping_form.is_none()
            && self.rates.is_none()
            && self.printing.is_none()
    }
}

/// Result of a backend call, tagged with what it answers
#[derive(Debug)]
pub enum Outcome {
    OrderLoaded(AppResult<Order>),
    ShipmentsLoaded(AppResult<Vec<Shipment>>),
    PrintersLoaded(AppResult<Vec<PrinterInfo>>),
    RatesLoaded(AppResult<Vec<ShippingRate>>),
    AddressUpdated(AppResult<Order>),
    MethodUpdated(AppResult<Order>),
    /// A new label; `print_on` names the printer when printing was requested
    LabelPurchased {
        result: AppResult<Label>,
        print_on: Option<String>,
    },
    LabelFetched {
        shipment_id: ShipmentId,
        result: AppResult<Label>,
        print_on: Option<String>,
    },
    LabelVoided {
        shipment_id: ShipmentId,
        result: AppResult<()>,
    },
    LabelPrinted(AppResult<()>),
    OrderCompleted(AppResult<()>),
    OrderUnlocked(AppResult<()>),
}

impl Outcome {
    pub fn operation(&self) -> Operation {
        match self {
            Outcome::OrderLoaded(_) => Operation::LoadOrder,
            Outcome::ShipmentsLoaded(_) => Operation::Shipments,
            Outcome::PrintersLoaded(_) => Operation::Printers,
            Outcome::RatesLoaded(_) => Operation::Rates,
            Outcome::AddressUpdated(_) => Operation::Address,
            Outcome::MethodUpdated(_) => Operation::Method,
            Outcome::LabelPurchased { .. } => Operation::PurchaseLabel,
            Outcome::LabelFetched { shipment_id, .. } => {
                Operation::FetchLabel(shipment_id.clone())
            }
            Outcome::LabelVoided { shipment_id, .. } => Operation::VoidLabel(shipment_id.clone()),
            Outcome::LabelPrinted(_) => Operation::PrintLabel,
            Outcome::OrderCompleted(_) => Operation::CompleteOrder,
            Outcome::OrderUnlocked(_) => Operation::Unlock,
        }
    }
}

/// Work the controller must start after an outcome is applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Followup {
    RefreshShipments,
    Print { label_url: String, printer: String },
}

/// How Print Label will be satisfied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintPlan {
    /// Reprint the label of an existing active shipment
    Existing {
        shipment_id: ShipmentId,
        printer: String,
    },
    /// No active shipment yet: buy a label, then print it
    Purchase {
        request: LabelPurchase,
        printer: String,
    },
}

#[derive(Debug)]
pub struct OrderScreen {
    order_id: OrderId,
    user_id: Option<UserId>,
    order: Option<Order>,
    pack: PackState,
    pack_initialized: bool,
    shipments: Vec<Shipment>,
    boxes: Vec<ShippingBox>,
    printers: Vec<PrinterInfo>,
    selected_printer: Option<String>,
    selected_box: Option<BoxId>,
    weight: Option<Weight>,
    rates: Vec<ProviderRates>,
    last_label: Option<Label>,
    completed: bool,
    unlocked: bool,
    errors: ScreenErrors,
}

impl OrderScreen {
    pub fn new(order_id: OrderId, user_id: Option<UserId>) -> Self {
        Self {
            order_id,
            user_id,
            order: None,
            pack: PackState::default(),
            pack_initialized: false,
            shipments: Vec::new(),
            boxes: Vec::new(),
            printers: Vec::new(),
            selected_printer: None,
            selected_box: None,
            weight: None,
            rates: Vec::new(),
            last_label: None,
            completed: false,
            unlocked: false,
            errors: ScreenErrors::default(),
        }
    }

    // ========== Accessors ==========

    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    pub fn order(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    pub fn pack(&self) -> &PackState {
        &self.pack
    }

    pub fn shipments(&self) -> &[Shipment] {
        &self.shipments
    }

    pub fn boxes(&self) -> &[ShippingBox] {
        &self.boxes
    }

    pub fn printers(&self) -> &[PrinterInfo] {
        &self.printers
    }

    pub fn selected_printer(&self) -> Option<&str> {
        self.selected_printer.as_deref()
    }

    pub fn selected_box(&self) -> Option<&BoxId> {
        self.selected_box.as_ref()
    }

    pub fn weight(&self) -> Option<Weight> {
        self.weight
    }

    pub fn rates(&self) -> &[ProviderRates] {
        &self.rates
    }

    pub fn last_label(&self) -> Option<&Label> {
        self.last_label.as_ref()
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn errors(&self) -> &ScreenErrors {
        &self.errors
    }

    pub fn errors_mut(&mut self) -> &mut ScreenErrors {
        &mut self.errors
    }

    pub fn gates(&self) -> Gates {
        Gates::evaluate(
            self.selected_printer.is_some(),
            self.pack.remaining(),
            &self.shipments,
        )
    }

    /// First shipment that has not been voided
    pub fn active_shipment(&self) -> Option<&Shipment> {
        self.shipments.iter().find(|s| s.is_active())
    }

    // ========== Local mutations ==========

    pub fn apply_scan(&mut self, code: &str) {
        let next = self.pack.apply_scan(code);
        if next.same_snapshot(&self.pack) {
            debug!(code, "Scan matched no item");
            return;
        }
        self.pack = next;
    }

    pub fn pack_item(&mut self, item_id: &ItemId) {
        self.pack = self.pack.pack(item_id);
    }

    pub fn unpack_item(&mut self, item_id: &ItemId) {
        self.pack = self.pack.unpack(item_id);
    }

    pub fn select_printer(&mut self, name: &str) -> AppResult<()> {
        if !self.printers.iter().any(|p| p.name == name) {
            let err = AppError::with_message(
                ErrorCode::PrinterNotAvailable,
                format!("Printer '{}' is not available", name),
            );
            self.errors.set(ErrorScope::Printing, err.clone());
            return Err(err);
        }
        self.selected_printer = Some(name.to_string());
        self.errors.clear(ErrorScope::Printing);
        Ok(())
    }

    pub fn clear_printer(&mut self) {
        self.selected_printer = None;
    }

    pub fn select_box(&mut self, box_id: BoxId) -> AppResult<()> {
        if !self.boxes.iter().any(|b| b.id == box_id) {
            let err = AppError::not_found(format!("Box {}", box_id));
            self.errors.set(ErrorScope::ShippingForm, err.clone());
            return Err(err);
        }
        self.selected_box = Some(box_id);
        Ok(())
    }

    pub fn set_weight(&mut self, value: Decimal) -> AppResult<()> {
        match Weight::pounds(value) {
            Ok(weight) => {
                self.weight = Some(weight);
                self.errors.clear(ErrorScope::ShippingForm);
                Ok(())
            }
            Err(err) => {
                self.errors.set(ErrorScope::ShippingForm, err.clone());
                Err(err)
            }
        }
    }

    // ========== Request validation ==========
    //
    // Each check runs before any network call. On failure the error is
    // recorded in the scope the operation reports into.

    pub fn rate_query(&mut self) -> AppResult<RateQuery> {
        self.errors.clear(ErrorScope::Rates);
        let query = self.require_weight_and_box().map(|(weight, box_id)| RateQuery {
            order_id: self.order_id.clone(),
            weight,
            box_id,
        });
        self.report(ErrorScope::Rates, query)
    }

    pub fn label_purchase(&mut self) -> AppResult<LabelPurchase> {
        let request = self.build_label_purchase();
        self.report(ErrorScope::Order, request)
    }

    pub fn address_update(&mut self, address: &Address) -> AppResult<()> {
        self.errors.clear(ErrorScope::ShippingForm);
        let checked = address.validate();
        self.report(ErrorScope::ShippingForm, checked)
    }

    pub fn method_update(&mut self, selection: &MethodSelection) -> AppResult<()> {
        self.errors.clear(ErrorScope::Rates);
        let checked = if selection.carrier.trim().is_empty() {
            Err(AppError::required("carrier"))
        } else if selection.service.trim().is_empty() {
            Err(AppError::required("service"))
        } else {
            Ok(())
        };
        self.report(ErrorScope::Rates, checked)
    }

    /// Decide how Print Label proceeds, enforcing its gate
    pub fn print_plan(&mut self) -> AppResult<PrintPlan> {
        self.errors.clear(ErrorScope::Printing);
        let printer = match self.selected_printer.clone() {
            Some(p) => p,
            None => {
                let err = AppError::new(ErrorCode::PrinterNotSelected);
                return self.report(ErrorScope::Printing, Err(err));
            }
        };
        if !self.pack.is_complete() {
            let err = AppError::new(ErrorCode::OrderNotPacked)
                .with_detail("remaining", self.pack.remaining());
            return self.report(ErrorScope::Printing, Err(err));
        }

        if let Some(active) = self.active_shipment() {
            return Ok(PrintPlan::Existing {
                shipment_id: active.id.clone(),
                printer,
            });
        }
        let request = self.label_purchase()?;
        Ok(PrintPlan::Purchase { request, printer })
    }

    /// Enforce the Complete Order gate
    pub fn completion(&mut self) -> AppResult<UserId> {
        let checked = if !self.pack.is_complete() {
            Err(AppError::new(ErrorCode::OrderNotPacked)
                .with_detail("remaining", self.pack.remaining()))
        } else if !self.gates().complete_order {
            Err(AppError::new(ErrorCode::NoActiveShipment))
        } else {
            self.require_user()
        };
        self.report(ErrorScope::Order, checked)
    }

    pub fn unlock_user(&mut self) -> AppResult<UserId> {
        let user = self.require_user();
        self.report(ErrorScope::Order, user)
    }

    fn build_label_purchase(&self) -> AppResult<LabelPurchase> {
        let (weight, box_id) = self.require_weight_and_box()?;
        let user_id = self.require_user()?;
        Ok(LabelPurchase {
            order_id: self.order_id.clone(),
            weight,
            box_id,
            user_id,
        })
    }

    fn require_weight_and_box(&self) -> AppResult<(Weight, BoxId)> {
        let weight = self
            .weight
            .ok_or_else(|| AppError::new(ErrorCode::WeightRequired))?;
        let box_id = self
            .selected_box
            .clone()
            .ok_or_else(|| AppError::new(ErrorCode::BoxRequired))?;
        Ok((weight, box_id))
    }

    fn require_user(&self) -> AppResult<UserId> {
        self.user_id
            .clone()
            .ok_or_else(|| AppError::new(ErrorCode::UserNotSignedIn))
    }

    fn report<T>(&mut self, scope: ErrorScope, result: AppResult<T>) -> AppResult<T> {
        if let Err(err) = &result {
            self.errors.set(scope, err.clone());
        }
        result
    }

    // ========== Outcomes ==========

    /// Fold a backend result into the screen
    pub fn apply(&mut self, outcome: Outcome) -> Vec<Followup> {
        let mut followups = Vec::new();
        match outcome {
            Outcome::OrderLoaded(Ok(order)) => {
                self.errors.clear(ErrorScope::Order);
                self.set_order(order);
            }
            Outcome::OrderLoaded(Err(err)) => self.errors.set(ErrorScope::Order, err),

            Outcome::ShipmentsLoaded(Ok(shipments)) => self.shipments = shipments,
            Outcome::ShipmentsLoaded(Err(err)) => self.errors.set(ErrorScope::Order, err),

            Outcome::PrintersLoaded(Ok(printers)) => {
                if self.selected_printer.is_none() {
                    self.selected_printer = default_printer(&printers).map(|p| p.name.clone());
                }
                self.printers = printers;
            }
            Outcome::PrintersLoaded(Err(err)) => self.errors.set(ErrorScope::Printing, err),

            Outcome::RatesLoaded(Ok(rates)) => {
                if rates.is_empty() {
                    self.errors
                        .set(ErrorScope::Rates, AppError::new(ErrorCode::RateUnavailable));
                }
                self.rates = group_by_provider(rates);
            }
            Outcome::RatesLoaded(Err(err)) => {
                self.rates.clear();
                self.errors.set(ErrorScope::Rates, err);
            }

            Outcome::AddressUpdated(Ok(order)) => self.set_order(order),
            Outcome::AddressUpdated(Err(err)) => self.errors.set(ErrorScope::ShippingForm, err),

            Outcome::MethodUpdated(Ok(order)) => self.set_order(order),
            Outcome::MethodUpdated(Err(err)) => self.errors.set(ErrorScope::Rates, err),

            Outcome::LabelPurchased { result, print_on } => {
                match result {
                    Ok(label) => {
                        if let Some(printer) = print_on {
                            followups.push(Followup::Print {
                                label_url: label.label_url.clone(),
                                printer,
                            });
                        }
                        self.last_label = Some(label);
                    }
                    Err(err) => self.errors.set(ErrorScope::Order, err),
                }
                // Even a failed purchase may have created a shipment upstream
                followups.push(Followup::RefreshShipments);
            }

            Outcome::LabelFetched {
                shipment_id,
                result,
                print_on,
            } => match result {
                Ok(mut label) => {
                    label.shipment_id.get_or_insert(shipment_id);
                    if let Some(printer) = print_on {
                        followups.push(Followup::Print {
                            label_url: label.label_url.clone(),
                            printer,
                        });
                    }
                    self.last_label = Some(label);
                }
                Err(err) => self.errors.set(ErrorScope::Order, err),
            },

            Outcome::LabelVoided {
                shipment_id,
                result,
            } => {
                match result {
                    Ok(()) => {
                        if self
                            .last_label
                            .as_ref()
                            .is_some_and(|l| l.shipment_id.as_ref() == Some(&shipment_id))
                        {
                            self.last_label = None;
                        }
                    }
                    Err(err) => self.errors.set(ErrorScope::Order, err),
                }
                followups.push(Followup::RefreshShipments);
            }

            Outcome::LabelPrinted(Ok(())) => self.errors.clear(ErrorScope::Printing),
            Outcome::LabelPrinted(Err(err)) => self.errors.set(ErrorScope::Printing, err),

            Outcome::OrderCompleted(Ok(())) => self.completed = true,
            Outcome::OrderCompleted(Err(err)) => self.errors.set(ErrorScope::Order, err),

            Outcome::OrderUnlocked(Ok(())) => self.unlocked = true,
            Outcome::OrderUnlocked(Err(err)) => self.errors.set(ErrorScope::Order, err),
        }
        followups
    }

    /// Replace the order; pack state is built from the first order only
    ///
    /// The box list follows the order. An empty box or weight field is
    /// prefilled from HQ's suggested box and estimated weight; a packer's
    /// own choice is kept.
    fn set_order(&mut self, order: Order) {
        if !self.pack_initialized {
            self.pack = PackState::from_items(&order.items);
            self.pack_initialized = true;
        }

        if let Some(selected) = &self.selected_box
            && !order.boxes.iter().any(|b| &b.id == selected)
        {
            self.selected_box = None;
        }
        if self.selected_box.is_none() {
            self.selected_box = suggested_box(&order.boxes).map(|b| b.id.clone());
        }
        self.boxes = order.boxes.clone();

        if self.weight.is_none()
            && let Some(estimate) = order.estimated_weight
        {
            match Weight::pounds(estimate) {
                Ok(weight) => self.weight = Some(weight),
                Err(_) => debug!(%estimate, "Ignoring unusable weight estimate"),
            }
        }

        self.order = Some(order);
    }

    pub fn snapshot(&self) -> ScreenSnapshot {
        let items = self
            .pack
            .entries()
            .iter()
            .map(|entry| {
                let item = self.order.as_ref().and_then(|o| o.item(&entry.item_id));
                ItemView {
                    id: entry.item_id.clone(),
                    name: item.map(|i| i.name.clone()).unwrap_or_default(),
                    sku: item.and_then(|i| i.sku.clone()),
                    quantity: item.map(|i| i.quantity).unwrap_or(0),
                    packed: entry.packed,
                }
            })
            .collect();

        ScreenSnapshot {
            order_id: self.order_id.clone(),
            reference: self.order.as_ref().map(|o| o.reference().to_string()),
            ship_to: self.order.as_ref().and_then(|o| o.ship_to.clone()),
            carrier: self.order.as_ref().and_then(|o| o.carrier.clone()),
            service: self.order.as_ref().and_then(|o| o.service.clone()),
            items,
            remaining: self.pack.remaining(),
            shipments: self.shipments.clone(),
            printers: self.printers.clone(),
            selected_printer: self.selected_printer.clone(),
            boxes: self.boxes.clone(),
            selected_box: self.selected_box.clone(),
            weight: self.weight,
            rates: self.rates.clone(),
            last_label_url: self.last_label.as_ref().map(|l| l.label_url.clone()),
            gates: self.gates(),
            errors: ErrorView::from(&self.errors),
            completed: self.completed,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemView {
    pub id: ItemId,
    pub name: String,
    pub sku: Option<String>,
    pub quantity: u32,
    pub packed: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ErrorView {
    pub order: Option<String>,
    pub shipping_form: Option<String>,
    pub rates: Option<String>,
    pub printing: Option<String>,
}

impl From<&ScreenErrors> for ErrorView {
    fn from(errors: &ScreenErrors) -> Self {
        let msg = |scope: ErrorScope| errors.message(scope).map(str::to_string);
        Self {
            order: msg(ErrorScope::Order),
            shipping_form: msg(ErrorScope::ShippingForm),
            rates: msg(ErrorScope::Rates),
            printing: msg(ErrorScope::Printing),
        }
    }
}

/// Read-only view of the screen for rendering
#[derive(Debug, Clone, Serialize)]
pub struct ScreenSnapshot {
    pub order_id: OrderId,
    pub reference: Option<String>,
    pub ship_to: Option<Address>,
    pub carrier: Option<String>,
    pub service: Option<String>,
    pub items: Vec<ItemView>,
    pub remaining: usize,
    pub shipments: Vec<Shipment>,
    pub printers: Vec<PrinterInfo>,
    pub selected_printer: Option<String>,
    pub boxes: Vec<ShippingBox>,
    pub selected_box: Option<BoxId>,
    pub weight: Option<Weight>,
    pub rates: Vec<ProviderRates>,
    pub last_label_url: Option<String>,
    pub gates: Gates,
    pub errors: ErrorView,
    pub completed: bool,
}
