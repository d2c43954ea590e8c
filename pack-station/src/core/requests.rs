//! Request bookkeeping for overlapping backend calls
//!
//! Each operation kind remembers the id of its most recent request. A
//! completion carrying an older id lost the race and must not overwrite
//! newer state.

use shared::models::ShipmentId;
use std::collections::HashMap;
use std::fmt;

/// Kind of backend call the screen issues
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operation {
    LoadOrder,
    Shipments,
    Printers,
    Rates,
    Address,
    Method,
    PurchaseLabel,
    FetchLabel(ShipmentId),
    VoidLabel(ShipmentId),
    PrintLabel,
    CompleteOrder,
    Unlock,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::LoadOrder => f.write_str("load_order"),
            Operation::Shipments => f.write_str("shipments"),
            Operation::Printers => f.write_str("printers"),
            Operation::Rates => f.write_str("rates"),
            Operation::Address => f.write_str("address"),
            Operation::Method => f.write_str("method"),
            Operation::PurchaseLabel => f.write_str("purchase_label"),
            Operation::FetchLabel(id) => write!(f, "fetch_label({})", id),
            Operation::VoidLabel(id) => write!(f, "void_label({})", id),
            Operation::PrintLabel => f.write_str("print_label"),
            Operation::CompleteOrder => f.write_str("complete_order"),
            Operation::Unlock => f.write_str("unlock"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Default)]
pub struct RequestTracker {
    next: u64,
    latest: HashMap<Operation, RequestId>,
    pending: HashMap<Operation, usize>,
    in_flight: usize,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new id for `op`, superseding any earlier request of the same kind
    pub fn begin(&mut self, op: Operation) -> RequestId {
        self.next += 1;
        let id = RequestId(self.next);
        *self.pending.entry(op.clone()).or_default() += 1;
        self.latest.insert(op, id);
        self.in_flight += 1;
        id
    }

    /// Record a completion; returns false when the result is stale
    pub fn finish(&mut self, op: &Operation, id: RequestId) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);
        if let Some(count) = self.pending.get_mut(op) {
            *count -= 1;
            if *count == 0 {
                self.pending.remove(op);
            }
        }
        self.is_current(op, id)
    }

    /// Whether a request of this kind is still outstanding
    pub fn is_pending(&self, op: &Operation) -> bool {
        self.pending.contains_key(op)
    }

    pub fn is_current(&self, op: &Operation, id: RequestId) -> bool {
        self.latest.get(op) == Some(&id)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}
