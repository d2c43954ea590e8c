//! Action gating derived from screen state

use serde::Serialize;
use shared::models::{Shipment, has_active_shipment};

/// Print Label needs a printer and a fully packed order
pub fn can_print_label(printer_selected: bool, unpacked: usize) -> bool {
    printer_selected && unpacked == 0
}

/// Complete Order needs a fully packed order and a live label
pub fn can_complete_order(unpacked: usize, shipments: &[Shipment]) -> bool {
    unpacked == 0 && has_active_shipment(shipments)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Gates {
    pub print_label: bool,
    pub complete_order: bool,
}

impl Gates {
    pub fn evaluate(printer_selected: bool, unpacked: usize, shipments: &[Shipment]) -> Self {
        Self {
            print_label: can_print_label(printer_selected, unpacked),
            complete_order: can_complete_order(unpacked, shipments),
        }
    }
}
