//! Printer descriptor

use serde::{Deserialize, Serialize};

/// A printer reported by the local print subsystem
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrinterInfo {
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
}

impl PrinterInfo {
    pub fn new(name: impl Into<String>, is_default: bool) -> Self {
        Self {
            name: name.into(),
            is_default,
        }
    }
}

/// Pick the printer flagged as default, falling back to the first one
pub fn default_printer(printers: &[PrinterInfo]) -> Option<&PrinterInfo> {
    printers
        .iter()
        .find(|p| p.is_default)
        .or_else(|| printers.first())
}
