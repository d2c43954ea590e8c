//! Configured label printers
//!
//! The station knows its printers from configuration, written as a comma
//! separated list of `name=address` entries. A trailing `*` on the name marks
//! the default printer:
//!
//! ```text
//! Zebra-1*=192.168.1.50:9100,Zebra-2=192.168.1.51
//! ```

use crate::error::{PrintError, PrintResult};
use crate::printer::NetworkPrinter;
use shared::models::PrinterInfo;

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    is_default: bool,
    printer: NetworkPrinter,
}

/// Named printers available to this station
#[derive(Debug, Clone, Default)]
pub struct PrinterRegistry {
    entries: Vec<Entry>,
}

impl PrinterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `name=address` list
    pub fn parse(list: &str) -> PrintResult<Self> {
        let mut registry = Self::new();
        for raw in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (name, addr) = raw.split_once('=').ok_or_else(|| {
                PrintError::InvalidConfig(format!("Expected name=address, got '{}'", raw))
            })?;
            let name = name.trim();
            let (name, is_default) = match name.strip_suffix('*') {
                Some(n) => (n.trim(), true),
                None => (name, false),
            };
            registry.add(name, NetworkPrinter::from_addr(addr.trim())?, is_default)?;
        }
        Ok(registry)
    }

    /// Register a printer; at most one printer may be the default
    pub fn add(
        &mut self,
        name: impl Into<String>,
        printer: NetworkPrinter,
        is_default: bool,
    ) -> PrintResult<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(PrintError::InvalidConfig("Printer name is empty".into()));
        }
        if self.entries.iter().any(|e| e.name == name) {
            return Err(PrintError::InvalidConfig(format!(
                "Duplicate printer name: {}",
                name
            )));
        }
        if is_default && self.entries.iter().any(|e| e.is_default) {
            return Err(PrintError::InvalidConfig(format!(
                "More than one default printer ({})",
                name
            )));
        }
        self.entries.push(Entry {
            name,
            is_default,
            printer,
        });
        Ok(())
    }

    pub fn get(&self, name: &str) -> PrintResult<&NetworkPrinter> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| &e.printer)
            .ok_or_else(|| PrintError::NotFound(name.to_string()))
    }

    /// Printer list in configuration order with the default flag
    pub fn list(&self) -> Vec<PrinterInfo> {
        self.entries
            .iter()
            .map(|e| PrinterInfo::new(e.name.clone(), e.is_default))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
