//! # pack-printer
//!
//! Label printing for the pack station - delivery only.
//!
//! ## Scope
//!
//! This crate handles HOW a label reaches paper:
//! - Printer registry (names, default flag, addresses)
//! - Network printing (TCP port 9100)
//! - Downloading purchased labels by URL
//!
//! WHAT gets printed (which shipment, which printer) is decided by the
//! order-review screen in pack-station.
//!
//! ## Example
//!
//! ```ignore
//! use pack_printer::{LabelSpooler, PrinterRegistry};
//!
//! let registry = PrinterRegistry::parse("Zebra-1*=192.168.1.50:9100")?;
//! let spooler = LabelSpooler::new(registry)?;
//! spooler.spool("https://labels.example.com/1Z999.zpl", "Zebra-1").await?;
//! ```

mod error;
mod printer;
mod registry;
mod spooler;

// Re-exports
pub use error::{PrintError, PrintResult};
pub use printer::{NetworkPrinter, Printer, RAW_PORT};
pub use registry::PrinterRegistry;
pub use spooler::LabelSpooler;
