//! Data models
//!
//! Shapes consumed from HQ and the print subsystem. Every id is a
//! canonical string newtype (see [`id`]).

pub mod address;
pub mod id;
pub mod order;
pub mod package;
pub mod printer;
pub mod rate;
pub mod shipment;

// Re-exports
pub use address::*;
pub use id::*;
pub use order::*;
pub use package::*;
pub use printer::*;
pub use rate::*;
pub use shipment::*;
