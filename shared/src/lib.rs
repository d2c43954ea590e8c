//! Shared types for the pack station
//!
//! Domain models consumed from HQ, the unified error system, and the
//! capability traits the station is written against.

pub mod backend;
pub mod error;
pub mod models;

// Re-exports
pub use backend::{OrderBackend, PrintSpooler};
pub use error::{AppError, AppResult, ErrorCode};
pub use serde::{Deserialize, Serialize};
