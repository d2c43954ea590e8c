//! Order review screen
//!
//! - OrderScreen: screen state and error scopes
//! - ScreenController: issues backend calls and applies their outcomes
//! - RequestTracker: drops responses superseded by a newer request

pub mod controller;
pub mod requests;
pub mod screen;

pub use controller::ScreenController;
pub use requests::{Operation, RequestId, RequestTracker};
pub use screen::{
    ErrorScope, ErrorView, Followup, ItemView, OrderScreen, Outcome, PrintPlan, ScreenErrors,
    ScreenSnapshot,
};
