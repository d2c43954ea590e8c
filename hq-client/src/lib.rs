//! HQ Client - HTTP client for the order and shipping backend
//!
//! Provides the network implementation of [`shared::OrderBackend`].

pub mod config;
pub mod error;
pub mod hq;
pub mod http;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use hq::HqClient;
pub use http::HttpClient;
