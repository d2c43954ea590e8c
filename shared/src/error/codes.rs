//! Unified error codes for the pack station
//!
//! This module defines all error codes used across hq-client, pack-printer
//! and pack-station. Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 4xxx: Order errors
//! - 5xxx: Shipping errors
//! - 6xxx: Printer errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and compatibility with the HQ error envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Token is invalid
    TokenInvalid = 1004,
    /// No signed-in user available
    UserNotSignedIn = 1008,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has already been completed
    OrderAlreadyCompleted = 4003,
    /// Order item not found
    OrderItemNotFound = 4006,
    /// Order is empty
    OrderEmpty = 4007,
    /// Order is locked by another user
    OrderLocked = 4008,
    /// Order still has unpacked items
    OrderNotPacked = 4009,

    // ==================== 5xxx: Shipping ====================
    /// Shipment not found
    ShipmentNotFound = 5001,
    /// Shipment has already been voided
    ShipmentAlreadyVoided = 5002,
    /// No active (non-voided) shipment for the order
    NoActiveShipment = 5003,
    /// Rate lookup failed
    RateUnavailable = 5101,
    /// Weight is required
    WeightRequired = 5102,
    /// Shipping box is required
    BoxRequired = 5103,
    /// Label purchase failed
    LabelPurchaseFailed = 5201,
    /// Label void failed
    LabelVoidFailed = 5202,
    /// A label purchase for this order is still outstanding
    LabelPurchasePending = 5203,
    /// Address is invalid
    AddressInvalid = 5301,

    // ==================== 6xxx: Printer ====================
    /// Printer not available
    PrinterNotAvailable = 6001,
    /// No printer selected
    PrinterNotSelected = 6002,
    /// Print operation failed
    PrintFailed = 6003,

    // ==================== 9xxx: System ====================
    /// Internal error
    InternalError = 9001,
    /// Configuration error
    ConfigError = 9002,
    /// Network error
    NetworkError = 9101,
    /// Request timed out
    TimeoutError = 9102,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this code represents success
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Required field is missing",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::UserNotSignedIn => "No user is signed in",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderAlreadyCompleted => "Order has already been completed",
            ErrorCode::OrderItemNotFound => "Order item not found",
            ErrorCode::OrderEmpty => "Order has no items",
            ErrorCode::OrderLocked => "Order is locked by another user",
            ErrorCode::OrderNotPacked => "Order still has unpacked items",

            // Shipping
            ErrorCode::ShipmentNotFound => "Shipment not found",
            ErrorCode::ShipmentAlreadyVoided => "Shipment has already been voided",
            ErrorCode::NoActiveShipment => "Order has no active shipment",
            ErrorCode::RateUnavailable => "Shipping rates are unavailable",
            ErrorCode::WeightRequired => "Order weight is required",
            ErrorCode::BoxRequired => "Shipping box is required",
            ErrorCode::LabelPurchaseFailed => "Label purchase failed",
            ErrorCode::LabelVoidFailed => "Label void failed",
            ErrorCode::LabelPurchasePending => "A label purchase is already in progress",
            ErrorCode::AddressInvalid => "Shipping address is invalid",

            // Printer
            ErrorCode::PrinterNotAvailable => "Printer is not available",
            ErrorCode::PrinterNotSelected => "No printer selected",
            ErrorCode::PrintFailed => "Print operation failed",

            // System
            ErrorCode::InternalError => "Internal error",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Request timed out",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            5 => Ok(ErrorCode::InvalidRequest),
            7 => Ok(ErrorCode::RequiredField),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1004 => Ok(ErrorCode::TokenInvalid),
            1008 => Ok(ErrorCode::UserNotSignedIn),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4003 => Ok(ErrorCode::OrderAlreadyCompleted),
            4006 => Ok(ErrorCode::OrderItemNotFound),
            4007 => Ok(ErrorCode::OrderEmpty),
            4008 => Ok(ErrorCode::OrderLocked),
            4009 => Ok(ErrorCode::OrderNotPacked),

            // Shipping
            5001 => Ok(ErrorCode::ShipmentNotFound),
            5002 => Ok(ErrorCode::ShipmentAlreadyVoided),
            5003 => Ok(ErrorCode::NoActiveShipment),
            5101 => Ok(ErrorCode::RateUnavailable),
            5102 => Ok(ErrorCode::WeightRequired),
            5103 => Ok(ErrorCode::BoxRequired),
            5201 => Ok(ErrorCode::LabelPurchaseFailed),
            5202 => Ok(ErrorCode::LabelVoidFailed),
            5203 => Ok(ErrorCode::LabelPurchasePending),
            5301 => Ok(ErrorCode::AddressInvalid),

            // Printer
            6001 => Ok(ErrorCode::PrinterNotAvailable),
            6002 => Ok(ErrorCode::PrinterNotSelected),
            6003 => Ok(ErrorCode::PrintFailed),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::ConfigError),
            9101 => Ok(ErrorCode::NetworkError),
            9102 => Ok(ErrorCode::TimeoutError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::OrderNotFound.code(), 4001);
        assert_eq!(ErrorCode::WeightRequired.code(), 5102);
        assert_eq!(ErrorCode::PrinterNotSelected.code(), 6002);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::Unknown.is_success());
        assert!(!ErrorCode::InternalError.is_success());
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(0), Ok(ErrorCode::Success));
        assert_eq!(ErrorCode::try_from(4008), Ok(ErrorCode::OrderLocked));
        assert_eq!(ErrorCode::try_from(5003), Ok(ErrorCode::NoActiveShipment));
        assert_eq!(ErrorCode::try_from(5203), Ok(ErrorCode::LabelPurchasePending));
        assert_eq!(ErrorCode::try_from(9102), Ok(ErrorCode::TimeoutError));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(7001), Err(InvalidErrorCode(7001)));
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_string(&ErrorCode::BoxRequired).unwrap();
        assert_eq!(json, "5103");
    }

    #[test]
    fn test_deserialize_invalid() {
        let result: Result<ErrorCode, _> = serde_json::from_str("4242");
        assert!(result.is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ErrorCode::PrintFailed), "6003");
    }
}
