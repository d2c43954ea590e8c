//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::OrderNotFound
            | Self::OrderItemNotFound
            | Self::ShipmentNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::OrderAlreadyCompleted
            | Self::OrderLocked
            | Self::ShipmentAlreadyVoided
            | Self::LabelPurchasePending => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated | Self::TokenInvalid | Self::UserNotSignedIn => {
                StatusCode::UNAUTHORIZED
            }

            // 502 Bad Gateway (carrier side failures)
            Self::RateUnavailable | Self::LabelPurchaseFailed | Self::LabelVoidFailed => {
                StatusCode::BAD_GATEWAY
            }

            // 503 Service Unavailable (transient errors, client can retry)
            Self::NetworkError | Self::TimeoutError => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::Unknown
            | Self::InternalError
            | Self::ConfigError
            | Self::PrinterNotAvailable
            | Self::PrintFailed => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Best-effort mapping from an HTTP status returned by HQ
    pub fn from_http_status(status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Self::NotAuthenticated,
            StatusCode::NOT_FOUND => Self::NotFound,
            StatusCode::CONFLICT => Self::OrderLocked,
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Self::ValidationFailed,
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => Self::TimeoutError,
            StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE => Self::NetworkError,
            _ => Self::InternalError,
        }
    }
}
