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
            | Self::StoreNotFound
            | Self::OrderNotFound
            | Self::ProductNotFound
            | Self::TableNotFound
            | Self::CallNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists | Self::StoreSlugExists | Self::OrderAlreadyPaid => {
                StatusCode::CONFLICT
            }

            // 403 Forbidden: the session holds no table it may order for
            Self::TableTokenInvalid | Self::TableNotResolved => StatusCode::FORBIDDEN,

            // 422 Unprocessable Entity: well-formed but rejected by lifecycle rules
            Self::OrderInvalidTransition | Self::OrderTotalMismatch => {
                StatusCode::UNPROCESSABLE_ENTITY
            }

            // 503 Service Unavailable (transient errors, client can retry)
            Self::NetworkError | Self::TimeoutError | Self::TableSettlementFailed => {
                StatusCode::SERVICE_UNAVAILABLE
            }

            // 500 Internal Server Error
            Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::ClientDisconnected
            | Self::Unknown => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
