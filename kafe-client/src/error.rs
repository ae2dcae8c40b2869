//! Client error types

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-zero error code
    #[error("{message}")]
    Api {
        code: ErrorCode,
        message: String,
        details: Option<std::collections::HashMap<String, serde_json::Value>>,
    },

    /// Base URL cannot carry API paths
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Local file error (cart persistence)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Live feed transport error
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Session has no table, ordering and calls are disabled
    #[error("{0}")]
    NotResolved(String),

    /// Table settlement did not complete; nothing was changed
    #[error("Settlement of table {table_no} failed: {reason}")]
    SettlementFailed { table_no: String, reason: String },
}

impl ClientError {
    /// Session without a table: ask the customer to re-scan
    pub fn not_resolved() -> Self {
        Self::NotResolved(ErrorCode::TableNotResolved.message().to_string())
    }

    /// Error code carried by the server, if any
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Api { code, .. } => Some(*code),
            Self::NotResolved(_) => Some(ErrorCode::TableNotResolved),
            Self::SettlementFailed { .. } => Some(ErrorCode::TableSettlementFailed),
            _ => None,
        }
    }

    /// Whether repeating the same request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::WebSocket(_) | Self::SettlementFailed { .. } => true,
            Self::Api { details, .. } => details
                .as_ref()
                .and_then(|d| d.get("retryable"))
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
            _ => false,
        }
    }
}

impl From<AppError> for ClientError {
    fn from(err: AppError) -> Self {
        if err.code == ErrorCode::TableSettlementFailed {
            let table_no = err
                .detail("table_no")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            return Self::SettlementFailed {
                table_no,
                reason: err.message,
            };
        }
        Self::Api {
            code: err.code,
            message: err.message,
            details: err.details,
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for ClientError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::WebSocket(err.to_string())
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settlement_error_is_typed() {
        let err: ClientError = AppError::settlement_failed("4", "database is locked").into();
        match &err {
            ClientError::SettlementFailed { table_no, reason } => {
                assert_eq!(table_no, "4");
                assert!(reason.contains("database is locked"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(err.is_retryable());
        assert_eq!(err.code(), Some(ErrorCode::TableSettlementFailed));
    }

    #[test]
    fn test_api_error_keeps_code() {
        let err: ClientError = AppError::new(ErrorCode::OrderEmpty).into();
        assert_eq!(err.code(), Some(ErrorCode::OrderEmpty));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_not_resolved_message_asks_for_rescan() {
        let err = ClientError::not_resolved();
        assert!(err.to_string().contains("scan"));
    }
}
