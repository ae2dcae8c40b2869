//! Service Call Model
//!
//! A call is binary: active until staff dismiss it or the table is settled.
//! Calls are deactivated, never deleted.

use serde::{Deserialize, Serialize};

/// What the customer is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum CallType {
    Waiter,
    Bill,
}

impl CallType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Waiter => "waiter",
            Self::Bill => "bill",
        }
    }
}

/// Service call entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Call {
    pub id: i64,
    pub store_id: i64,
    pub table_no: String,
    pub call_type: CallType,
    pub active: bool,
    pub created_at: i64,
}

/// Customer call submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallCreate {
    pub table_no: String,
    pub call_type: CallType,
}

/// Result of a dismiss request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DismissOutcome {
    pub call: Call,
    /// false when the call was already inactive
    pub changed: bool,
}
