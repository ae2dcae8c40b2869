//! Dining Table Model
//!
//! A table is addressed by a human-assigned number and reached through an
//! opaque rotating QR token. Rotation replaces the token in place, so every
//! previously printed code stops resolving at once.

use super::product::Product;
use super::store::Store;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Dining table entity (桌台)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DiningTable {
    pub store_id: i64,
    pub table_no: String,
    pub qr_token: String,
}

/// Table with the customer entry URL encoded in its QR code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableEntry {
    pub table_no: String,
    pub qr_token: String,
    pub url: String,
}

/// Regenerate tokens for tables `1..=count`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RotateTables {
    pub count: u32,
}

/// Query parameters of the customer entry URL
///
/// `t` is the QR token; `table` is the legacy raw table number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryParams {
    pub t: Option<String>,
    pub table: Option<String>,
}

/// How much the session knows about its table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TableAccess {
    /// Token matched a live table
    Resolved { table_no: String },
    /// Raw `?table=` number accepted without a token (degraded trust)
    Legacy { table_no: String },
    /// Menu browsable, ordering and calls disabled
    Unresolved { reason: String },
}

impl TableAccess {
    /// Table number the session may order for
    pub fn table_no(&self) -> Option<&str> {
        match self {
            Self::Resolved { table_no } | Self::Legacy { table_no } => Some(table_no.as_str()),
            Self::Unresolved { .. } => None,
        }
    }

    pub fn can_order(&self) -> bool {
        self.table_no().is_some()
    }
}

/// Everything a customer session receives on entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuEntry {
    pub store: Store,
    pub products: Vec<Product>,
    pub table: TableAccess,
}

/// Order table numbers numerically when both parse, otherwise text order
///
/// Numeric labels sort before free-text ones ("2" < "10" < "Bar").
pub fn compare_table_no(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<u64>(), b.trim().parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Customer entry URL printed into a table's QR code
pub fn entry_url(base_url: &str, slug: &str, token: &str) -> String {
    format!("{}/{}?t={}", base_url.trim_end_matches('/'), slug, token)
}
