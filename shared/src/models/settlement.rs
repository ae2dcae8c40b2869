//! Table settlement result

use serde::{Deserialize, Serialize};

/// What a successful settlement changed
///
/// Both lists are empty when the table had nothing left to settle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettlementReport {
    pub table_no: String,
    /// Orders moved to `paid`
    pub settled_orders: Vec<i64>,
    /// Calls deactivated
    pub dismissed_calls: Vec<i64>,
}

impl SettlementReport {
    pub fn is_empty(&self) -> bool {
        self.settled_orders.is_empty() && self.dismissed_calls.is_empty()
    }
}
