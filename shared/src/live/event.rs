//! Change events

use crate::models::{Call, Order, Store};
use serde::{Deserialize, Serialize};

/// One change to a record in the central store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeEvent {
    OrderInserted { order: Order },
    OrderUpdated { order: Order },
    OrderDeleted { id: i64, store_id: i64, table_no: String },
    CallInserted { call: Call },
    CallUpdated { call: Call },
    StoreUpdated { store: Store },
}

impl ChangeEvent {
    /// Store the changed record belongs to
    pub fn store_id(&self) -> i64 {
        match self {
            Self::OrderInserted { order } | Self::OrderUpdated { order } => order.store_id,
            Self::OrderDeleted { store_id, .. } => *store_id,
            Self::CallInserted { call } | Self::CallUpdated { call } => call.store_id,
            Self::StoreUpdated { store } => store.id,
        }
    }

    /// Table the changed record belongs to, `None` for store records
    pub fn table_no(&self) -> Option<&str> {
        match self {
            Self::OrderInserted { order } | Self::OrderUpdated { order } => {
                Some(order.table_no.as_str())
            }
            Self::OrderDeleted { table_no, .. } => Some(table_no.as_str()),
            Self::CallInserted { call } | Self::CallUpdated { call } => {
                Some(call.table_no.as_str())
            }
            Self::StoreUpdated { .. } => None,
        }
    }

    /// Short label for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::OrderInserted { .. } => "order_inserted",
            Self::OrderUpdated { .. } => "order_updated",
            Self::OrderDeleted { .. } => "order_deleted",
            Self::CallInserted { .. } => "call_inserted",
            Self::CallUpdated { .. } => "call_updated",
            Self::StoreUpdated { .. } => "store_updated",
        }
    }
}

/// Event stamped with its per-store sequence number
///
/// `seq` grows by exactly one per published event of a store. A receiver
/// ignores envelopes at or below the `seq` of the snapshot it already holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEnvelope {
    pub store_id: i64,
    pub seq: u64,
    pub event: ChangeEvent,
}

/// Live (non-terminal) state of one scope, used for initial and reconciling sync
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveSnapshot {
    pub store: Store,
    pub orders: Vec<Order>,
    pub calls: Vec<Call>,
    /// Sequence number the snapshot is consistent with
    pub seq: u64,
}
