//! Subscription scopes

use super::event::ChangeEvent;
use crate::models::{Call, Order};
use serde::{Deserialize, Serialize};

/// Which records a live client mirrors
///
/// Terminal records (paid orders, inactive calls) are still admitted so the
/// receiver can drop its copy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum SubscriptionScope {
    /// Kitchen / admin dashboard: every table of the store
    Dashboard { store_id: i64 },
    /// Customer session: one table of the store
    Table { store_id: i64, table_no: String },
}

impl SubscriptionScope {
    pub fn store_id(&self) -> i64 {
        match self {
            Self::Dashboard { store_id } | Self::Table { store_id, .. } => *store_id,
        }
    }

    pub fn table_no(&self) -> Option<&str> {
        match self {
            Self::Dashboard { .. } => None,
            Self::Table { table_no, .. } => Some(table_no.as_str()),
        }
    }

    pub fn is_dashboard(&self) -> bool {
        matches!(self, Self::Dashboard { .. })
    }

    fn admits_record(&self, store_id: i64, table_no: &str) -> bool {
        match self {
            Self::Dashboard { store_id: s } => *s == store_id,
            Self::Table {
                store_id: s,
                table_no: t,
            } => *s == store_id && t == table_no,
        }
    }

    pub fn admits_order(&self, order: &Order) -> bool {
        self.admits_record(order.store_id, &order.table_no)
    }

    pub fn admits_call(&self, call: &Call) -> bool {
        self.admits_record(call.store_id, &call.table_no)
    }

    /// Whether an event concerns this scope
    pub fn admits(&self, event: &ChangeEvent) -> bool {
        match event.table_no() {
            Some(table_no) => self.admits_record(event.store_id(), table_no),
            // store record updates reach every scope of the store
            None => event.store_id() == self.store_id(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CallType, OrderStatus, Store};

    fn order(store_id: i64, table_no: &str) -> Order {
        Order {
            id: 1,
            store_id,
            table_no: table_no.to_string(),
            total_price: 10.0,
            status: OrderStatus::New,
            items: vec![],
            created_at: 0,
        }
    }

    #[test]
    fn test_dashboard_admits_every_table_of_store() {
        let scope = SubscriptionScope::Dashboard { store_id: 1 };
        assert!(scope.admits_order(&order(1, "2")));
        assert!(scope.admits_order(&order(1, "5")));
        assert!(!scope.admits_order(&order(2, "2")));
    }

    #[test]
    fn test_table_scope_isolates_tables() {
        let table2 = SubscriptionScope::Table {
            store_id: 1,
            table_no: "2".into(),
        };
        let ev = |t: &str| ChangeEvent::OrderInserted { order: order(1, t) };
        assert!(table2.admits(&ev("2")));
        assert!(!table2.admits(&ev("5")));
        assert!(!table2.admits(&ChangeEvent::OrderDeleted {
            id: 9,
            store_id: 1,
            table_no: "5".into(),
        }));
    }

    #[test]
    fn test_terminal_updates_still_admitted() {
        let scope = SubscriptionScope::Table {
            store_id: 1,
            table_no: "4".into(),
        };
        let mut paid = order(1, "4");
        paid.status = OrderStatus::Paid;
        assert!(scope.admits(&ChangeEvent::OrderUpdated { order: paid }));

        let call = Call {
            id: 3,
            store_id: 1,
            table_no: "4".into(),
            call_type: CallType::Bill,
            active: false,
            created_at: 0,
        };
        assert!(scope.admits(&ChangeEvent::CallUpdated { call }));
    }

    #[test]
    fn test_store_update_reaches_all_scopes_of_store() {
        let store = Store {
            id: 1,
            name: "Moda".into(),
            slug: "moda".into(),
            logo_url: Some("logo.png".into()),
            created_at: 0,
        };
        let ev = ChangeEvent::StoreUpdated { store };
        assert!(SubscriptionScope::Dashboard { store_id: 1 }.admits(&ev));
        assert!(SubscriptionScope::Table {
            store_id: 1,
            table_no: "9".into()
        }
        .admits(&ev));
        assert!(!SubscriptionScope::Dashboard { store_id: 2 }.admits(&ev));
    }
}
