//! Optimistic status overlay
//!
//! ```text
//!  begin(id, target) ──► pending ──┐
//!                                  ├──► view(): pending overlaid on confirmed
//!  LiveState (confirmed) ──────────┘
//!  reconcile(): drop pending the confirmed state reached (remote wins)
//!  fail(id):    drop pending, report WriteFailed
//! ```

use shared::models::{Order, OrderStatus};
use std::collections::HashMap;

use super::LiveState;
use crate::notice::Notice;

#[derive(Debug, Clone, Default)]
pub struct Optimistic {
    pending: HashMap<i64, OrderStatus>,
}

impl Optimistic {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a local status change awaiting confirmation
    pub fn begin(&mut self, order_id: i64, target: OrderStatus) {
        let entry = self.pending.entry(order_id).or_insert(target);
        *entry = (*entry).max(target);
    }

    pub fn is_pending(&self, order_id: i64) -> bool {
        self.pending.contains_key(&order_id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Confirmed orders with pending changes overlaid
    ///
    /// An overlay never lowers a status.
    pub fn view(&self, confirmed: &LiveState) -> Vec<Order> {
        confirmed
            .orders
            .iter()
            .map(|order| match self.pending.get(&order.id) {
                Some(target) if *target > order.status => Order {
                    status: *target,
                    ..order.clone()
                },
                _ => order.clone(),
            })
            .collect()
    }

    /// Drop pending changes the confirmed state has reached or passed
    pub fn reconcile(&mut self, confirmed: &LiveState) {
        self.pending.retain(|id, target| {
            confirmed
                .order(*id)
                .is_some_and(|order| order.status < *target)
        });
    }

    /// Roll back a pending change whose write failed
    pub fn fail(&mut self, order_id: i64, message: impl Into<String>) -> Option<Notice> {
        self.pending.remove(&order_id)?;
        Some(Notice::WriteFailed {
            message: message.into(),
        })
    }
}

/// Orders the kitchen still has to work on
pub fn kitchen_queue(orders: &[Order]) -> Vec<Order> {
    orders
        .iter()
        .filter(|o| matches!(o.status, OrderStatus::New | OrderStatus::Preparing))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: i64, status: OrderStatus) -> Order {
        Order {
            id,
            store_id: 1,
            table_no: "2".into(),
            total_price: 10.0,
            status,
            items: vec![],
            created_at: id,
        }
    }

    fn state(orders: Vec<Order>) -> LiveState {
        LiveState {
            orders,
            ..Default::default()
        }
    }

    #[test]
    fn test_view_overlays_pending() {
        let confirmed = state(vec![order(1, OrderStatus::New), order(2, OrderStatus::New)]);
        let mut opt = Optimistic::new();
        opt.begin(1, OrderStatus::Preparing);

        let view = opt.view(&confirmed);
        assert_eq!(view[0].status, OrderStatus::Preparing);
        assert_eq!(view[1].status, OrderStatus::New);
        // confirmed state untouched
        assert_eq!(confirmed.orders[0].status, OrderStatus::New);
    }

    #[test]
    fn test_overlay_never_lowers_status() {
        let confirmed = state(vec![order(1, OrderStatus::Done)]);
        let mut opt = Optimistic::new();
        opt.begin(1, OrderStatus::Preparing);
        assert_eq!(opt.view(&confirmed)[0].status, OrderStatus::Done);

        opt.begin(1, OrderStatus::Done);
        opt.begin(1, OrderStatus::Preparing);
        opt.reconcile(&confirmed);
        assert!(!opt.is_pending(1));
    }

    #[test]
    fn test_reconcile_remote_wins() {
        let mut opt = Optimistic::new();
        opt.begin(1, OrderStatus::Preparing);
        opt.begin(2, OrderStatus::Done);
        opt.begin(3, OrderStatus::Done);

        let confirmed = state(vec![
            order(1, OrderStatus::Preparing),
            order(2, OrderStatus::Preparing),
        ]);
        opt.reconcile(&confirmed);
        // reached -> dropped; behind -> kept; gone (settled/deleted) -> dropped
        assert!(!opt.is_pending(1));
        assert!(opt.is_pending(2));
        assert!(!opt.is_pending(3));
        assert_eq!(opt.pending_count(), 1);
    }

    #[test]
    fn test_fail_rolls_back() {
        let confirmed = state(vec![order(1, OrderStatus::New)]);
        let mut opt = Optimistic::new();
        opt.begin(1, OrderStatus::Preparing);

        let notice = opt.fail(1, "Order not found").unwrap();
        assert!(matches!(notice, Notice::WriteFailed { .. }));
        assert_eq!(opt.view(&confirmed)[0].status, OrderStatus::New);
        assert!(opt.fail(1, "again").is_none());
    }

    #[test]
    fn test_kitchen_queue_drops_done() {
        let orders = vec![
            order(1, OrderStatus::New),
            order(2, OrderStatus::Preparing),
            order(3, OrderStatus::Done),
        ];
        let queue = kitchen_queue(&orders);
        assert_eq!(queue.iter().map(|o| o.id).collect::<Vec<_>>(), [1, 2]);
    }
}
