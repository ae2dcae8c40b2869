//! Live state reducers
//!
//! Pure functions: `(state, change) -> (state, notices)`. Both sessions feed
//! every snapshot and envelope through here, so a dashboard and a customer
//! screen converge on the same records for the same scope.
//!
//! - statuses never move backward locally (older updates are ignored)
//! - paid orders and inactive calls leave the state
//! - an update only replaces a record already present; an update for an
//!   absent record is dropped, so a late status cannot revive a settled order
//! - an insert for a record already present merges without a second notice

use shared::live::{ChangeEnvelope, ChangeEvent, LiveSnapshot, SubscriptionScope};
use shared::models::{Call, Order, Store};

use super::SyncFrame;
use crate::notice::Notice;

/// Mirrored live records of one scope
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveState {
    pub store: Option<Store>,
    /// Non-paid orders, newest first
    pub orders: Vec<Order>,
    /// Active calls, newest first
    pub calls: Vec<Call>,
    /// Last applied sequence number
    pub seq: u64,
}

impl LiveState {
    pub fn order(&self, id: i64) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    pub fn call(&self, id: i64) -> Option<&Call> {
        self.calls.iter().find(|c| c.id == id)
    }

    /// Live orders of one table
    pub fn table_orders<'a>(&'a self, table_no: &'a str) -> impl Iterator<Item = &'a Order> + 'a {
        self.orders.iter().filter(move |o| o.table_no == table_no)
    }
}

/// Replace the state wholesale (reconciling refetch)
///
/// The snapshot's `seq` is taken as is, even when lower than the local one:
/// a restarted server numbers its changes from zero again.
pub fn apply_snapshot(snapshot: LiveSnapshot) -> LiveState {
    let mut orders: Vec<Order> = snapshot.orders.into_iter().filter(Order::is_live).collect();
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let mut calls: Vec<Call> = snapshot.calls.into_iter().filter(|c| c.active).collect();
    calls.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    LiveState {
        store: Some(snapshot.store),
        orders,
        calls,
        seq: snapshot.seq,
    }
}

/// Apply one envelope unless it is stale or foreign
pub fn apply_envelope(
    mut state: LiveState,
    scope: &SubscriptionScope,
    envelope: &ChangeEnvelope,
) -> (LiveState, Vec<Notice>) {
    if envelope.store_id != scope.store_id() || envelope.seq <= state.seq {
        return (state, Vec::new());
    }
    state.seq = envelope.seq;
    reduce(state, scope, &envelope.event)
}

/// Apply a live feed frame
pub fn apply_frame(
    state: LiveState,
    scope: &SubscriptionScope,
    frame: &SyncFrame,
) -> (LiveState, Vec<Notice>) {
    match frame {
        SyncFrame::Snapshot(snapshot) if snapshot.store.id == scope.store_id() => {
            (apply_snapshot(snapshot.clone()), Vec::new())
        }
        SyncFrame::Snapshot(_) => (state, Vec::new()),
        SyncFrame::Change(envelope) => apply_envelope(state, scope, envelope),
    }
}

/// Apply one change event
pub fn reduce(
    mut state: LiveState,
    scope: &SubscriptionScope,
    event: &ChangeEvent,
) -> (LiveState, Vec<Notice>) {
    let mut notices = Vec::new();
    if !scope.admits(event) {
        return (state, notices);
    }

    match event {
        ChangeEvent::OrderInserted { order } => {
            if !order.is_live() {
                state.orders.retain(|o| o.id != order.id);
            } else if let Some(local) = state.orders.iter_mut().find(|o| o.id == order.id) {
                if order.status > local.status {
                    *local = order.clone();
                }
            } else {
                insert_order(&mut state.orders, order.clone());
                notices.push(if scope.is_dashboard() {
                    Notice::NewOrder {
                        order_id: order.id,
                        table_no: order.table_no.clone(),
                    }
                } else {
                    Notice::OrderConfirmed { order_id: order.id }
                });
            }
        }
        ChangeEvent::OrderUpdated { order } => {
            let pos = state.orders.iter().position(|o| o.id == order.id);
            match pos {
                Some(pos) if !order.is_live() => {
                    state.orders.remove(pos);
                    if !scope.is_dashboard() {
                        notices.push(Notice::PaymentReceived { order_id: order.id });
                    }
                }
                Some(pos) => {
                    let local = &mut state.orders[pos];
                    if order.status >= local.status {
                        let advanced = order.status > local.status;
                        *local = order.clone();
                        if advanced && !scope.is_dashboard() {
                            notices.push(Notice::StatusChanged {
                                order_id: order.id,
                                status: order.status,
                            });
                        }
                    }
                }
                None => {}
            }
        }
        ChangeEvent::OrderDeleted { id, .. } => {
            state.orders.retain(|o| o.id != *id);
        }
        ChangeEvent::CallInserted { call } => {
            if !call.active {
                state.calls.retain(|c| c.id != call.id);
            } else if state.call(call.id).is_none() {
                insert_call(&mut state.calls, call.clone());
                if scope.is_dashboard() {
                    notices.push(Notice::NewCall {
                        call_id: call.id,
                        table_no: call.table_no.clone(),
                        call_type: call.call_type,
                    });
                }
            }
        }
        ChangeEvent::CallUpdated { call } => {
            if !call.active {
                state.calls.retain(|c| c.id != call.id);
            } else if let Some(local) = state.calls.iter_mut().find(|c| c.id == call.id) {
                *local = call.clone();
            }
        }
        ChangeEvent::StoreUpdated { store } => {
            state.store = Some(store.clone());
        }
    }

    (state, notices)
}

fn insert_order(orders: &mut Vec<Order>, order: Order) {
    let pos = orders
        .iter()
        .position(|o| o.created_at < order.created_at)
        .unwrap_or(orders.len());
    orders.insert(pos, order);
}

fn insert_call(calls: &mut Vec<Call>, call: Call) {
    let pos = calls
        .iter()
        .position(|c| c.created_at < call.created_at)
        .unwrap_or(calls.len());
    calls.insert(pos, call);
}
