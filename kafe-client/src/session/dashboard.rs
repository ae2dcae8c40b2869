//! Admin / kitchen dashboard session
//!
//! Staff actions show up locally before the store confirms them (optimistic
//! overlay). A failed write rolls the overlay back and refetches.

use shared::live::{ChangeEvent, LiveSnapshot, SubscriptionScope};
use shared::models::{
    AdvanceOutcome, AdvanceTarget, Call, DismissOutcome, HistoryQuery, Order, OrderHistory,
    OrderStatus, SettlementReport, Store,
};
use tokio::sync::watch;

use crate::api::OrderingApi;
use crate::notice::Notice;
use crate::sync::{self, ConnectionStatus, LiveState, Optimistic, SyncFrame, kitchen_queue};
use crate::{ClientError, ClientResult};

/// Result of a settlement attempt
#[derive(Debug, Clone, PartialEq)]
pub enum SettlementOutcome {
    Settled(SettlementReport),
    /// Nothing changed; the table can be settled again
    Failed {
        table_no: String,
        retryable: bool,
        reason: String,
    },
}

impl SettlementOutcome {
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Settled(_))
    }
}

pub struct DashboardSession<A: OrderingApi> {
    api: A,
    store_id: i64,
    scope: SubscriptionScope,
    live: LiveState,
    optimistic: Optimistic,
    /// Notices raised by this session's own writes
    notices: Vec<Notice>,
    status: Option<watch::Receiver<ConnectionStatus>>,
}

impl<A: OrderingApi> DashboardSession<A> {
    pub fn new(api: A, store_id: i64) -> Self {
        Self {
            api,
            store_id,
            scope: SubscriptionScope::Dashboard { store_id },
            live: LiveState::default(),
            optimistic: Optimistic::new(),
            notices: Vec::new(),
            status: None,
        }
    }

    pub fn store_id(&self) -> i64 {
        self.store_id
    }

    pub fn scope(&self) -> &SubscriptionScope {
        &self.scope
    }

    pub fn store(&self) -> Option<&Store> {
        self.live.store.as_ref()
    }

    /// Confirmed state, without local overlays
    pub fn confirmed(&self) -> &LiveState {
        &self.live
    }

    /// Reconciling refetch of the whole store
    pub async fn refresh(&mut self) -> ClientResult<()> {
        let store = self.api.store(self.store_id).await?;
        let orders = self.api.live_orders(self.store_id, None).await?;
        let calls = self.api.active_calls(self.store_id, None).await?;
        self.live = sync::apply_snapshot(LiveSnapshot {
            store,
            orders,
            calls,
            seq: self.live.seq,
        });
        self.optimistic.reconcile(&self.live);
        Ok(())
    }

    /// Live orders with pending local changes applied
    pub fn orders(&self) -> Vec<Order> {
        self.optimistic.view(&self.live)
    }

    /// Orders still in `new` or `preparing`
    pub fn kitchen_queue(&self) -> Vec<Order> {
        kitchen_queue(&self.orders())
    }

    pub fn calls(&self) -> &[Call] {
        &self.live.calls
    }

    /// Show a status change locally before it is written
    ///
    /// Only `preparing` and `done` can be staged; `paid` comes from settlement.
    pub fn stage_advance(&mut self, order_id: i64, target: OrderStatus) -> ClientResult<()> {
        let target = AdvanceTarget::try_from(target)?.status();
        self.optimistic.begin(order_id, target);
        Ok(())
    }

    /// Move an order forward (preparing / done)
    pub async fn advance(
        &mut self,
        order_id: i64,
        target: OrderStatus,
    ) -> ClientResult<AdvanceOutcome> {
        self.stage_advance(order_id, target)?;

        let result = self.api.advance(self.store_id, order_id, target).await;
        match result {
            Ok(outcome) => {
                self.apply_local(&ChangeEvent::OrderUpdated {
                    order: outcome.order.clone(),
                });
                Ok(outcome)
            }
            Err(e) => {
                tracing::warn!(order_id, %target, error = %e, "Advance failed, rolling back");
                if let Some(notice) = self.optimistic.fail(order_id, e.to_string()) {
                    self.notices.push(notice);
                }
                self.refresh_quietly().await;
                Err(e)
            }
        }
    }

    pub async fn dismiss_call(&mut self, call_id: i64) -> ClientResult<DismissOutcome> {
        let result = self.api.dismiss_call(self.store_id, call_id).await;
        match result {
            Ok(outcome) => {
                self.apply_local(&ChangeEvent::CallUpdated {
                    call: outcome.call.clone(),
                });
                Ok(outcome)
            }
            Err(e) => {
                self.notices.push(Notice::WriteFailed {
                    message: e.to_string(),
                });
                self.refresh_quietly().await;
                Err(e)
            }
        }
    }

    pub async fn delete_order(&mut self, order_id: i64) -> ClientResult<Order> {
        let order = self.api.delete_order(self.store_id, order_id).await?;
        self.apply_local(&ChangeEvent::OrderDeleted {
            id: order.id,
            store_id: order.store_id,
            table_no: order.table_no.clone(),
        });
        Ok(order)
    }

    /// Settle a table; always followed by a reconciling refetch
    pub async fn settle_table(&mut self, table_no: &str) -> SettlementOutcome {
        let result = self.api.settle_table(self.store_id, table_no).await;
        let outcome = match result {
            Ok(report) => {
                tracing::info!(
                    table_no,
                    orders = report.settled_orders.len(),
                    calls = report.dismissed_calls.len(),
                    "Table settled"
                );
                SettlementOutcome::Settled(report)
            }
            Err(e) => {
                let retryable = e.is_retryable();
                let reason = match &e {
                    ClientError::SettlementFailed { reason, .. } => reason.clone(),
                    other => other.to_string(),
                };
                tracing::error!(table_no, retryable, "Settlement failed: {reason}");
                self.notices.push(Notice::SettlementFailed {
                    table_no: table_no.to_string(),
                    retryable,
                    reason: reason.clone(),
                });
                SettlementOutcome::Failed {
                    table_no: table_no.to_string(),
                    retryable,
                    reason,
                }
            }
        };
        self.refresh_quietly().await;
        outcome
    }

    /// Feed one live frame; returns the notices it raised
    pub fn apply_frame(&mut self, frame: &SyncFrame) -> Vec<Notice> {
        let (live, notices) =
            sync::apply_frame(std::mem::take(&mut self.live), &self.scope, frame);
        self.live = live;
        self.optimistic.reconcile(&self.live);
        notices
    }

    pub async fn history(&self, query: HistoryQuery) -> ClientResult<OrderHistory> {
        self.api.history(self.store_id, query).await
    }

    /// Follow a live subscription's status badge
    pub fn attach_status(&mut self, status: watch::Receiver<ConnectionStatus>) {
        self.status = Some(status);
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.status
            .as_ref()
            .map(|rx| rx.borrow().clone())
            .unwrap_or(ConnectionStatus::Closed)
    }

    /// Drain notices raised by writes
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn apply_local(&mut self, event: &ChangeEvent) {
        let (live, notices) = sync::reduce(std::mem::take(&mut self.live), &self.scope, event);
        self.live = live;
        self.notices.extend(notices);
        self.optimistic.reconcile(&self.live);
    }

    async fn refresh_quietly(&mut self) {
        if let Err(e) = self.refresh().await {
            tracing::warn!(error = %e, "Reconciling refetch failed");
        }
    }
}
