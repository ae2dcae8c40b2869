//! Table Settlement Operation
//!
//! 一次结账 = 一个事务：
//!
//! ```text
//! BEGIN
//!   UPDATE orders SET status = 'paid'  WHERE table = ? AND status != 'paid' RETURNING *
//!   UPDATE calls  SET active = 0       WHERE table = ? AND active = 1      RETURNING *
//! COMMIT ──► publish OrderUpdated / CallUpdated (每行一条)
//! ```
//!
//! 事务与发布都在门店写入锁内 ([`ChangeHub::write_lock`](crate::live::ChangeHub::write_lock))。
//!
//! 任一步失败整体回滚，返回可重试的 `TableSettlementFailed`。
//! 对已结清的桌台再次结账成功返回空结果。

use shared::error::{AppError, AppResult, ErrorCode};
use shared::live::ChangeEvent;
use shared::models::{Call, Order, SettlementReport};

use crate::core::ServerState;
use crate::db::repository::{RepoError, RepoResult, call, order};
use crate::tables::require_store;

/// Settle a table: pay all of its orders and close all of its calls
pub async fn settle_table(
    state: &ServerState,
    store_id: i64,
    table_no: &str,
) -> AppResult<SettlementReport> {
    let table_no = table_no.trim();
    if table_no.is_empty() {
        return Err(AppError::new(ErrorCode::TableNotResolved));
    }
    require_store(&state.pool, store_id).await?;

    // 提交到发布之间持锁，advance 的事件只能排在 paid 之前或之后整体发布
    let _write = state.hub.write_lock(store_id).await;
    let (orders, calls) = settle_in_tx(state, store_id, table_no)
        .await
        .map_err(|e| {
            tracing::error!(store_id, table_no, error = %e, "Table settlement failed");
            AppError::settlement_failed(table_no, e.to_string())
        })?;

    let report = SettlementReport {
        table_no: table_no.to_string(),
        settled_orders: orders.iter().map(|o| o.id).collect(),
        dismissed_calls: calls.iter().map(|c| c.id).collect(),
    };

    for order in orders {
        state.publish(ChangeEvent::OrderUpdated { order });
    }
    for call in calls {
        state.publish(ChangeEvent::CallUpdated { call });
    }

    tracing::info!(
        store_id,
        table_no,
        orders = report.settled_orders.len(),
        calls = report.dismissed_calls.len(),
        "Table settled"
    );
    Ok(report)
}

async fn settle_in_tx(
    state: &ServerState,
    store_id: i64,
    table_no: &str,
) -> RepoResult<(Vec<Order>, Vec<Call>)> {
    let mut tx = state.pool.begin().await.map_err(RepoError::from)?;
    let orders = order::settle_table(&mut *tx, store_id, table_no).await?;
    let calls = call::dismiss_table(&mut *tx, store_id, table_no).await?;
    tx.commit().await.map_err(RepoError::from)?;
    Ok((orders, calls))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;
    use crate::db::repository::store;
    use crate::{calls, orders};
    use shared::live::SubscriptionScope;
    use shared::models::{CallCreate, CallType, OrderCreate, OrderItem, OrderStatus, StoreCreate};

    async fn setup() -> ServerState {
        let state = ServerState::in_memory(Config::for_tests()).await.unwrap();
        store::create(
            &state.pool,
            1,
            StoreCreate {
                name: "Kafe".into(),
                slug: "kafe".into(),
                logo_url: None,
            },
            0,
        )
        .await
        .unwrap();
        state
    }

    async fn place(state: &ServerState, table_no: &str) -> Order {
        orders::create(
            state,
            1,
            OrderCreate {
                table_no: table_no.into(),
                items: vec![OrderItem {
                    product_id: 1,
                    name: "Çay".into(),
                    quantity: 2,
                    unit_price: 15.0,
                }],
                total_price: 30.0,
            },
        )
        .await
        .unwrap()
    }

    async fn call_bill(state: &ServerState, table_no: &str) -> Call {
        calls::create(
            state,
            1,
            CallCreate {
                table_no: table_no.into(),
                call_type: CallType::Bill,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_settle_pays_orders_and_closes_calls() {
        let state = setup().await;
        let a = place(&state, "3").await;
        let b = place(&state, "3").await;
        orders::advance(&state, 1, b.id, OrderStatus::Done)
            .await
            .unwrap();
        let other = place(&state, "4").await;
        let bill = call_bill(&state, "3").await;

        let mut rx = state.hub.subscribe(1);
        let report = settle_table(&state, 1, "3").await.unwrap();

        assert_eq!(report.settled_orders.len(), 2);
        assert!(report.settled_orders.contains(&a.id));
        assert!(report.settled_orders.contains(&b.id));
        assert_eq!(report.dismissed_calls, vec![bill.id]);

        let mut events = Vec::new();
        for _ in 0..3 {
            events.push(rx.recv().await.unwrap().event);
        }
        let paid = events
            .iter()
            .filter(|e| matches!(e, ChangeEvent::OrderUpdated { order } if order.status == OrderStatus::Paid))
            .count();
        assert_eq!(paid, 2);
        assert!(events
            .iter()
            .any(|e| matches!(e, ChangeEvent::CallUpdated { call } if !call.active)));

        let dashboard = SubscriptionScope::Dashboard { store_id: 1 };
        let live = orders::list_live(&state.pool, &dashboard).await.unwrap();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].id, other.id);
    }

    #[tokio::test]
    async fn test_racing_advance_never_publishes_after_paid() {
        let state = setup().await;
        let mut rx = state.hub.subscribe(1);
        let mut ids = Vec::new();

        for _ in 0..15 {
            let order = place(&state, "4").await;
            ids.push(order.id);
            let (advanced, settled) = tokio::join!(
                orders::advance(&state, 1, order.id, OrderStatus::Preparing),
                settle_table(&state, 1, "4"),
            );
            advanced.unwrap();
            settled.unwrap();
        }

        let mut last = std::collections::HashMap::new();
        while let Ok(envelope) = rx.try_recv() {
            if let ChangeEvent::OrderUpdated { order } = envelope.event {
                let previous = last.insert(order.id, order.status);
                assert!(
                    previous.is_none_or(|p| p <= order.status),
                    "order {} went from {previous:?} to {}",
                    order.id,
                    order.status
                );
            }
        }
        for id in ids {
            assert_eq!(last.get(&id), Some(&OrderStatus::Paid));
        }
    }

    #[tokio::test]
    async fn test_settle_twice_is_empty() {
        let state = setup().await;
        place(&state, "3").await;
        settle_table(&state, 1, "3").await.unwrap();
        let seq = state.hub.current_seq(1);

        let again = settle_table(&state, 1, "3").await.unwrap();
        assert!(again.is_empty());
        assert_eq!(state.hub.current_seq(1), seq);
    }

    #[tokio::test]
    async fn test_failed_settlement_rolls_back() {
        let state = setup().await;
        let order = place(&state, "3").await;
        sqlx::query("DROP TABLE calls")
            .execute(&state.pool)
            .await
            .unwrap();
        let seq = state.hub.current_seq(1);

        let err = settle_table(&state, 1, "3").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TableSettlementFailed);
        assert_eq!(err.detail("table_no").unwrap(), "3");
        assert_eq!(err.detail("retryable").unwrap(), true);

        let stored = order::find_by_id(&state.pool, 1, order.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, OrderStatus::New);
        assert_eq!(state.hub.current_seq(1), seq);
    }
}
