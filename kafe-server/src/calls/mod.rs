//! Call Lifecycle Engine
//!
//! 顾客呼叫服务员/买单，后台处理后关闭。关闭是条件更新，
//! 重复关闭为 no-op。

use shared::error::{AppError, AppResult, ErrorCode};
use shared::live::{ChangeEvent, SubscriptionScope};
use shared::models::{Call, CallCreate, DismissOutcome};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

use crate::core::ServerState;
use crate::db::repository::call;
use crate::tables::require_store;

/// Raise a call for a table
pub async fn create(state: &ServerState, store_id: i64, data: CallCreate) -> AppResult<Call> {
    let table_no = data.table_no.trim();
    if table_no.is_empty() {
        return Err(AppError::new(ErrorCode::TableNotResolved));
    }
    require_store(&state.pool, store_id).await?;

    let call = Call {
        id: snowflake_id(),
        store_id,
        table_no: table_no.to_string(),
        call_type: data.call_type,
        active: true,
        created_at: now_millis(),
    };
    call::insert(&state.pool, &call).await?;

    tracing::info!(
        store_id,
        call_id = call.id,
        table_no = %call.table_no,
        call_type = call.call_type.as_str(),
        "Call created"
    );

    state.publish(ChangeEvent::CallInserted { call: call.clone() });
    Ok(call)
}

/// Deactivate a call; dismissing an inactive call changes nothing
pub async fn dismiss(state: &ServerState, store_id: i64, call_id: i64) -> AppResult<DismissOutcome> {
    if let Some(call) = call::dismiss(&state.pool, store_id, call_id).await? {
        tracing::info!(store_id, call_id, "Call dismissed");
        state.publish(ChangeEvent::CallUpdated { call: call.clone() });
        return Ok(DismissOutcome {
            call,
            changed: true,
        });
    }

    let call = call::find_by_id(&state.pool, store_id, call_id)
        .await?
        .ok_or_else(|| AppError::call_not_found(call_id))?;
    Ok(DismissOutcome {
        call,
        changed: false,
    })
}

/// Active calls visible to a scope, newest first
pub async fn list_active(pool: &SqlitePool, scope: &SubscriptionScope) -> AppResult<Vec<Call>> {
    let calls = call::find_active(pool, scope.store_id(), scope.table_no()).await?;
    Ok(calls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;
    use crate::db::repository::store;
    use shared::models::{CallType, StoreCreate};

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

    fn waiter(table_no: &str) -> CallCreate {
        CallCreate {
            table_no: table_no.into(),
            call_type: CallType::Waiter,
        }
    }

    #[tokio::test]
    async fn test_create_and_dismiss() {
        let state = setup().await;
        let mut rx = state.hub.subscribe(1);

        let call = create(&state, 1, waiter("5")).await.unwrap();
        assert!(call.active);
        assert!(matches!(
            rx.recv().await.unwrap().event,
            ChangeEvent::CallInserted { .. }
        ));

        let outcome = dismiss(&state, 1, call.id).await.unwrap();
        assert!(outcome.changed);
        assert!(!outcome.call.active);
        assert!(matches!(
            rx.recv().await.unwrap().event,
            ChangeEvent::CallUpdated { .. }
        ));
    }

    #[tokio::test]
    async fn test_dismiss_twice_is_no_op() {
        let state = setup().await;
        let call = create(&state, 1, waiter("5")).await.unwrap();
        dismiss(&state, 1, call.id).await.unwrap();
        let seq = state.hub.current_seq(1);

        let again = dismiss(&state, 1, call.id).await.unwrap();
        assert!(!again.changed);
        assert_eq!(state.hub.current_seq(1), seq);

        let err = dismiss(&state, 1, 404).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CallNotFound);
    }

    #[tokio::test]
    async fn test_create_requires_table() {
        let state = setup().await;
        let err = create(&state, 1, waiter(" ")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TableNotResolved);
    }

    #[tokio::test]
    async fn test_list_active_by_scope() {
        let state = setup().await;
        create(&state, 1, waiter("1")).await.unwrap();
        let bill = create(
            &state,
            1,
            CallCreate {
                table_no: "2".into(),
                call_type: CallType::Bill,
            },
        )
        .await
        .unwrap();
        dismiss(&state, 1, bill.id).await.unwrap();

        let dashboard = SubscriptionScope::Dashboard { store_id: 1 };
        let active = list_active(&state.pool, &dashboard).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].table_no, "1");

        let table = SubscriptionScope::Table {
            store_id: 1,
            table_no: "2".into(),
        };
        assert!(list_active(&state.pool, &table).await.unwrap().is_empty());
    }
}
