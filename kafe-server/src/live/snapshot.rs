//! Live snapshot loading

use shared::error::AppResult;
use shared::live::{LiveSnapshot, SubscriptionScope};

use crate::core::ServerState;
use crate::tables::require_store;
use crate::{calls, orders};

/// Full state of a scope, tagged with the hub sequence read before loading
///
/// Every change with a sequence at or below `seq` is already reflected in the
/// loaded rows, because events are published only after their write commits.
pub async fn load_snapshot(state: &ServerState, scope: &SubscriptionScope) -> AppResult<LiveSnapshot> {
    let seq = state.hub.current_seq(scope.store_id());
    let store = require_store(&state.pool, scope.store_id()).await?;
    let orders = orders::list_live(&state.pool, scope).await?;
    let calls = calls::list_active(&state.pool, scope).await?;
    Ok(LiveSnapshot {
        store,
        orders,
        calls,
        seq,
    })
}
