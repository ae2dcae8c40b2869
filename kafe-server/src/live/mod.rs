//! ChangeHub: 门店实时变更分发
//!
//! 每次写入提交后，服务层把变更发布到所属门店的广播通道，
//! 顾客端和后台的 WebSocket 会话订阅后按作用域过滤再推送。
//!
//! ```text
//! orders / calls / settlement / stores (提交后)
//!       │ ChangeEvent
//!       ▼
//! ChangeHub
//!   └── stores: 按 store 隔离
//!         ├── seq: 发布序号 (加锁分配，序号顺序 = 发送顺序)
//!         ├── write: 订单状态写入锁 (写入 + 发布在同一临界区)
//!         └── broadcast: Sender<ChangeEnvelope>
//!               │
//!               ▼
//!         live session (subscribe → scope 过滤 → 推送)
//! ```

mod snapshot;

pub use snapshot::load_snapshot;

use dashmap::DashMap;
use parking_lot::Mutex;
use shared::live::{ChangeEnvelope, ChangeEvent};
use std::sync::Arc;
use tokio::sync::{OwnedMutexGuard, broadcast};

/// Broadcast channel 默认容量，缓冲连接时的突发
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// 单个门店的广播通道
struct StoreLive {
    /// 最近一次发布的序号
    seq: Mutex<u64>,
    /// 持有期间其他状态写入等待，保证同一记录的事件按状态顺序发布
    write: Arc<tokio::sync::Mutex<()>>,
    tx: broadcast::Sender<ChangeEnvelope>,
}

impl StoreLive {
    fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            seq: Mutex::new(0),
            write: Arc::new(tokio::sync::Mutex::new(())),
            tx,
        }
    }
}

/// 全局变更 hub，按门店隔离
#[derive(Clone)]
pub struct ChangeHub {
    /// store_id → StoreLive
    stores: Arc<DashMap<i64, Arc<StoreLive>>>,
    capacity: usize,
}

impl Default for ChangeHub {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl ChangeHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            stores: Arc::new(DashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// 发布一条变更，返回带序号的信封
    pub fn publish(&self, event: ChangeEvent) -> ChangeEnvelope {
        let store_id = event.store_id();
        let store = self.get_or_create_store(store_id);

        let mut seq = store.seq.lock();
        *seq += 1;
        let envelope = ChangeEnvelope {
            store_id,
            seq: *seq,
            event,
        };

        tracing::debug!(
            store_id,
            seq = envelope.seq,
            event = envelope.event.name(),
            "Change published"
        );

        // 无订阅者时 send 返回 Err，安全忽略
        let _ = store.tx.send(envelope.clone());
        envelope
    }

    /// 门店写入锁：订单状态写入和其事件发布在锁内完成
    pub async fn write_lock(&self, store_id: i64) -> OwnedMutexGuard<()> {
        self.get_or_create_store(store_id).write.clone().lock_owned().await
    }

    /// 订阅门店的 broadcast channel
    pub fn subscribe(&self, store_id: i64) -> broadcast::Receiver<ChangeEnvelope> {
        self.get_or_create_store(store_id).tx.subscribe()
    }

    /// 门店最近一次发布的序号 (从未发布为 0)
    pub fn current_seq(&self, store_id: i64) -> u64 {
        self.stores
            .get(&store_id)
            .map(|s| *s.seq.lock())
            .unwrap_or(0)
    }

    /// 门店当前订阅者数量
    pub fn subscriber_count(&self, store_id: i64) -> usize {
        self.stores
            .get(&store_id)
            .map(|s| s.tx.receiver_count())
            .unwrap_or(0)
    }

    fn get_or_create_store(&self, store_id: i64) -> Arc<StoreLive> {
        self.stores
            .entry(store_id)
            .or_insert_with(|| Arc::new(StoreLive::new(self.capacity)))
            .clone()
    }
}
