use shared::error::AppError;
use shared::live::{ChangeEnvelope, ChangeEvent};
use sqlx::SqlitePool;

use crate::core::Config;
use crate::db::DbService;
use crate::live::ChangeHub;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 连接池与 hub 内部均为 Arc，Clone 成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | pool | SqlitePool | SQLite 连接池 |
/// | hub | ChangeHub | 门店实时变更分发 |
///
/// # 使用示例
///
/// ```ignore
/// let state = ServerState::initialize(&config).await?;
/// let orders = orders::list_live(&state, &scope).await?;
/// state.publish(ChangeEvent::OrderInserted { order });
/// ```
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub hub: ChangeHub,
}

impl ServerState {
    pub fn new(config: Config, pool: SqlitePool, hub: ChangeHub) -> Self {
        Self { config, pool, hub }
    }

    /// 初始化服务器状态
    ///
    /// 1. 创建工作目录
    /// 2. 打开数据库并执行迁移
    /// 3. 创建变更 hub
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        std::fs::create_dir_all(&config.work_dir).map_err(|e| {
            AppError::internal(format!(
                "Failed to create work dir {}: {e}",
                config.work_dir
            ))
        })?;

        let db = DbService::new(&config.database_url).await?;
        let hub = ChangeHub::new(config.live_channel_capacity);

        tracing::info!(
            work_dir = %config.work_dir,
            environment = %config.environment,
            "Server state initialized"
        );

        Ok(Self::new(config.clone(), db.pool, hub))
    }

    /// 内存数据库状态 (测试用)
    pub async fn in_memory(config: Config) -> Result<Self, AppError> {
        let db = DbService::memory().await?;
        let hub = ChangeHub::new(config.live_channel_capacity);
        Ok(Self::new(config, db.pool, hub))
    }

    /// 发布变更 (必须在写入提交之后调用)
    pub fn publish(&self, event: ChangeEvent) -> ChangeEnvelope {
        self.hub.publish(event)
    }
}
