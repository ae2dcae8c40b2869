//! Kafe Server - 扫码点餐服务端
//!
//! # 架构概述
//!
//! 顾客扫描桌台二维码进入菜单并下单，后台实时看到订单和呼叫，
//! 推进订单状态并整桌结账。所有写入提交后经 [`ChangeHub`] 推送给
//! 订阅的 WebSocket 会话。
//!
//! # 模块结构
//!
//! ```text
//! kafe-server/src/
//! ├── core/          # 配置、状态、错误、HTTP 服务器
//! ├── db/            # SQLite 连接池与 repository
//! ├── live/          # 变更 hub 与快照
//! ├── tables/        # 二维码 token 解析与轮换
//! ├── orders/        # 订单生命周期
//! ├── calls/         # 呼叫生命周期
//! ├── settlement/    # 整桌结账
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 日志、响应工具
//! ```

pub mod api;
pub mod calls;
pub mod core;
pub mod db;
pub mod live;
pub mod orders;
pub mod settlement;
pub mod tables;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerError, ServerState};
pub use live::ChangeHub;
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use shared::error::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境: 加载 .env、创建工作目录、初始化日志
pub fn setup_environment() -> Result<Config, ServerError> {
    // .env 不存在时忽略
    let _ = dotenvy::dotenv();

    let config = Config::from_env();
    let logs_dir = config.logs_dir();
    std::fs::create_dir_all(&logs_dir)?;

    init_logger_with_file(
        Some(&config.log_level),
        config.is_production(),
        Some(logs_dir.as_path()),
    );

    Ok(config)
}

/// 打印启动横幅
pub fn print_banner() {
    println!(
        r#"
    __ __       ____
   / //_/____ _/ __/__
  / ,<  / __ `/ /_/ _ \
 / /| |/ /_/ / __/  __/
/_/ |_|\__,_/_/  \___/
    "#
    );
}
