/// 服务器配置 - 点餐服务的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./kafe-data | 工作目录 (数据库、日志) |
/// | DATABASE_URL | sqlite://{WORK_DIR}/kafe.db | SQLite 数据库地址 |
/// | HTTP_PORT | 8080 | HTTP 服务端口 |
/// | PUBLIC_BASE_URL | http://localhost:8080 | 二维码入口 URL 前缀 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LIVE_CHANNEL_CAPACITY | 256 | 每个门店的广播缓冲 |
/// | ALLOW_LEGACY_TABLE_PARAM | true | 是否接受 `?table=` 旧式桌号 |
/// | VERIFY_CANONICAL_PRICES | false | 下单时按商品价格重新计价 |
/// | LIVE_PING_INTERVAL_SECS | 30 | WebSocket 心跳间隔(秒) |
/// | LOG_LEVEL | info | 日志级别 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/kafe HTTP_PORT=9000 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// SQLite 连接地址
    pub database_url: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 生成桌台二维码时使用的外部地址
    pub public_base_url: String,
    /// 运行环境: development | production
    pub environment: String,
    /// 日志级别
    pub log_level: String,

    // === 实时推送 ===
    /// 每个门店广播通道的容量
    pub live_channel_capacity: usize,
    /// WebSocket ping 间隔(秒)
    pub live_ping_interval_secs: u64,

    // === 点餐策略 ===
    /// 无 token 时是否接受原始桌号 (降级信任)
    pub allow_legacy_table_param: bool,
    /// 是否以商品表价格为准重新计算订单
    pub verify_canonical_prices: bool,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./kafe-data".into());
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| format!("sqlite://{}/kafe.db", work_dir));

        Self {
            database_url,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            live_channel_capacity: std::env::var("LIVE_CHANNEL_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v: &usize| *v > 0)
                .unwrap_or(256),
            live_ping_interval_secs: std::env::var("LIVE_PING_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v: &u64| *v > 0)
                .unwrap_or(30),
            allow_legacy_table_param: std::env::var("ALLOW_LEGACY_TABLE_PARAM")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            verify_canonical_prices: std::env::var("VERIFY_CANONICAL_PRICES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            work_dir,
        }
    }

    /// 测试用配置：内存数据库，不读取环境变量
    pub fn for_tests() -> Self {
        Self {
            work_dir: std::env::temp_dir().to_string_lossy().into_owned(),
            database_url: "sqlite::memory:".into(),
            http_port: 0,
            public_base_url: "http://kafe.test".into(),
            environment: "test".into(),
            log_level: "debug".into(),
            live_channel_capacity: 64,
            live_ping_interval_secs: 30,
            allow_legacy_table_param: true,
            verify_canonical_prices: false,
        }
    }

    /// 日志目录
    pub fn logs_dir(&self) -> std::path::PathBuf {
        std::path::PathBuf::from(&self.work_dir).join("logs")
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否为开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_for_tests() {
        let config = Config::for_tests();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert!(config.allow_legacy_table_param);
        assert!(!config.verify_canonical_prices);
        assert!(!config.is_production());
        assert!(!config.is_development());
    }

    #[test]
    fn test_logs_dir() {
        let mut config = Config::for_tests();
        config.work_dir = "/data/kafe".into();
        assert_eq!(config.logs_dir(), std::path::PathBuf::from("/data/kafe/logs"));
    }
}
