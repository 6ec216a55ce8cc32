use std::path::PathBuf;

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖 (`.env` 文件由 `dotenv` 加载)：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库、日志) |
/// | DATABASE_PATH | {WORK_DIR}/restaurant.db | SQLite 数据库文件 |
/// | HTTP_PORT | 5000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 (RUST_LOG 优先) |
/// | LOG_DIR | - | 设置后按天滚动写入日志文件 |
/// | CORS_ORIGINS | - | 允许的来源，逗号分隔 |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/srv/reservations HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录
    pub work_dir: String,
    /// SQLite 数据库文件路径
    pub database_path: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 默认日志级别
    pub log_level: String,
    /// 日志目录
    pub log_dir: Option<String>,
    /// 允许的 CORS 来源 (空 = 按环境决定)
    pub cors_origins: Vec<String>,
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let work_dir = std::env::var("WORK_DIR").unwrap_or(defaults.work_dir);
        let database_path = std::env::var("DATABASE_PATH").unwrap_or_else(|_| database_in(&work_dir));

        Self {
            work_dir,
            database_path,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.http_port),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            log_level: std::env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.trim().is_empty()),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|v| parse_origins(&v))
                .unwrap_or_default(),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.request_timeout_ms),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 从固定默认值出发，不读取环境变量，常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let work_dir = work_dir.into();
        Self {
            database_path: database_in(&work_dir),
            work_dir,
            http_port,
            ..Self::default()
        }
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        let work_dir = "./data".to_string();
        Self {
            database_path: database_in(&work_dir),
            work_dir,
            http_port: 5000,
            environment: "development".into(),
            log_level: "info".into(),
            log_dir: None,
            cors_origins: Vec::new(),
            request_timeout_ms: 30000,
        }
    }
}

fn database_in(work_dir: &str) -> String {
    PathBuf::from(work_dir)
        .join("restaurant.db")
        .to_string_lossy()
        .into_owned()
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("http://localhost:3000, https://book.example.com,,"),
            vec!["http://localhost:3000", "https://book.example.com"]
        );
        assert!(parse_origins(" ").is_empty());
    }

    #[test]
    fn test_with_overrides_moves_database() {
        let config = Config::with_overrides("/tmp/reservations-test", 0);
        assert_eq!(config.work_dir, "/tmp/reservations-test");
        assert!(config.database_path.starts_with("/tmp/reservations-test"));
        assert!(config.database_path.ends_with("restaurant.db"));
        assert_eq!(config.http_port, 0);
    }

    #[test]
    fn test_with_overrides_uses_fixed_defaults() {
        let config = Config::with_overrides("/tmp/reservations-test", 0);
        let defaults = Config::default();
        assert_eq!(config.environment, "development");
        assert!(config.is_development());
        assert!(config.cors_origins.is_empty());
        assert_eq!(config.request_timeout_ms, defaults.request_timeout_ms);
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn test_default_database_lives_in_work_dir() {
        let config = Config::default();
        assert_eq!(config.work_dir, "./data");
        assert!(config.database_path.ends_with("restaurant.db"));
        assert_eq!(config.http_port, 5000);
    }
}
