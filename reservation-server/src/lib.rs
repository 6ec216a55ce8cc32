//! Reservation Server - 餐厅预订服务
//!
//! 按日期、时段、人数查询可预订时段，创建预订时自动分配最合适的桌台，
//! 并保证同一桌台同一时段不会被重复预订。
//!
//! # 模块结构
//!
//! ```text
//! reservation-server/src/
//! ├── core/          # 配置、状态、启动
//! ├── db/            # SQLite 连接池、迁移、repository
//! ├── booking/       # 时段网格、桌台分配、时段锁、预订服务
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 日志、校验、时间解析
//! ```

pub mod api;
pub mod booking;
pub mod core;
pub mod db;
pub mod utils;

// Re-export 公共类型
pub use booking::BookingService;
pub use crate::core::{Config, Server, ServerState};
pub use db::DbService;
pub use utils::{AppError, AppResult, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

pub fn print_banner() {
    println!(
        r#"
  ____                                 _   _
 |  _ \ ___  ___  ___ _ ____   ____ _| |_(_) ___  _ __  ___
 | |_) / _ \/ __|/ _ \ '__\ \ / / _` | __| |/ _ \| '_ \/ __|
 |  _ <  __/\__ \  __/ |   \ V / (_| | |_| | (_) | | | \__ \
 |_| \_\___||___/\___|_|    \_/ \__,_|\__|_|\___/|_| |_|___/
                                              v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}

/// 初始化日志 (`.env` 需在读取配置前加载)
pub fn setup_environment(config: &Config) {
    if let Some(dir) = &config.log_dir
        && let Err(e) = std::fs::create_dir_all(dir)
    {
        eprintln!("Failed to create log directory {dir}: {e}");
    }
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());
}
