use std::path::Path;

use crate::booking::BookingService;
use crate::core::{Config, Result};
use crate::db::DbService;

/// 服务器状态 - 持有所有服务的共享引用
///
/// Cloned into every handler through axum `State`.
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | DbService | SQLite 连接池 |
/// | booking | BookingService | 预订读写路径 (含时段锁) |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 数据库服务
    pub db: DbService,
    /// 预订服务
    pub booking: BookingService,
}

impl ServerState {
    /// 使用已有数据库创建状态
    pub fn new(config: Config, db: DbService) -> Self {
        let booking = BookingService::new(db.clone());
        Self {
            config,
            db,
            booking,
        }
    }

    /// 初始化服务器状态
    ///
    /// 创建工作目录、打开数据库 (含迁移)，空库时写入默认桌台
    pub async fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;
        if let Some(parent) = Path::new(&config.database_path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let db = DbService::new(&config.database_path).await?;
        db.seed_default_floor().await?;

        Ok(Self::new(config.clone(), db))
    }
}
