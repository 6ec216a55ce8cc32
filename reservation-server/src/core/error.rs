use shared::AppError;
use thiserror::Error;

/// 启动阶段错误 (配置、数据库、端口绑定)
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("启动失败: {0}")]
    Startup(#[from] AppError),
}

pub type Result<T> = std::result::Result<T, ServerError>;
