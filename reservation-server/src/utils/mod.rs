//! 工具模块 - 日志、输入校验、时间解析

pub mod logger;
pub mod time;
pub mod validation;

pub use shared::{AppError, AppResult, ErrorCode};
