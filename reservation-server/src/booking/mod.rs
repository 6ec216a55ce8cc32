//! 预订核心 - 时段枚举、桌台分配、写路径
//!
//! - [`slots`] - 营业时段网格与可用时段过滤
//! - [`assigner`] - 最佳适配桌台选择
//! - [`locks`] - 按 (日期, 时段) 的写锁
//! - [`BookingService`] - 读写路径

pub mod assigner;
pub mod locks;
pub mod service;
pub mod slots;

pub use locks::{SlotGuard, SlotLocks};
pub use service::BookingService;
