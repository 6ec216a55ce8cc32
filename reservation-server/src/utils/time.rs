//! 时间工具函数 - 日期/时段解析
//!
//! Dates travel as `YYYY-MM-DD`, slot times as `HH:MM:SS`. Input times may
//! omit the seconds.

use chrono::{NaiveDate, NaiveTime};

use super::{AppError, AppResult, ErrorCode};
use crate::booking::slots;

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|_| {
        AppError::with_message(
            ErrorCode::InvalidFormat,
            format!("Invalid date format: {date} (expected YYYY-MM-DD)"),
        )
        .with_detail("field", "reservationDate")
    })
}

/// 解析时间字符串 (HH:MM:SS 或 HH:MM)
pub fn parse_time(time: &str) -> AppResult<NaiveTime> {
    let time = time.trim();
    NaiveTime::parse_from_str(time, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M"))
        .map_err(|_| {
            AppError::with_message(
                ErrorCode::InvalidFormat,
                format!("Invalid time format: {time} (expected HH:MM or HH:MM:SS)"),
            )
            .with_detail("field", "reservationTime")
        })
}

/// 解析并校验预订时段 (必须在营业时段网格上)
pub fn parse_slot_time(time: &str) -> AppResult<NaiveTime> {
    let parsed = parse_time(time)?;
    if !slots::is_service_slot(parsed) {
        return Err(AppError::with_message(
            ErrorCode::OutsideServiceHours,
            format!(
                "{} is not a bookable slot (every 30 minutes from {} to {})",
                format_time(parsed),
                format_time(slots::FIRST_SLOT),
                format_time(slots::LAST_SLOT)
            ),
        )
        .with_detail("field", "reservationTime"));
    }
    Ok(parsed)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}
