// ==========================================
// 场馆排班系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含排班业务逻辑
// ==========================================
// 职责: 提供数据访问接口, 屏蔽数据库细节
// 约束: 所有查询使用参数化, 防止 SQL 注入
// 列值约定: 日期 "YYYY-MM-DD" / 时刻 "HH:MM" / 时间戳 "YYYY-MM-DD HH:MM:SS"
// ==========================================

pub mod error;
pub mod guide_repo;
pub mod restaurant_repo;
pub mod schedule_repo;
pub mod slot_repo;
pub mod staff_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use guide_repo::{GuideAvailabilityRepository, GuideRepository};
pub use restaurant_repo::{RestaurantDayRepository, ShiftAssignmentRepository};
pub use schedule_repo::{DayScheduleRepository, TourAssignmentRepository};
pub use slot_repo::TourSlotRepository;
pub use staff_repo::{StaffAvailabilityRepository, StaffRepository};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

// ==========================================
// 列值映射辅助 (仓储内部共用)
// ==========================================

pub(crate) fn fmt_date(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

pub(crate) fn fmt_time(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

pub(crate) fn fmt_ts(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// 文本列解析失败 -> rusqlite 转换错误
pub(crate) fn text_conversion_error(
    msg: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, msg.into())
}

pub(crate) fn parse_date(s: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| text_conversion_error(e.to_string()))
}

pub(crate) fn parse_time(s: &str) -> rusqlite::Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M").map_err(|e| text_conversion_error(e.to_string()))
}

pub(crate) fn parse_ts(s: &str) -> rusqlite::Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|n| Utc.from_utc_datetime(&n))
        .map_err(|e| text_conversion_error(e.to_string()))
}
