// ==========================================
// 场馆排班系统 - 领域层
// ==========================================
// 职责: 实体与类型定义, 区间算术
// 红线: 领域层不访问数据库, 不含排班算法
// ==========================================

pub mod person;
pub mod schedule;
pub mod slot;
pub mod types;
pub mod violation;

// 重导出核心实体
pub use person::{Guide, GuideAvailability, RestaurantStaff, StaffAvailability};
pub use schedule::{DaySchedule, RestaurantDay, ShiftAssignment, TourAssignment};
pub use slot::{ShiftTemplate, TourSlot};
pub use violation::{
    CoverageGap, CoverageReport, CoverageSample, DayValidationReport, Violation,
};
