// ==========================================
// 场馆排班系统 - 引擎层
// ==========================================
// 职责: 排班业务规则 (准入/校验/自动排班/填充/发布门)
// 红线: 引擎只计算不落库; 数据进出经由 API 层
// ==========================================

pub mod coverage;
pub mod eligibility;
pub mod publish;
pub mod scheduler;
pub mod shift_filler;
pub mod validator;

// 重导出核心引擎
pub use coverage::CoverageChecker;
pub use eligibility::{EligibilityCore, EligibilityEngine};
pub use publish::PublishGate;
pub use scheduler::{AutoAssignOptions, AutoAssignPlan, PlannedAssignment, TourAutoScheduler};
pub use shift_filler::{PlannedShift, ShiftFillPlan, ShiftFiller};
pub use validator::AssignmentValidator;
