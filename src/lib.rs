// ==========================================
// 场馆排班系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 排班决策支持 (人工最终控制权)
// 两个排班域: 导游(tour) / 餐厅(restaurant)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 排班规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/建表 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装与入口支撑
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    BookingChannel, GuideType, SessionStatus, ShiftPattern, StaffRole, VisitorType,
};

// 领域实体
pub use domain::{
    CoverageGap, CoverageReport, CoverageSample, DaySchedule, DayValidationReport, Guide,
    GuideAvailability, RestaurantDay, RestaurantStaff, ShiftAssignment, ShiftTemplate,
    StaffAvailability, TourAssignment, TourSlot, Violation,
};

// 引擎
pub use engine::{
    AssignmentValidator, AutoAssignOptions, AutoAssignPlan, CoverageChecker, EligibilityEngine,
    PublishGate, ShiftFillPlan, ShiftFiller, TourAutoScheduler,
};

// API
pub use api::{ApiError, ApiResult, RestaurantApi, ScheduleApi};

// 配置
pub use config::{ConfigManager, CoverageRules, RosterConfigReader, RosterRules};

/// 系统版本号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
