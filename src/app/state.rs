// ==========================================
// 场馆排班系统 - 应用状态
// ==========================================
// 职责: 组装共享连接、仓储与 API 实例
// ==========================================

use std::sync::{Arc, Mutex};

use anyhow::Context;

use crate::api::{RestaurantApi, ScheduleApi};
use crate::config::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::repository::{
    DayScheduleRepository, GuideAvailabilityRepository, GuideRepository, RestaurantDayRepository,
    ShiftAssignmentRepository, StaffAvailabilityRepository, StaffRepository,
    TourAssignmentRepository, TourSlotRepository,
};

/// 应用状态
///
/// 包含所有 API 实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 导游排班 API
    pub schedule_api: Arc<ScheduleApi>,

    /// 餐厅排班 API
    pub restaurant_api: Arc<RestaurantApi>,

    /// 配置管理器
    pub config: Arc<ConfigManager>,

    /// 导游花名册仓储 (种子数据与管理工具用)
    pub guide_repo: Arc<GuideRepository>,

    /// 员工花名册仓储
    pub staff_repo: Arc<StaffRepository>,
}

impl AppState {
    /// 创建新的 AppState 实例
    ///
    /// # 说明
    /// 该方法会:
    /// 1. 打开共享数据库连接并初始化 schema
    /// 2. 初始化所有 Repository
    /// 3. 创建两个域的 API 实例
    pub fn new(db_path: String) -> anyhow::Result<Self> {
        tracing::info!("初始化 AppState, 数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .with_context(|| format!("打开数据库失败: {}", db_path))?;
        init_schema(&conn).context("初始化 schema 失败")?;
        let conn = Arc::new(Mutex::new(conn));

        let config = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| anyhow::anyhow!("初始化配置管理器失败: {}", e))?,
        );

        let slot_repo = Arc::new(TourSlotRepository::new(conn.clone()));
        let day_repo = Arc::new(DayScheduleRepository::new(conn.clone()));
        let assignment_repo = Arc::new(TourAssignmentRepository::new(conn.clone()));
        let guide_repo = Arc::new(GuideRepository::new(conn.clone()));
        let guide_availability_repo = Arc::new(GuideAvailabilityRepository::new(conn.clone()));

        let restaurant_day_repo = Arc::new(RestaurantDayRepository::new(conn.clone()));
        let shift_repo = Arc::new(ShiftAssignmentRepository::new(conn.clone()));
        let staff_repo = Arc::new(StaffRepository::new(conn.clone()));
        let staff_availability_repo = Arc::new(StaffAvailabilityRepository::new(conn.clone()));

        let schedule_api = Arc::new(ScheduleApi::new(
            config.clone(),
            slot_repo,
            day_repo,
            assignment_repo,
            guide_repo.clone(),
            guide_availability_repo,
        ));

        let restaurant_api = Arc::new(RestaurantApi::new(
            config.clone(),
            restaurant_day_repo,
            shift_repo,
            staff_repo.clone(),
            staff_availability_repo,
        ));

        Ok(Self {
            db_path,
            schedule_api,
            restaurant_api,
            config,
            guide_repo,
            staff_repo,
        })
    }
}
