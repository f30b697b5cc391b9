// ==========================================
// 场馆排班系统 - 餐厅排班 API
// ==========================================
// 职责: 班次模板按日实例化、指派、覆盖率校验、
//       自动填充、清空、发布门 (发布带时间戳)
// ==========================================

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::api::error::{config_err, ApiError, ApiResult};
use crate::config::{ConfigManager, RosterConfigReader};
use crate::domain::person::{RestaurantStaff, StaffAvailability};
use crate::domain::schedule::ShiftAssignment;
use crate::domain::slot::ShiftTemplate;
use crate::domain::types::{ShiftPattern, StaffRole};
use crate::domain::violation::{CoverageReport, Violation};
use crate::engine::{CoverageChecker, PublishGate, ShiftFiller};
use crate::repository::{
    RepositoryError, RestaurantDayRepository, ShiftAssignmentRepository,
    StaffAvailabilityRepository, StaffRepository,
};

// ==========================================
// 返回值结构
// ==========================================

/// 班次实例化结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterializeShiftsResult {
    pub date: NaiveDate,
    pub shifts_created: usize,
    pub total_shifts: usize,
}

/// 单班次指派结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftAssignOutcome {
    pub shift: ShiftAssignment,
    pub violations: Vec<Violation>,
}

/// 自动填充结果
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestaurantAssignResult {
    pub kitchen_assigned: usize,
    pub serving_assigned: usize,
    pub total_staff: usize,
    pub unfillable_count: usize,
    pub unfillable_shifts: Vec<String>, // 无解班次ID
    pub errors: Vec<String>,
}

/// 日汇总 (管理界面用)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub date: NaiveDate,
    pub total_shifts: usize,
    pub assigned_shifts: usize,
    pub unassigned_shifts: usize,
    pub kitchen_staff: usize,
    pub serving_staff: usize,
    pub total_staff: usize,
    pub full_day_shifts: usize,
    pub half_day_shifts: usize,
    pub total_hours: i64,
    pub coverage_valid: bool,
    pub coverage_gaps: usize,
    pub is_published: bool,
}

// ==========================================
// RestaurantApi - 餐厅排班 API
// ==========================================
pub struct RestaurantApi {
    config: Arc<ConfigManager>,
    day_repo: Arc<RestaurantDayRepository>,
    shift_repo: Arc<ShiftAssignmentRepository>,
    staff_repo: Arc<StaffRepository>,
    availability_repo: Arc<StaffAvailabilityRepository>,
    filler: ShiftFiller,
    gate: PublishGate,
}

impl RestaurantApi {
    /// 创建新的 RestaurantApi 实例
    pub fn new(
        config: Arc<ConfigManager>,
        day_repo: Arc<RestaurantDayRepository>,
        shift_repo: Arc<ShiftAssignmentRepository>,
        staff_repo: Arc<StaffRepository>,
        availability_repo: Arc<StaffAvailabilityRepository>,
    ) -> Self {
        Self {
            config,
            day_repo,
            shift_repo,
            staff_repo,
            availability_repo,
            filler: ShiftFiller::new(),
            gate: PublishGate::new(),
        }
    }

    // ==========================================
    // 台账物化
    // ==========================================

    /// 物化某日班次: 按模式实例化固定模板目录 (幂等)
    ///
    /// 当日已有班次实例时不重复创建 (换模式请走 auto_assign,
    /// 它会按新模式重建)
    #[instrument(skip(self), fields(date = %date, pattern = %pattern))]
    pub async fn materialize_day(
        &self,
        date: NaiveDate,
        pattern: ShiftPattern,
    ) -> ApiResult<MaterializeShiftsResult> {
        self.day_repo.get_or_create(date)?;

        let existing = self.shift_repo.list_for_day(date)?;
        if !existing.is_empty() {
            return Ok(MaterializeShiftsResult {
                date,
                shifts_created: 0,
                total_shifts: existing.len(),
            });
        }

        let created = self.instantiate_templates(date, pattern)?;
        Ok(MaterializeShiftsResult {
            date,
            shifts_created: created.len(),
            total_shifts: created.len(),
        })
    }

    /// 指派 (或撤销指派) 某班次
    ///
    /// 岗位不匹配是结构性输入错误, 直接拒绝;
    /// 可用性/一人一班问题作为违规返回, 写入与否由调用方裁决
    #[instrument(skip(self), fields(shift_id))]
    pub async fn assign_shift(
        &self,
        shift_id: &str,
        staff_id: Option<&str>,
    ) -> ApiResult<ShiftAssignOutcome> {
        let shift = self
            .shift_repo
            .find_by_id(shift_id)?
            .ok_or_else(|| ApiError::NotFound(format!("班次不存在: {}", shift_id)))?;

        let staff = match staff_id {
            Some(id) => {
                let staff = self
                    .staff_repo
                    .find_by_id(id)?
                    .ok_or_else(|| ApiError::NotFound(format!("员工不存在: {}", id)))?;
                if !staff.is_active {
                    return Err(ApiError::InvalidState(format!("员工已离职: {}", id)));
                }
                if staff.role != shift.role {
                    return Err(ApiError::InvalidInput(format!(
                        "岗位不匹配: 班次要求 {}, 员工是 {}",
                        shift.role.display_name(),
                        staff.role.display_name()
                    )));
                }
                Some(staff)
            }
            None => None,
        };

        self.shift_repo
            .set_staff_checked(shift_id, staff_id, shift.revision)?;

        let updated = self
            .shift_repo
            .find_by_id(shift_id)?
            .ok_or_else(|| ApiError::InternalError("班次提交后消失".to_string()))?;

        let violations = match &staff {
            Some(staff) => {
                let is_unavailable = self
                    .availability_repo
                    .find(&staff.staff_id, shift.date)?
                    .map(|a| !a.is_available)
                    .unwrap_or(false);
                let others: Vec<ShiftAssignment> = self
                    .shift_repo
                    .list_for_staff_on(&staff.staff_id, shift.date)?
                    .into_iter()
                    .filter(|s| s.shift_id != shift_id)
                    .collect();

                let checker = self.coverage_checker().await?;
                checker.validate_shift_assignment(shift.date, is_unavailable, &others)
            }
            None => Vec::new(),
        };

        Ok(ShiftAssignOutcome {
            shift: updated,
            violations,
        })
    }

    /// 写员工可用性记录 (与导游域同款窗口前置条件)
    pub async fn set_staff_availability(
        &self,
        staff_id: &str,
        date: NaiveDate,
        is_available: bool,
        note: Option<String>,
    ) -> ApiResult<()> {
        self.staff_repo
            .find_by_id(staff_id)?
            .ok_or_else(|| ApiError::NotFound(format!("员工不存在: {}", staff_id)))?;

        let today = Utc::now().date_naive();
        if date < today {
            return Err(ApiError::PreconditionFailed(
                "不能为过去日期标记可用性".to_string(),
            ));
        }
        let horizon = self
            .config
            .get_availability_horizon_days()
            .await
            .map_err(config_err)?;
        let max_date = today + chrono::Duration::days(horizon);
        if date > max_date {
            return Err(ApiError::PreconditionFailed(format!(
                "可用性最多标记到 {} (未来 {} 天)",
                max_date, horizon
            )));
        }

        let now = Utc::now();
        self.availability_repo.upsert(&StaffAvailability {
            staff_id: staff_id.to_string(),
            date,
            is_available,
            note,
            created_at: now,
            updated_at: now,
        })?;
        Ok(())
    }

    // ==========================================
    // 自动填充
    // ==========================================

    /// 自动填充某日班次
    ///
    /// 步骤: 清掉当日既有班次 -> 按模式重建实例 ->
    ///       各岗位可用人员池按序灌入 -> 提交
    #[instrument(skip(self), fields(date = %date, pattern = %pattern))]
    pub async fn auto_assign(
        &self,
        date: NaiveDate,
        pattern: ShiftPattern,
    ) -> ApiResult<RestaurantAssignResult> {
        self.day_repo.get_or_create(date)?;

        // 整日重建: 旧实例 (含模式不同的) 一并废弃
        self.shift_repo.delete_for_day(date)?;
        // 按模板目录的固定顺序灌入 (不经 SQL 排序, 保证确定性)
        let shifts = self.instantiate_templates(date, pattern)?;

        let kitchen_pool = self.available_pool(StaffRole::Kitchen, date)?;
        let serving_pool = self.available_pool(StaffRole::Serving, date)?;

        let plan = self.filler.fill_day(&shifts, &kitchen_pool, &serving_pool);

        let mut result = RestaurantAssignResult {
            kitchen_assigned: plan.kitchen_assigned,
            serving_assigned: plan.serving_assigned,
            total_staff: plan.total_staff(),
            unfillable_count: plan.unfillable_count(),
            unfillable_shifts: plan.unfillable.clone(),
            errors: plan.errors.clone(),
        };

        for planned in &plan.assignments {
            match self.shift_repo.set_staff_checked(
                &planned.shift_id,
                Some(&planned.staff_id),
                planned.expected_revision,
            ) {
                Ok(()) => {}
                Err(RepositoryError::OptimisticLockFailure { .. }) => {
                    warn!(shift_id = %planned.shift_id, "concurrent edit, skipping");
                    result
                        .errors
                        .push(format!("班次被并发修改, 已跳过: {}", planned.shift_id));
                }
                Err(e) => return Err(e.into()),
            }
        }

        info!(
            kitchen = result.kitchen_assigned,
            serving = result.serving_assigned,
            unfillable = result.unfillable_count,
            "restaurant auto-assign committed"
        );
        Ok(result)
    }

    /// 校验某日覆盖情况
    pub async fn validate_day(&self, date: NaiveDate) -> ApiResult<CoverageReport> {
        self.day_repo
            .find_by_date(date)?
            .ok_or_else(|| ApiError::NotFound(format!("餐厅日台账不存在: {}", date)))?;

        let shifts = self.shift_repo.list_for_day(date)?;
        let checker = self.coverage_checker().await?;
        Ok(checker.validate_day(&shifts))
    }

    /// 清空某日: 撤销发布并清除全部指派 (班次实例保留)
    #[instrument(skip(self), fields(date = %date))]
    pub async fn clear_day(&self, date: NaiveDate) -> ApiResult<usize> {
        self.day_repo
            .find_by_date(date)?
            .ok_or_else(|| ApiError::NotFound(format!("餐厅日台账不存在: {}", date)))?;

        self.day_repo.set_published(date, false, None)?;
        let cleared = self.shift_repo.clear_day(date)?;
        Ok(cleared)
    }

    // ==========================================
    // 发布门
    // ==========================================

    pub async fn can_publish(&self, date: NaiveDate) -> ApiResult<(bool, Vec<Violation>)> {
        let report = self.validate_day(date).await?;
        Ok(self.gate.can_publish_restaurant_day(&report))
    }

    /// 发布某日餐厅排班, 打发布时间戳
    #[instrument(skip(self), fields(date = %date))]
    pub async fn publish(&self, date: NaiveDate) -> ApiResult<()> {
        let (can_publish, violations) = self.can_publish(date).await?;
        if !can_publish {
            return Err(ApiError::PublishBlocked { violations });
        }
        self.day_repo.set_published(date, true, Some(Utc::now()))?;
        info!("restaurant day published");
        Ok(())
    }

    /// 撤销发布, 清发布时间戳
    pub async fn unpublish(&self, date: NaiveDate) -> ApiResult<()> {
        self.day_repo
            .find_by_date(date)?
            .ok_or_else(|| ApiError::NotFound(format!("餐厅日台账不存在: {}", date)))?;
        self.day_repo.set_published(date, false, None)?;
        Ok(())
    }

    // ==========================================
    // 汇总
    // ==========================================

    /// 某日全部班次 (时刻序), 供管理界面与报表
    pub async fn day_shifts(&self, date: NaiveDate) -> ApiResult<Vec<ShiftAssignment>> {
        self.day_repo
            .find_by_date(date)?
            .ok_or_else(|| ApiError::NotFound(format!("餐厅日台账不存在: {}", date)))?;
        Ok(self.shift_repo.list_for_day(date)?)
    }

    pub async fn schedule_summary(&self, date: NaiveDate) -> ApiResult<ScheduleSummary> {
        let day = self
            .day_repo
            .find_by_date(date)?
            .ok_or_else(|| ApiError::NotFound(format!("餐厅日台账不存在: {}", date)))?;

        let shifts = self.shift_repo.list_for_day(date)?;
        let report = {
            let checker = self.coverage_checker().await?;
            checker.validate_day(&shifts)
        };

        let assigned: Vec<&ShiftAssignment> = shifts.iter().filter(|s| s.is_assigned()).collect();
        let kitchen_staff: HashSet<&str> = assigned
            .iter()
            .filter(|s| s.role == StaffRole::Kitchen)
            .filter_map(|s| s.staff_id.as_deref())
            .collect();
        let serving_staff: HashSet<&str> = assigned
            .iter()
            .filter(|s| s.role == StaffRole::Serving)
            .filter_map(|s| s.staff_id.as_deref())
            .collect();

        Ok(ScheduleSummary {
            date,
            total_shifts: shifts.len(),
            assigned_shifts: assigned.len(),
            unassigned_shifts: shifts.len() - assigned.len(),
            kitchen_staff: kitchen_staff.len(),
            serving_staff: serving_staff.len(),
            total_staff: kitchen_staff.len() + serving_staff.len(),
            full_day_shifts: assigned.iter().filter(|s| s.is_full_day()).count(),
            half_day_shifts: assigned.iter().filter(|s| s.is_half_day()).count(),
            total_hours: assigned.iter().map(|s| s.duration_hours).sum(),
            coverage_valid: report.is_valid(),
            coverage_gaps: report.gaps.len(),
            is_published: day.is_published,
        })
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    async fn coverage_checker(&self) -> ApiResult<CoverageChecker> {
        let rules = self.config.get_coverage_rules().await.map_err(config_err)?;
        Ok(CoverageChecker::new(rules))
    }

    /// 按模式实例化当日班次 (两个岗位), 返回模板目录顺序的实例列表
    fn instantiate_templates(
        &self,
        date: NaiveDate,
        pattern: ShiftPattern,
    ) -> ApiResult<Vec<ShiftAssignment>> {
        let now = Utc::now();
        let mut created = Vec::new();
        for template in ShiftTemplate::day_catalog(pattern) {
            let shift = ShiftAssignment {
                shift_id: Uuid::new_v4().to_string(),
                date,
                role: template.role,
                start_time: template.start_time,
                end_time: template.end_time,
                duration_hours: template.duration_hours,
                staff_id: None,
                revision: 0,
                created_at: now,
                updated_at: now,
            };
            self.shift_repo.create(&shift)?;
            created.push(shift);
        }
        Ok(created)
    }

    /// 某岗位某日的可用人员池 (在职 + 未标记不可用, 姓名序)
    fn available_pool(
        &self,
        role: StaffRole,
        date: NaiveDate,
    ) -> ApiResult<Vec<RestaurantStaff>> {
        let unavailable: HashSet<String> = self
            .availability_repo
            .unavailable_staff_ids(date)?
            .into_iter()
            .collect();
        Ok(self
            .staff_repo
            .list_active_by_role(role)?
            .into_iter()
            .filter(|s| !unavailable.contains(&s.staff_id))
            .collect())
    }
}
