// ==========================================
// 场馆排班系统 - 导游排班 API
// ==========================================
// 职责: 时段目录生成、日/月台账物化、指派、校验、
//       自动排班、清空、发布门
// 并发口径: 自动排班/清空/发布按"日"为原子单元;
//           单场次写入走乐观锁, 并发改写显式失败
// ==========================================

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::api::error::{config_err, ApiError, ApiResult};
use crate::config::{ConfigManager, RosterConfigReader};
use crate::domain::person::{Guide, GuideAvailability};
use crate::domain::schedule::{DaySchedule, TourAssignment};
use crate::domain::slot::TourSlot;
use crate::domain::types::{BookingChannel, VisitorType};
use crate::domain::violation::{DayValidationReport, Violation};
use crate::engine::validator::AssignmentValidator;
use crate::engine::{AutoAssignOptions, EligibilityEngine, PublishGate, TourAutoScheduler};
use crate::repository::{
    DayScheduleRepository, GuideAvailabilityRepository, GuideRepository, RepositoryError,
    TourAssignmentRepository, TourSlotRepository,
};

// ==========================================
// 返回值结构
// ==========================================

/// 日台账物化结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterializeDayResult {
    pub date: NaiveDate,
    pub sessions_created: usize, // 本次新建场次数
    pub total_sessions: usize,   // 当日场次总数
}

/// 月度物化结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterializeMonthResult {
    pub total_sessions: usize, // 本次新建场次数
    pub days: usize,           // 覆盖天数
}

/// 单场次指派结果: 更新后的场次 + 该指派的违规列表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignOutcome {
    pub assignment: TourAssignment,
    pub violations: Vec<Violation>,
}

/// 自动排班结果
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutoAssignResult {
    pub assigned_count: usize,
    pub unfillable_count: usize,
    pub unfillable_sessions: Vec<String>, // 无解场次ID
    pub standby_guide_id: Option<String>, // 本次补选的候补
    pub errors: Vec<String>,
}

/// 日统计 (管理界面用)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayStats {
    pub date: NaiveDate,
    pub total_slots: usize,
    pub assigned_count: usize,
    pub unassigned_count: usize,
    pub error_count: usize, // 带违规的场次数
    pub has_standby: bool,
    pub is_published: bool,
    pub coverage_percentage: u32,
}

/// 单场次可填性
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotFeasibility {
    pub can_fill: bool,
    pub eligible_count: usize,
    pub is_assigned: bool,
}

/// 预订信息载荷 (引擎不读取)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingDetails {
    pub visitor_count: Option<i64>,
    pub visitor_type: Option<VisitorType>,
    pub booking_channel: Option<BookingChannel>,
    pub notes: Option<String>,
}

// 当日完整上下文 (一次加载, 引擎按快照计算)
struct DayContext {
    schedule: DaySchedule,
    entries: Vec<(TourAssignment, TourSlot)>,
    roster: Vec<Guide>,
    guides_by_id: HashMap<String, Guide>,
    unavailable_ids: HashSet<String>,
}

// ==========================================
// ScheduleApi - 导游排班 API
// ==========================================
pub struct ScheduleApi {
    config: Arc<ConfigManager>,
    slot_repo: Arc<TourSlotRepository>,
    day_repo: Arc<DayScheduleRepository>,
    assignment_repo: Arc<TourAssignmentRepository>,
    guide_repo: Arc<GuideRepository>,
    availability_repo: Arc<GuideAvailabilityRepository>,
    eligibility: EligibilityEngine<ConfigManager>,
    scheduler: TourAutoScheduler<ConfigManager>,
    gate: PublishGate,
}

impl ScheduleApi {
    /// 创建新的 ScheduleApi 实例
    pub fn new(
        config: Arc<ConfigManager>,
        slot_repo: Arc<TourSlotRepository>,
        day_repo: Arc<DayScheduleRepository>,
        assignment_repo: Arc<TourAssignmentRepository>,
        guide_repo: Arc<GuideRepository>,
        availability_repo: Arc<GuideAvailabilityRepository>,
    ) -> Self {
        Self {
            eligibility: EligibilityEngine::new(config.clone()),
            scheduler: TourAutoScheduler::new(config.clone()),
            gate: PublishGate::new(),
            config,
            slot_repo,
            day_repo,
            assignment_repo,
            guide_repo,
            availability_repo,
        }
    }

    // ==========================================
    // 目录与台账物化
    // ==========================================

    /// 生成导览时段目录 (幂等)
    ///
    /// 按配置: 首班整点到末班整点, 每小时一班, 固定时长
    ///
    /// # 返回
    /// 本次新建的时段数; 目录已齐全时为 0
    #[instrument(skip(self))]
    pub async fn generate_slot_catalog(&self) -> ApiResult<usize> {
        let first = self
            .config
            .get_tour_first_start_hour()
            .await
            .map_err(config_err)?;
        let last = self
            .config
            .get_tour_last_start_hour()
            .await
            .map_err(config_err)?;
        let duration = self
            .config
            .get_tour_duration_minutes()
            .await
            .map_err(config_err)?;

        if first > last {
            return Err(ApiError::ConfigError(format!(
                "首班整点 {} 晚于末班整点 {}",
                first, last
            )));
        }

        let mut created = 0;
        for hour in first..=last {
            let start = NaiveTime::from_hms_opt(hour, 0, 0)
                .ok_or_else(|| ApiError::ConfigError(format!("非法整点: {}", hour)))?;
            let end = start + Duration::minutes(duration);
            let slot = TourSlot::new(Uuid::new_v4().to_string(), start, end);
            if self.slot_repo.insert_if_absent(&slot)? {
                created += 1;
            }
        }

        info!(created, "slot catalog generated");
        Ok(created)
    }

    /// 物化某日台账: 每个目录时段一条场次记录 (幂等)
    #[instrument(skip(self), fields(date = %date))]
    pub async fn materialize_day(&self, date: NaiveDate) -> ApiResult<MaterializeDayResult> {
        let slots = self.slot_repo.list_all()?;
        if slots.is_empty() {
            return Err(ApiError::InvalidState(
                "时段目录为空, 请先生成目录".to_string(),
            ));
        }

        self.day_repo.get_or_create(date)?;

        let mut created = 0;
        for slot in &slots {
            let (_, was_created) = self.assignment_repo.get_or_create(date, &slot.slot_id)?;
            if was_created {
                created += 1;
            }
        }

        Ok(MaterializeDayResult {
            date,
            sessions_created: created,
            total_sessions: slots.len(),
        })
    }

    /// 物化整月台账
    ///
    /// 前置条件: 月首日距今不得少于配置的最短提前期
    #[instrument(skip(self))]
    pub async fn materialize_month(&self, year: i32, month: u32) -> ApiResult<MaterializeMonthResult> {
        if !(1..=12).contains(&month) {
            return Err(ApiError::InvalidInput(format!("月份非法: {}", month)));
        }
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| ApiError::InvalidInput(format!("日期非法: {}-{}", year, month)))?;

        let lead_days = self.config.get_lead_time_days().await.map_err(config_err)?;
        let earliest = Utc::now().date_naive() + Duration::days(lead_days);
        if first < earliest {
            return Err(ApiError::PreconditionFailed(format!(
                "排班须至少提前 {} 天创建, 最早可排月份自 {} 起",
                lead_days,
                earliest.format("%Y-%m")
            )));
        }

        let mut total = 0;
        let mut days = 0;
        let mut current = first;
        while current.month() == month {
            let result = self.materialize_day(current).await?;
            total += result.sessions_created;
            days += 1;
            current += Duration::days(1);
        }

        info!(year, month, total, days, "month materialized");
        Ok(MaterializeMonthResult {
            total_sessions: total,
            days,
        })
    }

    // ==========================================
    // 指派与校验
    // ==========================================

    /// 指派 (或撤销指派, guide_id=None) 某日某时段
    ///
    /// 提交走乐观锁: 并发改写返回 Conflict, 绝不静默覆盖。
    /// 返回更新后的场次与该指派的违规列表 (违规不阻止写入,
    /// 接受/拒绝由调用方决定)
    #[instrument(skip(self), fields(date = %date, slot_id = %slot_id))]
    pub async fn assign(
        &self,
        date: NaiveDate,
        slot_id: &str,
        guide_id: Option<&str>,
    ) -> ApiResult<AssignOutcome> {
        let assignment = self
            .assignment_repo
            .find_by_date_slot(date, slot_id)?
            .ok_or_else(|| {
                ApiError::NotFound(format!("场次不存在: date={} slot={}", date, slot_id))
            })?;

        let guide = match guide_id {
            Some(id) => {
                let guide = self
                    .guide_repo
                    .find_by_id(id)?
                    .ok_or_else(|| ApiError::NotFound(format!("导游不存在: {}", id)))?;
                if !guide.is_active {
                    return Err(ApiError::InvalidState(format!("导游已离职: {}", id)));
                }
                Some(guide)
            }
            None => None,
        };

        self.assignment_repo
            .set_guide_checked(&assignment.assignment_id, guide_id, assignment.revision)?;

        let updated = self
            .assignment_repo
            .find_by_id(&assignment.assignment_id)?
            .ok_or_else(|| ApiError::InternalError("场次提交后消失".to_string()))?;

        let violations = match &guide {
            Some(guide) => self.validate_single(&updated, guide).await?,
            None => Vec::new(),
        };

        Ok(AssignOutcome {
            assignment: updated,
            violations,
        })
    }

    /// 更新场次预订信息 (引擎不读取, 仅存取)
    pub async fn set_booking_details(
        &self,
        date: NaiveDate,
        slot_id: &str,
        details: BookingDetails,
    ) -> ApiResult<()> {
        let assignment = self
            .assignment_repo
            .find_by_date_slot(date, slot_id)?
            .ok_or_else(|| {
                ApiError::NotFound(format!("场次不存在: date={} slot={}", date, slot_id))
            })?;

        self.assignment_repo.set_booking_details(
            &assignment.assignment_id,
            details.visitor_count,
            details.visitor_type.map(|v| v.to_string()).as_deref(),
            details.booking_channel.map(|c| c.to_string()).as_deref(),
            details.notes.as_deref(),
        )?;
        Ok(())
    }

    /// 设置/清除当日候补导游
    pub async fn set_standby(&self, date: NaiveDate, guide_id: Option<&str>) -> ApiResult<()> {
        if let Some(id) = guide_id {
            let guide = self
                .guide_repo
                .find_by_id(id)?
                .ok_or_else(|| ApiError::NotFound(format!("导游不存在: {}", id)))?;
            if !guide.is_active {
                return Err(ApiError::InvalidState(format!("导游已离职: {}", id)));
            }
        }
        self.day_repo.set_standby(date, guide_id)?;
        Ok(())
    }

    /// 写导游可用性记录
    ///
    /// 前置条件: 不接受过去日期, 不超出配置的标记窗口
    pub async fn set_guide_availability(
        &self,
        guide_id: &str,
        date: NaiveDate,
        is_available: bool,
        note: Option<String>,
    ) -> ApiResult<()> {
        self.guide_repo
            .find_by_id(guide_id)?
            .ok_or_else(|| ApiError::NotFound(format!("导游不存在: {}", guide_id)))?;

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
        let max_date = today + Duration::days(horizon);
        if date > max_date {
            return Err(ApiError::PreconditionFailed(format!(
                "可用性最多标记到 {} (未来 {} 天)",
                max_date, horizon
            )));
        }

        let now = Utc::now();
        self.availability_repo.upsert(&GuideAvailability {
            guide_id: guide_id.to_string(),
            date,
            is_available,
            note,
            created_at: now,
            updated_at: now,
        })?;
        Ok(())
    }

    /// 某日某时段当前真正可指派的导游
    ///
    /// 结构性准入 (在职/类型/可用性) 再叠加对当日现状的校验过滤,
    /// 结果即"现在点谁都不会产生违规"的名单
    #[instrument(skip(self), fields(date = %date, slot_id = %slot_id))]
    pub async fn eligible_guides(&self, date: NaiveDate, slot_id: &str) -> ApiResult<Vec<Guide>> {
        let slot = self
            .slot_repo
            .find_by_id(slot_id)?
            .ok_or_else(|| ApiError::NotFound(format!("时段不存在: {}", slot_id)))?;

        let roster = self.guide_repo.list_active()?;
        let unavailable_ids: HashSet<String> = self
            .availability_repo
            .unavailable_guide_ids(date)?
            .into_iter()
            .collect();

        let structural = self
            .eligibility
            .eligible_guides(&slot, date, &roster, &unavailable_ids)
            .await
            .map_err(config_err)?;

        let rules = self.config.get_roster_rules().await.map_err(config_err)?;
        let validator = AssignmentValidator::new(rules);
        let slots_by_id = self.slot_index()?;

        let mut valid = Vec::new();
        for guide in structural {
            let held = self.guide_slots_on(&guide.guide_id, date, slot_id, &slots_by_id)?;
            if validator
                .validate_assignment(&guide, &slot, date, false, &held)
                .is_empty()
            {
                valid.push(guide);
            }
        }
        Ok(valid)
    }

    /// 校验整日台账
    pub async fn validate_day(&self, date: NaiveDate) -> ApiResult<DayValidationReport> {
        let ctx = self.load_day_context(date).await?;
        let rules = self.config.get_roster_rules().await.map_err(config_err)?;
        let validator = AssignmentValidator::new(rules);
        Ok(validator.validate_day(
            &ctx.schedule,
            &ctx.entries,
            &ctx.guides_by_id,
            &ctx.unavailable_ids,
        ))
    }

    // ==========================================
    // 自动排班
    // ==========================================

    /// 自动排班: 引擎按日快照计算, 本方法按乐观锁提交
    ///
    /// 单个场次的并发冲突降级为 errors 记录, 不中止整日提交
    #[instrument(skip(self), fields(date = %date))]
    pub async fn auto_assign(
        &self,
        date: NaiveDate,
        options: AutoAssignOptions,
    ) -> ApiResult<AutoAssignResult> {
        let ctx = self.load_day_context(date).await?;
        let plan = self
            .scheduler
            .plan_day(
                &ctx.schedule,
                &ctx.entries,
                &ctx.roster,
                &ctx.unavailable_ids,
                options,
            )
            .await
            .map_err(config_err)?;

        let mut result = AutoAssignResult {
            unfillable_count: plan.unfillable_count(),
            unfillable_sessions: plan.unfillable.clone(),
            errors: plan.errors.clone(),
            ..Default::default()
        };

        for planned in &plan.assignments {
            match self.assignment_repo.set_guide_checked(
                &planned.assignment_id,
                Some(&planned.guide_id),
                planned.expected_revision,
            ) {
                Ok(()) => result.assigned_count += 1,
                Err(RepositoryError::OptimisticLockFailure { .. }) => {
                    warn!(assignment_id = %planned.assignment_id, "concurrent edit, skipping");
                    result
                        .errors
                        .push(format!("场次被并发修改, 已跳过: {}", planned.assignment_id));
                }
                Err(e) => return Err(e.into()),
            }
        }

        if let Some(standby_id) = &plan.standby_guide_id {
            self.day_repo.set_standby(date, Some(standby_id))?;
            result.standby_guide_id = Some(standby_id.clone());
        }

        info!(
            assigned = result.assigned_count,
            unfillable = result.unfillable_count,
            "auto-assign committed"
        );
        Ok(result)
    }

    /// 清空某日: 撤销发布, 清除全部指派/预订信息与候补
    #[instrument(skip(self), fields(date = %date))]
    pub async fn clear_day(&self, date: NaiveDate) -> ApiResult<usize> {
        self.day_repo
            .find_by_date(date)?
            .ok_or_else(|| ApiError::NotFound(format!("日台账不存在: {}", date)))?;

        self.day_repo.set_published(date, false)?;
        self.day_repo.set_standby(date, None)?;
        let cleared = self.assignment_repo.clear_day(date)?;
        Ok(cleared)
    }

    // ==========================================
    // 发布门
    // ==========================================

    /// 发布预检: 零违规才放行
    pub async fn can_publish(&self, date: NaiveDate) -> ApiResult<(bool, Vec<Violation>)> {
        let report = self.validate_day(date).await?;
        Ok(self.gate.can_publish_day(&report))
    }

    /// 发布某日台账
    ///
    /// 失败即拒绝 (fail-closed), 携带完整违规列表。
    /// 发布不锁台账, 后续编辑后的再次发布会重新校验
    #[instrument(skip(self), fields(date = %date))]
    pub async fn publish(&self, date: NaiveDate) -> ApiResult<()> {
        let (can_publish, violations) = self.can_publish(date).await?;
        if !can_publish {
            return Err(ApiError::PublishBlocked { violations });
        }
        self.day_repo.set_published(date, true)?;
        info!("day published");
        Ok(())
    }

    /// 撤销发布 (总是允许, 不触碰场次)
    pub async fn unpublish(&self, date: NaiveDate) -> ApiResult<()> {
        self.day_repo
            .find_by_date(date)?
            .ok_or_else(|| ApiError::NotFound(format!("日台账不存在: {}", date)))?;
        self.day_repo.set_published(date, false)?;
        Ok(())
    }

    // ==========================================
    // 统计与可填性
    // ==========================================

    /// 某日全部场次 (时段序), 供管理界面与报表
    pub async fn day_assignments(&self, date: NaiveDate) -> ApiResult<Vec<TourAssignment>> {
        self.day_repo
            .find_by_date(date)?
            .ok_or_else(|| ApiError::NotFound(format!("日台账不存在: {}", date)))?;
        Ok(self.assignment_repo.list_for_day(date)?)
    }

    /// 某日台账元信息
    pub async fn day_schedule(&self, date: NaiveDate) -> ApiResult<DaySchedule> {
        self.day_repo
            .find_by_date(date)?
            .ok_or_else(|| ApiError::NotFound(format!("日台账不存在: {}", date)))
    }

    pub async fn day_stats(&self, date: NaiveDate) -> ApiResult<DayStats> {
        let ctx = self.load_day_context(date).await?;
        let report = self.validate_day(date).await?;

        let total = ctx.entries.len();
        let assigned = ctx
            .entries
            .iter()
            .filter(|(a, _)| a.guide_id.is_some())
            .count();
        let coverage = if total == 0 {
            0
        } else {
            ((assigned as f64 / total as f64) * 100.0).round() as u32
        };

        Ok(DayStats {
            date,
            total_slots: total,
            assigned_count: assigned,
            unassigned_count: total - assigned,
            error_count: report.per_assignment.len(),
            has_standby: ctx.schedule.standby_guide_id.is_some(),
            is_published: ctx.schedule.is_published,
            coverage_percentage: coverage,
        })
    }

    /// 每个场次当前能否找到人 (管理界面的可填性提示)
    pub async fn day_feasibility(
        &self,
        date: NaiveDate,
    ) -> ApiResult<BTreeMap<String, SlotFeasibility>> {
        let ctx = self.load_day_context(date).await?;

        let mut feasibility = BTreeMap::new();
        for (assignment, slot) in &ctx.entries {
            let eligible = self.eligible_guides(date, &slot.slot_id).await?;
            feasibility.insert(
                assignment.assignment_id.clone(),
                SlotFeasibility {
                    can_fill: !eligible.is_empty(),
                    eligible_count: eligible.len(),
                    is_assigned: assignment.guide_id.is_some(),
                },
            );
        }
        Ok(feasibility)
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    fn slot_index(&self) -> ApiResult<HashMap<String, TourSlot>> {
        Ok(self
            .slot_repo
            .list_all()?
            .into_iter()
            .map(|s| (s.slot_id.clone(), s))
            .collect())
    }

    /// 某导游某日持有的时段 (排除指定时段)
    fn guide_slots_on(
        &self,
        guide_id: &str,
        date: NaiveDate,
        exclude_slot_id: &str,
        slots_by_id: &HashMap<String, TourSlot>,
    ) -> ApiResult<Vec<TourSlot>> {
        let held = self.assignment_repo.list_for_guide_on(guide_id, date)?;
        Ok(held
            .iter()
            .filter(|a| a.slot_id != exclude_slot_id)
            .filter_map(|a| slots_by_id.get(&a.slot_id).cloned())
            .collect())
    }

    /// 单场次校验 (指派提交后对最新状态复核)
    async fn validate_single(
        &self,
        assignment: &TourAssignment,
        guide: &Guide,
    ) -> ApiResult<Vec<Violation>> {
        let slots_by_id = self.slot_index()?;
        let slot = slots_by_id
            .get(&assignment.slot_id)
            .ok_or_else(|| ApiError::InvalidState(format!("时段已不在目录: {}", assignment.slot_id)))?;

        let is_unavailable = self
            .availability_repo
            .find(&guide.guide_id, assignment.date)?
            .map(|a| !a.is_available)
            .unwrap_or(false);

        let others =
            self.guide_slots_on(&guide.guide_id, assignment.date, &assignment.slot_id, &slots_by_id)?;

        let rules = self.config.get_roster_rules().await.map_err(config_err)?;
        let validator = AssignmentValidator::new(rules);
        Ok(validator.validate_assignment(guide, slot, assignment.date, is_unavailable, &others))
    }

    async fn load_day_context(&self, date: NaiveDate) -> ApiResult<DayContext> {
        let schedule = self
            .day_repo
            .find_by_date(date)?
            .ok_or_else(|| ApiError::NotFound(format!("日台账不存在: {}", date)))?;

        let slots_by_id = self.slot_index()?;
        let assignments = self.assignment_repo.list_for_day(date)?;
        let mut entries = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            let slot = slots_by_id.get(&assignment.slot_id).cloned().ok_or_else(|| {
                ApiError::InvalidState(format!("场次引用的时段已不在目录: {}", assignment.slot_id))
            })?;
            entries.push((assignment, slot));
        }

        let roster = self.guide_repo.list_active()?;
        let guides_by_id: HashMap<String, Guide> = self
            .guide_repo
            .list_all()?
            .into_iter()
            .map(|g| (g.guide_id.clone(), g))
            .collect();
        let unavailable_ids: HashSet<String> = self
            .availability_repo
            .unavailable_guide_ids(date)?
            .into_iter()
            .collect();

        Ok(DayContext {
            schedule,
            entries,
            roster,
            guides_by_id,
            unavailable_ids,
        })
    }
}
