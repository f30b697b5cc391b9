// ==========================================
// 场馆排班系统 - 自动排班引擎 (导游域)
// ==========================================
// 目标: 填满当日全部未指派场次, 同时
// (a) 满足校验器全部规则
// (b) 最小化当日动用的导游人数
// (c) 可填的场次绝不留空
// 策略: 最受约束时段优先的贪心 + 倾向续用已上工导游
// 红线: 单个场次无解只记录不中止, 部分成功是常态
// ==========================================
// 硬约束 (与校验器口径一致):
// - 单人单日场次上限 (默认 4)
// - 仅隔最小缓冲的连续场次上限 (默认 2)
// - 当日第 3 场起, 该导游场次间必须存在一个长休息档 (默认 >= 90 分钟)
// ==========================================

use crate::config::{RosterConfigReader, RosterRules};
use crate::domain::person::Guide;
use crate::domain::schedule::{DaySchedule, TourAssignment};
use crate::domain::slot::TourSlot;
use crate::engine::eligibility::EligibilityCore;
use crate::engine::validator::AssignmentValidator;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, info, instrument};

// ==========================================
// AutoAssignOptions - 排班选项
// ==========================================
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AutoAssignOptions {
    /// 排完场次后是否顺带补选候补导游
    pub assign_standby: bool,
}

impl Default for AutoAssignOptions {
    fn default() -> Self {
        Self {
            assign_standby: true,
        }
    }
}

// ==========================================
// AutoAssignPlan - 排班决策 (未落库)
// ==========================================
// 引擎只计算, 提交由 API 层在同一日语义内完成

/// 单条指派决策, 携带读取时的修订号供乐观提交
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedAssignment {
    pub assignment_id: String, // 场次ID
    pub guide_id: String,      // 选中导游
    pub expected_revision: i64, // 快照修订号
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutoAssignPlan {
    pub assignments: Vec<PlannedAssignment>, // 指派决策
    pub unfillable: Vec<String>,             // 无解场次ID
    pub standby_guide_id: Option<String>,    // 补选的候补导游
    pub errors: Vec<String>,                 // 结构性错误 (空花名册等)
}

impl AutoAssignPlan {
    pub fn assigned_count(&self) -> usize {
        self.assignments.len()
    }

    pub fn unfillable_count(&self) -> usize {
        self.unfillable.len()
    }
}

// ==========================================
// TourAutoScheduler - 自动排班器
// ==========================================
pub struct TourAutoScheduler<C>
where
    C: RosterConfigReader,
{
    config: Arc<C>,
}

impl<C> TourAutoScheduler<C>
where
    C: RosterConfigReader,
{
    pub fn new(config: Arc<C>) -> Self {
        Self { config }
    }

    /// 为某日计算一份排班决策
    ///
    /// # 参数
    /// - schedule: 日台账快照
    /// - entries: 当日全部 (场次, 时段) 对 (含已指派的, 其负载计入各导游当日上限)
    /// - roster: 在职花名册 (姓名序)
    /// - unavailable_ids: 当日明确标记不可用的导游ID集合
    /// - options: 排班选项 (是否补选候补)
    ///
    /// # 返回
    /// AutoAssignPlan: 决策 + 无解场次 + 结构性错误; 本方法不写任何状态
    #[instrument(skip_all, fields(date = %schedule.date, total = entries.len()))]
    pub async fn plan_day(
        &self,
        schedule: &DaySchedule,
        entries: &[(TourAssignment, TourSlot)],
        roster: &[Guide],
        unavailable_ids: &HashSet<String>,
        options: AutoAssignOptions,
    ) -> Result<AutoAssignPlan, Box<dyn Error>> {
        let rules = self.config.get_roster_rules().await?;
        let validator = AssignmentValidator::new(rules);
        let mut plan = AutoAssignPlan::default();

        let unassigned: Vec<&(TourAssignment, TourSlot)> = entries
            .iter()
            .filter(|(a, _)| a.guide_id.is_none())
            .collect();

        if unassigned.is_empty() {
            plan.errors.push("No unassigned sessions found".to_string());
            return Ok(plan);
        }

        if roster.is_empty() {
            plan.errors.push("No active guides available".to_string());
            plan.unfillable = unassigned
                .iter()
                .map(|(a, _)| a.assignment_id.clone())
                .collect();
            return Ok(plan);
        }

        // 当日已指派场次计入各导游负载 (上限/连场/长休息都要看全量)
        let mut held_slots: HashMap<String, Vec<TourSlot>> = HashMap::new();
        for (assignment, slot) in entries {
            if let Some(guide_id) = &assignment.guide_id {
                held_slots
                    .entry(guide_id.clone())
                    .or_default()
                    .push(slot.clone());
            }
        }
        for slots in held_slots.values_mut() {
            slots.sort_by_key(|s| s.start_time);
        }

        // 每个未指派时段的可行集 (结构准入 ∩ 当前状态下可过校验)
        // 先按可行集大小升序排定处理顺序: 选择最少的时段最先处理
        let mut session_options: Vec<(&TourAssignment, &TourSlot, usize)> = unassigned
            .iter()
            .map(|(assignment, slot)| {
                let feasible = self
                    .feasible_candidates(&validator, &rules, slot, schedule, roster, unavailable_ids, &held_slots)
                    .len();
                (assignment, slot, feasible)
            })
            .collect();
        session_options.sort_by(|a, b| a.2.cmp(&b.2).then(a.1.start_time.cmp(&b.1.start_time)));

        for (assignment, slot, _) in session_options {
            // 空档/连场约束随已成指派而变, 每个时段都要按当前状态重算
            let valid = self.feasible_candidates(
                &validator,
                &rules,
                slot,
                schedule,
                roster,
                unavailable_ids,
                &held_slots,
            );

            if valid.is_empty() {
                debug!(slot = %slot, "no valid candidate, recording unfillable");
                plan.unfillable.push(assignment.assignment_id.clone());
                continue;
            }

            let chosen = select_candidate(&valid, &held_slots, slot, &rules);

            held_slots
                .entry(chosen.guide_id.clone())
                .or_default()
                .push((*slot).clone());
            held_slots
                .get_mut(&chosen.guide_id)
                .unwrap()
                .sort_by_key(|s| s.start_time);

            plan.assignments.push(PlannedAssignment {
                assignment_id: assignment.assignment_id.clone(),
                guide_id: chosen.guide_id.clone(),
                expected_revision: assignment.revision,
            });
        }

        // 候补导游: 负载最少且当日可用者 (平手取花名册序)
        if options.assign_standby && schedule.standby_guide_id.is_none() {
            let total_slots = entries.len();
            plan.standby_guide_id = roster
                .iter()
                .filter(|g| !unavailable_ids.contains(&g.guide_id))
                .filter(|g| held_slots.get(&g.guide_id).map_or(0, Vec::len) < total_slots)
                .min_by_key(|g| held_slots.get(&g.guide_id).map_or(0, Vec::len))
                .map(|g| g.guide_id.clone());
        }

        info!(
            assigned = plan.assignments.len(),
            unfillable = plan.unfillable.len(),
            "auto-assign plan computed"
        );
        Ok(plan)
    }

    /// 当前部分状态下, 某时段真正可指派的候选集
    #[allow(clippy::too_many_arguments)]
    fn feasible_candidates(
        &self,
        validator: &AssignmentValidator,
        rules: &RosterRules,
        slot: &TourSlot,
        schedule: &DaySchedule,
        roster: &[Guide],
        unavailable_ids: &HashSet<String>,
        held_slots: &HashMap<String, Vec<TourSlot>>,
    ) -> Vec<Guide> {
        let structural =
            EligibilityCore::filter_structural(slot, rules.morning_cutoff, roster, unavailable_ids);

        structural
            .into_iter()
            .filter(|g| {
                let held = held_slots
                    .get(&g.guide_id)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);

                // 基础校验: 类型/可用性/空档 (假设性指派)
                if !validator
                    .validate_assignment(g, slot, schedule.date, false, held)
                    .is_empty()
                {
                    return false;
                }

                // 上限: 单日场次数
                if held.len() >= rules.max_tours_per_day {
                    return false;
                }

                // 连场: 含新场次的紧凑连段不得超限
                if run_length_with(held, slot, rules.min_buffer_minutes)
                    > rules.max_consecutive_tours
                {
                    return false;
                }

                // 长休息: 到第 3 场起必须已经(或仍能)留出长休息档
                if held.len() >= 2 {
                    let mut future: Vec<TourSlot> = held.to_vec();
                    future.push(slot.clone());
                    future.sort_by_key(|s| s.start_time);
                    if future.len() >= 3 && !has_long_break(&future, rules.long_break_minutes) {
                        return false;
                    }
                }

                true
            })
            .collect()
    }
}

/// 在有效候选中挑人:
/// 1) 优先已上工且未到连场上限者, 同等条件取当日负载更高者 (集中用人, 压低人数);
/// 2) 全无已上工候选时, 取第一个零负载候选 (确定性顺序)
/// 平手一律取先出现者, 保证结果可复现
fn select_candidate<'a>(
    valid: &'a [Guide],
    held_slots: &HashMap<String, Vec<TourSlot>>,
    slot: &TourSlot,
    rules: &RosterRules,
) -> &'a Guide {
    let load = |g: &Guide| held_slots.get(&g.guide_id).map_or(0, Vec::len);

    let mut best: Option<(&Guide, (bool, usize))> = None;
    for g in valid.iter() {
        if load(g) == 0 {
            continue;
        }
        let held = held_slots
            .get(&g.guide_id)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let run = run_length_with(held, slot, rules.min_buffer_minutes);
        let key = (run < rules.max_consecutive_tours, load(g));
        match &best {
            Some((_, best_key)) if key <= *best_key => {}
            _ => best = Some((g, key)),
        }
    }

    match best {
        Some((g, _)) => g,
        // 无已上工候选: 启用新导游
        None => &valid[0],
    }
}

/// 把新时段并入已持有时段后, 包含它的"紧凑连段"长度
///
/// 紧凑: 相邻两场恰好只隔最小缓冲 (空档 == min_buffer)
fn run_length_with(held: &[TourSlot], new_slot: &TourSlot, min_buffer_minutes: i64) -> usize {
    let mut all: Vec<TourSlot> = held.to_vec();
    all.push(new_slot.clone());
    all.sort_by_key(|s| s.start_time);

    let pos = all
        .iter()
        .position(|s| s.slot_id == new_slot.slot_id)
        .expect("new slot present after push");

    let tight = |a: &TourSlot, b: &TourSlot| a.gap_minutes(b) == Some(min_buffer_minutes);

    let mut run = 1;
    let mut i = pos;
    while i > 0 && tight(&all[i - 1], &all[i]) {
        run += 1;
        i -= 1;
    }
    let mut j = pos;
    while j + 1 < all.len() && tight(&all[j], &all[j + 1]) {
        run += 1;
        j += 1;
    }
    run
}

/// 时段序列中是否存在一个长休息档 (相邻空档 >= long_break_minutes)
///
/// 0-1 场无需休息档
fn has_long_break(sorted_slots: &[TourSlot], long_break_minutes: i64) -> bool {
    if sorted_slots.len() <= 1 {
        return true;
    }
    sorted_slots.windows(2).any(|pair| {
        pair[0]
            .gap_minutes(&pair[1])
            .is_some_and(|gap| gap >= long_break_minutes)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{GuideType, SessionStatus};
    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveTime, Utc};

    // ==========================================
    // 测试辅助
    // ==========================================

    /// 内存配置: 全部默认值
    struct TestConfig;

    #[async_trait(?Send)]
    impl RosterConfigReader for TestConfig {
        async fn get_min_buffer_minutes(&self) -> Result<i64, Box<dyn Error>> {
            Ok(30)
        }
        async fn get_long_break_minutes(&self) -> Result<i64, Box<dyn Error>> {
            Ok(90)
        }
        async fn get_max_tours_per_day(&self) -> Result<usize, Box<dyn Error>> {
            Ok(4)
        }
        async fn get_max_consecutive_tours(&self) -> Result<usize, Box<dyn Error>> {
            Ok(2)
        }
        async fn get_morning_cutoff(&self) -> Result<NaiveTime, Box<dyn Error>> {
            Ok(NaiveTime::from_hms_opt(14, 30, 0).unwrap())
        }
        async fn get_tour_first_start_hour(&self) -> Result<u32, Box<dyn Error>> {
            Ok(10)
        }
        async fn get_tour_last_start_hour(&self) -> Result<u32, Box<dyn Error>> {
            Ok(20)
        }
        async fn get_tour_duration_minutes(&self) -> Result<i64, Box<dyn Error>> {
            Ok(90)
        }
        async fn get_lead_time_days(&self) -> Result<i64, Box<dyn Error>> {
            Ok(14)
        }
        async fn get_availability_horizon_days(&self) -> Result<i64, Box<dyn Error>> {
            Ok(90)
        }
        async fn get_operating_start(&self) -> Result<NaiveTime, Box<dyn Error>> {
            Ok(NaiveTime::from_hms_opt(10, 0, 0).unwrap())
        }
        async fn get_operating_end(&self) -> Result<NaiveTime, Box<dyn Error>> {
            Ok(NaiveTime::from_hms_opt(21, 30, 0).unwrap())
        }
        async fn get_coverage_sample_minutes(&self) -> Result<i64, Box<dyn Error>> {
            Ok(30)
        }
        async fn get_min_kitchen_on_duty(&self) -> Result<u32, Box<dyn Error>> {
            Ok(2)
        }
        async fn get_min_serving_on_duty(&self) -> Result<u32, Box<dyn Error>> {
            Ok(2)
        }
    }

    fn guide(id: &str, name: &str, guide_type: GuideType) -> Guide {
        Guide {
            guide_id: id.to_string(),
            name: name.to_string(),
            guide_type,
            phone: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn slot(id: &str, sh: u32, sm: u32) -> TourSlot {
        // 90 分钟导览
        let start = NaiveTime::from_hms_opt(sh, sm, 0).unwrap();
        let end = start + chrono::Duration::minutes(90);
        TourSlot::new(id, start, end)
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn day() -> DaySchedule {
        DaySchedule {
            date: date(),
            standby_guide_id: None,
            is_published: false,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn entry(id: &str, slot: TourSlot, guide_id: Option<&str>) -> (TourAssignment, TourSlot) {
        (
            TourAssignment {
                assignment_id: id.to_string(),
                date: date(),
                slot_id: slot.slot_id.clone(),
                guide_id: guide_id.map(|s| s.to_string()),
                status: SessionStatus::Scheduled,
                visitor_count: None,
                visitor_type: None,
                booking_channel: None,
                notes: None,
                revision: 0,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            slot,
        )
    }

    fn scheduler() -> TourAutoScheduler<TestConfig> {
        TourAutoScheduler::new(Arc::new(TestConfig))
    }

    // ==========================================
    // 纯函数测试
    // ==========================================

    #[test]
    fn test_run_length_counts_both_directions() {
        // 已持有 10:00 与 14:00 (各 90 分钟), 新场次 12:00 插中间:
        // 10:00-11:30 ~30~ 12:00-13:30 ~30~ 14:00-15:30 => 连段 3
        let held = vec![slot("a", 10, 0), slot("c", 14, 0)];
        assert_eq!(run_length_with(&held, &slot("b", 12, 0), 30), 3);
    }

    #[test]
    fn test_run_breaks_on_longer_gap() {
        let held = vec![slot("a", 10, 0)];
        // 13:00 开始: 空档 90 分钟, 不算紧凑连段
        assert_eq!(run_length_with(&held, &slot("b", 13, 0), 30), 1);
    }

    #[test]
    fn test_has_long_break() {
        let slots = vec![slot("a", 10, 0), slot("b", 13, 0)];
        assert!(has_long_break(&slots, 90));
        let tight = vec![slot("a", 10, 0), slot("b", 12, 0)];
        assert!(!has_long_break(&tight, 90));
    }

    // ==========================================
    // 排班器场景测试
    // ==========================================

    #[tokio::test]
    async fn test_single_guide_single_slot_fills() {
        let roster = vec![guide("g1", "Ana", GuideType::FullTime)];
        let entries = vec![entry("a1", slot("s1", 10, 0), None)];

        let plan = scheduler()
            .plan_day(&day(), &entries, &roster, &HashSet::new(), AutoAssignOptions::default())
            .await
            .unwrap();

        assert_eq!(plan.assigned_count(), 1);
        assert_eq!(plan.unfillable_count(), 0);
        assert_eq!(plan.assignments[0].guide_id, "g1");
        assert!(plan.errors.is_empty());
    }

    #[tokio::test]
    async fn test_empty_roster_reports_error_and_unfillable() {
        let entries = vec![entry("a1", slot("s1", 10, 0), None)];

        let plan = scheduler()
            .plan_day(&day(), &entries, &[], &HashSet::new(), AutoAssignOptions::default())
            .await
            .unwrap();

        assert_eq!(plan.assigned_count(), 0);
        assert_eq!(plan.unfillable_count(), 1);
        assert!(plan
            .errors
            .iter()
            .any(|e| e.contains("No active guides")));
    }

    #[tokio::test]
    async fn test_no_unassigned_sessions_is_structural_error() {
        let roster = vec![guide("g1", "Ana", GuideType::FullTime)];
        let entries = vec![entry("a1", slot("s1", 10, 0), Some("g1"))];

        let plan = scheduler()
            .plan_day(&day(), &entries, &roster, &HashSet::new(), AutoAssignOptions::default())
            .await
            .unwrap();

        assert_eq!(plan.assigned_count(), 0);
        assert!(plan
            .errors
            .iter()
            .any(|e| e.contains("No unassigned sessions")));
    }

    #[tokio::test]
    async fn test_concentrates_work_on_one_guide() {
        // 两个间隔充分的时段, 两名导游: 应集中给同一人
        let roster = vec![
            guide("g1", "Ana", GuideType::FullTime),
            guide("g2", "Bo", GuideType::FullTime),
        ];
        let entries = vec![
            entry("a1", slot("s1", 10, 0), None),
            entry("a2", slot("s2", 12, 0), None),
        ];

        let plan = scheduler()
            .plan_day(&day(), &entries, &roster, &HashSet::new(), AutoAssignOptions::default())
            .await
            .unwrap();

        assert_eq!(plan.assigned_count(), 2);
        let used: HashSet<&str> = plan.assignments.iter().map(|a| a.guide_id.as_str()).collect();
        assert_eq!(used.len(), 1, "expected a single guide to take both slots");
    }

    #[tokio::test]
    async fn test_respects_max_tours_per_day() {
        // 单导游, 5 个彼此留足长休息档的时段: 上限 4, 第 5 个无解
        let roster = vec![guide("g1", "Ana", GuideType::FullTime)];
        let entries = vec![
            entry("a1", slot("s1", 8, 0), None),
            entry("a2", slot("s2", 11, 0), None),
            entry("a3", slot("s3", 14, 0), None),
            entry("a4", slot("s4", 17, 0), None),
            entry("a5", slot("s5", 20, 0), None),
        ];

        let plan = scheduler()
            .plan_day(&day(), &entries, &roster, &HashSet::new(), AutoAssignOptions::default())
            .await
            .unwrap();

        assert_eq!(plan.assigned_count(), 4);
        assert_eq!(plan.unfillable_count(), 1);
    }

    #[tokio::test]
    async fn test_no_third_consecutive_tour() {
        // 三个只隔最小缓冲的时段: 同一人最多连 2 场, 第三场换人
        let roster = vec![
            guide("g1", "Ana", GuideType::FullTime),
            guide("g2", "Bo", GuideType::FullTime),
        ];
        let entries = vec![
            entry("a1", slot("s1", 10, 0), None),
            entry("a2", slot("s2", 12, 0), None),
            entry("a3", slot("s3", 14, 0), None),
        ];

        let plan = scheduler()
            .plan_day(&day(), &entries, &roster, &HashSet::new(), AutoAssignOptions::default())
            .await
            .unwrap();

        assert_eq!(plan.assigned_count(), 3);
        let mut per_guide: HashMap<&str, Vec<&str>> = HashMap::new();
        for a in &plan.assignments {
            per_guide
                .entry(a.guide_id.as_str())
                .or_default()
                .push(a.assignment_id.as_str());
        }
        // 没有导游拿满全部三场
        assert!(per_guide.values().all(|v| v.len() <= 2));
    }

    #[tokio::test]
    async fn test_existing_assignments_count_toward_cap() {
        // 已持有 4 场的导游不能再接第 5 场
        let roster = vec![guide("g1", "Ana", GuideType::FullTime)];
        let entries = vec![
            entry("a1", slot("s1", 8, 0), Some("g1")),
            entry("a2", slot("s2", 11, 0), Some("g1")),
            entry("a3", slot("s3", 14, 0), Some("g1")),
            entry("a4", slot("s4", 17, 0), Some("g1")),
            entry("a5", slot("s5", 20, 0), None),
        ];

        let plan = scheduler()
            .plan_day(&day(), &entries, &roster, &HashSet::new(), AutoAssignOptions::default())
            .await
            .unwrap();

        assert_eq!(plan.assigned_count(), 0);
        assert_eq!(plan.unfillable, vec!["a5".to_string()]);
    }

    #[tokio::test]
    async fn test_unavailable_guide_not_used() {
        let roster = vec![
            guide("g1", "Ana", GuideType::FullTime),
            guide("g2", "Bo", GuideType::FullTime),
        ];
        let mut unavailable = HashSet::new();
        unavailable.insert("g1".to_string());

        let entries = vec![entry("a1", slot("s1", 10, 0), None)];
        let plan = scheduler()
            .plan_day(&day(), &entries, &roster, &unavailable, AutoAssignOptions::default())
            .await
            .unwrap();

        assert_eq!(plan.assignments[0].guide_id, "g2");
    }

    #[tokio::test]
    async fn test_standby_picks_least_loaded_available() {
        let roster = vec![
            guide("g1", "Ana", GuideType::FullTime),
            guide("g2", "Bo", GuideType::FullTime),
        ];
        let entries = vec![
            entry("a1", slot("s1", 10, 0), None),
            entry("a2", slot("s2", 12, 0), None),
        ];

        let plan = scheduler()
            .plan_day(&day(), &entries, &roster, &HashSet::new(), AutoAssignOptions::default())
            .await
            .unwrap();

        // g1 集中接两场, 候补落到零负载的 g2
        assert_eq!(plan.standby_guide_id.as_deref(), Some("g2"));
    }

    #[tokio::test]
    async fn test_morning_slots_prefer_compatible_guides() {
        // PTM 只能接 14:30 前结束的时段; 下午场全部落到 FT
        let roster = vec![
            guide("g1", "Ana", GuideType::PartTimeMorning),
            guide("g2", "Bo", GuideType::FullTime),
        ];
        let entries = vec![
            entry("a1", slot("s1", 10, 0), None),
            entry("a2", slot("s2", 15, 0), None),
            entry("a3", slot("s3", 18, 0), None),
        ];

        let plan = scheduler()
            .plan_day(&day(), &entries, &roster, &HashSet::new(), AutoAssignOptions::default())
            .await
            .unwrap();

        assert_eq!(plan.assigned_count(), 3);
        for a in &plan.assignments {
            if a.assignment_id != "a1" {
                assert_eq!(a.guide_id, "g2");
            }
        }
    }

    #[tokio::test]
    async fn test_third_tour_requires_long_break() {
        // g1 已持有 10:00 与 12:00 (紧凑对); 新增 14:00 会是第 3 场
        // 且三场之间无 >=90 分钟空档 -> 必须换人
        let roster = vec![
            guide("g1", "Ana", GuideType::FullTime),
            guide("g2", "Bo", GuideType::FullTime),
        ];
        let entries = vec![
            entry("a1", slot("s1", 10, 0), Some("g1")),
            entry("a2", slot("s2", 12, 0), Some("g1")),
            entry("a3", slot("s3", 14, 0), None),
        ];

        let plan = scheduler()
            .plan_day(&day(), &entries, &roster, &HashSet::new(), AutoAssignOptions::default())
            .await
            .unwrap();

        assert_eq!(plan.assigned_count(), 1);
        assert_eq!(plan.assignments[0].guide_id, "g2");
    }
}
