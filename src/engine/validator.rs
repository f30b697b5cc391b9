// ==========================================
// 场馆排班系统 - 约束校验引擎 (导游域)
// ==========================================
// 两个入口:
// - validate_assignment: 单场次 (也用于假设性指派)
// - validate_day: 整日台账
// 红线: 校验器永不失败, 只返回 (可能为空的) 违规列表;
//       接受/拒绝/提示由调用方决定
// ==========================================

use crate::config::RosterRules;
use crate::domain::person::Guide;
use crate::domain::schedule::{DaySchedule, TourAssignment};
use crate::domain::slot::TourSlot;
use crate::domain::violation::{DayValidationReport, Violation};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use tracing::instrument;

// ==========================================
// AssignmentValidator - 约束校验器
// ==========================================
// 无状态引擎, 规则快照在构造时注入
pub struct AssignmentValidator {
    rules: RosterRules,
}

impl AssignmentValidator {
    pub fn new(rules: RosterRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RosterRules {
        &self.rules
    }

    /// 校验单个 (导游, 时段) 指派
    ///
    /// # 参数
    /// - guide: 候选导游
    /// - slot: 目标时段
    /// - date: 日期
    /// - is_unavailable: 该导游当日是否明确标记不可用
    /// - other_slots: 该导游当日已持有的其他时段 (不含本时段)
    ///
    /// # 检查项
    /// 1. 类型/时间兼容 (准入引擎同款谓词, 此处重查以支持假设性指派)
    /// 2. 当日可用性
    /// 3. 与每个已持有时段的带符号分钟空档:
    ///    重叠 -> Overlap; 0 <= gap < 最小缓冲 -> ShortBuffer
    pub fn validate_assignment(
        &self,
        guide: &Guide,
        slot: &TourSlot,
        date: NaiveDate,
        is_unavailable: bool,
        other_slots: &[TourSlot],
    ) -> Vec<Violation> {
        let mut violations = Vec::new();

        if !guide.can_work_slot(slot, self.rules.morning_cutoff) {
            violations.push(Violation::TypeIncompatible {
                guide_type: guide.guide_type,
                slot_label: slot.to_string(),
            });
        }

        if is_unavailable {
            violations.push(Violation::UnavailableOnDate { date });
        }

        for other in other_slots {
            match slot.gap_minutes(other) {
                None => violations.push(Violation::Overlap {
                    other_slot_label: other.to_string(),
                }),
                Some(gap) if gap < self.rules.min_buffer_minutes => {
                    violations.push(Violation::ShortBuffer {
                        slot_label: slot.to_string(),
                        other_slot_label: other.to_string(),
                        gap_minutes: gap,
                        min_buffer_minutes: self.rules.min_buffer_minutes,
                    })
                }
                Some(_) => {}
            }
        }

        violations
    }

    /// 校验整日台账
    ///
    /// # 参数
    /// - schedule: 日台账
    /// - entries: 当日全部 (场次, 时段) 对
    /// - guides: 导游ID -> 导游 (覆盖出现在台账中的全部导游)
    /// - unavailable_ids: 当日明确标记不可用的导游ID集合
    ///
    /// # 返回
    /// 标签化报告: 日级违规 + 按场次分组的违规
    #[instrument(skip_all, fields(date = %schedule.date, entries = entries.len()))]
    pub fn validate_day(
        &self,
        schedule: &DaySchedule,
        entries: &[(TourAssignment, TourSlot)],
        guides: &HashMap<String, Guide>,
        unavailable_ids: &HashSet<String>,
    ) -> DayValidationReport {
        let mut report = DayValidationReport::default();

        // 候补导游: 必须设置且当日可用
        match &schedule.standby_guide_id {
            None => report.general.push(Violation::StandbyMissing),
            Some(standby_id) => {
                if unavailable_ids.contains(standby_id) {
                    report.general.push(Violation::StandbyUnavailable);
                }
            }
        }

        // 按导游聚合当日持有的时段
        let mut slots_by_guide: HashMap<&str, Vec<&TourSlot>> = HashMap::new();
        for (assignment, slot) in entries {
            if let Some(guide_id) = &assignment.guide_id {
                slots_by_guide.entry(guide_id).or_default().push(slot);
            }
        }

        // 逐场次校验
        for (assignment, slot) in entries {
            let Some(guide_id) = &assignment.guide_id else {
                continue;
            };
            let Some(guide) = guides.get(guide_id) else {
                continue;
            };

            let others: Vec<TourSlot> = slots_by_guide
                .get(guide_id.as_str())
                .map(|held| {
                    held.iter()
                        .filter(|s| s.slot_id != slot.slot_id)
                        .map(|s| (*s).clone())
                        .collect()
                })
                .unwrap_or_default();

            let violations = self.validate_assignment(
                guide,
                slot,
                schedule.date,
                unavailable_ids.contains(guide_id),
                &others,
            );
            if !violations.is_empty() {
                report
                    .per_assignment
                    .insert(assignment.assignment_id.clone(), violations);
            }
        }

        // 未指派场次 (发布前必须清零)
        let unassigned = entries.iter().filter(|(a, _)| a.guide_id.is_none()).count();
        if unassigned > 0 {
            report
                .general
                .push(Violation::UnassignedSessions { count: unassigned });
        }

        report
    }
}
