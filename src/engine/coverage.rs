// ==========================================
// 场馆排班系统 - 覆盖率校验引擎 (餐厅域)
// ==========================================
// 职责: 营业时间内按固定步长采样, 逐岗位核对同时在岗人数
// 规则: 每个采样时刻 后厨/前厅 在岗数须达到配置下限;
//       未指派班次实例同为违规
// 红线: 校验器永不失败, 只返回报告
// ==========================================

use crate::config::CoverageRules;
use crate::domain::schedule::ShiftAssignment;
use crate::domain::types::StaffRole;
use crate::domain::violation::{CoverageGap, CoverageReport, CoverageSample, Violation};
use chrono::{NaiveDate, NaiveTime};
use tracing::instrument;

// ==========================================
// CoverageChecker - 覆盖率校验器
// ==========================================
pub struct CoverageChecker {
    rules: CoverageRules,
}

impl CoverageChecker {
    pub fn new(rules: CoverageRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &CoverageRules {
        &self.rules
    }

    fn required_for(&self, role: StaffRole) -> u32 {
        match role {
            StaffRole::Kitchen => self.rules.min_kitchen_on_duty,
            StaffRole::Serving => self.rules.min_serving_on_duty,
        }
    }

    /// 校验某日班次集的覆盖情况
    ///
    /// 采样: 从营业开始起, 每 sample_minutes 一个时刻, 不含营业结束时刻;
    /// 班次覆盖判定为左闭右开 (start <= t < end)
    #[instrument(skip_all, fields(shifts = shifts.len()))]
    pub fn validate_day(&self, shifts: &[ShiftAssignment]) -> CoverageReport {
        let mut report = CoverageReport {
            unassigned_count: shifts.iter().filter(|s| !s.is_assigned()).count(),
            ..Default::default()
        };

        let start = minutes_of(self.rules.operating_start);
        let end = minutes_of(self.rules.operating_end);
        let step = self.rules.sample_minutes.max(1);

        let mut minute = start;
        while minute < end {
            let t = time_of(minute);
            let mut counts = [0u32; 2];
            for shift in shifts.iter().filter(|s| s.is_assigned()) {
                if shift.covers(t) {
                    match shift.role {
                        StaffRole::Kitchen => counts[0] += 1,
                        StaffRole::Serving => counts[1] += 1,
                    }
                }
            }

            report.samples.push(CoverageSample {
                time: t,
                kitchen: counts[0],
                serving: counts[1],
            });

            for (role, observed) in [(StaffRole::Kitchen, counts[0]), (StaffRole::Serving, counts[1])] {
                let required = self.required_for(role);
                if observed < required {
                    report.gaps.push(CoverageGap {
                        time: t,
                        role,
                        observed,
                        required,
                    });
                }
            }

            minute += step;
        }

        report
    }

    /// 校验单个班次指派 (针对某员工当日状态)
    ///
    /// 岗位不匹配属结构性输入错误, 由 API 层拒绝, 不在此列
    pub fn validate_shift_assignment(
        &self,
        date: NaiveDate,
        is_unavailable: bool,
        other_shifts_held: &[ShiftAssignment],
    ) -> Vec<Violation> {
        let mut violations = Vec::new();

        if is_unavailable {
            violations.push(Violation::StaffUnavailable { date });
        }

        // 一人一日一班
        if !other_shifts_held.is_empty() {
            violations.push(Violation::DoubleShift { date });
        }

        violations
    }
}

fn minutes_of(t: NaiveTime) -> i64 {
    use chrono::Timelike;
    t.hour() as i64 * 60 + t.minute() as i64
}

fn time_of(minutes: i64) -> NaiveTime {
    NaiveTime::from_hms_opt((minutes / 60) as u32, (minutes % 60) as u32, 0).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn rules() -> CoverageRules {
        CoverageRules {
            operating_start: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            operating_end: NaiveTime::from_hms_opt(21, 30, 0).unwrap(),
            sample_minutes: 30,
            min_kitchen_on_duty: 2,
            min_serving_on_duty: 2,
        }
    }

    fn shift(role: StaffRole, sh: u32, sm: u32, eh: u32, em: u32, staff: Option<&str>) -> ShiftAssignment {
        ShiftAssignment {
            shift_id: uuid::Uuid::new_v4().to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            role,
            start_time: NaiveTime::from_hms_opt(sh, sm, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(eh, em, 0).unwrap(),
            duration_hours: 8,
            staff_id: staff.map(|s| s.to_string()),
            revision: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_sample_count_covers_operating_hours() {
        let checker = CoverageChecker::new(rules());
        let report = checker.validate_day(&[]);
        // 10:00 .. 21:00, 半小时步长 = 23 个采样点 (21:30 不采样)
        assert_eq!(report.samples.len(), 23);
    }

    #[test]
    fn test_single_kitchen_worker_gaps_at_every_sample() {
        // 仅 1 名后厨全程在岗, 要求 2: 后厨缺口遍布所有采样点, 前厅同样全缺
        let checker = CoverageChecker::new(rules());
        let shifts = vec![shift(StaffRole::Kitchen, 10, 0, 21, 30, Some("k1"))];
        let report = checker.validate_day(&shifts);

        let kitchen_gaps: Vec<_> = report
            .gaps
            .iter()
            .filter(|g| g.role == StaffRole::Kitchen)
            .collect();
        assert_eq!(kitchen_gaps.len(), report.samples.len());
        assert!(kitchen_gaps.iter().all(|g| g.observed == 1 && g.required == 2));
        assert!(!report.is_valid());
    }

    #[test]
    fn test_full_mixed_pattern_is_valid() {
        // 每岗位 2×8h + 2×4h 全部指派后无缺口
        let mut shifts = Vec::new();
        for (i, role) in StaffRole::ALL.into_iter().enumerate() {
            let base = i * 4;
            shifts.push(shift(role, 10, 0, 18, 0, Some(&format!("p{}", base))));
            shifts.push(shift(role, 13, 30, 21, 30, Some(&format!("p{}", base + 1))));
            let mut s3 = shift(role, 10, 0, 14, 0, Some(&format!("p{}", base + 2)));
            s3.duration_hours = 4;
            shifts.push(s3);
            let mut s4 = shift(role, 17, 30, 21, 30, Some(&format!("p{}", base + 3)));
            s4.duration_hours = 4;
            shifts.push(s4);
        }
        let checker = CoverageChecker::new(rules());
        let report = checker.validate_day(&shifts);
        assert!(report.gaps.is_empty(), "gaps: {:?}", report.gaps);
        assert!(report.is_valid());
    }

    #[test]
    fn test_unassigned_shift_blocks_validity_without_gap() {
        // 指派满足覆盖, 但存在一个未指派实例: 报告无缺口却不有效
        let mut shifts = Vec::new();
        for role in StaffRole::ALL {
            shifts.push(shift(role, 10, 0, 21, 30, Some("a")));
            shifts.push(shift(role, 10, 0, 21, 30, Some("b")));
        }
        shifts.push(shift(StaffRole::Kitchen, 10, 0, 18, 0, None));

        let checker = CoverageChecker::new(rules());
        let report = checker.validate_day(&shifts);
        assert!(report.gaps.is_empty());
        assert_eq!(report.unassigned_count, 1);
        assert!(!report.is_valid());
        assert!(report
            .violations()
            .contains(&Violation::UnassignedShifts { count: 1 }));
    }

    #[test]
    fn test_double_shift_violation() {
        let checker = CoverageChecker::new(rules());
        let held = vec![shift(StaffRole::Kitchen, 10, 0, 18, 0, Some("k1"))];
        let violations = checker.validate_shift_assignment(
            NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            false,
            &held,
        );
        assert!(matches!(violations[0], Violation::DoubleShift { .. }));
    }
}
