// ==========================================
// 场馆排班系统 - 发布门
// ==========================================
// 职责: 判定某日台账能否进入"已发布"状态
// 规则: 零违规才放行; 拒绝时整体返回违规列表
// 红线: 发布不锁台账, 后续编辑后的再次发布必须重新校验
// ==========================================

use crate::domain::violation::{CoverageReport, DayValidationReport, Violation};

// ==========================================
// PublishGate - 发布门
// ==========================================
#[derive(Default)]
pub struct PublishGate {
    // 无状态引擎
}

impl PublishGate {
    pub fn new() -> Self {
        Self {}
    }

    /// 导游域: 日级与逐场次违规全部清零 (含候补导游已设置且可用)
    ///
    /// # 返回
    /// (能否发布, 展平的违规列表)
    pub fn can_publish_day(&self, report: &DayValidationReport) -> (bool, Vec<Violation>) {
        (report.is_clean(), report.all_violations())
    }

    /// 餐厅域: 覆盖无缺口且无未指派班次实例
    pub fn can_publish_restaurant_day(&self, report: &CoverageReport) -> (bool, Vec<Violation>) {
        (report.is_valid(), report.violations())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::violation::CoverageGap;
    use crate::domain::types::StaffRole;
    use chrono::NaiveTime;

    #[test]
    fn test_clean_report_publishes() {
        let gate = PublishGate::new();
        let (ok, violations) = gate.can_publish_day(&DayValidationReport::default());
        assert!(ok);
        assert!(violations.is_empty());
    }

    #[test]
    fn test_any_violation_blocks_publish() {
        let gate = PublishGate::new();
        let mut report = DayValidationReport::default();
        report.general.push(Violation::StandbyMissing);

        let (ok, violations) = gate.can_publish_day(&report);
        assert!(!ok);
        assert_eq!(violations, vec![Violation::StandbyMissing]);
    }

    #[test]
    fn test_coverage_gap_blocks_restaurant_publish() {
        let gate = PublishGate::new();
        let report = CoverageReport {
            gaps: vec![CoverageGap {
                time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
                role: StaffRole::Kitchen,
                observed: 1,
                required: 2,
            }],
            ..Default::default()
        };

        let (ok, violations) = gate.can_publish_restaurant_day(&report);
        assert!(!ok);
        assert_eq!(violations.len(), 1);
    }
}
