// ==========================================
// 场馆排班系统 - 结构性准入引擎
// ==========================================
// 职责: 给定时段与日期, 过滤出结构上可承接的导游
// 红线: 只看 在职 + 类型兼容 + 当日可用性,
//       不看当日其他场次 (那是校验器的事)
// 输出: 按 (姓名, ID) 稳定排序, 供下游确定性平手裁决
// ==========================================

use crate::config::RosterConfigReader;
use crate::domain::person::Guide;
use crate::domain::slot::TourSlot;
use chrono::{NaiveDate, NaiveTime};
use std::collections::HashSet;
use std::error::Error;
use std::sync::Arc;
use tracing::instrument;

// ==========================================
// EligibilityCore - 纯过滤逻辑
// ==========================================
// 同步纯函数, 排班器按已解析的 cutoff 直接复用
pub struct EligibilityCore;

impl EligibilityCore {
    /// 结构性过滤: 在职 + 类型兼容 + 未标记不可用
    pub fn filter_structural(
        slot: &TourSlot,
        morning_cutoff: NaiveTime,
        roster: &[Guide],
        unavailable_ids: &HashSet<String>,
    ) -> Vec<Guide> {
        let mut eligible: Vec<Guide> = roster
            .iter()
            .filter(|g| g.is_active)
            .filter(|g| g.can_work_slot(slot, morning_cutoff))
            .filter(|g| !unavailable_ids.contains(&g.guide_id))
            .cloned()
            .collect();
        eligible.sort_by(|a, b| {
            (a.name.as_str(), a.guide_id.as_str()).cmp(&(b.name.as_str(), b.guide_id.as_str()))
        });
        eligible
    }
}

// ==========================================
// EligibilityEngine - 准入引擎
// ==========================================
// 红线: 无副作用, 空结果不是错误
pub struct EligibilityEngine<C>
where
    C: RosterConfigReader,
{
    config: Arc<C>,
}

impl<C> EligibilityEngine<C>
where
    C: RosterConfigReader,
{
    /// 创建新的 EligibilityEngine 实例
    pub fn new(config: Arc<C>) -> Self {
        Self { config }
    }

    /// 某时段某日的结构性可承接导游
    ///
    /// # 参数
    /// - slot: 时段
    /// - date: 日期 (仅用于追踪)
    /// - roster: 在职花名册
    /// - unavailable_ids: 当日明确标记不可用的导游ID集合
    #[instrument(skip(self, slot, roster, unavailable_ids), fields(date = %date, slot = %slot))]
    pub async fn eligible_guides(
        &self,
        slot: &TourSlot,
        date: NaiveDate,
        roster: &[Guide],
        unavailable_ids: &HashSet<String>,
    ) -> Result<Vec<Guide>, Box<dyn Error>> {
        let cutoff = self.config.get_morning_cutoff().await?;
        Ok(EligibilityCore::filter_structural(
            slot,
            cutoff,
            roster,
            unavailable_ids,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::GuideType;
    use chrono::Utc;

    fn guide(id: &str, name: &str, guide_type: GuideType, active: bool) -> Guide {
        Guide {
            guide_id: id.to_string(),
            name: name.to_string(),
            guide_type,
            phone: None,
            is_active: active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn slot(sh: u32, eh: u32, em: u32) -> TourSlot {
        TourSlot::new(
            "s1",
            NaiveTime::from_hms_opt(sh, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(eh, em, 0).unwrap(),
        )
    }

    fn cutoff() -> NaiveTime {
        NaiveTime::from_hms_opt(14, 30, 0).unwrap()
    }

    #[test]
    fn test_inactive_guides_filtered_out() {
        let roster = vec![
            guide("g1", "Ana", GuideType::FullTime, true),
            guide("g2", "Bo", GuideType::FullTime, false),
        ];
        let eligible =
            EligibilityCore::filter_structural(
                &slot(10, 11, 30),
                cutoff(),
                &roster,
                &HashSet::new(),
            );
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].guide_id, "g1");
    }

    #[test]
    fn test_afternoon_slot_excludes_morning_guides() {
        let roster = vec![
            guide("g1", "Ana", GuideType::PartTimeMorning, true),
            guide("g2", "Bo", GuideType::FullTime, true),
        ];
        let eligible =
            EligibilityCore::filter_structural(
                &slot(15, 16, 30),
                cutoff(),
                &roster,
                &HashSet::new(),
            );
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].guide_id, "g2");
    }

    #[test]
    fn test_unavailable_guide_excluded_missing_record_included() {
        let roster = vec![
            guide("g1", "Ana", GuideType::FullTime, true),
            guide("g2", "Bo", GuideType::FullTime, true),
        ];
        let mut unavailable = HashSet::new();
        unavailable.insert("g1".to_string());
        let eligible =
            EligibilityCore::filter_structural(
                &slot(10, 11, 30),
                cutoff(),
                &roster,
                &unavailable,
            );
        // g2 无可用性记录, 视为可用
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].guide_id, "g2");
    }

    #[test]
    fn test_output_ordered_by_name() {
        let roster = vec![
            guide("g9", "Zoe", GuideType::FullTime, true),
            guide("g1", "Ana", GuideType::FullTime, true),
        ];
        let eligible =
            EligibilityCore::filter_structural(
                &slot(10, 11, 30),
                cutoff(),
                &roster,
                &HashSet::new(),
            );
        assert_eq!(eligible[0].name, "Ana");
        assert_eq!(eligible[1].name, "Zoe");
    }
}
