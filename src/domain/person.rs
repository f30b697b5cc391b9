// ==========================================
// 场馆排班系统 - 人员领域模型
// ==========================================
// 红线: 花名册由外部协作方维护, 引擎只读
// 可用性: 无记录 = 当日可用 (显式缺省, 不走异常)
// ==========================================

use crate::domain::slot::TourSlot;
use crate::domain::types::{GuideType, StaffRole};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Guide - 导游
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Guide {
    pub guide_id: String,           // 导游ID
    pub name: String,               // 姓名
    pub guide_type: GuideType,      // 导游类型 (FT/PTM/PTA)
    pub phone: Option<String>,      // 联系电话
    pub is_active: bool,            // 在职标志
    pub created_at: DateTime<Utc>,  // 创建时间
    pub updated_at: DateTime<Utc>,  // 更新时间
}

impl Guide {
    /// 导游类型与时段的结构性兼容判定
    ///
    /// - FT: 任何时段
    /// - PTM: 时段须在 cutoff 前结束
    /// - PTA: 时段须在 cutoff 或之后开始
    ///
    /// 只看类型与区间, 不看当日其他排班 (那是校验器的事)
    pub fn can_work_slot(&self, slot: &TourSlot, morning_cutoff: NaiveTime) -> bool {
        match self.guide_type {
            GuideType::FullTime => true,
            GuideType::PartTimeMorning => slot.end_time <= morning_cutoff,
            GuideType::PartTimeAfternoon => slot.start_time >= morning_cutoff,
        }
    }
}

// ==========================================
// GuideAvailability - 导游可用性
// ==========================================
// 不变量: 每 (guide, date) 至多一条
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuideAvailability {
    pub guide_id: String,          // 导游ID
    pub date: NaiveDate,           // 日期
    pub is_available: bool,        // 当日是否可用
    pub note: Option<String>,      // 备注 (如请假原因)
    pub created_at: DateTime<Utc>, // 创建时间
    pub updated_at: DateTime<Utc>, // 更新时间
}

// ==========================================
// RestaurantStaff - 餐厅员工
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantStaff {
    pub staff_id: String,            // 员工ID
    pub name: String,                // 姓名
    pub role: StaffRole,             // 岗位 (KITCHEN/SERVING)
    pub is_active: bool,             // 在职标志
    pub hire_date: Option<NaiveDate>, // 入职日期
    pub created_at: DateTime<Utc>,   // 创建时间
    pub updated_at: DateTime<Utc>,   // 更新时间
}

// ==========================================
// StaffAvailability - 员工可用性
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffAvailability {
    pub staff_id: String,          // 员工ID
    pub date: NaiveDate,           // 日期
    pub is_available: bool,        // 当日是否可用
    pub note: Option<String>,      // 备注
    pub created_at: DateTime<Utc>, // 创建时间
    pub updated_at: DateTime<Utc>, // 更新时间
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guide(guide_type: GuideType) -> Guide {
        Guide {
            guide_id: "g1".to_string(),
            name: "Ana".to_string(),
            guide_type,
            phone: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn slot(sh: u32, sm: u32, eh: u32, em: u32) -> TourSlot {
        TourSlot::new(
            "s1",
            NaiveTime::from_hms_opt(sh, sm, 0).unwrap(),
            NaiveTime::from_hms_opt(eh, em, 0).unwrap(),
        )
    }

    #[test]
    fn test_full_time_accepts_all_slots() {
        let cutoff = NaiveTime::from_hms_opt(14, 30, 0).unwrap();
        assert!(guide(GuideType::FullTime).can_work_slot(&slot(10, 0, 11, 30), cutoff));
        assert!(guide(GuideType::FullTime).can_work_slot(&slot(20, 0, 21, 30), cutoff));
    }

    #[test]
    fn test_morning_guide_rejects_slot_past_cutoff() {
        let cutoff = NaiveTime::from_hms_opt(14, 30, 0).unwrap();
        let g = guide(GuideType::PartTimeMorning);
        assert!(g.can_work_slot(&slot(12, 0, 13, 30), cutoff));
        // 13:00-14:30 恰好压线结束, 仍可承接
        assert!(g.can_work_slot(&slot(13, 0, 14, 30), cutoff));
        assert!(!g.can_work_slot(&slot(14, 0, 15, 30), cutoff));
    }

    #[test]
    fn test_afternoon_guide_rejects_slot_before_cutoff() {
        let cutoff = NaiveTime::from_hms_opt(14, 30, 0).unwrap();
        let g = guide(GuideType::PartTimeAfternoon);
        assert!(!g.can_work_slot(&slot(14, 0, 15, 30), cutoff));
        assert!(g.can_work_slot(&slot(14, 30, 16, 0), cutoff));
        assert!(g.can_work_slot(&slot(18, 0, 19, 30), cutoff));
    }
}
