// ==========================================
// 场馆排班系统 - 时段与班次模板
// ==========================================
// 职责: 纯区间数据 + 区间算术, 不含排班规则
// ==========================================

use crate::domain::types::{ShiftPattern, StaffRole};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// TourSlot - 导览时段
// ==========================================
// 目录数据: 整点开始, 固定时长, 每日复用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TourSlot {
    pub slot_id: String,        // 时段ID
    pub start_time: NaiveTime,  // 开始时刻
    pub end_time: NaiveTime,    // 结束时刻
    pub duration_minutes: i64,  // 时长(分钟)
}

impl TourSlot {
    /// 按起止时刻构造, 时长自动推导
    ///
    /// 不变量: end > start (由目录生成器保证, 此处 debug 断言)
    pub fn new(slot_id: impl Into<String>, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        debug_assert!(end_time > start_time);
        let duration_minutes = (end_time - start_time).num_minutes();
        Self {
            slot_id: slot_id.into(),
            start_time,
            end_time,
            duration_minutes,
        }
    }

    /// 两个时段是否重叠
    pub fn overlaps(&self, other: &TourSlot) -> bool {
        self.start_time < other.end_time && other.start_time < self.end_time
    }

    /// 与另一时段之间的空档(分钟)
    ///
    /// # 返回
    /// - None: 两时段重叠, 无空档可言
    /// - Some(gap): 较早时段结束到较晚时段开始的分钟数 (>= 0)
    pub fn gap_minutes(&self, other: &TourSlot) -> Option<i64> {
        if self.end_time <= other.start_time {
            Some((other.start_time - self.end_time).num_minutes())
        } else if other.end_time <= self.start_time {
            Some((self.start_time - other.end_time).num_minutes())
        } else {
            None
        }
    }
}

impl fmt::Display for TourSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M")
        )
    }
}

// ==========================================
// ShiftTemplate - 班次模板
// ==========================================
// 餐厅域: 小型固定目录, 每日按模式重新实例化
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftTemplate {
    pub role: StaffRole,       // 岗位
    pub start_time: NaiveTime, // 开始时刻
    pub end_time: NaiveTime,   // 结束时刻
    pub duration_hours: i64,   // 时长(小时): 4 或 8
}

impl ShiftTemplate {
    fn new(role: StaffRole, start: (u32, u32), end: (u32, u32), duration_hours: i64) -> Self {
        Self {
            role,
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
            duration_hours,
        }
    }

    /// 某采样时刻是否在班次覆盖内 (左闭右开)
    pub fn covers(&self, instant: NaiveTime) -> bool {
        self.start_time <= instant && instant < self.end_time
    }

    /// 指定岗位在某模式下的当日模板实例 (固定顺序)
    ///
    /// MIXED: 两个 8h 班 + 两个 4h 班, 合计覆盖营业时间 10:00-21:30
    /// ALL_8H: 四个 8h 班, 早晚各两个
    pub fn for_pattern(pattern: ShiftPattern, role: StaffRole) -> Vec<ShiftTemplate> {
        match pattern {
            ShiftPattern::Mixed => vec![
                ShiftTemplate::new(role, (10, 0), (18, 0), 8),
                ShiftTemplate::new(role, (13, 30), (21, 30), 8),
                ShiftTemplate::new(role, (10, 0), (14, 0), 4),
                ShiftTemplate::new(role, (17, 30), (21, 30), 4),
            ],
            ShiftPattern::All8h => vec![
                ShiftTemplate::new(role, (10, 0), (18, 0), 8),
                ShiftTemplate::new(role, (10, 0), (18, 0), 8),
                ShiftTemplate::new(role, (13, 30), (21, 30), 8),
                ShiftTemplate::new(role, (13, 30), (21, 30), 8),
            ],
        }
    }

    /// 两个岗位的完整当日模板集
    pub fn day_catalog(pattern: ShiftPattern) -> Vec<ShiftTemplate> {
        let mut all = Vec::new();
        for role in StaffRole::ALL {
            all.extend(Self::for_pattern(pattern, role));
        }
        all
    }
}

impl fmt::Display for ShiftTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} - {} ({}h)",
            self.role,
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M"),
            self.duration_hours
        )
    }
}
