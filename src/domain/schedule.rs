// ==========================================
// 场馆排班系统 - 台账领域模型
// ==========================================
// 每 (域, 日期) 一本台账:
// - 导游域: day_schedule + tour_assignment (每时段恰一条)
// - 餐厅域: restaurant_day + shift_assignment (模板按日实例化)
// 生命周期: 草稿 -> 发布 (可撤销发布, 不删除场次)
// ==========================================

use crate::domain::types::{BookingChannel, SessionStatus, StaffRole, VisitorType};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// DaySchedule - 导游域日台账
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySchedule {
    pub date: NaiveDate,                  // 日期 (唯一)
    pub standby_guide_id: Option<String>, // 当日候补导游 (不绑定具体时段)
    pub is_published: bool,               // 发布标志
    pub notes: Option<String>,            // 备注
    pub created_at: DateTime<Utc>,        // 创建时间
    pub updated_at: DateTime<Utc>,        // 更新时间
}

// ==========================================
// TourAssignment - 导览场次
// ==========================================
// 不变量: 每 (date, slot) 恰一条; revision 用于乐观并发控制
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TourAssignment {
    pub assignment_id: String,       // 场次ID
    pub date: NaiveDate,             // 日期
    pub slot_id: String,             // 时段ID
    pub guide_id: Option<String>,    // 指派导游 (None = 未指派)
    pub status: SessionStatus,       // 场次状态

    // ===== 预订信息 (约束引擎不读取) =====
    pub visitor_count: Option<i64>,           // 游客人数
    pub visitor_type: Option<VisitorType>,    // 游客类型
    pub booking_channel: Option<BookingChannel>, // 预订渠道
    pub notes: Option<String>,                // 备注

    pub revision: i64,               // 乐观锁修订号
    pub created_at: DateTime<Utc>,   // 创建时间
    pub updated_at: DateTime<Utc>,   // 更新时间
}

impl TourAssignment {
    pub fn is_assigned(&self) -> bool {
        self.guide_id.is_some()
    }

    /// 预订信息是否已填写
    pub fn has_booking_details(&self) -> bool {
        self.visitor_count.is_some()
            || self.visitor_type.is_some()
            || self.booking_channel.is_some()
    }
}

// ==========================================
// RestaurantDay - 餐厅域日台账
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantDay {
    pub date: NaiveDate,                     // 日期 (唯一)
    pub is_published: bool,                  // 发布标志
    pub published_at: Option<DateTime<Utc>>, // 发布时间戳
    pub notes: Option<String>,               // 备注
    pub created_at: DateTime<Utc>,           // 创建时间
    pub updated_at: DateTime<Utc>,           // 更新时间
}

// ==========================================
// ShiftAssignment - 班次实例
// ==========================================
// 同一模板当日可出现多条 (不同预期占用人), 故按实例存储
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftAssignment {
    pub shift_id: String,          // 班次ID
    pub date: NaiveDate,           // 日期
    pub role: StaffRole,           // 岗位
    pub start_time: NaiveTime,     // 开始时刻
    pub end_time: NaiveTime,       // 结束时刻
    pub duration_hours: i64,       // 时长(小时)
    pub staff_id: Option<String>,  // 指派员工 (None = 未指派)
    pub revision: i64,             // 乐观锁修订号
    pub created_at: DateTime<Utc>, // 创建时间
    pub updated_at: DateTime<Utc>, // 更新时间
}

impl ShiftAssignment {
    pub fn is_assigned(&self) -> bool {
        self.staff_id.is_some()
    }

    pub fn is_full_day(&self) -> bool {
        self.duration_hours == 8
    }

    pub fn is_half_day(&self) -> bool {
        self.duration_hours == 4
    }

    /// 某采样时刻是否在班次覆盖内 (左闭右开)
    pub fn covers(&self, instant: NaiveTime) -> bool {
        self.start_time <= instant && instant < self.end_time
    }
}
