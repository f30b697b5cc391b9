// ==========================================
// 场馆排班系统 - 领域类型定义
// ==========================================
// 序列化格式: 与数据库列值一致
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 导游类型 (Guide Type)
// ==========================================
// 红线: 兼职类型只能承接对应半日的时段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GuideType {
    #[serde(rename = "FT")]
    FullTime, // 全职
    #[serde(rename = "PTM")]
    PartTimeMorning, // 兼职-上午
    #[serde(rename = "PTA")]
    PartTimeAfternoon, // 兼职-下午
}

impl GuideType {
    /// 面向violation消息的展示名
    pub fn display_name(&self) -> &'static str {
        match self {
            GuideType::FullTime => "Full-time",
            GuideType::PartTimeMorning => "Part-time Morning",
            GuideType::PartTimeAfternoon => "Part-time Afternoon",
        }
    }
}

impl fmt::Display for GuideType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuideType::FullTime => write!(f, "FT"),
            GuideType::PartTimeMorning => write!(f, "PTM"),
            GuideType::PartTimeAfternoon => write!(f, "PTA"),
        }
    }
}

impl FromStr for GuideType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FT" => Ok(GuideType::FullTime),
            "PTM" => Ok(GuideType::PartTimeMorning),
            "PTA" => Ok(GuideType::PartTimeAfternoon),
            other => Err(format!("unknown guide type: {}", other)),
        }
    }
}

// ==========================================
// 餐厅岗位 (Staff Role)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StaffRole {
    Kitchen, // 后厨
    Serving, // 前厅
}

impl StaffRole {
    pub fn display_name(&self) -> &'static str {
        match self {
            StaffRole::Kitchen => "Kitchen Staff",
            StaffRole::Serving => "Serving Staff",
        }
    }

    /// 覆盖率校验遍历用
    pub const ALL: [StaffRole; 2] = [StaffRole::Kitchen, StaffRole::Serving];
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaffRole::Kitchen => write!(f, "KITCHEN"),
            StaffRole::Serving => write!(f, "SERVING"),
        }
    }
}

impl FromStr for StaffRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "KITCHEN" => Ok(StaffRole::Kitchen),
            "SERVING" => Ok(StaffRole::Serving),
            other => Err(format!("unknown staff role: {}", other)),
        }
    }
}

// ==========================================
// 场次状态 (Session Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Scheduled, // 已排定
    Completed, // 已完成
    Cancelled, // 已取消
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Scheduled => write!(f, "SCHEDULED"),
            SessionStatus::Completed => write!(f, "COMPLETED"),
            SessionStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SCHEDULED" => Ok(SessionStatus::Scheduled),
            "COMPLETED" => Ok(SessionStatus::Completed),
            "CANCELLED" => Ok(SessionStatus::Cancelled),
            other => Err(format!("unknown session status: {}", other)),
        }
    }
}

// ==========================================
// 预订信息 (Booking Payload)
// ==========================================
// 约束引擎不读取这些字段, 仅随场次存取

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisitorType {
    Local,         // 本地游客
    International, // 国际游客
}

impl fmt::Display for VisitorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VisitorType::Local => write!(f, "LOCAL"),
            VisitorType::International => write!(f, "INTERNATIONAL"),
        }
    }
}

impl FromStr for VisitorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOCAL" => Ok(VisitorType::Local),
            "INTERNATIONAL" => Ok(VisitorType::International),
            other => Err(format!("unknown visitor type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingChannel {
    Online, // 线上平台
    WalkIn, // 现场
    Direct, // 直销
}

impl fmt::Display for BookingChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingChannel::Online => write!(f, "ONLINE"),
            BookingChannel::WalkIn => write!(f, "WALK_IN"),
            BookingChannel::Direct => write!(f, "DIRECT"),
        }
    }
}

impl FromStr for BookingChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ONLINE" => Ok(BookingChannel::Online),
            "WALK_IN" => Ok(BookingChannel::WalkIn),
            "DIRECT" => Ok(BookingChannel::Direct),
            other => Err(format!("unknown booking channel: {}", other)),
        }
    }
}

// ==========================================
// 班次模式 (Shift Pattern)
// ==========================================
// 餐厅域: 固定模板目录的两种实例化方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftPattern {
    Mixed, // 长短班混合 (默认)
    All8h, // 全 8 小时班
}

impl Default for ShiftPattern {
    fn default() -> Self {
        ShiftPattern::Mixed
    }
}

impl fmt::Display for ShiftPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShiftPattern::Mixed => write!(f, "MIXED"),
            ShiftPattern::All8h => write!(f, "ALL_8H"),
        }
    }
}

impl FromStr for ShiftPattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MIXED" | "mixed" => Ok(ShiftPattern::Mixed),
            "ALL_8H" | "all_8h" => Ok(ShiftPattern::All8h),
            other => Err(format!("unknown shift pattern: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guide_type_roundtrip() {
        for t in [
            GuideType::FullTime,
            GuideType::PartTimeMorning,
            GuideType::PartTimeAfternoon,
        ] {
            assert_eq!(t.to_string().parse::<GuideType>().unwrap(), t);
        }
    }

    #[test]
    fn test_shift_pattern_accepts_cli_spelling() {
        assert_eq!("mixed".parse::<ShiftPattern>().unwrap(), ShiftPattern::Mixed);
        assert_eq!("all_8h".parse::<ShiftPattern>().unwrap(), ShiftPattern::All8h);
        assert!("weekly".parse::<ShiftPattern>().is_err());
    }
}
