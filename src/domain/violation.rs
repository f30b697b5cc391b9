// ==========================================
// 场馆排班系统 - 违规结构
// ==========================================
// 红线: 校验结果是数据, 不是异常
// 校验器永不 panic/Err, 只返回 (可能为空的) 违规列表
// ==========================================

use crate::domain::types::{GuideType, StaffRole};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ==========================================
// Violation - 单条违规
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Violation {
    // ===== 导游域: 单场次 =====
    /// 导游类型与时段不兼容
    TypeIncompatible {
        guide_type: GuideType,
        slot_label: String,
    },
    /// 当日标记为不可用
    UnavailableOnDate { date: NaiveDate },
    /// 与同日另一场次时间重叠
    Overlap { other_slot_label: String },
    /// 与同日另一场次间隔不足最小缓冲
    ShortBuffer {
        slot_label: String,
        other_slot_label: String,
        gap_minutes: i64,
        min_buffer_minutes: i64,
    },

    // ===== 导游域: 日级 =====
    /// 存在未指派场次
    UnassignedSessions { count: usize },
    /// 未设置候补导游
    StandbyMissing,
    /// 候补导游当日不可用
    StandbyUnavailable,

    // ===== 餐厅域: 日级 =====
    /// 存在未指派班次
    UnassignedShifts { count: usize },
    /// 采样时刻某岗位在岗人数不足
    CoverageShortfall {
        time: NaiveTime,
        role: StaffRole,
        observed: u32,
        required: u32,
    },
    /// 员工当日已持有另一班次
    DoubleShift { date: NaiveDate },
    /// 员工当日标记为不可用
    StaffUnavailable { date: NaiveDate },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::TypeIncompatible {
                guide_type,
                slot_label,
            } => write!(
                f,
                "{} guide cannot work {} time slot",
                guide_type.display_name(),
                slot_label
            ),
            Violation::UnavailableOnDate { date } => {
                write!(f, "Guide marked as unavailable on {}", date)
            }
            Violation::Overlap { other_slot_label } => write!(
                f,
                "Session overlaps with another assigned tour at {}",
                other_slot_label
            ),
            Violation::ShortBuffer {
                slot_label,
                other_slot_label,
                gap_minutes,
                min_buffer_minutes,
            } => write!(
                f,
                "Less than {}-minute break between {} and {} (gap: {} minutes)",
                min_buffer_minutes, slot_label, other_slot_label, gap_minutes
            ),
            Violation::UnassignedSessions { count } => {
                write!(f, "{} session(s) not assigned to any guide", count)
            }
            Violation::StandbyMissing => write!(f, "No standby guide assigned"),
            Violation::StandbyUnavailable => write!(f, "Standby guide marked as unavailable"),
            Violation::UnassignedShifts { count } => {
                write!(f, "{} shift(s) not assigned to any staff", count)
            }
            Violation::CoverageShortfall {
                time,
                role,
                observed,
                required,
            } => write!(
                f,
                "Coverage shortfall at {}: {} {}/{}",
                time.format("%H:%M"),
                role.display_name(),
                observed,
                required
            ),
            Violation::DoubleShift { date } => {
                write!(f, "Staff already assigned to another shift on {}", date)
            }
            Violation::StaffUnavailable { date } => {
                write!(f, "Staff marked as unavailable on {}", date)
            }
        }
    }
}

// ==========================================
// DayValidationReport - 日级校验报告 (导游域)
// ==========================================
// 标签化结构: 日级违规 + 按场次分组的违规
// (避免调用方各自重拼嵌套字典)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DayValidationReport {
    pub general: Vec<Violation>,                          // 日级违规
    pub per_assignment: BTreeMap<String, Vec<Violation>>, // 场次ID -> 违规列表
}

impl DayValidationReport {
    pub fn is_clean(&self) -> bool {
        self.general.is_empty() && self.per_assignment.is_empty()
    }

    /// 展平为单列表 (发布拒绝时整体返回)
    pub fn all_violations(&self) -> Vec<Violation> {
        let mut all = self.general.clone();
        for violations in self.per_assignment.values() {
            all.extend(violations.iter().cloned());
        }
        all
    }

    pub fn total_count(&self) -> usize {
        self.general.len() + self.per_assignment.values().map(Vec::len).sum::<usize>()
    }
}

// ==========================================
// CoverageReport - 覆盖率报告 (餐厅域)
// ==========================================

/// 单个采样时刻的在岗统计
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageSample {
    pub time: NaiveTime, // 采样时刻
    pub kitchen: u32,    // 后厨在岗数
    pub serving: u32,    // 前厅在岗数
}

/// 覆盖缺口: 某采样时刻某岗位人数不足
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageGap {
    pub time: NaiveTime, // 采样时刻
    pub role: StaffRole, // 岗位
    pub observed: u32,   // 实际在岗
    pub required: u32,   // 要求在岗
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoverageReport {
    pub samples: Vec<CoverageSample>, // 全部采样点 (供汇总展示)
    pub gaps: Vec<CoverageGap>,       // 覆盖缺口
    pub unassigned_count: usize,      // 未指派班次数
}

impl CoverageReport {
    pub fn is_valid(&self) -> bool {
        self.gaps.is_empty() && self.unassigned_count == 0
    }

    /// 转为违规列表 (发布门使用)
    pub fn violations(&self) -> Vec<Violation> {
        let mut all: Vec<Violation> = self
            .gaps
            .iter()
            .map(|g| Violation::CoverageShortfall {
                time: g.time,
                role: g.role,
                observed: g.observed,
                required: g.required,
            })
            .collect();
        if self.unassigned_count > 0 {
            all.push(Violation::UnassignedShifts {
                count: self.unassigned_count,
            });
        }
        all
    }
}
