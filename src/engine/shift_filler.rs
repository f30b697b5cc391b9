// ==========================================
// 场馆排班系统 - 班次填充引擎 (餐厅域)
// ==========================================
// 职责: 把各岗位人员池按序灌入当日固定班次模板实例
// 与导游域的区别: 班次来自小型固定目录而非密集时段网格,
// 无空档/重叠逻辑, 只有 一人一日一班 + 聚合覆盖 (覆盖另行校验)
// 红线: 池耗尽只记录无解, 不中止
// ==========================================

use crate::domain::person::RestaurantStaff;
use crate::domain::schedule::ShiftAssignment;
use crate::domain::types::StaffRole;
use serde::{Deserialize, Serialize};
use tracing::instrument;

// ==========================================
// ShiftFillPlan - 填充决策 (未落库)
// ==========================================

/// 单条班次指派决策
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedShift {
    pub shift_id: String,       // 班次ID
    pub staff_id: String,       // 选中员工
    pub expected_revision: i64, // 快照修订号
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShiftFillPlan {
    pub assignments: Vec<PlannedShift>, // 指派决策
    pub unfillable: Vec<String>,        // 无解班次ID
    pub kitchen_assigned: usize,        // 后厨指派数
    pub serving_assigned: usize,        // 前厅指派数
    pub errors: Vec<String>,            // 结构性错误
}

impl ShiftFillPlan {
    /// 动用的总人数 (每人一日至多一班, 故等于指派数)
    pub fn total_staff(&self) -> usize {
        self.kitchen_assigned + self.serving_assigned
    }

    pub fn unfillable_count(&self) -> usize {
        self.unfillable.len()
    }
}

// ==========================================
// ShiftFiller - 班次填充器
// ==========================================
#[derive(Default)]
pub struct ShiftFiller {
    // 无状态引擎, 不需要注入依赖
}

impl ShiftFiller {
    pub fn new() -> Self {
        Self {}
    }

    /// 填充某日班次实例
    ///
    /// # 参数
    /// - shifts: 当日全部未指派班次实例 (模式固定顺序)
    /// - kitchen_pool: 后厨可用人员池 (确定性顺序, 每人只用一次)
    /// - serving_pool: 前厅可用人员池
    ///
    /// # 返回
    /// ShiftFillPlan: 决策 + 无解班次; 本方法不写任何状态
    #[instrument(skip_all, fields(
        shifts = shifts.len(),
        kitchen_pool = kitchen_pool.len(),
        serving_pool = serving_pool.len()
    ))]
    pub fn fill_day(
        &self,
        shifts: &[ShiftAssignment],
        kitchen_pool: &[RestaurantStaff],
        serving_pool: &[RestaurantStaff],
    ) -> ShiftFillPlan {
        let mut plan = ShiftFillPlan::default();

        for role in StaffRole::ALL {
            let pool = match role {
                StaffRole::Kitchen => kitchen_pool,
                StaffRole::Serving => serving_pool,
            };
            let role_shifts: Vec<&ShiftAssignment> =
                shifts.iter().filter(|s| s.role == role).collect();

            if role_shifts.is_empty() {
                continue;
            }
            if pool.is_empty() {
                plan.errors.push(match role {
                    StaffRole::Kitchen => "No available kitchen staff".to_string(),
                    StaffRole::Serving => "No available serving staff".to_string(),
                });
            }

            // 固定模式顺序灌入, 池耗尽即止
            let mut next = pool.iter();
            for shift in role_shifts {
                match next.next() {
                    Some(staff) => {
                        plan.assignments.push(PlannedShift {
                            shift_id: shift.shift_id.clone(),
                            staff_id: staff.staff_id.clone(),
                            expected_revision: shift.revision,
                        });
                        match role {
                            StaffRole::Kitchen => plan.kitchen_assigned += 1,
                            StaffRole::Serving => plan.serving_assigned += 1,
                        }
                    }
                    None => plan.unfillable.push(shift.shift_id.clone()),
                }
            }
        }

        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, Utc};

    fn staff(id: &str, name: &str, role: StaffRole) -> RestaurantStaff {
        RestaurantStaff {
            staff_id: id.to_string(),
            name: name.to_string(),
            role,
            is_active: true,
            hire_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn shift(id: &str, role: StaffRole) -> ShiftAssignment {
        ShiftAssignment {
            shift_id: id.to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            role,
            start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            duration_hours: 8,
            staff_id: None,
            revision: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_fills_in_pattern_order_from_pool() {
        let shifts = vec![
            shift("k1", StaffRole::Kitchen),
            shift("k2", StaffRole::Kitchen),
            shift("s1", StaffRole::Serving),
        ];
        let kitchen = vec![
            staff("ka", "Alice", StaffRole::Kitchen),
            staff("kb", "Bob", StaffRole::Kitchen),
        ];
        let serving = vec![staff("sa", "Emma", StaffRole::Serving)];

        let plan = ShiftFiller::new().fill_day(&shifts, &kitchen, &serving);

        assert_eq!(plan.kitchen_assigned, 2);
        assert_eq!(plan.serving_assigned, 1);
        assert_eq!(plan.total_staff(), 3);
        assert!(plan.unfillable.is_empty());
        // 池按序消耗
        assert_eq!(plan.assignments[0].staff_id, "ka");
        assert_eq!(plan.assignments[1].staff_id, "kb");
    }

    #[test]
    fn test_pool_exhaustion_leaves_unfillable() {
        let shifts = vec![
            shift("k1", StaffRole::Kitchen),
            shift("k2", StaffRole::Kitchen),
            shift("k3", StaffRole::Kitchen),
        ];
        let kitchen = vec![staff("ka", "Alice", StaffRole::Kitchen)];

        let plan = ShiftFiller::new().fill_day(&shifts, &kitchen, &[]);

        assert_eq!(plan.kitchen_assigned, 1);
        assert_eq!(plan.unfillable, vec!["k2".to_string(), "k3".to_string()]);
        assert!(plan.errors.is_empty());
    }

    #[test]
    fn test_empty_pool_reports_error() {
        let shifts = vec![shift("s1", StaffRole::Serving)];
        let plan = ShiftFiller::new().fill_day(&shifts, &[], &[]);

        assert_eq!(plan.total_staff(), 0);
        assert_eq!(plan.unfillable_count(), 1);
        assert!(plan
            .errors
            .iter()
            .any(|e| e.contains("No available serving staff")));
    }

    #[test]
    fn test_each_staff_used_at_most_once() {
        let shifts = vec![
            shift("k1", StaffRole::Kitchen),
            shift("k2", StaffRole::Kitchen),
        ];
        let kitchen = vec![
            staff("ka", "Alice", StaffRole::Kitchen),
            staff("kb", "Bob", StaffRole::Kitchen),
        ];
        let plan = ShiftFiller::new().fill_day(&shifts, &kitchen, &[]);

        let mut used: Vec<&str> = plan.assignments.iter().map(|a| a.staff_id.as_str()).collect();
        used.sort();
        used.dedup();
        assert_eq!(used.len(), plan.assignments.len());
    }
}
