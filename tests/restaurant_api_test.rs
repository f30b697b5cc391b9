// ==========================================
// 餐厅排班 API 集成测试
// ==========================================
// 场景: 模板实例化 / 自动填充 / 覆盖率校验 / 发布门 / 清空
// ==========================================


use std::collections::HashSet;

use test_helpers::{create_test_state, seed_staff, test_date};
use venue_roster::api::ApiError;
use venue_roster::domain::types::{ShiftPattern, StaffRole};

/// 4 后厨 + 4 前厅 的标准测试花名册
fn seed_full_roster(state: &venue_roster::app::AppState) {
    seed_staff(state, "k1", "Alice Chen", StaffRole::Kitchen);
    seed_staff(state, "k2", "Bob Martinez", StaffRole::Kitchen);
    seed_staff(state, "k3", "Charlie Wong", StaffRole::Kitchen);
    seed_staff(state, "k4", "Diana Lee", StaffRole::Kitchen);
    seed_staff(state, "s1", "Emma Davis", StaffRole::Serving);
    seed_staff(state, "s2", "Frank Johnson", StaffRole::Serving);
    seed_staff(state, "s3", "Grace Kim", StaffRole::Serving);
    seed_staff(state, "s4", "Henry Park", StaffRole::Serving);
}

// ==========================================
// 模板实例化
// ==========================================

#[tokio::test]
async fn test_materialize_day_instantiates_pattern() {
    let (_db, state) = create_test_state();
    let date = test_date();

    let result = state
        .restaurant_api
        .materialize_day(date, ShiftPattern::Mixed)
        .await
        .unwrap();
    // 每岗位 4 个模板实例, 两个岗位
    assert_eq!(result.shifts_created, 8);

    // 幂等: 已有实例时不重复创建
    let again = state
        .restaurant_api
        .materialize_day(date, ShiftPattern::Mixed)
        .await
        .unwrap();
    assert_eq!(again.shifts_created, 0);
    assert_eq!(again.total_shifts, 8);
}

// ==========================================
// 自动填充: 标准花名册
// ==========================================

#[tokio::test]
async fn test_auto_assign_mixed_pattern_full_roster() {
    let (_db, state) = create_test_state();
    seed_full_roster(&state);
    let date = test_date();

    let result = state
        .restaurant_api
        .auto_assign(date, ShiftPattern::Mixed)
        .await
        .unwrap();

    assert_eq!(result.kitchen_assigned, 4);
    assert_eq!(result.serving_assigned, 4);
    assert_eq!(result.total_staff, 8);
    assert_eq!(result.unfillable_count, 0);
    assert!(result.errors.is_empty());

    // 覆盖不变量: 每个采样时刻每岗位 >= 2 在岗
    let report = state.restaurant_api.validate_day(date).await.unwrap();
    assert!(report.gaps.is_empty(), "gaps: {:?}", report.gaps);
    assert!(report.is_valid());

    // 一人一日一班
    let shifts = state.restaurant_api.day_shifts(date).await.unwrap();
    let used: Vec<&str> = shifts.iter().filter_map(|s| s.staff_id.as_deref()).collect();
    let distinct: HashSet<&&str> = used.iter().collect();
    assert_eq!(used.len(), distinct.len());

    // 发布门放行, 发布打时间戳
    let (ok, _) = state.restaurant_api.can_publish(date).await.unwrap();
    assert!(ok);
    state.restaurant_api.publish(date).await.unwrap();
    let summary = state.restaurant_api.schedule_summary(date).await.unwrap();
    assert!(summary.is_published);
    assert_eq!(summary.full_day_shifts, 4);
    assert_eq!(summary.half_day_shifts, 4);
    assert_eq!(summary.total_hours, 4 * 8 + 4 * 4);
}

#[tokio::test]
async fn test_auto_assign_all_8h_pattern() {
    let (_db, state) = create_test_state();
    seed_full_roster(&state);
    let date = test_date();

    let result = state
        .restaurant_api
        .auto_assign(date, ShiftPattern::All8h)
        .await
        .unwrap();

    assert_eq!(result.total_staff, 8);
    let summary = state.restaurant_api.schedule_summary(date).await.unwrap();
    assert_eq!(summary.full_day_shifts, 8);
    assert_eq!(summary.half_day_shifts, 0);
    assert!(summary.coverage_valid);
}

#[tokio::test]
async fn test_auto_assign_rebuilds_on_pattern_change() {
    let (_db, state) = create_test_state();
    seed_full_roster(&state);
    let date = test_date();

    state
        .restaurant_api
        .auto_assign(date, ShiftPattern::Mixed)
        .await
        .unwrap();
    state
        .restaurant_api
        .auto_assign(date, ShiftPattern::All8h)
        .await
        .unwrap();

    // 旧模式实例被整体重建, 不累加
    let shifts = state.restaurant_api.day_shifts(date).await.unwrap();
    assert_eq!(shifts.len(), 8);
    assert!(shifts.iter().all(|s| s.duration_hours == 8));
}

// ==========================================
// 场景D: 1 名后厨, 要求同时 2 人
// ==========================================

#[tokio::test]
async fn test_understaffed_kitchen_gaps_everywhere_and_publish_refused() {
    let (_db, state) = create_test_state();
    seed_staff(&state, "k1", "Alice Chen", StaffRole::Kitchen);
    seed_staff(&state, "s1", "Emma Davis", StaffRole::Serving);
    seed_staff(&state, "s2", "Frank Johnson", StaffRole::Serving);
    seed_staff(&state, "s3", "Grace Kim", StaffRole::Serving);
    seed_staff(&state, "s4", "Henry Park", StaffRole::Serving);
    let date = test_date();

    let result = state
        .restaurant_api
        .auto_assign(date, ShiftPattern::Mixed)
        .await
        .unwrap();
    assert_eq!(result.kitchen_assigned, 1);
    assert_eq!(result.unfillable_count, 3);

    // 每个采样时刻都有后厨缺口 (在岗 0 或 1, 要求 2)
    let report = state.restaurant_api.validate_day(date).await.unwrap();
    let kitchen_gap_times: HashSet<_> = report
        .gaps
        .iter()
        .filter(|g| g.role == StaffRole::Kitchen)
        .map(|g| g.time)
        .collect();
    assert_eq!(kitchen_gap_times.len(), report.samples.len());
    assert!(report
        .gaps
        .iter()
        .filter(|g| g.role == StaffRole::Kitchen)
        .all(|g| g.observed < g.required));

    // 发布拒绝, 携带违规列表
    let (ok, violations) = state.restaurant_api.can_publish(date).await.unwrap();
    assert!(!ok);
    assert!(!violations.is_empty());
    let err = state.restaurant_api.publish(date).await.unwrap_err();
    assert!(matches!(err, ApiError::PublishBlocked { .. }));
}

// ==========================================
// 手工指派
// ==========================================

#[tokio::test]
async fn test_assign_shift_role_mismatch_rejected() {
    let (_db, state) = create_test_state();
    seed_staff(&state, "k1", "Alice Chen", StaffRole::Kitchen);
    let date = test_date();
    state
        .restaurant_api
        .materialize_day(date, ShiftPattern::Mixed)
        .await
        .unwrap();

    let serving_shift = state
        .restaurant_api
        .day_shifts(date)
        .await
        .unwrap()
        .into_iter()
        .find(|s| s.role == StaffRole::Serving)
        .unwrap();

    let err = state
        .restaurant_api
        .assign_shift(&serving_shift.shift_id, Some("k1"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}

#[tokio::test]
async fn test_assign_shift_double_shift_violation() {
    let (_db, state) = create_test_state();
    seed_staff(&state, "k1", "Alice Chen", StaffRole::Kitchen);
    let date = test_date();
    state
        .restaurant_api
        .materialize_day(date, ShiftPattern::Mixed)
        .await
        .unwrap();

    let kitchen_shifts: Vec<_> = state
        .restaurant_api
        .day_shifts(date)
        .await
        .unwrap()
        .into_iter()
        .filter(|s| s.role == StaffRole::Kitchen)
        .collect();

    let first = state
        .restaurant_api
        .assign_shift(&kitchen_shifts[0].shift_id, Some("k1"))
        .await
        .unwrap();
    assert!(first.violations.is_empty());

    // 同日第二班: 写入成功但报 DoubleShift 违规
    let second = state
        .restaurant_api
        .assign_shift(&kitchen_shifts[1].shift_id, Some("k1"))
        .await
        .unwrap();
    assert!(second
        .violations
        .iter()
        .any(|v| matches!(v, venue_roster::domain::violation::Violation::DoubleShift { .. })));
}

// ==========================================
// 可用性与清空
// ==========================================

#[tokio::test]
async fn test_unavailable_staff_excluded_from_pool() {
    let (_db, state) = create_test_state();
    seed_full_roster(&state);
    let date = test_date();

    state
        .restaurant_api
        .set_staff_availability("k1", date, false, Some("sick".to_string()))
        .await
        .unwrap();

    let result = state
        .restaurant_api
        .auto_assign(date, ShiftPattern::Mixed)
        .await
        .unwrap();
    // 3 名后厨可用, 4 个班次: 1 个无解
    assert_eq!(result.kitchen_assigned, 3);
    assert_eq!(result.unfillable_count, 1);

    let shifts = state.restaurant_api.day_shifts(date).await.unwrap();
    assert!(shifts
        .iter()
        .all(|s| s.staff_id.as_deref() != Some("k1")));
}

#[tokio::test]
async fn test_clear_day_unpublishes_and_strips_assignments() {
    let (_db, state) = create_test_state();
    seed_full_roster(&state);
    let date = test_date();

    state
        .restaurant_api
        .auto_assign(date, ShiftPattern::Mixed)
        .await
        .unwrap();
    state.restaurant_api.publish(date).await.unwrap();

    let cleared = state.restaurant_api.clear_day(date).await.unwrap();
    assert_eq!(cleared, 8);

    let summary = state.restaurant_api.schedule_summary(date).await.unwrap();
    assert!(!summary.is_published);
    assert_eq!(summary.assigned_shifts, 0);
    assert_eq!(summary.total_shifts, 8);
}
