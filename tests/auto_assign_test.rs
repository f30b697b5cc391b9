// ==========================================
// 自动排班集成测试 (导游域)
// ==========================================
// 场景: 单人单场 / 空花名册 / 全日填充不变量 / 候补补选
// ==========================================


use std::collections::HashMap;

use test_helpers::{create_test_state, seed_guide, test_date};
use venue_roster::domain::types::GuideType;
use venue_roster::engine::AutoAssignOptions;

// ==========================================
// 场景B: 一名全职导游, 一个时段
// ==========================================
#[tokio::test]
async fn test_single_guide_single_slot() {
    let (_db, state) = create_test_state();
    state
        .config
        .set_config_value("tour_last_start_hour", "10")
        .unwrap();
    state.schedule_api.generate_slot_catalog().await.unwrap();
    seed_guide(&state, "g1", "Ana", GuideType::FullTime);

    let date = test_date();
    state.schedule_api.materialize_day(date).await.unwrap();

    let result = state
        .schedule_api
        .auto_assign(date, AutoAssignOptions::default())
        .await
        .unwrap();

    assert_eq!(result.assigned_count, 1);
    assert_eq!(result.unfillable_count, 0);
    assert!(result.errors.is_empty());

    let assignments = state.schedule_api.day_assignments(date).await.unwrap();
    assert_eq!(assignments[0].guide_id.as_deref(), Some("g1"));
}

// ==========================================
// 场景C: 零在职导游
// ==========================================
#[tokio::test]
async fn test_empty_roster() {
    let (_db, state) = create_test_state();
    state
        .config
        .set_config_value("tour_last_start_hour", "10")
        .unwrap();
    state.schedule_api.generate_slot_catalog().await.unwrap();

    let date = test_date();
    state.schedule_api.materialize_day(date).await.unwrap();

    let result = state
        .schedule_api
        .auto_assign(date, AutoAssignOptions::default())
        .await
        .unwrap();

    assert_eq!(result.assigned_count, 0);
    assert_eq!(result.unfillable_count, 1);
    assert!(result
        .errors
        .iter()
        .any(|e| e.contains("No active guides")));
}

// ==========================================
// 全日填充: 不变量核查
// ==========================================
#[tokio::test]
async fn test_full_day_respects_all_invariants() {
    let (_db, state) = create_test_state();
    state.schedule_api.generate_slot_catalog().await.unwrap();
    seed_guide(&state, "g1", "Ana", GuideType::FullTime);
    seed_guide(&state, "g2", "Bo", GuideType::FullTime);
    seed_guide(&state, "g3", "Cy", GuideType::FullTime);
    seed_guide(&state, "g4", "Dee", GuideType::FullTime);

    let date = test_date();
    state.schedule_api.materialize_day(date).await.unwrap();

    let result = state
        .schedule_api
        .auto_assign(date, AutoAssignOptions::default())
        .await
        .unwrap();

    // 11 个时段全部有解 (4 名全职足够)
    assert_eq!(result.assigned_count, 11);
    assert_eq!(result.unfillable_count, 0);

    // 无重叠/缓冲/类型/可用性违规
    let report = state.schedule_api.validate_day(date).await.unwrap();
    assert!(
        report.per_assignment.is_empty(),
        "violations: {:?}",
        report.per_assignment
    );

    // 上限不变量: 每人每日至多 4 场
    let assignments = state.schedule_api.day_assignments(date).await.unwrap();
    let mut per_guide: HashMap<String, usize> = HashMap::new();
    for a in &assignments {
        if let Some(g) = &a.guide_id {
            *per_guide.entry(g.clone()).or_default() += 1;
        }
    }
    assert!(per_guide.values().all(|&n| n <= 4), "loads: {:?}", per_guide);

    // 候补已补选, 且候补与场次指派相互独立 (允许同时承担)
    assert!(result.standby_guide_id.is_some());

    // 发布门: 全指派 + 有候补 -> 放行
    let (ok, violations) = state.schedule_api.can_publish(date).await.unwrap();
    assert!(ok, "blocked by: {:?}", violations);
}

// ==========================================
// 人数最小化: 能续用就不开新人
// ==========================================
#[tokio::test]
async fn test_minimizes_headcount() {
    let (_db, state) = create_test_state();
    // 三个互相交叠的整点时段: 10:00/11:00/12:00 开场, 各 90 分钟
    state
        .config
        .set_config_value("tour_last_start_hour", "12")
        .unwrap();
    state.schedule_api.generate_slot_catalog().await.unwrap();
    seed_guide(&state, "g1", "Ana", GuideType::FullTime);
    seed_guide(&state, "g2", "Bo", GuideType::FullTime);
    seed_guide(&state, "g3", "Cy", GuideType::FullTime);

    let date = test_date();
    state.schedule_api.materialize_day(date).await.unwrap();
    let result = state
        .schedule_api
        .auto_assign(date, AutoAssignOptions { assign_standby: false })
        .await
        .unwrap();
    assert_eq!(result.assigned_count, 3);

    let assignments = state.schedule_api.day_assignments(date).await.unwrap();
    let used: std::collections::HashSet<&str> = assignments
        .iter()
        .filter_map(|a| a.guide_id.as_deref())
        .collect();
    // 10:00-11:30 与 12:00-13:30 一人可兼 (恰隔 30 分钟缓冲),
    // 11:00-12:30 另一人; 第三人不该被动用
    assert_eq!(used.len(), 2, "used: {:?}", used);

    // 未请求候补: 不补选
    let schedule = state.schedule_api.day_schedule(date).await.unwrap();
    assert!(schedule.standby_guide_id.is_none());
}

// ==========================================
// 部分成功: 类型受限时只填可填的
// ==========================================
#[tokio::test]
async fn test_partial_fill_with_type_limits() {
    let (_db, state) = create_test_state();
    state.schedule_api.generate_slot_catalog().await.unwrap();
    // 只有一名上午兼职: 只有 14:30 前结束的时段可填
    seed_guide(&state, "g1", "Ana", GuideType::PartTimeMorning);

    let date = test_date();
    state.schedule_api.materialize_day(date).await.unwrap();

    let result = state
        .schedule_api
        .auto_assign(date, AutoAssignOptions { assign_standby: false })
        .await
        .unwrap();

    // 10:00/11:00/12:00/13:00 开场的 90 分钟时段里, 结束 <= 14:30 的是
    // 10:00-11:30, 11:00-12:30, 12:00-13:30, 13:00-14:30;
    // 约束(重叠/缓冲/连场)下 PTM 最多承接其中 2 场
    assert!(result.assigned_count >= 1);
    assert!(result.assigned_count <= 2);
    assert_eq!(result.assigned_count + result.unfillable_count, 11);

    // 无解场次全部留空, 已填场次零违规
    let report = state.schedule_api.validate_day(date).await.unwrap();
    assert!(report.per_assignment.is_empty());
}
