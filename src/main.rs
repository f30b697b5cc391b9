// ==========================================
// 场馆排班系统 - CLI 入口
// ==========================================
// 轻量命令行: 驱动两个排班域的 API, 不做业务逻辑
// 用法:
//   venue-roster [--db <path>] <command> [args]
//
// 导游域:
//   generate-slots
//   materialize <YYYY-MM-DD>
//   materialize-month <year> <month>
//   auto-assign <YYYY-MM-DD> [--no-standby]
//   validate <YYYY-MM-DD>
//   publish | unpublish | clear | stats <YYYY-MM-DD>
//
// 餐厅域:
//   restaurant-assign <YYYY-MM-DD> [mixed|all_8h]
//   restaurant-validate <YYYY-MM-DD>
//   restaurant-publish | restaurant-unpublish | restaurant-clear
//   restaurant-summary <YYYY-MM-DD>
// ==========================================

use chrono::NaiveDate;
use venue_roster::app::{get_default_db_path, AppState};
use venue_roster::domain::types::ShiftPattern;
use venue_roster::engine::AutoAssignOptions;
use venue_roster::logging;

fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("日期格式非法 (应为 YYYY-MM-DD): {}", s))
}

fn usage() -> ! {
    eprintln!("usage: venue-roster [--db <path>] <command> [args]");
    eprintln!("  generate-slots");
    eprintln!("  materialize <YYYY-MM-DD>");
    eprintln!("  materialize-month <year> <month>");
    eprintln!("  auto-assign <YYYY-MM-DD> [--no-standby]");
    eprintln!("  validate | publish | unpublish | clear | stats <YYYY-MM-DD>");
    eprintln!("  restaurant-assign <YYYY-MM-DD> [mixed|all_8h]");
    eprintln!("  restaurant-validate | restaurant-publish | restaurant-unpublish | restaurant-clear | restaurant-summary <YYYY-MM-DD>");
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();

    let db_path = if args.first().map(String::as_str) == Some("--db") {
        args.remove(0);
        if args.is_empty() {
            usage();
        }
        args.remove(0)
    } else {
        get_default_db_path()
    };

    if let Some(parent) = std::path::Path::new(&db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    tracing::info!("场馆排班系统 v{}", venue_roster::VERSION);
    tracing::info!("使用数据库: {}", db_path);

    let state = AppState::new(db_path)?;

    let Some(command) = args.first().cloned() else {
        usage();
    };

    match command.as_str() {
        // ==========================================
        // 导游域
        // ==========================================
        "generate-slots" => {
            let created = state.schedule_api.generate_slot_catalog().await?;
            if created > 0 {
                println!("Created {} new time slot(s)", created);
            } else {
                println!("No new slots created (all slots already exist)");
            }
        }
        "materialize" => {
            let date = parse_date(args.get(1).unwrap_or_else(|| usage()))?;
            let result = state.schedule_api.materialize_day(date).await?;
            println!(
                "{}: {} session(s) created, {} total",
                result.date, result.sessions_created, result.total_sessions
            );
        }
        "materialize-month" => {
            let year: i32 = args.get(1).unwrap_or_else(|| usage()).parse()?;
            let month: u32 = args.get(2).unwrap_or_else(|| usage()).parse()?;
            let result = state.schedule_api.materialize_month(year, month).await?;
            println!(
                "Created {} session(s) across {} day(s)",
                result.total_sessions, result.days
            );
        }
        "auto-assign" => {
            let date = parse_date(args.get(1).unwrap_or_else(|| usage()))?;
            let options = AutoAssignOptions {
                assign_standby: !args.iter().any(|a| a == "--no-standby"),
            };
            let result = state.schedule_api.auto_assign(date, options).await?;
            println!("Assigned:   {}", result.assigned_count);
            println!("Unfillable: {}", result.unfillable_count);
            if let Some(standby) = &result.standby_guide_id {
                println!("Standby:    {}", standby);
            }
            for error in &result.errors {
                println!("  - {}", error);
            }
        }
        "validate" => {
            let date = parse_date(args.get(1).unwrap_or_else(|| usage()))?;
            let report = state.schedule_api.validate_day(date).await?;
            if report.is_clean() {
                println!("No violations");
            } else {
                for v in &report.general {
                    println!("[day] {}", v);
                }
                for (assignment_id, violations) in &report.per_assignment {
                    for v in violations {
                        println!("[{}] {}", assignment_id, v);
                    }
                }
            }
        }
        "publish" => {
            let date = parse_date(args.get(1).unwrap_or_else(|| usage()))?;
            state.schedule_api.publish(date).await?;
            println!("Schedule published");
        }
        "unpublish" => {
            let date = parse_date(args.get(1).unwrap_or_else(|| usage()))?;
            state.schedule_api.unpublish(date).await?;
            println!("Schedule unpublished");
        }
        "clear" => {
            let date = parse_date(args.get(1).unwrap_or_else(|| usage()))?;
            let cleared = state.schedule_api.clear_day(date).await?;
            println!("Cleared {} assignment(s)", cleared);
        }
        "stats" => {
            let date = parse_date(args.get(1).unwrap_or_else(|| usage()))?;
            let stats = state.schedule_api.day_stats(date).await?;
            println!("Total slots:  {}", stats.total_slots);
            println!("Assigned:     {}", stats.assigned_count);
            println!("Unassigned:   {}", stats.unassigned_count);
            println!("Errors:       {}", stats.error_count);
            println!("Standby:      {}", if stats.has_standby { "yes" } else { "no" });
            println!("Published:    {}", if stats.is_published { "yes" } else { "no" });
            println!("Coverage:     {}%", stats.coverage_percentage);
        }

        // ==========================================
        // 餐厅域
        // ==========================================
        "restaurant-assign" => {
            let date = parse_date(args.get(1).unwrap_or_else(|| usage()))?;
            let pattern: ShiftPattern = args
                .get(2)
                .map(|s| s.parse())
                .transpose()
                .map_err(|e| anyhow::anyhow!("{}", e))?
                .unwrap_or_default();
            let result = state.restaurant_api.auto_assign(date, pattern).await?;
            println!("Kitchen staff assigned: {}", result.kitchen_assigned);
            println!("Serving staff assigned: {}", result.serving_assigned);
            println!("Total staff assigned:   {}", result.total_staff);
            println!("Unfillable shifts:      {}", result.unfillable_count);
            for error in &result.errors {
                println!("  - {}", error);
            }
        }
        "restaurant-validate" => {
            let date = parse_date(args.get(1).unwrap_or_else(|| usage()))?;
            let report = state.restaurant_api.validate_day(date).await?;
            if report.is_valid() {
                println!("All coverage requirements met");
            } else {
                for gap in &report.gaps {
                    println!(
                        "{}: {} {}/{}",
                        gap.time.format("%H:%M"),
                        gap.role,
                        gap.observed,
                        gap.required
                    );
                }
                if report.unassigned_count > 0 {
                    println!("{} shift(s) unassigned", report.unassigned_count);
                }
            }
        }
        "restaurant-publish" => {
            let date = parse_date(args.get(1).unwrap_or_else(|| usage()))?;
            state.restaurant_api.publish(date).await?;
            println!("Restaurant schedule published");
        }
        "restaurant-unpublish" => {
            let date = parse_date(args.get(1).unwrap_or_else(|| usage()))?;
            state.restaurant_api.unpublish(date).await?;
            println!("Restaurant schedule unpublished");
        }
        "restaurant-clear" => {
            let date = parse_date(args.get(1).unwrap_or_else(|| usage()))?;
            let cleared = state.restaurant_api.clear_day(date).await?;
            println!("Cleared {} shift assignment(s)", cleared);
        }
        "restaurant-summary" => {
            let date = parse_date(args.get(1).unwrap_or_else(|| usage()))?;
            let summary = state.restaurant_api.schedule_summary(date).await?;
            println!("Total shifts:     {}", summary.total_shifts);
            println!("Assigned:         {}", summary.assigned_shifts);
            println!("Kitchen staff:    {}", summary.kitchen_staff);
            println!("Serving staff:    {}", summary.serving_staff);
            println!("Total staff used: {}", summary.total_staff);
            println!("Full-day (8h):    {}", summary.full_day_shifts);
            println!("Half-day (4h):    {}", summary.half_day_shifts);
            println!("Total hours:      {}h", summary.total_hours);
            println!(
                "Coverage valid:   {}",
                if summary.coverage_valid { "Yes" } else { "No" }
            );
        }

        _ => usage(),
    }

    Ok(())
}
