// ==========================================
// 场馆排班系统 - 应用层
// ==========================================
// 职责: 组装与入口支撑 (无 UI)
// ==========================================

pub mod state;

pub use state::AppState;

/// 默认数据库路径: 数据目录下 venue_roster.db, 取不到则用当前目录
pub fn get_default_db_path() -> String {
    dirs::data_dir()
        .map(|dir| {
            dir.join("venue-roster")
                .join("venue_roster.db")
                .to_string_lossy()
                .to_string()
        })
        .unwrap_or_else(|| "venue_roster.db".to_string())
}
