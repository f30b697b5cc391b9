// ==========================================
// 场馆排班系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免"部分模块外键开启/部分不开启"
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 内嵌建表语句，库自身即可完成初始化（无外部迁移脚本）
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 初始化数据库 schema（幂等）
///
/// 约定:
/// - 日期列存 TEXT "YYYY-MM-DD"
/// - 时刻列存 TEXT "HH:MM"
/// - 时间戳列存 TEXT "YYYY-MM-DD HH:MM:SS"
/// - 排班域各自独立: tour_* 表与 restaurant_* 表不互相引用
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- ===== 花名册（引擎只读，CRUD 由外部协作方负责） =====
        CREATE TABLE IF NOT EXISTS guide (
            guide_id   TEXT PRIMARY KEY,
            name       TEXT NOT NULL,
            guide_type TEXT NOT NULL,
            phone      TEXT,
            is_active  INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS guide_availability (
            guide_id   TEXT NOT NULL REFERENCES guide(guide_id) ON DELETE CASCADE,
            date       TEXT NOT NULL,
            is_available INTEGER NOT NULL DEFAULT 1,
            note       TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (guide_id, date)
        );

        CREATE TABLE IF NOT EXISTS restaurant_staff (
            staff_id   TEXT PRIMARY KEY,
            name       TEXT NOT NULL,
            role       TEXT NOT NULL,
            is_active  INTEGER NOT NULL DEFAULT 1,
            hire_date  TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS staff_availability (
            staff_id   TEXT NOT NULL REFERENCES restaurant_staff(staff_id) ON DELETE CASCADE,
            date       TEXT NOT NULL,
            is_available INTEGER NOT NULL DEFAULT 1,
            note       TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (staff_id, date)
        );

        -- ===== 时段目录 =====
        CREATE TABLE IF NOT EXISTS tour_slot (
            slot_id          TEXT PRIMARY KEY,
            start_time       TEXT NOT NULL,
            end_time         TEXT NOT NULL,
            duration_minutes INTEGER NOT NULL,
            UNIQUE (start_time, end_time)
        );

        -- ===== 导游域台账 =====
        CREATE TABLE IF NOT EXISTS day_schedule (
            date             TEXT PRIMARY KEY,
            standby_guide_id TEXT REFERENCES guide(guide_id) ON DELETE SET NULL,
            is_published     INTEGER NOT NULL DEFAULT 0,
            notes            TEXT,
            created_at       TEXT NOT NULL,
            updated_at       TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS tour_assignment (
            assignment_id   TEXT PRIMARY KEY,
            date            TEXT NOT NULL REFERENCES day_schedule(date) ON DELETE CASCADE,
            slot_id         TEXT NOT NULL REFERENCES tour_slot(slot_id),
            guide_id        TEXT REFERENCES guide(guide_id) ON DELETE SET NULL,
            status          TEXT NOT NULL DEFAULT 'SCHEDULED',
            visitor_count   INTEGER,
            visitor_type    TEXT,
            booking_channel TEXT,
            notes           TEXT,
            revision        INTEGER NOT NULL DEFAULT 0,
            created_at      TEXT NOT NULL,
            updated_at      TEXT NOT NULL,
            UNIQUE (date, slot_id)
        );

        -- ===== 餐厅域台账 =====
        CREATE TABLE IF NOT EXISTS restaurant_day (
            date         TEXT PRIMARY KEY,
            is_published INTEGER NOT NULL DEFAULT 0,
            published_at TEXT,
            notes        TEXT,
            created_at   TEXT NOT NULL,
            updated_at   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS shift_assignment (
            shift_id       TEXT PRIMARY KEY,
            date           TEXT NOT NULL REFERENCES restaurant_day(date) ON DELETE CASCADE,
            role           TEXT NOT NULL,
            start_time     TEXT NOT NULL,
            end_time       TEXT NOT NULL,
            duration_hours INTEGER NOT NULL,
            staff_id       TEXT REFERENCES restaurant_staff(staff_id) ON DELETE SET NULL,
            revision       INTEGER NOT NULL DEFAULT 0,
            created_at     TEXT NOT NULL,
            updated_at     TEXT NOT NULL
        );

        -- ===== 配置 =====
        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id   TEXT NOT NULL,
            key        TEXT NOT NULL,
            value      TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        -- 校验器/排班器反复按 (date) 和 (person, date) 查询, 见排班引擎
        CREATE INDEX IF NOT EXISTS idx_tour_assignment_date
            ON tour_assignment(date);
        CREATE INDEX IF NOT EXISTS idx_tour_assignment_guide_date
            ON tour_assignment(guide_id, date);
        CREATE INDEX IF NOT EXISTS idx_shift_assignment_date
            ON shift_assignment(date);
        CREATE INDEX IF NOT EXISTS idx_shift_assignment_staff_date
            ON shift_assignment(staff_id, date);
        CREATE INDEX IF NOT EXISTS idx_guide_availability_date
            ON guide_availability(date);
        CREATE INDEX IF NOT EXISTS idx_staff_availability_date
            ON staff_availability(date);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));
    }

    #[test]
    fn test_schema_version_absent_before_init() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), None);
    }
}
