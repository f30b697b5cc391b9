// ==========================================
// 场馆排班系统 - 时段目录仓储
// ==========================================
// 目录只生成一次, 幂等; (start, end) 唯一约束承载幂等性
// ==========================================

use crate::domain::slot::TourSlot;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{fmt_time, parse_time};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

pub struct TourSlotRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TourSlotRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<TourSlot> {
        Ok(TourSlot {
            slot_id: row.get(0)?,
            start_time: parse_time(&row.get::<_, String>(1)?)?,
            end_time: parse_time(&row.get::<_, String>(2)?)?,
            duration_minutes: row.get(3)?,
        })
    }

    /// 插入时段; 若 (start, end) 已存在则跳过
    ///
    /// # 返回
    /// - Ok(true): 新建
    /// - Ok(false): 已存在, 未写入
    pub fn insert_if_absent(&self, slot: &TourSlot) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            r#"INSERT OR IGNORE INTO tour_slot (
                slot_id, start_time, end_time, duration_minutes
            ) VALUES (?, ?, ?, ?)"#,
            params![
                &slot.slot_id,
                fmt_time(slot.start_time),
                fmt_time(slot.end_time),
                slot.duration_minutes,
            ],
        )?;
        Ok(changed > 0)
    }

    pub fn find_by_id(&self, slot_id: &str) -> RepositoryResult<Option<TourSlot>> {
        let conn = self.get_conn()?;
        match conn.query_row(
            r#"SELECT slot_id, start_time, end_time, duration_minutes
               FROM tour_slot WHERE slot_id = ?"#,
            params![slot_id],
            Self::map_row,
        ) {
            Ok(slot) => Ok(Some(slot)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 全部时段, 按开始时刻排序
    pub fn list_all(&self) -> RepositoryResult<Vec<TourSlot>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT slot_id, start_time, end_time, duration_minutes
               FROM tour_slot ORDER BY start_time"#,
        )?;
        let rows = stmt.query_map([], Self::map_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM tour_slot", [], |row| row.get(0))?;
        Ok(n)
    }

    /// 清空目录 (目录重建工具用, 破坏性)
    pub fn delete_all(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let n = conn.execute("DELETE FROM tour_slot", [])?;
        Ok(n)
    }
}
