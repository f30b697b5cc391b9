// ==========================================
// 场馆排班系统 - 导游花名册仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 花名册由外部协作方维护, 引擎侧以读为主
// (insert 保留给种子数据与测试)
// ==========================================

use crate::domain::person::{Guide, GuideAvailability};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{fmt_date, fmt_ts, parse_date, parse_ts, text_conversion_error};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// GuideRepository - 导游仓储
// ==========================================
pub struct GuideRepository {
    conn: Arc<Mutex<Connection>>,
}

impl GuideRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Guide> {
        Ok(Guide {
            guide_id: row.get(0)?,
            name: row.get(1)?,
            guide_type: row
                .get::<_, String>(2)?
                .parse()
                .map_err(text_conversion_error)?,
            phone: row.get(3)?,
            is_active: row.get::<_, i64>(4)? != 0,
            created_at: parse_ts(&row.get::<_, String>(5)?)?,
            updated_at: parse_ts(&row.get::<_, String>(6)?)?,
        })
    }

    pub fn insert(&self, guide: &Guide) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"INSERT INTO guide (
                guide_id, name, guide_type, phone, is_active, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &guide.guide_id,
                &guide.name,
                guide.guide_type.to_string(),
                &guide.phone,
                guide.is_active as i64,
                fmt_ts(guide.created_at),
                fmt_ts(guide.updated_at),
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, guide_id: &str) -> RepositoryResult<Option<Guide>> {
        let conn = self.get_conn()?;
        match conn.query_row(
            r#"SELECT guide_id, name, guide_type, phone, is_active, created_at, updated_at
               FROM guide WHERE guide_id = ?"#,
            params![guide_id],
            Self::map_row,
        ) {
            Ok(guide) => Ok(Some(guide)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 在职导游, 按姓名排序 (下游平手裁决依赖此稳定顺序)
    pub fn list_active(&self) -> RepositoryResult<Vec<Guide>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT guide_id, name, guide_type, phone, is_active, created_at, updated_at
               FROM guide WHERE is_active = 1
               ORDER BY name, guide_id"#,
        )?;
        let rows = stmt.query_map([], Self::map_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<Guide>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT guide_id, name, guide_type, phone, is_active, created_at, updated_at
               FROM guide ORDER BY name, guide_id"#,
        )?;
        let rows = stmt.query_map([], Self::map_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

// ==========================================
// GuideAvailabilityRepository - 导游可用性仓储
// ==========================================
// 不变量: 每 (guide, date) 至多一条 (主键保证)
pub struct GuideAvailabilityRepository {
    conn: Arc<Mutex<Connection>>,
}

impl GuideAvailabilityRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<GuideAvailability> {
        Ok(GuideAvailability {
            guide_id: row.get(0)?,
            date: parse_date(&row.get::<_, String>(1)?)?,
            is_available: row.get::<_, i64>(2)? != 0,
            note: row.get(3)?,
            created_at: parse_ts(&row.get::<_, String>(4)?)?,
            updated_at: parse_ts(&row.get::<_, String>(5)?)?,
        })
    }

    /// 写入或更新 (guide, date) 记录
    pub fn upsert(&self, availability: &GuideAvailability) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"INSERT INTO guide_availability (
                guide_id, date, is_available, note, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(guide_id, date) DO UPDATE SET
                is_available = excluded.is_available,
                note = excluded.note,
                updated_at = excluded.updated_at"#,
            params![
                &availability.guide_id,
                fmt_date(availability.date),
                availability.is_available as i64,
                &availability.note,
                fmt_ts(availability.created_at),
                fmt_ts(availability.updated_at),
            ],
        )?;
        Ok(())
    }

    /// 查询 (guide, date) 记录
    ///
    /// # 返回
    /// - Ok(None): 无记录 (语义为"当日可用", 由调用方解释)
    pub fn find(&self, guide_id: &str, date: NaiveDate) -> RepositoryResult<Option<GuideAvailability>> {
        let conn = self.get_conn()?;
        match conn.query_row(
            r#"SELECT guide_id, date, is_available, note, created_at, updated_at
               FROM guide_availability WHERE guide_id = ? AND date = ?"#,
            params![guide_id, fmt_date(date)],
            Self::map_row,
        ) {
            Ok(a) => Ok(Some(a)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 某日明确标记为不可用的导游ID集合
    pub fn unavailable_guide_ids(&self, date: NaiveDate) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT guide_id FROM guide_availability
               WHERE date = ? AND is_available = 0
               ORDER BY guide_id"#,
        )?;
        let rows = stmt.query_map(params![fmt_date(date)], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}
