// ==========================================
// 场馆排班系统 - 导游域台账仓储
// ==========================================
// 红线: Repository 不含排班业务逻辑
// 并发: 单场次写入走 revision 乐观锁, 并发改写必须显式失败
// ==========================================

use crate::domain::schedule::{DaySchedule, TourAssignment};
use crate::domain::types::SessionStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{fmt_date, fmt_ts, parse_date, parse_ts, text_conversion_error};
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// ==========================================
// DayScheduleRepository - 日台账仓储
// ==========================================
pub struct DayScheduleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DayScheduleRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<DaySchedule> {
        Ok(DaySchedule {
            date: parse_date(&row.get::<_, String>(0)?)?,
            standby_guide_id: row.get(1)?,
            is_published: row.get::<_, i64>(2)? != 0,
            notes: row.get(3)?,
            created_at: parse_ts(&row.get::<_, String>(4)?)?,
            updated_at: parse_ts(&row.get::<_, String>(5)?)?,
        })
    }

    pub fn find_by_date(&self, date: NaiveDate) -> RepositoryResult<Option<DaySchedule>> {
        let conn = self.get_conn()?;
        match conn.query_row(
            r#"SELECT date, standby_guide_id, is_published, notes, created_at, updated_at
               FROM day_schedule WHERE date = ?"#,
            params![fmt_date(date)],
            Self::map_row,
        ) {
            Ok(s) => Ok(Some(s)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 取出日台账, 不存在则创建空台账
    ///
    /// # 返回
    /// - (DaySchedule, created): created = true 表示本次新建
    pub fn get_or_create(&self, date: NaiveDate) -> RepositoryResult<(DaySchedule, bool)> {
        if let Some(existing) = self.find_by_date(date)? {
            return Ok((existing, false));
        }

        let now = Utc::now();
        let schedule = DaySchedule {
            date,
            standby_guide_id: None,
            is_published: false,
            notes: None,
            created_at: now,
            updated_at: now,
        };

        let conn = self.get_conn()?;
        conn.execute(
            r#"INSERT INTO day_schedule (
                date, standby_guide_id, is_published, notes, created_at, updated_at
            ) VALUES (?, NULL, 0, NULL, ?, ?)"#,
            params![fmt_date(date), fmt_ts(now), fmt_ts(now)],
        )?;
        Ok((schedule, true))
    }

    pub fn set_standby(&self, date: NaiveDate, guide_id: Option<&str>) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            "UPDATE day_schedule SET standby_guide_id = ?, updated_at = ? WHERE date = ?",
            params![guide_id, fmt_ts(Utc::now()), fmt_date(date)],
        )?;
        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "day_schedule".to_string(),
                id: fmt_date(date),
            });
        }
        Ok(())
    }

    pub fn set_published(&self, date: NaiveDate, published: bool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            "UPDATE day_schedule SET is_published = ?, updated_at = ? WHERE date = ?",
            params![published as i64, fmt_ts(Utc::now()), fmt_date(date)],
        )?;
        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "day_schedule".to_string(),
                id: fmt_date(date),
            });
        }
        Ok(())
    }
}

// ==========================================
// TourAssignmentRepository - 导览场次仓储
// ==========================================
pub struct TourAssignmentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TourAssignmentRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<TourAssignment> {
        Ok(TourAssignment {
            assignment_id: row.get(0)?,
            date: parse_date(&row.get::<_, String>(1)?)?,
            slot_id: row.get(2)?,
            guide_id: row.get(3)?,
            status: row
                .get::<_, String>(4)?
                .parse::<SessionStatus>()
                .map_err(text_conversion_error)?,
            visitor_count: row.get(5)?,
            visitor_type: row
                .get::<_, Option<String>>(6)?
                .map(|s| s.parse().map_err(text_conversion_error))
                .transpose()?,
            booking_channel: row
                .get::<_, Option<String>>(7)?
                .map(|s| s.parse().map_err(text_conversion_error))
                .transpose()?,
            notes: row.get(8)?,
            revision: row.get(9)?,
            created_at: parse_ts(&row.get::<_, String>(10)?)?,
            updated_at: parse_ts(&row.get::<_, String>(11)?)?,
        })
    }

    const COLUMNS: &'static str = r#"assignment_id, date, slot_id, guide_id, status,
               visitor_count, visitor_type, booking_channel, notes,
               revision, created_at, updated_at"#;

    /// 取出 (date, slot) 场次, 不存在则创建未指派场次
    pub fn get_or_create(
        &self,
        date: NaiveDate,
        slot_id: &str,
    ) -> RepositoryResult<(TourAssignment, bool)> {
        if let Some(existing) = self.find_by_date_slot(date, slot_id)? {
            return Ok((existing, false));
        }

        let now = Utc::now();
        let assignment = TourAssignment {
            assignment_id: Uuid::new_v4().to_string(),
            date,
            slot_id: slot_id.to_string(),
            guide_id: None,
            status: SessionStatus::Scheduled,
            visitor_count: None,
            visitor_type: None,
            booking_channel: None,
            notes: None,
            revision: 0,
            created_at: now,
            updated_at: now,
        };

        let conn = self.get_conn()?;
        conn.execute(
            r#"INSERT INTO tour_assignment (
                assignment_id, date, slot_id, guide_id, status,
                visitor_count, visitor_type, booking_channel, notes,
                revision, created_at, updated_at
            ) VALUES (?, ?, ?, NULL, ?, NULL, NULL, NULL, NULL, 0, ?, ?)"#,
            params![
                &assignment.assignment_id,
                fmt_date(date),
                slot_id,
                assignment.status.to_string(),
                fmt_ts(now),
                fmt_ts(now),
            ],
        )?;
        Ok((assignment, true))
    }

    pub fn find_by_id(&self, assignment_id: &str) -> RepositoryResult<Option<TourAssignment>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM tour_assignment WHERE assignment_id = ?",
            Self::COLUMNS
        );
        match conn.query_row(&sql, params![assignment_id], Self::map_row) {
            Ok(a) => Ok(Some(a)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn find_by_date_slot(
        &self,
        date: NaiveDate,
        slot_id: &str,
    ) -> RepositoryResult<Option<TourAssignment>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM tour_assignment WHERE date = ? AND slot_id = ?",
            Self::COLUMNS
        );
        match conn.query_row(&sql, params![fmt_date(date), slot_id], Self::map_row) {
            Ok(a) => Ok(Some(a)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 某日全部场次, 按时段开始时刻排序
    pub fn list_for_day(&self, date: NaiveDate) -> RepositoryResult<Vec<TourAssignment>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT a.assignment_id, a.date, a.slot_id, a.guide_id, a.status,
                      a.visitor_count, a.visitor_type, a.booking_channel, a.notes,
                      a.revision, a.created_at, a.updated_at
               FROM tour_assignment a
               JOIN tour_slot s ON s.slot_id = a.slot_id
               WHERE a.date = ?
               ORDER BY s.start_time"#,
        )?;
        let rows = stmt.query_map(params![fmt_date(date)], Self::map_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// 某导游某日持有的全部场次 (校验器按 (person, day) 反复查询)
    pub fn list_for_guide_on(
        &self,
        guide_id: &str,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<TourAssignment>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT a.assignment_id, a.date, a.slot_id, a.guide_id, a.status,
                      a.visitor_count, a.visitor_type, a.booking_channel, a.notes,
                      a.revision, a.created_at, a.updated_at
               FROM tour_assignment a
               JOIN tour_slot s ON s.slot_id = a.slot_id
               WHERE a.guide_id = ? AND a.date = ?
               ORDER BY s.start_time"#,
        )?;
        let rows = stmt.query_map(params![guide_id, fmt_date(date)], Self::map_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn count_unassigned(&self, date: NaiveDate) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row(
            "SELECT COUNT(*) FROM tour_assignment WHERE date = ? AND guide_id IS NULL",
            params![fmt_date(date)],
            |row| row.get(0),
        )?;
        Ok(n)
    }

    /// 指派/撤销导游 (乐观锁)
    ///
    /// # 参数
    /// - expected_revision: 调用方读到的修订号; 不匹配则说明场次已被并发改写
    ///
    /// # 返回
    /// - Err(OptimisticLockFailure): 并发冲突, 调用方须重读后重试
    pub fn set_guide_checked(
        &self,
        assignment_id: &str,
        guide_id: Option<&str>,
        expected_revision: i64,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            r#"UPDATE tour_assignment
               SET guide_id = ?, revision = revision + 1, updated_at = ?
               WHERE assignment_id = ? AND revision = ?"#,
            params![guide_id, fmt_ts(Utc::now()), assignment_id, expected_revision],
        )?;
        if changed > 0 {
            return Ok(());
        }

        // 区分"记录不存在"与"修订号不匹配"
        let actual: Option<i64> = conn
            .query_row(
                "SELECT revision FROM tour_assignment WHERE assignment_id = ?",
                params![assignment_id],
                |row| row.get(0),
            )
            .optional()?;
        match actual {
            None => Err(RepositoryError::NotFound {
                entity: "tour_assignment".to_string(),
                id: assignment_id.to_string(),
            }),
            Some(actual) => Err(RepositoryError::OptimisticLockFailure {
                entity: "tour_assignment".to_string(),
                id: assignment_id.to_string(),
                expected: expected_revision,
                actual,
            }),
        }
    }

    /// 更新预订信息 (引擎不读取, 仅存取)
    pub fn set_booking_details(
        &self,
        assignment_id: &str,
        visitor_count: Option<i64>,
        visitor_type: Option<&str>,
        booking_channel: Option<&str>,
        notes: Option<&str>,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            r#"UPDATE tour_assignment
               SET visitor_count = ?, visitor_type = ?, booking_channel = ?, notes = ?,
                   revision = revision + 1, updated_at = ?
               WHERE assignment_id = ?"#,
            params![
                visitor_count,
                visitor_type,
                booking_channel,
                notes,
                fmt_ts(Utc::now()),
                assignment_id
            ],
        )?;
        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "tour_assignment".to_string(),
                id: assignment_id.to_string(),
            });
        }
        Ok(())
    }

    /// 清空某日全部指派与预订信息 (场次记录保留)
    pub fn clear_day(&self, date: NaiveDate) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let n = conn.execute(
            r#"UPDATE tour_assignment
               SET guide_id = NULL, visitor_count = NULL, visitor_type = NULL,
                   booking_channel = NULL, revision = revision + 1, updated_at = ?
               WHERE date = ?"#,
            params![fmt_ts(Utc::now()), fmt_date(date)],
        )?;
        Ok(n)
    }
}
