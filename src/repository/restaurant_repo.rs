// ==========================================
// 场馆排班系统 - 餐厅域台账仓储
// ==========================================
// 红线: Repository 不含排班业务逻辑
// 班次按实例存储: 同一模板当日可出现多条
// ==========================================

use crate::domain::schedule::{RestaurantDay, ShiftAssignment};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{fmt_date, fmt_time, fmt_ts, parse_date, parse_time, parse_ts, text_conversion_error};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// RestaurantDayRepository - 餐厅日台账仓储
// ==========================================
pub struct RestaurantDayRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RestaurantDayRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<RestaurantDay> {
        Ok(RestaurantDay {
            date: parse_date(&row.get::<_, String>(0)?)?,
            is_published: row.get::<_, i64>(1)? != 0,
            published_at: row
                .get::<_, Option<String>>(2)?
                .map(|s| parse_ts(&s))
                .transpose()?,
            notes: row.get(3)?,
            created_at: parse_ts(&row.get::<_, String>(4)?)?,
            updated_at: parse_ts(&row.get::<_, String>(5)?)?,
        })
    }

    pub fn find_by_date(&self, date: NaiveDate) -> RepositoryResult<Option<RestaurantDay>> {
        let conn = self.get_conn()?;
        match conn.query_row(
            r#"SELECT date, is_published, published_at, notes, created_at, updated_at
               FROM restaurant_day WHERE date = ?"#,
            params![fmt_date(date)],
            Self::map_row,
        ) {
            Ok(d) => Ok(Some(d)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_or_create(&self, date: NaiveDate) -> RepositoryResult<(RestaurantDay, bool)> {
        if let Some(existing) = self.find_by_date(date)? {
            return Ok((existing, false));
        }

        let now = Utc::now();
        let day = RestaurantDay {
            date,
            is_published: false,
            published_at: None,
            notes: None,
            created_at: now,
            updated_at: now,
        };

        let conn = self.get_conn()?;
        conn.execute(
            r#"INSERT INTO restaurant_day (
                date, is_published, published_at, notes, created_at, updated_at
            ) VALUES (?, 0, NULL, NULL, ?, ?)"#,
            params![fmt_date(date), fmt_ts(now), fmt_ts(now)],
        )?;
        Ok((day, true))
    }

    /// 设置发布标志; 发布时间戳由调用方给定 (撤销发布时传 None)
    pub fn set_published(
        &self,
        date: NaiveDate,
        published: bool,
        published_at: Option<DateTime<Utc>>,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            "UPDATE restaurant_day SET is_published = ?, published_at = ?, updated_at = ? WHERE date = ?",
            params![
                published as i64,
                published_at.map(fmt_ts),
                fmt_ts(Utc::now()),
                fmt_date(date)
            ],
        )?;
        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "restaurant_day".to_string(),
                id: fmt_date(date),
            });
        }
        Ok(())
    }
}

// ==========================================
// ShiftAssignmentRepository - 班次仓储
// ==========================================
pub struct ShiftAssignmentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ShiftAssignmentRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<ShiftAssignment> {
        Ok(ShiftAssignment {
            shift_id: row.get(0)?,
            date: parse_date(&row.get::<_, String>(1)?)?,
            role: row
                .get::<_, String>(2)?
                .parse()
                .map_err(text_conversion_error)?,
            start_time: parse_time(&row.get::<_, String>(3)?)?,
            end_time: parse_time(&row.get::<_, String>(4)?)?,
            duration_hours: row.get(5)?,
            staff_id: row.get(6)?,
            revision: row.get(7)?,
            created_at: parse_ts(&row.get::<_, String>(8)?)?,
            updated_at: parse_ts(&row.get::<_, String>(9)?)?,
        })
    }

    pub fn create(&self, shift: &ShiftAssignment) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"INSERT INTO shift_assignment (
                shift_id, date, role, start_time, end_time, duration_hours,
                staff_id, revision, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &shift.shift_id,
                fmt_date(shift.date),
                shift.role.to_string(),
                fmt_time(shift.start_time),
                fmt_time(shift.end_time),
                shift.duration_hours,
                &shift.staff_id,
                shift.revision,
                fmt_ts(shift.created_at),
                fmt_ts(shift.updated_at),
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, shift_id: &str) -> RepositoryResult<Option<ShiftAssignment>> {
        let conn = self.get_conn()?;
        match conn.query_row(
            r#"SELECT shift_id, date, role, start_time, end_time, duration_hours,
                      staff_id, revision, created_at, updated_at
               FROM shift_assignment WHERE shift_id = ?"#,
            params![shift_id],
            Self::map_row,
        ) {
            Ok(s) => Ok(Some(s)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 某日全部班次, 按开始时刻/岗位排序
    pub fn list_for_day(&self, date: NaiveDate) -> RepositoryResult<Vec<ShiftAssignment>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT shift_id, date, role, start_time, end_time, duration_hours,
                      staff_id, revision, created_at, updated_at
               FROM shift_assignment WHERE date = ?
               ORDER BY start_time, role, shift_id"#,
        )?;
        let rows = stmt.query_map(params![fmt_date(date)], Self::map_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// 某员工某日持有的班次 (一人一日一班规则按此查询)
    pub fn list_for_staff_on(
        &self,
        staff_id: &str,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<ShiftAssignment>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT shift_id, date, role, start_time, end_time, duration_hours,
                      staff_id, revision, created_at, updated_at
               FROM shift_assignment WHERE staff_id = ? AND date = ?
               ORDER BY start_time"#,
        )?;
        let rows = stmt.query_map(params![staff_id, fmt_date(date)], Self::map_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn count_unassigned(&self, date: NaiveDate) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row(
            "SELECT COUNT(*) FROM shift_assignment WHERE date = ? AND staff_id IS NULL",
            params![fmt_date(date)],
            |row| row.get(0),
        )?;
        Ok(n)
    }

    /// 指派/撤销员工 (乐观锁, 同导游域)
    pub fn set_staff_checked(
        &self,
        shift_id: &str,
        staff_id: Option<&str>,
        expected_revision: i64,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            r#"UPDATE shift_assignment
               SET staff_id = ?, revision = revision + 1, updated_at = ?
               WHERE shift_id = ? AND revision = ?"#,
            params![staff_id, fmt_ts(Utc::now()), shift_id, expected_revision],
        )?;
        if changed > 0 {
            return Ok(());
        }

        let actual: Option<i64> = conn
            .query_row(
                "SELECT revision FROM shift_assignment WHERE shift_id = ?",
                params![shift_id],
                |row| row.get(0),
            )
            .optional()?;
        match actual {
            None => Err(RepositoryError::NotFound {
                entity: "shift_assignment".to_string(),
                id: shift_id.to_string(),
            }),
            Some(actual) => Err(RepositoryError::OptimisticLockFailure {
                entity: "shift_assignment".to_string(),
                id: shift_id.to_string(),
                expected: expected_revision,
                actual,
            }),
        }
    }

    /// 清空某日全部指派 (班次实例保留)
    pub fn clear_day(&self, date: NaiveDate) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let n = conn.execute(
            r#"UPDATE shift_assignment
               SET staff_id = NULL, revision = revision + 1, updated_at = ?
               WHERE date = ?"#,
            params![fmt_ts(Utc::now()), fmt_date(date)],
        )?;
        Ok(n)
    }

    /// 删除某日全部班次实例 (模式重建时使用)
    pub fn delete_for_day(&self, date: NaiveDate) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let n = conn.execute(
            "DELETE FROM shift_assignment WHERE date = ?",
            params![fmt_date(date)],
        )?;
        Ok(n)
    }
}
