// ==========================================
// 场馆排班系统 - 餐厅员工仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::person::{RestaurantStaff, StaffAvailability};
use crate::domain::types::StaffRole;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{fmt_date, fmt_ts, parse_date, parse_ts, text_conversion_error};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// StaffRepository - 员工仓储
// ==========================================
pub struct StaffRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StaffRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<RestaurantStaff> {
        Ok(RestaurantStaff {
            staff_id: row.get(0)?,
            name: row.get(1)?,
            role: row
                .get::<_, String>(2)?
                .parse()
                .map_err(text_conversion_error)?,
            is_active: row.get::<_, i64>(3)? != 0,
            hire_date: row
                .get::<_, Option<String>>(4)?
                .map(|s| parse_date(&s))
                .transpose()?,
            created_at: parse_ts(&row.get::<_, String>(5)?)?,
            updated_at: parse_ts(&row.get::<_, String>(6)?)?,
        })
    }

    pub fn insert(&self, staff: &RestaurantStaff) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"INSERT INTO restaurant_staff (
                staff_id, name, role, is_active, hire_date, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &staff.staff_id,
                &staff.name,
                staff.role.to_string(),
                staff.is_active as i64,
                staff.hire_date.map(fmt_date),
                fmt_ts(staff.created_at),
                fmt_ts(staff.updated_at),
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, staff_id: &str) -> RepositoryResult<Option<RestaurantStaff>> {
        let conn = self.get_conn()?;
        match conn.query_row(
            r#"SELECT staff_id, name, role, is_active, hire_date, created_at, updated_at
               FROM restaurant_staff WHERE staff_id = ?"#,
            params![staff_id],
            Self::map_row,
        ) {
            Ok(staff) => Ok(Some(staff)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 某岗位在职员工, 按姓名排序 (填充器顺序消耗此列表)
    pub fn list_active_by_role(&self, role: StaffRole) -> RepositoryResult<Vec<RestaurantStaff>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT staff_id, name, role, is_active, hire_date, created_at, updated_at
               FROM restaurant_staff WHERE is_active = 1 AND role = ?
               ORDER BY name, staff_id"#,
        )?;
        let rows = stmt.query_map(params![role.to_string()], Self::map_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn list_active(&self) -> RepositoryResult<Vec<RestaurantStaff>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT staff_id, name, role, is_active, hire_date, created_at, updated_at
               FROM restaurant_staff WHERE is_active = 1
               ORDER BY role, name, staff_id"#,
        )?;
        let rows = stmt.query_map([], Self::map_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

// ==========================================
// StaffAvailabilityRepository - 员工可用性仓储
// ==========================================
pub struct StaffAvailabilityRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StaffAvailabilityRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<StaffAvailability> {
        Ok(StaffAvailability {
            staff_id: row.get(0)?,
            date: parse_date(&row.get::<_, String>(1)?)?,
            is_available: row.get::<_, i64>(2)? != 0,
            note: row.get(3)?,
            created_at: parse_ts(&row.get::<_, String>(4)?)?,
            updated_at: parse_ts(&row.get::<_, String>(5)?)?,
        })
    }

    pub fn upsert(&self, availability: &StaffAvailability) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"INSERT INTO staff_availability (
                staff_id, date, is_available, note, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(staff_id, date) DO UPDATE SET
                is_available = excluded.is_available,
                note = excluded.note,
                updated_at = excluded.updated_at"#,
            params![
                &availability.staff_id,
                fmt_date(availability.date),
                availability.is_available as i64,
                &availability.note,
                fmt_ts(availability.created_at),
                fmt_ts(availability.updated_at),
            ],
        )?;
        Ok(())
    }

    pub fn find(&self, staff_id: &str, date: NaiveDate) -> RepositoryResult<Option<StaffAvailability>> {
        let conn = self.get_conn()?;
        match conn.query_row(
            r#"SELECT staff_id, date, is_available, note, created_at, updated_at
               FROM staff_availability WHERE staff_id = ? AND date = ?"#,
            params![staff_id, fmt_date(date)],
            Self::map_row,
        ) {
            Ok(a) => Ok(Some(a)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 某日明确标记为不可用的员工ID集合
    pub fn unavailable_staff_ids(&self, date: NaiveDate) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT staff_id FROM staff_availability
               WHERE date = ? AND is_available = 0
               ORDER BY staff_id"#,
        )?;
        let rows = stmt.query_map(params![fmt_date(date)], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}
