// ==========================================
// 场馆排班系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// 缺省: 代码内置默认值, 表中无记录时生效
// ==========================================

use crate::config::roster_config_trait::RosterConfigReader;
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use chrono::NaiveTime;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// 内置默认值
// ==========================================
const DEFAULT_MIN_BUFFER_MINUTES: i64 = 30;
const DEFAULT_LONG_BREAK_MINUTES: i64 = 90;
const DEFAULT_MAX_TOURS_PER_DAY: usize = 4;
const DEFAULT_MAX_CONSECUTIVE_TOURS: usize = 2;
const DEFAULT_MORNING_CUTOFF: &str = "14:30";
const DEFAULT_TOUR_FIRST_START_HOUR: u32 = 10;
const DEFAULT_TOUR_LAST_START_HOUR: u32 = 20;
const DEFAULT_TOUR_DURATION_MINUTES: i64 = 90;
const DEFAULT_LEAD_TIME_DAYS: i64 = 14;
const DEFAULT_AVAILABILITY_HORIZON_DAYS: i64 = 90;
const DEFAULT_OPERATING_START: &str = "10:00";
const DEFAULT_OPERATING_END: &str = "21:30";
const DEFAULT_COVERAGE_SAMPLE_MINUTES: i64 = 30;
const DEFAULT_MIN_KITCHEN_ON_DUTY: u32 = 2;
const DEFAULT_MIN_SERVING_ON_DUTY: u32 = 2;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明: 为保证连接行为一致, 会对传入连接再次应用统一 PRAGMA (幂等)
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }
        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值 (scope_id='global')
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );
        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 从 config_kv 表读取配置值, 带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    fn get_i64_or_default(&self, key: &str, default: i64) -> Result<i64, Box<dyn Error>> {
        let raw = self.get_config_or_default(key, &default.to_string())?;
        raw.trim()
            .parse::<i64>()
            .map_err(|e| format!("配置项 {} 非整数: {}", key, e).into())
    }

    fn get_time_or_default(&self, key: &str, default: &str) -> Result<NaiveTime, Box<dyn Error>> {
        let raw = self.get_config_or_default(key, default)?;
        NaiveTime::parse_from_str(raw.trim(), "%H:%M")
            .map_err(|e| format!("配置项 {} 非 HH:MM 时刻: {}", key, e).into())
    }

    /// 写入配置值 (scope_id='global')
    ///
    /// # 用途
    /// - 管理工具与测试覆写默认值
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            r#"INSERT INTO config_kv (scope_id, key, value, updated_at)
               VALUES ('global', ?1, ?2, datetime('now'))
               ON CONFLICT(scope_id, key) DO UPDATE SET
                   value = excluded.value,
                   updated_at = excluded.updated_at"#,
            params![key, value],
        )?;
        Ok(())
    }
}

#[async_trait(?Send)]
impl RosterConfigReader for ConfigManager {
    async fn get_min_buffer_minutes(&self) -> Result<i64, Box<dyn Error>> {
        self.get_i64_or_default("min_buffer_minutes", DEFAULT_MIN_BUFFER_MINUTES)
    }

    async fn get_long_break_minutes(&self) -> Result<i64, Box<dyn Error>> {
        self.get_i64_or_default("long_break_minutes", DEFAULT_LONG_BREAK_MINUTES)
    }

    async fn get_max_tours_per_day(&self) -> Result<usize, Box<dyn Error>> {
        Ok(self.get_i64_or_default("max_tours_per_day", DEFAULT_MAX_TOURS_PER_DAY as i64)? as usize)
    }

    async fn get_max_consecutive_tours(&self) -> Result<usize, Box<dyn Error>> {
        Ok(self
            .get_i64_or_default("max_consecutive_tours", DEFAULT_MAX_CONSECUTIVE_TOURS as i64)?
            as usize)
    }

    async fn get_morning_cutoff(&self) -> Result<NaiveTime, Box<dyn Error>> {
        self.get_time_or_default("morning_cutoff", DEFAULT_MORNING_CUTOFF)
    }

    async fn get_tour_first_start_hour(&self) -> Result<u32, Box<dyn Error>> {
        Ok(self.get_i64_or_default("tour_first_start_hour", DEFAULT_TOUR_FIRST_START_HOUR as i64)?
            as u32)
    }

    async fn get_tour_last_start_hour(&self) -> Result<u32, Box<dyn Error>> {
        Ok(self.get_i64_or_default("tour_last_start_hour", DEFAULT_TOUR_LAST_START_HOUR as i64)?
            as u32)
    }

    async fn get_tour_duration_minutes(&self) -> Result<i64, Box<dyn Error>> {
        self.get_i64_or_default("tour_duration_minutes", DEFAULT_TOUR_DURATION_MINUTES)
    }

    async fn get_lead_time_days(&self) -> Result<i64, Box<dyn Error>> {
        self.get_i64_or_default("lead_time_days", DEFAULT_LEAD_TIME_DAYS)
    }

    async fn get_availability_horizon_days(&self) -> Result<i64, Box<dyn Error>> {
        self.get_i64_or_default(
            "availability_horizon_days",
            DEFAULT_AVAILABILITY_HORIZON_DAYS,
        )
    }

    async fn get_operating_start(&self) -> Result<NaiveTime, Box<dyn Error>> {
        self.get_time_or_default("operating_start", DEFAULT_OPERATING_START)
    }

    async fn get_operating_end(&self) -> Result<NaiveTime, Box<dyn Error>> {
        self.get_time_or_default("operating_end", DEFAULT_OPERATING_END)
    }

    async fn get_coverage_sample_minutes(&self) -> Result<i64, Box<dyn Error>> {
        self.get_i64_or_default("coverage_sample_minutes", DEFAULT_COVERAGE_SAMPLE_MINUTES)
    }

    async fn get_min_kitchen_on_duty(&self) -> Result<u32, Box<dyn Error>> {
        Ok(self.get_i64_or_default("min_kitchen_on_duty", DEFAULT_MIN_KITCHEN_ON_DUTY as i64)?
            as u32)
    }

    async fn get_min_serving_on_duty(&self) -> Result<u32, Box<dyn Error>> {
        Ok(self.get_i64_or_default("min_serving_on_duty", DEFAULT_MIN_SERVING_ON_DUTY as i64)?
            as u32)
    }
}
