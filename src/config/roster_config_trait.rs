// ==========================================
// 场馆排班系统 - 排班配置读取接口
// ==========================================
// 职责: 定义引擎所需配置项的读取抽象
// 用途: 生产实现为 ConfigManager (config_kv 表),
//       测试可注入内存实现
// ==========================================

use async_trait::async_trait;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::error::Error;

// ==========================================
// RosterRules - 导游域规则快照
// ==========================================
// 校验器/排班器为同步计算, 启动时从配置一次性解析
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RosterRules {
    pub min_buffer_minutes: i64,    // 同人相邻场次最小缓冲(分钟)
    pub long_break_minutes: i64,    // 第3场起要求的长休息档(分钟, 含缓冲)
    pub max_tours_per_day: usize,   // 单人单日场次上限
    pub max_consecutive_tours: usize, // 仅隔最小缓冲的连续场次上限
    pub morning_cutoff: NaiveTime,  // 上午/下午分界时刻
}

// ==========================================
// CoverageRules - 餐厅域覆盖规则快照
// ==========================================
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CoverageRules {
    pub operating_start: NaiveTime,   // 营业开始
    pub operating_end: NaiveTime,     // 营业结束
    pub sample_minutes: i64,          // 覆盖率采样步长(分钟)
    pub min_kitchen_on_duty: u32,     // 后厨最低同时在岗
    pub min_serving_on_duty: u32,     // 前厅最低同时在岗
}

// ==========================================
// RosterConfigReader - 配置读取 trait
// ==========================================
#[async_trait(?Send)]
pub trait RosterConfigReader: Send + Sync {
    /// 同人相邻场次最小缓冲(分钟), 默认 30
    async fn get_min_buffer_minutes(&self) -> Result<i64, Box<dyn Error>>;

    /// 第3场起要求存在的长休息档(分钟), 默认 90 (30缓冲 + 60连续休息)
    async fn get_long_break_minutes(&self) -> Result<i64, Box<dyn Error>>;

    /// 单人单日场次上限, 默认 4
    async fn get_max_tours_per_day(&self) -> Result<usize, Box<dyn Error>>;

    /// 仅隔最小缓冲的连续场次上限, 默认 2
    async fn get_max_consecutive_tours(&self) -> Result<usize, Box<dyn Error>>;

    /// 上午/下午分界时刻, 默认 14:30
    async fn get_morning_cutoff(&self) -> Result<NaiveTime, Box<dyn Error>>;

    /// 导览时段: 首班开始整点, 默认 10
    async fn get_tour_first_start_hour(&self) -> Result<u32, Box<dyn Error>>;

    /// 导览时段: 末班开始整点, 默认 20
    async fn get_tour_last_start_hour(&self) -> Result<u32, Box<dyn Error>>;

    /// 导览时段时长(分钟), 默认 90
    async fn get_tour_duration_minutes(&self) -> Result<i64, Box<dyn Error>>;

    /// 月度排班最短提前期(天), 默认 14
    async fn get_lead_time_days(&self) -> Result<i64, Box<dyn Error>>;

    /// 可用性可标记的最远天数, 默认 90
    async fn get_availability_horizon_days(&self) -> Result<i64, Box<dyn Error>>;

    /// 营业开始时刻, 默认 10:00
    async fn get_operating_start(&self) -> Result<NaiveTime, Box<dyn Error>>;

    /// 营业结束时刻, 默认 21:30
    async fn get_operating_end(&self) -> Result<NaiveTime, Box<dyn Error>>;

    /// 覆盖率采样步长(分钟), 默认 30
    async fn get_coverage_sample_minutes(&self) -> Result<i64, Box<dyn Error>>;

    /// 后厨最低同时在岗, 默认 2
    async fn get_min_kitchen_on_duty(&self) -> Result<u32, Box<dyn Error>>;

    /// 前厅最低同时在岗, 默认 2
    async fn get_min_serving_on_duty(&self) -> Result<u32, Box<dyn Error>>;

    /// 组装导游域规则快照
    async fn get_roster_rules(&self) -> Result<RosterRules, Box<dyn Error>> {
        Ok(RosterRules {
            min_buffer_minutes: self.get_min_buffer_minutes().await?,
            long_break_minutes: self.get_long_break_minutes().await?,
            max_tours_per_day: self.get_max_tours_per_day().await?,
            max_consecutive_tours: self.get_max_consecutive_tours().await?,
            morning_cutoff: self.get_morning_cutoff().await?,
        })
    }

    /// 组装餐厅域覆盖规则快照
    async fn get_coverage_rules(&self) -> Result<CoverageRules, Box<dyn Error>> {
        Ok(CoverageRules {
            operating_start: self.get_operating_start().await?,
            operating_end: self.get_operating_end().await?,
            sample_minutes: self.get_coverage_sample_minutes().await?,
            min_kitchen_on_duty: self.get_min_kitchen_on_duty().await?,
            min_serving_on_duty: self.get_min_serving_on_duty().await?,
        })
    }
}
