// ==========================================
// 场馆排班系统 - API层错误类型
// ==========================================
// 职责: 定义操作性失败, 转换 Repository 错误为用户可读消息
// 口径: 校验结果(违规)不是错误; 这里只收
//       未找到 / 状态无效 / 前置条件未满足 / 并发冲突 等操作性失败
// ==========================================

use crate::domain::violation::Violation;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("无效状态: {0}")]
    InvalidState(String),

    /// 前置条件未满足 (如: 提前期不足 / 可用性标记超出窗口)
    #[error("前置条件未满足: {0}")]
    PreconditionFailed(String),

    /// 发布被拒: 携带完整违规列表供调用方展示
    #[error("发布被拒: {} 条违规", .violations.len())]
    PublishBlocked { violations: Vec<Violation> },

    // ==========================================
    // 并发控制错误
    // ==========================================
    #[error("并发冲突: {0}")]
    Conflict(String),

    // ==========================================
    // 数据访问与内部错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("内部错误: {0}")]
    InternalError(String),
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} with id={}", entity, id))
            }
            RepositoryError::OptimisticLockFailure { .. } => ApiError::Conflict(err.to_string()),
            other => ApiError::DatabaseError(other.to_string()),
        }
    }
}

/// 配置读取错误 (Box<dyn Error>) 统一折叠为 ConfigError
pub fn config_err(err: Box<dyn std::error::Error>) -> ApiError {
    ApiError::ConfigError(err.to_string())
}

/// API层统一返回类型
pub type ApiResult<T> = Result<T, ApiError>;
