// ==========================================
// 坩埚监控调度系统 - API层错误类型
// ==========================================
// 职责: 汇总下层错误，对外统一为用户可读的错误消息
// 红线: 上游数据失败对外只表现为一个通用失败，不携带部分结果
// ==========================================

use crate::config::ConfigError;
use crate::importer::ImportError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    /// 上游数据获取失败（整次运行失败）
    #[error("数据获取失败: {0}")]
    Upstream(String),

    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    #[error("报告序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 ImportError 转换
// 目的: 文件缺失、解析失败、上游失败都视为数据获取失败
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::InternalError(msg) => ApiError::InternalError(msg),
            ImportError::Other(err) => ApiError::Other(err),
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_errors_become_upstream() {
        let err: ApiError = ImportError::FileNotFound("data.json".to_string()).into();
        assert!(matches!(err, ApiError::Upstream(_)));
        assert!(err.to_string().contains("data.json"));

        let err: ApiError = ImportError::InternalError("boom".to_string()).into();
        assert!(matches!(err, ApiError::InternalError(_)));
    }

    #[test]
    fn test_config_error_conversion() {
        let err: ApiError = ConfigError::UnknownKey("x.y".to_string()).into();
        assert!(matches!(err, ApiError::Config(_)));
    }
}
