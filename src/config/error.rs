// ==========================================
// 坩埚监控调度系统 - 配置层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 配置层错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 ({path}): {message}")]
    ReadError { path: String, message: String },

    #[error("配置文件格式错误 ({path}): {message}")]
    ParseError { path: String, message: String },

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    ValueError {
        key: String,
        value: String,
        message: String,
    },

    #[error("未知配置项: {0}")]
    UnknownKey(String),

    #[error("配置校验失败 (key: {key}): {message}")]
    ValidationError { key: String, message: String },

    #[error("配置快照序列化失败: {0}")]
    SnapshotError(#[from] serde_json::Error),
}

/// Result 类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
