// ==========================================
// 坩埚监控调度系统 - 数据获取错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 数据获取失败即整次运行失败，不重试、不返回部分结果
// ==========================================

use thiserror::Error;

/// 数据获取错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .json/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    // ===== 解析错误 =====
    #[error("JSON 解析失败 ({source_name}): {message}")]
    JsonParseError { source_name: String, message: String },

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("数据结构不符 ({source_name}): {message}")]
    UnexpectedShape { source_name: String, message: String },

    // ===== 上游错误 =====
    #[error("上游数据源失败 ({source_name}): {message}")]
    UpstreamError { source_name: String, message: String },

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
