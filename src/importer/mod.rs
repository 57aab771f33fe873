// ==========================================
// 坩埚监控调度系统 - 数据获取层
// ==========================================
// 职责: 外部数据获取 + 清洗，生成领域对象
// 支持: JSON 目录、CSV 工单、内存数据
// ==========================================

// 模块声明
pub mod dataset;
pub mod error;
pub mod file_parser;
pub mod json_source;
pub mod record_cleaner;
pub mod source;

// 重导出核心类型
pub use dataset::{Dataset, DatasetLoader};
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, JsonParser, UniversalFileParser};
pub use json_source::JsonDirectorySource;
pub use record_cleaner::{parse_date, parse_number, parse_timestamp, IngestStats, RecordCleaner};
pub use source::{DataSource, InMemorySource, SourceKind};
