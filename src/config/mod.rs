// ==========================================
// 坩埚监控调度系统 - 配置层
// ==========================================
// 职责: 引擎参数定义 + 多级覆写
// 红线: 初始化后只读，以值的形式传入各引擎
// ==========================================

pub mod config_manager;
pub mod engine_config;
pub mod error;

// 重导出核心配置类型
pub use config_manager::{config_keys, ConfigManager, ENV_PREFIX};
pub use engine_config::{DetectionConfig, DispatchConfig, EngineConfig, MatchingConfig};
pub use error::{ConfigError, ConfigResult};
