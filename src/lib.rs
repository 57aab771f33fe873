// ==========================================
// 坩埚监控调度系统 - 核心库
// ==========================================
// 流程: 液位序列 → 注入速率 → 排液事件 → 工单对账 → 溢出预测 → 收集调度
// 运行模型: 单线程、同步、每次运行从头计算，无持久化
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 业务规则
pub mod engine;

// 数据获取层 - 外部数据
pub mod importer;

// 配置层 - 引擎参数
pub mod config;

// 日志系统
pub mod logging;

// API 层 - 报告入口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{DiscrepancyType, DispatchStopReason, MatchStatus, RouteLegType};

// 领域实体
pub use domain::{
    Agent, AgentInfo, DrainEvent, Edge, FillRateEstimate, LevelPoint, MatchRecord, Reading,
    ReconciliationOutcome, RouteLeg, Ticket, TransportGraph, VesselForecast, VesselInfo,
};

// 引擎
pub use engine::{
    AnalysisPipeline, DiscrepancyAuditor, DispatchScheduler, DrainEventDetector,
    FillRateEstimator, OverflowForecaster, ReconciliationMatcher,
};

// 配置
pub use config::{ConfigManager, EngineConfig};

// API
pub use api::{ApiError, AuditApi, AuditReport, ScheduleApi, ScheduleReport};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "坩埚监控调度系统";
