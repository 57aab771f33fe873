// ==========================================
// 坩埚监控调度系统 - API 层
// ==========================================
// 职责: 对外提供对账审计与收集调度两个入口，输出 JSON 报告
// ==========================================

pub mod audit_api;
pub mod dto;
pub mod error;
pub mod schedule_api;

// 重导出核心类型
pub use audit_api::AuditApi;
pub use dto::{
    round_rate, round_to, round_volume, AgentRoute, AuditReport, AuditSummary, RouteLegView,
    ScheduleReport, VesselStatus,
};
pub use error::{ApiError, ApiResult};
pub use schedule_api::ScheduleApi;
