// ==========================================
// 坩埚监控调度系统 - 引擎层
// ==========================================
// 职责: 实现检测/对账/预测/调度规则引擎
// 红线: Engine 不做数据获取，输入非法数据一律排除而非报错
// ==========================================

pub mod audit;
pub mod dispatch;
pub mod drain_detector;
pub mod fill_rate;
pub mod forecast;
pub mod orchestrator;
pub mod reconciliation;

// 重导出核心引擎
pub use audit::{
    AuditFindings, DailyAuditRow, DirectionSummary, DiscrepancyAuditor, MismatchedTicketDetail,
};
pub use dispatch::{DispatchInput, DispatchPlan, DispatchScheduler};
pub use drain_detector::DrainEventDetector;
pub use fill_rate::FillRateEstimator;
pub use forecast::OverflowForecaster;
pub use orchestrator::{AnalysisPipeline, AnalysisResult, VesselRates};
pub use reconciliation::ReconciliationMatcher;
