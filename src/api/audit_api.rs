// ==========================================
// 对账审计API
// ==========================================
// 职责: 拉取数据 → 分析流水线 → 差异审计 → AuditReport
// ==========================================

use crate::api::dto::{round_rate, round_volume, AuditReport, AuditSummary, VesselStatus};
use crate::api::error::ApiResult;
use crate::config::ConfigManager;
use crate::engine::{AnalysisPipeline, DiscrepancyAuditor};
use crate::importer::{DataSource, DatasetLoader};
use tracing::{info, instrument};

/// 对账审计API
pub struct AuditApi {
    config: ConfigManager,
}

impl AuditApi {
    pub fn new(config: ConfigManager) -> Self {
        Self { config }
    }

    /// 运行完整对账审计
    ///
    /// # 返回
    /// - Ok(AuditReport): 事件/对账计数、平均速率、坩埚状态、每日审计、不一致工单
    /// - Err(ApiError::Upstream): 任一数据源失败（无部分结果）
    /// - Err(ApiError::Config): 配置非法
    #[instrument(skip_all, fields(data_source = %source.describe()))]
    pub fn run_audit(&self, source: &dyn DataSource) -> ApiResult<AuditReport> {
        let engine_config = self.config.engine_config()?;
        let dataset = DatasetLoader.load_analysis_inputs(source)?;

        let pipeline = AnalysisPipeline::new(&engine_config);
        let analysis = pipeline.run(dataset.readings, &dataset.tickets, &dataset.vessels);
        let findings = DiscrepancyAuditor::new().audit(&analysis.reconciliation);

        let recon = &analysis.reconciliation;
        let summary = AuditSummary {
            detected_events: analysis.events.len(),
            matches: recon.matches.len(),
            mismatches: recon.mismatches.len(),
            unlogged_drains: recon.unlogged_events.len(),
            ghost_tickets: recon.ghost_tickets.len(),
            recovered_previous_day: recon.recovered_previous_day,
            average_fill_rate_per_min: round_rate(analysis.average_fill_rate_per_min),
            average_drain_rate_per_min: round_rate(analysis.average_drain_rate_per_min),
            potentially_missing_volume: round_volume(findings.potentially_missing),
        };
        info!(
            events = summary.detected_events,
            matches = summary.matches,
            mismatches = summary.mismatches,
            ghosts = summary.ghost_tickets,
            "对账审计完成"
        );

        Ok(AuditReport {
            summary,
            vessel_status: analysis.forecasts.iter().map(VesselStatus::from).collect(),
            daily_audit: findings.daily_audit,
            mismatched_tickets: findings.mismatched_tickets,
            direction_summary: findings.direction_summary,
            ingest: dataset.stats,
            config: engine_config,
        })
    }
}
