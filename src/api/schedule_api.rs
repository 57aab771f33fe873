// ==========================================
// 收集调度API
// ==========================================
// 职责: 拉取数据 → 溢出预测 → 收集调度 → ScheduleReport
// 说明: 模拟开始时间默认取当前时间
// ==========================================

use crate::api::dto::{round_volume, AgentRoute, ScheduleReport, VesselStatus};
use crate::api::error::ApiResult;
use crate::config::ConfigManager;
use crate::domain::agent::resolve_agent_capacity;
use crate::domain::network::TransportGraph;
use crate::engine::{AnalysisPipeline, DispatchInput, DispatchScheduler};
use crate::importer::{DataSource, DatasetLoader};
use chrono::{DateTime, Utc};
use tracing::{info, instrument};

/// 收集调度API
pub struct ScheduleApi {
    config: ConfigManager,
}

impl ScheduleApi {
    pub fn new(config: ConfigManager) -> Self {
        Self { config }
    }

    /// 运行收集调度
    ///
    /// # 参数
    /// - source: 数据源
    /// - simulation_start: 模拟开始时间（None 时取当前时间）
    ///
    /// # 返回
    /// - Ok(ScheduleReport): 收集员路线、市场节点、预测摘要
    /// - Err(ApiError::Upstream): 任一数据源失败（无部分结果）
    #[instrument(skip_all, fields(data_source = %source.describe()))]
    pub fn run_schedule(
        &self,
        source: &dyn DataSource,
        simulation_start: Option<DateTime<Utc>>,
    ) -> ApiResult<ScheduleReport> {
        let engine_config = self.config.engine_config()?;
        let dataset = DatasetLoader.load_all(source)?;
        let simulation_start = simulation_start.unwrap_or_else(Utc::now);

        let graph = TransportGraph::from_edges(&dataset.edges);
        let market_nodes = graph.find_market_nodes(&dataset.vessel_ids());
        let agent_capacity =
            resolve_agent_capacity(&dataset.agents, engine_config.dispatch.fallback_capacity);
        info!(
            nodes = graph.node_count(),
            markets = ?market_nodes,
            agent_capacity,
            "运输网络就绪"
        );

        let analysis = AnalysisPipeline::new(&engine_config).run(
            dataset.readings,
            &dataset.tickets,
            &dataset.vessels,
        );

        let plan = DispatchScheduler::new(engine_config.dispatch.clone()).schedule(&DispatchInput {
            forecasts: &analysis.forecasts,
            graph: &graph,
            market_nodes: &market_nodes,
            agent_capacity,
            simulation_start,
        });

        Ok(ScheduleReport {
            simulation_start: plan.simulation_start,
            num_agents: plan.agents.len(),
            agent_capacity: round_volume(plan.agent_capacity),
            agents: plan.agents.iter().map(AgentRoute::from).collect(),
            market_nodes: plan.market_nodes,
            stop_reason: plan.stop_reason,
            iterations: plan.iterations,
            unscheduled_vessels: plan.unscheduled_vessels,
            forecast_summary: analysis.forecasts.iter().map(VesselStatus::from).collect(),
            ingest: dataset.stats,
            config: engine_config,
        })
    }
}
