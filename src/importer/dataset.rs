// ==========================================
// 坩埚监控调度系统 - 数据集加载
// ==========================================
// 职责: 从 DataSource 拉取全部五类数据并清洗
// 红线: 任一数据源失败 → 整次加载失败（无部分结果）
// ==========================================

use crate::domain::agent::AgentInfo;
use crate::domain::network::Edge;
use crate::domain::reading::{Reading, VesselInfo};
use crate::domain::ticket::Ticket;
use crate::importer::error::ImportResult;
use crate::importer::record_cleaner::{IngestStats, RecordCleaner};
use crate::importer::source::DataSource;
use std::collections::HashSet;
use tracing::{info, instrument, warn};

// ==========================================
// Dataset - 一次运行的全部输入
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub readings: Vec<Reading>,
    pub tickets: Vec<Ticket>,
    pub vessels: Vec<VesselInfo>,
    pub edges: Vec<Edge>,
    pub agents: Vec<AgentInfo>,
    pub stats: IngestStats,
}

impl Dataset {
    /// 坩埚ID集合（元数据 + 读数中出现的）
    pub fn vessel_ids(&self) -> HashSet<String> {
        self.vessels
            .iter()
            .map(|v| v.vessel_id.clone())
            .chain(self.readings.iter().map(|r| r.vessel_id.clone()))
            .collect()
    }
}

// ==========================================
// DatasetLoader - 数据集加载器
// ==========================================
pub struct DatasetLoader;

impl DatasetLoader {
    /// 加载分析所需数据（液位 + 工单 + 坩埚）
    #[instrument(skip(self, source), fields(data_source = %source.describe()))]
    pub fn load_analysis_inputs(&self, source: &dyn DataSource) -> ImportResult<Dataset> {
        let levels = source.fetch_levels()?;
        let tickets = source.fetch_tickets()?;
        let vessels = source.fetch_vessels()?;

        let mut stats = IngestStats::default();
        let dataset = Dataset {
            readings: RecordCleaner.clean_levels(&levels, &mut stats),
            tickets: RecordCleaner.clean_tickets(&tickets, &mut stats),
            vessels: RecordCleaner.clean_vessels(&vessels, &mut stats),
            edges: Vec::new(),
            agents: Vec::new(),
            stats,
        };
        log_stats(&dataset.stats);
        Ok(dataset)
    }

    /// 加载全部五类数据（调度使用）
    #[instrument(skip(self, source), fields(data_source = %source.describe()))]
    pub fn load_all(&self, source: &dyn DataSource) -> ImportResult<Dataset> {
        let levels = source.fetch_levels()?;
        let tickets = source.fetch_tickets()?;
        let vessels = source.fetch_vessels()?;
        let network = source.fetch_network()?;
        let agents = source.fetch_agents()?;

        let mut stats = IngestStats::default();
        let dataset = Dataset {
            readings: RecordCleaner.clean_levels(&levels, &mut stats),
            tickets: RecordCleaner.clean_tickets(&tickets, &mut stats),
            vessels: RecordCleaner.clean_vessels(&vessels, &mut stats),
            edges: RecordCleaner.clean_edges(&network, &mut stats),
            agents: RecordCleaner.clean_agents(&agents, &mut stats),
            stats,
        };
        log_stats(&dataset.stats);
        Ok(dataset)
    }
}

fn log_stats(stats: &IngestStats) {
    info!(
        readings = stats.readings,
        tickets = stats.tickets,
        vessels = stats.vessels,
        edges = stats.edges,
        agents = stats.agents,
        "数据加载完成"
    );
    if stats.total_skipped() > 0 {
        warn!(skipped = stats.total_skipped(), "部分记录格式错误，已跳过");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::error::ImportError;
    use crate::importer::source::{InMemorySource, SourceKind};
    use serde_json::json;

    fn source() -> InMemorySource {
        InMemorySource::new()
            .with_levels(vec![json!({
                "timestamp": "2025-10-30T00:00:00Z",
                "cauldron_levels": {"c1": 10.0, "c9": 5.0}
            })])
            .with_tickets(vec![json!({
                "ticket_id": "TT_1", "cauldron_id": "c1", "date": "2025-10-30", "amount_collected": 5
            })])
            .with_vessels(vec![json!({"id": "c1", "max_volume": 100})])
            .with_network(vec![json!({"from": "c1", "to": "market", "travel_time_minutes": 4})])
    }

    #[test]
    fn test_load_all() {
        let dataset = DatasetLoader.load_all(&source()).unwrap();
        assert_eq!(dataset.readings.len(), 2);
        assert_eq!(dataset.tickets.len(), 1);
        assert_eq!(dataset.edges.len(), 1);
        assert!(dataset.agents.is_empty());

        let ids = dataset.vessel_ids();
        assert!(ids.contains("c1"));
        assert!(ids.contains("c9"));
        assert!(!ids.contains("market"));
    }

    #[test]
    fn test_analysis_inputs_ignore_network_failure() {
        let failing = source().with_failure(SourceKind::Network, "down");
        assert!(DatasetLoader.load_analysis_inputs(&failing).is_ok());

        let err = DatasetLoader.load_all(&failing).unwrap_err();
        assert!(matches!(err, ImportError::UpstreamError { .. }));
    }
}
