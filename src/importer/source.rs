// ==========================================
// 坩埚监控调度系统 - 数据源接口
// ==========================================
// 职责: 定义五类外部数据的获取接口（不包含清洗）
// 红线: 任一数据源失败 → 返回 Err，调用方放弃整次运行
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

// ==========================================
// SourceKind - 数据源类别
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Levels,  // 液位序列
    Tickets, // 运输工单
    Vessels, // 坩埚元数据
    Network, // 运输网络
    Agents,  // 收集员元数据
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Levels => "levels",
            SourceKind::Tickets => "tickets",
            SourceKind::Vessels => "vessels",
            SourceKind::Network => "network",
            SourceKind::Agents => "agents",
        }
    }

    /// 包装对象中存放列表的字段名
    pub(crate) fn envelope_key(&self) -> Option<&'static str> {
        match self {
            SourceKind::Tickets => Some("transport_tickets"),
            SourceKind::Network => Some("edges"),
            _ => None,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// DataSource Trait
// ==========================================
// 用途: 分析流水线的外部数据入口
// 实现者: JsonDirectorySource, InMemorySource
pub trait DataSource {
    /// 液位记录: {timestamp, cauldron_levels: {vessel_id: level}}
    fn fetch_levels(&self) -> ImportResult<Vec<Value>>;

    /// 工单记录: {ticket_id, cauldron_id, courier_id, date, amount_collected}
    fn fetch_tickets(&self) -> ImportResult<Vec<Value>>;

    /// 坩埚记录: {id, name, max_volume}
    fn fetch_vessels(&self) -> ImportResult<Vec<Value>>;

    /// 有向边: {from, to, travel_time_minutes}
    fn fetch_network(&self) -> ImportResult<Vec<Value>>;

    /// 收集员记录: {courier_id | id, max_carrying_capacity | capacity}
    fn fetch_agents(&self) -> ImportResult<Vec<Value>>;

    /// 数据源描述（用于日志）
    fn describe(&self) -> String;
}

/// 从原始 JSON 中取出记录列表
///
/// 接受顶层数组，或带包装字段的对象（如 {"transport_tickets": [...]}）
pub(crate) fn extract_records(kind: SourceKind, value: Value) -> ImportResult<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => {
            let key = kind.envelope_key().ok_or_else(|| ImportError::UnexpectedShape {
                source_name: kind.to_string(),
                message: "期望 JSON 数组".to_string(),
            })?;
            match map.remove(key) {
                Some(Value::Array(items)) => Ok(items),
                _ => Err(ImportError::UnexpectedShape {
                    source_name: kind.to_string(),
                    message: format!("缺少数组字段 {}", key),
                }),
            }
        }
        _ => Err(ImportError::UnexpectedShape {
            source_name: kind.to_string(),
            message: "期望 JSON 数组或对象".to_string(),
        }),
    }
}

// ==========================================
// InMemorySource - 内存数据源
// ==========================================
// 用途: 测试与嵌入调用，数据由调用方直接提供
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    levels: Vec<Value>,
    tickets: Vec<Value>,
    vessels: Vec<Value>,
    network: Vec<Value>,
    agents: Vec<Value>,
    failures: HashMap<SourceKind, String>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_levels(mut self, levels: Vec<Value>) -> Self {
        self.levels = levels;
        self
    }

    pub fn with_tickets(mut self, tickets: Vec<Value>) -> Self {
        self.tickets = tickets;
        self
    }

    pub fn with_vessels(mut self, vessels: Vec<Value>) -> Self {
        self.vessels = vessels;
        self
    }

    pub fn with_network(mut self, network: Vec<Value>) -> Self {
        self.network = network;
        self
    }

    pub fn with_agents(mut self, agents: Vec<Value>) -> Self {
        self.agents = agents;
        self
    }

    /// 让指定数据源的获取失败（模拟上游故障）
    pub fn with_failure(mut self, kind: SourceKind, message: &str) -> Self {
        self.failures.insert(kind, message.to_string());
        self
    }

    fn fetch(&self, kind: SourceKind, records: &[Value]) -> ImportResult<Vec<Value>> {
        match self.failures.get(&kind) {
            Some(message) => Err(ImportError::UpstreamError {
                source_name: kind.to_string(),
                message: message.clone(),
            }),
            None => Ok(records.to_vec()),
        }
    }
}

impl DataSource for InMemorySource {
    fn fetch_levels(&self) -> ImportResult<Vec<Value>> {
        self.fetch(SourceKind::Levels, &self.levels)
    }

    fn fetch_tickets(&self) -> ImportResult<Vec<Value>> {
        self.fetch(SourceKind::Tickets, &self.tickets)
    }

    fn fetch_vessels(&self) -> ImportResult<Vec<Value>> {
        self.fetch(SourceKind::Vessels, &self.vessels)
    }

    fn fetch_network(&self) -> ImportResult<Vec<Value>> {
        self.fetch(SourceKind::Network, &self.network)
    }

    fn fetch_agents(&self) -> ImportResult<Vec<Value>> {
        self.fetch(SourceKind::Agents, &self.agents)
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_records_accepts_array_and_envelope() {
        let items = extract_records(SourceKind::Tickets, json!([{"ticket_id": "t1"}])).unwrap();
        assert_eq!(items.len(), 1);

        let wrapped = json!({"metadata": {}, "transport_tickets": [{"ticket_id": "t1"}, {"ticket_id": "t2"}]});
        assert_eq!(extract_records(SourceKind::Tickets, wrapped).unwrap().len(), 2);

        let edges = json!({"edges": [{"from": "a", "to": "b", "travel_time_minutes": 3}]});
        assert_eq!(extract_records(SourceKind::Network, edges).unwrap().len(), 1);
    }

    #[test]
    fn test_extract_records_rejects_wrong_shape() {
        assert!(matches!(
            extract_records(SourceKind::Levels, json!({"x": 1})),
            Err(ImportError::UnexpectedShape { .. })
        ));
        assert!(extract_records(SourceKind::Network, json!({"nodes": []})).is_err());
        assert!(extract_records(SourceKind::Vessels, json!("oops")).is_err());
    }

    #[test]
    fn test_in_memory_failure() {
        let source = InMemorySource::new()
            .with_vessels(vec![json!({"id": "c1"})])
            .with_failure(SourceKind::Network, "connection reset");

        assert_eq!(source.fetch_vessels().unwrap().len(), 1);
        let err = source.fetch_network().unwrap_err();
        assert!(err.to_string().contains("connection reset"));
    }
}
