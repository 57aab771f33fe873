// ==========================================
// 坩埚监控调度系统 - 记录清洗器
// ==========================================
// 职责: 原始 JSON 记录 → 强类型领域对象
// 红线: 单条记录格式错误（日期非法、数值非法、主键缺失）只跳过该条并计数，
//       不中断运行
// ==========================================

use crate::domain::agent::AgentInfo;
use crate::domain::network::Edge;
use crate::domain::reading::{Reading, VesselInfo};
use crate::domain::ticket::Ticket;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

// ==========================================
// IngestStats - 清洗统计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestStats {
    pub level_records: usize,
    pub readings: usize,
    pub skipped_level_records: usize, // 时间戳非法的整条记录
    pub skipped_levels: usize,        // 非数值液位
    pub tickets: usize,
    pub skipped_tickets: usize,
    pub vessels: usize,
    pub skipped_vessels: usize,
    pub edges: usize,
    pub skipped_edges: usize,
    pub agents: usize,
    pub skipped_agents: usize,
}

impl IngestStats {
    pub fn total_skipped(&self) -> usize {
        self.skipped_level_records
            + self.skipped_levels
            + self.skipped_tickets
            + self.skipped_vessels
            + self.skipped_edges
            + self.skipped_agents
    }
}

// ===== 原始记录结构（字段全部可缺失） =====

#[derive(Debug, Deserialize)]
struct RawLevelRecord {
    timestamp: Option<String>,
    #[serde(default)]
    cauldron_levels: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RawTicket {
    ticket_id: Option<Value>,
    cauldron_id: Option<String>,
    courier_id: Option<Value>,
    date: Option<String>,
    amount_collected: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawVessel {
    id: Option<String>,
    name: Option<String>,
    max_volume: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawEdge {
    from: Option<String>,
    to: Option<String>,
    travel_time_minutes: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawAgent {
    courier_id: Option<Value>,
    id: Option<Value>,
    max_carrying_capacity: Option<Value>,
    capacity: Option<Value>,
}

// ==========================================
// RecordCleaner - 记录清洗器
// ==========================================
pub struct RecordCleaner;

impl RecordCleaner {
    /// 液位记录 → 读数
    ///
    /// 时间戳非法 → 整条记录跳过；单个液位非数值 → 只跳过该液位
    pub fn clean_levels(&self, records: &[Value], stats: &mut IngestStats) -> Vec<Reading> {
        let mut readings = Vec::new();
        for value in records {
            stats.level_records += 1;
            let raw: Option<RawLevelRecord> = serde_json::from_value(value.clone()).ok();
            let Some((timestamp, levels)) = raw.and_then(|r| {
                let ts = r.timestamp.as_deref().and_then(parse_timestamp)?;
                Some((ts, r.cauldron_levels))
            }) else {
                debug!(record = %value, "液位记录时间戳非法，跳过");
                stats.skipped_level_records += 1;
                continue;
            };

            for (vessel_id, level) in levels {
                match parse_number(&level) {
                    Some(level) => readings.push(Reading {
                        vessel_id,
                        timestamp,
                        level,
                    }),
                    None => {
                        debug!(vessel_id = %vessel_id, level = %level, "液位非数值，跳过");
                        stats.skipped_levels += 1;
                    }
                }
            }
        }
        stats.readings += readings.len();
        readings
    }

    /// 工单记录 → 工单（保持输入顺序）
    ///
    /// 日期非法、坩埚或工单号缺失、体积非数值 → 跳过；体积缺失按 0
    pub fn clean_tickets(&self, records: &[Value], stats: &mut IngestStats) -> Vec<Ticket> {
        let mut tickets = Vec::new();
        for value in records {
            match serde_json::from_value::<RawTicket>(value.clone())
                .ok()
                .and_then(to_ticket)
            {
                Some(ticket) => tickets.push(ticket),
                None => {
                    debug!(record = %value, "工单记录格式错误，跳过");
                    stats.skipped_tickets += 1;
                }
            }
        }
        stats.tickets += tickets.len();
        tickets
    }

    /// 坩埚记录 → 元数据（容量非数值视为未知）
    pub fn clean_vessels(&self, records: &[Value], stats: &mut IngestStats) -> Vec<VesselInfo> {
        let mut vessels = Vec::new();
        for value in records {
            let raw = serde_json::from_value::<RawVessel>(value.clone()).ok();
            match raw.and_then(|r| {
                let vessel_id = non_empty(r.id)?;
                Some(VesselInfo {
                    vessel_id,
                    name: r.name,
                    max_volume: r.max_volume.as_ref().and_then(parse_number).filter(|v| *v > 0.0),
                })
            }) {
                Some(vessel) => vessels.push(vessel),
                None => {
                    debug!(record = %value, "坩埚记录缺少ID，跳过");
                    stats.skipped_vessels += 1;
                }
            }
        }
        stats.vessels += vessels.len();
        vessels
    }

    /// 网络记录 → 有向边
    ///
    /// 行驶时间缺失按 0；负数或非数值 → 跳过
    pub fn clean_edges(&self, records: &[Value], stats: &mut IngestStats) -> Vec<Edge> {
        let mut edges = Vec::new();
        for value in records {
            let raw = serde_json::from_value::<RawEdge>(value.clone()).ok();
            match raw.and_then(|r| {
                let travel_time_min = match r.travel_time_minutes {
                    None | Some(Value::Null) => 0.0,
                    Some(ref v) => parse_number(v).filter(|t| *t >= 0.0)?,
                };
                Some(Edge {
                    from: non_empty(r.from)?,
                    to: non_empty(r.to)?,
                    travel_time_min,
                })
            }) {
                Some(edge) => edges.push(edge),
                None => {
                    debug!(record = %value, "网络边格式错误，跳过");
                    stats.skipped_edges += 1;
                }
            }
        }
        stats.edges += edges.len();
        edges
    }

    /// 收集员记录 → 元数据（容量无法解析时为 None）
    pub fn clean_agents(&self, records: &[Value], stats: &mut IngestStats) -> Vec<AgentInfo> {
        let mut agents = Vec::new();
        for value in records {
            let raw = serde_json::from_value::<RawAgent>(value.clone()).ok();
            match raw.and_then(|r| {
                let agent_id = r.courier_id.as_ref().or(r.id.as_ref()).and_then(id_string)?;
                let capacity = r
                    .max_carrying_capacity
                    .as_ref()
                    .and_then(parse_number)
                    .filter(|c| *c > 0.0)
                    .or_else(|| r.capacity.as_ref().and_then(parse_number));
                Some(AgentInfo { agent_id, capacity })
            }) {
                Some(agent) => agents.push(agent),
                None => {
                    debug!(record = %value, "收集员记录缺少ID，跳过");
                    stats.skipped_agents += 1;
                }
            }
        }
        stats.agents += agents.len();
        agents
    }
}

fn to_ticket(raw: RawTicket) -> Option<Ticket> {
    let amount_collected = match raw.amount_collected {
        None | Some(Value::Null) => 0.0,
        Some(ref v) => parse_number(v)?,
    };
    Some(Ticket {
        ticket_id: raw.ticket_id.as_ref().and_then(id_string)?,
        vessel_id: non_empty(raw.cauldron_id)?,
        courier_id: raw.courier_id.as_ref().and_then(id_string),
        date: raw.date.as_deref().and_then(parse_date)?,
        amount_collected,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 字符串或数字形式的ID
fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_empty(Some(s.clone())),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// 数值解析: 接受数字或数字字符串，拒绝非有限值
pub fn parse_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

/// 时间戳解析，统一为 UTC
///
/// 支持: RFC 3339（带时区）/ 无时区日期时间（按 UTC）/ 纯日期（UTC 零点）
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// 工单日期 = 时间戳换算到 UTC 后的日历日
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    parse_timestamp(value).map(|dt| dt.date_naive())
}
