// ==========================================
// 坩埚监控调度系统 - API 报告结构
// ==========================================
// 职责: 对外 JSON 报告的结构定义与数值整理
// 红线: 非有限数值 (NaN / ±∞) 一律输出为 null
// 说明: 速率保留 5 位小数，体积/时间保留 2 位小数
// ==========================================

use crate::config::EngineConfig;
use crate::domain::agent::{Agent, RouteLeg};
use crate::domain::forecast::VesselForecast;
use crate::domain::types::{DispatchStopReason, RouteLegType};
use crate::engine::{DailyAuditRow, DirectionSummary, MismatchedTicketDetail};
use crate::importer::IngestStats;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const RATE_DECIMALS: i32 = 5;
pub const VOLUME_DECIMALS: i32 = 2;

/// 四舍五入到指定小数位，非有限值返回 None
pub fn round_to(value: f64, decimals: i32) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    let factor = 10f64.powi(decimals);
    let rounded = (value * factor).round() / factor;
    rounded.is_finite().then_some(rounded)
}

pub fn round_rate(value: f64) -> Option<f64> {
    round_to(value, RATE_DECIMALS)
}

pub fn round_volume(value: f64) -> Option<f64> {
    round_to(value, VOLUME_DECIMALS)
}

// ==========================================
// VesselStatus - 坩埚状态 / 预测摘要
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselStatus {
    pub vessel_id: String,
    pub current_level: Option<f64>,
    pub max_volume: Option<f64>,
    pub fill_rate_per_min: Option<f64>,
    pub drain_rate_per_min: Option<f64>,
    pub time_to_overflow_min: Option<f64>,
}

impl From<&VesselForecast> for VesselStatus {
    fn from(f: &VesselForecast) -> Self {
        Self {
            vessel_id: f.vessel_id.clone(),
            current_level: round_volume(f.current_level),
            max_volume: f.max_volume.and_then(round_volume),
            fill_rate_per_min: round_rate(f.fill_rate_per_min),
            drain_rate_per_min: round_rate(f.drain_rate_per_min),
            time_to_overflow_min: f.time_to_overflow_min.and_then(round_volume),
        }
    }
}

// ==========================================
// AuditReport - 对账审计报告
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub detected_events: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub unlogged_drains: usize,
    pub ghost_tickets: usize,
    pub recovered_previous_day: usize,
    pub average_fill_rate_per_min: Option<f64>,
    pub average_drain_rate_per_min: Option<f64>,
    pub potentially_missing_volume: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub summary: AuditSummary,
    pub vessel_status: Vec<VesselStatus>,
    pub daily_audit: Vec<DailyAuditRow>,
    pub mismatched_tickets: Vec<MismatchedTicketDetail>,
    pub direction_summary: Vec<DirectionSummary>,
    pub ingest: IngestStats,
    pub config: EngineConfig,
}

// ==========================================
// ScheduleReport - 收集调度报告
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLegView {
    pub leg_type: RouteLegType,
    pub node_id: String,
    pub amount: Option<f64>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub travel_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overflow_deadline: Option<DateTime<Utc>>,
}

impl From<&RouteLeg> for RouteLegView {
    fn from(leg: &RouteLeg) -> Self {
        Self {
            leg_type: leg.leg_type,
            node_id: leg.node_id.clone(),
            amount: round_volume(leg.amount),
            start: leg.start,
            end: leg.end,
            travel_min: round_volume(leg.travel_min),
            overflow_deadline: leg.overflow_deadline,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRoute {
    pub agent_id: u32,
    pub start_node: String,
    pub final_node: String,
    pub available_at: DateTime<Utc>,
    pub total_collected: Option<f64>,
    pub legs: Vec<RouteLegView>,
}

impl From<&Agent> for AgentRoute {
    fn from(agent: &Agent) -> Self {
        let total: f64 = agent
            .route
            .iter()
            .filter(|leg| leg.leg_type == RouteLegType::Collect)
            .map(|leg| leg.amount)
            .sum();
        Self {
            agent_id: agent.agent_id,
            start_node: agent.start_node.clone(),
            final_node: agent.current_node.clone(),
            available_at: agent.available_at,
            total_collected: round_volume(total),
            legs: agent.route.iter().map(RouteLegView::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleReport {
    pub simulation_start: DateTime<Utc>,
    pub num_agents: usize,
    pub agent_capacity: Option<f64>,
    pub agents: Vec<AgentRoute>,
    pub market_nodes: Vec<String>,
    pub stop_reason: DispatchStopReason,
    pub iterations: usize,
    pub unscheduled_vessels: Vec<String>,
    pub forecast_summary: Vec<VesselStatus>,
    pub ingest: IngestStats,
    pub config: EngineConfig,
}
