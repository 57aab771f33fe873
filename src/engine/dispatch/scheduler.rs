use super::queue::OverflowQueue;
use crate::config::DispatchConfig;
use crate::domain::agent::{Agent, CarryingCapacity, RouteLeg};
use crate::domain::forecast::VesselForecast;
use crate::domain::network::TransportGraph;
use crate::domain::time::minutes_to_duration;
use crate::domain::types::{DispatchStopReason, RouteLegType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, instrument, warn};

// ==========================================
// DispatchInput - 调度输入
// ==========================================
pub struct DispatchInput<'a> {
    pub forecasts: &'a [VesselForecast],
    pub graph: &'a TransportGraph,
    pub market_nodes: &'a [String],
    pub agent_capacity: f64,
    pub simulation_start: DateTime<Utc>,
}

// ==========================================
// DispatchPlan - 调度结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchPlan {
    pub simulation_start: DateTime<Utc>,
    pub agents: Vec<Agent>,                // 按创建顺序
    pub market_nodes: Vec<String>,
    pub agent_capacity: f64,
    pub iterations: usize,
    pub stop_reason: DispatchStopReason,
    pub unscheduled_vessels: Vec<String>,  // 可调度但从未被服务的坩埚
}

impl DispatchPlan {
    /// 全部收集量
    pub fn total_collected(&self) -> f64 {
        self.agents
            .iter()
            .flat_map(|a| a.route.iter())
            .filter(|leg| leg.leg_type == RouteLegType::Collect)
            .map(|leg| leg.amount)
            .sum()
    }
}

// 调度内部使用的坩埚快照（只取可调度预测）
struct VesselTarget<'a> {
    vessel_id: &'a str,
    current_level: f64,
    max_volume: f64,
    fill_rate: f64,
    drain_rate: f64,
}

impl<'a> VesselTarget<'a> {
    fn from_forecast(forecast: &'a VesselForecast) -> Option<Self> {
        if !forecast.is_schedulable() {
            return None;
        }
        Some(Self {
            vessel_id: forecast.vessel_id.as_str(),
            current_level: forecast.current_level,
            max_volume: forecast.max_volume?,
            fill_rate: forecast.fill_rate_per_min,
            drain_rate: forecast.effective_drain_rate(),
        })
    }

    fn initial_overflow_min(&self) -> f64 {
        ((self.max_volume - self.current_level) / self.fill_rate).max(0.0)
    }
}

// ==========================================
// DispatchScheduler - 收集调度引擎
// ==========================================
pub struct DispatchScheduler {
    config: DispatchConfig,
}

impl DispatchScheduler {
    pub fn new(config: DispatchConfig) -> Self {
        Self { config }
    }

    /// 执行一次完整调度模拟
    ///
    /// 主循环:
    /// 1) 弹出最早溢出的坩埚，超出 horizon 即停止
    /// 2) 按创建顺序寻找首个可行收集员（到达时间 ≤ 溢出时间 - 安全余量）
    /// 3) 无可行收集员 → 在坩埚处新建收集员（模拟开始时间）
    /// 4) 收集至安全液位（受剩余容量限制），满载则去最近市场卸货
    /// 5) 以旧溢出时间 + 重新注满时间重新入队
    #[instrument(skip(self, input), fields(
        forecasts = input.forecasts.len(),
        markets = input.market_nodes.len(),
        capacity = input.agent_capacity
    ))]
    pub fn schedule(&self, input: &DispatchInput<'_>) -> DispatchPlan {
        let targets: BTreeMap<&str, VesselTarget<'_>> = input
            .forecasts
            .iter()
            .filter_map(VesselTarget::from_forecast)
            .map(|t| (t.vessel_id, t))
            .collect();

        let mut queue = OverflowQueue::new();
        for target in targets.values() {
            queue.push(target.initial_overflow_min(), target.vessel_id);
        }
        info!(
            schedulable = targets.len(),
            excluded = input.forecasts.len() - targets.len(),
            "开始收集调度模拟"
        );

        let mut agents: Vec<Agent> = Vec::new();
        let mut serviced: BTreeSet<&str> = BTreeSet::new();
        let mut iterations = 0usize;

        let stop_reason = loop {
            let Some(entry) = queue.pop() else {
                break DispatchStopReason::QueueExhausted;
            };
            if entry.overflow_min > self.config.horizon_min {
                debug!(
                    vessel_id = %entry.vessel_id,
                    overflow_min = entry.overflow_min,
                    "溢出时间超出模拟窗口，停止调度"
                );
                break DispatchStopReason::HorizonReached;
            }
            if iterations >= self.config.max_iterations {
                warn!(iterations, "达到迭代上限，提前结束调度");
                break DispatchStopReason::IterationCapHit;
            }
            iterations += 1;

            let Some(target) = targets.get(entry.vessel_id.as_str()) else {
                continue;
            };
            let deadline = input.simulation_start + minutes_to_duration(entry.overflow_min);

            let collected = match self.first_feasible_agent(
                &agents,
                target.vessel_id,
                deadline,
                input.graph,
            ) {
                Some((idx, travel_min)) => {
                    debug!(
                        agent_id = agents[idx].agent_id,
                        vessel_id = target.vessel_id,
                        travel_min,
                        "复用收集员"
                    );
                    self.service_vessel(&mut agents[idx], target, travel_min, deadline, input)
                }
                None => {
                    let agent_id = agents.len() as u32 + 1;
                    let mut agent = Agent::spawn(
                        agent_id,
                        target.vessel_id,
                        input.simulation_start,
                        input.agent_capacity,
                    );
                    debug!(agent_id, vessel_id = target.vessel_id, "无可行收集员，新建收集员");
                    let collected = self.service_vessel(&mut agent, target, 0.0, deadline, input);
                    agents.push(agent);
                    collected
                }
            };
            serviced.insert(target.vessel_id);

            // 偏移可为零或负（服务后仍高于上限），由迭代上限兜底
            // 未收集时零偏移不入队
            let level_after = (target.current_level - collected).max(0.0);
            let refill_min = (target.max_volume - level_after) / target.fill_rate;
            if !refill_min.is_finite() || (collected <= 0.0 && refill_min == 0.0) {
                continue;
            }
            queue.push(entry.overflow_min + refill_min, target.vessel_id);
        };

        let unscheduled_vessels: Vec<String> = targets
            .keys()
            .filter(|id| !serviced.contains(*id))
            .map(|id| id.to_string())
            .collect();

        info!(
            agents = agents.len(),
            iterations,
            stop_reason = %stop_reason,
            unscheduled = unscheduled_vessels.len(),
            "收集调度完成"
        );

        DispatchPlan {
            simulation_start: input.simulation_start,
            agents,
            market_nodes: input.market_nodes.to_vec(),
            agent_capacity: input.agent_capacity,
            iterations,
            stop_reason,
            unscheduled_vessels,
        }
    }

    /// 首个可行收集员（按创建顺序）
    ///
    /// # 返回
    /// - Some((索引, 行驶分钟)): 到达时间 ≤ deadline - safety_margin
    /// - None: 无可行收集员（不可达视为无穷远）
    pub(crate) fn first_feasible_agent(
        &self,
        agents: &[Agent],
        vessel_id: &str,
        deadline: DateTime<Utc>,
        graph: &TransportGraph,
    ) -> Option<(usize, f64)> {
        let latest_arrival = deadline - minutes_to_duration(self.config.safety_margin_min);
        agents.iter().enumerate().find_map(|(idx, agent)| {
            let travel_min = graph.shortest_travel_time(&agent.current_node, vessel_id);
            if !travel_min.is_finite() {
                return None;
            }
            let arrival = agent.available_at + minutes_to_duration(travel_min);
            (arrival <= latest_arrival).then_some((idx, travel_min))
        })
    }

    /// 服务单个坩埚，返回本次收集量（0 表示只移动位置）
    fn service_vessel(
        &self,
        agent: &mut Agent,
        target: &VesselTarget<'_>,
        travel_min: f64,
        deadline: DateTime<Utc>,
        input: &DispatchInput<'_>,
    ) -> f64 {
        let arrival = agent.available_at + minutes_to_duration(travel_min);
        let collect_start = arrival + minutes_to_duration(self.config.service_setup_min);
        agent.current_node = target.vessel_id.to_string();

        let safe_target = self.config.safe_level_ratio * target.max_volume;
        let collectible = (target.current_level - safe_target).max(0.0);
        let amount = collectible.min(agent.remaining_capacity);

        if amount <= 0.0 {
            // 只移动位置，不收集
            agent.available_at = collect_start;
            debug!(agent_id = agent.agent_id, vessel_id = target.vessel_id, "无可收集量，跳过收集");
            return 0.0;
        }

        let collect_end = collect_start + minutes_to_duration(amount / target.drain_rate);
        let taken = agent.take_on(amount);
        agent.route.push(RouteLeg {
            leg_type: RouteLegType::Collect,
            node_id: target.vessel_id.to_string(),
            amount: taken,
            start: collect_start,
            end: collect_end,
            travel_min,
            overflow_deadline: Some(deadline),
        });
        agent.available_at = collect_end;

        if agent.is_exhausted(self.config.capacity_epsilon) {
            self.unload_at_nearest_market(agent, input);
        }

        taken
    }

    /// 满载后去最近的可达市场卸货
    fn unload_at_nearest_market(&self, agent: &mut Agent, input: &DispatchInput<'_>) {
        let Some((market, travel_min)) = input
            .graph
            .nearest_market(&agent.current_node, input.market_nodes)
        else {
            warn!(
                agent_id = agent.agent_id,
                node = %agent.current_node,
                "无可达市场，收集员保持满载"
            );
            return;
        };

        let unload_start = agent.available_at + minutes_to_duration(travel_min);
        let unload_end = unload_start + minutes_to_duration(self.config.unload_time_min);
        let unloaded = agent.unload();
        agent.route.push(RouteLeg {
            leg_type: RouteLegType::MarketUnload,
            node_id: market.clone(),
            amount: unloaded,
            start: unload_start,
            end: unload_end,
            travel_min,
            overflow_deadline: None,
        });
        agent.current_node = market;
        agent.available_at = unload_end;
    }
}
