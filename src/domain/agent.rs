// ==========================================
// 坩埚监控调度系统 - 收集员领域模型
// ==========================================
// 职责: 收集员元数据 + 调度期内的收集员状态与路线
// 红线: remaining_capacity 永不为负
// ==========================================

use crate::domain::types::RouteLegType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// AgentInfo - 收集员元数据（外部输入）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentInfo {
    pub agent_id: String,
    pub capacity: Option<f64>, // 声明的最大携带量（无法解析时为 None）
}

/// 调度使用的携带容量: 所有声明容量中的最大值
///
/// 没有任何有效声明（正数）时使用 fallback
pub fn resolve_agent_capacity(agents: &[AgentInfo], fallback: f64) -> f64 {
    agents
        .iter()
        .filter_map(|a| a.capacity)
        .filter(|c| c.is_finite() && *c > 0.0)
        .fold(None, |acc: Option<f64>, c| Some(acc.map_or(c, |m| m.max(c))))
        .unwrap_or(fallback)
}

// ==========================================
// RouteLeg - 路线动作
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub leg_type: RouteLegType,
    pub node_id: String,          // collect: 坩埚ID / market_unload: 市场节点
    pub amount: f64,              // collect: 收集量 / market_unload: 卸货量
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub travel_min: f64,          // 到达该节点前的行驶时间
    pub overflow_deadline: Option<DateTime<Utc>>, // collect: 本次服务针对的溢出时间
}

// ==========================================
// Agent - 调度中的收集员
// ==========================================
// 生命周期: 仅存在于一次调度运行内，按需创建，原地追加路线
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub agent_id: u32,               // 运行内从 1 递增
    pub start_node: String,          // 创建位置
    pub current_node: String,
    pub available_at: DateTime<Utc>, // 下次空闲时间
    pub capacity: f64,               // 满载容量
    pub remaining_capacity: f64,
    pub route: Vec<RouteLeg>,
}

impl Agent {
    /// 在指定节点创建空载收集员
    pub fn spawn(agent_id: u32, node: &str, at: DateTime<Utc>, capacity: f64) -> Self {
        Self {
            agent_id,
            start_node: node.to_string(),
            current_node: node.to_string(),
            available_at: at,
            capacity,
            remaining_capacity: capacity,
            route: Vec::new(),
        }
    }
}

// ==========================================
// Trait: CarryingCapacity
// ==========================================
// 用途: Dispatch Scheduler 的容量约束检查接口
pub trait CarryingCapacity {
    /// 当前载量（自上次卸货以来的收集量）
    fn load(&self) -> f64;

    /// 是否已满（剩余容量 <= epsilon）
    fn is_exhausted(&self, epsilon: f64) -> bool;

    /// 装载，返回实际装入量（不超过剩余容量）
    fn take_on(&mut self, amount: f64) -> f64;

    /// 卸货，返回卸下量并恢复满载容量
    fn unload(&mut self) -> f64;
}

impl CarryingCapacity for Agent {
    fn load(&self) -> f64 {
        (self.capacity - self.remaining_capacity).max(0.0)
    }

    fn is_exhausted(&self, epsilon: f64) -> bool {
        self.remaining_capacity <= epsilon
    }

    fn take_on(&mut self, amount: f64) -> f64 {
        let taken = amount.max(0.0).min(self.remaining_capacity);
        self.remaining_capacity = (self.remaining_capacity - taken).max(0.0);
        taken
    }

    fn unload(&mut self) -> f64 {
        let unloaded = self.load();
        self.remaining_capacity = self.capacity;
        unloaded
    }
}
