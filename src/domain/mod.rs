// ==========================================
// 坩埚监控调度系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、约束接口
// 红线: 不含数据获取逻辑,不含引擎逻辑
// ==========================================

pub mod agent;
pub mod drain_event;
pub mod forecast;
pub mod network;
pub mod reading;
pub mod ticket;
pub mod time;
pub mod types;

// 重导出核心类型
pub use agent::{resolve_agent_capacity, Agent, AgentInfo, CarryingCapacity, RouteLeg};
pub use drain_event::DrainEvent;
pub use forecast::{FillRateEstimate, VesselForecast};
pub use network::{Edge, TransportGraph};
pub use reading::{group_by_vessel, LevelPoint, Reading, VesselInfo};
pub use ticket::{MatchRecord, ReconciliationOutcome, Ticket};
pub use types::{DiscrepancyType, DispatchStopReason, MatchStatus, RouteLegType};
