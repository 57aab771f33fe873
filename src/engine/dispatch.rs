// ==========================================
// 坩埚监控调度系统 - 收集调度引擎
// ==========================================
// 红线: 容量约束: 自上次卸货以来的收集量不超过携带容量
// 红线: 复用收集员必须在 (溢出时间 - 安全余量) 之前到达
// 红线: 首个可行收集员优先（按创建顺序），不是最近收集员
// ==========================================
// 职责: 贪心优先队列模拟，派遣收集员在溢出前收集，满载后去市场卸货
// 输入: 溢出预测 + 运输网络 + 市场节点 + 携带容量
// 输出: 每个收集员的有序路线
// ==========================================

mod queue;
mod scheduler;


pub use queue::{OverflowEntry, OverflowQueue};
pub use scheduler::{DispatchInput, DispatchPlan, DispatchScheduler};
