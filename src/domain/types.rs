// ==========================================
// 坩埚监控调度系统 - 领域类型定义
// ==========================================
// 职责: 对账状态 / 路线动作 / 审计差异类型
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 对账状态 (Match Status)
// ==========================================
// 红线: 一个排液事件 / 一张工单最多出现在一条对账记录中
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Matched,    // 体积在容差内
    Mismatched, // 体积超出容差
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStatus::Matched => write!(f, "matched"),
            MatchStatus::Mismatched => write!(f, "mismatched"),
        }
    }
}

// ==========================================
// 路线动作类型 (Route Leg Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteLegType {
    Collect,      // 在坩埚处收集
    MarketUnload, // 在市场卸货
}

impl fmt::Display for RouteLegType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteLegType::Collect => write!(f, "collect"),
            RouteLegType::MarketUnload => write!(f, "market_unload"),
        }
    }
}

// ==========================================
// 审计差异类型 (Discrepancy Type)
// ==========================================
// 顺序: 与展示字符串的字典序一致 (Over < Under < Unlogged)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DiscrepancyType {
    #[serde(rename = "Over-reported")]
    OverReported, // 工单体积 > 检测体积
    #[serde(rename = "Under-reported")]
    UnderReported, // 工单体积 <= 检测体积
    #[serde(rename = "Unlogged Drain")]
    UnloggedDrain, // 检测到排液但无工单
}

impl DiscrepancyType {
    /// 根据差值 (工单 - 检测) 判定上报方向
    pub fn from_difference(difference: f64) -> Self {
        if difference > 0.0 {
            DiscrepancyType::OverReported
        } else {
            DiscrepancyType::UnderReported
        }
    }

    /// 是否计入"潜在缺失量"
    pub fn counts_as_missing(&self) -> bool {
        matches!(
            self,
            DiscrepancyType::UnloggedDrain | DiscrepancyType::UnderReported
        )
    }
}

impl fmt::Display for DiscrepancyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscrepancyType::OverReported => write!(f, "Over-reported"),
            DiscrepancyType::UnderReported => write!(f, "Under-reported"),
            DiscrepancyType::UnloggedDrain => write!(f, "Unlogged Drain"),
        }
    }
}

// ==========================================
// 调度停止原因 (Dispatch Stop Reason)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DispatchStopReason {
    QueueExhausted,   // 优先队列为空
    HorizonReached,   // 下一个溢出时间超出模拟窗口
    IterationCapHit,  // 达到迭代上限
}

impl fmt::Display for DispatchStopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchStopReason::QueueExhausted => write!(f, "QUEUE_EXHAUSTED"),
            DispatchStopReason::HorizonReached => write!(f, "HORIZON_REACHED"),
            DispatchStopReason::IterationCapHit => write!(f, "ITERATION_CAP_HIT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discrepancy_direction() {
        assert_eq!(
            DiscrepancyType::from_difference(12.0),
            DiscrepancyType::OverReported
        );
        assert_eq!(
            DiscrepancyType::from_difference(-3.0),
            DiscrepancyType::UnderReported
        );
        // 差值为 0 归为 Under-reported
        assert_eq!(
            DiscrepancyType::from_difference(0.0),
            DiscrepancyType::UnderReported
        );
    }

    #[test]
    fn test_discrepancy_serialization() {
        let json = serde_json::to_string(&DiscrepancyType::UnloggedDrain).unwrap();
        assert_eq!(json, "\"Unlogged Drain\"");
        assert_eq!(DiscrepancyType::OverReported.to_string(), "Over-reported");
        assert!(DiscrepancyType::OverReported < DiscrepancyType::UnloggedDrain);
    }

    #[test]
    fn test_leg_type_serialization() {
        let json = serde_json::to_string(&RouteLegType::MarketUnload).unwrap();
        assert_eq!(json, "\"market_unload\"");
    }
}
