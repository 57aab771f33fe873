// ==========================================
// 坩埚监控调度系统 - 运输工单与对账记录
// ==========================================
// 职责: 外部上报的取液工单 (只读输入) + 对账结果
// 红线: 对账是部分单射，事件与工单各自最多使用一次
// ==========================================

use crate::domain::drain_event::DrainEvent;
use crate::domain::types::MatchStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// Ticket - 运输工单
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub ticket_id: String,
    pub vessel_id: String,
    pub courier_id: Option<String>, // 上报人（可缺失）
    pub date: NaiveDate,            // 上报日期 (UTC 日历日)
    pub amount_collected: f64,      // 上报取液量，缺失按 0
}

// ==========================================
// MatchRecord - 对账记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub event: DrainEvent,
    pub ticket: Ticket,
    pub volume_delta: f64, // |collected_amount - amount_collected|
    pub status: MatchStatus,
    pub matched_previous_day: bool, // 事件日期 = 工单日期 - 1 天
}

impl MatchRecord {
    /// 工单体积 - 检测体积（正数表示多报）
    pub fn signed_difference(&self) -> f64 {
        self.ticket.amount_collected - self.event.collected_amount
    }
}

// ==========================================
// ReconciliationOutcome - 对账结果集合
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconciliationOutcome {
    pub matches: Vec<MatchRecord>,    // 体积一致
    pub mismatches: Vec<MatchRecord>, // 体积不一致
    pub unlogged_events: Vec<DrainEvent>, // 无工单的排液
    pub ghost_tickets: Vec<Ticket>,   // 无排液佐证的工单
    pub recovered_previous_day: usize, // 通过前一天匹配找回的工单数
}

impl ReconciliationOutcome {
    /// 所有对账记录（matched + mismatched）
    pub fn records(&self) -> impl Iterator<Item = &MatchRecord> {
        self.matches.iter().chain(self.mismatches.iter())
    }
}
