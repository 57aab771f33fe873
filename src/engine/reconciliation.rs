// ==========================================
// 坩埚监控调度系统 - 工单对账引擎
// ==========================================
// 职责: 将检测到的排液事件与上报工单贪心配对
// 输入: 全部排液事件 + 全部工单（按输入顺序处理）
// 输出: matched / mismatched / 未登记排液 / 幽灵工单
// 红线: 事件与工单各自最多使用一次（部分单射）
// 红线: 最近体积贪心匹配，不做全局最优分配，结果依赖工单顺序
// ==========================================

use crate::config::MatchingConfig;
use crate::domain::drain_event::DrainEvent;
use crate::domain::ticket::{MatchRecord, ReconciliationOutcome, Ticket};
use crate::domain::types::MatchStatus;
use chrono::{Duration, NaiveDate};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

// ==========================================
// ReconciliationMatcher - 工单对账引擎
// ==========================================
pub struct ReconciliationMatcher {
    config: MatchingConfig,
}

impl ReconciliationMatcher {
    pub fn new(config: MatchingConfig) -> Self {
        Self { config }
    }

    /// 对账
    ///
    /// 规则（逐张工单，按输入顺序）:
    /// 1) 候选事件: 同坩埚，日期 = 工单日期（优先遍历）或工单日期 - 1 天
    /// 2) 在未使用的候选中选 |collected_amount - amount_collected| 最小者，相同取先遍历到的
    /// 3) 无候选或候选均已使用 → 幽灵工单
    /// 4) 相对差 ≤ rel_tolerance 或绝对差 ≤ abs_tolerance → matched，否则 mismatched
    /// 5) 选中事件日期为前一天 → recovered_previous_day + 1
    /// 6) 最终未被认领的事件 → 未登记排液
    #[instrument(skip(self, events, tickets), fields(events = events.len(), tickets = tickets.len()))]
    pub fn reconcile(&self, events: &[DrainEvent], tickets: &[Ticket]) -> ReconciliationOutcome {
        // 按 (坩埚, 日期) 分组，组内保持输入顺序
        let mut by_vessel_date: HashMap<(&str, NaiveDate), Vec<usize>> = HashMap::new();
        for (idx, event) in events.iter().enumerate() {
            by_vessel_date
                .entry((event.vessel_id.as_str(), event.event_date()))
                .or_default()
                .push(idx);
        }

        let mut used = vec![false; events.len()];
        let mut outcome = ReconciliationOutcome::default();

        for ticket in tickets {
            let previous_day = ticket.date - Duration::days(1);
            let candidates: Vec<usize> = [ticket.date, previous_day]
                .iter()
                .filter_map(|d| by_vessel_date.get(&(ticket.vessel_id.as_str(), *d)))
                .flatten()
                .copied()
                .collect();

            // 最近体积的未使用候选
            let mut best: Option<(usize, f64)> = None;
            for idx in candidates {
                if used[idx] {
                    continue;
                }
                let diff = (events[idx].collected_amount - ticket.amount_collected).abs();
                if best.map_or(true, |(_, best_diff)| diff < best_diff) {
                    best = Some((idx, diff));
                }
            }

            let Some((idx, diff)) = best else {
                debug!(ticket_id = %ticket.ticket_id, vessel_id = %ticket.vessel_id, "无可用候选事件，记为幽灵工单");
                outcome.ghost_tickets.push(ticket.clone());
                continue;
            };

            used[idx] = true;
            let event = &events[idx];
            let matched_previous_day = event.event_date() == previous_day;
            if matched_previous_day {
                outcome.recovered_previous_day += 1;
            }

            let status = self.classify(diff, ticket.amount_collected);
            let record = MatchRecord {
                event: event.clone(),
                ticket: ticket.clone(),
                volume_delta: diff,
                status,
                matched_previous_day,
            };
            match status {
                MatchStatus::Matched => outcome.matches.push(record),
                MatchStatus::Mismatched => outcome.mismatches.push(record),
            }
        }

        outcome.unlogged_events = events
            .iter()
            .zip(used.iter())
            .filter(|(_, used)| !**used)
            .map(|(event, _)| event.clone())
            .collect();

        info!(
            matches = outcome.matches.len(),
            mismatches = outcome.mismatches.len(),
            unlogged = outcome.unlogged_events.len(),
            ghosts = outcome.ghost_tickets.len(),
            recovered_previous_day = outcome.recovered_previous_day,
            "工单对账完成"
        );
        outcome
    }

    /// 体积差分类
    pub fn classify(&self, diff: f64, ticket_amount: f64) -> MatchStatus {
        let rel_diff = diff / ticket_amount.max(1.0);
        if rel_diff <= self.config.rel_tolerance || diff <= self.config.abs_tolerance {
            MatchStatus::Matched
        } else {
            MatchStatus::Mismatched
        }
    }
}
