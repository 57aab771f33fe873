// ==========================================
// 坩埚监控调度系统 - 差异审计引擎
// ==========================================
// 职责: 由对账结果生成每日审计行、不一致工单明细、方向汇总
// 输入: ReconciliationOutcome
// 输出: AuditFindings
// 红线: 潜在缺失量 = 未登记排液 + 少报 (多报不计入)
// ==========================================

use crate::domain::ticket::ReconciliationOutcome;
use crate::domain::types::DiscrepancyType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, instrument};

// ==========================================
// DailyAuditRow - 每日审计行
// ==========================================
// 按 (日期, 坩埚, 类型) 聚合
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAuditRow {
    pub date: NaiveDate, // 排液事件开始日期
    pub vessel_id: String,
    #[serde(rename = "type")]
    pub discrepancy: DiscrepancyType,
    pub volume: f64, // 未登记: 检测体积；多报/少报: |差值|
}

// ==========================================
// MismatchedTicketDetail - 不一致工单明细
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MismatchedTicketDetail {
    pub ticket_id: String,
    pub vessel_id: String,
    pub courier_id: Option<String>,
    pub ticket_date: NaiveDate,
    pub ticket_volume: f64,
    pub detected_volume: f64,
    pub difference: f64,     // 工单 - 检测
    pub abs_difference: f64,
    pub direction: DiscrepancyType,
    pub matched_previous_day: bool,
}

// ==========================================
// DirectionSummary - 按方向汇总差值
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionSummary {
    pub direction: DiscrepancyType,
    pub count: usize,
    pub mean_difference: f64,
    pub total_difference: f64,
}

// ==========================================
// AuditFindings - 审计结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditFindings {
    pub daily_audit: Vec<DailyAuditRow>,
    pub mismatched_tickets: Vec<MismatchedTicketDetail>,
    pub direction_summary: Vec<DirectionSummary>,
    pub potentially_missing: f64,
}

// ==========================================
// DiscrepancyAuditor - 差异审计引擎
// ==========================================
pub struct DiscrepancyAuditor {
    // 无状态引擎
}

impl DiscrepancyAuditor {
    pub fn new() -> Self {
        Self {}
    }

    #[instrument(skip(self, outcome), fields(
        mismatches = outcome.mismatches.len(),
        unlogged = outcome.unlogged_events.len()
    ))]
    pub fn audit(&self, outcome: &ReconciliationOutcome) -> AuditFindings {
        let daily_audit = self.daily_audit(outcome);
        let mismatched_tickets = self.mismatched_tickets(outcome);
        let direction_summary = self.direction_summary(&mismatched_tickets);
        let potentially_missing = self.potentially_missing(&daily_audit);

        info!(
            audit_rows = daily_audit.len(),
            potentially_missing,
            "差异审计完成"
        );

        AuditFindings {
            daily_audit,
            mismatched_tickets,
            direction_summary,
            potentially_missing,
        }
    }

    /// 每日审计行（按日期、坩埚、类型排序）
    pub fn daily_audit(&self, outcome: &ReconciliationOutcome) -> Vec<DailyAuditRow> {
        let mut grouped: BTreeMap<(NaiveDate, String, DiscrepancyType), f64> = BTreeMap::new();

        for event in &outcome.unlogged_events {
            *grouped
                .entry((event.event_date(), event.vessel_id.clone(), DiscrepancyType::UnloggedDrain))
                .or_insert(0.0) += event.collected_amount;
        }
        for record in &outcome.mismatches {
            let diff = record.signed_difference();
            *grouped
                .entry((
                    record.event.event_date(),
                    record.ticket.vessel_id.clone(),
                    DiscrepancyType::from_difference(diff),
                ))
                .or_insert(0.0) += diff.abs();
        }

        grouped
            .into_iter()
            .map(|((date, vessel_id, discrepancy), volume)| DailyAuditRow {
                date,
                vessel_id,
                discrepancy,
                volume,
            })
            .collect()
    }

    /// 不一致工单明细（保持对账顺序）
    pub fn mismatched_tickets(&self, outcome: &ReconciliationOutcome) -> Vec<MismatchedTicketDetail> {
        outcome
            .mismatches
            .iter()
            .map(|record| {
                let difference = record.signed_difference();
                MismatchedTicketDetail {
                    ticket_id: record.ticket.ticket_id.clone(),
                    vessel_id: record.ticket.vessel_id.clone(),
                    courier_id: record.ticket.courier_id.clone(),
                    ticket_date: record.ticket.date,
                    ticket_volume: record.ticket.amount_collected,
                    detected_volume: record.event.collected_amount,
                    difference,
                    abs_difference: record.volume_delta,
                    direction: DiscrepancyType::from_difference(difference),
                    matched_previous_day: record.matched_previous_day,
                }
            })
            .collect()
    }

    /// 按方向汇总（只输出出现过的方向）
    pub fn direction_summary(&self, details: &[MismatchedTicketDetail]) -> Vec<DirectionSummary> {
        let mut grouped: BTreeMap<DiscrepancyType, (usize, f64)> = BTreeMap::new();
        for detail in details {
            let entry = grouped.entry(detail.direction).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += detail.difference;
        }
        grouped
            .into_iter()
            .map(|(direction, (count, total))| DirectionSummary {
                direction,
                count,
                mean_difference: total / count as f64,
                total_difference: total,
            })
            .collect()
    }

    pub fn potentially_missing(&self, rows: &[DailyAuditRow]) -> f64 {
        rows.iter()
            .filter(|row| row.discrepancy.counts_as_missing())
            .map(|row| row.volume)
            .sum()
    }
}

impl Default for DiscrepancyAuditor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::drain_event::DrainEvent;
    use crate::domain::ticket::{MatchRecord, Ticket};
    use crate::domain::types::MatchStatus;
    use chrono::{Duration, TimeZone, Utc};

    fn event(id: &str, vessel: &str, day: u32, collected: f64) -> DrainEvent {
        let start = Utc.with_ymd_and_hms(2025, 10, day, 9, 0, 0).unwrap();
        DrainEvent {
            event_id: id.to_string(),
            vessel_id: vessel.to_string(),
            time_start: start,
            time_end: start + Duration::minutes(10),
            start_level: 200.0,
            end_level: 200.0 - collected,
            raw_drop: collected,
            duration_min: 10.0,
            fill_during: 0.0,
            collected_amount: collected,
        }
    }

    fn mismatch(ticket_id: &str, vessel: &str, day: u32, ticket_amount: f64, detected: f64) -> MatchRecord {
        MatchRecord {
            event: event(&format!("e_{}", ticket_id), vessel, day, detected),
            ticket: Ticket {
                ticket_id: ticket_id.to_string(),
                vessel_id: vessel.to_string(),
                courier_id: None,
                date: NaiveDate::from_ymd_opt(2025, 10, day).unwrap(),
                amount_collected: ticket_amount,
            },
            volume_delta: (ticket_amount - detected).abs(),
            status: MatchStatus::Mismatched,
            matched_previous_day: false,
        }
    }

    fn outcome() -> ReconciliationOutcome {
        ReconciliationOutcome {
            mismatches: vec![
                mismatch("t1", "c1", 30, 120.0, 80.0), // 多报 40
                mismatch("t2", "c1", 30, 50.0, 90.0),  // 少报 40
                mismatch("t3", "c1", 30, 20.0, 50.0),  // 少报 30
            ],
            unlogged_events: vec![
                event("u1", "c2", 29, 25.0),
                event("u2", "c2", 29, 15.0),
            ],
            ..ReconciliationOutcome::default()
        }
    }

    #[test]
    fn test_daily_audit_groups_and_sorts() {
        let rows = DiscrepancyAuditor::new().daily_audit(&outcome());
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2025, 10, 29).unwrap());
        assert_eq!(rows[0].vessel_id, "c2");
        assert_eq!(rows[0].discrepancy, DiscrepancyType::UnloggedDrain);
        assert_eq!(rows[0].volume, 40.0);

        assert_eq!(rows[1].discrepancy, DiscrepancyType::OverReported);
        assert_eq!(rows[1].volume, 40.0);
        assert_eq!(rows[2].discrepancy, DiscrepancyType::UnderReported);
        assert_eq!(rows[2].volume, 70.0);
    }

    #[test]
    fn test_potentially_missing_excludes_over_reported() {
        let findings = DiscrepancyAuditor::new().audit(&outcome());
        assert_eq!(findings.potentially_missing, 110.0);
    }

    #[test]
    fn test_direction_summary() {
        let auditor = DiscrepancyAuditor::new();
        let details = auditor.mismatched_tickets(&outcome());
        assert_eq!(details[0].difference, 40.0);
        assert_eq!(details[1].direction, DiscrepancyType::UnderReported);

        let summary = auditor.direction_summary(&details);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].direction, DiscrepancyType::OverReported);
        assert_eq!(summary[0].count, 1);
        assert_eq!(summary[1].count, 2);
        assert_eq!(summary[1].total_difference, -70.0);
        assert_eq!(summary[1].mean_difference, -35.0);
    }

    #[test]
    fn test_empty_outcome() {
        let findings = DiscrepancyAuditor::new().audit(&ReconciliationOutcome::default());
        assert!(findings.daily_audit.is_empty());
        assert!(findings.direction_summary.is_empty());
        assert_eq!(findings.potentially_missing, 0.0);
    }
}
