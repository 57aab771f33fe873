// ==========================================
// 坩埚监控调度系统 - 分析流水线
// ==========================================
// 用途: 协调注入速率 → 排液检测 → 对账 → 溢出预测 的执行顺序
// 红线: 每次运行从头计算，不缓存中间结果
// ==========================================

use crate::config::EngineConfig;
use crate::domain::drain_event::DrainEvent;
use crate::domain::forecast::{FillRateEstimate, VesselForecast};
use crate::domain::reading::{group_by_vessel, Reading, VesselInfo};
use crate::domain::ticket::{ReconciliationOutcome, Ticket};
use crate::engine::{DrainEventDetector, FillRateEstimator, OverflowForecaster, ReconciliationMatcher};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

// ==========================================
// VesselRates - 单坩埚速率统计
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselRates {
    pub vessel_id: String,
    pub readings: usize,
    pub fill: FillRateEstimate,
    pub drain_rate_per_min: f64, // 本坩埚事件排液速率均值，无事件为 0
    pub event_count: usize,
}

// ==========================================
// AnalysisResult - 分析结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    // 按坩埚ID排序
    pub vessel_rates: Vec<VesselRates>,
    pub average_fill_rate_per_min: f64,
    pub average_drain_rate_per_min: f64,

    pub events: Vec<DrainEvent>,
    pub reconciliation: ReconciliationOutcome,

    // 按坩埚ID排序，只包含有读数的坩埚
    pub forecasts: Vec<VesselForecast>,
    pub latest_reading_at: Option<DateTime<Utc>>,
}

// ==========================================
// AnalysisPipeline - 分析流水线
// ==========================================
pub struct AnalysisPipeline {
    estimator: FillRateEstimator,
    detector: DrainEventDetector,
    matcher: ReconciliationMatcher,
    forecaster: OverflowForecaster,
}

impl AnalysisPipeline {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            estimator: FillRateEstimator::new(),
            detector: DrainEventDetector::new(config.detection.clone()),
            matcher: ReconciliationMatcher::new(config.matching.clone()),
            forecaster: OverflowForecaster::new(),
        }
    }

    /// 执行完整分析
    ///
    /// # 参数
    /// - readings: 全部液位读数（任意顺序）
    /// - tickets: 工单（按上报顺序，对账结果依赖该顺序）
    /// - vessels: 坩埚元数据（提供容量）
    #[instrument(skip_all, fields(
        readings = readings.len(),
        tickets = tickets.len(),
        vessels = vessels.len()
    ))]
    pub fn run(
        &self,
        readings: Vec<Reading>,
        tickets: &[Ticket],
        vessels: &[VesselInfo],
    ) -> AnalysisResult {
        let latest_reading_at = readings.iter().map(|r| r.timestamp).max();
        let series = group_by_vessel(readings);
        info!(series = series.len(), "开始分析液位序列");

        // ==========================================
        // 步骤1: 注入速率 + 排液检测
        // ==========================================
        let mut vessel_rates = Vec::with_capacity(series.len());
        let mut events: Vec<DrainEvent> = Vec::new();
        let mut fleet_fill_rates: Vec<f64> = Vec::new();
        let mut fleet_drain_rates: Vec<f64> = Vec::new();

        for (vessel_id, points) in &series {
            if points.len() < 2 {
                debug!(vessel_id = %vessel_id, "读数不足，跳过速率估计与排液检测");
                vessel_rates.push(VesselRates {
                    vessel_id: vessel_id.clone(),
                    readings: points.len(),
                    fill: FillRateEstimate::insufficient(0),
                    drain_rate_per_min: 0.0,
                    event_count: 0,
                });
                continue;
            }

            let fill = self.estimator.estimate(points);
            fleet_fill_rates.push(fill.fill_rate_per_min);

            let vessel_events = self.detector.detect(vessel_id, points, fill.fill_rate_per_min);
            let drain_rates: Vec<f64> = vessel_events
                .iter()
                .filter_map(DrainEvent::drain_rate_per_min)
                .collect();
            fleet_drain_rates.extend(drain_rates.iter().copied());

            vessel_rates.push(VesselRates {
                vessel_id: vessel_id.clone(),
                readings: points.len(),
                fill,
                drain_rate_per_min: mean(&drain_rates),
                event_count: vessel_events.len(),
            });
            events.extend(vessel_events);
        }

        let average_fill_rate_per_min = mean(&fleet_fill_rates);
        let average_drain_rate_per_min = mean(&fleet_drain_rates);
        info!(
            events = events.len(),
            average_fill_rate_per_min,
            average_drain_rate_per_min,
            "速率估计与排液检测完成"
        );

        // ==========================================
        // 步骤2: 工单对账
        // ==========================================
        let reconciliation = self.matcher.reconcile(&events, tickets);

        // ==========================================
        // 步骤3: 溢出预测
        // ==========================================
        let max_volumes: HashMap<&str, Option<f64>> = vessels
            .iter()
            .map(|v| (v.vessel_id.as_str(), v.max_volume))
            .collect();

        let forecasts: Vec<VesselForecast> = series
            .iter()
            .zip(vessel_rates.iter())
            .filter_map(|((vessel_id, points), rates)| {
                let last = points.last()?;
                let max_volume = max_volumes.get(vessel_id.as_str()).copied().flatten();
                Some(self.forecaster.forecast(
                    vessel_id,
                    last.level,
                    max_volume,
                    rates.fill.fill_rate_per_min,
                    rates.drain_rate_per_min,
                ))
            })
            .collect();

        info!(
            forecasts = forecasts.len(),
            schedulable = forecasts.iter().filter(|f| f.is_schedulable()).count(),
            "溢出预测完成"
        );

        AnalysisResult {
            vessel_rates,
            average_fill_rate_per_min,
            average_drain_rate_per_min,
            events,
            reconciliation,
            forecasts,
            latest_reading_at,
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
