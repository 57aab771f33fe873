// ==========================================
// 坩埚监控调度系统 - 液位读数领域模型
// ==========================================
// 职责: 液位读数 / 坩埚元数据 / 按坩埚分组的时间序列
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// Reading - 单条液位读数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub vessel_id: String,        // 坩埚ID
    pub timestamp: DateTime<Utc>, // 采样时间 (UTC)
    pub level: f64,               // 液位
}

// ==========================================
// LevelPoint - 序列中的单点
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelPoint {
    pub timestamp: DateTime<Utc>,
    pub level: f64,
}

impl LevelPoint {
    pub fn new(timestamp: DateTime<Utc>, level: f64) -> Self {
        Self { timestamp, level }
    }
}

// ==========================================
// VesselInfo - 坩埚元数据
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselInfo {
    pub vessel_id: String,       // 坩埚ID
    pub name: Option<String>,    // 显示名称
    pub max_volume: Option<f64>, // 容量上限 (未知时为 None)
}

/// 按坩埚分组并按时间升序排序
///
/// 排序为稳定排序: 相同时间戳保留输入顺序，不去重
pub fn group_by_vessel(readings: Vec<Reading>) -> BTreeMap<String, Vec<LevelPoint>> {
    let mut series: BTreeMap<String, Vec<LevelPoint>> = BTreeMap::new();
    for reading in readings {
        series
            .entry(reading.vessel_id)
            .or_default()
            .push(LevelPoint::new(reading.timestamp, reading.level));
    }
    for points in series.values_mut() {
        points.sort_by_key(|p| p.timestamp);
    }
    series
}
