// ==========================================
// 坩埚监控调度系统 - 排液事件领域模型
// ==========================================
// 红线: collected_amount = raw_drop + fill_rate × duration_min
// 事件创建后不可修改
// ==========================================

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// DrainEvent - 检测到的排液事件
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrainEvent {
    // ===== 标识 =====
    pub event_id: String,  // UUID v4
    pub vessel_id: String, // 坩埚ID

    // ===== 时间范围 =====
    pub time_start: DateTime<Utc>,
    pub time_end: DateTime<Utc>,

    // ===== 液位 =====
    pub start_level: f64,
    pub end_level: f64,

    // ===== 体积 =====
    pub raw_drop: f64,         // 液位净下降
    pub duration_min: f64,     // 持续时间 (分钟)
    pub fill_during: f64,      // 排液期间的注入补偿量
    pub collected_amount: f64, // 实际取走量
}

impl DrainEvent {
    /// 事件日期（按 time_start 的 UTC 日历日）
    pub fn event_date(&self) -> NaiveDate {
        self.time_start.date_naive()
    }

    /// 排液速率（单位/分钟），持续时间为 0 时返回 None
    pub fn drain_rate_per_min(&self) -> Option<f64> {
        if self.duration_min > 0.0 {
            Some(self.collected_amount / self.duration_min)
        } else {
            None
        }
    }
}
