// ==========================================
// 坩埚监控调度系统 - 溢出预测引擎
// ==========================================
// 职责: 由当前液位、容量、注入速率推算溢出剩余时间
// 红线: 注入速率 ≤ 0 或容量未知 → 不预测（不可溢出，不进入调度）
// ==========================================

use crate::domain::forecast::VesselForecast;

// ==========================================
// OverflowForecaster - 溢出预测引擎
// ==========================================
pub struct OverflowForecaster {
    // 无状态引擎
}

impl OverflowForecaster {
    pub fn new() -> Self {
        Self {}
    }

    /// 溢出剩余分钟数
    ///
    /// time_to_overflow = max(0, (max_volume - current_level) / fill_rate)
    pub fn time_to_overflow(
        &self,
        current_level: f64,
        max_volume: Option<f64>,
        fill_rate_per_min: f64,
    ) -> Option<f64> {
        let max_volume = max_volume?;
        if fill_rate_per_min <= 0.0 {
            return None;
        }
        Some(((max_volume - current_level) / fill_rate_per_min).max(0.0))
    }

    /// 生成单坩埚预测
    pub fn forecast(
        &self,
        vessel_id: &str,
        current_level: f64,
        max_volume: Option<f64>,
        fill_rate_per_min: f64,
        drain_rate_per_min: f64,
    ) -> VesselForecast {
        VesselForecast {
            vessel_id: vessel_id.to_string(),
            current_level,
            max_volume,
            fill_rate_per_min,
            drain_rate_per_min,
            time_to_overflow_min: self.time_to_overflow(current_level, max_volume, fill_rate_per_min),
        }
    }
}

impl Default for OverflowForecaster {
    fn default() -> Self {
        Self::new()
    }
}
