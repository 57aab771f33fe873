// ==========================================
// 坩埚监控调度系统 - 注入速率与溢出预测模型
// ==========================================
// 每次运行重新计算，不持久化
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// FillRateEstimate - 注入速率估计
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillRateEstimate {
    pub fill_rate_per_min: f64,   // 中位数速率
    pub n_samples: usize,         // 参与计算的上升区间数
    pub median_rate: Option<f64>, // 诊断: 中位数
    pub mean_rate: Option<f64>,   // 诊断: 均值
    pub insufficient_data: bool,  // 读数不足或无上升区间
}

impl FillRateEstimate {
    /// 数据不足时的估计结果
    pub fn insufficient(n_samples: usize) -> Self {
        Self {
            fill_rate_per_min: 0.0,
            n_samples,
            median_rate: None,
            mean_rate: None,
            insufficient_data: true,
        }
    }
}

// ==========================================
// VesselForecast - 单坩埚溢出预测
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselForecast {
    pub vessel_id: String,
    pub current_level: f64,               // 最新读数
    pub max_volume: Option<f64>,          // 容量（元数据缺失时为 None）
    pub fill_rate_per_min: f64,
    pub drain_rate_per_min: f64,          // 历史排液平均速率（无事件时为 0）
    pub time_to_overflow_min: Option<f64>, // 注入速率为 0 或容量未知时为 None
}

impl VesselForecast {
    /// 是否可进入调度（需同时已知注入速率与容量）
    pub fn is_schedulable(&self) -> bool {
        self.fill_rate_per_min > 0.0 && self.max_volume.map_or(false, |v| v > 0.0)
    }

    /// 调度使用的收集速率
    ///
    /// 未知或低于注入速率时取注入速率
    pub fn effective_drain_rate(&self) -> f64 {
        if self.drain_rate_per_min > self.fill_rate_per_min {
            self.drain_rate_per_min
        } else {
            self.fill_rate_per_min
        }
    }
}
