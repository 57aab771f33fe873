// ==========================================
// 坩埚监控调度系统 - 注入速率估计引擎
// ==========================================
// 职责: 由单坩埚液位序列估计自然注入速率
// 输入: 按时间升序的 (timestamp, level) 序列
// 输出: 中位数速率 + 样本数 + 均值
// 红线: 使用中位数，对误判为上升的异常区间稳健
// ==========================================

use crate::domain::forecast::FillRateEstimate;
use crate::domain::reading::LevelPoint;
use crate::domain::time::minutes_between;

// ==========================================
// FillRateEstimator - 注入速率估计引擎
// ==========================================
pub struct FillRateEstimator {
    // 无状态引擎
}

impl FillRateEstimator {
    pub fn new() -> Self {
        Self {}
    }

    /// 估计注入速率
    ///
    /// 规则:
    /// 1) 相邻两点 Δlevel > 0 且 Δt > 0 时，rate = Δlevel / Δ分钟
    /// 2) 输出所有 rate 的中位数（偶数个取中间两者均值）
    /// 3) 少于两个读数或没有上升区间 → rate = 0，标记数据不足
    pub fn estimate(&self, points: &[LevelPoint]) -> FillRateEstimate {
        if points.len() < 2 {
            return FillRateEstimate::insufficient(0);
        }

        let mut rates: Vec<f64> = points
            .windows(2)
            .filter_map(|pair| {
                let delta = pair[1].level - pair[0].level;
                let dt_min = minutes_between(pair[1].timestamp, pair[0].timestamp);
                if delta > 0.0 && dt_min > 0.0 {
                    Some(delta / dt_min)
                } else {
                    None
                }
            })
            .collect();

        if rates.is_empty() {
            return FillRateEstimate::insufficient(0);
        }

        rates.sort_by(|a, b| a.total_cmp(b));
        let median = median_of_sorted(&rates);
        let mean = rates.iter().sum::<f64>() / rates.len() as f64;

        FillRateEstimate {
            fill_rate_per_min: median,
            n_samples: rates.len(),
            median_rate: Some(median),
            mean_rate: Some(mean),
            insufficient_data: false,
        }
    }
}

impl Default for FillRateEstimator {
    fn default() -> Self {
        Self::new()
    }
}

/// 已排序切片的中位数（调用方保证非空）
fn median_of_sorted(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}
