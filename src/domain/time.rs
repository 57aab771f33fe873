// ==========================================
// 坩埚监控调度系统 - 时间工具
// ==========================================
// 红线: 所有时间戳在运算前统一为 UTC
// ==========================================

use chrono::{DateTime, Duration, Utc};

/// 两个时间点之间的分钟数（可为负）
pub fn minutes_between(end: DateTime<Utc>, start: DateTime<Utc>) -> f64 {
    (end - start).num_milliseconds() as f64 / 60_000.0
}

/// 分钟数 → chrono::Duration（毫秒精度）
///
/// 非有限值按 0 处理
pub fn minutes_to_duration(minutes: f64) -> Duration {
    if !minutes.is_finite() {
        return Duration::zero();
    }
    Duration::milliseconds((minutes * 60_000.0).round() as i64)
}
