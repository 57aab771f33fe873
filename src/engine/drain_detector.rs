// ==========================================
// 坩埚监控调度系统 - 排液事件检测引擎
// ==========================================
// 职责: 将液位序列切分为离散排液事件
// 输入: 按时间升序的液位序列 + 注入速率
// 输出: DrainEvent 列表
// 红线: collected_amount = raw_drop + fill_rate × duration_min
// 红线: 贪心切分，事件互不重叠，不回溯、不合并
// ==========================================

use crate::config::DetectionConfig;
use crate::domain::drain_event::DrainEvent;
use crate::domain::reading::LevelPoint;
use crate::domain::time::minutes_between;
use tracing::{debug, instrument};
use uuid::Uuid;

// ==========================================
// DrainEventDetector - 排液事件检测引擎
// ==========================================
pub struct DrainEventDetector {
    config: DetectionConfig,
}

impl DrainEventDetector {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    /// 检测排液事件
    ///
    /// 规则:
    /// 1) 相邻两点下降超过 noise_delta → 排液开始于前一点
    /// 2) 向后延伸，直到液位出现上升（允许持平）
    /// 3) raw_drop < min_drain_volume 或 duration < min_event_duration_min → 视为噪声丢弃
    /// 4) 否则生成事件，补偿排液期间的注入量
    /// 5) 从本段结束点继续扫描
    #[instrument(skip(self, points), fields(vessel_id = %vessel_id, points = points.len()))]
    pub fn detect(
        &self,
        vessel_id: &str,
        points: &[LevelPoint],
        fill_rate_per_min: f64,
    ) -> Vec<DrainEvent> {
        let mut events = Vec::new();
        let n = points.len();
        let mut i = 1;

        while i < n {
            let delta = points[i].level - points[i - 1].level;
            if delta >= -self.config.noise_delta {
                i += 1;
                continue;
            }

            // 延伸非上升段
            let start_idx = i - 1;
            let mut end_idx = i;
            while end_idx + 1 < n && points[end_idx + 1].level <= points[end_idx].level {
                end_idx += 1;
            }

            let start = points[start_idx];
            let end = points[end_idx];
            let raw_drop = start.level - end.level;
            let duration_min = minutes_between(end.timestamp, start.timestamp);

            if raw_drop < self.config.min_drain_volume
                || duration_min < self.config.min_event_duration_min
            {
                debug!(
                    raw_drop,
                    duration_min,
                    start = %start.timestamp,
                    "下降段低于阈值，视为噪声"
                );
            } else {
                let fill_during = fill_rate_per_min * duration_min;
                events.push(DrainEvent {
                    event_id: Uuid::new_v4().to_string(),
                    vessel_id: vessel_id.to_string(),
                    time_start: start.timestamp,
                    time_end: end.timestamp,
                    start_level: start.level,
                    end_level: end.level,
                    raw_drop,
                    duration_min,
                    fill_during,
                    collected_amount: raw_drop + fill_during,
                });
            }

            i = end_idx + 1;
        }

        debug!(events = events.len(), "排液检测完成");
        events
    }
}
