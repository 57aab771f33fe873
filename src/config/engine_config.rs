// ==========================================
// 坩埚监控调度系统 - 引擎参数
// ==========================================
// 职责: 各引擎的阈值/容量/时间参数，初始化后只读
// 说明: 默认值即生产参数，可由 ConfigManager 覆写
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

// ==========================================
// DetectionConfig - 排液检测参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub noise_delta: f64,            // 单步下降超过该值才视为排液开始
    pub min_drain_volume: f64,       // 净下降低于该值视为传感器噪声
    pub min_event_duration_min: f64, // 持续时间低于该值视为传感器噪声
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            noise_delta: 0.05,
            min_drain_volume: 0.5,
            min_event_duration_min: 0.5,
        }
    }
}

// ==========================================
// MatchingConfig - 工单对账参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub rel_tolerance: f64, // 相对容差 (diff / max(1, 工单体积))
    pub abs_tolerance: f64, // 绝对容差 (体积单位)
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            rel_tolerance: 0.05,
            abs_tolerance: 10.0,
        }
    }
}

// ==========================================
// DispatchConfig - 收集调度参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub safe_level_ratio: f64,   // 收集后保留液位 = ratio × max_volume
    pub service_setup_min: f64,  // 开始收集前的准备时间
    pub unload_time_min: f64,    // 市场卸货时间
    pub safety_margin_min: f64,  // 需早于溢出时间到达的余量
    pub horizon_min: f64,        // 模拟窗口
    pub max_iterations: usize,   // 迭代上限
    pub fallback_capacity: f64,  // 无容量声明时的携带量
    pub capacity_epsilon: f64,   // 剩余容量低于该值视为满载
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            safe_level_ratio: 0.25,
            service_setup_min: 0.5,
            unload_time_min: 15.0,
            safety_margin_min: 5.0,
            horizon_min: 24.0 * 60.0,
            max_iterations: 100_000,
            fallback_capacity: 100.0,
            capacity_epsilon: 1e-6,
        }
    }
}

// ==========================================
// EngineConfig - 全部引擎参数
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub detection: DetectionConfig,
    pub matching: MatchingConfig,
    pub dispatch: DispatchConfig,
}

impl EngineConfig {
    /// 参数校验
    ///
    /// 规则:
    /// - 阈值/时间 ≥ 0 且有限
    /// - 比例 ∈ [0, 1]
    /// - 模拟窗口、迭代上限、兜底容量 > 0
    pub fn validate(&self) -> ConfigResult<()> {
        let d = &self.detection;
        non_negative("detection.noise_delta", d.noise_delta)?;
        non_negative("detection.min_drain_volume", d.min_drain_volume)?;
        non_negative("detection.min_event_duration_min", d.min_event_duration_min)?;

        let m = &self.matching;
        non_negative("matching.rel_tolerance", m.rel_tolerance)?;
        non_negative("matching.abs_tolerance", m.abs_tolerance)?;

        let s = &self.dispatch;
        if !(0.0..=1.0).contains(&s.safe_level_ratio) {
            return Err(ConfigError::ValidationError {
                key: "dispatch.safe_level_ratio".to_string(),
                message: format!("必须位于 [0, 1]，实际 {}", s.safe_level_ratio),
            });
        }
        non_negative("dispatch.service_setup_min", s.service_setup_min)?;
        non_negative("dispatch.unload_time_min", s.unload_time_min)?;
        non_negative("dispatch.safety_margin_min", s.safety_margin_min)?;
        non_negative("dispatch.capacity_epsilon", s.capacity_epsilon)?;
        positive("dispatch.horizon_min", s.horizon_min)?;
        positive("dispatch.fallback_capacity", s.fallback_capacity)?;
        if s.max_iterations == 0 {
            return Err(ConfigError::ValidationError {
                key: "dispatch.max_iterations".to_string(),
                message: "必须大于 0".to_string(),
            });
        }
        Ok(())
    }
}

fn non_negative(key: &str, value: f64) -> ConfigResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            key: key.to_string(),
            message: format!("必须为非负有限数，实际 {}", value),
        })
    }
}

fn positive(key: &str, value: f64) -> ConfigResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            key: key.to_string(),
            message: format!("必须为正有限数，实际 {}", value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.dispatch.horizon_min, 1440.0);
        assert_eq!(config.matching.abs_tolerance, 10.0);
    }

    #[test]
    fn test_validate_rejects_bad_ratio() {
        let mut config = EngineConfig::default();
        config.dispatch.safe_level_ratio = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("dispatch.safe_level_ratio"));
    }

    #[test]
    fn test_validate_rejects_negative_threshold() {
        let mut config = EngineConfig::default();
        config.detection.min_drain_volume = -1.0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.dispatch.max_iterations = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"dispatch": {"horizon_min": 720}}"#).unwrap();
        assert_eq!(config.dispatch.horizon_min, 720.0);
        assert_eq!(config.dispatch.unload_time_min, 15.0);
        assert_eq!(config.detection, DetectionConfig::default());
    }
}
