// ==========================================
// 坩埚监控调度系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: key-value 覆写表 (JSON 文件 + 环境变量)
// 优先级: 环境变量 > 配置文件 > 内置默认值
// ==========================================

use crate::config::engine_config::EngineConfig;
use crate::config::error::{ConfigError, ConfigResult};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 环境变量前缀，例如 CAULDRON_APS__DISPATCH__HORIZON_MIN=720
pub const ENV_PREFIX: &str = "CAULDRON_APS__";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    overrides: BTreeMap<String, String>,
    source_path: Option<PathBuf>,
}

impl ConfigManager {
    /// 创建空的 ConfigManager（全部使用默认值）
    pub fn new() -> Self {
        Self::default()
    }

    /// 默认配置文件路径: {config_dir}/cauldron-aps/config.json
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("cauldron-aps").join("config.json"))
    }

    /// 从 JSON 配置文件加载
    ///
    /// 文件格式: 扁平 key-value 对象，值可为字符串或数字
    /// ```json
    /// { "detection.noise_delta": 0.05, "dispatch.horizon_min": "720" }
    /// ```
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let map: BTreeMap<String, Value> =
            serde_json::from_str(&raw).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        let mut manager = Self {
            overrides: BTreeMap::new(),
            source_path: Some(path.to_path_buf()),
        };
        for (key, value) in map {
            let text = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            manager.set(&key, &text)?;
        }

        info!(path = %path.display(), keys = manager.overrides.len(), "配置文件加载完成");
        Ok(manager)
    }

    /// 从默认位置加载；文件不存在时返回空配置
    pub fn from_default_location() -> ConfigResult<Self> {
        match Self::default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                debug!("未找到默认配置文件，使用内置默认值");
                Ok(Self::new())
            }
        }
    }

    /// 叠加进程环境变量覆写
    pub fn with_env_overrides(self) -> ConfigResult<Self> {
        self.with_env_pairs(std::env::vars())
    }

    /// 叠加指定的环境变量对（仅处理带 ENV_PREFIX 前缀的变量）
    pub fn with_env_pairs<I>(mut self, vars: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in vars {
            if let Some(rest) = name.strip_prefix(ENV_PREFIX) {
                let key = rest.to_lowercase().replace("__", ".");
                debug!(key = %key, "应用环境变量覆写");
                self.set(&key, &value)?;
            }
        }
        Ok(self)
    }

    /// 设置单个覆写值
    ///
    /// 未知 key 直接拒绝，避免拼写错误被静默忽略
    pub fn set(&mut self, key: &str, value: &str) -> ConfigResult<()> {
        if !config_keys::ALL.contains(&key) {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }
        self.overrides.insert(key.to_string(), value.trim().to_string());
        Ok(())
    }

    /// 读取覆写值（未覆写时为 None）
    pub fn get_global_config_value(&self, key: &str) -> Option<&str> {
        self.overrides.get(key).map(|s| s.as_str())
    }

    /// 配置来源文件
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// 生成校验后的引擎参数
    pub fn engine_config(&self) -> ConfigResult<EngineConfig> {
        let mut config = EngineConfig::default();

        // ===== 排液检测 =====
        self.apply_f64(config_keys::NOISE_DELTA, &mut config.detection.noise_delta)?;
        self.apply_f64(config_keys::MIN_DRAIN_VOLUME, &mut config.detection.min_drain_volume)?;
        self.apply_f64(
            config_keys::MIN_EVENT_DURATION_MIN,
            &mut config.detection.min_event_duration_min,
        )?;

        // ===== 工单对账 =====
        self.apply_f64(config_keys::REL_TOLERANCE, &mut config.matching.rel_tolerance)?;
        self.apply_f64(config_keys::ABS_TOLERANCE, &mut config.matching.abs_tolerance)?;

        // ===== 收集调度 =====
        let dispatch = &mut config.dispatch;
        self.apply_f64(config_keys::SAFE_LEVEL_RATIO, &mut dispatch.safe_level_ratio)?;
        self.apply_f64(config_keys::SERVICE_SETUP_MIN, &mut dispatch.service_setup_min)?;
        self.apply_f64(config_keys::UNLOAD_TIME_MIN, &mut dispatch.unload_time_min)?;
        self.apply_f64(config_keys::SAFETY_MARGIN_MIN, &mut dispatch.safety_margin_min)?;
        self.apply_f64(config_keys::HORIZON_MIN, &mut dispatch.horizon_min)?;
        self.apply_f64(config_keys::FALLBACK_CAPACITY, &mut dispatch.fallback_capacity)?;
        self.apply_f64(config_keys::CAPACITY_EPSILON, &mut dispatch.capacity_epsilon)?;
        if let Some(raw) = self.get_global_config_value(config_keys::MAX_ITERATIONS) {
            dispatch.max_iterations = raw.parse::<usize>().map_err(|e| ConfigError::ValueError {
                key: config_keys::MAX_ITERATIONS.to_string(),
                value: raw.to_string(),
                message: e.to_string(),
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// 获取生效配置的快照（JSON格式）
    ///
    /// 用于报告中记录本次运行使用的参数
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let config = self.engine_config()?;
        Ok(serde_json::to_string(&config)?)
    }

    fn apply_f64(&self, key: &str, target: &mut f64) -> ConfigResult<()> {
        if let Some(raw) = self.get_global_config_value(key) {
            *target = raw.parse::<f64>().map_err(|e| ConfigError::ValueError {
                key: key.to_string(),
                value: raw.to_string(),
                message: e.to_string(),
            })?;
        }
        Ok(())
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 排液检测
    pub const NOISE_DELTA: &str = "detection.noise_delta";
    pub const MIN_DRAIN_VOLUME: &str = "detection.min_drain_volume";
    pub const MIN_EVENT_DURATION_MIN: &str = "detection.min_event_duration_min";

    // 工单对账
    pub const REL_TOLERANCE: &str = "matching.rel_tolerance";
    pub const ABS_TOLERANCE: &str = "matching.abs_tolerance";

    // 收集调度
    pub const SAFE_LEVEL_RATIO: &str = "dispatch.safe_level_ratio";
    pub const SERVICE_SETUP_MIN: &str = "dispatch.service_setup_min";
    pub const UNLOAD_TIME_MIN: &str = "dispatch.unload_time_min";
    pub const SAFETY_MARGIN_MIN: &str = "dispatch.safety_margin_min";
    pub const HORIZON_MIN: &str = "dispatch.horizon_min";
    pub const MAX_ITERATIONS: &str = "dispatch.max_iterations";
    pub const FALLBACK_CAPACITY: &str = "dispatch.fallback_capacity";
    pub const CAPACITY_EPSILON: &str = "dispatch.capacity_epsilon";

    pub const ALL: &[&str] = &[
        NOISE_DELTA,
        MIN_DRAIN_VOLUME,
        MIN_EVENT_DURATION_MIN,
        REL_TOLERANCE,
        ABS_TOLERANCE,
        SAFE_LEVEL_RATIO,
        SERVICE_SETUP_MIN,
        UNLOAD_TIME_MIN,
        SAFETY_MARGIN_MIN,
        HORIZON_MIN,
        MAX_ITERATIONS,
        FALLBACK_CAPACITY,
        CAPACITY_EPSILON,
    ];
}
