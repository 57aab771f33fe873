// ==========================================
// 坩埚监控调度系统 - 目录数据源
// ==========================================
// 职责: 从本地目录读取五类数据文件
// 文件: data.json / tickets.json | tickets.csv / cauldrons.json /
//       network.json / couriers.json（可选）
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::source::{DataSource, SourceKind};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const LEVELS_FILE: &str = "data.json";
pub const TICKETS_JSON_FILE: &str = "tickets.json";
pub const TICKETS_CSV_FILE: &str = "tickets.csv";
pub const VESSELS_FILE: &str = "cauldrons.json";
pub const NETWORK_FILE: &str = "network.json";
pub const AGENTS_FILE: &str = "couriers.json";

// ==========================================
// JsonDirectorySource - 目录数据源
// ==========================================
#[derive(Debug, Clone)]
pub struct JsonDirectorySource {
    dir: PathBuf,
}

impl JsonDirectorySource {
    /// 创建目录数据源
    ///
    /// # 返回
    /// - Err(FileNotFound): 目录不存在
    pub fn new<P: AsRef<Path>>(dir: P) -> ImportResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.is_dir() {
            return Err(ImportError::FileNotFound(dir.display().to_string()));
        }
        info!(dir = %dir.display(), "使用目录数据源");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_required(&self, file_name: &str, kind: SourceKind) -> ImportResult<Vec<Value>> {
        let path = self.dir.join(file_name);
        let records = UniversalFileParser.parse(&path, kind)?;
        debug!(file = file_name, records = records.len(), "读取数据文件");
        Ok(records)
    }
}

impl DataSource for JsonDirectorySource {
    fn fetch_levels(&self) -> ImportResult<Vec<Value>> {
        self.read_required(LEVELS_FILE, SourceKind::Levels)
    }

    /// tickets.json 优先，不存在时读取 tickets.csv
    fn fetch_tickets(&self) -> ImportResult<Vec<Value>> {
        if self.dir.join(TICKETS_JSON_FILE).exists() {
            return self.read_required(TICKETS_JSON_FILE, SourceKind::Tickets);
        }
        if self.dir.join(TICKETS_CSV_FILE).exists() {
            return self.read_required(TICKETS_CSV_FILE, SourceKind::Tickets);
        }
        Err(ImportError::FileNotFound(
            self.dir.join(TICKETS_JSON_FILE).display().to_string(),
        ))
    }

    fn fetch_vessels(&self) -> ImportResult<Vec<Value>> {
        self.read_required(VESSELS_FILE, SourceKind::Vessels)
    }

    fn fetch_network(&self) -> ImportResult<Vec<Value>> {
        self.read_required(NETWORK_FILE, SourceKind::Network)
    }

    /// couriers.json 缺失 → 空列表（调度使用后备容量）
    fn fetch_agents(&self) -> ImportResult<Vec<Value>> {
        if !self.dir.join(AGENTS_FILE).exists() {
            debug!("未找到收集员文件，使用后备容量");
            return Ok(Vec::new());
        }
        self.read_required(AGENTS_FILE, SourceKind::Agents)
    }

    fn describe(&self) -> String {
        self.dir.display().to_string()
    }
}
