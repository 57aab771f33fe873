// ==========================================
// 坩埚监控调度系统 - 文件解析器实现
// ==========================================
// 支持: JSON (.json) / CSV (.csv)
// 输出: 统一为 serde_json::Value 记录，交给 RecordCleaner 清洗
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::source::{extract_records, SourceKind};
use csv::ReaderBuilder;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

// ==========================================
// JSON Parser 实现
// ==========================================
pub struct JsonParser;

impl JsonParser {
    /// 读取整个 JSON 文档
    pub fn read_document(&self, path: &Path) -> ImportResult<Value> {
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }
        let file = File::open(path)?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| ImportError::JsonParseError {
            source_name: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// 读取记录列表（顶层数组或包装对象）
    pub fn parse_to_records(&self, path: &Path, kind: SourceKind) -> ImportResult<Vec<Value>> {
        let document = self.read_document(path)?;
        extract_records(kind, document)
    }
}

// ==========================================
// CSV Parser 实现
// ==========================================
// 每行转为 {表头: 字符串值}，数值解析由 RecordCleaner 负责
pub struct CsvParser;

impl CsvParser {
    pub fn parse_to_records(&self, path: &Path) -> ImportResult<Vec<Value>> {
        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            let mut row = Map::new();
            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    row.insert(header.clone(), Value::String(value.trim().to_string()));
                }
            }

            // 跳过完全空白的行
            if row.values().all(|v| v.as_str().map_or(true, str::is_empty)) {
                continue;
            }
            records.push(Value::Object(row));
        }

        Ok(records)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse<P: AsRef<Path>>(&self, file_path: P, kind: SourceKind) -> ImportResult<Vec<Value>> {
        let path = file_path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "json" => JsonParser.parse_to_records(path, kind),
            "csv" => CsvParser.parse_to_records(path),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn temp_with_suffix(suffix: &str) -> NamedTempFile {
        Builder::new().suffix(suffix).tempfile().unwrap()
    }

    #[test]
    fn test_csv_parser_valid_file() {
        let mut temp_file = temp_with_suffix(".csv");
        writeln!(temp_file, "ticket_id, cauldron_id ,amount_collected,date").unwrap();
        writeln!(temp_file, "TT_001,cauldron_001, 58.5 ,2025-10-30").unwrap();
        writeln!(temp_file, "TT_002,cauldron_002,40,2025-10-31").unwrap();

        let records = CsvParser.parse_to_records(temp_file.path()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["cauldron_id"], "cauldron_001");
        assert_eq!(records[0]["amount_collected"], "58.5");
    }

    #[test]
    fn test_csv_parser_skip_empty_rows() {
        let mut temp_file = temp_with_suffix(".csv");
        writeln!(temp_file, "ticket_id,amount_collected").unwrap();
        writeln!(temp_file, "TT_001,2.5").unwrap();
        writeln!(temp_file, ",").unwrap(); // 空行
        writeln!(temp_file, "TT_002,3.0").unwrap();

        let records = CsvParser.parse_to_records(temp_file.path()).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_json_parser_errors() {
        let missing = JsonParser.parse_to_records(Path::new("non_existent.json"), SourceKind::Levels);
        assert!(matches!(missing, Err(ImportError::FileNotFound(_))));

        let mut broken = temp_with_suffix(".json");
        write!(broken, "[{{\"timestamp\": ").unwrap();
        let result = JsonParser.parse_to_records(broken.path(), SourceKind::Levels);
        assert!(matches!(result, Err(ImportError::JsonParseError { .. })));
    }

    #[test]
    fn test_universal_parser_dispatch_by_extension() {
        let mut json_file = temp_with_suffix(".json");
        write!(json_file, "{{\"edges\": [{{\"from\": \"a\", \"to\": \"b\"}}]}}").unwrap();
        let records = UniversalFileParser
            .parse(json_file.path(), SourceKind::Network)
            .unwrap();
        assert_eq!(records.len(), 1);

        let txt = temp_with_suffix(".txt");
        assert!(matches!(
            UniversalFileParser.parse(txt.path(), SourceKind::Network),
            Err(ImportError::UnsupportedFormat(_))
        ));
    }
}
