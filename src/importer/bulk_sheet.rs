// ==========================================
// 植物养护记录系统 - 批量录入表解析
// ==========================================
// 格式: CSV，表头 plant_id,kind,measured_at,value_g,note（note 可省略）
// 表头大小写不敏感；空行跳过；坏行记录行号后跳过，不中断整表
// ==========================================

use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::api::bulk_api::BulkEntry;
use crate::domain::MeasurementKind;
use crate::importer::error::ImportError;

pub const REQUIRED_COLUMNS: &[&str] = &["plant_id", "kind", "measured_at", "value_g"];

/// 解析结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkSheet {
    pub entries: Vec<BulkEntry>,
    pub errors: Vec<ImportError>,
}

impl BulkSheet {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

// ==========================================
// BulkSheetParser
// ==========================================
pub struct BulkSheetParser;

impl BulkSheetParser {
    /// 从文件解析
    pub fn parse_path<P: AsRef<Path>>(path: P) -> Result<BulkSheet, ImportError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        if let Some(ext) = path.extension() {
            if !ext.eq_ignore_ascii_case("csv") {
                return Err(ImportError::UnsupportedFormat(
                    ext.to_string_lossy().to_string(),
                ));
            }
        }

        let file = File::open(path)?;
        let sheet = Self::parse_reader(file)?;
        tracing::info!(
            file = %path.display(),
            rows = sheet.entries.len(),
            errors = sheet.errors.len(),
            "批量录入表解析完成"
        );
        Ok(sheet)
    }

    /// 从任意读取源解析
    pub fn parse_reader<R: Read>(reader: R) -> Result<BulkSheet, ImportError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: HashMap<String, usize> = reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(idx, h)| (h.trim().trim_start_matches('\u{feff}').to_lowercase(), idx))
            .collect();

        for column in REQUIRED_COLUMNS {
            if !headers.contains_key(*column) {
                return Err(ImportError::MissingColumn(column.to_string()));
            }
        }

        let mut sheet = BulkSheet::default();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let row = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(idx + 2);

            let cell = |name: &str| -> String {
                headers
                    .get(name)
                    .and_then(|&i| record.get(i))
                    .unwrap_or("")
                    .trim()
                    .to_string()
            };

            // 跳过完全空白的行
            if record.iter().all(|v| v.trim().is_empty()) {
                continue;
            }

            match parse_row(row, &cell) {
                Ok(entry) => sheet.entries.push(entry),
                Err(e) => {
                    tracing::debug!("跳过坏行: {}", e);
                    sheet.errors.push(e);
                }
            }
        }

        Ok(sheet)
    }
}

fn parse_row(row: usize, cell: &dyn Fn(&str) -> String) -> Result<BulkEntry, ImportError> {
    let invalid = |field: &str, message: String| ImportError::InvalidField {
        row,
        field: field.to_string(),
        message,
    };

    let plant_id = cell("plant_id");
    if plant_id.is_empty() {
        return Err(invalid("plant_id", "不能为空".to_string()));
    }

    let raw_kind = cell("kind");
    let kind = match MeasurementKind::parse(&raw_kind) {
        Some(k @ (MeasurementKind::Weight | MeasurementKind::Watering)) => k,
        _ => {
            return Err(invalid(
                "kind",
                format!("应为 weight 或 watering，实际为 {:?}", raw_kind),
            ))
        }
    };

    let measured_at = cell("measured_at");
    if measured_at.is_empty() {
        return Err(invalid("measured_at", "不能为空".to_string()));
    }

    let raw_value = cell("value_g");
    let value_g = raw_value
        .parse::<i64>()
        .map_err(|_| invalid("value_g", format!("应为整数，实际为 {:?}", raw_value)))?;

    let note = Some(cell("note")).filter(|n| !n.is_empty());

    Ok(BulkEntry {
        row,
        plant_id,
        kind,
        measured_at,
        value_g,
        note,
    })
}
