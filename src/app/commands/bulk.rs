use serde::Serialize;
use std::path::Path;

use crate::api::{AbortSignal, BulkEntry, BulkReport};
use crate::app::state::AppState;
use crate::i18n::t_with_args;
use crate::importer::{BulkSheetParser, ImportError};

use super::common::{import_error_message, map_api_error, map_import_error, to_json};

// ==========================================
// 批量录入命令
// ==========================================

#[derive(Debug, Serialize)]
struct SheetError {
    row: Option<usize>,
    message: String,
}

impl From<&ImportError> for SheetError {
    fn from(err: &ImportError) -> Self {
        Self {
            row: err.row(),
            message: import_error_message(err),
        }
    }
}

#[derive(Debug, Serialize)]
struct BulkImportOutput {
    summary: String,
    parse_errors: Vec<SheetError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<BulkReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    entries: Option<Vec<BulkEntry>>,
}

/// 从 CSV 批量录入称重/浇水
///
/// 坏行不阻止其余行提交；dry_run 只解析不发请求
pub async fn bulk_import(
    state: &AppState,
    path: &Path,
    dry_run: bool,
    signal: Option<AbortSignal>,
) -> Result<String, String> {
    let sheet = BulkSheetParser::parse_path(path).map_err(map_import_error)?;
    let parse_errors: Vec<SheetError> = sheet.errors.iter().map(SheetError::from).collect();

    if dry_run {
        let summary = summary(sheet.entries.len(), parse_errors.len());
        return to_json(&BulkImportOutput {
            summary,
            parse_errors,
            report: None,
            entries: Some(sheet.entries),
        });
    }

    let report = state
        .bulk_api
        .submit(&sheet.entries, state.bulk_concurrency(), signal)
        .await
        .map_err(map_api_error)?;

    to_json(&BulkImportOutput {
        summary: summary(report.succeeded, report.failed + parse_errors.len()),
        parse_errors,
        report: Some(report),
        entries: None,
    })
}

fn summary(succeeded: usize, failed: usize) -> String {
    t_with_args(
        "bulk.summary",
        &[
            ("succeeded", &succeeded.to_string()),
            ("failed", &failed.to_string()),
        ],
    )
}
