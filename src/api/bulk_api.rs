// ==========================================
// 植物养护记录系统 - 批量录入 API
// ==========================================
// 职责: 批量称重/浇水录入
// 流程: 逐行校验（不合法的行不发请求）→ 有界并发提交 → 按输入顺序汇总
// ==========================================

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::abort::AbortSignal;
use crate::api::error::{ApiError, ApiResult};
use crate::api::measurement_api::{check_kind_values, normalize_measured_at, MeasurementApi};
use crate::api::validator::require_id;
use crate::domain::{HexId, MeasurementCreateRequest, MeasurementKind};

// ==========================================
// 数据结构
// ==========================================

/// 批量录入的一行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkEntry {
    pub row: usize,               // 来源行号（从 1 计，含表头时由解析器给出）
    pub plant_id: String,
    pub kind: MeasurementKind,    // 仅 weight / watering
    pub measured_at: String,
    pub value_g: i64,             // 称重为 measured_weight_g，浇水为 water_added_g
    pub note: Option<String>,
}

impl BulkEntry {
    /// 校验并转换为创建请求
    pub fn to_request(&self) -> ApiResult<MeasurementCreateRequest> {
        let plant_id: HexId = require_id("植物ID", &self.plant_id)?;
        let measured_at = normalize_measured_at(&self.measured_at)?;

        let request = match self.kind {
            MeasurementKind::Weight => {
                MeasurementCreateRequest::weight(plant_id, measured_at, self.value_g)
            }
            MeasurementKind::Watering => {
                MeasurementCreateRequest::watering(plant_id, measured_at, self.value_g)
            }
            MeasurementKind::Repotting => {
                return Err(ApiError::InvalidInput("批量录入不支持换盆记录".to_string()))
            }
        };
        check_kind_values(
            self.kind,
            request.measured_weight_g,
            request.water_added_g,
            request.last_wet_weight_g,
        )?;

        Ok(request.with_note(self.note.clone()))
    }
}

/// 单行结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkRowOutcome {
    pub row: usize,
    pub plant_id: String,
    pub kind: MeasurementKind,
    pub ok: bool,
    pub measurement_id: Option<HexId>,
    pub status: u16,              // HTTP 状态；本地校验失败或网络失败为 0
    pub error: Option<String>,
}

/// 批量结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkReport {
    pub succeeded: usize,
    pub failed: usize,
    pub rows: Vec<BulkRowOutcome>,
}

impl BulkReport {
    pub fn all_ok(&self) -> bool {
        self.failed == 0
    }
}

// ==========================================
// BulkApi - 批量录入 API
// ==========================================
pub struct BulkApi {
    measurement_api: Arc<MeasurementApi>,
}

impl BulkApi {
    pub fn new(measurement_api: Arc<MeasurementApi>) -> Self {
        Self { measurement_api }
    }

    /// 提交批量录入
    ///
    /// # 参数
    /// - entries: 待录入行
    /// - concurrency: 最大并发请求数（至少 1）
    ///
    /// # 返回
    /// - Err(ApiError::Aborted): 被取消，整批停止
    /// - Ok(BulkReport): 各行结果（与输入顺序一致）
    pub async fn submit(
        &self,
        entries: &[BulkEntry],
        concurrency: usize,
        signal: Option<AbortSignal>,
    ) -> ApiResult<BulkReport> {
        if entries.is_empty() {
            return Ok(BulkReport::default());
        }

        let concurrency = concurrency.max(1);
        tracing::info!(rows = entries.len(), concurrency, "开始批量录入");

        let outcomes: Vec<ApiResult<BulkRowOutcome>> =
            stream::iter(entries.iter().map(|entry| {
                let signal = signal.clone();
                async move {
                    let request = match entry.to_request() {
                        Ok(request) => request,
                        Err(e) => return Ok(failed_row(entry, &e)),
                    };
                    match self
                        .measurement_api
                        .create(entry.kind, &request, signal)
                        .await
                    {
                        Ok(resp) => Ok(BulkRowOutcome {
                            row: entry.row,
                            plant_id: request.plant_id.to_string(),
                            kind: entry.kind,
                            ok: true,
                            measurement_id: resp.data.id,
                            status: 200,
                            error: None,
                        }),
                        Err(ApiError::Aborted) => Err(ApiError::Aborted),
                        Err(e) => Ok(failed_row(entry, &e)),
                    }
                }
            }))
            .buffered(concurrency)
            .collect()
            .await;

        let rows = outcomes.into_iter().collect::<ApiResult<Vec<_>>>()?;
        let succeeded = rows.iter().filter(|r| r.ok).count();
        let report = BulkReport {
            succeeded,
            failed: rows.len() - succeeded,
            rows,
        };

        tracing::info!(
            succeeded = report.succeeded,
            failed = report.failed,
            "批量录入完成"
        );
        Ok(report)
    }
}

fn failed_row(entry: &BulkEntry, error: &ApiError) -> BulkRowOutcome {
    if !matches!(error, ApiError::InvalidInput(_)) {
        tracing::warn!(row = entry.row, "批量录入行失败: {}", error);
    }
    BulkRowOutcome {
        row: entry.row,
        plant_id: entry.plant_id.trim().to_string(),
        kind: entry.kind,
        ok: false,
        measurement_id: None,
        status: error.status(),
        error: Some(error.detail()),
    }
}
