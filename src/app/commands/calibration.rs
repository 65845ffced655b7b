use serde::Serialize;

use crate::api::validator::require_id;
use crate::api::{AbortSignal, ApiError};
use crate::app::state::AppState;
use crate::domain::{CorrectionCapMode, CorrectionRequest, CorrectionResult};
use crate::engine::calibration::summarize_all;

use super::common::{map_api_error, to_json};

// ==========================================
// 校准相关命令
// ==========================================

/// 单株校正结果；没有欠水条目时 result 为空
#[derive(Debug, Serialize)]
struct CorrectionOutcome {
    plant_id: String,
    plant_name: String,
    result: Option<CorrectionResult>,
}

/// 待校准植物概览（欠水最严重的在前）
pub async fn calibration_overview(
    state: &AppState,
    signal: Option<AbortSignal>,
) -> Result<String, String> {
    let plants = state
        .calibration_api
        .list_calibrating(signal)
        .await
        .map_err(map_api_error)?;
    to_json(&summarize_all(&plants))
}

/// 以欠水最严重的浇水记录为起点校正单株植物
pub async fn correct_plant(
    state: &AppState,
    plant_id: &str,
    cap: CorrectionCapMode,
    edit_last_wet: bool,
    signal: Option<AbortSignal>,
) -> Result<String, String> {
    let id = require_id("植物ID", plant_id).map_err(map_api_error)?;
    let plants = state
        .calibration_api
        .list_calibrating(signal.clone())
        .await
        .map_err(map_api_error)?;

    let plant = plants
        .iter()
        .find(|p| p.plant.uuid.as_ref() == Some(&id))
        .ok_or_else(|| {
            map_api_error(ApiError::InvalidInput(format!(
                "植物不在待校准列表中: {}",
                id
            )))
        })?;

    let result = state
        .calibration_api
        .correct_from_worst(plant, cap, edit_last_wet, signal)
        .await
        .map_err(map_api_error)?;

    to_json(&CorrectionOutcome {
        plant_id: id.to_string(),
        plant_name: plant.plant.name.clone(),
        result,
    })
}

/// 逐株校正所有需要校正的植物
///
/// 按顺序发送；任一株失败即停止并返回错误
pub async fn correct_all(
    state: &AppState,
    cap: CorrectionCapMode,
    edit_last_wet: bool,
    signal: Option<AbortSignal>,
) -> Result<String, String> {
    let plants = state
        .calibration_api
        .list_calibrating(signal.clone())
        .await
        .map_err(map_api_error)?;

    let mut outcomes = Vec::new();
    for plant in &plants {
        let Some(plant_id) = plant.plant.uuid.as_ref() else {
            continue;
        };
        let result = state
            .calibration_api
            .correct_from_worst(plant, cap, edit_last_wet, signal.clone())
            .await
            .map_err(map_api_error)?;
        if result.is_some() {
            outcomes.push(CorrectionOutcome {
                plant_id: plant_id.to_string(),
                plant_name: plant.plant.name.clone(),
                result,
            });
        }
    }

    tracing::info!(corrected = outcomes.len(), "批量校正完成");
    to_json(&outcomes)
}

/// 按显式时间窗口校正
pub async fn apply_correction_window(
    state: &AppState,
    request: CorrectionRequest,
    signal: Option<AbortSignal>,
) -> Result<String, String> {
    let result = state
        .calibration_api
        .apply_corrections(&request, signal)
        .await
        .map_err(map_api_error)?;
    to_json(&result)
}
