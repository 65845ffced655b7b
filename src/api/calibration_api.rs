// ==========================================
// 植物养护记录系统 - 校准 API
// ==========================================
// 职责: 待校准植物查询、应用校正、按最差欠水条目一键校正
// 路径: /measurements/calibrating, /measurements/corrections
// ==========================================

use std::sync::Arc;

use crate::api::abort::AbortSignal;
use crate::api::client::{ApiClient, RequestOptions};
use crate::api::error::{ApiError, ApiResult};
use crate::api::transport::HttpMethod;
use crate::domain::{
    parse_timestamp, CalibratingPlant, CorrectionCapMode, CorrectionRequest, CorrectionResult,
};
use crate::engine::calibration::{build_correction_request, select_correction_seed};

/// 校准 API
pub struct CalibrationApi {
    client: Arc<ApiClient>,
}

impl CalibrationApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// 查询待校准植物（含两类校准结果）
    pub async fn list_calibrating(
        &self,
        signal: Option<AbortSignal>,
    ) -> ApiResult<Vec<CalibratingPlant>> {
        tracing::debug!("查询待校准植物");
        self.client
            .get_json(
                "/measurements/calibrating",
                RequestOptions::new(HttpMethod::Get).signal(signal),
            )
            .await
    }

    /// 应用校正
    ///
    /// # 返回
    /// - Err(ApiError::InvalidInput): 时间窗口无效（不发请求）
    pub async fn apply_corrections(
        &self,
        request: &CorrectionRequest,
        signal: Option<AbortSignal>,
    ) -> ApiResult<CorrectionResult> {
        check_window(request)?;

        let result: CorrectionResult = self
            .client
            .post_json(
                "/measurements/corrections",
                request,
                RequestOptions::default().signal(signal),
            )
            .await?;
        tracing::info!(
            plant_id = %request.plant_id,
            cap = %request.cap,
            updated = result.updated,
            "校正已应用"
        );
        Ok(result)
    }

    /// 以欠水最严重的浇水记录为起点校正
    ///
    /// # 返回
    /// - Ok(None): 没有欠水条目，不发请求
    /// - Ok(Some(result)): 校正结果
    pub async fn correct_from_worst(
        &self,
        plant: &CalibratingPlant,
        cap: CorrectionCapMode,
        edit_last_wet: bool,
        signal: Option<AbortSignal>,
    ) -> ApiResult<Option<CorrectionResult>> {
        let plant_id = plant
            .plant
            .uuid
            .clone()
            .ok_or_else(|| ApiError::InvalidInput("植物ID不能为空".to_string()))?;

        let seed = match select_correction_seed(&plant.calibration.max_water_retained) {
            Some(seed) => seed,
            None => {
                tracing::debug!(plant_id = %plant_id, "没有欠水条目，跳过校正");
                return Ok(None);
            }
        };

        let request = build_correction_request(plant_id, seed, cap, edit_last_wet);
        self.apply_corrections(&request, signal).await.map(Some)
    }
}

fn check_window(request: &CorrectionRequest) -> ApiResult<()> {
    let parse = |field: &str, raw: &Option<String>| -> ApiResult<_> {
        match raw {
            None => Ok(None),
            Some(s) => parse_timestamp(s)
                .map(Some)
                .ok_or_else(|| ApiError::InvalidInput(format!("{}格式无效: {}", field, s))),
        }
    };

    let from = parse("from_ts", &request.from_ts)?;
    let to = parse("to_ts", &request.to_ts)?;
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            return Err(ApiError::InvalidInput("from_ts 不能晚于 to_ts".to_string()));
        }
    }
    Ok(())
}
