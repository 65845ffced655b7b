// ==========================================
// 植物养护记录系统 - 测量 API
// ==========================================
// 职责: 称重/浇水/换盆记录的增删改查
// 路径: /measurements/{weight|watering|repotting}, /measurements/{kind}/{id},
//       /measurements/{id}, /measurements/last
// ==========================================

use std::sync::Arc;

use crate::api::abort::AbortSignal;
use crate::api::client::{ApiClient, RequestOptions};
use crate::api::error::{ApiError, ApiResult};
use crate::api::transport::HttpMethod;
use crate::api::validator::require_id;
use crate::domain::{
    parse_timestamp, to_backend_format, HexId, LastMeasurement, MeasurementCreateRequest,
    MeasurementDetail, MeasurementKind, MeasurementMutationResponse, MeasurementUpdateRequest,
    OkResponse, RepottingCreateRequest, RepottingResponse, RepottingUpdateRequest,
};

// ==========================================
// MeasurementApi - 测量 API
// ==========================================

/// 测量 API
///
/// 职责：
/// 1. 称重/浇水记录创建与更新（按类型分路径）
/// 2. 换盆记录创建与更新（独立请求体）
/// 3. 单条记录查询与删除
/// 4. 植物最近一次记录
pub struct MeasurementApi {
    client: Arc<ApiClient>,
}

impl MeasurementApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// 创建称重或浇水记录
    ///
    /// # 参数
    /// - kind: Weight 或 Watering（换盆请使用 create_repotting）
    /// - request: 请求体；measured_at 会规范化为 "YYYY-MM-DD HH:MM:SS"
    ///
    /// # 返回
    /// - Err(ApiError::InvalidInput): 类型/时间/数值不合法（不发请求）
    pub async fn create(
        &self,
        kind: MeasurementKind,
        request: &MeasurementCreateRequest,
        signal: Option<AbortSignal>,
    ) -> ApiResult<MeasurementMutationResponse> {
        let mut body = request.clone();
        body.measured_at = normalize_measured_at(&request.measured_at)?;
        check_kind_values(
            kind,
            body.measured_weight_g,
            body.water_added_g,
            body.last_wet_weight_g,
        )?;

        let result: MeasurementMutationResponse = self
            .client
            .post_json(
                &format!("/measurements/{}", kind.path_segment()),
                &body,
                RequestOptions::default().signal(signal),
            )
            .await?;
        tracing::info!(plant_id = %body.plant_id, kind = %kind, "测量记录已创建");
        Ok(result)
    }

    /// 更新称重或浇水记录
    pub async fn update(
        &self,
        kind: MeasurementKind,
        id: &str,
        request: &MeasurementUpdateRequest,
        signal: Option<AbortSignal>,
    ) -> ApiResult<MeasurementMutationResponse> {
        if kind == MeasurementKind::Repotting {
            return Err(ApiError::InvalidInput(
                "换盆记录请使用 update_repotting".to_string(),
            ));
        }
        let id = require_id("测量ID", id)?;
        if request.is_empty() {
            return Err(ApiError::InvalidInput("没有需要更新的字段".to_string()));
        }

        let mut body = request.clone();
        if let Some(raw) = &request.measured_at {
            body.measured_at = Some(normalize_measured_at(raw)?);
        }
        for (field, value) in [
            ("measured_weight_g", body.measured_weight_g),
            ("water_added_g", body.water_added_g),
            ("last_wet_weight_g", body.last_wet_weight_g),
            ("last_dry_weight_g", body.last_dry_weight_g),
        ] {
            if let Some(v) = value {
                if v < 0 {
                    return Err(ApiError::InvalidInput(format!("{}不能为负数: {}", field, v)));
                }
            }
        }

        let result: MeasurementMutationResponse = self
            .client
            .put_json(
                &format!("/measurements/{}/{}", kind.path_segment(), id),
                &body,
                RequestOptions::default().signal(signal),
            )
            .await?;
        tracing::info!(measurement_id = %id, kind = %kind, "测量记录已更新");
        Ok(result)
    }

    /// 创建换盆记录
    ///
    /// measured_at、measured_weight_g、last_wet_weight_g 均为必填
    pub async fn create_repotting(
        &self,
        request: &RepottingCreateRequest,
        signal: Option<AbortSignal>,
    ) -> ApiResult<RepottingResponse> {
        let body = RepottingCreateRequest {
            plant_id: request.plant_id.clone(),
            measured_at: normalize_measured_at(&request.measured_at)?,
            measured_weight_g: Some(require_positive(
                "measured_weight_g",
                request.measured_weight_g,
            )?),
            last_wet_weight_g: Some(require_positive(
                "last_wet_weight_g",
                request.last_wet_weight_g,
            )?),
            note: request.note.clone().filter(|n| !n.trim().is_empty()),
        };

        let result: RepottingResponse = self
            .client
            .post_json(
                "/measurements/repotting",
                &body,
                RequestOptions::default().signal(signal),
            )
            .await?;
        tracing::info!(plant_id = %body.plant_id, "换盆记录已创建");
        Ok(result)
    }

    /// 更新换盆记录
    pub async fn update_repotting(
        &self,
        id: &str,
        request: &RepottingUpdateRequest,
        signal: Option<AbortSignal>,
    ) -> ApiResult<RepottingResponse> {
        let id = require_id("测量ID", id)?;
        let body = RepottingUpdateRequest {
            plant_id: request.plant_id.clone(),
            measured_at: normalize_measured_at(&request.measured_at)?,
            measured_weight_g: Some(require_positive(
                "measured_weight_g",
                request.measured_weight_g,
            )?),
            last_wet_weight_g: Some(require_positive(
                "last_wet_weight_g",
                request.last_wet_weight_g,
            )?),
            note: request.note.clone(),
        };

        let result: RepottingResponse = self
            .client
            .put_json(
                &format!("/measurements/repotting/{}", id),
                &body,
                RequestOptions::default().signal(signal),
            )
            .await?;
        tracing::info!(measurement_id = %id, "换盆记录已更新");
        Ok(result)
    }

    /// 查询单条记录
    pub async fn get(&self, id: &str, signal: Option<AbortSignal>) -> ApiResult<MeasurementDetail> {
        let id = require_id("测量ID", id)?;
        self.client
            .get_json(
                &format!("/measurements/{}", id),
                RequestOptions::new(HttpMethod::Get).signal(signal),
            )
            .await
    }

    /// 删除单条记录
    pub async fn delete(&self, id: &str, signal: Option<AbortSignal>) -> ApiResult<OkResponse> {
        let id = require_id("测量ID", id)?;
        let result: OkResponse = self
            .client
            .delete_json(
                &format!("/measurements/{}", id),
                RequestOptions::default().signal(signal),
            )
            .await?;
        tracing::info!(measurement_id = %id, "测量记录已删除");
        Ok(result)
    }

    /// 植物最近一次记录；没有任何记录时返回 None
    pub async fn last_for_plant(
        &self,
        plant_id: &str,
        signal: Option<AbortSignal>,
    ) -> ApiResult<Option<LastMeasurement>> {
        let plant_id: HexId = require_id("植物ID", plant_id)?;
        self.client
            .get_json(
                "/measurements/last",
                RequestOptions::new(HttpMethod::Get)
                    .query("plant_id", plant_id.as_str())
                    .signal(signal),
            )
            .await
    }
}

// ==========================================
// 辅助函数
// ==========================================

/// 规范化测量时间
pub fn normalize_measured_at(raw: &str) -> ApiResult<String> {
    if raw.trim().is_empty() {
        return Err(ApiError::InvalidInput("测量时间不能为空".to_string()));
    }
    parse_timestamp(raw)
        .map(|dt| to_backend_format(&dt))
        .ok_or_else(|| ApiError::InvalidInput(format!("测量时间格式无效: {}", raw.trim())))
}

/// 按类型校验必填数值
///
/// 浇水记录可只给加水后重量，加水量由后端推算
pub fn check_kind_values(
    kind: MeasurementKind,
    measured_weight_g: Option<i64>,
    water_added_g: Option<i64>,
    last_wet_weight_g: Option<i64>,
) -> ApiResult<()> {
    match kind {
        MeasurementKind::Weight => match measured_weight_g {
            None => Err(ApiError::InvalidInput("称重记录缺少 measured_weight_g".to_string())),
            Some(v) if v < 0 => Err(ApiError::InvalidInput(format!(
                "measured_weight_g不能为负数: {}",
                v
            ))),
            Some(_) => Ok(()),
        },
        MeasurementKind::Watering => {
            let positive = |v: Option<i64>| v.map_or(false, |g| g > 0);
            if positive(water_added_g) || positive(last_wet_weight_g) {
                return Ok(());
            }
            match water_added_g {
                Some(v) => Err(ApiError::InvalidInput(format!(
                    "water_added_g必须大于 0: {}",
                    v
                ))),
                None => Err(ApiError::InvalidInput(
                    "浇水记录缺少 water_added_g 或 last_wet_weight_g".to_string(),
                )),
            }
        }
        MeasurementKind::Repotting => Err(ApiError::InvalidInput(
            "换盆记录请使用 create_repotting".to_string(),
        )),
    }
}

fn require_positive(field: &str, value: Option<i64>) -> ApiResult<i64> {
    match value {
        Some(v) if v > 0 => Ok(v),
        _ => Err(ApiError::InvalidInput(format!(
            "Missing required field: {}",
            field
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_measured_at() {
        assert_eq!(
            normalize_measured_at("2025-03-01T07:30").unwrap(),
            "2025-03-01 07:30:00"
        );
        assert!(normalize_measured_at(" ").is_err());
        assert!(normalize_measured_at("yesterday").is_err());
    }

    #[test]
    fn test_check_kind_values() {
        assert!(check_kind_values(MeasurementKind::Weight, Some(0), None, None).is_ok());
        assert!(check_kind_values(MeasurementKind::Weight, None, Some(10), None).is_err());
        assert!(check_kind_values(MeasurementKind::Watering, None, Some(0), None).is_err());
        assert!(check_kind_values(MeasurementKind::Watering, None, Some(150), None).is_ok());
        assert!(check_kind_values(MeasurementKind::Watering, None, None, Some(650)).is_ok());
        assert!(check_kind_values(MeasurementKind::Watering, None, None, None).is_err());
        assert!(check_kind_values(MeasurementKind::Repotting, Some(1), Some(1), None).is_err());
    }

    #[test]
    fn test_require_positive_uses_backend_wording() {
        let err = require_positive("last_wet_weight_g", Some(0)).unwrap_err();
        assert_eq!(err.detail(), "Missing required field: last_wet_weight_g");
    }
}
