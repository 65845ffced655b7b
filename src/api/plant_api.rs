// ==========================================
// 植物养护记录系统 - 植物 API
// ==========================================
// 职责: 植物列表/详情/增删改/排序，以及单株测量历史
// 路径: /plants, /plants/{uuid}, /plants/order, /plants/{uuid}/measurements
// ==========================================

use std::sync::Arc;

use crate::api::abort::AbortSignal;
use crate::api::client::{ApiClient, RequestOptions};
use crate::api::error::{ApiError, ApiResult};
use crate::api::transport::HttpMethod;
use crate::api::validator::{require_id, require_id_list, require_text};
use crate::domain::{
    MeasurementItem, OkResponse, OrderRequest, PlantCreateRequest, PlantCreatedResponse,
    PlantDetail, PlantListItem, PlantUpdateRequest,
};

// ==========================================
// PlantApi - 植物 API
// ==========================================

/// 植物 API
///
/// 职责：
/// 1. 植物列表与详情查询
/// 2. 创建、更新、删除
/// 3. 批量排序
/// 4. 单株测量历史
pub struct PlantApi {
    client: Arc<ApiClient>,
}

impl PlantApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// 查询全部植物
    pub async fn list(&self, signal: Option<AbortSignal>) -> ApiResult<Vec<PlantListItem>> {
        tracing::debug!("查询植物列表");
        self.client
            .get_json("/plants", RequestOptions::new(HttpMethod::Get).signal(signal))
            .await
    }

    /// 查询植物详情
    ///
    /// # 参数
    /// - uuid: 植物ID（32 位十六进制或带连字符 UUID）
    pub async fn get(&self, uuid: &str, signal: Option<AbortSignal>) -> ApiResult<PlantDetail> {
        let id = require_id("植物ID", uuid)?;
        tracing::debug!(plant_id = %id, "查询植物详情");
        self.client
            .get_json(
                &format!("/plants/{}", id),
                RequestOptions::new(HttpMethod::Get).signal(signal),
            )
            .await
    }

    /// 创建植物
    ///
    /// # 返回
    /// - Err(ApiError::InvalidInput): 名称为空（不发请求）
    pub async fn create(
        &self,
        request: &PlantCreateRequest,
        signal: Option<AbortSignal>,
    ) -> ApiResult<PlantCreatedResponse> {
        let mut body = request.clone();
        body.name = require_text("植物名称", &request.name)?;

        let created: PlantCreatedResponse = self
            .client
            .post_json("/plants", &body, RequestOptions::default().signal(signal))
            .await?;
        tracing::info!(name = %body.name, "植物已创建");
        Ok(created)
    }

    /// 更新植物
    pub async fn update(
        &self,
        uuid: &str,
        request: &PlantUpdateRequest,
        signal: Option<AbortSignal>,
    ) -> ApiResult<OkResponse> {
        let id = require_id("植物ID", uuid)?;
        if request == &PlantUpdateRequest::default() {
            return Err(ApiError::InvalidInput("没有需要更新的字段".to_string()));
        }
        if let Some(name) = &request.name {
            if name.trim().is_empty() {
                return Err(ApiError::InvalidInput("植物名称不能为空".to_string()));
            }
        }

        let result: OkResponse = self
            .client
            .put_json(
                &format!("/plants/{}", id),
                request,
                RequestOptions::default().signal(signal),
            )
            .await?;
        tracing::info!(plant_id = %id, "植物已更新");
        Ok(result)
    }

    /// 删除植物
    pub async fn delete(&self, uuid: &str, signal: Option<AbortSignal>) -> ApiResult<OkResponse> {
        let id = require_id("植物ID", uuid)?;
        let result: OkResponse = self
            .client
            .delete_json(
                &format!("/plants/{}", id),
                RequestOptions::default().signal(signal),
            )
            .await?;
        tracing::info!(plant_id = %id, "植物已删除");
        Ok(result)
    }

    /// 调整植物顺序
    ///
    /// # 参数
    /// - ordered_ids: 按目标顺序排列的植物ID（非空）
    pub async fn reorder(
        &self,
        ordered_ids: &[String],
        signal: Option<AbortSignal>,
    ) -> ApiResult<OkResponse> {
        let body = OrderRequest {
            ordered_ids: require_id_list("植物ID列表", ordered_ids)?,
        };
        let result: OkResponse = self
            .client
            .put_json("/plants/order", &body, RequestOptions::default().signal(signal))
            .await?;
        tracing::info!(count = body.ordered_ids.len(), "植物顺序已更新");
        Ok(result)
    }

    /// 查询单株测量历史（后端按时间倒序返回）
    pub async fn list_measurements(
        &self,
        uuid: &str,
        signal: Option<AbortSignal>,
    ) -> ApiResult<Vec<MeasurementItem>> {
        let id = require_id("植物ID", uuid)?;
        tracing::debug!(plant_id = %id, "查询测量历史");
        self.client
            .get_json(
                &format!("/plants/{}/measurements", id),
                RequestOptions::new(HttpMethod::Get).signal(signal),
            )
            .await
    }
}
