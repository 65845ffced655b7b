// ==========================================
// 植物养护记录系统 - 位置 API
// ==========================================
// 职责: 位置列表、创建、按名称重命名、排序、删除
// 路径: /locations, /locations/by-name, /locations/order, /locations/{uuid}
// ==========================================

use std::sync::Arc;

use crate::api::abort::AbortSignal;
use crate::api::client::{ApiClient, RequestOptions};
use crate::api::error::{ApiError, ApiResult};
use crate::api::transport::HttpMethod;
use crate::api::validator::{require_id, require_id_list};
use crate::domain::{
    normalize_location_name, Location, LocationCreateRequest, LocationMutationResponse,
    LocationRenameRequest, OkResponse, OrderRequest,
};

/// 位置 API
///
/// 名称在发送前统一规范化（去首尾空白、合并连续空白）
pub struct LocationApi {
    client: Arc<ApiClient>,
}

impl LocationApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn list(&self, signal: Option<AbortSignal>) -> ApiResult<Vec<Location>> {
        tracing::debug!("查询位置列表");
        self.client
            .get_json("/locations", RequestOptions::new(HttpMethod::Get).signal(signal))
            .await
    }

    /// 创建位置（重名时后端返回 409）
    pub async fn create(
        &self,
        request: &LocationCreateRequest,
        signal: Option<AbortSignal>,
    ) -> ApiResult<LocationMutationResponse> {
        let name = normalize_location_name(&request.name);
        if name.is_empty() {
            return Err(ApiError::InvalidInput("位置名称不能为空".to_string()));
        }

        let body = LocationCreateRequest {
            name,
            description: request
                .description
                .as_ref()
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            sort_order: request.sort_order,
        };

        let result: LocationMutationResponse = self
            .client
            .post_json("/locations", &body, RequestOptions::default().signal(signal))
            .await?;
        tracing::info!(name = %body.name, "位置已创建");
        Ok(result)
    }

    /// 按原名称重命名
    ///
    /// 原名称不存在时后端会以新名称创建（响应 created = true）
    pub async fn rename(
        &self,
        request: &LocationRenameRequest,
        signal: Option<AbortSignal>,
    ) -> ApiResult<LocationMutationResponse> {
        let body = LocationRenameRequest {
            original_name: normalize_location_name(&request.original_name),
            name: normalize_location_name(&request.name),
        };
        if body.name.is_empty() {
            return Err(ApiError::InvalidInput("位置名称不能为空".to_string()));
        }
        if body.original_name.is_empty() {
            return Err(ApiError::InvalidInput("原位置名称不能为空".to_string()));
        }

        let result: LocationMutationResponse = self
            .client
            .put_json(
                "/locations/by-name",
                &body,
                RequestOptions::default().signal(signal),
            )
            .await?;
        tracing::info!(from = %body.original_name, to = %body.name, "位置已重命名");
        Ok(result)
    }

    pub async fn reorder(
        &self,
        ordered_ids: &[String],
        signal: Option<AbortSignal>,
    ) -> ApiResult<OkResponse> {
        let body = OrderRequest {
            ordered_ids: require_id_list("位置ID列表", ordered_ids)?,
        };
        let result: OkResponse = self
            .client
            .put_json(
                "/locations/order",
                &body,
                RequestOptions::default().signal(signal),
            )
            .await?;
        tracing::info!(count = body.ordered_ids.len(), "位置顺序已更新");
        Ok(result)
    }

    /// 删除位置（仍有植物引用时后端返回 409）
    pub async fn delete(&self, uuid: &str, signal: Option<AbortSignal>) -> ApiResult<OkResponse> {
        let id = require_id("位置ID", uuid)?;
        let result: OkResponse = self
            .client
            .delete_json(
                &format!("/locations/{}", id),
                RequestOptions::default().signal(signal),
            )
            .await?;
        tracing::info!(location_id = %id, "位置已删除");
        Ok(result)
    }
}
