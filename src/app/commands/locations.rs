use crate::api::AbortSignal;
use crate::app::state::AppState;
use crate::domain::LocationRenameRequest;
use crate::form::{location_form, to_location_create, FormValues};

use super::common::{fill_form, form_to_api_error, map_api_error, map_form_error, to_json};

// ==========================================
// 位置相关命令
// ==========================================

pub async fn list_locations(
    state: &AppState,
    signal: Option<AbortSignal>,
) -> Result<String, String> {
    let result = state.location_api.list(signal).await.map_err(map_api_error)?;
    to_json(&result)
}

/// 新建位置；重名（409）落到 name 字段
pub async fn create_location(
    state: &AppState,
    values: FormValues,
    signal: Option<AbortSignal>,
) -> Result<String, String> {
    let mut form = location_form();
    fill_form(&mut form, &values)?;

    let location_api = state.location_api.clone();
    let result = form
        .submit(|values| async move {
            let request = to_location_create(&values).map_err(form_to_api_error)?;
            location_api.create(&request, signal).await
        })
        .await;

    match result {
        Ok(created) => to_json(&created),
        Err(e) => Err(map_form_error(e, &form)),
    }
}

/// 按名称重命名位置
pub async fn rename_location(
    state: &AppState,
    original_name: &str,
    new_name: &str,
    signal: Option<AbortSignal>,
) -> Result<String, String> {
    let request = LocationRenameRequest {
        original_name: original_name.to_string(),
        name: new_name.to_string(),
    };
    let result = state
        .location_api
        .rename(&request, signal)
        .await
        .map_err(map_api_error)?;
    to_json(&result)
}

pub async fn reorder_locations(
    state: &AppState,
    ordered_ids: Vec<String>,
    signal: Option<AbortSignal>,
) -> Result<String, String> {
    let result = state
        .location_api
        .reorder(&ordered_ids, signal)
        .await
        .map_err(map_api_error)?;
    to_json(&result)
}

/// 删除位置；仍有植物时后端返回 409
pub async fn delete_location(
    state: &AppState,
    location_id: &str,
    signal: Option<AbortSignal>,
) -> Result<String, String> {
    let result = state
        .location_api
        .delete(location_id, signal)
        .await
        .map_err(map_api_error)?;
    to_json(&result)
}
