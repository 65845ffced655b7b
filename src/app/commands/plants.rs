use crate::api::AbortSignal;
use crate::app::state::AppState;
use crate::form::{plant_form, to_plant_create, to_plant_update, FormValues};

use super::common::{fill_form, form_to_api_error, map_api_error, map_form_error, to_json};

// ==========================================
// 植物相关命令
// ==========================================

/// 查询植物列表
pub async fn list_plants(state: &AppState, signal: Option<AbortSignal>) -> Result<String, String> {
    let result = state.plant_api.list(signal).await.map_err(map_api_error)?;
    to_json(&result)
}

/// 查询植物详情
pub async fn get_plant(
    state: &AppState,
    plant_id: &str,
    signal: Option<AbortSignal>,
) -> Result<String, String> {
    let result = state
        .plant_api
        .get(plant_id, signal)
        .await
        .map_err(map_api_error)?;
    to_json(&result)
}

/// 新建植物（经植物表单校验）
pub async fn create_plant(
    state: &AppState,
    values: FormValues,
    signal: Option<AbortSignal>,
) -> Result<String, String> {
    let mut form = plant_form(None);
    fill_form(&mut form, &values)?;

    let plant_api = state.plant_api.clone();
    let result = form
        .submit(|values| async move {
            let request = to_plant_create(&values).map_err(form_to_api_error)?;
            plant_api.create(&request, signal).await
        })
        .await;

    match result {
        Ok(created) => to_json(&created),
        Err(e) => Err(map_form_error(e, &form)),
    }
}

/// 编辑植物
///
/// 先取详情作为表单初始值，只提交有变化的字段
pub async fn update_plant(
    state: &AppState,
    plant_id: &str,
    values: FormValues,
    signal: Option<AbortSignal>,
) -> Result<String, String> {
    let existing = state
        .plant_api
        .get(plant_id, signal.clone())
        .await
        .map_err(map_api_error)?;

    let mut form = plant_form(Some(&existing));
    let initial = form.values();
    fill_form(&mut form, &values)?;

    let plant_api = state.plant_api.clone();
    let plant_id = plant_id.to_string();
    let result = form
        .submit(|values| async move {
            let request = to_plant_update(&values, &initial).map_err(form_to_api_error)?;
            plant_api.update(&plant_id, &request, signal).await
        })
        .await;

    match result {
        Ok(ok) => to_json(&ok),
        Err(e) => Err(map_form_error(e, &form)),
    }
}

/// 删除植物
pub async fn delete_plant(
    state: &AppState,
    plant_id: &str,
    signal: Option<AbortSignal>,
) -> Result<String, String> {
    let result = state
        .plant_api
        .delete(plant_id, signal)
        .await
        .map_err(map_api_error)?;
    to_json(&result)
}

/// 调整植物顺序
pub async fn reorder_plants(
    state: &AppState,
    ordered_ids: Vec<String>,
    signal: Option<AbortSignal>,
) -> Result<String, String> {
    let result = state
        .plant_api
        .reorder(&ordered_ids, signal)
        .await
        .map_err(map_api_error)?;
    to_json(&result)
}

/// 查询植物测量历史
pub async fn plant_history(
    state: &AppState,
    plant_id: &str,
    signal: Option<AbortSignal>,
) -> Result<String, String> {
    let result = state
        .plant_api
        .list_measurements(plant_id, signal)
        .await
        .map_err(map_api_error)?;
    to_json(&result)
}
