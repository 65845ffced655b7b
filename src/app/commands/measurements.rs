use crate::api::AbortSignal;
use crate::app::state::AppState;
use crate::domain::{MeasurementKind, MeasurementUpdateRequest, RepottingUpdateRequest};
use crate::form::{
    repotting_form, to_repotting_request, to_watering_request, to_weight_request, watering_form,
    weight_form, FormValues,
};

use super::common::{fill_form, form_to_api_error, map_api_error, map_form_error, to_json};

// ==========================================
// 测量相关命令
// ==========================================

fn now_local() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M").to_string()
}

/// 录入称重/浇水/换盆
///
/// measured_at 未给出时取当前本地时间
pub async fn record_measurement(
    state: &AppState,
    kind: MeasurementKind,
    values: FormValues,
    signal: Option<AbortSignal>,
) -> Result<String, String> {
    let now = now_local();
    let mut form = match kind {
        MeasurementKind::Weight => weight_form(None, &now),
        MeasurementKind::Watering => watering_form(None, &now),
        MeasurementKind::Repotting => repotting_form(None, &now),
    };
    fill_form(&mut form, &values)?;

    let api = state.measurement_api.clone();
    let result = form
        .submit(|values| async move {
            let json = match kind {
                MeasurementKind::Weight | MeasurementKind::Watering => {
                    let request = if kind == MeasurementKind::Weight {
                        to_weight_request(&values)
                    } else {
                        to_watering_request(&values)
                    }
                    .map_err(form_to_api_error)?;
                    serde_json::to_value(api.create(kind, &request, signal).await?)
                }
                MeasurementKind::Repotting => {
                    let request = to_repotting_request(&values).map_err(form_to_api_error)?;
                    serde_json::to_value(api.create_repotting(&request, signal).await?)
                }
            };
            json.map_err(|e| crate::api::ApiError::Decode(e.to_string()))
        })
        .await;

    match result {
        Ok(created) => to_json(&created),
        Err(e) => Err(map_form_error(e, &form)),
    }
}

/// 更新称重/浇水记录（仅发送给出的字段）
pub async fn update_measurement(
    state: &AppState,
    kind: MeasurementKind,
    measurement_id: &str,
    request: MeasurementUpdateRequest,
    signal: Option<AbortSignal>,
) -> Result<String, String> {
    let result = state
        .measurement_api
        .update(kind, measurement_id, &request, signal)
        .await
        .map_err(map_api_error)?;
    to_json(&result)
}

/// 更新换盆记录（全量字段，经换盆表单校验）
pub async fn update_repotting(
    state: &AppState,
    measurement_id: &str,
    values: FormValues,
    signal: Option<AbortSignal>,
) -> Result<String, String> {
    let mut form = repotting_form(None, &now_local());
    fill_form(&mut form, &values)?;

    let api = state.measurement_api.clone();
    let measurement_id = measurement_id.to_string();
    let result = form
        .submit(|values| async move {
            let created = to_repotting_request(&values).map_err(form_to_api_error)?;
            let request = RepottingUpdateRequest {
                plant_id: created.plant_id,
                measured_at: created.measured_at,
                measured_weight_g: created.measured_weight_g,
                last_wet_weight_g: created.last_wet_weight_g,
                note: created.note,
            };
            api.update_repotting(&measurement_id, &request, signal).await
        })
        .await;

    match result {
        Ok(updated) => to_json(&updated),
        Err(e) => Err(map_form_error(e, &form)),
    }
}

pub async fn get_measurement(
    state: &AppState,
    measurement_id: &str,
    signal: Option<AbortSignal>,
) -> Result<String, String> {
    let result = state
        .measurement_api
        .get(measurement_id, signal)
        .await
        .map_err(map_api_error)?;
    to_json(&result)
}

pub async fn delete_measurement(
    state: &AppState,
    measurement_id: &str,
    signal: Option<AbortSignal>,
) -> Result<String, String> {
    let result = state
        .measurement_api
        .delete(measurement_id, signal)
        .await
        .map_err(map_api_error)?;
    to_json(&result)
}

/// 植物最近一次测量；没有记录时输出 null
pub async fn last_measurement(
    state: &AppState,
    plant_id: &str,
    signal: Option<AbortSignal>,
) -> Result<String, String> {
    let result = state
        .measurement_api
        .last_for_plant(plant_id, signal)
        .await
        .map_err(map_api_error)?;
    to_json(&result)
}
