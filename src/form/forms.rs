// ==========================================
// 植物养护记录系统 - 预置表单
// ==========================================
// 植物、位置、称重、浇水、换盆表单，以及表单值 → 请求体的转换
// 转换前应已通过 validate_all；转换失败同样以字段错误返回
// ==========================================

use std::collections::BTreeMap;

use crate::domain::{
    parse_timestamp, to_backend_format, HexId, LocationCreateRequest, MeasurementCreateRequest,
    PlantCreateRequest, PlantDetail, PlantUpdateRequest, RepottingCreateRequest,
};
use crate::form::state::{FormError, FormState, FormValues};
use crate::form::validators::{
    datetime, decimal_min, hex_id, max_len, non_negative_int, positive_int, required,
};

const NAME_MAX: usize = 100;
const TEXT_MAX: usize = 1000;
const NOTE_MAX: usize = 500;

// ==========================================
// 表单构造
// ==========================================

/// 植物表单；传入详情时作为编辑表单
pub fn plant_form(existing: Option<&PlantDetail>) -> FormState {
    let text = |v: Option<&String>| v.cloned().unwrap_or_default();
    let num = |v: Option<i64>| v.map(|n| n.to_string()).unwrap_or_default();

    let form = FormState::new()
        .field(
            "name",
            "field.name",
            existing.map(|p| p.name.clone()).unwrap_or_default(),
            vec![required(), max_len(NAME_MAX)],
        )
        .field(
            "species_name",
            "field.species_name",
            text(existing.and_then(|p| p.species.as_ref())),
            vec![max_len(NAME_MAX)],
        )
        .field(
            "location_id",
            "field.location_id",
            existing
                .and_then(|p| p.location_id.as_ref())
                .map(|id| id.to_string())
                .unwrap_or_default(),
            vec![hex_id()],
        )
        .field(
            "description",
            "field.description",
            text(existing.and_then(|p| p.notes.as_ref())),
            vec![max_len(TEXT_MAX)],
        )
        .field(
            "min_dry_weight_g",
            "field.min_dry_weight_g",
            num(existing.and_then(|p| p.min_dry_weight_g)),
            vec![non_negative_int()],
        )
        .field(
            "max_water_weight_g",
            "field.max_water_weight_g",
            num(existing.and_then(|p| p.max_water_weight_g)),
            vec![non_negative_int()],
        );

    // 推荐阈值只能在新建时填写，更新接口没有该字段
    let form = match existing {
        None => form.field(
            "recommended_water_threshold_pct",
            "field.recommended_water_threshold_pct",
            "",
            vec![non_negative_int()],
        ),
        Some(_) => form,
    };

    form.field(
        "fertilizer_ec_ms",
        "field.fertilizer_ec_ms",
        "",
        vec![decimal_min(0.0)],
    )
    .conflict_field("name")
}

pub fn location_form() -> FormState {
    FormState::new()
        .field("name", "field.location_name", "", vec![required(), max_len(NAME_MAX)])
        .field("description", "field.description", "", vec![max_len(NOTE_MAX)])
        .field("sort_order", "field.sort_order", "0", vec![non_negative_int()])
        .conflict_field("name")
}

/// 称重表单
///
/// # 参数
/// - plant_id: 预填的植物ID（可为空，由用户选择）
/// - now: 预填的测量时间
pub fn weight_form(plant_id: Option<&HexId>, now: &str) -> FormState {
    measurement_base(plant_id, now)
        .field(
            "measured_weight_g",
            "field.measured_weight_g",
            "",
            vec![required(), non_negative_int()],
        )
        .field("note", "field.note", "", vec![max_len(NOTE_MAX)])
        .conflict_field("measured_weight_g")
}

pub fn watering_form(plant_id: Option<&HexId>, now: &str) -> FormState {
    measurement_base(plant_id, now)
        .field(
            "water_added_g",
            "field.water_added_g",
            "",
            vec![required(), positive_int()],
        )
        .field("note", "field.note", "", vec![max_len(NOTE_MAX)])
        .conflict_field("water_added_g")
}

pub fn repotting_form(plant_id: Option<&HexId>, now: &str) -> FormState {
    measurement_base(plant_id, now)
        .field(
            "measured_weight_g",
            "field.measured_weight_g",
            "",
            vec![required(), positive_int()],
        )
        .field(
            "last_wet_weight_g",
            "field.last_wet_weight_g",
            "",
            vec![required(), positive_int()],
        )
        .field("note", "field.note", "", vec![max_len(NOTE_MAX)])
        .conflict_field("measured_weight_g")
}

fn measurement_base(plant_id: Option<&HexId>, now: &str) -> FormState {
    FormState::new()
        .field(
            "plant_id",
            "field.plant_id",
            plant_id.map(|id| id.to_string()).unwrap_or_default(),
            vec![required(), hex_id()],
        )
        .field(
            "measured_at",
            "field.measured_at",
            now,
            vec![required(), datetime()],
        )
}

// ==========================================
// 表单值 → 请求体
// ==========================================

pub fn to_plant_create(values: &FormValues) -> Result<PlantCreateRequest, FormError> {
    let mut errors = BTreeMap::new();
    let request = PlantCreateRequest {
        name: text(values, "name").unwrap_or_default(),
        species_name: text(values, "species_name"),
        location_id: id(values, "location_id", &mut errors),
        description: text(values, "description"),
        min_dry_weight_g: int(values, "min_dry_weight_g", &mut errors),
        max_water_weight_g: int(values, "max_water_weight_g", &mut errors),
        recommended_water_threshold_pct: int(values, "recommended_water_threshold_pct", &mut errors),
        fertilizer_ec_ms: decimal(values, "fertilizer_ec_ms", &mut errors),
        ..Default::default()
    };
    finish(request, errors)
}

/// 编辑表单只提交与初始值不同的字段
pub fn to_plant_update(
    values: &FormValues,
    initial: &FormValues,
) -> Result<PlantUpdateRequest, FormError> {
    let changed = |key: &str| values.get(key) != initial.get(key);
    let mut errors = BTreeMap::new();
    let mut request = PlantUpdateRequest::default();

    if changed("name") {
        request.name = text(values, "name");
    }
    if changed("species_name") {
        request.species_name = Some(text(values, "species_name").unwrap_or_default());
    }
    if changed("location_id") {
        request.location_id = id(values, "location_id", &mut errors);
    }
    if changed("description") {
        request.description = Some(text(values, "description").unwrap_or_default());
    }
    if changed("min_dry_weight_g") {
        request.min_dry_weight_g = int(values, "min_dry_weight_g", &mut errors);
    }
    if changed("max_water_weight_g") {
        request.max_water_weight_g = int(values, "max_water_weight_g", &mut errors);
    }
    if changed("fertilizer_ec_ms") {
        request.fertilizer_ec_ms = decimal(values, "fertilizer_ec_ms", &mut errors);
    }
    finish(request, errors)
}

pub fn to_location_create(values: &FormValues) -> Result<LocationCreateRequest, FormError> {
    let mut errors = BTreeMap::new();
    let request = LocationCreateRequest {
        name: text(values, "name").unwrap_or_default(),
        description: text(values, "description"),
        sort_order: int(values, "sort_order", &mut errors)
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(0),
    };
    finish(request, errors)
}

pub fn to_weight_request(values: &FormValues) -> Result<MeasurementCreateRequest, FormError> {
    let mut errors = BTreeMap::new();
    let plant_id = id(values, "plant_id", &mut errors);
    let measured_at = timestamp(values, "measured_at", &mut errors);
    let weight = int(values, "measured_weight_g", &mut errors);

    match (plant_id, measured_at, weight) {
        (Some(plant_id), Some(at), Some(weight)) if errors.is_empty() => {
            Ok(MeasurementCreateRequest::weight(plant_id, at, weight)
                .with_note(text(values, "note")))
        }
        _ => Err(FormError::Invalid(with_missing(
            errors,
            values,
            &["plant_id", "measured_at", "measured_weight_g"],
        ))),
    }
}

pub fn to_watering_request(values: &FormValues) -> Result<MeasurementCreateRequest, FormError> {
    let mut errors = BTreeMap::new();
    let plant_id = id(values, "plant_id", &mut errors);
    let measured_at = timestamp(values, "measured_at", &mut errors);
    let water = int(values, "water_added_g", &mut errors);

    match (plant_id, measured_at, water) {
        (Some(plant_id), Some(at), Some(water)) if errors.is_empty() => {
            Ok(MeasurementCreateRequest::watering(plant_id, at, water)
                .with_note(text(values, "note")))
        }
        _ => Err(FormError::Invalid(with_missing(
            errors,
            values,
            &["plant_id", "measured_at", "water_added_g"],
        ))),
    }
}

pub fn to_repotting_request(values: &FormValues) -> Result<RepottingCreateRequest, FormError> {
    let mut errors = BTreeMap::new();
    let plant_id = id(values, "plant_id", &mut errors);
    let measured_at = timestamp(values, "measured_at", &mut errors);
    let measured_weight_g = int(values, "measured_weight_g", &mut errors);
    let last_wet_weight_g = int(values, "last_wet_weight_g", &mut errors);

    match (plant_id, measured_at) {
        (Some(plant_id), Some(measured_at)) if errors.is_empty() => Ok(RepottingCreateRequest {
            plant_id,
            measured_at,
            measured_weight_g,
            last_wet_weight_g,
            note: text(values, "note"),
        }),
        _ => Err(FormError::Invalid(with_missing(
            errors,
            values,
            &["plant_id", "measured_at"],
        ))),
    }
}

// ==========================================
// 辅助函数
// ==========================================

fn text(values: &FormValues, key: &str) -> Option<String> {
    values
        .get(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn int(values: &FormValues, key: &str, errors: &mut BTreeMap<String, String>) -> Option<i64> {
    let raw = text(values, key)?;
    match raw.parse::<i64>() {
        Ok(v) => Some(v),
        Err(_) => {
            errors.insert(key.to_string(), format!("{}: {}", key, raw));
            None
        }
    }
}

fn decimal(values: &FormValues, key: &str, errors: &mut BTreeMap<String, String>) -> Option<f64> {
    let raw = text(values, key)?;
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => {
            errors.insert(key.to_string(), format!("{}: {}", key, raw));
            None
        }
    }
}

fn id(values: &FormValues, key: &str, errors: &mut BTreeMap<String, String>) -> Option<HexId> {
    let raw = text(values, key)?;
    match HexId::parse(&raw) {
        Ok(id) => Some(id),
        Err(e) => {
            errors.insert(key.to_string(), e.to_string());
            None
        }
    }
}

fn timestamp(
    values: &FormValues,
    key: &str,
    errors: &mut BTreeMap<String, String>,
) -> Option<String> {
    let raw = text(values, key)?;
    match parse_timestamp(&raw) {
        Some(dt) => Some(to_backend_format(&dt)),
        None => {
            errors.insert(key.to_string(), format!("{}: {}", key, raw));
            None
        }
    }
}

fn with_missing(
    mut errors: BTreeMap<String, String>,
    values: &FormValues,
    required_keys: &[&str],
) -> BTreeMap<String, String> {
    for key in required_keys {
        if text(values, key).is_none() {
            errors
                .entry(key.to_string())
                .or_insert_with(|| format!("Missing required field: {}", key));
        }
    }
    errors
}

fn finish<T>(request: T, errors: BTreeMap<String, String>) -> Result<T, FormError> {
    if errors.is_empty() {
        Ok(request)
    } else {
        Err(FormError::Invalid(errors))
    }
}
