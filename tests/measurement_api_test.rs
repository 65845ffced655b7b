// ==========================================
// MeasurementApi / CalibrationApi 集成测试
// ==========================================
// 测试范围:
// 1. 称重/浇水/换盆录入的规范化与发送前校验
// 2. 最近记录为空的处理
// 3. 校正: 种子选择驱动的时间窗口、无种子不发请求
// ==========================================

mod helpers;

use pretty_assertions::assert_eq;
use serde_json::json;

use helpers::api_test_helper::*;
use plant_care_client::api::{ApiError, HttpMethod};
use plant_care_client::domain::{
    CalibratingPlant, CorrectionCapMode, CorrectionRequest, HexId, MeasurementCreateRequest,
    MeasurementKind, MeasurementUpdateRequest, RepottingCreateRequest,
};

fn plant_id() -> HexId {
    HexId::parse(PLANT_A).unwrap()
}

// ==========================================
// 录入
// ==========================================

#[tokio::test]
async fn test_create_weight_normalizes_timestamp() {
    let env = ApiTestEnv::new();
    env.transport.on_json(
        HttpMethod::Post,
        "/measurements/weight",
        200,
        measurement_created_json(MEASUREMENT_A),
    );

    let request = MeasurementCreateRequest::weight(plant_id(), "2025-03-01T07:30", 812)
        .with_note(Some("after trip".to_string()));
    let result = env
        .state
        .measurement_api
        .create(MeasurementKind::Weight, &request, None)
        .await
        .unwrap();

    assert_eq!(result.status, "success");
    assert_eq!(result.data.id.as_ref().map(|i| i.as_str()), Some(MEASUREMENT_A));

    let body = env
        .transport
        .last_body(HttpMethod::Post, "/measurements/weight")
        .unwrap();
    assert_eq!(body["measured_at"], "2025-03-01 07:30:00");
    assert_eq!(body["measured_weight_g"], 812);
    assert_eq!(body["note"], "after trip");
    assert!(body.get("water_added_g").is_none());
}

#[tokio::test]
async fn test_watering_requires_positive_amount() {
    let env = ApiTestEnv::new();

    let request = MeasurementCreateRequest::watering(plant_id(), "2025-03-01 08:00", 0);
    let err = env
        .state
        .measurement_api
        .create(MeasurementKind::Watering, &request, None)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::InvalidInput(_)));
    assert!(env.transport.requests().is_empty());
}

#[tokio::test]
async fn test_watering_with_only_wet_weight_is_sent() {
    let env = ApiTestEnv::new();
    env.transport.on_json(
        HttpMethod::Post,
        "/measurements/watering",
        200,
        measurement_created_json(MEASUREMENT_A),
    );

    let request = MeasurementCreateRequest {
        water_added_g: None,
        last_wet_weight_g: Some(650),
        ..MeasurementCreateRequest::watering(plant_id(), "2025-03-01 08:00", 1)
    };
    env.state
        .measurement_api
        .create(MeasurementKind::Watering, &request, None)
        .await
        .unwrap();

    let body = env
        .transport
        .last_body(HttpMethod::Post, "/measurements/watering")
        .unwrap();
    assert_eq!(body["last_wet_weight_g"], 650);
    assert!(body.get("water_added_g").is_none());
}

#[tokio::test]
async fn test_watering_without_any_amount_is_rejected() {
    let env = ApiTestEnv::new();

    let request = MeasurementCreateRequest {
        water_added_g: None,
        ..MeasurementCreateRequest::watering(plant_id(), "2025-03-01 08:00", 1)
    };
    let err = env
        .state
        .measurement_api
        .create(MeasurementKind::Watering, &request, None)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::InvalidInput(_)));
    assert!(env.transport.requests().is_empty());
}

#[tokio::test]
async fn test_bad_timestamp_is_rejected_before_sending() {
    let env = ApiTestEnv::new();

    let request = MeasurementCreateRequest::weight(plant_id(), "yesterday", 500);
    let err = env
        .state
        .measurement_api
        .create(MeasurementKind::Weight, &request, None)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::InvalidInput(_)));
    assert!(env.transport.requests().is_empty());
}

#[tokio::test]
async fn test_repotting_missing_weight_names_field() {
    let env = ApiTestEnv::new();

    let request = RepottingCreateRequest {
        plant_id: plant_id(),
        measured_at: "2025-03-01 08:00".to_string(),
        measured_weight_g: Some(900),
        last_wet_weight_g: None,
        note: None,
    };
    let err = env
        .state
        .measurement_api
        .create_repotting(&request, None)
        .await
        .unwrap_err();

    assert_eq!(err.detail(), "Missing required field: last_wet_weight_g");
    assert!(env.transport.requests().is_empty());
}

#[tokio::test]
async fn test_repotting_backend_validation_passes_through() {
    let env = ApiTestEnv::new();
    env.transport.on_json(
        HttpMethod::Post,
        "/measurements/repotting",
        400,
        json!({"detail": "Missing required field: measured_weight_g"}),
    );

    let request = RepottingCreateRequest {
        plant_id: plant_id(),
        measured_at: "2025-03-01 08:00".to_string(),
        measured_weight_g: Some(900),
        last_wet_weight_g: Some(1100),
        note: None,
    };
    let err = env
        .state
        .measurement_api
        .create_repotting(&request, None)
        .await
        .unwrap_err();

    assert_eq!(err.status(), 400);
    assert!(err.is_validation_conflict());
}

#[tokio::test]
async fn test_update_measurement_path_and_body() {
    let env = ApiTestEnv::new();
    let path = format!("/measurements/watering/{}", MEASUREMENT_A);
    env.transport
        .on_json(HttpMethod::Put, &path, 200, measurement_created_json(MEASUREMENT_A));

    let request = MeasurementUpdateRequest {
        water_added_g: Some(180),
        ..Default::default()
    };
    env.state
        .measurement_api
        .update(MeasurementKind::Watering, MEASUREMENT_A, &request, None)
        .await
        .unwrap();

    let body = env.transport.last_body(HttpMethod::Put, &path).unwrap();
    assert_eq!(body, json!({"water_added_g": 180}));
}

#[tokio::test]
async fn test_update_rejects_repotting_and_empty_requests() {
    let env = ApiTestEnv::new();
    let api = &env.state.measurement_api;

    let empty = api
        .update(
            MeasurementKind::Weight,
            MEASUREMENT_A,
            &MeasurementUpdateRequest::default(),
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(empty, ApiError::InvalidInput(_)));

    let repot = MeasurementUpdateRequest {
        measured_weight_g: Some(1),
        ..Default::default()
    };
    let err = api
        .update(MeasurementKind::Repotting, MEASUREMENT_A, &repot, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    assert!(env.transport.requests().is_empty());
}

#[tokio::test]
async fn test_last_measurement_may_be_null() {
    let env = ApiTestEnv::new();
    env.transport
        .on_json(HttpMethod::Get, "/measurements/last", 200, json!(null))
        .on_json(
            HttpMethod::Get,
            "/measurements/last",
            200,
            json!({"measured_at": "2025-03-02 08:00:00", "measured_weight_g": 640}),
        );

    let none = env
        .state
        .measurement_api
        .last_for_plant(PLANT_A, None)
        .await
        .unwrap();
    assert!(none.is_none());

    let some = env
        .state
        .measurement_api
        .last_for_plant(PLANT_A, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(some.measured_weight_g, Some(640));

    let request = &env.transport.requests()[0];
    assert!(request.url.ends_with(&format!("?plant_id={}", PLANT_A)));
}

// ==========================================
// 校正
// ==========================================

fn calibrating_json() -> serde_json::Value {
    json!([{
        "id": 1,
        "uuid": PLANT_A,
        "name": "Ficus",
        "min_dry_weight_g": 400,
        "max_water_weight_g": 200,
        "calibration": {
            "max_water_retained": [
                {"measured_at": "2025-02-01 08:00:00", "water_added_g": 150, "under_g": 50, "under_pct": 25.0},
                {"measured_at": "2025-02-10T09:15", "water_added_g": 120, "under_g": 80, "under_pct": 40.0},
                {"measured_at": "2025-02-20 08:00:00", "water_added_g": 200, "under_g": 0, "under_pct": 0.0}
            ],
            "min_dry_weight": []
        }
    }, {
        "id": 2,
        "uuid": PLANT_B,
        "name": "Fern",
        "calibration": {"max_water_retained": [], "min_dry_weight": []}
    }])
}

#[tokio::test]
async fn test_correct_from_worst_uses_seed_window() {
    let env = ApiTestEnv::new();
    env.transport
        .on_json(HttpMethod::Get, "/measurements/calibrating", 200, calibrating_json())
        .on_json(
            HttpMethod::Post,
            "/measurements/corrections",
            200,
            json!({"updated": 3, "total_excess_g": 0}),
        );

    let plants: Vec<CalibratingPlant> = env
        .state
        .calibration_api
        .list_calibrating(None)
        .await
        .unwrap();
    assert_eq!(plants.len(), 2);

    let result = env
        .state
        .calibration_api
        .correct_from_worst(&plants[0], CorrectionCapMode::RetainedRatio, false, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(result.updated, 3);

    let body = env
        .transport
        .last_body(HttpMethod::Post, "/measurements/corrections")
        .unwrap();
    assert_eq!(
        body,
        json!({
            "plant_id": PLANT_A,
            "cap": "retained_ratio",
            "edit_last_wet": false,
            "from_ts": "2025-02-10 09:15:00",
        })
    );
}

#[tokio::test]
async fn test_correct_without_seed_sends_nothing() {
    let env = ApiTestEnv::new();
    env.transport
        .on_json(HttpMethod::Get, "/measurements/calibrating", 200, calibrating_json());

    let plants = env
        .state
        .calibration_api
        .list_calibrating(None)
        .await
        .unwrap();
    let result = env
        .state
        .calibration_api
        .correct_from_worst(&plants[1], CorrectionCapMode::Capacity, true, None)
        .await
        .unwrap();

    assert!(result.is_none());
    assert_eq!(env.transport.count(HttpMethod::Post, "/measurements/corrections"), 0);
}

#[tokio::test]
async fn test_correction_window_must_be_ordered() {
    let env = ApiTestEnv::new();

    let mut request = CorrectionRequest::new(plant_id());
    request.from_ts = Some("2025-03-10 00:00".to_string());
    request.to_ts = Some("2025-03-01 00:00".to_string());
    let err = env
        .state
        .calibration_api
        .apply_corrections(&request, None)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::InvalidInput(_)));
    assert!(env.transport.requests().is_empty());
}
