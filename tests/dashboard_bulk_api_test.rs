// ==========================================
// DashboardApi / BulkApi 集成测试
// ==========================================
// 测试范围:
// 1. 驾驶舱: 卡片顺序、浇水判定计数、历史失败降级、取消透传
// 2. 批量录入: 本地校验失败不发请求、后端错误逐行记录、顺序保持
// ==========================================

mod helpers;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::time::Duration;

use helpers::api_test_helper::*;
use helpers::mock_transport::Reply;
use plant_care_client::api::{AbortController, ApiError, BulkEntry, DashboardOptions, HttpMethod};
use plant_care_client::domain::MeasurementKind;
use plant_care_client::engine::TrendDirection;

fn options() -> DashboardOptions {
    DashboardOptions {
        points: 10,
        concurrency: 3,
        default_threshold_pct: 40,
    }
}

fn listed_plant(uuid: &str, name: &str, measured_g: i64) -> Value {
    let mut plant = plant_json(uuid, name);
    plant["measured_weight_g"] = json!(measured_g);
    plant
}

fn history_path(uuid: &str) -> String {
    format!("/plants/{}/measurements", uuid)
}

// ==========================================
// 驾驶舱
// ==========================================

#[tokio::test]
async fn test_dashboard_keeps_order_and_counts() {
    let env = ApiTestEnv::new();
    let mut thirsty = listed_plant(PLANT_A, "Ficus", 450);
    thirsty["next_watering_at"] = json!("2000-01-01 00:00:00");
    env.transport
        .on_json(
            HttpMethod::Get,
            "/plants",
            200,
            json!([thirsty, listed_plant(PLANT_B, "Fern", 580)]),
        )
        .on_json(HttpMethod::Get, &history_path(PLANT_A), 200, history_json(&[600, 520, 450]))
        .on_json(HttpMethod::Get, &history_path(PLANT_B), 200, history_json(&[500, 540, 580]));

    let dashboard = env.state.dashboard_api.load(options(), None).await.unwrap();

    let names: Vec<&str> = dashboard.cards.iter().map(|c| c.plant.name.as_str()).collect();
    assert_eq!(names, vec!["Ficus", "Fern"]);

    let ficus = &dashboard.cards[0];
    assert_eq!(ficus.watering.retained_pct, Some(25.0));
    assert!(ficus.watering.needs_water);
    assert!(ficus.watering.overdue);
    assert_eq!(ficus.sparkline.points, vec![600, 520, 450]);
    assert_eq!(ficus.sparkline.direction, TrendDirection::Falling);

    let fern = &dashboard.cards[1];
    assert!(!fern.watering.needs_water);
    assert_eq!(fern.sparkline.latest_g(), Some(580));

    assert_eq!(dashboard.needs_water_count, 1);
    assert_eq!(dashboard.overdue_count, 1);
    assert_eq!(dashboard.degraded_count, 0);
}

#[tokio::test]
async fn test_dashboard_degrades_card_when_history_fails() {
    let env = ApiTestEnv::new();
    env.transport
        .on_json(
            HttpMethod::Get,
            "/plants",
            200,
            json!([listed_plant(PLANT_A, "Ficus", 500), listed_plant(PLANT_C, "Cactus", 700)]),
        )
        .on_json(HttpMethod::Get, &history_path(PLANT_A), 200, history_json(&[520, 500]))
        .on_json(
            HttpMethod::Get,
            &history_path(PLANT_C),
            500,
            json!({"detail": "history store offline"}),
        );

    let dashboard = env.state.dashboard_api.load(options(), None).await.unwrap();

    assert_eq!(dashboard.cards.len(), 2);
    assert_eq!(dashboard.degraded_count, 1);
    let cactus = &dashboard.cards[1];
    assert_eq!(cactus.history_error.as_deref(), Some("history store offline"));
    assert!(cactus.sparkline.is_empty());
    assert!(dashboard.cards[0].history_error.is_none());
}

#[tokio::test]
async fn test_dashboard_plant_list_failure_is_an_error() {
    let env = ApiTestEnv::new();
    env.transport
        .on_json(HttpMethod::Get, "/plants", 500, json!({"detail": "boom"}));

    let err = env.state.dashboard_api.load(options(), None).await.unwrap_err();
    assert_eq!(err.status(), 500);
}

#[tokio::test]
async fn test_dashboard_abort_is_not_degraded() {
    let env = ApiTestEnv::new();
    env.transport
        .on_json(
            HttpMethod::Get,
            "/plants",
            200,
            json!([listed_plant(PLANT_A, "Ficus", 500), listed_plant(PLANT_B, "Fern", 500)]),
        )
        .on_json(HttpMethod::Get, &history_path(PLANT_A), 200, history_json(&[500]))
        .on(HttpMethod::Get, &history_path(PLANT_B), Reply::Stall);

    let controller = AbortController::new();
    let signal = controller.signal();
    let dashboard_api = env.state.dashboard_api.clone();
    let pending = tokio::spawn(async move { dashboard_api.load(options(), Some(signal)).await });

    tokio::time::sleep(Duration::from_millis(20)).await;
    controller.abort();

    let result = tokio::time::timeout(Duration::from_secs(1), pending)
        .await
        .expect("取消未生效")
        .unwrap();
    assert!(matches!(result, Err(ApiError::Aborted)));
}

// ==========================================
// 批量录入
// ==========================================

fn entry(row: usize, plant_id: &str, kind: MeasurementKind, value_g: i64) -> BulkEntry {
    BulkEntry {
        row,
        plant_id: plant_id.to_string(),
        kind,
        measured_at: format!("2025-04-{:02} 09:00", row),
        value_g,
        note: None,
    }
}

#[tokio::test]
async fn test_bulk_submit_mixed_rows() {
    let env = ApiTestEnv::new();
    env.transport
        .on_json(
            HttpMethod::Post,
            "/measurements/weight",
            200,
            measurement_created_json(MEASUREMENT_A),
        )
        .on_json(
            HttpMethod::Post,
            "/measurements/weight",
            404,
            json!({"detail": "Plant not found"}),
        )
        .on_json(
            HttpMethod::Post,
            "/measurements/watering",
            200,
            measurement_created_json(MEASUREMENT_A),
        );

    let entries = vec![
        entry(2, PLANT_A, MeasurementKind::Weight, 640),
        entry(3, PLANT_A, MeasurementKind::Watering, 0),
        entry(4, PLANT_C, MeasurementKind::Weight, 300),
        entry(5, PLANT_B, MeasurementKind::Watering, 150),
    ];
    let report = env
        .state
        .bulk_api
        .submit(&entries, 1, None)
        .await
        .unwrap();

    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 2);
    assert!(!report.all_ok());

    let rows: Vec<(usize, bool, u16)> = report
        .rows
        .iter()
        .map(|r| (r.row, r.ok, r.status))
        .collect();
    assert_eq!(rows, vec![(2, true, 200), (3, false, 0), (4, false, 404), (5, true, 200)]);

    assert_eq!(
        report.rows[0].measurement_id.as_ref().map(|id| id.as_str()),
        Some(MEASUREMENT_A)
    );
    assert_eq!(report.rows[2].error.as_deref(), Some("Plant not found"));

    // 本地校验失败的行不发请求
    assert_eq!(env.transport.count(HttpMethod::Post, "/measurements/weight"), 2);
    assert_eq!(env.transport.count(HttpMethod::Post, "/measurements/watering"), 1);
}

#[tokio::test]
async fn test_bulk_submit_preserves_input_order_under_concurrency() {
    let env = ApiTestEnv::new();
    env.transport.on_json(
        HttpMethod::Post,
        "/measurements/weight",
        200,
        measurement_created_json(MEASUREMENT_A),
    );

    let entries: Vec<BulkEntry> = (2..10)
        .map(|row| entry(row, PLANT_A, MeasurementKind::Weight, 500 + row as i64))
        .collect();
    let report = env
        .state
        .bulk_api
        .submit(&entries, 4, None)
        .await
        .unwrap();

    let rows: Vec<usize> = report.rows.iter().map(|r| r.row).collect();
    assert_eq!(rows, (2..10).collect::<Vec<_>>());
    assert!(report.all_ok());
}

#[tokio::test]
async fn test_bulk_submit_empty_sends_nothing() {
    let env = ApiTestEnv::new();

    let report = env.state.bulk_api.submit(&[], 4, None).await.unwrap();

    assert_eq!(report.succeeded, 0);
    assert!(report.rows.is_empty());
    assert!(env.transport.requests().is_empty());
}

#[tokio::test]
async fn test_bulk_submit_stops_on_abort() {
    let env = ApiTestEnv::new();
    let controller = AbortController::new();
    controller.abort();

    let entries = vec![entry(2, PLANT_A, MeasurementKind::Weight, 640)];
    let err = env
        .state
        .bulk_api
        .submit(&entries, 2, Some(controller.signal()))
        .await
        .unwrap_err();

    assert!(err.is_aborted());
    assert!(env.transport.requests().is_empty());
}
