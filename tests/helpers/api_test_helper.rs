// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 组装脚本化传输 + 应用状态，提供常用响应体
// ==========================================

#![allow(dead_code)]

use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;

use plant_care_client::api::{ApiClient, RetryPolicy};
use plant_care_client::app::AppState;
use plant_care_client::config::{ClientConfig, SettingsManager};

use super::mock_transport::MockTransport;

pub const BASE_URL: &str = "http://mock.test/api";

pub const PLANT_A: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
pub const PLANT_B: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
pub const PLANT_C: &str = "cccccccccccccccccccccccccccccccc";
pub const LOCATION_A: &str = "dddddddddddddddddddddddddddddddd";
pub const MEASUREMENT_A: &str = "eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee";

/// API测试环境
pub struct ApiTestEnv {
    pub transport: Arc<MockTransport>,
    pub client: Arc<ApiClient>,
    pub state: AppState,
    _settings_dir: TempDir,
}

impl ApiTestEnv {
    /// GET 最多 3 次，重试无等待
    pub fn new() -> Self {
        Self::with_config(ClientConfig::with_base_url(BASE_URL).with_retry(RetryPolicy::without_delays(3)))
    }

    pub fn with_config(config: ClientConfig) -> Self {
        plant_care_client::logging::init_test();
        let dir = TempDir::new().expect("无法创建临时目录");
        let settings =
            SettingsManager::load(dir.path().join("settings.json")).expect("无法加载设置");
        let transport = MockTransport::new(BASE_URL);
        let state = AppState::with_transport(settings, &config, transport.clone());

        Self {
            client: state.client.clone(),
            transport,
            state,
            _settings_dir: dir,
        }
    }
}

// ==========================================
// 响应体构造
// ==========================================

pub fn plant_json(uuid: &str, name: &str) -> Value {
    json!({
        "id": 1,
        "uuid": uuid,
        "name": name,
        "min_dry_weight_g": 400,
        "max_water_weight_g": 200,
    })
}

pub fn plant_detail_json(uuid: &str, name: &str) -> Value {
    json!({
        "id": 1,
        "uuid": uuid,
        "name": name,
        "notes": "east window",
        "species": "Ficus elastica",
        "min_dry_weight_g": 400,
        "max_water_weight_g": 200,
        "location_id": LOCATION_A,
        "created_at": "2025-01-05 10:00:00",
    })
}

/// 测量历史（后端按时间倒序返回）
pub fn history_json(weights: &[i64]) -> Value {
    let items: Vec<Value> = weights
        .iter()
        .enumerate()
        .rev()
        .map(|(day, w)| {
            json!({
                "id": format!("{:032x}", day + 1),
                "measured_at": format!("2025-03-{:02} 08:00:00", day + 1),
                "measured_weight_g": w,
            })
        })
        .collect();
    Value::Array(items)
}

pub fn ok_json() -> Value {
    json!({"ok": true})
}

pub fn measurement_created_json(id: &str) -> Value {
    json!({
        "status": "success",
        "data": {"id": id, "water_loss_total_pct": 12.5},
        "meta": {"timestamp": "2025-03-01T08:00:00Z", "version": "1.0"},
    })
}
