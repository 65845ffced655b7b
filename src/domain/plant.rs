// ==========================================
// 植物养护记录系统 - 植物领域模型
// ==========================================
// 对齐: 后端 /plants 接口的列表项、详情与请求体
// 说明: 纯透传 DTO，客户端不做权威状态维护
// ==========================================

use serde::{Deserialize, Serialize};

use crate::domain::types::HexId;

// ==========================================
// PlantListItem - 植物列表项
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantListItem {
    // ===== 标识 =====
    #[serde(default)]
    pub id: i64, // 后端生成的序号（仅用于展示）
    #[serde(default)]
    pub uuid: Option<HexId>,
    pub name: String,

    // ===== 描述 =====
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub identify_hint: Option<String>,

    // ===== 位置 =====
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub location_id: Option<HexId>,

    // ===== 校准参数 =====
    #[serde(default)]
    pub min_dry_weight_g: Option<i64>,
    #[serde(default)]
    pub max_water_weight_g: Option<i64>,
    #[serde(default)]
    pub recommended_water_threshold_pct: Option<i64>,

    // ===== 最新状态 =====
    #[serde(default)]
    pub latest_at: Option<String>,
    #[serde(default)]
    pub measured_weight_g: Option<i64>,
    #[serde(default)]
    pub water_loss_total_pct: Option<f64>,
    #[serde(default)]
    pub water_retained_pct: Option<f64>,

    // ===== 浇水节奏 =====
    #[serde(default)]
    pub frequency_days: Option<i64>,
    #[serde(default)]
    pub next_watering_at: Option<String>,
}

// ==========================================
// PlantDetail - 植物详情
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantDetail {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub uuid: Option<HexId>,
    pub name: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub min_dry_weight_g: Option<i64>,
    #[serde(default)]
    pub max_water_weight_g: Option<i64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub location_id: Option<HexId>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub water_loss_total_pct: Option<f64>,
}

// ==========================================
// PlantCreateRequest - 新建植物
// ==========================================
// 只有 name 必填，其余字段为空时不发送
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlantCreateRequest {
    // ===== 基本信息 =====
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plant_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identify_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typical_action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<HexId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,

    // ===== 服务 =====
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_measurement_method_id: Option<HexId>,

    // ===== 养护 =====
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_water_threshold_pct: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biomass_weight_g: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biomass_last_at: Option<String>,

    // ===== 高级 =====
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub botanical_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cultivar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substrate_type_id: Option<HexId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substrate_last_refresh_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fertilized_last_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fertilizer_ec_ms: Option<f64>,

    // ===== 健康 =====
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light_level_id: Option<HexId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pest_status_id: Option<HexId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_status_id: Option<HexId>,

    // ===== 计算值 =====
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_dry_weight_g: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_water_weight_g: Option<i64>,
}

// ==========================================
// PlantUpdateRequest - 更新植物
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlantUpdateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<HexId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_measurement_method_id: Option<HexId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub botanical_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cultivar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substrate_type_id: Option<HexId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substrate_last_refresh_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fertilized_last_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fertilizer_ec_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_dry_weight_g: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_water_weight_g: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light_level_id: Option<HexId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pest_status_id: Option<HexId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_status_id: Option<HexId>,
}

/// 创建植物的响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantCreatedResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub id: Option<HexId>,
    #[serde(default)]
    pub uuid: Option<HexId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// 拖拽排序请求（/plants/order、/locations/order 共用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub ordered_ids: Vec<HexId>,
}

/// 通用确认响应 {"ok": true}
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OkResponse {
    #[serde(default)]
    pub ok: bool,
}
