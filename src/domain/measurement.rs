// ==========================================
// 植物养护记录系统 - 测量领域模型
// ==========================================
// 对齐: 后端 /measurements 接口
// 约定: 浇水事件 measured_weight_g 为空；称重事件带 measured_weight_g
// ==========================================

use serde::{Deserialize, Serialize};

use crate::domain::types::HexId;

// ==========================================
// MeasurementItem - 植物测量历史行
// ==========================================
// GET /plants/{uuid}/measurements 按 measured_at 倒序返回
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementItem {
    #[serde(default)]
    pub id: Option<HexId>,
    #[serde(default)]
    pub measured_at: Option<String>,
    #[serde(default)]
    pub measured_weight_g: Option<i64>,
    #[serde(default)]
    pub last_dry_weight_g: Option<i64>,
    #[serde(default)]
    pub last_wet_weight_g: Option<i64>,
    #[serde(default)]
    pub water_added_g: Option<i64>,
    #[serde(default)]
    pub water_loss_total_pct: Option<f64>,
    #[serde(default)]
    pub water_loss_total_g: Option<i64>,
    #[serde(default)]
    pub water_loss_day_pct: Option<f64>,
    #[serde(default)]
    pub water_loss_day_g: Option<i64>,
}

impl MeasurementItem {
    /// 是否为浇水事件（无称重值）
    pub fn is_watering(&self) -> bool {
        self.measured_weight_g.is_none()
    }

    /// 该行代表的盆重: 称重值优先，浇水行取浇后湿重
    pub fn effective_weight_g(&self) -> Option<i64> {
        self.measured_weight_g.or(self.last_wet_weight_g)
    }
}

// ==========================================
// MeasurementDetail - 单条测量详情
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementDetail {
    #[serde(default)]
    pub id: Option<HexId>,
    #[serde(default)]
    pub plant_id: Option<HexId>,
    #[serde(default)]
    pub measured_at: Option<String>,
    #[serde(default)]
    pub measured_weight_g: Option<i64>,
    #[serde(default)]
    pub last_dry_weight_g: Option<i64>,
    #[serde(default)]
    pub last_wet_weight_g: Option<i64>,
    #[serde(default)]
    pub water_added_g: Option<i64>,
    #[serde(default)]
    pub water_loss_total_pct: Option<f64>,
    #[serde(default)]
    pub water_loss_total_g: Option<i64>,
    #[serde(default)]
    pub water_loss_day_pct: Option<f64>,
    #[serde(default)]
    pub water_loss_day_g: Option<i64>,
    #[serde(default)]
    pub method_id: Option<HexId>,
    #[serde(default)]
    pub use_last_method: bool,
    #[serde(default)]
    pub scale_id: Option<HexId>,
    #[serde(default)]
    pub note: Option<String>,
}

/// 最近一条测量（用于录入表单预填）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LastMeasurement {
    #[serde(default)]
    pub measured_at: Option<String>,
    #[serde(default)]
    pub measured_weight_g: Option<i64>,
    #[serde(default)]
    pub last_dry_weight_g: Option<i64>,
    #[serde(default)]
    pub last_wet_weight_g: Option<i64>,
    #[serde(default)]
    pub water_added_g: Option<i64>,
    #[serde(default)]
    pub method_id: Option<HexId>,
    #[serde(default)]
    pub scale_id: Option<HexId>,
    #[serde(default)]
    pub note: Option<String>,
}

// ==========================================
// 写请求
// ==========================================

/// 称重/浇水录入请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementCreateRequest {
    pub plant_id: HexId,
    pub measured_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measured_weight_g: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method_id: Option<HexId>,
    #[serde(default)]
    pub use_last_method: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_id: Option<HexId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_dry_weight_g: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_wet_weight_g: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_added_g: Option<i64>,
}

impl MeasurementCreateRequest {
    /// 称重请求
    pub fn weight(plant_id: HexId, measured_at: impl Into<String>, weight_g: i64) -> Self {
        Self {
            plant_id,
            measured_at: measured_at.into(),
            measured_weight_g: Some(weight_g),
            method_id: None,
            use_last_method: false,
            scale_id: None,
            note: None,
            last_dry_weight_g: None,
            last_wet_weight_g: None,
            water_added_g: None,
        }
    }

    /// 浇水请求（按加水量）
    pub fn watering(plant_id: HexId, measured_at: impl Into<String>, water_added_g: i64) -> Self {
        Self {
            plant_id,
            measured_at: measured_at.into(),
            measured_weight_g: None,
            method_id: None,
            use_last_method: false,
            scale_id: None,
            note: None,
            last_dry_weight_g: None,
            last_wet_weight_g: None,
            water_added_g: Some(water_added_g),
        }
    }

    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = note.filter(|n| !n.trim().is_empty());
        self
    }
}

/// 测量更新请求（仅发送变更字段）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementUpdateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measured_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measured_weight_g: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_dry_weight_g: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_wet_weight_g: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_added_g: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method_id: Option<HexId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_last_method: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_id: Option<HexId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl MeasurementUpdateRequest {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// 换盆录入请求
///
/// measured_weight_g: 换盆前称重；last_wet_weight_g: 换盆后重量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepottingCreateRequest {
    pub plant_id: HexId,
    pub measured_at: String,
    pub measured_weight_g: Option<i64>,
    pub last_wet_weight_g: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// 换盆更新请求（后端要求全量必填字段）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepottingUpdateRequest {
    pub plant_id: HexId,
    pub measured_at: String,
    pub measured_weight_g: Option<i64>,
    pub last_wet_weight_g: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

// ==========================================
// 写响应
// ==========================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementMutationData {
    #[serde(default)]
    pub id: Option<HexId>,
    #[serde(default)]
    pub water_loss_total_pct: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementMutationMeta {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// 称重/浇水写入响应 {status, data, meta}
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementMutationResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub data: MeasurementMutationData,
    #[serde(default)]
    pub meta: MeasurementMutationMeta,
}

/// 换盆写入响应
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepottingResponse {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub plant_id: Option<HexId>,
    #[serde(default)]
    pub measured_at: Option<String>,
    #[serde(default)]
    pub measured_weight_g: Option<i64>,
    #[serde(default)]
    pub last_wet_weight_g: Option<i64>,
    #[serde(default)]
    pub water_loss_total_g: Option<i64>,
    #[serde(default)]
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_weight_prefers_measured() {
        let weighed = MeasurementItem {
            measured_weight_g: Some(420),
            last_wet_weight_g: Some(500),
            ..Default::default()
        };
        let watered = MeasurementItem {
            last_wet_weight_g: Some(500),
            ..Default::default()
        };
        assert_eq!(weighed.effective_weight_g(), Some(420));
        assert!(!weighed.is_watering());
        assert_eq!(watered.effective_weight_g(), Some(500));
        assert!(watered.is_watering());
    }

    #[test]
    fn test_watering_request_wire_shape() {
        let plant = HexId::parse(&"ab".repeat(16)).unwrap();
        let req = MeasurementCreateRequest::watering(plant, "2025-01-02 08:00:00", 150)
            .with_note(Some("  ".to_string()));
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["water_added_g"], 150);
        assert_eq!(json["use_last_method"], false);
        assert!(json.get("measured_weight_g").is_none());
        assert!(json.get("note").is_none());
    }

    #[test]
    fn test_mutation_response_parses() {
        let raw = serde_json::json!({
            "status": "success",
            "data": {"id": "11".repeat(16), "water_loss_total_pct": 12.5},
            "meta": {"timestamp": "2025-01-02 08:00:00", "version": "1.0"}
        });
        let resp: MeasurementMutationResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(resp.status, "success");
        assert_eq!(resp.data.water_loss_total_pct, Some(12.5));
    }
}
