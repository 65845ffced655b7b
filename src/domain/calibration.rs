// ==========================================
// 植物养护记录系统 - 校准领域模型
// ==========================================
// 对齐: GET /measurements/calibrating、POST /measurements/corrections
// ==========================================

use serde::{Deserialize, Serialize};

use crate::domain::plant::PlantListItem;
use crate::domain::types::{CorrectionCapMode, HexId};

// ==========================================
// CalibrationEntry - 校准条目
// ==========================================
// 一次浇水事件相对饱和目标（min_dry + max_water）的欠水情况
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationEntry {
    #[serde(default)]
    pub id: Option<HexId>,
    #[serde(default)]
    pub measured_at: Option<String>,
    #[serde(default)]
    pub water_added_g: Option<i64>,
    #[serde(default)]
    pub last_wet_weight_g: Option<i64>,
    #[serde(default)]
    pub target_weight_g: Option<i64>,
    #[serde(default)]
    pub under_g: Option<i64>,    // max(0, max_water - water_added)
    #[serde(default)]
    pub under_pct: Option<f64>,  // under_g / max_water * 100
}

/// 单株植物的两类校准结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlantCalibration {
    #[serde(default)]
    pub max_water_retained: Vec<CalibrationEntry>,
    #[serde(default)]
    pub min_dry_weight: Vec<CalibrationEntry>,
}

/// 待校准植物（列表项 + 校准结果）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibratingPlant {
    #[serde(flatten)]
    pub plant: PlantListItem,
    #[serde(default)]
    pub calibration: PlantCalibration,
}

// ==========================================
// 校正请求/响应
// ==========================================

fn default_edit_last_wet() -> bool {
    true
}

/// 校正请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionRequest {
    pub plant_id: HexId,
    #[serde(default)]
    pub cap: CorrectionCapMode,
    #[serde(default = "default_edit_last_wet")]
    pub edit_last_wet: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_ts: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_ts: Option<String>,
}

impl CorrectionRequest {
    pub fn new(plant_id: HexId) -> Self {
        Self {
            plant_id,
            cap: CorrectionCapMode::default(),
            edit_last_wet: default_edit_last_wet(),
            from_ts: None,
            to_ts: None,
        }
    }
}

/// 校正结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrectionResult {
    #[serde(default)]
    pub updated: i64,
    #[serde(default)]
    pub total_excess_g: Option<i64>,
}
