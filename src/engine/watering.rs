// ==========================================
// 植物养护记录系统 - 浇水判定引擎
// ==========================================
// 职责: 计算剩余水分百分比，判定是否需要浇水、是否逾期
// 输入: PlantListItem
// 输出: WateringStatus
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::{parse_timestamp, PlantListItem};

/// 默认浇水阈值（%），适用于大多数室内植物
pub const DEFAULT_WATER_THRESHOLD_PCT: u8 = 40;

/// 剩余水分百分比
///
/// 优先使用后端给出的 water_retained_pct；否则在校准数据齐全时计算
/// (measured − min_dry) / max_water × 100。重量恰好等于干重时取
/// 100 − water_loss_total_pct。
pub fn water_retained_pct(plant: &PlantListItem) -> Option<f64> {
    if let Some(pct) = plant.water_retained_pct {
        return Some(pct);
    }

    let min_dry = plant.min_dry_weight_g?;
    let max_water = plant.max_water_weight_g.filter(|w| *w > 0)?;
    let measured = plant.measured_weight_g?;

    if measured == min_dry {
        return Some(100.0 - plant.water_loss_total_pct.unwrap_or(0.0));
    }

    let pct = (measured - min_dry) as f64 / max_water as f64 * 100.0;
    Some(pct.round())
}

/// 浇水阈值：植物自身推荐值优先，其次默认值
pub fn threshold_pct(plant: &PlantListItem, default_pct: u8) -> f64 {
    plant
        .recommended_water_threshold_pct
        .filter(|t| (0..=100).contains(t))
        .map(|t| t as f64)
        .unwrap_or(default_pct as f64)
}

/// 剩余水分 ≤ 阈值即需要浇水；无法计算时返回 None
pub fn needs_water(plant: &PlantListItem, default_pct: u8) -> Option<bool> {
    water_retained_pct(plant).map(|pct| pct <= threshold_pct(plant, default_pct))
}

// ==========================================
// WateringStatus - 浇水状态
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WateringStatus {
    pub retained_pct: Option<f64>,
    pub threshold_pct: f64,
    pub needs_water: bool,
    pub overdue: bool, // next_watering_at 已过
}

/// 综合判定
pub fn evaluate(plant: &PlantListItem, default_pct: u8, now: NaiveDateTime) -> WateringStatus {
    let retained_pct = water_retained_pct(plant);
    let threshold = threshold_pct(plant, default_pct);
    let overdue = plant
        .next_watering_at
        .as_deref()
        .and_then(parse_timestamp)
        .map_or(false, |next| next <= now);

    WateringStatus {
        retained_pct,
        threshold_pct: threshold,
        needs_water: retained_pct.map_or(false, |pct| pct <= threshold),
        overdue,
    }
}
