// ==========================================
// 植物养护记录系统 - 校准校正引擎
// ==========================================
// 职责: 从 max_water_retained 条目中选出欠水最严重的一次浇水，
//       作为校正窗口起点（from_ts）
// 输入: CalibrationEntry 列表
// 输出: 种子条目 / 汇总 / CorrectionRequest
// ==========================================
// 权威的校正算法在后端，这里只负责选种子和组装请求
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::domain::{
    parse_timestamp, to_backend_format, CalibratingPlant, CalibrationEntry, CorrectionCapMode,
    CorrectionRequest, HexId,
};

// ==========================================
// 种子选择
// ==========================================

/// 选择校正种子
///
/// 规则:
/// 1. 仅考虑 under_g 已知且 > 0 的条目
/// 2. under_g 最大者胜出
/// 3. under_g 相同时取 measured_at 最新者（无法解析的时间视为最旧）
///
/// 没有欠水条目时返回 None
pub fn select_correction_seed(entries: &[CalibrationEntry]) -> Option<&CalibrationEntry> {
    entries
        .iter()
        .filter(|e| e.under_g.map_or(false, |g| g > 0))
        .max_by(|a, b| compare_seed(a, b))
}

fn compare_seed(a: &CalibrationEntry, b: &CalibrationEntry) -> Ordering {
    a.under_g
        .cmp(&b.under_g)
        .then_with(|| entry_time(a).cmp(&entry_time(b)))
}

fn entry_time(entry: &CalibrationEntry) -> Option<NaiveDateTime> {
    entry.measured_at.as_deref().and_then(parse_timestamp)
}

/// 由种子组装校正请求
///
/// from_ts 取种子的测量时间（规范化为后端格式），to_ts 不设上限
pub fn build_correction_request(
    plant_id: HexId,
    seed: &CalibrationEntry,
    cap: CorrectionCapMode,
    edit_last_wet: bool,
) -> CorrectionRequest {
    let from_ts = seed.measured_at.as_deref().map(|raw| {
        parse_timestamp(raw)
            .map(|dt| to_backend_format(&dt))
            .unwrap_or_else(|| raw.trim().to_string())
    });

    CorrectionRequest {
        cap,
        edit_last_wet,
        from_ts,
        to_ts: None,
        ..CorrectionRequest::new(plant_id)
    }
}

// ==========================================
// CalibrationSummary - 单株校准汇总
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSummary {
    pub plant_id: Option<HexId>,
    pub plant_name: String,
    pub entry_count: usize,       // max_water_retained 条目数
    pub under_count: usize,       // under_g > 0 的条目数
    pub worst_under_g: Option<i64>,
    pub worst_under_pct: Option<f64>,
    pub mean_under_pct: Option<f64>,
    pub seed_measured_at: Option<String>,
}

impl CalibrationSummary {
    pub fn needs_correction(&self) -> bool {
        self.under_count > 0
    }
}

/// 汇总单株植物的欠水情况
pub fn summarize(plant: &CalibratingPlant) -> CalibrationSummary {
    let entries = &plant.calibration.max_water_retained;
    let seed = select_correction_seed(entries);

    let pcts: Vec<f64> = entries.iter().filter_map(|e| e.under_pct).collect();
    let mean_under_pct = if pcts.is_empty() {
        None
    } else {
        Some(round1(pcts.iter().sum::<f64>() / pcts.len() as f64))
    };

    CalibrationSummary {
        plant_id: plant.plant.uuid.clone(),
        plant_name: plant.plant.name.clone(),
        entry_count: entries.len(),
        under_count: entries
            .iter()
            .filter(|e| e.under_g.map_or(false, |g| g > 0))
            .count(),
        worst_under_g: seed.and_then(|s| s.under_g),
        worst_under_pct: seed.and_then(|s| s.under_pct),
        mean_under_pct,
        seed_measured_at: seed.and_then(|s| s.measured_at.clone()),
    }
}

/// 汇总全部待校准植物，欠水最严重的排在前面
pub fn summarize_all(plants: &[CalibratingPlant]) -> Vec<CalibrationSummary> {
    let mut summaries: Vec<CalibrationSummary> = plants.iter().map(summarize).collect();
    summaries.sort_by(|a, b| b.worst_under_g.cmp(&a.worst_under_g));
    summaries
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
