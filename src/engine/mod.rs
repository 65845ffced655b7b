// ==========================================
// 植物养护记录系统 - 引擎层
// ==========================================
// 职责: 纯业务逻辑（无网络访问）
// - calibration: 校正种子选择与汇总
// - trend: 重量序列、迷你图、趋势方向
// - watering: 剩余水分与浇水判定
// ==========================================

pub mod calibration;
pub mod trend;
pub mod watering;

// 重导出核心类型
pub use calibration::{
    build_correction_request, select_correction_seed, summarize, summarize_all,
    CalibrationSummary,
};
pub use trend::{weight_series, Sparkline, TrendDirection, DEFAULT_SPARKLINE_POINTS};
pub use watering::{needs_water, water_retained_pct, WateringStatus, DEFAULT_WATER_THRESHOLD_PCT};
