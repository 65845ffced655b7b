// ==========================================
// 植物养护记录系统 - 核心库
// ==========================================
// 技术栈: tokio + reqwest + serde
// 系统定位: 植物养护 REST 后端的类型化客户端与终端前端
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 后端资源 DTO 与基础类型
pub mod domain;

// 引擎层 - 校准种子、趋势、浇水判定
pub mod engine;

// 导入层 - 批量录入表
pub mod importer;

// 配置层 - 客户端配置与用户设置
pub mod config;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - HTTP 客户端与资源接口
pub mod api;

// 表单层 - 受控表单状态
pub mod form;

// 应用层 - 命令函数
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{CorrectionCapMode, HexId, MeasurementKind};

// 领域实体
pub use domain::{
    CalibratingPlant, CalibrationEntry, Location, MeasurementItem, PlantDetail, PlantListItem,
};

// 引擎
pub use engine::{Sparkline, TrendDirection, WateringStatus};

// API
pub use api::{
    AbortController, AbortSignal, ApiClient, ApiError, ApiResult, BulkApi, CalibrationApi,
    DashboardApi, LocationApi, MeasurementApi, PlantApi,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "植物养护记录系统";
