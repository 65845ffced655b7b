// ==========================================
// 植物养护记录系统 - 应用命令（按域拆分）
// ==========================================
// 职责: 连接终端前端与 API 层
// 约定: 成功返回 JSON 字符串；失败返回 ErrorResponse 的 JSON 字符串
// ==========================================

mod bulk;
mod calibration;
mod common;
mod dashboard;
mod locations;
mod measurements;
mod plants;
mod settings;

pub use bulk::*;
pub use calibration::*;
pub use common::{map_api_error, map_settings_error, ErrorResponse};
pub use dashboard::*;
pub use locations::*;
pub use measurements::*;
pub use plants::*;
pub use settings::*;
