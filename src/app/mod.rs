// ==========================================
// 植物养护记录系统 - 应用层
// ==========================================
// 职责: 共享状态与命令函数，连接终端前端与 API 层
// ==========================================

pub mod commands;
pub mod state;

// 重导出
pub use commands::{map_api_error, ErrorResponse};
pub use state::AppState;
