// ==========================================
// 植物养护记录系统 - 导入层
// ==========================================
// 职责: 批量录入表（CSV）解析为 BulkEntry
// ==========================================

pub mod bulk_sheet;
pub mod error;

pub use bulk_sheet::{BulkSheet, BulkSheetParser, REQUIRED_COLUMNS};
pub use error::ImportError;
