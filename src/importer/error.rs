// ==========================================
// 植物养护记录系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 表头错误 =====
    #[error("缺少列: {0}")]
    MissingColumn(String),

    // ===== 行级错误 =====
    #[error("字段无效 (行 {row}, 字段 {field}): {message}")]
    InvalidField {
        row: usize,
        field: String,
        message: String,
    },
}

impl ImportError {
    /// 行级错误的行号
    pub fn row(&self) -> Option<usize> {
        match self {
            ImportError::InvalidField { row, .. } => Some(*row),
            _ => None,
        }
    }
}

impl From<csv::Error> for ImportError {
    fn from(e: csv::Error) -> Self {
        ImportError::CsvParseError(e.to_string())
    }
}

impl From<std::io::Error> for ImportError {
    fn from(e: std::io::Error) -> Self {
        ImportError::FileReadError(e.to_string())
    }
}
