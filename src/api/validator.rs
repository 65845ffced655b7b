// ==========================================
// 植物养护记录系统 - 请求参数校验
// ==========================================
// 职责: 发请求前的必填/格式校验（失败即返回，不触达传输层）
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::HexId;

/// 校验并规范化路径 ID
///
/// # 参数
/// - field: 字段名（用于错误信息）
/// - raw: 原始输入（允许带连字符的 UUID）
pub fn require_id(field: &str, raw: &str) -> ApiResult<HexId> {
    HexId::parse(raw).map_err(|e| ApiError::invalid_id(field, e))
}

/// 校验必填文本，返回去除首尾空白后的值
pub fn require_text(field: &str, raw: &str) -> ApiResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidInput(format!("{}不能为空", field)));
    }
    Ok(trimmed.to_string())
}

/// 校验排序 ID 列表（非空，逐个合法）
pub fn require_id_list(field: &str, raw: &[String]) -> ApiResult<Vec<HexId>> {
    if raw.is_empty() {
        return Err(ApiError::InvalidInput(format!("{}不能为空", field)));
    }
    raw.iter().map(|id| require_id(field, id)).collect()
}
