// ==========================================
// 植物养护记录系统 - 位置领域模型
// ==========================================

use serde::{Deserialize, Serialize};

use crate::domain::types::HexId;

/// 位置（房间/窗台等）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub uuid: Option<HexId>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// 新建位置请求
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationCreateRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub sort_order: u32,
}

/// 按名称重命名（原名称不存在时后端会新建）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRenameRequest {
    pub original_name: String,
    pub name: String,
}

/// 位置写操作响应
///
/// POST 返回 {ok, name, created_at}，PUT by-name 返回 {ok, rows_affected, name, created}
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationMutationResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub rows_affected: Option<i64>,
    #[serde(default)]
    pub created: Option<bool>,
}

/// 位置名称规范化: 去首尾空白并折叠内部连续空白
pub fn normalize_location_name(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_location_name() {
        assert_eq!(normalize_location_name("  Living   Room \t"), "Living Room");
        assert_eq!(normalize_location_name("   "), "");
    }
}
