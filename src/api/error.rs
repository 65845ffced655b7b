// ==========================================
// 植物养护记录系统 - API层错误类型
// ==========================================
// 职责: 统一网络失败与 HTTP 失败的错误形态
// 约定: 网络失败 status=0；HTTP 失败 status=响应码
// ==========================================

use serde_json::Value;
use thiserror::Error;

use crate::domain::types::HexIdError;
use crate::i18n;

/// API层错误类型
/// 所有错误都必须带可读的 detail，供页面内联或横幅展示
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 传输错误
    // ==========================================
    /// 后端返回非 2xx
    #[error("请求失败 (HTTP {status}): {detail}")]
    Http {
        status: u16,
        detail: String,
        body: Value,
    },

    /// 网络层失败（重试耗尽后）
    #[error("网络错误: {detail}")]
    Network { detail: String },

    /// 请求被取消（页面卸载/导航/Ctrl-C）
    #[error("请求已取消")]
    Aborted,

    // ==========================================
    // 客户端错误
    // ==========================================
    /// 发送前校验失败（缺少必填 ID 等）
    #[error("无效输入: {0}")]
    InvalidInput(String),

    /// 响应体与 DTO 结构不符
    #[error("响应解析失败: {0}")]
    Decode(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// HTTP 状态码；非 HTTP 错误为 0
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Http { status, .. } => *status,
            _ => 0,
        }
    }

    /// 可读的错误说明（不含前缀）
    pub fn detail(&self) -> String {
        match self {
            ApiError::Http { detail, .. } => detail.clone(),
            ApiError::Network { detail } => detail.clone(),
            ApiError::InvalidInput(msg) | ApiError::Decode(msg) => msg.clone(),
            other => other.to_string(),
        }
    }

    /// 400/409/422: 表单字段级冲突
    pub fn is_validation_conflict(&self) -> bool {
        matches!(self.status(), 400 | 409 | 422)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == 404
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, ApiError::Aborted)
    }

    /// 面向用户的本地化消息
    pub fn localized_message(&self) -> String {
        let detail = self.detail();
        match self {
            ApiError::Http { status, .. } => i18n::t_with_args(
                "error.http",
                &[("status", &status.to_string()), ("detail", &detail)],
            ),
            ApiError::Network { .. } => i18n::t_with_args("error.network", &[("detail", &detail)]),
            ApiError::Aborted => i18n::t("common.cancelled"),
            ApiError::InvalidInput(_) => {
                i18n::t_with_args("error.invalid_input", &[("detail", &detail)])
            }
            ApiError::Decode(_) => i18n::t_with_args("error.decode", &[("detail", &detail)]),
            ApiError::Other(_) => detail,
        }
    }

    /// 将 ID 校验错误转换为带字段名的输入错误
    pub fn invalid_id(field: &str, err: HexIdError) -> Self {
        match err {
            HexIdError::Empty => ApiError::InvalidInput(format!("{}不能为空", field)),
            HexIdError::Invalid(raw) => {
                ApiError::InvalidInput(format!("{}格式无效: {}", field, raw))
            }
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

// ==========================================
// 错误详情提取
// ==========================================

/// 从错误响应体中提取 detail
///
/// 优先级: detail（字符串，或 FastAPI 校验数组首项 msg）→ message → 原始文本 → "HTTP <status>"
pub fn extract_detail(status: u16, body: &Value) -> String {
    let from_field = |key: &str| -> Option<String> {
        match body.get(key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Array(items) => items.iter().find_map(|item| {
                item.get("msg")
                    .and_then(Value::as_str)
                    .map(|s| s.to_string())
            }),
            Value::Object(_) | Value::Number(_) | Value::Bool(_) => {
                Some(body.get(key)?.to_string())
            }
            _ => None,
        }
    };

    if let Some(detail) = from_field("detail").or_else(|| from_field("message")) {
        return detail;
    }

    match body {
        Value::String(text) if !text.trim().is_empty() => text.trim().to_string(),
        _ => format!("HTTP {}", status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_detail_prefers_detail_field() {
        let body = json!({"detail": "Plant not found", "message": "ignored"});
        assert_eq!(extract_detail(404, &body), "Plant not found");
    }

    #[test]
    fn test_extract_detail_falls_back_to_message_and_text() {
        assert_eq!(extract_detail(500, &json!({"message": "boom"})), "boom");
        assert_eq!(
            extract_detail(502, &Value::String("Bad Gateway".to_string())),
            "Bad Gateway"
        );
        assert_eq!(extract_detail(503, &Value::Null), "HTTP 503");
    }

    #[test]
    fn test_extract_detail_handles_validation_array() {
        let body = json!({"detail": [{"loc": ["body", "name"], "msg": "field required"}]});
        assert_eq!(extract_detail(422, &body), "field required");
    }

    #[test]
    fn test_status_helpers() {
        let http = ApiError::Http {
            status: 409,
            detail: "Location name already exists".to_string(),
            body: Value::Null,
        };
        assert_eq!(http.status(), 409);
        assert!(http.is_validation_conflict());

        let net = ApiError::Network {
            detail: "connection refused".to_string(),
        };
        assert_eq!(net.status(), 0);
        assert!(!net.is_validation_conflict());
        assert_eq!(net.detail(), "connection refused");
    }

    #[test]
    fn test_invalid_id_message_names_field() {
        let err = ApiError::invalid_id("植物ID", HexIdError::Empty);
        match err {
            ApiError::InvalidInput(msg) => assert!(msg.contains("植物ID")),
            _ => panic!("Expected InvalidInput"),
        }
    }
}
