use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::config::SettingsError;
use crate::form::{FormError, FormState, FormValues};
use crate::importer::ImportError;

// ==========================================
// 公共工具：错误映射、序列化、表单填充
// ==========================================

/// 错误响应（输出到 stderr）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// 错误代码
    pub code: String,

    /// 错误消息（已本地化）
    pub message: String,

    /// HTTP 状态码；非 HTTP 错误为 0
    pub status: u16,

    /// 详细信息（可选）
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            status: 0,
            details: None,
        }
    }

    pub fn into_json(self) -> String {
        serde_json::to_string(&self).unwrap_or_else(|_| self.message.clone())
    }
}

/// 将ApiError转换为JSON字符串
pub fn map_api_error(err: ApiError) -> String {
    let status = err.status();
    let code = match &err {
        ApiError::Http { .. } if err.is_not_found() => "NOT_FOUND",
        ApiError::Http { .. } if err.is_validation_conflict() => "VALIDATION_ERROR",
        ApiError::Http { .. } => "HTTP_ERROR",
        ApiError::Network { .. } => "NETWORK_ERROR",
        ApiError::Aborted => "ABORTED",
        ApiError::InvalidInput(_) => "INVALID_INPUT",
        ApiError::Decode(_) => "DECODE_ERROR",
        ApiError::Other(_) => "OTHER_ERROR",
    };
    let details = match &err {
        ApiError::Http { body, .. } if !body.is_null() => Some(body.clone()),
        _ => None,
    };

    ErrorResponse {
        code: code.to_string(),
        message: err.localized_message(),
        status,
        details,
    }
    .into_json()
}

pub fn map_settings_error(err: SettingsError) -> String {
    let code = match &err {
        SettingsError::UnknownKey(_) => "UNKNOWN_SETTING",
        SettingsError::InvalidValue { .. } => "INVALID_SETTING",
        _ => "SETTINGS_ERROR",
    };
    let message = crate::i18n::t_with_args("error.settings", &[("detail", &err.to_string())]);
    ErrorResponse::new(code, message).into_json()
}

/// 导入错误的本地化说明
pub(super) fn import_error_message(err: &ImportError) -> String {
    use crate::i18n::t_with_args;
    match err {
        ImportError::FileNotFound(path) => t_with_args("import.file_not_found", &[("path", path)]),
        ImportError::MissingColumn(column) => {
            t_with_args("import.missing_column", &[("column", column)])
        }
        ImportError::InvalidField {
            row,
            field,
            message,
        } => t_with_args(
            "import.bad_row",
            &[
                ("row", &row.to_string()),
                ("detail", &format!("{}: {}", field, message)),
            ],
        ),
        other => t_with_args("error.import", &[("detail", &other.to_string())]),
    }
}

pub(super) fn map_import_error(err: ImportError) -> String {
    let mut response = ErrorResponse::new("IMPORT_ERROR", import_error_message(&err));
    if let Some(row) = err.row() {
        response.details = Some(serde_json::json!({ "row": row }));
    }
    response.into_json()
}

/// 表单提交失败
///
/// 字段级错误放进 details.fields，横幅消息放进 message
pub(super) fn map_form_error(err: FormError, form: &FormState) -> String {
    match err {
        FormError::Api(api) if form.errors().is_empty() => map_api_error(api),
        FormError::Api(api) => ErrorResponse {
            code: "VALIDATION_ERROR".to_string(),
            message: api.detail(),
            status: api.status(),
            details: Some(serde_json::json!({ "fields": form.errors() })),
        }
        .into_json(),
        FormError::Invalid(fields) => {
            let mut response = ErrorResponse::new(
                "FORM_INVALID",
                form.general_error()
                    .map(str::to_string)
                    .unwrap_or_else(|| crate::i18n::t("form.invalid")),
            );
            response.details = Some(serde_json::json!({ "fields": fields }));
            response.into_json()
        }
        FormError::UnknownField(name) => {
            ErrorResponse::new("INVALID_INPUT", format!("未知字段: {}", name)).into_json()
        }
    }
}

/// 表单值里转换失败（校验器已放行但解析失败）归一为输入错误
pub(super) fn form_to_api_error(err: FormError) -> ApiError {
    match err {
        FormError::Api(api) => api,
        other => ApiError::InvalidInput(other.to_string()),
    }
}

/// 把命令参数写入表单
pub(super) fn fill_form(form: &mut FormState, values: &FormValues) -> Result<(), String> {
    for (name, value) in values {
        form.set_value(name, value.clone())
            .map_err(|e| map_form_error(e, form))?;
    }
    Ok(())
}

pub(super) fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| {
        ErrorResponse::new("SERIALIZE_ERROR", format!("序列化失败: {}", e)).into_json()
    })
}
