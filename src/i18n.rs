// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库，词条位于 locales/*.yml
// 支持中文（默认）和英文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

/// 默认语言
pub const DEFAULT_LOCALE: &str = "zh-CN";

const SUPPORTED_LOCALES: &[&str] = &["zh-CN", "en"];

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 可选语言列表
pub fn available_locales() -> Vec<&'static str> {
    SUPPORTED_LOCALES.to_vec()
}

pub fn is_supported_locale(locale: &str) -> bool {
    SUPPORTED_LOCALES.contains(&locale)
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"zh-CN" 或 "en"）
///
/// # 返回
/// 不支持的语言返回 false，当前语言保持不变
pub fn set_locale(locale: &str) -> bool {
    if !is_supported_locale(locale) {
        tracing::warn!("不支持的语言: {}", locale);
        return false;
    }
    rust_i18n::set_locale(locale);
    true
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use plant_care_client::i18n::t;
/// let msg = t("common.success");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use plant_care_client::i18n::t_with_args;
/// let msg = t_with_args("validation.required", &[("field", "Name")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}
