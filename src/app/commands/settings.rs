use std::collections::BTreeMap;

use crate::app::state::AppState;
use crate::config::config_keys;
use crate::i18n;

use super::common::{map_settings_error, to_json};

// ==========================================
// 设置相关命令
// ==========================================

/// 全部设置项
pub fn get_settings(state: &AppState) -> Result<String, String> {
    let settings = state.settings.current().map_err(map_settings_error)?;
    to_json(&settings.to_map())
}

pub fn get_setting(state: &AppState, key: &str) -> Result<String, String> {
    let value = state.settings.get(key).map_err(map_settings_error)?;
    to_json(&BTreeMap::from([(key.to_string(), value)]))
}

/// 修改设置并写盘；修改 locale 时立即切换界面语言
///
/// 后端地址与超时在下次启动时生效
pub fn set_setting(state: &AppState, key: &str, value: &str) -> Result<String, String> {
    let updated = state.settings.set(key, value).map_err(map_settings_error)?;
    if key == config_keys::LOCALE {
        i18n::set_locale(&updated.locale);
    }
    to_json(&updated.to_map())
}

/// 导出设置快照
pub fn snapshot_settings(state: &AppState) -> Result<String, String> {
    state.settings.snapshot().map_err(map_settings_error)
}

/// 从快照恢复设置；返回恢复的项数
pub fn restore_settings(state: &AppState, snapshot_json: &str) -> Result<String, String> {
    let restored = state
        .settings
        .restore(snapshot_json)
        .map_err(map_settings_error)?;
    if let Ok(current) = state.settings.current() {
        i18n::set_locale(&current.locale);
    }
    to_json(&serde_json::json!({ "restored": restored }))
}

/// 可选语言
pub fn list_locales() -> Result<String, String> {
    to_json(&serde_json::json!({
        "current": i18n::current_locale(),
        "available": i18n::available_locales(),
    }))
}
