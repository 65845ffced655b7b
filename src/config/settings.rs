// ==========================================
// 植物养护记录系统 - 用户设置管理器
// ==========================================
// 职责: 设置加载、查询、修改、快照与恢复
// 存储: JSON 文件（默认 <config_dir>/plant-care/settings.json）
// ==========================================

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

use crate::i18n;

// ==========================================
// 设置键
// ==========================================
pub mod config_keys {
    // 界面
    pub const LOCALE: &str = "locale";

    // 后端
    pub const API_BASE_URL: &str = "api_base_url";
    pub const REQUEST_TIMEOUT_SECS: &str = "request_timeout_secs";

    // 驾驶舱
    pub const SPARKLINE_POINTS: &str = "sparkline_points";
    pub const DASHBOARD_CONCURRENCY: &str = "dashboard_concurrency";
    pub const DEFAULT_WATER_THRESHOLD_PCT: &str = "default_water_threshold_pct";

    // 批量录入
    pub const BULK_CONCURRENCY: &str = "bulk_concurrency";

    pub const ALL: &[&str] = &[
        LOCALE,
        API_BASE_URL,
        REQUEST_TIMEOUT_SECS,
        SPARKLINE_POINTS,
        DASHBOARD_CONCURRENCY,
        DEFAULT_WATER_THRESHOLD_PCT,
        BULK_CONCURRENCY,
    ];
}

/// 默认后端地址
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";

// ==========================================
// SettingsError
// ==========================================
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("设置文件读写失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("设置文件格式错误: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("未知设置项: {0}")]
    UnknownKey(String),

    #[error("设置项 {key} 的值无效: {message}")]
    InvalidValue { key: String, message: String },

    #[error("锁获取失败: {0}")]
    Lock(String),
}

// ==========================================
// UserSettings
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub locale: String,
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub sparkline_points: usize,
    pub dashboard_concurrency: usize,
    pub default_water_threshold_pct: u8,
    pub bulk_concurrency: usize,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            locale: i18n::DEFAULT_LOCALE.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: 10,
            sparkline_points: 12,
            dashboard_concurrency: 4,
            default_water_threshold_pct: 40,
            bulk_concurrency: 4,
        }
    }
}

impl UserSettings {
    /// 读取单项（统一以字符串返回）
    pub fn get(&self, key: &str) -> Result<String, SettingsError> {
        let value = match key {
            config_keys::LOCALE => self.locale.clone(),
            config_keys::API_BASE_URL => self.api_base_url.clone(),
            config_keys::REQUEST_TIMEOUT_SECS => self.request_timeout_secs.to_string(),
            config_keys::SPARKLINE_POINTS => self.sparkline_points.to_string(),
            config_keys::DASHBOARD_CONCURRENCY => self.dashboard_concurrency.to_string(),
            config_keys::DEFAULT_WATER_THRESHOLD_PCT => {
                self.default_water_threshold_pct.to_string()
            }
            config_keys::BULK_CONCURRENCY => self.bulk_concurrency.to_string(),
            other => return Err(SettingsError::UnknownKey(other.to_string())),
        };
        Ok(value)
    }

    /// 修改单项（带校验）
    pub fn set(&mut self, key: &str, raw: &str) -> Result<(), SettingsError> {
        let value = raw.trim();
        match key {
            config_keys::LOCALE => {
                if !i18n::is_supported_locale(value) {
                    return Err(invalid(
                        key,
                        format!(
                            "不支持的语言 {}（可选: {}）",
                            value,
                            i18n::available_locales().join(", ")
                        ),
                    ));
                }
                self.locale = value.to_string();
            }
            config_keys::API_BASE_URL => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    return Err(invalid(key, "必须以 http:// 或 https:// 开头".to_string()));
                }
                self.api_base_url = value.trim_end_matches('/').to_string();
            }
            config_keys::REQUEST_TIMEOUT_SECS => {
                self.request_timeout_secs = parse_in_range(key, value, 1, 300)? as u64;
            }
            config_keys::SPARKLINE_POINTS => {
                self.sparkline_points = parse_in_range(key, value, 2, 90)? as usize;
            }
            config_keys::DASHBOARD_CONCURRENCY => {
                self.dashboard_concurrency = parse_in_range(key, value, 1, 16)? as usize;
            }
            config_keys::DEFAULT_WATER_THRESHOLD_PCT => {
                self.default_water_threshold_pct = parse_in_range(key, value, 0, 100)? as u8;
            }
            config_keys::BULK_CONCURRENCY => {
                self.bulk_concurrency = parse_in_range(key, value, 1, 16)? as usize;
            }
            other => return Err(SettingsError::UnknownKey(other.to_string())),
        }
        Ok(())
    }

    /// 全部设置的键值视图
    pub fn to_map(&self) -> BTreeMap<String, String> {
        config_keys::ALL
            .iter()
            .filter_map(|k| self.get(k).ok().map(|v| (k.to_string(), v)))
            .collect()
    }
}

fn invalid(key: &str, message: String) -> SettingsError {
    SettingsError::InvalidValue {
        key: key.to_string(),
        message,
    }
}

fn parse_in_range(key: &str, value: &str, min: i64, max: i64) -> Result<i64, SettingsError> {
    let parsed: i64 = value
        .parse()
        .map_err(|_| invalid(key, format!("应为整数，实际为 {}", value)))?;
    if parsed < min || parsed > max {
        return Err(invalid(key, format!("超出范围 [{}, {}]", min, max)));
    }
    Ok(parsed)
}

// ==========================================
// SettingsManager
// ==========================================
pub struct SettingsManager {
    path: PathBuf,
    settings: Mutex<UserSettings>,
}

impl SettingsManager {
    /// 从指定路径加载；文件不存在时使用默认值（不写盘）
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let settings = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                UserSettings::default()
            } else {
                serde_json::from_str(&raw)?
            }
        } else {
            tracing::debug!("设置文件不存在，使用默认值: {}", path.display());
            UserSettings::default()
        };

        Ok(Self {
            path,
            settings: Mutex::new(settings),
        })
    }

    /// 从默认路径加载
    pub fn load_default() -> Result<Self, SettingsError> {
        Self::load(get_default_settings_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 当前设置的副本
    pub fn current(&self) -> Result<UserSettings, SettingsError> {
        let guard = self
            .settings
            .lock()
            .map_err(|e| SettingsError::Lock(e.to_string()))?;
        Ok(guard.clone())
    }

    pub fn get(&self, key: &str) -> Result<String, SettingsError> {
        self.current()?.get(key)
    }

    /// 修改单项并写盘；写盘失败时内存中的设置保持不变
    pub fn set(&self, key: &str, value: &str) -> Result<UserSettings, SettingsError> {
        let updated = {
            let mut guard = self
                .settings
                .lock()
                .map_err(|e| SettingsError::Lock(e.to_string()))?;
            let mut draft = guard.clone();
            draft.set(key, value)?;
            self.write(&draft)?;
            *guard = draft.clone();
            draft
        };

        tracing::info!("设置已更新: {}={}", key, value);
        Ok(updated)
    }

    /// 写盘
    pub fn save(&self) -> Result<(), SettingsError> {
        self.write(&self.current()?)
    }

    fn write(&self, settings: &UserSettings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(settings)?)?;
        Ok(())
    }

    /// 设置快照（JSON）
    pub fn snapshot(&self) -> Result<String, SettingsError> {
        let map: BTreeMap<String, Value> = self
            .current()?
            .to_map()
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        Ok(serde_json::to_string(&map)?)
    }

    /// 从快照恢复，逐项校验；返回恢复的项数
    ///
    /// 未知键跳过（兼容旧版本快照），任一值无效则整体不生效
    pub fn restore(&self, snapshot_json: &str) -> Result<usize, SettingsError> {
        let map: BTreeMap<String, Value> = serde_json::from_str(snapshot_json)?;

        let mut count = 0;
        {
            let mut guard = self
                .settings
                .lock()
                .map_err(|e| SettingsError::Lock(e.to_string()))?;
            let mut draft = guard.clone();
            for (key, value) in map.iter() {
                if !config_keys::ALL.contains(&key.as_str()) {
                    continue;
                }
                let raw = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                draft.set(key, &raw)?;
                count += 1;
            }
            self.write(&draft)?;
            *guard = draft;
        }

        Ok(count)
    }
}

/// 默认设置文件路径
///
/// 优先环境变量 PLANT_CARE_SETTINGS_PATH，其次用户配置目录
pub fn get_default_settings_path() -> PathBuf {
    if let Ok(path) = std::env::var("PLANT_CARE_SETTINGS_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }

    match dirs::config_dir() {
        Some(dir) => dir.join("plant-care").join("settings.json"),
        None => PathBuf::from("./plant-care-settings.json"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let manager = SettingsManager::load(dir.path().join("settings.json")).unwrap();
        assert_eq!(manager.current().unwrap(), UserSettings::default());
        assert_eq!(manager.get(config_keys::SPARKLINE_POINTS).unwrap(), "12");
        assert!(!manager.path().exists());

        manager.save().unwrap();
        let reloaded = SettingsManager::load(manager.path()).unwrap();
        assert_eq!(reloaded.current().unwrap(), UserSettings::default());
    }

    #[test]
    fn test_set_persists_and_reloads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let manager = SettingsManager::load(&path).unwrap();

        manager.set(config_keys::BULK_CONCURRENCY, "8").unwrap();
        manager
            .set(config_keys::API_BASE_URL, "https://plants.example/api/")
            .unwrap();

        let reloaded = SettingsManager::load(&path).unwrap();
        let settings = reloaded.current().unwrap();
        assert_eq!(settings.bulk_concurrency, 8);
        assert_eq!(settings.api_base_url, "https://plants.example/api");
    }

    #[test]
    fn test_set_rejects_invalid_values() {
        let mut settings = UserSettings::default();
        assert!(matches!(
            settings.set(config_keys::SPARKLINE_POINTS, "1"),
            Err(SettingsError::InvalidValue { .. })
        ));
        assert!(matches!(
            settings.set(config_keys::API_BASE_URL, "ftp://x"),
            Err(SettingsError::InvalidValue { .. })
        ));
        assert!(matches!(
            settings.set(config_keys::LOCALE, "fr"),
            Err(SettingsError::InvalidValue { .. })
        ));
        assert!(matches!(
            settings.set("no_such_key", "1"),
            Err(SettingsError::UnknownKey(_))
        ));
        assert_eq!(settings, UserSettings::default());
    }

    #[test]
    fn test_snapshot_restore_roundtrip_skips_unknown_keys() {
        let dir = TempDir::new().unwrap();
        let manager = SettingsManager::load(dir.path().join("s.json")).unwrap();
        manager.set(config_keys::SPARKLINE_POINTS, "30").unwrap();
        let snapshot = manager.snapshot().unwrap();

        manager.set(config_keys::SPARKLINE_POINTS, "5").unwrap();

        let mut map: BTreeMap<String, Value> = serde_json::from_str(&snapshot).unwrap();
        map.insert("__legacy".to_string(), Value::from(1));
        let restored = manager
            .restore(&serde_json::to_string(&map).unwrap())
            .unwrap();

        assert_eq!(restored, config_keys::ALL.len());
        assert_eq!(manager.current().unwrap().sparkline_points, 30);
    }

    #[test]
    fn test_failed_write_keeps_previous_value() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let manager = SettingsManager::load(blocker.join("settings.json")).unwrap();

        assert!(manager.set(config_keys::SPARKLINE_POINTS, "30").is_err());
        assert_eq!(manager.current().unwrap().sparkline_points, 12);

        let snapshot = r#"{"sparkline_points": "20"}"#;
        assert!(manager.restore(snapshot).is_err());
        assert_eq!(manager.current().unwrap().sparkline_points, 12);
    }

    #[test]
    fn test_restore_is_all_or_nothing() {
        let dir = TempDir::new().unwrap();
        let manager = SettingsManager::load(dir.path().join("s.json")).unwrap();
        let bad = r#"{"sparkline_points": "20", "bulk_concurrency": "999"}"#;
        assert!(manager.restore(bad).is_err());
        assert_eq!(manager.current().unwrap().sparkline_points, 12);
    }
}
