// ==========================================
// 植物养护记录系统 - 配置层
// ==========================================
// 职责: 客户端配置与用户设置管理
// 存储: 用户配置目录下的 settings.json
// ==========================================

pub mod client_config;
pub mod settings;

// 重导出
pub use client_config::ClientConfig;
pub use settings::{
    config_keys, get_default_settings_path, SettingsError, SettingsManager, UserSettings,
};
