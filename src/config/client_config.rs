// ==========================================
// 植物养护记录系统 - 客户端配置
// ==========================================
// 职责: 后端地址、超时、默认请求头、重试策略
// 来源: 用户设置 + 环境变量覆写
// ==========================================

use std::time::Duration;

use crate::api::client::RetryPolicy;
use crate::config::settings::UserSettings;

/// 环境变量: 覆写后端地址
pub const ENV_API_URL: &str = "PLANT_CARE_API_URL";
/// 环境变量: Bearer 令牌（可选）
pub const ENV_API_TOKEN: &str = "PLANT_CARE_API_TOKEN";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub headers: Vec<(String, String)>,
    pub retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_settings(&UserSettings::default())
    }
}

impl ClientConfig {
    /// 仅由设置构造（不读环境变量）
    pub fn from_settings(settings: &UserSettings) -> Self {
        Self {
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            timeout_secs: settings.request_timeout_secs,
            headers: Vec::new(),
            retry: RetryPolicy::default(),
        }
    }

    /// 由设置构造，并应用环境变量覆写
    pub fn from_settings_and_env(settings: &UserSettings) -> Self {
        let mut config = Self::from_settings(settings);

        if let Ok(url) = std::env::var(ENV_API_URL) {
            let trimmed = url.trim();
            if !trimmed.is_empty() {
                tracing::info!("使用环境变量 {} 指定的后端地址: {}", ENV_API_URL, trimmed);
                config.base_url = trimmed.trim_end_matches('/').to_string();
            }
        }

        if let Ok(token) = std::env::var(ENV_API_TOKEN) {
            let trimmed = token.trim();
            if !trimmed.is_empty() {
                config
                    .headers
                    .push(("authorization".to_string(), format!("Bearer {}", trimmed)));
            }
        }

        config
    }

    /// 单独指定后端地址（测试/脚本用）
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_settings_trims_trailing_slash() {
        let settings = UserSettings {
            api_base_url: "http://example.test/api/".to_string(),
            request_timeout_secs: 0,
            ..Default::default()
        };
        let config = ClientConfig::from_settings(&settings);
        assert_eq!(config.base_url, "http://example.test/api");
        assert_eq!(config.timeout(), Duration::from_secs(1));
        assert_eq!(config.retry, RetryPolicy::default());
    }
}
