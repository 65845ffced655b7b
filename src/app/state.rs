// ==========================================
// 植物养护记录系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::Arc;

use crate::api::{
    ApiClient, BulkApi, CalibrationApi, DashboardApi, DashboardOptions, HttpTransport, LocationApi,
    MeasurementApi, PlantApi,
};
use crate::config::{ClientConfig, SettingsManager};

/// 应用状态
///
/// 包含所有API实例和共享资源，命令函数以 `&AppState` 访问
pub struct AppState {
    /// 用户设置
    pub settings: Arc<SettingsManager>,

    /// 共享 HTTP 客户端
    pub client: Arc<ApiClient>,

    pub plant_api: Arc<PlantApi>,
    pub location_api: Arc<LocationApi>,
    pub measurement_api: Arc<MeasurementApi>,
    pub calibration_api: Arc<CalibrationApi>,

    /// 驾驶舱API
    pub dashboard_api: Arc<DashboardApi>,

    /// 批量录入API
    pub bulk_api: Arc<BulkApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// 客户端配置取自用户设置，环境变量可覆盖后端地址和令牌
    pub fn new(settings: SettingsManager) -> Result<Self, String> {
        let current = settings
            .current()
            .map_err(|e| format!("读取设置失败: {}", e))?;
        let config = ClientConfig::from_settings_and_env(&current);
        let client = ApiClient::new(&config).map_err(|e| format!("初始化HTTP客户端失败: {}", e))?;

        tracing::info!(base_url = %client.base_url(), "应用状态初始化");
        Ok(Self::assemble(settings, client))
    }

    /// 使用自定义传输创建（测试与嵌入场景）
    pub fn with_transport(
        settings: SettingsManager,
        config: &ClientConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self::assemble(settings, ApiClient::with_transport(config, transport))
    }

    fn assemble(settings: SettingsManager, client: ApiClient) -> Self {
        let client = Arc::new(client);
        let plant_api = Arc::new(PlantApi::new(client.clone()));
        let measurement_api = Arc::new(MeasurementApi::new(client.clone()));

        Self {
            settings: Arc::new(settings),
            location_api: Arc::new(LocationApi::new(client.clone())),
            calibration_api: Arc::new(CalibrationApi::new(client.clone())),
            dashboard_api: Arc::new(DashboardApi::new(plant_api.clone())),
            bulk_api: Arc::new(BulkApi::new(measurement_api.clone())),
            plant_api,
            measurement_api,
            client,
        }
    }

    /// 按当前设置生成驾驶舱参数；设置不可读时用默认值
    pub fn dashboard_options(&self) -> DashboardOptions {
        match self.settings.current() {
            Ok(s) => DashboardOptions::from_settings(&s),
            Err(e) => {
                tracing::warn!("读取设置失败，驾驶舱使用默认参数: {}", e);
                DashboardOptions::default()
            }
        }
    }

    /// 批量录入并发数
    pub fn bulk_concurrency(&self) -> usize {
        self.settings
            .current()
            .map(|s| s.bulk_concurrency)
            .unwrap_or(4)
    }
}
