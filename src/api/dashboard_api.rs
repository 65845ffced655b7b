// ==========================================
// 植物养护记录系统 - 驾驶舱 API
// ==========================================
// 职责: 植物列表 + 各株测量历史 → 驾驶舱卡片（迷你图、浇水状态）
// 并发: 历史查询有界并发，结果保持植物列表顺序
// 降级: 单株历史失败只影响该卡片（history_error），不影响整体
// ==========================================

use chrono::{NaiveDateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::abort::AbortSignal;
use crate::api::error::{ApiError, ApiResult};
use crate::api::plant_api::PlantApi;
use crate::config::UserSettings;
use crate::domain::{to_backend_format, MeasurementItem, PlantListItem};
use crate::engine::trend::Sparkline;
use crate::engine::watering::{self, WateringStatus};

// ==========================================
// 数据结构
// ==========================================

/// 驾驶舱加载参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashboardOptions {
    pub points: usize,
    pub concurrency: usize,
    pub default_threshold_pct: u8,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self::from_settings(&UserSettings::default())
    }
}

impl DashboardOptions {
    pub fn from_settings(settings: &UserSettings) -> Self {
        Self {
            points: settings.sparkline_points,
            concurrency: settings.dashboard_concurrency,
            default_threshold_pct: settings.default_water_threshold_pct,
        }
    }

    pub fn with_points(mut self, points: usize) -> Self {
        self.points = points;
        self
    }
}

/// 单株植物卡片
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantCard {
    pub plant: PlantListItem,
    pub sparkline: Sparkline,
    pub watering: WateringStatus,
    pub history_error: Option<String>,
}

/// 驾驶舱
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub generated_at: String,
    pub cards: Vec<PlantCard>,
    pub needs_water_count: usize,
    pub overdue_count: usize,
    pub degraded_count: usize,
}

// ==========================================
// DashboardApi - 驾驶舱 API
// ==========================================
pub struct DashboardApi {
    plant_api: Arc<PlantApi>,
}

impl DashboardApi {
    pub fn new(plant_api: Arc<PlantApi>) -> Self {
        Self { plant_api }
    }

    /// 加载驾驶舱
    ///
    /// # 返回
    /// - Err: 植物列表查询失败，或被取消
    /// - Ok(Dashboard): 历史查询失败的卡片已降级
    pub async fn load(
        &self,
        options: DashboardOptions,
        signal: Option<AbortSignal>,
    ) -> ApiResult<Dashboard> {
        let plants = self.plant_api.list(signal.clone()).await?;
        let now = Utc::now().naive_utc();
        let concurrency = options.concurrency.max(1);

        tracing::debug!(plants = plants.len(), concurrency, "加载驾驶舱");

        let outcomes: Vec<(PlantListItem, ApiResult<Vec<MeasurementItem>>)> =
            stream::iter(plants.into_iter().map(|plant| {
                let signal = signal.clone();
                async move {
                    let history = match &plant.uuid {
                        Some(id) => self.plant_api.list_measurements(id.as_str(), signal).await,
                        None => Ok(Vec::new()),
                    };
                    (plant, history)
                }
            }))
            .buffered(concurrency)
            .collect()
            .await;

        let mut cards = Vec::with_capacity(outcomes.len());
        for (plant, history) in outcomes {
            let card = match history {
                Err(ApiError::Aborted) => return Err(ApiError::Aborted),
                Err(e) => {
                    tracing::warn!(plant = %plant.name, "测量历史加载失败，卡片降级: {}", e);
                    build_card(plant, &[], Some(e.detail()), &options, now)
                }
                Ok(items) => build_card(plant, &items, None, &options, now),
            };
            cards.push(card);
        }

        Ok(Dashboard {
            generated_at: to_backend_format(&now),
            needs_water_count: cards.iter().filter(|c| c.watering.needs_water).count(),
            overdue_count: cards.iter().filter(|c| c.watering.overdue).count(),
            degraded_count: cards.iter().filter(|c| c.history_error.is_some()).count(),
            cards,
        })
    }
}

/// 组装单张卡片
pub fn build_card(
    plant: PlantListItem,
    history: &[MeasurementItem],
    history_error: Option<String>,
    options: &DashboardOptions,
    now: NaiveDateTime,
) -> PlantCard {
    let watering = watering::evaluate(&plant, options.default_threshold_pct, now);
    PlantCard {
        sparkline: Sparkline::from_history(history, options.points),
        watering,
        history_error,
        plant,
    }
}
