use crate::api::{AbortSignal, Dashboard};
use crate::app::state::AppState;
use crate::i18n::t;

use super::common::{map_api_error, to_json};

// ==========================================
// 驾驶舱命令
// ==========================================

/// 加载驾驶舱；points 覆盖设置中的迷你图点数
pub async fn load_dashboard(
    state: &AppState,
    points: Option<usize>,
    signal: Option<AbortSignal>,
) -> Result<String, String> {
    let dashboard = fetch(state, points, signal).await?;
    to_json(&dashboard)
}

/// 加载驾驶舱并渲染为终端文本
pub async fn load_dashboard_text(
    state: &AppState,
    points: Option<usize>,
    signal: Option<AbortSignal>,
) -> Result<String, String> {
    let dashboard = fetch(state, points, signal).await?;
    Ok(render_dashboard(&dashboard))
}

async fn fetch(
    state: &AppState,
    points: Option<usize>,
    signal: Option<AbortSignal>,
) -> Result<Dashboard, String> {
    let mut options = state.dashboard_options();
    if let Some(points) = points {
        options = options.with_points(points);
    }
    state
        .dashboard_api
        .load(options, signal)
        .await
        .map_err(map_api_error)
}

/// 每株一行: 名称、迷你图、趋势、最新重量、保水率与提示
pub fn render_dashboard(dashboard: &Dashboard) -> String {
    if dashboard.cards.is_empty() {
        return t("dashboard.no_plants");
    }

    let name_width = dashboard
        .cards
        .iter()
        .map(|c| c.plant.name.chars().count())
        .max()
        .unwrap_or(0);

    let mut lines = Vec::with_capacity(dashboard.cards.len());
    for card in &dashboard.cards {
        let mut line = format!("{:<width$}  ", card.plant.name, width = name_width);

        if card.history_error.is_some() {
            line.push_str(&t("dashboard.history_unavailable"));
        } else {
            line.push_str(&card.sparkline.glyphs);
            line.push(' ');
            line.push_str(card.sparkline.direction.arrow());
            if let Some(latest) = card.sparkline.latest_g() {
                line.push_str(&format!(" {}g", latest));
            }
        }

        if let Some(pct) = card.watering.retained_pct {
            line.push_str(&format!("  {:.0}%", pct));
        }
        if card.watering.overdue {
            line.push_str(&format!("  [{}]", t("dashboard.overdue")));
        } else if card.watering.needs_water {
            line.push_str(&format!("  [{}]", t("dashboard.needs_water")));
        }
        lines.push(line);
    }
    lines.join("\n")
}
