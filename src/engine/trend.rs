// ==========================================
// 植物养护记录系统 - 趋势与迷你图引擎
// ==========================================
// 职责: 由测量历史生成重量序列、迷你图与趋势方向
// 输入: MeasurementItem 列表（任意顺序）
// 输出: Sparkline
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::{parse_timestamp, MeasurementItem};

/// 八级迷你图字符
pub const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// 默认点数
pub const DEFAULT_SPARKLINE_POINTS: usize = 12;

/// 判定为平稳的相对变化阈值（%）
pub const FLAT_THRESHOLD_PCT: f64 = 2.0;

// ==========================================
// TrendDirection - 趋势方向
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Rising,
    Falling,
    #[default]
    Flat,
}

impl TrendDirection {
    pub fn arrow(&self) -> &'static str {
        match self {
            TrendDirection::Rising => "↑",
            TrendDirection::Falling => "↓",
            TrendDirection::Flat => "→",
        }
    }
}

// ==========================================
// Sparkline - 迷你图
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sparkline {
    pub points: Vec<i64>,          // 时间正序的重量（克）
    pub glyphs: String,            // 渲染结果
    pub min_g: Option<i64>,
    pub max_g: Option<i64>,
    pub direction: TrendDirection,
    pub change_pct: Option<f64>,   // 首尾相对变化
}

impl Sparkline {
    /// 由测量历史构造
    ///
    /// # 参数
    /// - history: 测量历史（后端按时间倒序返回，这里会重新排序）
    /// - max_points: 保留最近的点数（至少 2）
    pub fn from_history(history: &[MeasurementItem], max_points: usize) -> Self {
        let series = weight_series(history);
        let keep = max_points.max(2);
        let start = series.len().saturating_sub(keep);
        Self::from_points(series[start..].to_vec())
    }

    /// 由时间正序的重量点构造
    pub fn from_points(points: Vec<i64>) -> Self {
        if points.is_empty() {
            return Self::default();
        }

        let min = points.iter().copied().min().unwrap_or_default();
        let max = points.iter().copied().max().unwrap_or_default();
        let glyphs = render(&points, min, max);
        let (direction, change_pct) = direction_of(&points);

        Self {
            glyphs,
            min_g: Some(min),
            max_g: Some(max),
            direction,
            change_pct,
            points,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn latest_g(&self) -> Option<i64> {
        self.points.last().copied()
    }
}

/// 时间正序的有效重量序列
///
/// 称重行取 measured_weight_g，浇水行回退到 last_wet_weight_g；
/// 两者皆无的行跳过。时间无法解析的行排在最前（保持原相对顺序）。
pub fn weight_series(history: &[MeasurementItem]) -> Vec<i64> {
    let mut rows: Vec<(Option<NaiveDateTime>, i64)> = history
        .iter()
        .filter_map(|m| {
            let weight = m.effective_weight_g()?;
            let at = m.measured_at.as_deref().and_then(parse_timestamp);
            Some((at, weight))
        })
        .collect();
    rows.sort_by_key(|(at, _)| *at);
    rows.into_iter().map(|(_, w)| w).collect()
}

fn render(points: &[i64], min: i64, max: i64) -> String {
    let range = max - min;
    if range == 0 {
        return std::iter::repeat(SPARK_LEVELS[3])
            .take(points.len())
            .collect();
    }

    let top = (SPARK_LEVELS.len() - 1) as f64;
    points
        .iter()
        .map(|&p| {
            let level = ((p - min) as f64 / range as f64 * top).round() as usize;
            SPARK_LEVELS[level.min(SPARK_LEVELS.len() - 1)]
        })
        .collect()
}

fn direction_of(points: &[i64]) -> (TrendDirection, Option<f64>) {
    let (first, last) = match (points.first(), points.last()) {
        (Some(&f), Some(&l)) if points.len() >= 2 => (f, l),
        _ => return (TrendDirection::Flat, None),
    };

    if first == 0 {
        let direction = match last.cmp(&0) {
            std::cmp::Ordering::Greater => TrendDirection::Rising,
            std::cmp::Ordering::Less => TrendDirection::Falling,
            std::cmp::Ordering::Equal => TrendDirection::Flat,
        };
        return (direction, None);
    }

    let change = (last - first) as f64 / first.abs() as f64 * 100.0;
    let direction = if change >= FLAT_THRESHOLD_PCT {
        TrendDirection::Rising
    } else if change <= -FLAT_THRESHOLD_PCT {
        TrendDirection::Falling
    } else {
        TrendDirection::Flat
    };
    (direction, Some((change * 10.0).round() / 10.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weigh(at: &str, g: i64) -> MeasurementItem {
        MeasurementItem {
            measured_at: Some(at.to_string()),
            measured_weight_g: Some(g),
            ..Default::default()
        }
    }

    fn water(at: &str, wet: i64) -> MeasurementItem {
        MeasurementItem {
            measured_at: Some(at.to_string()),
            last_wet_weight_g: Some(wet),
            water_added_g: Some(100),
            ..Default::default()
        }
    }

    #[test]
    fn test_series_is_chronological_and_uses_wet_weight_for_watering() {
        // 后端倒序
        let history = vec![
            weigh("2025-01-04 08:00:00", 520),
            water("2025-01-03 08:00:00", 600),
            weigh("2025-01-02 08:00:00", 480),
            MeasurementItem::default(),
        ];
        assert_eq!(weight_series(&history), vec![480, 600, 520]);
    }

    #[test]
    fn test_sparkline_levels_span_min_to_max() {
        let line = Sparkline::from_points(vec![100, 200, 300, 400, 500, 600, 700, 800]);
        assert_eq!(line.glyphs, "▁▂▃▄▅▆▇█");
        assert_eq!(line.min_g, Some(100));
        assert_eq!(line.max_g, Some(800));
        assert_eq!(line.direction, TrendDirection::Rising);
    }

    #[test]
    fn test_sparkline_keeps_last_n_points() {
        let history: Vec<MeasurementItem> = (1..=20)
            .map(|d| weigh(&format!("2025-01-{:02} 08:00:00", d), 400 + d))
            .collect();
        let line = Sparkline::from_history(&history, 5);
        assert_eq!(line.points, vec![416, 417, 418, 419, 420]);
        assert_eq!(line.latest_g(), Some(420));
    }

    #[test]
    fn test_flat_series_renders_mid_level() {
        let line = Sparkline::from_points(vec![500, 500, 500]);
        assert_eq!(line.glyphs, "▄▄▄");
        assert_eq!(line.direction, TrendDirection::Flat);
        assert_eq!(line.change_pct, Some(0.0));
    }

    #[test]
    fn test_direction_threshold() {
        // +1% 视为平稳，-5% 为下降
        assert_eq!(Sparkline::from_points(vec![1000, 1010]).direction, TrendDirection::Flat);
        assert_eq!(Sparkline::from_points(vec![1000, 950]).direction, TrendDirection::Falling);
        assert_eq!(Sparkline::from_points(vec![1000, 1020]).direction, TrendDirection::Rising);
    }

    #[test]
    fn test_empty_and_single_point() {
        assert!(Sparkline::from_history(&[], 12).is_empty());
        let single = Sparkline::from_points(vec![42]);
        assert_eq!(single.glyphs, "▄");
        assert_eq!(single.direction, TrendDirection::Flat);
        assert_eq!(single.change_pct, None);
    }
}
