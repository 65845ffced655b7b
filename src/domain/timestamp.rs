// ==========================================
// 植物养护记录系统 - 时间戳解析
// ==========================================
// 后端时间字段为字符串: "YYYY-MM-DD HH:MM:SS"（测量记录）
// 或 ISO 形式 "YYYY-MM-DDTHH:MM:SS[.ffffff]"（列表/详情）
// ==========================================

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// 宽松解析后端时间字符串
///
/// 依次尝试: 无时区格式 → RFC3339（转为 UTC）→ 纯日期（当天 00:00）
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// 规范为后端写入格式（"T" 替换为空格，秒级精度）
pub fn to_backend_format(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backend_variants() {
        let a = parse_timestamp("2025-01-02 03:04:05").unwrap();
        let b = parse_timestamp("2025-01-02T03:04:05").unwrap();
        let c = parse_timestamp("2025-01-02T03:04:05.123456").unwrap();
        assert_eq!(a, b);
        assert_eq!(to_backend_format(&c), "2025-01-02 03:04:05");
    }

    #[test]
    fn test_parse_rfc3339_and_date_only() {
        let dt = parse_timestamp("2025-01-02T03:04:05+02:00").unwrap();
        assert_eq!(to_backend_format(&dt), "2025-01-02 01:04:05");

        let d = parse_timestamp("2025-01-02").unwrap();
        assert_eq!(to_backend_format(&d), "2025-01-02 00:00:00");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("bogus-ts").is_none());
    }
}
