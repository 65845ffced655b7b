// ==========================================
// 植物养护记录系统 - 字段校验器
// ==========================================
// 校验器签名: (字段显示名, 当前值) -> Option<错误消息>
// 除 required 外，空值一律视为通过（可选字段）
// ==========================================

use std::sync::Arc;

use crate::domain::{parse_timestamp, HexId};
use crate::i18n::t_with_args;

/// 字段校验器
pub type Validator = Arc<dyn Fn(&str, &str) -> Option<String> + Send + Sync>;

fn message(key: &str, label: &str) -> String {
    t_with_args(key, &[("field", label)])
}

pub fn required() -> Validator {
    Arc::new(|label, value| {
        if value.trim().is_empty() {
            Some(message("validation.required", label))
        } else {
            None
        }
    })
}

/// 最大字符数（按 Unicode 字符计，去首尾空白后）
pub fn max_len(max: usize) -> Validator {
    Arc::new(move |label, value| {
        if value.trim().chars().count() > max {
            Some(t_with_args(
                "validation.max_len",
                &[("field", label), ("max", &max.to_string())],
            ))
        } else {
            None
        }
    })
}

pub fn non_negative_int() -> Validator {
    Arc::new(|label, value| match parse_int(value) {
        None => None,
        Some(Ok(v)) if v >= 0 => None,
        Some(_) => Some(message("validation.non_negative_int", label)),
    })
}

pub fn positive_int() -> Validator {
    Arc::new(|label, value| match parse_int(value) {
        None => None,
        Some(Ok(v)) if v > 0 => None,
        Some(_) => Some(message("validation.positive_int", label)),
    })
}

pub fn decimal_min(min: f64) -> Validator {
    Arc::new(move |label, value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() && v >= min => None,
            _ => Some(t_with_args(
                "validation.decimal_min",
                &[("field", label), ("min", &min.to_string())],
            )),
        }
    })
}

pub fn hex_id() -> Validator {
    Arc::new(|label, value| {
        if value.trim().is_empty() || HexId::parse(value).is_ok() {
            None
        } else {
            Some(message("validation.hex_id", label))
        }
    })
}

pub fn datetime() -> Validator {
    Arc::new(|label, value| {
        if value.trim().is_empty() || parse_timestamp(value).is_some() {
            None
        } else {
            Some(message("validation.datetime", label))
        }
    })
}

/// 解析整数；空值返回 None
pub fn parse_int(value: &str) -> Option<Result<i64, std::num::ParseIntError>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.parse::<i64>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::{set_locale, tests::LOCALE_TEST_LOCK};

    #[test]
    fn test_required_and_max_len() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        set_locale("en");
        assert_eq!(required()("Name", "  "), Some("Name is required".to_string()));
        assert_eq!(required()("Name", "Fern"), None);
        assert_eq!(max_len(3)("Name", " abc "), None);
        assert_eq!(
            max_len(3)("Name", "abcd"),
            Some("Name must be at most 3 characters".to_string())
        );
        set_locale("zh-CN");
    }

    #[test]
    fn test_numeric_validators_skip_empty() {
        assert!(non_negative_int()("W", "").is_none());
        assert!(non_negative_int()("W", "0").is_none());
        assert!(non_negative_int()("W", "-1").is_some());
        assert!(non_negative_int()("W", "1.5").is_some());
        assert!(positive_int()("W", "0").is_some());
        assert!(positive_int()("W", "12").is_none());
        assert!(decimal_min(0.5)("EC", "0.5").is_none());
        assert!(decimal_min(0.5)("EC", "0.4").is_some());
        assert!(decimal_min(0.0)("EC", "abc").is_some());
    }

    #[test]
    fn test_hex_id_and_datetime() {
        assert!(hex_id()("Plant", &"ab".repeat(16)).is_none());
        assert!(hex_id()("Plant", "xyz").is_some());
        assert!(datetime()("At", "2025-01-01 10:00").is_none());
        assert!(datetime()("At", "tomorrow").is_some());
        assert!(datetime()("At", "").is_none());
    }
}
