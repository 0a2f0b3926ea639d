//! 时间工具模块
//!
//! 后端与日历输入框使用的时间格式并不统一：
//! - 后端返回带时区的 RFC 3339 (`2025-03-01T08:00:00Z`) 或不带时区的 ISO 字符串
//! - `<input type="datetime-local">` 产生 `2025-03-01T08:00`
//! - `<input type="date">` 产生 `2025-03-01`
//!
//! 这里统一解析为 `NaiveDateTime`（带时区的值换算为 UTC）。

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// 解析任意受支持格式的时间字符串
///
/// 返回 `None` 如果无法解析
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// 用于界面显示的时间：`2025-03-01 08:00`，无法解析时原样返回，空值显示 `-`
pub fn display_datetime(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        None | Some("") => "-".to_string(),
        Some(s) => parse_datetime(s)
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| s.to_string()),
    }
}

/// 仅日期部分 (`2025-03-01`)，用于日历按天分组
pub fn date_key(raw: &str) -> Option<String> {
    parse_datetime(raw).map(|dt| dt.format("%Y-%m-%d").to_string())
}

/// 转换为 `datetime-local` 输入框可接受的值
pub fn to_input_value(raw: &str) -> String {
    parse_datetime(raw)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_and_input_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        assert_eq!(parse_datetime("2025-03-01T08:00:00Z"), Some(expected));
        assert_eq!(parse_datetime("2025-03-01T15:00:00+07:00"), Some(expected));
        assert_eq!(parse_datetime("2025-03-01T08:00:00"), Some(expected));
        assert_eq!(parse_datetime("2025-03-01T08:00:00.000"), Some(expected));
        assert_eq!(parse_datetime("2025-03-01T08:00"), Some(expected));
        assert_eq!(
            parse_datetime("2025-03-01"),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_datetime("tomorrow"), None);
        assert_eq!(parse_datetime("  "), None);
    }

    #[test]
    fn display_falls_back_to_raw_text() {
        assert_eq!(display_datetime(Some("2025-03-01T08:00:00Z")), "2025-03-01 08:00");
        assert_eq!(display_datetime(Some("soon")), "soon");
        assert_eq!(display_datetime(None), "-");
        assert_eq!(to_input_value("2025-03-01"), "2025-03-01T00:00");
        assert_eq!(date_key("2025-03-01T23:10"), Some("2025-03-01".to_string()));
    }
}
