// タイムスタンプの整形とパース

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

/// ISO 8601形式（ミリ秒精度、UTCの`Z`付き）に整形
///
/// 例: `2025-01-15T09:30:00.000Z`
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// UTCの日付部分（`YYYY-MM-DD`）
pub fn utc_date(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

/// 日時文字列をパースする
///
/// RFC 3339形式、または`YYYY-MM-DD`（UTC 0時として扱う）を受け付ける。
pub fn parse_datetime(input: &str) -> Option<DateTime<Utc>> {
    let trimmed = input.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
