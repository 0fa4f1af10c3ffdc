// スポンサー枠の予約
//
// 週単位の掲載枠を予約し、管理者の承認後にサイト上へ表示する。
// 料金は枠ごとの週額 × 週数から期間割引を差し引いたもの。

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use super::json_value::{lenient_i64, non_empty_str, JsonObject};
use super::timestamp::{iso_timestamp, parse_datetime};

/// スポンサーテーブルのキー属性
pub const SPONSOR_KEY: &str = "sponsorId";

/// ステータス検索用のGSI名
pub const STATUS_INDEX: &str = "StatusIndex";

/// 承認待ち（作成時）
pub const SPONSOR_STATUS_PENDING: &str = "pending";

/// 掲載中
pub const SPONSOR_STATUS_ACTIVE: &str = "active";

/// 掲載枠（レスポンスではこの順で全枠を返す）
pub const SPONSOR_SLOTS: [&str; 5] = ["top", "bottom", "left", "right", "creator"];

/// 掲載終了後にレコードを残す日数（TTL）
const RETENTION_DAYS: i64 = 30;

/// 予約できる最長の週数（10年）
pub const MAX_DURATION_WEEKS: i64 = 520;

/// スポンサー予約エラー
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SponsorError {
    #[error("Missing required fields")]
    MissingFields,

    #[error("Invalid startDate")]
    InvalidStartDate,

    #[error("duration must be between 1 and 520 weeks")]
    InvalidDuration,
}

/// 枠ごとの週額
pub fn base_price(slot: &str) -> f64 {
    match slot {
        "top" => 199.0,
        "bottom" => 129.0,
        "creator" => 299.0,
        _ => 99.0,
    }
}

/// 週数に応じた割引率
pub fn duration_discount(weeks: i64) -> f64 {
    match weeks {
        2 => 0.10,
        4 => 0.20,
        8 => 0.30,
        _ => 0.0,
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 予約の見積もり
#[derive(Debug, Clone, PartialEq)]
pub struct BookingQuote {
    pub base_price: f64,
    pub discount: f64,
    pub total_price: f64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// DynamoDB TTL（UNIX秒）
    pub ttl: i64,
}

impl BookingQuote {
    /// 終了日が表現できない期間は`InvalidDuration`
    pub fn new(slot: &str, start_date: DateTime<Utc>, weeks: i64) -> Result<Self, SponsorError> {
        if !(1..=MAX_DURATION_WEEKS).contains(&weeks) {
            return Err(SponsorError::InvalidDuration);
        }
        let end_date = weeks
            .checked_mul(7)
            .and_then(TimeDelta::try_days)
            .and_then(|period| start_date.checked_add_signed(period))
            .ok_or(SponsorError::InvalidDuration)?;

        let base_price = base_price(slot);
        let discount = duration_discount(weeks);

        Ok(Self {
            base_price,
            discount,
            total_price: round_cents(base_price * weeks as f64 * (1.0 - discount)),
            start_date,
            end_date,
            ttl: end_date.timestamp() + RETENTION_DAYS * 24 * 60 * 60,
        })
    }
}

/// スポンサー予約レコード
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SponsorBooking {
    pub sponsor_id: String,
    pub company: String,
    pub email: Option<String>,
    pub slot: String,
    pub start_date: String,
    pub end_date: String,
    pub duration: i64,
    pub base_price: f64,
    pub discount: f64,
    pub total_price: f64,
    pub image_url: String,
    pub target_url: String,
    pub status: String,
    pub views: i64,
    pub clicks: i64,
    pub created_at: String,
    pub ttl: i64,
}

impl SponsorBooking {
    /// リクエストボディから承認待ちの予約を作成
    ///
    /// `company`・`slot`・`startDate`・`duration`は必須。
    pub fn create(body: &JsonObject, sponsor_id: String, now: DateTime<Utc>) -> Result<Self, SponsorError> {
        let company = non_empty_str(body, "company").ok_or(SponsorError::MissingFields)?;
        let slot = non_empty_str(body, "slot").ok_or(SponsorError::MissingFields)?;
        let start_raw = non_empty_str(body, "startDate").ok_or(SponsorError::MissingFields)?;
        let weeks = lenient_i64(body.get("duration")).ok_or(SponsorError::MissingFields)?;

        if !(1..=MAX_DURATION_WEEKS).contains(&weeks) {
            return Err(SponsorError::InvalidDuration);
        }
        let start_date = parse_datetime(start_raw).ok_or(SponsorError::InvalidStartDate)?;
        let quote = BookingQuote::new(slot, start_date, weeks)?;

        Ok(Self {
            sponsor_id,
            company: company.to_string(),
            email: non_empty_str(body, "email").map(str::to_string),
            slot: slot.to_string(),
            start_date: iso_timestamp(quote.start_date),
            end_date: iso_timestamp(quote.end_date),
            duration: weeks,
            base_price: quote.base_price,
            discount: quote.discount,
            total_price: quote.total_price,
            image_url: non_empty_str(body, "imageUrl").unwrap_or_default().to_string(),
            target_url: non_empty_str(body, "targetUrl").unwrap_or_default().to_string(),
            status: SPONSOR_STATUS_PENDING.to_string(),
            views: 0,
            clicks: 0,
            created_at: iso_timestamp(now),
            ttl: quote.ttl,
        })
    }
}

/// 掲載期間内か（`startDate <= now <= endDate`）
fn is_running(item: &JsonObject, now: DateTime<Utc>) -> bool {
    let start = non_empty_str(item, "startDate").and_then(parse_datetime);
    let end = non_empty_str(item, "endDate").and_then(parse_datetime);

    matches!((start, end), (Some(start), Some(end)) if start <= now && now <= end)
}

/// 掲載中のスポンサーを枠ごとにまとめる
///
/// 各枠は最初に見つかった1件のみ。空き枠は`null`。
/// 未知の枠名のスポンサーも最初の1件は含める。
pub fn group_active_by_slot(items: &[JsonObject], now: DateTime<Utc>) -> JsonObject {
    let mut sponsors: JsonObject = SPONSOR_SLOTS
        .iter()
        .map(|slot| (slot.to_string(), Value::Null))
        .collect();

    for item in items.iter().filter(|item| is_running(item, now)) {
        let Some(slot) = non_empty_str(item, "slot") else {
            continue;
        };
        if sponsors.get(slot).is_some_and(|v| !v.is_null()) {
            continue;
        }

        sponsors.insert(
            slot.to_string(),
            json!({
                "sponsorId": item.get("sponsorId"),
                "company": item.get("company"),
                "imageUrl": item.get("imageUrl"),
                "targetUrl": item.get("targetUrl"),
                "slot": slot,
                "startDate": item.get("startDate"),
                "endDate": item.get("endDate"),
            }),
        );
    }

    sponsors
}

/// 計測対象のインタラクション
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackedInteraction {
    View,
    Click,
}

impl TrackedInteraction {
    /// パスの末尾セグメントから判定
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "view" => Some(Self::View),
            "click" => Some(Self::Click),
            _ => None,
        }
    }

    /// 統計テーブルに記録するイベント種別
    pub fn event_type(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Click => "click",
        }
    }

    /// スポンサーレコードのカウンタ属性
    pub fn counter_field(self) -> &'static str {
        match self {
            Self::View => "views",
            Self::Click => "clicks",
        }
    }

    /// 統計テーブルの行を作成
    pub fn stats_row(
        self,
        sponsor_id: &str,
        user_agent: Option<&str>,
        ip: Option<&str>,
        at: DateTime<Utc>,
    ) -> JsonObject {
        let mut row = JsonObject::new();
        row.insert(SPONSOR_KEY.to_string(), json!(sponsor_id));
        row.insert("timestamp".to_string(), json!(at.timestamp_millis()));
        row.insert("eventType".to_string(), json!(self.event_type()));
        row.insert("userAgent".to_string(), json!(user_agent.unwrap_or("unknown")));
        row.insert("ip".to_string(), json!(ip.unwrap_or("unknown")));
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn body(value: Value) -> JsonObject {
        value.as_object().unwrap().clone()
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    // ==================== 料金 ====================

    #[test]
    fn test_base_price_per_slot() {
        assert_eq!(base_price("top"), 199.0);
        assert_eq!(base_price("bottom"), 129.0);
        assert_eq!(base_price("creator"), 299.0);
        assert_eq!(base_price("left"), 99.0);
        assert_eq!(base_price("anything"), 99.0);
    }

    #[test]
    fn test_duration_discount() {
        assert_eq!(duration_discount(1), 0.0);
        assert_eq!(duration_discount(2), 0.10);
        assert_eq!(duration_discount(3), 0.0);
        assert_eq!(duration_discount(4), 0.20);
        assert_eq!(duration_discount(8), 0.30);
    }

    #[test]
    fn test_quote_four_weeks_top() {
        let quote = BookingQuote::new("top", at(2025, 3, 1), 4).unwrap();

        // 199 * 4 * 0.8
        assert_eq!(quote.total_price, 636.8);
        assert_eq!(quote.end_date, at(2025, 3, 29));
        assert_eq!(quote.ttl, at(2025, 4, 28).timestamp());
    }

    #[test]
    fn test_quote_eight_weeks_is_rounded_to_cents() {
        let quote = BookingQuote::new("bottom", at(2025, 1, 1), 8).unwrap();

        // 129 * 8 * 0.7 = 722.4
        assert_eq!(quote.total_price, 722.4);
    }

    #[test]
    fn test_quote_rejects_out_of_range_duration() {
        assert_eq!(BookingQuote::new("top", at(2025, 1, 1), 0), Err(SponsorError::InvalidDuration));
        assert_eq!(
            BookingQuote::new("top", at(2025, 1, 1), MAX_DURATION_WEEKS + 1),
            Err(SponsorError::InvalidDuration)
        );
        assert_eq!(BookingQuote::new("top", at(2025, 1, 1), i64::MAX), Err(SponsorError::InvalidDuration));
        assert!(BookingQuote::new("top", at(2025, 1, 1), MAX_DURATION_WEEKS).is_ok());
    }

    // ==================== 予約作成 ====================

    #[test]
    fn test_create_booking() {
        let booking = SponsorBooking::create(
            &body(json!({
                "company": "ACME",
                "email": "ads@acme.test",
                "slot": "creator",
                "startDate": "2025-05-01",
                "duration": 2
            })),
            "sponsor_1".to_string(),
            at(2025, 4, 1),
        )
        .unwrap();

        assert_eq!(booking.status, SPONSOR_STATUS_PENDING);
        assert_eq!(booking.views, 0);
        assert_eq!(booking.clicks, 0);
        assert_eq!(booking.total_price, 538.2);
        assert_eq!(booking.start_date, "2025-05-01T00:00:00.000Z");
        assert_eq!(booking.end_date, "2025-05-15T00:00:00.000Z");
        assert_eq!(booking.image_url, "");
    }

    #[test]
    fn test_create_booking_accepts_string_duration() {
        let booking = SponsorBooking::create(
            &body(json!({"company": "A", "slot": "top", "startDate": "2025-05-01", "duration": "1"})),
            "s".to_string(),
            at(2025, 4, 1),
        )
        .unwrap();

        assert_eq!(booking.duration, 1);
        assert_eq!(booking.total_price, 199.0);
    }

    #[test]
    fn test_create_booking_errors() {
        let now = at(2025, 4, 1);

        assert_eq!(
            SponsorBooking::create(&body(json!({"slot": "top", "startDate": "2025-05-01", "duration": 1})), "s".into(), now),
            Err(SponsorError::MissingFields)
        );
        assert_eq!(
            SponsorBooking::create(&body(json!({"company": "A", "slot": "top", "startDate": "2025-05-01"})), "s".into(), now),
            Err(SponsorError::MissingFields)
        );
        assert_eq!(
            SponsorBooking::create(&body(json!({"company": "A", "slot": "top", "startDate": "2025-05-01", "duration": 0})), "s".into(), now),
            Err(SponsorError::InvalidDuration)
        );
        assert_eq!(
            SponsorBooking::create(&body(json!({"company": "A", "slot": "top", "startDate": "2025-05-01", "duration": 1_000_000_000})), "s".into(), now),
            Err(SponsorError::InvalidDuration)
        );
        assert_eq!(
            SponsorBooking::create(&body(json!({"company": "A", "slot": "top", "startDate": "soon", "duration": 1})), "s".into(), now),
            Err(SponsorError::InvalidStartDate)
        );
    }

    // ==================== 掲載中スポンサー ====================

    #[test]
    fn test_group_active_by_slot() {
        let items = vec![
            body(json!({"sponsorId": "a", "slot": "top", "company": "A",
                "startDate": "2025-01-01T00:00:00.000Z", "endDate": "2025-02-01T00:00:00.000Z"})),
            body(json!({"sponsorId": "b", "slot": "top", "company": "B",
                "startDate": "2025-01-01T00:00:00.000Z", "endDate": "2025-02-01T00:00:00.000Z"})),
            body(json!({"sponsorId": "expired", "slot": "bottom",
                "startDate": "2024-01-01T00:00:00.000Z", "endDate": "2024-02-01T00:00:00.000Z"})),
            body(json!({"sponsorId": "c", "slot": "creator",
                "startDate": "2025-01-10T00:00:00.000Z", "endDate": "2025-03-01T00:00:00.000Z"})),
        ];

        let grouped = group_active_by_slot(&items, at(2025, 1, 15));

        assert_eq!(grouped.len(), 5);
        assert_eq!(grouped["top"]["sponsorId"], json!("a"));
        assert_eq!(grouped["creator"]["sponsorId"], json!("c"));
        assert_eq!(grouped["bottom"], Value::Null);
        assert_eq!(grouped["left"], Value::Null);
        assert_eq!(grouped["right"], Value::Null);
    }

    #[test]
    fn test_group_active_by_slot_empty() {
        let grouped = group_active_by_slot(&[], at(2025, 1, 15));
        for slot in SPONSOR_SLOTS {
            assert_eq!(grouped[slot], Value::Null);
        }
    }

    // ==================== 計測 ====================

    #[test]
    fn test_tracked_interaction() {
        assert_eq!(TrackedInteraction::from_segment("view"), Some(TrackedInteraction::View));
        assert_eq!(TrackedInteraction::from_segment("click"), Some(TrackedInteraction::Click));
        assert_eq!(TrackedInteraction::from_segment("approve"), None);
        assert_eq!(TrackedInteraction::Click.counter_field(), "clicks");
    }

    #[test]
    fn test_stats_row_defaults_unknown() {
        let row = TrackedInteraction::View.stats_row("s1", None, Some("1.2.3.4"), at(2025, 1, 1));

        assert_eq!(row["sponsorId"], json!("s1"));
        assert_eq!(row["eventType"], json!("view"));
        assert_eq!(row["userAgent"], json!("unknown"));
        assert_eq!(row["ip"], json!("1.2.3.4"));
        assert_eq!(row["timestamp"], json!(at(2025, 1, 1).timestamp_millis()));
    }
}
