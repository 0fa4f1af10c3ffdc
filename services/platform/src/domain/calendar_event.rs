// カレンダーイベント（ライブ・ミートアップ等の告知）

use serde::Serialize;

use super::json_value::JsonObject;
use super::record::{optional_string, required_string, PatchField, RecordError};

/// イベントテーブルのキー属性
pub const EVENT_KEY: &str = "eventId";

/// イベント画像のアップロード先フォルダ
pub const EVENT_IMAGE_FOLDER: &str = "events";

/// 公開イベント一覧用のGSI名（status + eventDate）
pub const STATUS_DATE_INDEX: &str = "StatusDateIndex";

/// 公開ステータス
pub const EVENT_STATUS_PUBLISHED: &str = "published";

/// 下書きステータス（作成時の既定値）
pub const EVENT_STATUS_DRAFT: &str = "draft";

/// PUTで更新可能なフィールド
pub const EVENT_PATCH_FIELDS: &[PatchField] = &[
    PatchField::any("title"),
    PatchField::any("description"),
    PatchField::any("eventDate"),
    PatchField::any("eventTime"),
    PatchField::any("location"),
    PatchField::any("locationUrl"),
    PatchField::any("imageKey"),
    PatchField::any("ticketUrl"),
    PatchField::any("status"),
];

/// イベントレコード
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub event_id: String,
    pub title: String,
    pub description: Option<String>,
    pub event_date: String,
    pub event_time: Option<String>,
    pub location: Option<String>,
    pub location_url: Option<String>,
    pub image_key: Option<String>,
    pub ticket_url: Option<String>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl CalendarEvent {
    /// リクエストボディから新しいイベントを作成
    ///
    /// `title`と`eventDate`は必須。ステータスの既定値は`draft`。
    pub fn create(body: &JsonObject, event_id: String, now: &str) -> Result<Self, RecordError> {
        let title = required_string(body, "title")?;
        let event_date = required_string(body, "eventDate")?;

        Ok(Self {
            event_id,
            title,
            description: optional_string(body, "description"),
            event_date,
            event_time: optional_string(body, "eventTime"),
            location: optional_string(body, "location"),
            location_url: optional_string(body, "locationUrl"),
            image_key: optional_string(body, "imageKey"),
            ticket_url: optional_string(body, "ticketUrl"),
            status: optional_string(body, "status")
                .unwrap_or_else(|| EVENT_STATUS_DRAFT.to_string()),
            created_at: now.to_string(),
            updated_at: now.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: serde_json::Value) -> JsonObject {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_create_defaults_to_draft() {
        let event = CalendarEvent::create(
            &body(json!({"title": "Live Q&A", "eventDate": "2025-05-01"})),
            "e1".to_string(),
            "now",
        )
        .unwrap();

        assert_eq!(event.status, EVENT_STATUS_DRAFT);
        assert!(event.location.is_none());
    }

    #[test]
    fn test_create_published_event() {
        let event = CalendarEvent::create(
            &body(json!({
                "title": "Tour",
                "eventDate": "2025-06-10",
                "eventTime": "20:00",
                "location": "Berlin",
                "status": "published"
            })),
            "e2".to_string(),
            "now",
        )
        .unwrap();

        assert_eq!(event.status, EVENT_STATUS_PUBLISHED);
        assert_eq!(event.event_time.as_deref(), Some("20:00"));
        assert_eq!(event.location.as_deref(), Some("Berlin"));
    }

    #[test]
    fn test_create_requires_title_and_date() {
        assert_eq!(
            CalendarEvent::create(&body(json!({"eventDate": "2025-01-01"})), "e".to_string(), "now"),
            Err(RecordError::MissingField("title"))
        );
        assert_eq!(
            CalendarEvent::create(&body(json!({"title": "x"})), "e".to_string(), "now"),
            Err(RecordError::MissingField("eventDate"))
        );
    }

    #[test]
    fn test_serializes_camel_case() {
        let event = CalendarEvent::create(
            &body(json!({"title": "x", "eventDate": "2025-01-01", "ticketUrl": "https://t.test"})),
            "e3".to_string(),
            "now",
        )
        .unwrap();
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["eventId"], json!("e3"));
        assert_eq!(value["eventDate"], json!("2025-01-01"));
        assert_eq!(value["ticketUrl"], json!("https://t.test"));
    }
}
