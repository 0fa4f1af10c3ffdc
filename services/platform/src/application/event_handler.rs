// イベントカレンダーハンドラー
//
// 公開一覧は`published`のイベントのみを開催日の昇順で返す。

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use super::api_error::ApiError;
use super::api_request::ApiRequest;
use super::api_response::ApiResponse;
use super::catalog::{Catalog, CatalogResource};
use super::request_handler::{require_admin, route_not_found, RequestHandler};
use crate::domain::calendar_event::{
    CalendarEvent, EVENT_IMAGE_FOLDER, EVENT_PATCH_FIELDS, EVENT_STATUS_PUBLISHED,
    STATUS_DATE_INDEX,
};
use crate::domain::record_id::EVENT_ID_PREFIX;
use crate::domain::timestamp::iso_timestamp;
use crate::domain::{AdminPolicy, JsonObject};
use crate::infrastructure::{ItemRepository, MediaStore};

pub const EVENTS_PATH: &str = "events";

pub const EVENT_RESOURCE: CatalogResource = CatalogResource {
    label: "Event",
    id_prefix: EVENT_ID_PREFIX,
    image_folder: EVENT_IMAGE_FOLDER,
    patch_fields: EVENT_PATCH_FIELDS,
};

fn event_date(item: &JsonObject) -> &str {
    item.get("eventDate").and_then(|v| v.as_str()).unwrap_or_default()
}

pub struct EventHandler<R, M> {
    catalog: Catalog<R, M>,
    policy: AdminPolicy,
}

impl<R: ItemRepository, M: MediaStore> EventHandler<R, M> {
    pub fn new(events: R, media: M, cdn_domain: impl Into<String>, policy: AdminPolicy) -> Self {
        Self {
            catalog: Catalog::new(EVENT_RESOURCE, events, media, cdn_domain),
            policy,
        }
    }

    async fn list(&self) -> Result<ApiResponse, ApiError> {
        let mut items = self
            .catalog
            .items()
            .query_index(STATUS_DATE_INDEX, "status", EVENT_STATUS_PUBLISHED)
            .await?;
        // GSIのソートキーと同じ順序（ISO日付の文字列比較）
        items.sort_by(|a, b| event_date(a).cmp(event_date(b)));

        Ok(ApiResponse::ok(json!({ "events": self.catalog.present_all(items) })).cached())
    }

    async fn get(&self, id: &str) -> Result<ApiResponse, ApiError> {
        let item = self.catalog.fetch(id).await?;
        Ok(ApiResponse::ok(json!({ "event": self.catalog.present(item) })).cached())
    }

    async fn create(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let body = request.json_object()?;
        let now = Utc::now();
        let event = CalendarEvent::create(&body, self.catalog.new_id(now), &iso_timestamp(now))?;

        let item = self.catalog.insert(&event).await?;
        Ok(ApiResponse::created(json!({ "event": self.catalog.present(item) })))
    }

    async fn update(&self, id: &str, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let body = request.json_object()?;
        let item = self.catalog.patch(id, &body).await?;

        Ok(ApiResponse::ok(json!({
            "message": "Event updated",
            "event": self.catalog.present(item),
        })))
    }
}

#[async_trait]
impl<R: ItemRepository, M: MediaStore> RequestHandler for EventHandler<R, M> {
    async fn route(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let rest = request.route_under(EVENTS_PATH).ok_or_else(route_not_found)?;

        match (request.method(), rest.as_slice()) {
            ("GET", []) => return self.list().await,
            ("GET", [id]) => return self.get(id).await,
            _ => {}
        }

        require_admin(&self.policy, request)?;

        match (request.method(), rest.as_slice()) {
            ("POST", []) => self.create(request).await,
            ("POST", ["upload-url"]) => self.catalog.upload_url(request).await,
            ("PUT", [id]) => self.update(id, request).await,
            ("DELETE", [id]) => {
                self.catalog.remove(id).await?;
                Ok(ApiResponse::message("Event deleted"))
            }
            _ => Err(route_not_found()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::api_request::tests::{admin_request, public_request};
    use crate::infrastructure::item_repository::tests::MockItemRepository;
    use crate::infrastructure::media_store::tests::MockMediaStore;

    fn handler() -> (EventHandler<MockItemRepository, MockMediaStore>, MockItemRepository, MockMediaStore) {
        let repo = MockItemRepository::with_items(
            "eventId",
            vec![
                json!({"eventId": "e2", "title": "Tour", "eventDate": "2025-09-01", "status": "published"}),
                json!({"eventId": "e1", "title": "Q&A", "eventDate": "2025-05-01", "status": "published",
                       "imageKey": "events/1_qa.png"}),
                json!({"eventId": "e3", "title": "Secret", "eventDate": "2025-01-01", "status": "draft"}),
            ],
        );
        let media = MockMediaStore::new();
        let handler = EventHandler::new(repo.clone(), media.clone(), "cdn.test", AdminPolicy::default());
        (handler, repo, media)
    }

    #[tokio::test]
    async fn test_list_returns_published_events_by_date() {
        let (handler, _, _) = handler();

        let response = handler.route(&public_request("GET", "/events", None)).await.unwrap();
        let events = response.body()["events"].as_array().unwrap();

        let ids: Vec<&str> = events.iter().map(|e| e["eventId"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["e1", "e2"]);
        assert_eq!(events[0]["imageUrl"], json!("https://cdn.test/events/1_qa.png"));
        assert_eq!(response.cache_control(), Some("max-age=300"));
    }

    #[tokio::test]
    async fn test_get_single_event_includes_drafts() {
        let (handler, _, _) = handler();

        let response = handler
            .route(&public_request("GET", "/events/e3", None))
            .await
            .unwrap();

        assert_eq!(response.body()["event"]["title"], json!("Secret"));
    }

    #[tokio::test]
    async fn test_create_event_defaults_to_draft() {
        let (handler, repo, _) = handler();

        let response = handler
            .route(&admin_request(
                "POST",
                "/events",
                Some(json!({"title": "Meetup", "eventDate": "2025-07-07"})),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), 201);
        let event = &response.body()["event"];
        assert_eq!(event["status"], json!("draft"));
        assert!(event["eventId"].as_str().unwrap().starts_with("event_"));
        assert_eq!(repo.len(), 4);
    }

    #[tokio::test]
    async fn test_create_requires_event_date() {
        let (handler, _, _) = handler();

        let err = handler
            .route(&admin_request("POST", "/events", Some(json!({"title": "x"}))))
            .await
            .unwrap_err();

        assert_eq!(err, ApiError::BadRequest("eventDate is required".to_string()));
    }

    #[tokio::test]
    async fn test_publish_draft_via_put() {
        let (handler, _, _) = handler();

        let response = handler
            .route(&admin_request("PUT", "/events/e3", Some(json!({"status": "published"}))))
            .await
            .unwrap();
        assert_eq!(response.body()["message"], json!("Event updated"));

        let listed = handler.route(&public_request("GET", "/events", None)).await.unwrap();
        assert_eq!(listed.body()["events"][0]["eventId"], json!("e3"));
    }

    #[tokio::test]
    async fn test_delete_requires_admin_and_removes_image() {
        let (handler, repo, media) = handler();

        let err = handler
            .route(&public_request("DELETE", "/events/e1", None))
            .await
            .unwrap_err();
        assert_eq!(err.status(), 403);

        let response = handler
            .route(&admin_request("DELETE", "/events/e1", None))
            .await
            .unwrap();
        assert_eq!(response.body(), &json!({"message": "Event deleted"}));
        assert_eq!(media.deleted(), vec!["events/1_qa.png".to_string()]);
        assert!(repo.item("e1").is_none());
    }
}
