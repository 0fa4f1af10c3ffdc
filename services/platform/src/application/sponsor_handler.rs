// スポンサー枠ハンドラー
//
// 予約作成・掲載中スポンサーの取得・表示/クリック計測は公開。
// 予約一覧と承認は管理者のみ。

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;

use super::api_error::ApiError;
use super::api_request::ApiRequest;
use super::api_response::ApiResponse;
use super::request_handler::{require_admin, route_not_found, to_object, RequestHandler};
use crate::domain::record_id::{generate_record_id, SPONSOR_ID_PREFIX};
use crate::domain::sponsor::{group_active_by_slot, SPONSOR_STATUS_ACTIVE, STATUS_INDEX};
use crate::domain::timestamp::iso_timestamp;
use crate::domain::{AdminPolicy, SponsorBooking, TrackedInteraction};
use crate::infrastructure::{ItemRepository, RepositoryError};

pub const SPONSORS_PATH: &str = "sponsors";

pub struct SponsorHandler<S, T> {
    sponsors: S,
    stats: T,
    policy: AdminPolicy,
}

impl<S: ItemRepository, T: ItemRepository> SponsorHandler<S, T> {
    pub fn new(sponsors: S, stats: T, policy: AdminPolicy) -> Self {
        Self {
            sponsors,
            stats,
            policy,
        }
    }

    async fn book(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let body = request.json_object()?;
        let now = Utc::now();
        let booking = SponsorBooking::create(&body, generate_record_id(SPONSOR_ID_PREFIX, now), now)?;

        self.sponsors.put(to_object(&booking)?).await?;
        info!(
            sponsor_id = %booking.sponsor_id,
            slot = %booking.slot,
            total_price = booking.total_price,
            "スポンサー予約作成"
        );

        Ok(ApiResponse::created(json!({
            "sponsorId": booking.sponsor_id,
            "message": "Booking created successfully",
            "totalPrice": booking.total_price,
            "status": booking.status,
        })))
    }

    /// 枠ごとの掲載中スポンサー
    async fn active(&self) -> Result<ApiResponse, ApiError> {
        let items = self
            .sponsors
            .query_index(STATUS_INDEX, "status", SPONSOR_STATUS_ACTIVE)
            .await?;
        let sponsors = group_active_by_slot(&items, Utc::now());

        Ok(ApiResponse::ok(json!({ "sponsors": sponsors })).cached())
    }

    async fn list(&self) -> Result<ApiResponse, ApiError> {
        let items = self.sponsors.scan().await?;
        Ok(ApiResponse::ok(json!({ "sponsors": items })))
    }

    async fn approve(&self, id: &str) -> Result<ApiResponse, ApiError> {
        let fields = vec![
            ("status".to_string(), json!(SPONSOR_STATUS_ACTIVE)),
            ("approvedAt".to_string(), Value::String(iso_timestamp(Utc::now()))),
        ];

        match self.sponsors.update(id, fields).await {
            Ok(_) => {}
            Err(RepositoryError::NotFound(_)) => return Err(ApiError::not_found("Booking not found")),
            Err(e) => return Err(e.into()),
        }
        info!(sponsor_id = %id, "スポンサー予約承認");

        Ok(ApiResponse::ok(json!({
            "message": "Booking approved successfully",
            "sponsorId": id,
            "status": SPONSOR_STATUS_ACTIVE,
        })))
    }

    /// カウンターを加算し、統計テーブルに1行追加
    async fn track(
        &self,
        id: &str,
        interaction: TrackedInteraction,
        request: &ApiRequest,
    ) -> Result<ApiResponse, ApiError> {
        match self.sponsors.increment(id, interaction.counter_field(), 1).await {
            Ok(()) => {}
            Err(RepositoryError::NotFound(_)) => return Err(ApiError::not_found("Booking not found")),
            Err(e) => return Err(e.into()),
        }

        let row = interaction.stats_row(
            id,
            request.header("user-agent"),
            request.source_ip(),
            Utc::now(),
        );
        self.stats.put(row).await?;

        Ok(ApiResponse::message("Event tracked successfully"))
    }
}

#[async_trait]
impl<S: ItemRepository, T: ItemRepository> RequestHandler for SponsorHandler<S, T> {
    async fn route(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let rest = request.route_under(SPONSORS_PATH).ok_or_else(route_not_found)?;

        match (request.method(), rest.as_slice()) {
            ("POST", []) => return self.book(request).await,
            ("GET", ["active"]) => return self.active().await,
            ("POST", [id, action]) => {
                if let Some(interaction) = TrackedInteraction::from_segment(action) {
                    return self.track(id, interaction, request).await;
                }
            }
            _ => {}
        }

        require_admin(&self.policy, request)?;

        match (request.method(), rest.as_slice()) {
            ("GET", []) => self.list().await,
            ("POST", [id, "approve"]) => self.approve(id).await,
            _ => Err(route_not_found()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::api_request::tests::{admin_request, public_request};
    use crate::infrastructure::item_repository::tests::MockItemRepository;
    use chrono::Duration;

    fn handler(
        sponsors: Vec<Value>,
    ) -> (SponsorHandler<MockItemRepository, MockItemRepository>, MockItemRepository, MockItemRepository) {
        let sponsors = MockItemRepository::with_items("sponsorId", sponsors);
        let stats = MockItemRepository::new("sponsorId");
        let handler = SponsorHandler::new(sponsors.clone(), stats.clone(), AdminPolicy::default());
        (handler, sponsors, stats)
    }

    #[tokio::test]
    async fn test_book_sponsor_slot() {
        let (handler, sponsors, _) = handler(vec![]);

        let response = handler
            .route(&public_request(
                "POST",
                "/sponsors",
                Some(json!({
                    "company": "Acme",
                    "slot": "top",
                    "startDate": "2025-03-01T00:00:00Z",
                    "duration": 4
                })),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), 201);
        let body = response.body();
        assert_eq!(body["totalPrice"], json!(636.8));
        assert_eq!(body["status"], json!("pending"));

        let stored = sponsors.item(body["sponsorId"].as_str().unwrap()).unwrap();
        assert_eq!(stored["views"], json!(0));
        assert_eq!(stored["endDate"], json!("2025-03-29T00:00:00.000Z"));
    }

    #[tokio::test]
    async fn test_book_missing_fields_is_400() {
        let (handler, _, _) = handler(vec![]);

        let err = handler
            .route(&public_request("POST", "/sponsors", Some(json!({"company": "Acme"}))))
            .await
            .unwrap_err();

        assert_eq!(err, ApiError::BadRequest("Missing required fields".to_string()));
    }

    #[tokio::test]
    async fn test_active_sponsors_by_slot() {
        let now = Utc::now();
        let running = json!({
            "sponsorId": "s1",
            "company": "Acme",
            "slot": "left",
            "status": "active",
            "startDate": iso_timestamp(now - Duration::days(1)),
            "endDate": iso_timestamp(now + Duration::days(6)),
        });
        let expired = json!({
            "sponsorId": "s2",
            "company": "Old",
            "slot": "top",
            "status": "active",
            "startDate": iso_timestamp(now - Duration::days(30)),
            "endDate": iso_timestamp(now - Duration::days(2)),
        });
        let pending = json!({
            "sponsorId": "s3",
            "slot": "bottom",
            "status": "pending",
            "startDate": iso_timestamp(now - Duration::days(1)),
            "endDate": iso_timestamp(now + Duration::days(6)),
        });
        let (handler, _, _) = handler(vec![running, expired, pending]);

        let response = handler
            .route(&public_request("GET", "/sponsors/active", None))
            .await
            .unwrap();
        let sponsors = &response.body()["sponsors"];

        assert_eq!(sponsors["left"]["sponsorId"], json!("s1"));
        assert_eq!(sponsors["top"], Value::Null);
        assert_eq!(sponsors["bottom"], Value::Null);
        assert_eq!(sponsors.as_object().unwrap().len(), 5);
        assert_eq!(response.cache_control(), Some("max-age=300"));
    }

    #[tokio::test]
    async fn test_listing_all_bookings_requires_admin() {
        let (handler, _, _) = handler(vec![json!({"sponsorId": "s1", "status": "pending"})]);

        let err = handler
            .route(&public_request("GET", "/sponsors", None))
            .await
            .unwrap_err();
        assert_eq!(err.status(), 403);

        let response = handler
            .route(&admin_request("GET", "/sponsors", None))
            .await
            .unwrap();
        assert_eq!(response.body()["sponsors"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_approve_booking() {
        let (handler, sponsors, _) = handler(vec![json!({"sponsorId": "s1", "status": "pending"})]);

        let response = handler
            .route(&admin_request("POST", "/sponsors/s1/approve", None))
            .await
            .unwrap();

        assert_eq!(response.body()["status"], json!("active"));
        let stored = sponsors.item("s1").unwrap();
        assert_eq!(stored["status"], json!("active"));
        assert!(stored.get("approvedAt").is_some());
    }

    #[tokio::test]
    async fn test_approve_requires_admin_and_existing_booking() {
        let (handler, sponsors, _) = handler(vec![json!({"sponsorId": "s1", "status": "pending"})]);

        let err = handler
            .route(&public_request("POST", "/sponsors/s1/approve", None))
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::admin_required());
        assert_eq!(sponsors.item("s1").unwrap()["status"], json!("pending"));

        let err = handler
            .route(&admin_request("POST", "/sponsors/ghost/approve", None))
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::NotFound("Booking not found".to_string()));
    }

    #[tokio::test]
    async fn test_track_click() {
        let (handler, sponsors, stats) = handler(vec![json!({"sponsorId": "s1", "clicks": 2})]);

        let response = handler
            .route(&public_request("POST", "/sponsors/s1/click", None))
            .await
            .unwrap();

        assert_eq!(response.body(), &json!({"message": "Event tracked successfully"}));
        assert_eq!(sponsors.item("s1").unwrap()["clicks"], json!(3));

        let row = stats.item("s1").unwrap();
        assert_eq!(row["eventType"], json!("click"));
        assert_eq!(row["userAgent"], json!("test-agent"));
        assert_eq!(row["ip"], json!("203.0.113.5"));
    }

    #[tokio::test]
    async fn test_track_unknown_sponsor_is_404() {
        let (handler, sponsors, stats) = handler(vec![]);

        let err = handler
            .route(&public_request("POST", "/sponsors/ghost/view", None))
            .await
            .unwrap_err();

        assert_eq!(err, ApiError::NotFound("Booking not found".to_string()));
        assert!(sponsors.item("ghost").is_none());
        assert_eq!(stats.len(), 0);
    }

    #[tokio::test]
    async fn test_book_oversized_duration_is_400() {
        let (handler, sponsors, _) = handler(vec![]);

        let err = handler
            .route(&public_request(
                "POST",
                "/sponsors",
                Some(json!({"company": "A", "slot": "top", "startDate": "2025-01-01", "duration": 1_000_000_000})),
            ))
            .await
            .unwrap_err();

        assert_eq!(err.status(), 400);
        assert_eq!(sponsors.len(), 0);
    }

    #[tokio::test]
    async fn test_unknown_action_falls_through_to_admin_check() {
        let (handler, _, _) = handler(vec![]);

        let err = handler
            .route(&public_request("POST", "/sponsors/s1/hover", None))
            .await
            .unwrap_err();

        assert_eq!(err.status(), 403);
    }
}
