// ショップ注文ハンドラー
//
// 注文時の価格は商品テーブルの現在値から計算し、クライアントの金額は使わない。

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;

use super::api_error::ApiError;
use super::api_request::ApiRequest;
use super::api_response::ApiResponse;
use super::request_handler::{route_not_found, to_object, RequestHandler};
use crate::domain::order::{can_view_order, CreateOrderRequest, Order, OrderLine};
use crate::domain::record_id::{generate_record_id, ORDER_ID_PREFIX};
use crate::domain::timestamp::iso_timestamp;
use crate::domain::AdminPolicy;
use crate::infrastructure::ItemRepository;

pub const ORDERS_PATH: &str = "orders";

pub struct OrderHandler<O, P> {
    orders: O,
    products: P,
    policy: AdminPolicy,
}

impl<O: ItemRepository, P: ItemRepository> OrderHandler<O, P> {
    pub fn new(orders: O, products: P, policy: AdminPolicy) -> Self {
        Self {
            orders,
            products,
            policy,
        }
    }

    async fn create(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let body: CreateOrderRequest = request.parse_body()?;
        let (buyer, requested) = body.validate(request.claims().subject())?;

        let mut lines = Vec::with_capacity(requested.len());
        for item in &requested {
            let product = self
                .products
                .get(&item.product_id)
                .await?
                .ok_or_else(|| ApiError::not_found(format!("Product {} not found", item.product_id)))?;
            lines.push(OrderLine::from_product(&product, item));
        }

        let now = Utc::now();
        let order = Order::new(
            generate_record_id(ORDER_ID_PREFIX, now),
            buyer,
            lines,
            body.shipping_address,
            &iso_timestamp(now),
        );
        self.orders.put(to_object(&order)?).await?;

        info!(
            order_id = %order.order_id,
            user_id = %order.user_id,
            total_amount = order.total_amount,
            "注文作成"
        );

        Ok(ApiResponse::created(json!({
            "orderId": order.order_id,
            "totalAmount": order.total_amount,
            "status": order.status,
            "message": "Order created successfully",
        })))
    }

    /// 注文者本人または管理者のみ参照可能
    async fn get(&self, id: &str, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let order = self
            .orders
            .get(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Order not found"))?;

        let is_admin = self.policy.is_admin(request.claims());
        if !can_view_order(&order, request.claims().subject(), is_admin) {
            return Err(ApiError::Forbidden("Unauthorized".to_string()));
        }

        Ok(ApiResponse::ok(Value::Object(order)))
    }
}

#[async_trait]
impl<O: ItemRepository, P: ItemRepository> RequestHandler for OrderHandler<O, P> {
    async fn route(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let rest = request.route_under(ORDERS_PATH).ok_or_else(route_not_found)?;

        match (request.method(), rest.as_slice()) {
            ("POST", []) => self.create(request).await,
            ("GET", [id]) => self.get(id, request).await,
            _ => Err(route_not_found()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::api_request::tests::{admin_request, http_event, public_request};
    use crate::infrastructure::item_repository::tests::MockItemRepository;

    fn handler() -> (OrderHandler<MockItemRepository, MockItemRepository>, MockItemRepository) {
        let orders = MockItemRepository::with_items(
            "orderId",
            vec![json!({"orderId": "o1", "userId": "someone-else", "totalAmount": 5.0})],
        );
        let products = MockItemRepository::with_items(
            "productId",
            vec![
                json!({"productId": "p1", "name": "Shirt", "price": 20.0}),
                json!({"productId": "p2", "name": "Sticker", "price": "2.5"}),
            ],
        );
        let handler = OrderHandler::new(orders.clone(), products, AdminPolicy::default());
        (handler, orders)
    }

    /// `sub`のみを持つ（管理者でない）ユーザーのリクエスト
    fn member_request(method: &str, path: &str, body: Option<Value>) -> ApiRequest {
        ApiRequest::from_event(&http_event(method, path, body, Some("[members]")))
    }

    #[tokio::test]
    async fn test_create_order_prices_from_catalog() {
        let (handler, orders) = handler();

        let response = handler
            .route(&member_request(
                "POST",
                "/orders",
                Some(json!({
                    "items": [{"productId": "p1", "quantity": 2, "price": 0.01}, {"productId": "p2"}],
                    "shippingAddress": {"city": "Berlin"}
                })),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), 201);
        let body = response.body();
        assert_eq!(body["totalAmount"], json!(42.5));
        assert_eq!(body["status"], json!("pending"));
        assert_eq!(body["message"], json!("Order created successfully"));

        let order_id = body["orderId"].as_str().unwrap();
        assert!(order_id.starts_with("order_"));
        let stored = orders.item(order_id).unwrap();
        assert_eq!(stored["userId"], json!("user-1"));
        assert_eq!(stored["items"][0]["total"], json!(40.0));
        assert_eq!(stored["shippingAddress"], json!({"city": "Berlin"}));
    }

    #[tokio::test]
    async fn test_anonymous_order_uses_body_user() {
        let (handler, orders) = handler();

        let response = handler
            .route(&public_request(
                "POST",
                "/orders",
                Some(json!({"userId": "guest-7", "items": [{"productId": "p2", "quantity": "4"}]})),
            ))
            .await
            .unwrap();

        let order_id = response.body()["orderId"].as_str().unwrap();
        assert_eq!(orders.item(order_id).unwrap()["userId"], json!("guest-7"));
        assert_eq!(response.body()["totalAmount"], json!(10.0));
    }

    #[tokio::test]
    async fn test_unknown_product_is_404() {
        let (handler, orders) = handler();

        let err = handler
            .route(&member_request("POST", "/orders", Some(json!({"items": [{"productId": "ghost"}]}))))
            .await
            .unwrap_err();

        assert_eq!(err, ApiError::NotFound("Product ghost not found".to_string()));
        assert_eq!(orders.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_order_is_400() {
        let (handler, _) = handler();

        let missing_buyer = handler
            .route(&public_request("POST", "/orders", Some(json!({"items": [{"productId": "p1"}]}))))
            .await
            .unwrap_err();
        assert_eq!(missing_buyer.status(), 400);

        let zero_quantity = handler
            .route(&member_request(
                "POST",
                "/orders",
                Some(json!({"items": [{"productId": "p1", "quantity": 0}]})),
            ))
            .await
            .unwrap_err();
        assert_eq!(zero_quantity, ApiError::BadRequest("Invalid quantity for product p1".to_string()));
    }

    #[tokio::test]
    async fn test_get_order_visibility() {
        let (handler, _) = handler();

        let forbidden = handler
            .route(&member_request("GET", "/orders/o1", None))
            .await
            .unwrap_err();
        assert_eq!(forbidden.status(), 403);

        let response = handler
            .route(&admin_request("GET", "/orders/o1", None))
            .await
            .unwrap();
        assert_eq!(response.body()["orderId"], json!("o1"));

        let missing = handler
            .route(&admin_request("GET", "/orders/nope", None))
            .await
            .unwrap_err();
        assert_eq!(missing, ApiError::NotFound("Order not found".to_string()));
    }

    #[tokio::test]
    async fn test_owner_can_read_own_order() {
        let (handler, _) = handler();

        let created = handler
            .route(&member_request("POST", "/orders", Some(json!({"items": [{"productId": "p1"}]}))))
            .await
            .unwrap();
        let path = format!("/orders/{}", created.body()["orderId"].as_str().unwrap());

        let response = handler.route(&member_request("GET", &path, None)).await.unwrap();

        assert_eq!(response.body()["userId"], json!("user-1"));
        assert_eq!(response.body()["items"][0]["name"], json!("Shirt"));
    }
}
