// ショップ注文
//
// 注文リクエストの検証と金額計算。
// 注文合計は各明細の「単価 × 数量」の総和。

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::json_value::{lenient_f64, lenient_i64, JsonObject};

/// 注文テーブルのキー属性
pub const ORDER_KEY: &str = "orderId";

/// 作成直後の注文ステータス
pub const ORDER_STATUS_PENDING: &str = "pending";

/// 注文エラー
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OrderError {
    /// 購入者を特定できない
    #[error("userId is required")]
    MissingBuyer,

    /// 明細が空
    #[error("items must be a non-empty array")]
    EmptyItems,

    /// 商品IDが空
    #[error("productId is required for every item")]
    MissingProductId,

    /// 数量が1未満
    #[error("Invalid quantity for product {0}")]
    InvalidQuantity(String),
}

/// 注文明細リクエスト
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    #[serde(default)]
    pub product_id: String,
    /// 数値または数値文字列
    #[serde(default)]
    pub quantity: Option<Value>,
}

/// 注文作成リクエスト
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
    #[serde(default)]
    pub shipping_address: Option<Value>,
}

/// 検証済みの注文明細（商品IDと数量）
#[derive(Debug, Clone, PartialEq)]
pub struct RequestedItem {
    pub product_id: String,
    pub quantity: i64,
}

impl CreateOrderRequest {
    /// 購入者と明細を検証する
    ///
    /// 購入者は認証済みユーザー（`sub`）を優先し、無ければボディの`userId`。
    /// 数量の既定値は1。
    pub fn validate(&self, subject: Option<&str>) -> Result<(String, Vec<RequestedItem>), OrderError> {
        let buyer = subject
            .map(str::to_string)
            .or_else(|| self.user_id.clone())
            .filter(|s| !s.trim().is_empty())
            .ok_or(OrderError::MissingBuyer)?;

        if self.items.is_empty() {
            return Err(OrderError::EmptyItems);
        }

        let items = self
            .items
            .iter()
            .map(|item| {
                if item.product_id.trim().is_empty() {
                    return Err(OrderError::MissingProductId);
                }
                let quantity = match item.quantity.as_ref().filter(|v| !v.is_null()) {
                    None => 1,
                    Some(value) => lenient_i64(Some(value))
                        .filter(|quantity| *quantity >= 1)
                        .ok_or_else(|| OrderError::InvalidQuantity(item.product_id.clone()))?,
                };
                Ok(RequestedItem {
                    product_id: item.product_id.clone(),
                    quantity,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok((buyer, items))
    }
}

/// 価格付けされた注文明細
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: String,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
    pub total: f64,
}

impl OrderLine {
    /// 商品レコードから明細を作成
    pub fn from_product(product: &JsonObject, requested: &RequestedItem) -> Self {
        let price = lenient_f64(product.get("price")).unwrap_or(0.0);
        let name = product
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        Self {
            product_id: requested.product_id.clone(),
            name,
            price,
            quantity: requested.quantity,
            total: price * requested.quantity as f64,
        }
    }
}

/// 明細の合計金額
pub fn order_total(lines: &[OrderLine]) -> f64 {
    lines.iter().map(|line| line.total).sum()
}

/// 注文レコード
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: String,
    pub user_id: String,
    pub items: Vec<OrderLine>,
    pub total_amount: f64,
    pub status: String,
    pub shipping_address: Value,
    pub created_at: String,
}

impl Order {
    /// 明細から新しい注文を作成
    pub fn new(
        order_id: String,
        user_id: String,
        items: Vec<OrderLine>,
        shipping_address: Option<Value>,
        now: &str,
    ) -> Self {
        let total_amount = order_total(&items);
        Self {
            order_id,
            user_id,
            items,
            total_amount,
            status: ORDER_STATUS_PENDING.to_string(),
            shipping_address: shipping_address
                .filter(|v| !v.is_null())
                .unwrap_or_else(|| Value::Object(JsonObject::new())),
            created_at: now.to_string(),
        }
    }
}

/// 注文を参照できるか（購入者本人または管理者）
pub fn can_view_order(order: &JsonObject, subject: Option<&str>, is_admin: bool) -> bool {
    if is_admin {
        return true;
    }

    match (order.get("userId").and_then(|v| v.as_str()), subject) {
        (Some(owner), Some(subject)) => owner == subject,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(value: Value) -> CreateOrderRequest {
        serde_json::from_value(value).unwrap()
    }

    fn product(name: &str, price: Value) -> JsonObject {
        json!({"name": name, "price": price}).as_object().unwrap().clone()
    }

    // ==================== 検証 ====================

    #[test]
    fn test_validate_prefers_authenticated_subject() {
        let req = request(json!({"userId": "body-user", "items": [{"productId": "p1"}]}));
        let (buyer, items) = req.validate(Some("jwt-user")).unwrap();

        assert_eq!(buyer, "jwt-user");
        assert_eq!(items, vec![RequestedItem { product_id: "p1".to_string(), quantity: 1 }]);
    }

    #[test]
    fn test_validate_falls_back_to_body_user() {
        let req = request(json!({"userId": "body-user", "items": [{"productId": "p1", "quantity": 3}]}));
        let (buyer, items) = req.validate(None).unwrap();

        assert_eq!(buyer, "body-user");
        assert_eq!(items[0].quantity, 3);
    }

    #[test]
    fn test_validate_accepts_numeric_string_quantity() {
        let req = request(json!({"userId": "u", "items": [{"productId": "p1", "quantity": "2"}]}));
        let (_, items) = req.validate(None).unwrap();

        assert_eq!(items[0].quantity, 2);
        assert_eq!(
            request(json!({"userId": "u", "items": [{"productId": "p1", "quantity": "many"}]})).validate(None),
            Err(OrderError::InvalidQuantity("p1".to_string()))
        );
    }

    #[test]
    fn test_validate_errors() {
        assert_eq!(
            request(json!({"items": [{"productId": "p1"}]})).validate(None),
            Err(OrderError::MissingBuyer)
        );
        assert_eq!(
            request(json!({"userId": "u", "items": []})).validate(None),
            Err(OrderError::EmptyItems)
        );
        assert_eq!(
            request(json!({"userId": "u", "items": [{"quantity": 1}]})).validate(None),
            Err(OrderError::MissingProductId)
        );
        assert_eq!(
            request(json!({"userId": "u", "items": [{"productId": "p1", "quantity": 0}]})).validate(None),
            Err(OrderError::InvalidQuantity("p1".to_string()))
        );
    }

    // ==================== 金額計算 ====================

    #[test]
    fn test_order_line_total_is_price_times_quantity() {
        let line = OrderLine::from_product(
            &product("Mug", json!(12.5)),
            &RequestedItem { product_id: "p1".to_string(), quantity: 4 },
        );

        assert_eq!(line.name, "Mug");
        assert_eq!(line.price, 12.5);
        assert_eq!(line.total, 50.0);
    }

    #[test]
    fn test_order_total_is_sum_of_lines() {
        let lines = vec![
            OrderLine::from_product(
                &product("Shirt", json!(10.0)),
                &RequestedItem { product_id: "p1".to_string(), quantity: 2 },
            ),
            OrderLine::from_product(
                &product("Sticker", json!("5.5")),
                &RequestedItem { product_id: "p2".to_string(), quantity: 1 },
            ),
        ];

        assert_eq!(order_total(&lines), 25.5);

        let order = Order::new("o1".to_string(), "u1".to_string(), lines, None, "now");
        assert_eq!(order.total_amount, 25.5);
        assert_eq!(order.status, ORDER_STATUS_PENDING);
        assert_eq!(order.shipping_address, json!({}));
    }

    #[test]
    fn test_order_total_empty() {
        assert_eq!(order_total(&[]), 0.0);
    }

    #[test]
    fn test_order_serializes_camel_case() {
        let order = Order::new(
            "o1".to_string(),
            "u1".to_string(),
            vec![],
            Some(json!({"city": "Hamburg"})),
            "now",
        );
        let value = serde_json::to_value(&order).unwrap();

        assert_eq!(value["orderId"], json!("o1"));
        assert_eq!(value["totalAmount"], json!(0.0));
        assert_eq!(value["shippingAddress"], json!({"city": "Hamburg"}));
    }

    // ==================== 参照権限 ====================

    #[test]
    fn test_can_view_order() {
        let order = json!({"orderId": "o1", "userId": "u1"}).as_object().unwrap().clone();

        assert!(can_view_order(&order, Some("u1"), false));
        assert!(!can_view_order(&order, Some("u2"), false));
        assert!(!can_view_order(&order, None, false));
        assert!(can_view_order(&order, None, true));
    }
}
