// API Gatewayプロキシ形式のレスポンス
//
// すべてのレスポンスにCORSヘッダーとJSONのContent-Typeを付与する。

use serde_json::{json, Map, Value};

const ALLOW_ORIGIN: &str = "*";
const ALLOW_HEADERS: &str = "Content-Type,Authorization";
const ALLOW_METHODS: &str = "GET,POST,PUT,DELETE,OPTIONS";

/// 公開カタログ系のGETに付与するキャッシュ指定
pub const PUBLIC_CACHE_CONTROL: &str = "max-age=300";

/// ハンドラーのレスポンス
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    status: u16,
    body: Value,
    cache_control: Option<&'static str>,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self {
            status,
            body,
            cache_control: None,
        }
    }

    /// 200 OK
    pub fn ok(body: Value) -> Self {
        Self::new(200, body)
    }

    /// 201 Created
    pub fn created(body: Value) -> Self {
        Self::new(201, body)
    }

    /// `{"message": ...}`形式の200
    pub fn message(message: &str) -> Self {
        Self::ok(json!({ "message": message }))
    }

    /// `{"error": ...}`形式のエラー
    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self::new(status, json!({ "error": message.into() }))
    }

    /// プリフライト（OPTIONS）への応答
    pub fn preflight() -> Self {
        Self::ok(json!({}))
    }

    /// 公開キャッシュ指定を付与
    pub fn cached(mut self) -> Self {
        self.cache_control = Some(PUBLIC_CACHE_CONTROL);
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn cache_control(&self) -> Option<&str> {
        self.cache_control
    }

    /// Lambdaの戻り値（`statusCode`/`headers`/`body`）に変換
    pub fn into_value(self) -> Value {
        let mut headers = Map::new();
        headers.insert("Content-Type".to_string(), json!("application/json"));
        headers.insert("Access-Control-Allow-Origin".to_string(), json!(ALLOW_ORIGIN));
        headers.insert("Access-Control-Allow-Headers".to_string(), json!(ALLOW_HEADERS));
        headers.insert("Access-Control-Allow-Methods".to_string(), json!(ALLOW_METHODS));
        if let Some(cache_control) = self.cache_control {
            headers.insert("Cache-Control".to_string(), json!(cache_control));
        }

        json!({
            "statusCode": self.status,
            "headers": headers,
            "body": self.body.to_string(),
        })
    }
}
