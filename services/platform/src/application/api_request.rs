// API Gatewayイベントの解析
//
// REST API（v1）とHTTP API（v2）のどちらのペイロードも受け付け、
// メソッド・パス・ヘッダー・クエリ・ボディ・認証クレームを取り出す。

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::api_error::ApiError;
use crate::domain::{Claims, JsonObject};

/// 解析済みのAPIリクエスト
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    method: String,
    path: String,
    headers: HashMap<String, String>,
    query: HashMap<String, String>,
    body: Option<String>,
    source_ip: Option<String>,
    claims: Claims,
}

/// 文字列フィールドを順に探し、最初に見つかった空でない値を返す
fn first_str<'a>(candidates: &[Option<&'a Value>]) -> Option<&'a str> {
    candidates
        .iter()
        .flatten()
        .filter_map(|v| v.as_str())
        .find(|s| !s.is_empty())
}

/// 文字列値のみを持つマップに変換（キーの変換付き）
fn string_map(value: Option<&Value>, key: impl Fn(&str) -> String) -> HashMap<String, String> {
    value
        .and_then(|v| v.as_object())
        .map(|object| {
            object
                .iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (key(k), s.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

impl ApiRequest {
    /// Lambdaイベントから解析する
    pub fn from_event(event: &Value) -> Self {
        let ctx = event.get("requestContext");
        let ctx_get = |key: &str| ctx.and_then(|c| c.get(key));
        let http = ctx_get("http");

        let route_method = ctx_get("routeKey")
            .and_then(|v| v.as_str())
            .and_then(|route| route.split_whitespace().next())
            .map(|m| Value::String(m.to_string()));

        let method = first_str(&[
            http.and_then(|h| h.get("method")),
            event.get("httpMethod"),
            ctx_get("httpMethod"),
            route_method.as_ref(),
        ])
        .unwrap_or("GET")
        .to_uppercase();

        let path = first_str(&[
            http.and_then(|h| h.get("path")),
            event.get("path"),
            ctx_get("path"),
            event.get("rawPath"),
            ctx_get("resourcePath"),
        ])
        .unwrap_or("/")
        .to_string();

        let source_ip = first_str(&[
            http.and_then(|h| h.get("sourceIp")),
            ctx_get("identity").and_then(|i| i.get("sourceIp")),
        ])
        .map(str::to_string);

        Self {
            method,
            path,
            headers: string_map(event.get("headers"), |k| k.to_lowercase()),
            query: string_map(event.get("queryStringParameters"), str::to_string),
            body: event
                .get("body")
                .and_then(|b| b.as_str())
                .map(str::to_string),
            source_ip,
            claims: Claims::from_request_context(ctx),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// ヘッダー（名前は小文字で指定）
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str).filter(|s| !s.is_empty())
    }

    pub fn source_ip(&self) -> Option<&str> {
        self.source_ip.as_deref()
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// パスの空でないセグメント
    pub fn segments(&self) -> Vec<&str> {
        self.path.split('/').filter(|s| !s.is_empty()).collect()
    }

    /// リソース名以降のセグメント
    ///
    /// ステージ名などの前置セグメントは読み飛ばす。
    /// `/prod/products/p1`に対して`route_under("products")`は`["p1"]`。
    pub fn route_under(&self, resource: &str) -> Option<Vec<&str>> {
        let segments = self.segments();
        let position = segments.iter().position(|s| *s == resource)?;
        Some(segments[position + 1..].to_vec())
    }

    /// ボディをJSONとして解析（欠落・不正は400）
    pub fn json_body(&self) -> Result<Value, ApiError> {
        let body = self
            .body
            .as_deref()
            .filter(|b| !b.trim().is_empty())
            .ok_or_else(|| ApiError::bad_request("Request body is required"))?;

        serde_json::from_str(body).map_err(|_| ApiError::bad_request("Invalid JSON body"))
    }

    /// ボディをJSONオブジェクトとして解析
    pub fn json_object(&self) -> Result<JsonObject, ApiError> {
        match self.json_body()? {
            Value::Object(object) => Ok(object),
            _ => Err(ApiError::bad_request("Request body must be a JSON object")),
        }
    }

    /// ボディを型付きで解析
    pub fn parse_body<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_value(self.json_body()?)
            .map_err(|e| ApiError::bad_request(format!("Invalid request body: {e}")))
    }
}
