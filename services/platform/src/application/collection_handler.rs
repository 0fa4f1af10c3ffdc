// 一括保存型コレクション（法務ドキュメント・チャンネル）のハンドラー
//
// GETはテーブル全件を返し、空であれば既定のドキュメントを投入してから返す。
// PUTは配列で送られたドキュメントをまとめて上書き保存する。

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;

use super::api_error::ApiError;
use super::api_request::ApiRequest;
use super::api_response::ApiResponse;
use super::request_handler::{require_admin, route_not_found, RequestHandler};
use crate::domain::timestamp::iso_timestamp;
use crate::domain::{AdminPolicy, JsonObject, RecordError};
use crate::infrastructure::ItemRepository;

/// コレクションの定義
#[derive(Debug, Clone, Copy)]
pub struct CollectionResource {
    /// ルートのリソース名（例: `legal`）
    pub path: &'static str,
    /// リクエスト・レスポンスでの配列のキー（例: `legalDocs`）
    pub field: &'static str,
    /// PUT成功時のメッセージ
    pub updated_message: &'static str,
    /// テーブルが空の時に投入するドキュメント
    pub defaults: fn(&str) -> Vec<JsonObject>,
    /// 送られたドキュメントを保存用アイテムに変換
    pub to_item: fn(&Value, &str) -> Result<JsonObject, RecordError>,
}

pub struct CollectionHandler<R> {
    resource: CollectionResource,
    items: R,
    policy: AdminPolicy,
}

impl<R: ItemRepository> CollectionHandler<R> {
    pub fn new(resource: CollectionResource, items: R, policy: AdminPolicy) -> Self {
        Self {
            resource,
            items,
            policy,
        }
    }

    async fn list(&self) -> Result<ApiResponse, ApiError> {
        let mut items = self.items.scan().await?;

        if items.is_empty() {
            let defaults = (self.resource.defaults)(&iso_timestamp(Utc::now()));
            info!(resource = self.resource.path, count = defaults.len(), "既定データを投入");
            self.items.put_many(defaults).await?;
            items = self.items.scan().await?;
        }

        Ok(ApiResponse::ok(json!({ self.resource.field: items })))
    }

    async fn replace(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let body = request.json_object()?;
        let Some(Value::Array(documents)) = body.get(self.resource.field) else {
            return Err(ApiError::bad_request(format!(
                "Invalid request: {} must be an array",
                self.resource.field
            )));
        };

        let now = iso_timestamp(Utc::now());
        let items = documents
            .iter()
            .map(|document| (self.resource.to_item)(document, &now))
            .collect::<Result<Vec<_>, _>>()?;

        let count = items.len();
        self.items.put_many(items).await?;
        info!(resource = self.resource.path, count, "一括更新");

        Ok(ApiResponse::message(self.resource.updated_message))
    }
}

#[async_trait]
impl<R: ItemRepository> RequestHandler for CollectionHandler<R> {
    async fn route(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let rest = request
            .route_under(self.resource.path)
            .ok_or_else(route_not_found)?;
        if !rest.is_empty() {
            return Err(route_not_found());
        }

        match request.method() {
            "GET" => self.list().await,
            "PUT" => {
                require_admin(&self.policy, request)?;
                self.replace(request).await
            }
            _ => Err(route_not_found()),
        }
    }
}
