// ニュースフィードハンドラー
//
// 公開一覧は`published`の投稿を新しい順で返す。
// 投稿が公開された時点でクロスポスト配信関数を非同期呼び出しする。

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::api_error::ApiError;
use super::api_request::ApiRequest;
use super::api_response::ApiResponse;
use super::catalog::{Catalog, CatalogResource};
use super::media_upload::issue_upload_url;
use super::request_handler::{require_admin, route_not_found, RequestHandler};
use crate::domain::json_value::non_empty_str;
use crate::domain::newsfeed_post::{
    crosspost_event, is_published, upload_folder, with_video_url, NewsfeedPost,
    POST_IMAGE_FOLDER, POST_PATCH_FIELDS, POST_STATUS_PUBLISHED, STATUS_CREATED_INDEX,
    VIDEO_KEY_FIELD,
};
use crate::domain::record_id::POST_ID_PREFIX;
use crate::domain::timestamp::iso_timestamp;
use crate::domain::{AdminPolicy, JsonObject};
use crate::infrastructure::{DispatchConfig, FunctionInvoker, ItemRepository, MediaStore};

pub const NEWSFEED_PATH: &str = "newsfeed";

pub const POST_RESOURCE: CatalogResource = CatalogResource {
    label: "Post",
    id_prefix: POST_ID_PREFIX,
    image_folder: POST_IMAGE_FOLDER,
    patch_fields: POST_PATCH_FIELDS,
};

fn created_at(item: &JsonObject) -> &str {
    item.get("createdAt").and_then(|v| v.as_str()).unwrap_or_default()
}

pub struct NewsfeedHandler<R, M, I> {
    catalog: Catalog<R, M>,
    cdn_domain: String,
    policy: AdminPolicy,
    invoker: I,
    /// 未設定ならクロスポストしない
    dispatch: Option<DispatchConfig>,
}

impl<R: ItemRepository, M: MediaStore, I: FunctionInvoker> NewsfeedHandler<R, M, I> {
    pub fn new(
        posts: R,
        media: M,
        cdn_domain: impl Into<String>,
        policy: AdminPolicy,
        invoker: I,
        dispatch: Option<DispatchConfig>,
    ) -> Self {
        let cdn_domain = cdn_domain.into();
        Self {
            catalog: Catalog::new(POST_RESOURCE, posts, media, cdn_domain.clone()),
            cdn_domain,
            policy,
            invoker,
            dispatch,
        }
    }

    /// `imageUrl`・`videoUrl`を付与
    fn present(&self, item: JsonObject) -> Value {
        match self.catalog.present(item) {
            Value::Object(item) => Value::Object(with_video_url(item, &self.cdn_domain)),
            other => other,
        }
    }

    /// クロスポスト配信を起動する（失敗しても投稿の保存は成功扱い）
    async fn crosspost(&self, post: &Value) {
        let (Some(dispatch), Some(post)) = (&self.dispatch, post.as_object()) else {
            return;
        };

        let event = crosspost_event(&dispatch.tenant_id, post);
        match self.invoker.invoke_async(&dispatch.function_name, &event).await {
            Ok(()) => info!(post_id = ?post.get("postId"), "クロスポスト配信を起動"),
            Err(e) => warn!(
                post_id = ?post.get("postId"),
                error = %e,
                "クロスポスト配信の起動に失敗"
            ),
        }
    }

    async fn list(&self) -> Result<ApiResponse, ApiError> {
        let mut items = self
            .catalog
            .items()
            .query_index(STATUS_CREATED_INDEX, "status", POST_STATUS_PUBLISHED)
            .await?;
        items.sort_by(|a, b| created_at(b).cmp(created_at(a)));

        let posts: Vec<Value> = items.into_iter().map(|item| self.present(item)).collect();
        Ok(ApiResponse::ok(json!({ "posts": posts })).cached())
    }

    async fn get(&self, id: &str) -> Result<ApiResponse, ApiError> {
        let item = self.catalog.fetch(id).await?;
        Ok(ApiResponse::ok(json!({ "post": self.present(item) })).cached())
    }

    async fn create(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let body = request.json_object()?;
        let now = Utc::now();
        let post = NewsfeedPost::create(&body, self.catalog.new_id(now), &iso_timestamp(now))?;

        let item = self.catalog.insert(&post).await?;
        let published = is_published(&item);
        let post = self.present(item);
        if published {
            self.crosspost(&post).await;
        }

        Ok(ApiResponse::created(json!({ "post": post })))
    }

    /// 未公開から公開に変わった投稿はクロスポストする
    async fn update(&self, id: &str, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let body = request.json_object()?;
        let publishing = self.dispatch.is_some() && is_published(&body);
        let was_published = publishing && is_published(&self.catalog.fetch(id).await?);

        let post = self.present(self.catalog.patch(id, &body).await?);
        if publishing && !was_published {
            self.crosspost(&post).await;
        }

        Ok(ApiResponse::ok(json!({ "message": "Post updated", "post": post })))
    }

    /// 動画・画像を削除してから投稿を削除
    async fn delete(&self, id: &str) -> Result<ApiResponse, ApiError> {
        let item = self.catalog.fetch(id).await?;
        if let Some(key) = non_empty_str(&item, VIDEO_KEY_FIELD) {
            self.catalog.media().delete(key).await?;
        }
        self.catalog.remove(id).await?;

        Ok(ApiResponse::message("Post deleted"))
    }

    async fn upload_url(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let folder = upload_folder(&request.json_object()?);
        issue_upload_url(self.catalog.media(), &self.cdn_domain, folder, request).await
    }
}

#[async_trait]
impl<R: ItemRepository, M: MediaStore, I: FunctionInvoker> RequestHandler for NewsfeedHandler<R, M, I> {
    async fn route(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let rest = request.route_under(NEWSFEED_PATH).ok_or_else(route_not_found)?;

        match (request.method(), rest.as_slice()) {
            ("GET", []) => return self.list().await,
            ("GET", [id]) if *id != "upload-url" => return self.get(id).await,
            _ => {}
        }

        require_admin(&self.policy, request)?;

        match (request.method(), rest.as_slice()) {
            ("POST", []) => self.create(request).await,
            ("POST", ["upload-url"]) => self.upload_url(request).await,
            ("PUT", [id]) => self.update(id, request).await,
            ("DELETE", [id]) => self.delete(id).await,
            _ => Err(route_not_found()),
        }
    }
}
