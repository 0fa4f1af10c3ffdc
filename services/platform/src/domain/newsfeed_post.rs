// ニュースフィードの投稿
//
// 公開済みの投稿はクロスポスト配信の対象になる。

use serde::Serialize;
use serde_json::{json, Value};

use super::json_value::{non_empty_str, JsonObject};
use super::media::public_url;
use super::record::{optional_string, required_string, PatchField, RecordError};

/// ニュースフィードテーブルのキー属性
pub const POST_KEY: &str = "postId";

/// 公開投稿一覧用のGSI名（status + createdAt）
pub const STATUS_CREATED_INDEX: &str = "StatusCreatedIndex";

/// 画像のアップロード先フォルダ
pub const POST_IMAGE_FOLDER: &str = "newsfeed/images";

/// 動画のアップロード先フォルダ
pub const POST_VIDEO_FOLDER: &str = "newsfeed/videos";

/// 動画キーを保持するフィールド名
pub const VIDEO_KEY_FIELD: &str = "videoKey";

/// 公開ステータス（作成時の既定値）
pub const POST_STATUS_PUBLISHED: &str = "published";

/// PUTで更新可能なフィールド
pub const POST_PATCH_FIELDS: &[PatchField] = &[
    PatchField::any("title"),
    PatchField::any("description"),
    PatchField::any("imageKey"),
    PatchField::any("videoKey"),
    PatchField::any("externalLink"),
    PatchField::any("location"),
    PatchField::any("locationUrl"),
    PatchField::any("status"),
];

/// 投稿レコード
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewsfeedPost {
    pub post_id: String,
    pub title: String,
    pub description: Option<String>,
    pub image_key: Option<String>,
    pub video_key: Option<String>,
    pub external_link: Option<String>,
    pub location: Option<String>,
    pub location_url: Option<String>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl NewsfeedPost {
    /// リクエストボディから新しい投稿を作成
    ///
    /// `title`は必須。ステータスの既定値は`published`。
    pub fn create(body: &JsonObject, post_id: String, now: &str) -> Result<Self, RecordError> {
        let title = required_string(body, "title")?;

        Ok(Self {
            post_id,
            title,
            description: optional_string(body, "description"),
            image_key: optional_string(body, "imageKey"),
            video_key: optional_string(body, VIDEO_KEY_FIELD),
            external_link: optional_string(body, "externalLink"),
            location: optional_string(body, "location"),
            location_url: optional_string(body, "locationUrl"),
            status: optional_string(body, "status")
                .unwrap_or_else(|| POST_STATUS_PUBLISHED.to_string()),
            created_at: now.to_string(),
            updated_at: now.to_string(),
        })
    }
}

/// 公開済みの投稿か
pub fn is_published(item: &JsonObject) -> bool {
    non_empty_str(item, "status") == Some(POST_STATUS_PUBLISHED)
}

/// 動画キーがあれば`videoUrl`を付与する
pub fn with_video_url(mut item: JsonObject, cdn_domain: &str) -> JsonObject {
    if let Some(key) = non_empty_str(&item, VIDEO_KEY_FIELD) {
        let url = public_url(cdn_domain, key);
        item.insert("videoUrl".to_string(), Value::String(url));
    }
    item
}

/// アップロード先フォルダ（`mediaType`が`video`なら動画用）
pub fn upload_folder(body: &JsonObject) -> &'static str {
    match non_empty_str(body, "mediaType") {
        Some("video") => POST_VIDEO_FOLDER,
        _ => POST_IMAGE_FOLDER,
    }
}

/// クロスポスト配信関数に渡すイベント
pub fn crosspost_event(tenant_id: &str, post: &JsonObject) -> Value {
    json!({ "tenantId": tenant_id, "post": post })
}
