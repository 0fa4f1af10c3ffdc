// 画像付きカタログリソース（商品・イベント・チーム）の共通操作
//
// 取得・作成・部分更新・削除・アップロードURL発行を提供する。
// 一覧の取得方法と作成時の検証はリソースごとのハンドラーが行う。

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::api_error::ApiError;
use super::api_request::ApiRequest;
use super::api_response::ApiResponse;
use super::media_upload::{delete_record_image, issue_upload_url};
use super::request_handler::to_object;
use crate::domain::media::with_image_url;
use crate::domain::record::build_patch;
use crate::domain::record_id::generate_record_id;
use crate::domain::timestamp::iso_timestamp;
use crate::domain::{JsonObject, PatchField};
use crate::infrastructure::{ItemRepository, MediaStore, RepositoryError};

/// カタログリソースの定義
#[derive(Debug, Clone, Copy)]
pub struct CatalogResource {
    /// レスポンスやメッセージに使う名前（例: `Product`）
    pub label: &'static str,
    /// IDの接頭辞
    pub id_prefix: &'static str,
    /// 画像のアップロード先フォルダ
    pub image_folder: &'static str,
    /// PUTで更新可能なフィールド
    pub patch_fields: &'static [PatchField],
}

/// カタログリソースのストア
pub struct Catalog<R, M> {
    resource: CatalogResource,
    items: R,
    media: M,
    cdn_domain: String,
}

impl<R: ItemRepository, M: MediaStore> Catalog<R, M> {
    pub fn new(resource: CatalogResource, items: R, media: M, cdn_domain: impl Into<String>) -> Self {
        Self {
            resource,
            items,
            media,
            cdn_domain: cdn_domain.into(),
        }
    }

    pub fn items(&self) -> &R {
        &self.items
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    /// 新しいレコードIDを採番
    pub fn new_id(&self, now: DateTime<Utc>) -> String {
        generate_record_id(self.resource.id_prefix, now)
    }

    /// `imageUrl`を付与してレスポンス用の値に変換
    pub fn present(&self, item: JsonObject) -> Value {
        Value::Object(with_image_url(item, &self.cdn_domain))
    }

    pub fn present_all(&self, items: Vec<JsonObject>) -> Vec<Value> {
        items.into_iter().map(|item| self.present(item)).collect()
    }

    fn not_found(&self) -> ApiError {
        ApiError::not_found(format!("{} not found", self.resource.label))
    }

    /// IDでレコードを取得（無ければ404）
    pub async fn fetch(&self, id: &str) -> Result<JsonObject, ApiError> {
        self.items.get(id).await?.ok_or_else(|| self.not_found())
    }

    /// レコードを保存して保存内容を返す
    pub async fn insert<T: Serialize>(&self, record: &T) -> Result<JsonObject, ApiError> {
        let item = to_object(record)?;
        self.items.put(item.clone()).await?;

        info!(
            resource = self.resource.label,
            key = ?item.get(self.items.key_attribute()),
            "レコード作成"
        );
        Ok(item)
    }

    /// ボディに含まれるフィールドのみ更新し、更新後のレコードを返す
    pub async fn patch(&self, id: &str, body: &JsonObject) -> Result<JsonObject, ApiError> {
        let fields = build_patch(body, self.resource.patch_fields, &iso_timestamp(Utc::now()))?;

        match self.items.update(id, fields).await {
            Ok(item) => {
                info!(resource = self.resource.label, key = %id, "レコード更新");
                Ok(item)
            }
            Err(RepositoryError::NotFound(_)) => Err(self.not_found()),
            Err(e) => Err(e.into()),
        }
    }

    /// 画像を削除してからレコードを削除
    pub async fn remove(&self, id: &str) -> Result<(), ApiError> {
        let item = self.fetch(id).await?;
        delete_record_image(&self.media, &item).await?;
        self.items.delete(id).await?;

        info!(resource = self.resource.label, key = %id, "レコード削除");
        Ok(())
    }

    /// 画像アップロードURLを発行
    pub async fn upload_url(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        issue_upload_url(&self.media, &self.cdn_domain, self.resource.image_folder, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::PatchField;
    use crate::infrastructure::item_repository::tests::MockItemRepository;
    use crate::infrastructure::media_store::tests::MockMediaStore;
    use serde_json::json;

    const WIDGETS: CatalogResource = CatalogResource {
        label: "Widget",
        id_prefix: "widget",
        image_folder: "widgets",
        patch_fields: &[PatchField::any("name"), PatchField::number("price")],
    };

    fn catalog() -> (Catalog<MockItemRepository, MockMediaStore>, MockItemRepository, MockMediaStore) {
        let repo = MockItemRepository::with_items(
            "widgetId",
            vec![json!({"widgetId": "w1", "name": "Old", "price": 1.0, "imageKey": "widgets/1_w.png"})],
        );
        let media = MockMediaStore::new();
        (
            Catalog::new(WIDGETS, repo.clone(), media.clone(), "cdn.test"),
            repo,
            media,
        )
    }

    #[tokio::test]
    async fn test_fetch_and_present() {
        let (catalog, _, _) = catalog();

        let item = catalog.fetch("w1").await.unwrap();
        let presented = catalog.present(item);

        assert_eq!(presented["imageUrl"], json!("https://cdn.test/widgets/1_w.png"));
        assert_eq!(
            catalog.fetch("missing").await,
            Err(ApiError::NotFound("Widget not found".to_string()))
        );
    }

    #[tokio::test]
    async fn test_patch_only_touches_given_fields() {
        let (catalog, repo, _) = catalog();
        let body = json!({"price": "2.5", "unknown": true}).as_object().unwrap().clone();

        let updated = catalog.patch("w1", &body).await.unwrap();

        assert_eq!(updated["price"], json!(2.5));
        assert_eq!(updated["name"], json!("Old"));
        assert!(updated.get("unknown").is_none());
        assert!(updated.get("updatedAt").is_some());
        assert_eq!(repo.item("w1").unwrap()["price"], json!(2.5));
    }

    #[tokio::test]
    async fn test_patch_missing_is_404() {
        let (catalog, _, _) = catalog();
        let body = json!({"name": "x"}).as_object().unwrap().clone();

        assert_eq!(
            catalog.patch("nope", &body).await,
            Err(ApiError::NotFound("Widget not found".to_string()))
        );
    }

    #[tokio::test]
    async fn test_remove_deletes_image_first() {
        let (catalog, repo, media) = catalog();

        catalog.remove("w1").await.unwrap();

        assert_eq!(media.deleted(), vec!["widgets/1_w.png".to_string()]);
        assert!(repo.item("w1").is_none());
    }

    #[tokio::test]
    async fn test_new_id_prefix() {
        let (catalog, _, _) = catalog();
        assert!(catalog.new_id(Utc::now()).starts_with("widget_"));
    }
}
