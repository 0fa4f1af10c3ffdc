// ライブページ広告ハンドラー
//
// 広告は固定IDの1レコードのみ。未設定時は無効な広告を返す。

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;

use super::api_error::ApiError;
use super::api_request::ApiRequest;
use super::api_response::ApiResponse;
use super::media_upload::{delete_record_image, issue_upload_url};
use super::request_handler::{require_admin, route_not_found, to_object, RequestHandler};
use crate::domain::advertisement::{
    Advertisement, AdvertisementUpdate, ADVERTISEMENT_ID, ADVERTISEMENT_IMAGE_FOLDER,
};
use crate::domain::media::{with_image_url, IMAGE_KEY_FIELD};
use crate::domain::record::UPDATED_AT_FIELD;
use crate::domain::timestamp::iso_timestamp;
use crate::domain::{AdminPolicy, JsonObject};
use crate::infrastructure::{ItemRepository, MediaStore};

pub const ADVERTISEMENT_PATH: &str = "advertisement";

pub struct AdvertisementHandler<R, M> {
    ads: R,
    media: M,
    cdn_domain: String,
    policy: AdminPolicy,
}

impl<R: ItemRepository, M: MediaStore> AdvertisementHandler<R, M> {
    pub fn new(ads: R, media: M, cdn_domain: impl Into<String>, policy: AdminPolicy) -> Self {
        Self {
            ads,
            media,
            cdn_domain: cdn_domain.into(),
            policy,
        }
    }

    fn present(&self, item: JsonObject) -> Value {
        Value::Object(with_image_url(item, &self.cdn_domain))
    }

    async fn current(&self) -> Result<ApiResponse, ApiError> {
        let item = match self.ads.get(ADVERTISEMENT_ID).await? {
            Some(item) => item,
            None => to_object(&Advertisement::disabled())?,
        };

        Ok(ApiResponse::ok(json!({ "advertisement": self.present(item) })))
    }

    /// 広告を全置換で保存
    async fn replace(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let update: AdvertisementUpdate = request.parse_body()?;
        let advertisement = Advertisement::from_update(update, &iso_timestamp(Utc::now()));

        let item = to_object(&advertisement)?;
        self.ads.put(item.clone()).await?;
        info!(enabled = advertisement.enabled, "広告を更新");

        Ok(ApiResponse::ok(json!({
            "message": "Advertisement updated",
            "advertisement": self.present(item),
        })))
    }

    /// 画像を削除して`imageKey`をクリア（画像が無ければ何もしない）
    async fn delete_image(&self) -> Result<ApiResponse, ApiError> {
        if let Some(item) = self.ads.get(ADVERTISEMENT_ID).await? {
            if delete_record_image(&self.media, &item).await? {
                self.ads
                    .update(
                        ADVERTISEMENT_ID,
                        vec![
                            (IMAGE_KEY_FIELD.to_string(), Value::Null),
                            (
                                UPDATED_AT_FIELD.to_string(),
                                Value::String(iso_timestamp(Utc::now())),
                            ),
                        ],
                    )
                    .await?;
            }
        }

        Ok(ApiResponse::message("Advertisement image deleted"))
    }
}

#[async_trait]
impl<R: ItemRepository, M: MediaStore> RequestHandler for AdvertisementHandler<R, M> {
    async fn route(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let rest = request
            .route_under(ADVERTISEMENT_PATH)
            .ok_or_else(route_not_found)?;

        if let ("GET", []) = (request.method(), rest.as_slice()) {
            return self.current().await;
        }

        require_admin(&self.policy, request)?;

        match (request.method(), rest.as_slice()) {
            ("PUT", []) => self.replace(request).await,
            ("POST", ["upload-url"]) => {
                issue_upload_url(&self.media, &self.cdn_domain, ADVERTISEMENT_IMAGE_FOLDER, request)
                    .await
            }
            ("DELETE", ["image"]) => self.delete_image().await,
            _ => Err(route_not_found()),
        }
    }
}
