// 画像アップロードURLの発行と画像削除

use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use tracing::info;

use super::api_error::ApiError;
use super::api_request::ApiRequest;
use super::api_response::ApiResponse;
use crate::domain::json_value::non_empty_str;
use crate::domain::media::{public_url, upload_key, IMAGE_KEY_FIELD, UPLOAD_URL_EXPIRES_SECS};
use crate::domain::{JsonObject, UploadRequest};
use crate::infrastructure::MediaStore;

/// `{fileName, fileType}`から署名付きPUT URLを発行する
///
/// レスポンスは`{uploadUrl, imageKey, imageUrl}`。
pub async fn issue_upload_url<M: MediaStore + ?Sized>(
    store: &M,
    cdn_domain: &str,
    folder: &str,
    request: &ApiRequest,
) -> Result<ApiResponse, ApiError> {
    let upload: UploadRequest = request.parse_body()?;
    let (file_name, file_type) = upload.validate()?;

    let key = upload_key(folder, file_name, Utc::now());
    let upload_url = store
        .presign_upload(&key, file_type, Duration::from_secs(UPLOAD_URL_EXPIRES_SECS))
        .await?;

    info!(key = %key, content_type = %file_type, "アップロードURL発行");

    Ok(ApiResponse::ok(json!({
        "uploadUrl": upload_url,
        "imageUrl": public_url(cdn_domain, &key),
        "imageKey": key,
    })))
}

/// レコードに画像があればストレージから削除する
///
/// 削除した場合は`true`。
pub async fn delete_record_image<M: MediaStore + ?Sized>(
    store: &M,
    record: &JsonObject,
) -> Result<bool, ApiError> {
    let Some(key) = non_empty_str(record, IMAGE_KEY_FIELD) else {
        return Ok(false);
    };

    store.delete(key).await?;
    info!(key = %key, "画像を削除");
    Ok(true)
}
