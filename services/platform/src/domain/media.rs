// 画像メディアのキーと公開URL
//
// アップロード先のS3キー生成、CDN経由の公開URL組み立て、
// レコードへの`imageUrl`付与を扱う。

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::json_value::{non_empty_str, JsonObject};

/// 署名付きアップロードURLの有効期間（秒）
pub const UPLOAD_URL_EXPIRES_SECS: u64 = 3600;

/// 画像キーを保持するフィールド名
pub const IMAGE_KEY_FIELD: &str = "imageKey";

/// 公開URLを付与するフィールド名
pub const IMAGE_URL_FIELD: &str = "imageUrl";

/// アップロードリクエストの検証エラー
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UploadRequestError {
    #[error("{0} is required")]
    MissingField(&'static str),
}

/// 署名付きアップロードURLの発行リクエスト
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
}

impl UploadRequest {
    /// ファイル名とContent-Typeを検証して取り出す
    pub fn validate(&self) -> Result<(&str, &str), UploadRequestError> {
        let file_name = self
            .file_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(UploadRequestError::MissingField("fileName"))?;

        let file_type = self
            .file_type
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(UploadRequestError::MissingField("fileType"))?;

        Ok((file_name, file_type))
    }
}

/// アップロード先のS3キーを生成
///
/// `<folder>/<UNIXミリ秒>_<ファイル名>`。ファイル名中のパス区切りは`_`に置換し、
/// フォルダ外へのキーを作らない。
pub fn upload_key(folder: &str, file_name: &str, at: DateTime<Utc>) -> String {
    let safe_name: String = file_name
        .trim()
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();

    format!("{}/{}_{}", folder, at.timestamp_millis(), safe_name)
}

/// CDNドメイン上の公開URL
pub fn public_url(cdn_domain: &str, key: &str) -> String {
    format!("https://{}/{}", cdn_domain, key)
}

/// レコードに`imageUrl`を付与する
///
/// `imageKey`が空でなければCDNの公開URL、無ければnull。
pub fn with_image_url(mut item: JsonObject, cdn_domain: &str) -> JsonObject {
    let url = non_empty_str(&item, IMAGE_KEY_FIELD)
        .map(|key| Value::String(public_url(cdn_domain, key)))
        .unwrap_or(Value::Null);

    item.insert(IMAGE_URL_FIELD.to_string(), url);
    item
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_upload_request_validate_ok() {
        let request = UploadRequest {
            file_name: Some("banner.png".to_string()),
            file_type: Some("image/png".to_string()),
        };
        assert_eq!(request.validate(), Ok(("banner.png", "image/png")));
    }

    #[test]
    fn test_upload_request_missing_fields() {
        let request = UploadRequest {
            file_name: None,
            file_type: Some("image/png".to_string()),
        };
        assert_eq!(
            request.validate(),
            Err(UploadRequestError::MissingField("fileName"))
        );

        let request = UploadRequest {
            file_name: Some("a.png".to_string()),
            file_type: Some("  ".to_string()),
        };
        assert_eq!(
            request.validate(),
            Err(UploadRequestError::MissingField("fileType"))
        );
    }

    #[test]
    fn test_upload_request_error_display() {
        assert_eq!(
            UploadRequestError::MissingField("fileName").to_string(),
            "fileName is required"
        );
    }

    #[test]
    fn test_upload_key_format() {
        let at = Utc.with_ymd_and_hms(2025, 1, 15, 9, 30, 0).unwrap();
        assert_eq!(
            upload_key("products", "shirt.jpg", at),
            format!("products/{}_shirt.jpg", at.timestamp_millis())
        );
    }

    #[test]
    fn test_upload_key_strips_path_separators() {
        let at = Utc.with_ymd_and_hms(2025, 1, 15, 9, 30, 0).unwrap();
        let key = upload_key("team", "../../etc/passwd", at);
        assert!(key.starts_with("team/"));
        assert_eq!(key.matches('/').count(), 1);
    }

    #[test]
    fn test_with_image_url_present() {
        let item = json!({"productId": "p1", "imageKey": "products/1_a.png"});
        let enriched = with_image_url(item.as_object().unwrap().clone(), "cdn.example.com");
        assert_eq!(
            enriched["imageUrl"],
            json!("https://cdn.example.com/products/1_a.png")
        );
    }

    #[test]
    fn test_with_image_url_absent() {
        let item = json!({"productId": "p1", "imageKey": null});
        let enriched = with_image_url(item.as_object().unwrap().clone(), "cdn.example.com");
        assert_eq!(enriched["imageUrl"], Value::Null);
    }
}
