/// ライブページ広告
///
/// 広告はテナントにつき1件のみで、固定IDのレコードとして保存する。
use serde::{Deserialize, Serialize};

/// 広告レコードの固定ID
pub const ADVERTISEMENT_ID: &str = "live-page-ad";

/// 広告テーブルのキー属性
pub const ADVERTISEMENT_KEY: &str = "adId";

/// 広告画像のアップロード先フォルダ
pub const ADVERTISEMENT_IMAGE_FOLDER: &str = "advertisements";

/// 広告レコード
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Advertisement {
    pub ad_id: String,
    pub image_key: Option<String>,
    pub link_url: Option<String>,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// 広告の更新リクエスト
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvertisementUpdate {
    #[serde(default)]
    pub image_key: Option<String>,
    #[serde(default)]
    pub link_url: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

impl Advertisement {
    /// 未設定時に返す無効な広告
    pub fn disabled() -> Self {
        Self {
            ad_id: ADVERTISEMENT_ID.to_string(),
            image_key: None,
            link_url: None,
            enabled: false,
            updated_at: None,
        }
    }

    /// 更新リクエストから広告レコードを作成（全置換）
    ///
    /// 空文字列の画像キー・リンクはnullとして扱い、`enabled`の既定値は`true`。
    pub fn from_update(update: AdvertisementUpdate, now: &str) -> Self {
        Self {
            ad_id: ADVERTISEMENT_ID.to_string(),
            image_key: update.image_key.filter(|s| !s.is_empty()),
            link_url: update.link_url.filter(|s| !s.is_empty()),
            enabled: update.enabled.unwrap_or(true),
            updated_at: Some(now.to_string()),
        }
    }
}
