// クロスポスト対象チャンネル
//
// 投稿を各SNSへ転送するチャンネルの一覧と、テナント設定から
// 配信可否を判定する条件を定義する。
// 配信そのものはチャンネルごとの関数が行う。

use serde_json::json;

use super::json_value::{array_len, field_is_truthy, lenient_i64, JsonObject};

/// チャンネル設定テーブルのキー属性
pub const SETTINGS_KEY: &str = "tenant_id";

/// 当日の投稿数フィールド
pub const POSTS_TODAY_FIELD: &str = "postsToday";

/// 投稿数をリセットした日付フィールド（`YYYY-MM-DD`）
pub const POSTS_LAST_RESET_FIELD: &str = "postsLastReset";

/// クロスポスト先チャンネル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrosspostChannel {
    Telegram,
    Discord,
    Slack,
    Facebook,
    Instagram,
    XTwitter,
    LinkedIn,
    YouTube,
    Bluesky,
    Mastodon,
    TikTok,
    Snapchat,
    Threads,
    WhatsApp,
}

impl CrosspostChannel {
    /// 配信順に並べた全チャンネル
    pub const ALL: [CrosspostChannel; 14] = [
        Self::Telegram,
        Self::Discord,
        Self::Slack,
        Self::Facebook,
        Self::Instagram,
        Self::XTwitter,
        Self::LinkedIn,
        Self::YouTube,
        Self::Bluesky,
        Self::Mastodon,
        Self::TikTok,
        Self::Snapchat,
        Self::Threads,
        Self::WhatsApp,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Telegram => "telegram",
            Self::Discord => "discord",
            Self::Slack => "slack",
            Self::Facebook => "facebook",
            Self::Instagram => "instagram",
            Self::XTwitter => "xtwitter",
            Self::LinkedIn => "linkedin",
            Self::YouTube => "youtube",
            Self::Bluesky => "bluesky",
            Self::Mastodon => "mastodon",
            Self::TikTok => "tiktok",
            Self::Snapchat => "snapchat",
            Self::Threads => "threads",
            Self::WhatsApp => "whatsapp",
        }
    }

    /// 設定テーブル名の環境変数（例: `TELEGRAM_SETTINGS_TABLE`）
    pub fn settings_table_env(self) -> String {
        format!("{}_SETTINGS_TABLE", self.name().to_uppercase())
    }

    /// 配信関数名の環境変数（例: `LAMBDA_TELEGRAM`）
    pub fn function_name_env(self) -> String {
        format!("LAMBDA_{}", self.name().to_uppercase())
    }

    /// テナント設定でチャンネルが有効か
    ///
    /// `enabled`に加えて、チャンネルごとの認証情報が揃っている必要がある。
    pub fn is_enabled(self, settings: &JsonObject) -> bool {
        let has = |key: &str| field_is_truthy(settings, key);

        if !has("enabled") {
            return false;
        }

        match self {
            Self::Telegram => has("botToken") && has("chatId"),
            Self::Discord | Self::Slack => has("webhookUrl"),
            Self::Facebook => has("pageAccessToken") && has("pageId"),
            Self::Instagram => has("accessToken") && has("accountId"),
            Self::XTwitter => has("oauth2AccessToken") || (has("apiKey") && has("accessToken")),
            Self::LinkedIn | Self::YouTube | Self::TikTok => has("accessToken"),
            Self::Bluesky => has("handle") && has("appPassword"),
            Self::Mastodon => has("instanceUrl") && has("accessToken"),
            Self::Snapchat => has("accessToken") && has("organizationId"),
            Self::Threads => has("accessToken") && has("userId"),
            Self::WhatsApp => true,
        }
    }

    /// 投稿内容がチャンネルの配信条件を満たすか
    ///
    /// YouTubeはショート動画のみ。TikTokは動画か2枚以上の画像。
    /// Snapchatは動画か画像が必要。
    pub fn accepts_post(self, post: &JsonObject) -> bool {
        let has = |key: &str| field_is_truthy(post, key);

        match self {
            Self::YouTube => has("isShort") && has("videoKey"),
            Self::TikTok => {
                has("videoKey")
                    || has("videoUrl")
                    || array_len(post, "imageUrls") >= 2
                    || array_len(post, "images") >= 2
            }
            Self::Snapchat => has("videoKey") || has("imageKey"),
            _ => true,
        }
    }
}

impl std::fmt::Display for CrosspostChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 日次投稿カウンタの更新値
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostCounter {
    pub posts_today: i64,
    pub last_reset: String,
}

impl PostCounter {
    /// 現在の設定と当日の日付から次のカウンタ値を求める
    ///
    /// 最終リセット日が当日でなければ1から数え直す。
    pub fn next(settings: &JsonObject, today: &str) -> Self {
        let same_day = settings
            .get(POSTS_LAST_RESET_FIELD)
            .and_then(|v| v.as_str())
            .is_some_and(|d| d == today);

        let current = if same_day {
            lenient_i64(settings.get(POSTS_TODAY_FIELD)).unwrap_or(0)
        } else {
            0
        };

        Self {
            posts_today: current + 1,
            last_reset: today.to_string(),
        }
    }

    /// 設定テーブルへ書き込む属性
    pub fn fields(&self) -> Vec<(String, serde_json::Value)> {
        vec![
            (POSTS_TODAY_FIELD.to_string(), json!(self.posts_today)),
            (POSTS_LAST_RESET_FIELD.to_string(), json!(self.last_reset)),
        ]
    }
}
