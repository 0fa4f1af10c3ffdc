// チャンネルページに表示する外部チャンネル一覧

use serde_json::{json, Value};

use super::json_value::JsonObject;
use super::record::{keyed_item, RecordError, UPDATED_AT_FIELD};

/// チャンネルテーブルのキー属性
pub const CHANNEL_KEY: &str = "channelId";

/// BatchWriteItemの1リクエストあたりの上限
pub const BATCH_WRITE_LIMIT: usize = 25;

/// 既定チャンネル定義
struct DefaultChannel {
    id: &'static str,
    name: &'static str,
    platform: &'static str,
    url: &'static str,
    followers: &'static str,
    description: &'static str,
    color: &'static str,
    category: &'static str,
}

const DEFAULT_CHANNELS: [DefaultChannel; 8] = [
    DefaultChannel {
        id: "spotify",
        name: "@yourchannel",
        platform: "Spotify",
        url: "https://open.spotify.com/artist/yourchannel",
        followers: "50K",
        description: "Listen to our music and playlists",
        color: "#1DB954",
        category: "Musik-Streaming",
    },
    DefaultChannel {
        id: "youtube",
        name: "@YourChannel",
        platform: "YouTube",
        url: "https://youtube.com/@yourchannel",
        followers: "100K",
        description: "Subscribe for videos and live streams",
        color: "#FF0000",
        category: "Video & Livestreaming",
    },
    DefaultChannel {
        id: "tiktok",
        name: "@yourchannel",
        platform: "TikTok",
        url: "https://tiktok.com/@yourchannel",
        followers: "200K",
        description: "Short videos and trending content",
        color: "#000000",
        category: "Social Media",
    },
    DefaultChannel {
        id: "instagram",
        name: "@yourchannel",
        platform: "Instagram",
        url: "https://instagram.com/yourchannel",
        followers: "75K",
        description: "Photos, Reels and Stories",
        color: "#E4405F",
        category: "Social Media",
    },
    DefaultChannel {
        id: "twitch",
        name: "YourChannel",
        platform: "Twitch",
        url: "https://twitch.tv/yourchannel",
        followers: "50K",
        description: "Watch live streams",
        color: "#9146FF",
        category: "Video & Livestreaming",
    },
    DefaultChannel {
        id: "discord",
        name: "Your Server",
        platform: "Discord",
        url: "https://discord.gg/yourchannel",
        followers: "25K",
        description: "Community chat and voice",
        color: "#5865F2",
        category: "Gaming & Interactive",
    },
    DefaultChannel {
        id: "twitter",
        name: "@yourchannel",
        platform: "X (Twitter)",
        url: "https://x.com/yourchannel",
        followers: "45K",
        description: "Latest updates and news",
        color: "#000000",
        category: "Social Media",
    },
    DefaultChannel {
        id: "facebook",
        name: "Your Channel",
        platform: "Facebook",
        url: "https://facebook.com/yourchannel",
        followers: "60K",
        description: "Community and updates",
        color: "#1877F2",
        category: "Social Media",
    },
];

/// テーブル初期化用の既定チャンネルを生成
///
/// `iconType`はチャンネルIDと同じ値。
pub fn default_channels(now: &str) -> Vec<JsonObject> {
    DEFAULT_CHANNELS
        .iter()
        .filter_map(|c| {
            match json!({
                CHANNEL_KEY: c.id,
                "id": c.id,
                "name": c.name,
                "platform": c.platform,
                "url": c.url,
                "followers": c.followers,
                "description": c.description,
                "color": c.color,
                "iconType": c.id,
                "category": c.category,
                "enabled": true,
                UPDATED_AT_FIELD: now,
            }) {
                Value::Object(map) => Some(map),
                _ => None,
            }
        })
        .collect()
}

/// 管理画面から送られたチャンネルを保存用アイテムに変換
pub fn channel_item(document: &Value, now: &str) -> Result<JsonObject, RecordError> {
    keyed_item(document, CHANNEL_KEY, now, &[UPDATED_AT_FIELD])
}
