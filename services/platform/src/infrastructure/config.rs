/// 環境変数からの設定読み込み
///
/// テーブル名・バケット名・CDNドメイン・クロスポスト先関数名は
/// すべてLambdaの環境変数で与えられる。
use aws_config::SdkConfig;
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::domain::CrosspostChannel;

/// 設定読み込みエラー
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}

// テーブル名の環境変数
pub const ENV_ADS_TABLE: &str = "ADS_TABLE_NAME";
pub const ENV_PRODUCTS_TABLE: &str = "PRODUCTS_TABLE_NAME";
pub const ENV_EVENTS_TABLE: &str = "EVENTS_TABLE_NAME";
pub const ENV_TEAM_TABLE: &str = "TEAM_TABLE_NAME";
pub const ENV_LEGAL_DOCS_TABLE: &str = "LEGAL_DOCS_TABLE_NAME";
pub const ENV_CHANNELS_TABLE: &str = "CHANNELS_TABLE_NAME";
pub const ENV_ORDERS_TABLE: &str = "ORDERS_TABLE_NAME";
pub const ENV_SPONSORS_TABLE: &str = "SPONSORS_TABLE_NAME";
pub const ENV_STATS_TABLE: &str = "STATS_TABLE_NAME";
pub const ENV_NEWSFEED_TABLE: &str = "NEWSFEED_TABLE_NAME";

// 新規投稿のクロスポスト
pub const ENV_CROSSPOST_DISPATCHER: &str = "CROSSPOST_DISPATCHER_LAMBDA";
pub const ENV_TENANT_ID: &str = "TENANT_ID";

/// テナントID未設定時の値
pub const DEFAULT_TENANT_ID: &str = "platform";

// メディア配信
pub const ENV_IMAGES_BUCKET: &str = "IMAGES_BUCKET_NAME";
pub const ENV_CDN_DOMAIN: &str = "CDN_DOMAIN";

/// 空でない環境変数を取得
pub fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// 必須の環境変数を取得
pub fn required_var(name: &str) -> Result<String, ConfigError> {
    optional_var(name).ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

/// 画像アップロード・配信の設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaConfig {
    /// 画像保存用S3バケット
    pub bucket: String,
    /// CloudFrontドメイン（`https://`なし）
    pub cdn_domain: String,
}

impl MediaConfig {
    pub fn new(bucket: impl Into<String>, cdn_domain: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            cdn_domain: cdn_domain.into(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            bucket: required_var(ENV_IMAGES_BUCKET)?,
            cdn_domain: required_var(ENV_CDN_DOMAIN)?,
        })
    }
}

/// クロスポスト先1チャンネル分の設定
///
/// 設定テーブルまたは関数名が未設定のチャンネルは配信対象外。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelTarget {
    pub channel: CrosspostChannel,
    pub settings_table: Option<String>,
    pub function_name: Option<String>,
}

/// クロスポスト配信設定（全チャンネル分、配信順）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrosspostConfig {
    targets: Vec<ChannelTarget>,
}

impl CrosspostConfig {
    pub fn new(targets: Vec<ChannelTarget>) -> Self {
        Self { targets }
    }

    /// 任意の参照関数から設定を組み立てる
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let targets = CrosspostChannel::ALL
            .iter()
            .map(|&channel| ChannelTarget {
                channel,
                settings_table: lookup(&channel.settings_table_env()),
                function_name: lookup(&channel.function_name_env()),
            })
            .collect();

        Self { targets }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(optional_var)
    }

    pub fn targets(&self) -> &[ChannelTarget] {
        &self.targets
    }
}

/// 新規投稿をクロスポスト配信関数へ渡すための設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    pub function_name: String,
    pub tenant_id: String,
}

impl DispatchConfig {
    /// 配信関数名が未設定なら`None`（クロスポストしない）
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        Some(Self {
            function_name: lookup(ENV_CROSSPOST_DISPATCHER)?,
            tenant_id: lookup(ENV_TENANT_ID).unwrap_or_else(|| DEFAULT_TENANT_ID.to_string()),
        })
    }

    pub fn from_env() -> Option<Self> {
        Self::from_lookup(optional_var)
    }
}

/// AWS SDK設定（warm start時は再利用）
static SDK_CONFIG: OnceCell<SdkConfig> = OnceCell::const_new();

/// AWS SDK設定を取得（未読み込みなら環境から読み込む）
pub async fn aws_sdk_config() -> &'static SdkConfig {
    SDK_CONFIG
        .get_or_init(|| async {
            aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await
        })
        .await
}
