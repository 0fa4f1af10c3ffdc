// クロスポスト配信
//
// テナントの投稿を、有効なチャンネルごとの配信関数へ非同期呼び出しで振り分ける。
// 各チャンネルの処理は並行に実行し、結果はチャンネルの定義順で返す。

use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use crate::domain::timestamp::utc_date;
use crate::domain::{CrosspostChannel, JsonObject, PostCounter};
use crate::infrastructure::{CrosspostConfig, FunctionInvoker, ItemRepository};

/// チャンネルごとの配信結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchStatus {
    Invoked,
    Error,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchResult {
    pub channel: String,
    pub status: DispatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DispatchResult {
    fn new(channel: CrosspostChannel, status: DispatchStatus) -> Self {
        Self {
            channel: channel.name().to_string(),
            status,
            error: None,
        }
    }
}

/// 配信全体の結果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchSummary {
    pub status_code: u16,
    pub dispatched: usize,
    pub results: Vec<DispatchResult>,
}

/// 配信先チャンネル
///
/// 設定テーブルが無いチャンネルは配信対象にならない。
pub struct DispatchTarget<R> {
    pub channel: CrosspostChannel,
    pub settings: Option<R>,
    pub function_name: Option<String>,
}

pub struct CrosspostDispatcher<R, I> {
    targets: Vec<DispatchTarget<R>>,
    invoker: I,
}

impl<R: ItemRepository, I: FunctionInvoker> CrosspostDispatcher<R, I> {
    pub fn new(targets: Vec<DispatchTarget<R>>, invoker: I) -> Self {
        Self { targets, invoker }
    }

    /// 設定からチャンネルごとの設定リポジトリを組み立てる
    pub fn from_config(
        config: &CrosspostConfig,
        invoker: I,
        settings_repository: impl Fn(&str) -> R,
    ) -> Self {
        let targets = config
            .targets()
            .iter()
            .map(|target| DispatchTarget {
                channel: target.channel,
                settings: target.settings_table.as_deref().map(&settings_repository),
                function_name: target.function_name.clone(),
            })
            .collect();

        Self::new(targets, invoker)
    }

    /// 非同期呼び出しイベント`{tenantId, post}`を処理する
    pub async fn handle_event(&self, event: &Value) -> Value {
        let tenant_id = event
            .get("tenantId")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty());
        let post = event.get("post").and_then(|v| v.as_object());

        let (Some(tenant_id), Some(post)) = (tenant_id, post) else {
            error!("tenantIdまたはpostがありません");
            return json!({ "statusCode": 400, "error": "Missing tenantId or post" });
        };

        let summary = self.dispatch(tenant_id, post).await;
        serde_json::to_value(&summary).unwrap_or_else(|e| {
            error!(error = %e, "配信結果のシリアライズに失敗");
            json!({ "statusCode": 500, "error": e.to_string() })
        })
    }

    /// 全チャンネルへ並行に振り分ける
    pub async fn dispatch(&self, tenant_id: &str, post: &JsonObject) -> DispatchSummary {
        info!(
            tenant_id = %tenant_id,
            post_id = ?post.get("postId"),
            "クロスポスト配信開始"
        );

        let outcomes = join_all(
            self.targets
                .iter()
                .map(|target| self.dispatch_channel(target, tenant_id, post)),
        )
        .await;

        let results: Vec<DispatchResult> = outcomes.into_iter().flatten().collect();
        let dispatched = results
            .iter()
            .filter(|r| r.status == DispatchStatus::Invoked)
            .count();

        info!(tenant_id = %tenant_id, dispatched, "クロスポスト配信完了");

        DispatchSummary {
            status_code: 200,
            dispatched,
            results,
        }
    }

    /// 1チャンネル分の配信
    ///
    /// 対象外のチャンネルは`None`。
    async fn dispatch_channel(
        &self,
        target: &DispatchTarget<R>,
        tenant_id: &str,
        post: &JsonObject,
    ) -> Option<DispatchResult> {
        let channel = target.channel;

        if !channel.accepts_post(post) {
            debug!(channel = %channel, "投稿の条件を満たさないためスキップ");
            return None;
        }

        let repository = target.settings.as_ref()?;
        let settings = match repository.get(tenant_id).await {
            Ok(Some(settings)) => settings,
            Ok(None) => {
                debug!(channel = %channel, "設定なし");
                return None;
            }
            Err(e) => {
                warn!(channel = %channel, error = %e, "設定の取得に失敗");
                return None;
            }
        };

        if !channel.is_enabled(&settings) {
            debug!(channel = %channel, "無効または必須項目不足");
            return None;
        }

        let Some(function_name) = target.function_name.as_deref() else {
            info!(channel = %channel, "配信関数が未設定");
            return Some(DispatchResult::new(channel, DispatchStatus::Skipped));
        };

        let payload = json!({
            "tenantId": tenant_id,
            "post": post,
            "settings": settings,
            "channel": channel.name(),
        });

        if let Err(e) = self.invoker.invoke_async(function_name, &payload).await {
            error!(channel = %channel, function_name = %function_name, error = %e, "配信関数の呼び出しに失敗");
            return Some(DispatchResult {
                error: Some(e.to_string()),
                ..DispatchResult::new(channel, DispatchStatus::Error)
            });
        }

        let counter = PostCounter::next(&settings, &utc_date(Utc::now()));
        match repository.update(tenant_id, counter.fields()).await {
            Ok(_) => debug!(channel = %channel, posts_today = counter.posts_today, "投稿数を更新"),
            Err(e) => warn!(channel = %channel, error = %e, "投稿数の更新に失敗"),
        }

        Some(DispatchResult::new(channel, DispatchStatus::Invoked))
    }
}
