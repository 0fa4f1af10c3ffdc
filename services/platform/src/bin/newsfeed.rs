/// ニュースフィードAPI（/newsfeed）ハンドラー
///
/// 公開投稿の一覧・詳細取得と、管理者向けの投稿管理。
/// 公開された投稿はクロスポスト配信関数へ渡す。
use lambda_runtime::{service_fn, Error, LambdaEvent};
use platform::application::{ApiError, NewsfeedHandler, RequestHandler};
use platform::domain::newsfeed_post::POST_KEY;
use platform::domain::AdminPolicy;
use platform::infrastructure::config::ENV_NEWSFEED_TABLE;
use platform::infrastructure::{
    aws_sdk_config, init_logging, AwsLambdaInvoker, ConfigError, DispatchConfig,
    DynamoItemRepository, MediaConfig, S3MediaStore,
};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::info;

type Handler = NewsfeedHandler<DynamoItemRepository, S3MediaStore, AwsLambdaInvoker>;

/// warm start時に再利用するハンドラー
static HANDLER: OnceCell<Handler> = OnceCell::const_new();

async fn get_handler() -> Result<&'static Handler, ConfigError> {
    HANDLER
        .get_or_try_init(|| async {
            let sdk_config = aws_sdk_config().await;
            let media = MediaConfig::from_env()?;
            let dispatch = DispatchConfig::from_env();
            info!(crosspost_enabled = dispatch.is_some(), "ニュースフィード設定読み込み完了");

            Ok(NewsfeedHandler::new(
                DynamoItemRepository::from_env(sdk_config, ENV_NEWSFEED_TABLE, POST_KEY)?,
                S3MediaStore::from_config(sdk_config, &media),
                media.cdn_domain,
                AdminPolicy::from_env(),
                AwsLambdaInvoker::new(aws_sdk_lambda::Client::new(sdk_config)),
                dispatch,
            ))
        })
        .await
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_logging();

    let func = service_fn(handler);
    lambda_runtime::run(func).await?;
    Ok(())
}

async fn handler(event: LambdaEvent<Value>) -> Result<Value, Error> {
    match get_handler().await {
        Ok(handler) => Ok(handler.handle_event(&event.payload).await),
        Err(err) => Ok(ApiError::from(err).into_response().into_value()),
    }
}
