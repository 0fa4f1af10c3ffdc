/// スポンサー枠API（/sponsors）ハンドラー
///
/// 予約作成、掲載中スポンサーの取得、表示・クリック計測、管理者による承認。
use lambda_runtime::{service_fn, Error, LambdaEvent};
use platform::application::{ApiError, RequestHandler, SponsorHandler};
use platform::domain::sponsor::SPONSOR_KEY;
use platform::domain::AdminPolicy;
use platform::infrastructure::config::{ENV_SPONSORS_TABLE, ENV_STATS_TABLE};
use platform::infrastructure::{aws_sdk_config, init_logging, ConfigError, DynamoItemRepository};
use serde_json::Value;
use tokio::sync::OnceCell;

type Handler = SponsorHandler<DynamoItemRepository, DynamoItemRepository>;

static HANDLER: OnceCell<Handler> = OnceCell::const_new();

async fn get_handler() -> Result<&'static Handler, ConfigError> {
    HANDLER
        .get_or_try_init(|| async {
            let sdk_config = aws_sdk_config().await;

            // 統計テーブルはsponsorId + timestampの複合キー（書き込みのみ）
            Ok(SponsorHandler::new(
                DynamoItemRepository::from_env(sdk_config, ENV_SPONSORS_TABLE, SPONSOR_KEY)?,
                DynamoItemRepository::from_env(sdk_config, ENV_STATS_TABLE, SPONSOR_KEY)?,
                AdminPolicy::from_env(),
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
