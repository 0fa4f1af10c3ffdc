/// 配信チャンネル一覧API（/channels）ハンドラー
use lambda_runtime::{service_fn, Error, LambdaEvent};
use platform::application::{channel_handler, ApiError, ChannelHandler, RequestHandler};
use platform::domain::channel::CHANNEL_KEY;
use platform::domain::AdminPolicy;
use platform::infrastructure::config::ENV_CHANNELS_TABLE;
use platform::infrastructure::{aws_sdk_config, init_logging, ConfigError, DynamoItemRepository};
use serde_json::Value;
use tokio::sync::OnceCell;

static HANDLER: OnceCell<ChannelHandler<DynamoItemRepository>> = OnceCell::const_new();

async fn get_handler() -> Result<&'static ChannelHandler<DynamoItemRepository>, ConfigError> {
    HANDLER
        .get_or_try_init(|| async {
            let sdk_config = aws_sdk_config().await;
            let channels = DynamoItemRepository::from_env(sdk_config, ENV_CHANNELS_TABLE, CHANNEL_KEY)?;
            Ok(channel_handler(channels, AdminPolicy::from_env()))
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
