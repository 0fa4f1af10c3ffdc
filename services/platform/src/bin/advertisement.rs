/// ライブページ広告API（/advertisement）ハンドラー
///
/// 広告の取得は公開、更新・画像の差し替えは管理者のみ。
use lambda_runtime::{service_fn, Error, LambdaEvent};
use platform::application::{AdvertisementHandler, ApiError, RequestHandler};
use platform::domain::advertisement::ADVERTISEMENT_KEY;
use platform::domain::AdminPolicy;
use platform::infrastructure::config::ENV_ADS_TABLE;
use platform::infrastructure::{
    aws_sdk_config, init_logging, ConfigError, DynamoItemRepository, MediaConfig, S3MediaStore,
};
use serde_json::Value;
use tokio::sync::OnceCell;

type Handler = AdvertisementHandler<DynamoItemRepository, S3MediaStore>;

/// warm start時に再利用するハンドラー
static HANDLER: OnceCell<Handler> = OnceCell::const_new();

async fn get_handler() -> Result<&'static Handler, ConfigError> {
    HANDLER
        .get_or_try_init(|| async {
            let sdk_config = aws_sdk_config().await;
            let media = MediaConfig::from_env()?;

            Ok(AdvertisementHandler::new(
                DynamoItemRepository::from_env(sdk_config, ENV_ADS_TABLE, ADVERTISEMENT_KEY)?,
                S3MediaStore::from_config(sdk_config, &media),
                media.cdn_domain,
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
