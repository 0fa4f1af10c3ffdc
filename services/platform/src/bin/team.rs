/// チームAPI（/team）ハンドラー
///
/// 表示順のメンバー一覧と、管理者向けのメンバー管理。
use lambda_runtime::{service_fn, Error, LambdaEvent};
use platform::application::{ApiError, RequestHandler, TeamHandler};
use platform::domain::team_member::MEMBER_KEY;
use platform::domain::AdminPolicy;
use platform::infrastructure::config::ENV_TEAM_TABLE;
use platform::infrastructure::{
    aws_sdk_config, init_logging, ConfigError, DynamoItemRepository, MediaConfig, S3MediaStore,
};
use serde_json::Value;
use tokio::sync::OnceCell;

type Handler = TeamHandler<DynamoItemRepository, S3MediaStore>;

/// warm start時に再利用するハンドラー
static HANDLER: OnceCell<Handler> = OnceCell::const_new();

async fn get_handler() -> Result<&'static Handler, ConfigError> {
    HANDLER
        .get_or_try_init(|| async {
            let sdk_config = aws_sdk_config().await;
            let media = MediaConfig::from_env()?;

            Ok(TeamHandler::new(
                DynamoItemRepository::from_env(sdk_config, ENV_TEAM_TABLE, MEMBER_KEY)?,
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
