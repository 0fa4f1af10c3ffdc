/// クロスポスト配信ハンドラー
///
/// 投稿作成時に非同期呼び出しされ、`{tenantId, post}`を
/// 有効なチャンネルの配信関数へ振り分ける。
use aws_sdk_dynamodb::Client as DynamoDbClient;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use platform::application::CrosspostDispatcher;
use platform::domain::crosspost::SETTINGS_KEY;
use platform::infrastructure::{
    aws_sdk_config, init_logging, AwsLambdaInvoker, CrosspostConfig, DynamoItemRepository,
};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::info;

type Dispatcher = CrosspostDispatcher<DynamoItemRepository, AwsLambdaInvoker>;

static DISPATCHER: OnceCell<Dispatcher> = OnceCell::const_new();

async fn get_dispatcher() -> &'static Dispatcher {
    DISPATCHER
        .get_or_init(|| async {
            let sdk_config = aws_sdk_config().await;
            let dynamodb = DynamoDbClient::new(sdk_config);
            let config = CrosspostConfig::from_env();

            let configured = config
                .targets()
                .iter()
                .filter(|t| t.settings_table.is_some())
                .count();
            info!(configured_channels = configured, "クロスポスト設定読み込み完了");

            CrosspostDispatcher::from_config(
                &config,
                AwsLambdaInvoker::new(aws_sdk_lambda::Client::new(sdk_config)),
                |table| DynamoItemRepository::new(dynamodb.clone(), table, SETTINGS_KEY),
            )
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
    let dispatcher = get_dispatcher().await;
    Ok(dispatcher.handle_event(&event.payload).await)
}
