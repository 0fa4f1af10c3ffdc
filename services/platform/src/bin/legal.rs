/// 法務ドキュメントAPI（/legal）ハンドラー
///
/// テーブルが空の場合は初回の取得時に既定ドキュメントを投入する。
use lambda_runtime::{service_fn, Error, LambdaEvent};
use platform::application::{legal_handler, ApiError, LegalHandler, RequestHandler};
use platform::domain::legal_doc::LEGAL_DOC_KEY;
use platform::domain::AdminPolicy;
use platform::infrastructure::config::ENV_LEGAL_DOCS_TABLE;
use platform::infrastructure::{aws_sdk_config, init_logging, ConfigError, DynamoItemRepository};
use serde_json::Value;
use tokio::sync::OnceCell;

static HANDLER: OnceCell<LegalHandler<DynamoItemRepository>> = OnceCell::const_new();

async fn get_handler() -> Result<&'static LegalHandler<DynamoItemRepository>, ConfigError> {
    HANDLER
        .get_or_try_init(|| async {
            let sdk_config = aws_sdk_config().await;
            let legal_docs =
                DynamoItemRepository::from_env(sdk_config, ENV_LEGAL_DOCS_TABLE, LEGAL_DOC_KEY)?;
            Ok(legal_handler(legal_docs, AdminPolicy::from_env()))
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
