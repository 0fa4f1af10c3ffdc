/// ショップ注文API（/orders）ハンドラー
///
/// 注文作成と、注文者本人または管理者による注文参照。
use lambda_runtime::{service_fn, Error, LambdaEvent};
use platform::application::{ApiError, OrderHandler, RequestHandler};
use platform::domain::order::ORDER_KEY;
use platform::domain::product::PRODUCT_KEY;
use platform::domain::AdminPolicy;
use platform::infrastructure::config::{ENV_ORDERS_TABLE, ENV_PRODUCTS_TABLE};
use platform::infrastructure::{aws_sdk_config, init_logging, ConfigError, DynamoItemRepository};
use serde_json::Value;
use tokio::sync::OnceCell;

type Handler = OrderHandler<DynamoItemRepository, DynamoItemRepository>;

static HANDLER: OnceCell<Handler> = OnceCell::const_new();

async fn get_handler() -> Result<&'static Handler, ConfigError> {
    HANDLER
        .get_or_try_init(|| async {
            let sdk_config = aws_sdk_config().await;

            Ok(OrderHandler::new(
                DynamoItemRepository::from_env(sdk_config, ENV_ORDERS_TABLE, ORDER_KEY)?,
                DynamoItemRepository::from_env(sdk_config, ENV_PRODUCTS_TABLE, PRODUCT_KEY)?,
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
