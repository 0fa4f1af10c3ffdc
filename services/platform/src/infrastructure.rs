// インフラストラクチャ層モジュール
pub mod config;
pub mod function_invoker;
pub mod item_repository;
pub mod logging;
pub mod media_store;

// 再エクスポート
pub use config::{
    aws_sdk_config, optional_var, required_var, ChannelTarget, ConfigError, CrosspostConfig,
    DispatchConfig, MediaConfig,
};
pub use function_invoker::{AwsLambdaInvoker, FunctionInvoker, InvokeError};
pub use item_repository::{DynamoItemRepository, ItemRepository, RepositoryError};
pub use logging::init_logging;
pub use media_store::{MediaStore, MediaStoreError, S3MediaStore};
