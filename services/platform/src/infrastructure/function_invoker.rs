/// Lambda関数の非同期呼び出し
///
/// クロスポスト配信で、チャンネルごとの配信関数を`Event`（非同期）
/// 呼び出しで起動する。呼び出し結果は待たない。
use async_trait::async_trait;
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::InvocationType;
use aws_sdk_lambda::Client as LambdaClient;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// 関数呼び出しのエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InvokeError {
    /// ペイロードのシリアライズに失敗
    #[error("Payload serialization error: {0}")]
    Payload(String),

    /// AWS Lambda APIエラー
    #[error("Lambda invoke error: {0}")]
    AwsSdkError(String),
}

/// 関数呼び出しトレイト（テスト用の抽象化）
#[async_trait]
pub trait FunctionInvoker: Send + Sync {
    /// 関数を非同期呼び出しする
    async fn invoke_async(&self, function_name: &str, payload: &Value) -> Result<(), InvokeError>;
}

/// AWS Lambda SDKを使用した実装
#[derive(Debug, Clone)]
pub struct AwsLambdaInvoker {
    client: LambdaClient,
}

impl AwsLambdaInvoker {
    pub fn new(client: LambdaClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FunctionInvoker for AwsLambdaInvoker {
    async fn invoke_async(&self, function_name: &str, payload: &Value) -> Result<(), InvokeError> {
        let body = serde_json::to_vec(payload).map_err(|e| InvokeError::Payload(e.to_string()))?;

        let output = self
            .client
            .invoke()
            .function_name(function_name)
            .invocation_type(InvocationType::Event)
            .payload(Blob::new(body))
            .send()
            .await
            .map_err(|e| InvokeError::AwsSdkError(e.to_string()))?;

        debug!(
            function_name = %function_name,
            status_code = output.status_code,
            "関数を非同期呼び出し"
        );
        Ok(())
    }
}
