// HTTPハンドラー共通の処理
//
// イベントの解析、OPTIONSへの応答、エラーのレスポンス変換、
// アクセスログを各ハンドラーで共有する。

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use super::api_error::ApiError;
use super::api_request::ApiRequest;
use super::api_response::ApiResponse;
use crate::domain::{AdminPolicy, JsonObject};

/// ルーティング対象外のパス
pub fn route_not_found() -> ApiError {
    ApiError::not_found("Not found")
}

/// 管理者でなければ403
pub fn require_admin(policy: &AdminPolicy, request: &ApiRequest) -> Result<(), ApiError> {
    if policy.is_admin(request.claims()) {
        Ok(())
    } else {
        warn!(
            method = %request.method(),
            path = %request.path(),
            "管理者以外による管理操作を拒否"
        );
        Err(ApiError::admin_required())
    }
}

/// レコードをJSONオブジェクトに変換
pub fn to_object<T: Serialize>(record: &T) -> Result<JsonObject, ApiError> {
    match serde_json::to_value(record) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Err(ApiError::Internal("record is not a JSON object".to_string())),
        Err(e) => Err(ApiError::Internal(e.to_string())),
    }
}

/// HTTP APIのリクエストハンドラー
#[async_trait]
pub trait RequestHandler: Send + Sync {
    /// メソッドとパスで処理を振り分ける
    async fn route(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError>;

    /// Lambdaイベントを処理してプロキシレスポンスを返す
    async fn handle_event(&self, event: &Value) -> Value {
        let request = ApiRequest::from_event(event);

        let response = if request.method() == "OPTIONS" {
            ApiResponse::preflight()
        } else {
            self.route(&request)
                .await
                .unwrap_or_else(ApiError::into_response)
        };

        info!(
            method = %request.method(),
            path = %request.path(),
            status = response.status(),
            "リクエスト処理完了"
        );

        response.into_value()
    }
}
