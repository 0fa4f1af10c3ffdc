// APIエラー
//
// ハンドラーの失敗をHTTPステータスと`{"error": ...}`ボディに対応付ける。
// 500の詳細はログにのみ出力し、クライアントには固定メッセージを返す。

use thiserror::Error;
use tracing::error;

use super::api_response::ApiResponse;
use crate::domain::{OrderError, RecordError, SponsorError, UploadRequestError};
use crate::infrastructure::{ConfigError, MediaStoreError, RepositoryError};

/// 管理者権限が必要なルートのエラーメッセージ
pub const ADMIN_REQUIRED_MESSAGE: &str = "Admin access required";

/// 500で返す固定メッセージ
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// ハンドラーのエラー
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn admin_required() -> Self {
        Self::Forbidden(ADMIN_REQUIRED_MESSAGE.to_string())
    }

    pub fn status(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Internal(_) => 500,
        }
    }

    /// エラーレスポンスに変換
    pub fn into_response(self) -> ApiResponse {
        let status = self.status();
        let message = match self {
            Self::Internal(detail) => {
                error!(error = %detail, "リクエスト処理で内部エラー");
                INTERNAL_ERROR_MESSAGE.to_string()
            }
            Self::BadRequest(m) | Self::Forbidden(m) | Self::NotFound(m) => m,
        };

        ApiResponse::error(status, message)
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(key) => Self::NotFound(format!("{key} not found")),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<MediaStoreError> for ApiError {
    fn from(err: MediaStoreError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<RecordError> for ApiError {
    fn from(err: RecordError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<UploadRequestError> for ApiError {
    fn from(err: UploadRequestError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<SponsorError> for ApiError {
    fn from(err: SponsorError) -> Self {
        Self::BadRequest(err.to_string())
    }
}
