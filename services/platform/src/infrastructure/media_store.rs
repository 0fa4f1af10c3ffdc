/// 画像ストレージ（S3）
///
/// ブラウザから直接アップロードするための署名付きPUT URLの発行と、
/// 不要になった画像オブジェクトの削除を行う。
use std::time::Duration;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client as S3Client;
use thiserror::Error;

use super::config::MediaConfig;

/// 画像ストレージ操作のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MediaStoreError {
    /// 署名付きURLの発行に失敗
    #[error("Presign error: {0}")]
    PresignError(String),

    /// オブジェクトの削除に失敗
    #[error("Delete error: {0}")]
    DeleteError(String),
}

/// 画像ストレージ操作
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// 指定キーへの署名付きPUT URLを発行する
    async fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String, MediaStoreError>;

    /// オブジェクトを削除する（存在しなくても成功）
    async fn delete(&self, key: &str) -> Result<(), MediaStoreError>;
}

/// MediaStoreのS3実装
#[derive(Debug, Clone)]
pub struct S3MediaStore {
    client: S3Client,
    bucket: String,
}

impl S3MediaStore {
    pub fn new(client: S3Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    pub fn from_config(config: &SdkConfig, media: &MediaConfig) -> Self {
        Self::new(S3Client::new(config), media.bucket.clone())
    }
}

#[async_trait]
impl MediaStore for S3MediaStore {
    async fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String, MediaStoreError> {
        let presigning = PresigningConfig::expires_in(expires_in)
            .map_err(|e| MediaStoreError::PresignError(e.to_string()))?;

        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(presigning)
            .await
            .map_err(|e| MediaStoreError::PresignError(e.to_string()))?;

        Ok(request.uri().to_string())
    }

    async fn delete(&self, key: &str) -> Result<(), MediaStoreError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| MediaStoreError::DeleteError(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_media_store_error_display() {
        assert_eq!(
            MediaStoreError::PresignError("bad credentials".to_string()).to_string(),
            "Presign error: bad credentials"
        );
        assert_eq!(
            MediaStoreError::DeleteError("access denied".to_string()).to_string(),
            "Delete error: access denied"
        );
    }

    /// ユニットテスト用のモックMediaStore
    ///
    /// 発行したURLと削除したキーを記録する。
    #[derive(Debug, Clone, Default)]
    pub struct MockMediaStore {
        /// (key, content_type, expires_in秒)
        presigned: Arc<Mutex<Vec<(String, String, u64)>>>,
        deleted: Arc<Mutex<Vec<String>>>,
        next_error: Arc<Mutex<Option<MediaStoreError>>>,
    }

    impl MockMediaStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_next_error(&self, error: MediaStoreError) {
            *self.next_error.lock().unwrap() = Some(error);
        }

        pub fn presigned(&self) -> Vec<(String, String, u64)> {
            self.presigned.lock().unwrap().clone()
        }

        pub fn deleted(&self) -> Vec<String> {
            self.deleted.lock().unwrap().clone()
        }

        fn take_error(&self) -> Option<MediaStoreError> {
            self.next_error.lock().unwrap().take()
        }
    }

    #[async_trait]
    impl MediaStore for MockMediaStore {
        async fn presign_upload(
            &self,
            key: &str,
            content_type: &str,
            expires_in: Duration,
        ) -> Result<String, MediaStoreError> {
            if let Some(error) = self.take_error() {
                return Err(error);
            }
            self.presigned.lock().unwrap().push((
                key.to_string(),
                content_type.to_string(),
                expires_in.as_secs(),
            ));
            Ok(format!("https://uploads.test/{key}?X-Amz-Expires={}", expires_in.as_secs()))
        }

        async fn delete(&self, key: &str) -> Result<(), MediaStoreError> {
            if let Some(error) = self.take_error() {
                return Err(error);
            }
            self.deleted.lock().unwrap().push(key.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_mock_records_calls() {
        let store = MockMediaStore::new();

        let url = store
            .presign_upload("products/1_a.png", "image/png", Duration::from_secs(3600))
            .await
            .unwrap();
        store.delete("products/1_a.png").await.unwrap();

        assert!(url.contains("products/1_a.png"));
        assert_eq!(
            store.presigned(),
            vec![("products/1_a.png".to_string(), "image/png".to_string(), 3600)]
        );
        assert_eq!(store.deleted(), vec!["products/1_a.png".to_string()]);
    }
}
