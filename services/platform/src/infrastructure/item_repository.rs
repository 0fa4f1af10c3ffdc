/// DynamoDBテーブルのアイテムリポジトリ
///
/// 各リソースは単一の文字列パーティションキーを持つテーブルに保存される。
/// アイテムはスキーマを持たないJSONオブジェクトとして読み書きし、
/// AttributeValueとの相互変換はserde_dynamoに任せる。
use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use aws_sdk_dynamodb::types::{AttributeValue, PutRequest, ReturnValue, WriteRequest};
use aws_sdk_dynamodb::Client as DynamoDbClient;
use serde_dynamo::aws_sdk_dynamodb_1::{from_item, from_items, to_attribute_value, to_item};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use super::config::{required_var, ConfigError};
use crate::domain::channel::BATCH_WRITE_LIMIT;
use crate::domain::JsonObject;

/// 未処理アイテムの再送を含むBatchWriteItemの最大試行回数
const MAX_BATCH_ATTEMPTS: usize = 3;

/// リポジトリ操作のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RepositoryError {
    /// 条件付き更新の対象が存在しない
    #[error("Item not found: {0}")]
    NotFound(String),

    /// DynamoDBへの書き込みに失敗
    #[error("Write error: {0}")]
    WriteError(String),

    /// DynamoDBからの読み取りに失敗
    #[error("Read error: {0}")]
    ReadError(String),

    /// AttributeValueとの変換に失敗
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// テーブル単位のアイテム操作
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// パーティションキーの属性名
    fn key_attribute(&self) -> &str;

    /// キーでアイテムを取得（存在しなければ`None`）
    async fn get(&self, key: &str) -> Result<Option<JsonObject>, RepositoryError>;

    /// アイテムを保存（同じキーは上書き）
    async fn put(&self, item: JsonObject) -> Result<(), RepositoryError>;

    /// 複数アイテムをまとめて保存
    async fn put_many(&self, items: Vec<JsonObject>) -> Result<(), RepositoryError>;

    /// キーでアイテムを削除（存在しなくても成功）
    async fn delete(&self, key: &str) -> Result<(), RepositoryError>;

    /// テーブル全件を取得
    async fn scan(&self) -> Result<Vec<JsonObject>, RepositoryError>;

    /// GSIを1属性の等値条件で検索（ソートキー昇順）
    async fn query_index(
        &self,
        index_name: &str,
        attribute: &str,
        value: &str,
    ) -> Result<Vec<JsonObject>, RepositoryError>;

    /// 既存アイテムの指定フィールドのみを更新し、更新後のアイテムを返す
    ///
    /// アイテムが存在しない場合は`RepositoryError::NotFound`。
    async fn update(
        &self,
        key: &str,
        fields: Vec<(String, Value)>,
    ) -> Result<JsonObject, RepositoryError>;

    /// 既存アイテムの数値属性をアトミックに加算する
    ///
    /// アイテムが存在しない場合は`RepositoryError::NotFound`。
    async fn increment(&self, key: &str, attribute: &str, by: i64) -> Result<(), RepositoryError>;
}

/// ItemRepositoryのDynamoDB実装
#[derive(Debug, Clone)]
pub struct DynamoItemRepository {
    client: DynamoDbClient,
    table_name: String,
    key_attribute: String,
}

impl DynamoItemRepository {
    pub fn new(
        client: DynamoDbClient,
        table_name: impl Into<String>,
        key_attribute: impl Into<String>,
    ) -> Self {
        Self {
            client,
            table_name: table_name.into(),
            key_attribute: key_attribute.into(),
        }
    }

    /// テーブル名を環境変数から読み込んで作成
    pub fn from_env(
        config: &SdkConfig,
        table_env: &str,
        key_attribute: &str,
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(
            DynamoDbClient::new(config),
            required_var(table_env)?,
            key_attribute,
        ))
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    fn key_value(key: &str) -> AttributeValue {
        AttributeValue::S(key.to_string())
    }

    fn to_dynamo_item(item: JsonObject) -> Result<HashMap<String, AttributeValue>, RepositoryError> {
        to_item(item).map_err(|e| RepositoryError::SerializationError(e.to_string()))
    }

    fn from_dynamo_items(
        items: Vec<HashMap<String, AttributeValue>>,
    ) -> Result<Vec<JsonObject>, RepositoryError> {
        from_items(items).map_err(|e| RepositoryError::SerializationError(e.to_string()))
    }

    /// `SET #f0 = :v0, #f1 = :v1, ...`形式の更新式を組み立てる
    fn set_expression(
        fields: Vec<(String, Value)>,
    ) -> Result<
        (
            String,
            HashMap<String, String>,
            HashMap<String, AttributeValue>,
        ),
        RepositoryError,
    > {
        let mut assignments = Vec::with_capacity(fields.len());
        let mut names = HashMap::new();
        let mut values = HashMap::new();

        for (i, (field, value)) in fields.into_iter().enumerate() {
            let name = format!("#f{i}");
            let placeholder = format!(":v{i}");
            let attribute = to_attribute_value(value)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;

            assignments.push(format!("{name} = {placeholder}"));
            names.insert(name, field);
            values.insert(placeholder, attribute);
        }

        Ok((format!("SET {}", assignments.join(", ")), names, values))
    }
}

#[async_trait]
impl ItemRepository for DynamoItemRepository {
    fn key_attribute(&self) -> &str {
        &self.key_attribute
    }

    async fn get(&self, key: &str) -> Result<Option<JsonObject>, RepositoryError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(&self.key_attribute, Self::key_value(key))
            .send()
            .await
            .map_err(|e| RepositoryError::ReadError(e.to_string()))?;

        result
            .item
            .map(|item| {
                from_item(item).map_err(|e| RepositoryError::SerializationError(e.to_string()))
            })
            .transpose()
    }

    async fn put(&self, item: JsonObject) -> Result<(), RepositoryError> {
        let item = Self::to_dynamo_item(item)?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| RepositoryError::WriteError(e.to_string()))?;

        Ok(())
    }

    async fn put_many(&self, items: Vec<JsonObject>) -> Result<(), RepositoryError> {
        let requests = items
            .into_iter()
            .map(|item| {
                let put = PutRequest::builder()
                    .set_item(Some(Self::to_dynamo_item(item)?))
                    .build()
                    .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;
                Ok(WriteRequest::builder().put_request(put).build())
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;

        for chunk in requests.chunks(BATCH_WRITE_LIMIT) {
            let mut pending = chunk.to_vec();

            for attempt in 1..=MAX_BATCH_ATTEMPTS {
                let output = self
                    .client
                    .batch_write_item()
                    .request_items(&self.table_name, pending)
                    .send()
                    .await
                    .map_err(|e| RepositoryError::WriteError(e.to_string()))?;

                pending = output
                    .unprocessed_items
                    .and_then(|mut unprocessed| unprocessed.remove(&self.table_name))
                    .unwrap_or_default();

                if pending.is_empty() {
                    break;
                }
                warn!(
                    table = %self.table_name,
                    attempt = attempt,
                    unprocessed = pending.len(),
                    "BatchWriteItemに未処理アイテムあり"
                );
            }

            if !pending.is_empty() {
                return Err(RepositoryError::WriteError(format!(
                    "{} items left unprocessed",
                    pending.len()
                )));
            }
        }

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key(&self.key_attribute, Self::key_value(key))
            .send()
            .await
            .map_err(|e| RepositoryError::WriteError(e.to_string()))?;

        Ok(())
    }

    async fn scan(&self) -> Result<Vec<JsonObject>, RepositoryError> {
        let mut items = Vec::new();
        let mut start_key = None;

        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.table_name)
                .set_exclusive_start_key(start_key)
                .send()
                .await
                .map_err(|e| RepositoryError::ReadError(e.to_string()))?;

            items.extend(Self::from_dynamo_items(output.items.unwrap_or_default())?);

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        debug!(table = %self.table_name, count = items.len(), "テーブルスキャン完了");
        Ok(items)
    }

    async fn query_index(
        &self,
        index_name: &str,
        attribute: &str,
        value: &str,
    ) -> Result<Vec<JsonObject>, RepositoryError> {
        let mut items = Vec::new();
        let mut start_key = None;

        loop {
            let output = self
                .client
                .query()
                .table_name(&self.table_name)
                .index_name(index_name)
                .key_condition_expression("#k = :v")
                .expression_attribute_names("#k", attribute)
                .expression_attribute_values(":v", AttributeValue::S(value.to_string()))
                .scan_index_forward(true)
                .set_exclusive_start_key(start_key)
                .send()
                .await
                .map_err(|e| RepositoryError::ReadError(e.to_string()))?;

            items.extend(Self::from_dynamo_items(output.items.unwrap_or_default())?);

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        Ok(items)
    }

    async fn update(
        &self,
        key: &str,
        fields: Vec<(String, Value)>,
    ) -> Result<JsonObject, RepositoryError> {
        let (expression, mut names, values) = Self::set_expression(fields)?;
        names.insert("#key".to_string(), self.key_attribute.clone());

        let output = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key(&self.key_attribute, Self::key_value(key))
            .update_expression(expression)
            .condition_expression("attribute_exists(#key)")
            .set_expression_attribute_names(Some(names))
            .set_expression_attribute_values(Some(values))
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(|e| match e.into_service_error() {
                UpdateItemError::ConditionalCheckFailedException(_) => {
                    RepositoryError::NotFound(key.to_string())
                }
                other => RepositoryError::WriteError(other.to_string()),
            })?;

        output
            .attributes
            .map(|item| {
                from_item(item).map_err(|e| RepositoryError::SerializationError(e.to_string()))
            })
            .transpose()
            .map(Option::unwrap_or_default)
    }

    async fn increment(&self, key: &str, attribute: &str, by: i64) -> Result<(), RepositoryError> {
        self.client
            .update_item()
            .table_name(&self.table_name)
            .key(&self.key_attribute, Self::key_value(key))
            .update_expression("ADD #c :inc")
            .condition_expression("attribute_exists(#key)")
            .expression_attribute_names("#c", attribute)
            .expression_attribute_names("#key", &self.key_attribute)
            .expression_attribute_values(":inc", AttributeValue::N(by.to_string()))
            .send()
            .await
            .map_err(|e| match e.into_service_error() {
                UpdateItemError::ConditionalCheckFailedException(_) => {
                    RepositoryError::NotFound(key.to_string())
                }
                other => RepositoryError::WriteError(other.to_string()),
            })?;

        Ok(())
    }
}
