// レコード共通の検証と部分更新
//
// 各リソースはフィールド定義（`PatchField`）の一覧を持ち、
// PUTリクエストのボディに含まれるフィールドだけを更新対象として抽出する。

use serde_json::Value;
use thiserror::Error;

use super::json_value::{lenient_f64, lenient_i64, number_value, JsonObject};

/// `updatedAt`フィールド名
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// レコード検証エラー
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RecordError {
    /// 必須フィールドが欠落
    #[error("{0} is required")]
    MissingField(&'static str),

    /// フィールドの型・値が不正
    #[error("{0} is invalid")]
    InvalidField(String),
}

/// フィールドの値の扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// 値をそのまま保存
    Any,
    /// 数値（数値文字列も可）
    Number,
    /// 整数（数値文字列も可、小数は切り捨て）
    Integer,
}

/// 部分更新が可能なフィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchField {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl PatchField {
    pub const fn any(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Any,
        }
    }

    pub const fn number(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Number,
        }
    }

    pub const fn integer(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Integer,
        }
    }
}

/// リクエストボディから更新対象フィールドを抽出する
///
/// ボディに存在するフィールドのみを対象とし（明示的なnullも含む）、
/// 最後に`updatedAt`を付与する。定義に無いフィールドは無視する。
pub fn build_patch(
    body: &JsonObject,
    fields: &[PatchField],
    updated_at: &str,
) -> Result<Vec<(String, Value)>, RecordError> {
    let mut patch = Vec::new();

    for field in fields {
        let Some(raw) = body.get(field.name) else {
            continue;
        };

        let value = match (field.kind, raw) {
            (_, Value::Null) => Value::Null,
            (FieldKind::Any, v) => v.clone(),
            (FieldKind::Number, v) => lenient_f64(Some(v))
                .map(number_value)
                .ok_or_else(|| RecordError::InvalidField(field.name.to_string()))?,
            (FieldKind::Integer, v) => lenient_i64(Some(v))
                .map(Value::from)
                .ok_or_else(|| RecordError::InvalidField(field.name.to_string()))?,
        };

        patch.push((field.name.to_string(), value));
    }

    patch.push((
        UPDATED_AT_FIELD.to_string(),
        Value::String(updated_at.to_string()),
    ));

    Ok(patch)
}

/// 文字列フィールドを取得（空文字列はNone）
pub fn optional_string(body: &JsonObject, key: &str) -> Option<String> {
    body.get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// 必須文字列フィールドを取得
pub fn required_string(body: &JsonObject, key: &'static str) -> Result<String, RecordError> {
    body.get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or(RecordError::MissingField(key))
}

/// 一括保存用のアイテムを作成する
///
/// 管理画面から送られたドキュメントの`id`をテーブルのキー属性にコピーし、
/// 更新時刻を付与する。ドキュメントの他のフィールドはそのまま保持する。
pub fn keyed_item(
    document: &Value,
    key_attribute: &str,
    now: &str,
    timestamp_fields: &[&str],
) -> Result<JsonObject, RecordError> {
    let object = document
        .as_object()
        .ok_or_else(|| RecordError::InvalidField("document".to_string()))?;

    let id = required_string(object, "id")?;

    let mut item = object.clone();
    item.insert(key_attribute.to_string(), Value::String(id));
    for field in timestamp_fields {
        item.insert((*field).to_string(), Value::String(now.to_string()));
    }

    Ok(item)
}
