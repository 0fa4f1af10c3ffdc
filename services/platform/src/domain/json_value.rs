// JSON値の判定・変換ヘルパー
//
// DynamoDBに保存されるレコードやリクエストボディはスキーマを持たない
// JSONオブジェクトとして扱うため、フィールドの真偽判定や数値の
// 寛容なパースをここに集約する。

use serde_json::{Map, Value};

/// スキーマを持たないJSONオブジェクト（DynamoDBアイテム・リクエストボディ共通）
pub type JsonObject = Map<String, Value>;

/// フィールド値が「有効な値」かどうかを判定する
///
/// 未設定・null・false・0・空文字列・NaNは偽として扱う。
/// 配列とオブジェクトは中身に関わらず真。
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// オブジェクトのフィールドが真かどうか
pub fn field_is_truthy(object: &JsonObject, key: &str) -> bool {
    is_truthy(object.get(key))
}

/// 数値または数値文字列を浮動小数点数としてパースする
///
/// パースできない場合や有限でない場合は`None`。
pub fn lenient_f64(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite())
}

/// 数値または数値文字列を整数としてパースする
///
/// 小数は切り捨てる（"12.7" -> 12）。
pub fn lenient_i64(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
        }
        _ => None,
    }
}

/// 空でない文字列フィールドを取得
pub fn non_empty_str<'a>(object: &'a JsonObject, key: &str) -> Option<&'a str> {
    object
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
}

/// 配列フィールドの要素数（配列でなければ0）
pub fn array_len(object: &JsonObject, key: &str) -> usize {
    object
        .get(key)
        .and_then(|v| v.as_array())
        .map(|a| a.len())
        .unwrap_or(0)
}

/// f64をJSON数値に変換する（非有限値は0）
pub fn number_value(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or_else(|| Value::from(0))
}
