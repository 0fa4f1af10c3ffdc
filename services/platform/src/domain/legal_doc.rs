// 法務ドキュメント（Impressum・Datenschutz・AGB）
//
// テーブルが空の場合に投入する既定ドキュメントと、
// 管理画面からの一括更新用アイテムの組み立てを提供する。

use serde_json::{json, Value};

use super::json_value::JsonObject;
use super::record::{keyed_item, RecordError, UPDATED_AT_FIELD};

/// 法務ドキュメントテーブルのキー属性
pub const LEGAL_DOC_KEY: &str = "docId";

/// 最終更新日時フィールド（画面表示用）
pub const LAST_UPDATED_FIELD: &str = "lastUpdated";

const IMPRESSUM_CONTENT: &str = "# Impressum

## Angaben gemäß § 5 TMG

[Ihr Name / Firmenname]
[Straße und Hausnummer]
[PLZ und Ort]

## Kontakt

E-Mail: [ihre-email@example.com]";

const DATENSCHUTZ_CONTENT: &str = "# Datenschutzerklärung

## 1. Datenschutz auf einen Blick

Die folgenden Hinweise geben einen einfachen Überblick darüber, was mit Ihren personenbezogenen Daten passiert, wenn Sie diese Website besuchen.

## 2. Hosting

Wir hosten die Inhalte unserer Website bei Amazon Web Services (AWS).";

const AGB_CONTENT: &str = "# Allgemeine Geschäftsbedingungen (AGB)

## § 1 Geltungsbereich

Diese Allgemeinen Geschäftsbedingungen gelten für alle Verträge, die zwischen [Ihr Unternehmen] und dem Kunden geschlossen werden.

## § 2 Widerrufsrecht

Verbrauchern steht ein gesetzliches Widerrufsrecht zu.";

/// 既定の法務ドキュメント（id, title, content）
const DEFAULT_LEGAL_DOCS: [(&str, &str, &str); 3] = [
    ("impressum", "Impressum", IMPRESSUM_CONTENT),
    ("datenschutz", "Datenschutzerklärung", DATENSCHUTZ_CONTENT),
    ("agb", "Allgemeine Geschäftsbedingungen", AGB_CONTENT),
];

/// テーブル初期化用の既定ドキュメントを生成
pub fn default_legal_docs(now: &str) -> Vec<JsonObject> {
    DEFAULT_LEGAL_DOCS
        .iter()
        .filter_map(|(id, title, content)| {
            match json!({
                LEGAL_DOC_KEY: id,
                "id": id,
                "title": title,
                "content": content,
                LAST_UPDATED_FIELD: now,
                UPDATED_AT_FIELD: now,
            }) {
                Value::Object(map) => Some(map),
                _ => None,
            }
        })
        .collect()
}

/// 管理画面から送られたドキュメントを保存用アイテムに変換
pub fn legal_doc_item(document: &Value, now: &str) -> Result<JsonObject, RecordError> {
    keyed_item(
        document,
        LEGAL_DOC_KEY,
        now,
        &[LAST_UPDATED_FIELD, UPDATED_AT_FIELD],
    )
}
