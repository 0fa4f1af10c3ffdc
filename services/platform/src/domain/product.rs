// ショップ商品
//
// 商品レコードの作成と部分更新フィールドの定義。

use serde::Serialize;

use super::json_value::{field_is_truthy, lenient_f64, lenient_i64, JsonObject};
use super::record::{optional_string, required_string, PatchField, RecordError};

/// 商品テーブルのキー属性
pub const PRODUCT_KEY: &str = "productId";

/// 商品画像のアップロード先フォルダ
pub const PRODUCT_IMAGE_FOLDER: &str = "products";

/// カテゴリ検索用のGSI名
pub const CATEGORY_INDEX: &str = "CategoryIndex";

/// カテゴリ未指定時の値
pub const DEFAULT_CATEGORY: &str = "general";

/// PUTで更新可能なフィールド
pub const PRODUCT_PATCH_FIELDS: &[PatchField] = &[
    PatchField::any("name"),
    PatchField::any("description"),
    PatchField::number("price"),
    PatchField::any("imageKey"),
    PatchField::any("externalLink"),
    PatchField::any("category"),
    PatchField::integer("stock"),
    PatchField::any("featured"),
];

/// 商品レコード
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image_key: Option<String>,
    pub external_link: Option<String>,
    pub category: String,
    pub stock: i64,
    pub featured: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Product {
    /// リクエストボディから新しい商品を作成
    ///
    /// `name`は必須。価格・在庫は数値文字列も受け付け、不正値は0になる。
    pub fn create(body: &JsonObject, product_id: String, now: &str) -> Result<Self, RecordError> {
        let name = required_string(body, "name")?;

        Ok(Self {
            product_id,
            name,
            description: optional_string(body, "description").unwrap_or_default(),
            price: lenient_f64(body.get("price")).unwrap_or(0.0),
            image_key: optional_string(body, "imageKey"),
            external_link: optional_string(body, "externalLink"),
            category: optional_string(body, "category")
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            stock: lenient_i64(body.get("stock")).unwrap_or(0),
            featured: field_is_truthy(body, "featured"),
            created_at: now.to_string(),
            updated_at: now.to_string(),
        })
    }
}
