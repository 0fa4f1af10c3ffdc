// チームメンバー

use serde::Serialize;
use serde_json::Value;

use super::json_value::{lenient_i64, JsonObject};
use super::record::{optional_string, required_string, PatchField, RecordError};

/// チームテーブルのキー属性
pub const MEMBER_KEY: &str = "memberId";

/// メンバー画像のアップロード先フォルダ
pub const MEMBER_IMAGE_FOLDER: &str = "team";

/// 表示順未指定時の値（末尾に並ぶ）
pub const DEFAULT_MEMBER_ORDER: i64 = 999;

/// PUTで更新可能なフィールド
pub const MEMBER_PATCH_FIELDS: &[PatchField] = &[
    PatchField::any("name"),
    PatchField::any("role"),
    PatchField::any("bio"),
    PatchField::any("imageKey"),
    PatchField::any("socials"),
    PatchField::integer("order"),
];

/// チームメンバーレコード
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub member_id: String,
    pub name: String,
    pub role: Option<String>,
    pub bio: Option<String>,
    pub image_key: Option<String>,
    pub socials: Value,
    pub order: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl TeamMember {
    /// リクエストボディから新しいメンバーを作成
    pub fn create(body: &JsonObject, member_id: String, now: &str) -> Result<Self, RecordError> {
        let name = required_string(body, "name")?;

        let socials = match body.get("socials") {
            Some(v @ Value::Object(_)) => v.clone(),
            _ => Value::Object(JsonObject::new()),
        };

        Ok(Self {
            member_id,
            name,
            role: optional_string(body, "role"),
            bio: optional_string(body, "bio"),
            image_key: optional_string(body, "imageKey"),
            socials,
            order: lenient_i64(body.get("order")).unwrap_or(DEFAULT_MEMBER_ORDER),
            created_at: now.to_string(),
            updated_at: now.to_string(),
        })
    }
}

/// 表示順（`order`昇順、未設定は0扱い）に並べ替える
///
/// 同じ順位のメンバーは元の順序を保つ。
pub fn sort_by_display_order(members: &mut [JsonObject]) {
    members.sort_by_key(|m| lenient_i64(m.get("order")).unwrap_or(0));
}
