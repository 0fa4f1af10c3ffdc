// JWTクレームと管理者判定
//
// API GatewayのJWTオーソライザーが付与するクレームを読み取り、
// `cognito:groups`に管理者グループが含まれるかを判定する。
// 全ハンドラーはこのモジュールを経由して認可を行う。

use serde_json::Value;
use tracing::debug;

use super::json_value::JsonObject;

/// 管理者グループ名のデフォルト値
pub const DEFAULT_ADMIN_GROUP: &str = "admins";

/// 環境変数名: 管理者グループ名
pub const ENV_ADMIN_GROUP_NAME: &str = "ADMIN_GROUP_NAME";

/// グループクレーム名
const GROUPS_CLAIM: &str = "cognito:groups";

/// ユーザーIDクレーム名
const SUBJECT_CLAIM: &str = "sub";

/// リクエストに付与されたJWTクレーム
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Claims {
    values: JsonObject,
}

impl Claims {
    /// クレームのマップから作成
    pub fn new(values: JsonObject) -> Self {
        Self { values }
    }

    /// `requestContext`からクレームを抽出する
    ///
    /// REST API形式（`authorizer.claims`）とHTTP API形式
    /// （`authorizer.jwt.claims`）の両方に対応する。
    /// どちらも無い場合は空のクレームを返す。
    pub fn from_request_context(request_context: Option<&Value>) -> Self {
        let authorizer = request_context.and_then(|ctx| ctx.get("authorizer"));

        let claims = authorizer
            .and_then(|a| a.get("claims"))
            .and_then(|c| c.as_object())
            .or_else(|| {
                authorizer
                    .and_then(|a| a.get("jwt"))
                    .and_then(|jwt| jwt.get("claims"))
                    .and_then(|c| c.as_object())
            });

        claims.cloned().map(Self::new).unwrap_or_default()
    }

    /// クレームが空かどうか（未認証リクエスト）
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// ユーザーID（`sub`クレーム）
    pub fn subject(&self) -> Option<&str> {
        self.values
            .get(SUBJECT_CLAIM)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    }

    /// 所属グループ一覧
    pub fn groups(&self) -> Vec<String> {
        self.values
            .get(GROUPS_CLAIM)
            .map(parse_groups)
            .unwrap_or_default()
    }
}

/// `cognito:groups`クレームをグループ名のリストに正規化する
///
/// 受け付ける形式:
/// - JSON配列: `["admins", "users"]`
/// - 角括弧付き文字列: `"[admins, users]"` / `"[admins users]"`
/// - 区切り文字列: `"admins,users"`
/// - 単一グループ: `"admins"`
pub fn parse_groups(raw: &Value) -> Vec<String> {
    match raw {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str())
            .map(clean_group_name)
            .filter(|g| !g.is_empty())
            .collect(),
        Value::String(s) => {
            let trimmed = s.trim();
            let inner = trimmed
                .strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
                .unwrap_or(trimmed);

            inner
                .split(|c: char| c == ',' || c.is_whitespace())
                .map(clean_group_name)
                .filter(|g| !g.is_empty())
                .collect()
        }
        _ => Vec::new(),
    }
}

/// 前後の空白と引用符を除去
fn clean_group_name(name: &str) -> String {
    name.trim().trim_matches('"').trim().to_string()
}

/// 管理者判定ポリシー
#[derive(Debug, Clone, PartialEq)]
pub struct AdminPolicy {
    admin_group: String,
}

impl Default for AdminPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ADMIN_GROUP)
    }
}

impl AdminPolicy {
    /// 管理者グループ名を指定して作成
    pub fn new(admin_group: impl Into<String>) -> Self {
        Self {
            admin_group: admin_group.into(),
        }
    }

    /// 環境変数`ADMIN_GROUP_NAME`から作成（未設定・空の場合は`admins`）
    pub fn from_env() -> Self {
        std::env::var(ENV_ADMIN_GROUP_NAME)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(|s| Self::new(s.trim()))
            .unwrap_or_default()
    }

    /// 管理者グループ名
    pub fn admin_group(&self) -> &str {
        &self.admin_group
    }

    /// クレームが管理者グループに属するか
    ///
    /// グループ名は完全一致で比較する。
    pub fn is_admin(&self, claims: &Claims) -> bool {
        let groups = claims.groups();
        let result = groups.iter().any(|g| g == &self.admin_group);

        debug!(
            groups = ?groups,
            admin_group = %self.admin_group,
            is_admin = result,
            "管理者判定"
        );

        result
    }
}
