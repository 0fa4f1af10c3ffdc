/// レコードID生成
///
/// `<prefix>_<UNIXミリ秒>_<base36ランダム9文字>`形式のIDを生成する。
/// 例: `product_1736932200000_k3j9x0a2b`
use chrono::{DateTime, Utc};
use rand::Rng;

/// ランダム部分に使用する文字（base36）
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// ランダム部分の文字数
const ID_SUFFIX_LEN: usize = 9;

/// 商品ID接頭辞
pub const PRODUCT_ID_PREFIX: &str = "product";
/// イベントID接頭辞
pub const EVENT_ID_PREFIX: &str = "event";
/// チームメンバーID接頭辞
pub const MEMBER_ID_PREFIX: &str = "member";
/// 注文ID接頭辞
pub const ORDER_ID_PREFIX: &str = "order";
/// スポンサー予約ID接頭辞
pub const SPONSOR_ID_PREFIX: &str = "sponsor";
/// ニュースフィード投稿ID接頭辞
pub const POST_ID_PREFIX: &str = "post";

/// 新しいレコードIDを生成
pub fn generate_record_id(prefix: &str, at: DateTime<Utc>) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
        .collect();

    format!("{}_{}_{}", prefix, at.timestamp_millis(), suffix)
}
