//! Key Normalization
//!
//! 自由記述のラベルを snake_case のキーに変換します。
//! 指標シートのキーと財務カテゴリの判定で共通に使用します。

use regex::Regex;
use std::sync::OnceLock;

fn non_word() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s]").expect("valid regex"))
}

fn separator_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\s_]+").expect("valid regex"))
}

/// ラベルを snake_case キーに正規化
///
/// 1. 英数字・アンダースコア・空白以外の文字を除去
/// 2. 空白とアンダースコアの連続を1つの`_`に置換
/// 3. 小文字化し、前後の`_`を除去
///
/// 例: `"Number of Beds"` → `"number_of_beds"`, `"Revenue (Annual) %"` → `"revenue_annual"`
pub fn normalize_key(label: &str) -> String {
    let stripped = non_word().replace_all(label, "");
    let joined = separator_runs().replace_all(&stripped, "_");
    joined.to_lowercase().trim_matches('_').to_string()
}

/// シート名の比較用正規化（小文字化し、空白とアンダースコアを除去）
pub(crate) fn compact_name(name: &str) -> String {
    separator_runs()
        .replace_all(&name.to_lowercase(), "")
        .into_owned()
}
