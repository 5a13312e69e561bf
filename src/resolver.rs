//! Sheet Resolver
//!
//! 表記ゆれのあるシート名から、論理シートに対応する実シート名を探します。

use crate::normalize::compact_name;

/// シート名を解決
///
/// `primary`の後ろに`fallback`を連結した候補リストに対して、以下の3段階で照合します。
/// 最初に一致したものを返します。
///
/// 1. 大文字・小文字を区別しない完全一致（候補順）
/// 2. 空白・アンダースコアを除去した正規化名の一致（シート順）
/// 3. 正規化名の部分一致（どちらかがもう一方を含む、候補順）
///
/// # 戻り値
///
/// * `Some(String)` - ワークブック内の実際のシート名
/// * `None` - どの段階でも一致しなかった場合
pub fn resolve_sheet(
    sheet_names: &[String],
    primary: &[String],
    fallback: &[String],
) -> Option<String> {
    let candidates: Vec<&String> = primary.iter().chain(fallback).collect();

    // 1. 完全一致（大文字・小文字を区別しない）
    for candidate in &candidates {
        let lower = candidate.to_lowercase();
        if let Some(sheet) = sheet_names.iter().find(|s| s.to_lowercase() == lower) {
            return Some(sheet.clone());
        }
    }

    // 2. 正規化名の一致
    let targets: Vec<String> = candidates.iter().map(|c| compact_name(c)).collect();
    for sheet in sheet_names {
        let normalized = compact_name(sheet);
        if targets.contains(&normalized) {
            return Some(sheet.clone());
        }
    }

    // 3. 部分一致
    // 正規化名が空になるシート（空白だけの名前）は常に部分一致してしまうため除外
    let normalized_sheets: Vec<(String, &String)> = sheet_names
        .iter()
        .map(|s| (compact_name(s), s))
        .filter(|(normalized, _)| !normalized.is_empty())
        .collect();
    for target in targets.iter().filter(|t| !t.is_empty()) {
        for (normalized, sheet) in &normalized_sheets {
            if normalized.contains(target.as_str()) || target.contains(normalized.as_str()) {
                return Some((*sheet).clone());
            }
        }
    }

    None
}
