//! Info Sheet Extraction
//!
//! ラベル列と値列の組を、正規化キーの平坦なマップとして抽出します。

use crate::document::InfoMetrics;
use crate::layout::MetricsLayout;
use crate::normalize::normalize_key;
use crate::parser::Sheet;

/// 指標を抽出
///
/// 以下の行は読み飛ばします。
///
/// * ラベルが空
/// * ラベルが見出し語（小文字で比較）
/// * ラベルが`#`で始まる
/// * 値が空
/// * 正規化後のキーが空
pub(crate) fn extract_metrics(sheet: &Sheet, layout: &MetricsLayout) -> InfoMetrics {
    let mut metrics = InfoMetrics::new();

    for row in sheet.rows() {
        let label = sheet.cell(row, layout.label).trimmed();
        if label.is_empty()
            || label.starts_with('#')
            || layout
                .reserved_labels
                .iter()
                .any(|reserved| reserved.eq_ignore_ascii_case(&label))
        {
            continue;
        }

        let value = sheet.cell(row, layout.value);
        if value.is_empty() {
            continue;
        }

        let key = normalize_key(&label);
        if key.is_empty() {
            continue;
        }

        metrics.insert(key, label, value.to_json());
    }

    metrics
}
