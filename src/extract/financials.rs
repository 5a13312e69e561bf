//! Financials Sheet Extraction
//!
//! カテゴリ → サブカテゴリ → 明細名 の階層を抽出します。
//! カテゴリは固有列（A列）を優先し、解決できない場合だけ汎用列（E列）を参照します。

use crate::document::FinancialsHierarchy;
use crate::layout::FinancialsLayout;
use crate::parser::Sheet;
use crate::taxonomy::{Category, CATEGORY_RULES};
use crate::types::Column;

pub(crate) fn extract_financials(sheet: &Sheet, layout: &FinancialsLayout) -> FinancialsHierarchy {
    let mut financials = FinancialsHierarchy::new();

    for row in sheet.rows() {
        let category = category_in(sheet, row, layout.specific_category, &layout.specific_headers)
            .or_else(|| category_in(sheet, row, layout.generic_category, &layout.generic_headers));
        let Some(category) = category else {
            continue;
        };

        let subcategory = detail_in(sheet, row, layout.subcategory, &layout.detail_headers);
        let item = detail_in(sheet, row, layout.sub_subcategory, &layout.detail_headers);

        match (subcategory, item) {
            (Some(subcategory), Some(item)) => financials.add_item(category, &subcategory, &item),
            (Some(subcategory), None) => {
                financials.add_subcategory(category, &subcategory);
            }
            (None, Some(item)) => {
                financials.add_item(category, FinancialsHierarchy::OTHER_KEY, &item)
            }
            (None, None) => {}
        }
    }

    financials
}

/// カテゴリ列を解決
fn category_in(sheet: &Sheet, row: u32, col: Column, headers: &[String]) -> Option<Category> {
    let raw = sheet.cell(row, col).trimmed();
    if raw.is_empty() || is_header(&raw, headers) {
        return None;
    }
    CATEGORY_RULES.resolve(&raw)
}

/// サブカテゴリ列・明細列の値（見出し語と数値らしい値は除外）
fn detail_in(sheet: &Sheet, row: u32, col: Column, headers: &[String]) -> Option<String> {
    let raw = sheet.cell(row, col).trimmed();
    if raw.is_empty() || is_header(&raw, headers) || looks_numeric(&raw) {
        return None;
    }
    Some(raw)
}

fn is_header(value: &str, headers: &[String]) -> bool {
    let lowered = value.to_lowercase();
    headers.iter().any(|header| header.to_lowercase() == lowered)
}

/// 区切り文字（`,` `.` `-`）を除くと数字だけになるか
fn looks_numeric(value: &str) -> bool {
    let stripped: String = value.chars().filter(|c| !matches!(c, ',' | '.' | '-')).collect();
    let stripped = stripped.trim();
    !stripped.is_empty() && stripped.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::text;
    use calamine::Data;
    use serde_json::json;

    fn extract(cells: &[(u32, &str, Data)]) -> serde_json::Value {
        let sheet = Sheet::from_cells("financials", cells);
        serde_json::to_value(extract_financials(&sheet, &FinancialsLayout::default())).unwrap()
    }

    #[test]
    fn test_specific_category_with_subcategory() {
        let value = extract(&[(1, "A", text("COGS")), (1, "F", text("Packaging"))]);
        assert_eq!(value, json!({"cost_of_sale": {"Packaging": []}}));
    }

    #[test]
    fn test_generic_category_with_item_only() {
        let value = extract(&[(1, "E", text("Expenses")), (1, "G", text("Rent"))]);
        assert_eq!(value, json!({"opex": {"_other": ["Rent"]}}));
    }

    #[test]
    fn test_specific_column_wins() {
        let value = extract(&[
            (1, "A", text("Revenue")),
            (1, "E", text("Capex")),
            (1, "F", text("Rooms")),
        ]);
        assert_eq!(value, json!({"revenue": {"Rooms": []}}));
    }

    #[test]
    fn test_generic_used_when_specific_unresolved() {
        let value = extract(&[
            (1, "A", text("Line Item")),
            (1, "E", text("Interest Expense")),
            (1, "F", text("Bank Loan")),
            (2, "A", text("Something else")),
            (2, "E", text("Capital Investment")),
            (2, "F", text("Vehicles")),
        ]);
        assert_eq!(
            value,
            json!({
                "financing_cost": {"Bank Loan": []},
                "capex": {"Vehicles": []}
            })
        );
    }

    #[test]
    fn test_header_and_unresolved_rows_dropped() {
        let value = extract(&[
            (1, "A", text("Account")),
            (1, "E", text("Category")),
            (1, "F", text("Subcategory")),
            (1, "G", text("Sub3")),
            (2, "A", text("Miscellaneous")),
            (2, "F", text("Other")),
            (3, "A", text("Sales")),
        ]);
        assert_eq!(value, json!({}));
    }

    #[test]
    fn test_numeric_details_rejected() {
        let value = extract(&[
            (1, "A", text("Revenue")),
            (1, "F", text("1,250.00")),
            (1, "G", Data::Float(300.0)),
            (2, "A", text("Revenue")),
            (2, "F", text("Rooms")),
            (2, "G", text("-15")),
        ]);
        assert_eq!(value, json!({"revenue": {"Rooms": []}}));
    }

    #[test]
    fn test_items_deduplicated_in_order() {
        let value = extract(&[
            (1, "A", text("Operating Expenses")),
            (1, "F", text("Staff")),
            (1, "G", text("Wages")),
            (2, "A", text("opex")),
            (2, "F", text("Staff")),
            (2, "G", text("Training")),
            (3, "A", text("OPEX")),
            (3, "F", text("Staff")),
            (3, "G", text("Wages")),
            (4, "A", text("Opex")),
            (4, "F", text("Utilities")),
        ]);
        assert_eq!(
            value,
            json!({"opex": {"Staff": ["Wages", "Training"], "Utilities": []}})
        );
    }

    #[test]
    fn test_looks_numeric() {
        assert!(looks_numeric("1,000"));
        assert!(looks_numeric("12.5"));
        assert!(looks_numeric("-3"));
        assert!(!looks_numeric("-"));
        assert!(!looks_numeric("Q1"));
        assert!(!looks_numeric(""));
    }
}
