//! Cost of Sales Sheet Extraction

use std::collections::HashSet;

use crate::document::ProductEntry;
use crate::layout::ProductLayout;
use crate::parser::Sheet;

/// 商品名と売上原価カテゴリの組を抽出
///
/// 両方の列が空でない文字列で、見出し行でない行だけを採用します。
/// 同じ組は最初の出現だけを残します。
pub(crate) fn extract_products(sheet: &Sheet, layout: &ProductLayout) -> Vec<ProductEntry> {
    let mut seen = HashSet::new();
    let mut products = Vec::new();

    for row in sheet.rows() {
        let name_cell = sheet.cell(row, layout.name);
        let category_cell = sheet.cell(row, layout.category);
        let (Some(name), Some(category)) = (name_cell.as_text(), category_cell.as_text()) else {
            continue;
        };

        let name = name.trim();
        let category = category.trim();
        if name.is_empty()
            || category.is_empty()
            || name == layout.name_header
            || category == layout.category_header
        {
            continue;
        }

        let entry = ProductEntry {
            product_name: name.to_string(),
            cost_of_sales_category: category.to_string(),
        };
        if seen.insert(entry.clone()) {
            products.push(entry);
        }
    }

    products
}
