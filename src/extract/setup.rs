//! Setup Sheet Extraction
//!
//! 固定列のフィールド定義行と、特定フィールドに埋め込まれたサブテーブルを抽出します。

use indexmap::IndexMap;
use tracing::debug;

use crate::document::{FieldRecord, IndustryItem, SubTableEntry, SubTableItem};
use crate::layout::{FieldColumns, IndustryLayout, SectionSpec, SetupLayout, SubTableColumns};
use crate::parser::Sheet;
use crate::types::CellValue;

/// 設定シート全体を抽出
///
/// フィールド定義を読み取った後、Industry Details と各サブテーブルセクションを
/// 該当フィールドに付加します。存在しないフィールドのセクションは走査しません。
pub(crate) fn extract_setup(sheet: &Sheet, layout: &SetupLayout) -> IndexMap<String, FieldRecord> {
    let mut fields = extract_fields(sheet, &layout.field);

    if let Some(record) = fields.get_mut(&layout.industry.field_name) {
        let items = extract_industry_details(sheet, &layout.industry);
        debug!(items = items.len(), "Industry Details");
        record.attach_sub_table(items.into_iter().map(SubTableEntry::Industry).collect());
    }

    for section in &layout.sections {
        if let Some(record) = fields.get_mut(&section.name) {
            let items = extract_section(sheet, section, &layout.sub_table);
            debug!(
                field = %section.name,
                start_row = section.start_row,
                end_row = section.end_row,
                items = items.len(),
                "sub-table section"
            );
            record.attach_sub_table(items.into_iter().map(SubTableEntry::Item).collect());
        }
    }

    fields
}

/// フィールド定義行を抽出
///
/// 番号列が数値で、名前列が空でない文字列の行だけをフィールドとみなします。
/// 同じ名前が複数回現れた場合は後の行で上書きされます（位置は最初の出現のまま）。
fn extract_fields(sheet: &Sheet, columns: &FieldColumns) -> IndexMap<String, FieldRecord> {
    let mut fields = IndexMap::new();

    for row in sheet.rows() {
        let Some(number) = sheet.cell(row, columns.number).as_number() else {
            continue;
        };
        let name_cell = sheet.cell(row, columns.name);
        let Some(name) = name_cell.as_text().map(str::trim).filter(|n| !n.is_empty()) else {
            continue;
        };

        let field_type = sheet.cell(row, columns.field_type).truthy_trimmed();
        let value = match sheet.cell(row, columns.value) {
            CellValue::String(s) => s,
            other => other.as_raw_string(),
        };

        fields.insert(
            name.to_string(),
            FieldRecord::new(number.trunc() as i64, field_type, value),
        );
    }

    fields
}

/// Industry Details のフラットリストを抽出
///
/// ラベル列が既知のラベルと完全一致する行だけを採用します。
fn extract_industry_details(sheet: &Sheet, layout: &IndustryLayout) -> Vec<IndustryItem> {
    (layout.start_row..=layout.end_row)
        .filter_map(|row| {
            let label_cell = sheet.cell(row, layout.label);
            let label = label_cell.as_text()?;
            if !layout.labels.iter().any(|known| known == label) {
                return None;
            }
            Some(IndustryItem {
                field_label: label.trim().to_string(),
                field_type: sheet.cell(row, layout.field_type).truthy_trimmed(),
                value: sheet.cell(row, layout.value).truthy_trimmed(),
            })
        })
        .collect()
}

/// 1つのセクションのサブテーブルを抽出
///
/// 行範囲内でヘッダー行（Name / Type）を探し、それ以降の行をデータ行の候補とします。
/// ヘッダー行が見つからない場合は空のリストを返します。
fn extract_section(
    sheet: &Sheet,
    section: &SectionSpec,
    columns: &SubTableColumns,
) -> Vec<SubTableItem> {
    let last_row = section.end_row.min(sheet.max_row());
    let mut items = Vec::new();
    let mut header_found = false;

    for row in section.start_row..=last_row {
        if is_header_row(sheet, row, columns) {
            header_found = true;
            continue;
        }
        if !header_found {
            continue;
        }

        let item_name = sheet.cell(row, columns.item_name);
        let is_item = item_name
            .as_text()
            .map(|text| columns.item_markers.iter().any(|m| text.contains(m.as_str())))
            .unwrap_or(false);
        if !is_item {
            continue;
        }

        let item = SubTableItem {
            item_name: item_name.truthy_trimmed(),
            item_type: sheet.cell(row, columns.item_type).truthy_trimmed(),
            name: sheet.cell(row, columns.name).truthy_trimmed(),
            type_: sheet.cell(row, columns.type_).truthy_trimmed(),
            industry: sheet.cell(row, columns.industry).truthy_trimmed(),
            sub1: sheet.cell(row, columns.sub1).truthy_trimmed(),
            sub2: sheet.cell(row, columns.sub2).truthy_trimmed(),
            sub3: sheet.cell(row, columns.sub3).truthy_trimmed(),
        };
        if item.has_values() {
            items.push(item);
        }
    }

    items
}

fn is_header_row(sheet: &Sheet, row: u32, columns: &SubTableColumns) -> bool {
    sheet.cell(row, columns.header_name).as_text() == Some(columns.header_name_label.as_str())
        && sheet.cell(row, columns.header_type).as_text()
            == Some(columns.header_type_label.as_str())
}
