//! Integration Tests for sectorsheet
//!
//! Workbooks are generated in memory with rust_xlsxwriter and extracted
//! through the public API.

use rust_xlsxwriter::*;
use serde_json::{json, Value};
use std::io::Cursor;
use sectorsheet::{
    BatchRunner, Category, ExtractError, ExtractionDocument, ExtractorBuilder, TemplateLayout,
};

// Column indexes used by the template
const A: u16 = 0;
const B: u16 = 1;
const E: u16 = 4;
const F: u16 = 5;
const G: u16 = 6;
const H: u16 = 7;
const I: u16 = 8;
const M: u16 = 12;
const O: u16 = 14;
const P: u16 = 15;
const Q: u16 = 16;

// Helper module for generating test fixtures
mod fixtures {
    use super::*;

    /// Sheet names used for each logical sheet
    pub struct SheetNames {
        pub setup: &'static str,
        pub cost_of_sales: &'static str,
        pub info: Option<&'static str>,
        pub financials: Option<&'static str>,
    }

    impl Default for SheetNames {
        fn default() -> Self {
            Self {
                setup: "i_Setup",
                cost_of_sales: "i_COS",
                info: Some("info"),
                financials: Some("financials"),
            }
        }
    }

    /// 1-based row helper
    fn row(r: u32) -> u32 {
        r - 1
    }

    fn write_setup(sheet: &mut Worksheet) -> Result<(), XlsxError> {
        sheet.write_number(row(1), G, 1.0)?;
        sheet.write_string(row(1), H, "Business Name")?;
        sheet.write_string(row(1), I, "text")?;
        sheet.write_string(row(1), M, "Harbour Lodge")?;

        sheet.write_number(row(2), G, 2.0)?;
        sheet.write_string(row(2), H, "Employees")?;
        sheet.write_string(row(2), I, "number")?;
        sheet.write_number(row(2), M, 14.0)?;

        sheet.write_number(row(3), G, 3.0)?;
        sheet.write_string(row(3), H, "Industry Details")?;
        sheet.write_string(row(3), I, "group")?;

        // Industry Details
        sheet.write_string(row(19), H, "Industry Type")?;
        sheet.write_string(row(19), I, "list")?;
        sheet.write_string(row(19), M, "Hospitality")?;
        sheet.write_string(row(20), H, "Primary Industry")?;
        sheet.write_string(row(20), I, "list")?;
        sheet.write_string(row(20), M, "Accommodation")?;
        sheet.write_string(row(21), H, "Comments")?;
        sheet.write_string(row(21), M, "ignored")?;

        // Revenue Streams sub-table
        sheet.write_number(row(44), G, 12.0)?;
        sheet.write_string(row(44), H, "Revenue Streams")?;
        sheet.write_string(row(44), I, "table")?;
        sheet.write_string(row(45), M, "Name")?;
        sheet.write_string(row(45), O, "Type")?;
        sheet.write_string(row(46), H, "Revenue Steam 1")?;
        sheet.write_string(row(46), I, "stream")?;
        sheet.write_string(row(46), M, "Room sales")?;
        sheet.write_string(row(46), O, "Service")?;
        sheet.write_string(row(46), P, "Hospitality")?;
        sheet.write_string(row(46), Q, "Rooms")?;
        sheet.write_string(row(47), H, "Revenue Steam 2")?;
        sheet.write_string(row(48), H, "Notes")?;
        sheet.write_string(row(48), M, "not an item")?;

        // Cost of Sales field without a header row
        sheet.write_number(row(59), G, 13.0)?;
        sheet.write_string(row(59), H, "Cost of Sales")?;
        sheet.write_string(row(60), H, "Category 1")?;
        sheet.write_string(row(60), M, "Linen")?;

        Ok(())
    }

    fn write_cost_of_sales(sheet: &mut Worksheet) -> Result<(), XlsxError> {
        sheet.write_string(row(1), H, "Product Name")?;
        sheet.write_string(row(1), I, "Cost of Sales Category")?;
        sheet.write_string(row(2), H, "Room")?;
        sheet.write_string(row(2), I, "Linen")?;
        sheet.write_string(row(3), H, "Room")?;
        sheet.write_string(row(3), I, "Linen")?;
        sheet.write_string(row(4), H, "Breakfast")?;
        sheet.write_string(row(4), I, "Food")?;
        Ok(())
    }

    fn write_info(sheet: &mut Worksheet) -> Result<(), XlsxError> {
        sheet.write_string(row(1), A, "Metric")?;
        sheet.write_string(row(1), B, "Value")?;
        sheet.write_string(row(2), A, "Number of Beds")?;
        sheet.write_number(row(2), B, 40.0)?;
        sheet.write_string(row(3), A, "Occupancy Rate (%)")?;
        sheet.write_number(row(3), B, 0.65)?;
        sheet.write_string(row(4), A, "# internal note")?;
        sheet.write_string(row(4), B, "x")?;
        Ok(())
    }

    fn write_financials(sheet: &mut Worksheet) -> Result<(), XlsxError> {
        sheet.write_string(row(1), A, "Line Item")?;
        sheet.write_string(row(1), E, "Category")?;
        sheet.write_string(row(1), F, "Subcategory")?;
        sheet.write_string(row(2), A, "COGS")?;
        sheet.write_string(row(2), F, "Packaging")?;
        sheet.write_string(row(3), E, "Expenses")?;
        sheet.write_string(row(3), G, "Rent")?;
        sheet.write_string(row(4), A, "Revenue")?;
        sheet.write_string(row(4), F, "Rooms")?;
        sheet.write_number(row(4), G, 1200.0)?;
        Ok(())
    }

    /// Generate a template workbook with the given sheet names
    pub fn generate_template(names: &SheetNames) -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();

        let setup = workbook.add_worksheet();
        setup.set_name(names.setup)?;
        write_setup(setup)?;

        let cos = workbook.add_worksheet();
        cos.set_name(names.cost_of_sales)?;
        write_cost_of_sales(cos)?;

        if let Some(name) = names.info {
            let info = workbook.add_worksheet();
            info.set_name(name)?;
            write_info(info)?;
        }

        if let Some(name) = names.financials {
            let financials = workbook.add_worksheet();
            financials.set_name(name)?;
            write_financials(financials)?;
        }

        workbook.save_to_buffer()
    }

    /// Generate a workbook without a cost-of-sales sheet
    pub fn generate_without_cost_of_sales() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let setup = workbook.add_worksheet();
        setup.set_name("i_Setup")?;
        write_setup(setup)?;
        workbook.add_worksheet().set_name("Notes")?;
        workbook.save_to_buffer()
    }
}

fn extract(data: Vec<u8>) -> ExtractionDocument {
    let extractor = ExtractorBuilder::new().build().unwrap();
    extractor.extract(Cursor::new(data), "harbour.xlsx").unwrap()
}

fn to_value(document: &ExtractionDocument) -> Value {
    serde_json::to_value(document).unwrap()
}

// 全体の抽出結果
#[test]
fn test_full_document() {
    let data = fixtures::generate_template(&fixtures::SheetNames::default()).unwrap();
    let document = extract(data);
    let value = to_value(&document);

    assert_eq!(value["sourceFile"], json!("harbour.xlsx"));
    assert_eq!(document.company_name(), "Harbour Lodge");

    // i_Setup
    let setup = &value["i_Setup"];
    assert_eq!(setup["totalFields"], json!(5));
    assert_eq!(setup["fieldsWithSubTables"], json!(2));
    assert_eq!(setup["totalSubTableItems"], json!(3));
    assert_eq!(
        setup["fields"]["Business Name"],
        json!({
            "fieldNumber": 1,
            "fieldType": "text",
            "value": "Harbour Lodge",
            "hasSubTable": false,
            "subTableData": []
        })
    );
    assert_eq!(setup["fields"]["Employees"]["value"], json!("14"));
    assert_eq!(
        setup["fields"]["Industry Details"]["subTableData"],
        json!([
            {"fieldLabel": "Industry Type", "fieldType": "list", "value": "Hospitality"},
            {"fieldLabel": "Primary Industry", "fieldType": "list", "value": "Accommodation"}
        ])
    );
    assert_eq!(
        setup["fields"]["Revenue Streams"]["subTableData"],
        json!([{
            "itemName": "Revenue Steam 1",
            "itemType": "stream",
            "name": "Room sales",
            "type": "Service",
            "industry": "Hospitality",
            "sub1": "Rooms",
            "sub2": "",
            "sub3": ""
        }])
    );
    // ヘッダー行がないセクションは空のまま
    assert_eq!(setup["fields"]["Cost of Sales"]["hasSubTable"], json!(false));

    // i_COS
    assert_eq!(
        value["i_COS"],
        json!({
            "totalProducts": 2,
            "products": [
                {"productName": "Room", "costOfSalesCategory": "Linen"},
                {"productName": "Breakfast", "costOfSalesCategory": "Food"}
            ]
        })
    );
    assert_eq!(document.cost_of_sales_categories(), vec!["Linen", "Food"]);

    // info
    assert_eq!(
        value["info"],
        json!({
            "number_of_beds": 40,
            "occupancy_rate": 0.65,
            "_labels": {
                "number_of_beds": "Number of Beds",
                "occupancy_rate": "Occupancy Rate (%)"
            }
        })
    );

    // financials
    assert_eq!(
        value["financials"],
        json!({
            "cost_of_sale": {"Packaging": []},
            "opex": {"_other": ["Rent"]},
            "revenue": {"Rooms": []}
        })
    );
    assert_eq!(document.financials.line_items(), 3);
    assert!(document.financials.get(Category::Capex).is_none());
}

// トップレベルのキー順序
#[test]
fn test_top_level_key_order() {
    let data = fixtures::generate_template(&fixtures::SheetNames::default()).unwrap();
    let json = extract(data).to_json_pretty().unwrap();

    let positions: Vec<usize> = [
        "\"extractedAt\"",
        "\"sourceFile\"",
        "\"i_Setup\"",
        "\"i_COS\"",
        "\"info\"",
        "\"financials\"",
    ]
    .iter()
    .map(|key| json.find(key).unwrap())
    .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

// 同じ入力からは extractedAt 以外同一の結果
#[test]
fn test_extraction_is_deterministic() {
    let data = fixtures::generate_template(&fixtures::SheetNames::default()).unwrap();
    let mut first = to_value(&extract(data.clone()));
    let mut second = to_value(&extract(data));

    first.as_object_mut().unwrap().remove("extractedAt");
    second.as_object_mut().unwrap().remove("extractedAt");
    assert_eq!(first, second);
}

// 表記ゆれのあるシート名
#[test]
fn test_sheet_name_variations() {
    let names = fixtures::SheetNames {
        setup: "I SETUP",
        cost_of_sales: "Cost of Sales",
        info: Some("Information"),
        financials: Some("Financial Statements 2024"),
    };
    let data = fixtures::generate_template(&names).unwrap();
    let document = extract(data);

    assert_eq!(document.setup.total_fields, 5);
    assert_eq!(document.cost_of_sales.total_products, 2);
    assert_eq!(document.info.len(), 2);
    assert_eq!(document.financials.line_items(), 3);
}

// Summary シートへのフォールバック
#[test]
fn test_setup_fallback_to_summary() {
    let names = fixtures::SheetNames {
        setup: "Summary",
        ..Default::default()
    };
    let data = fixtures::generate_template(&names).unwrap();
    let document = extract(data);
    assert_eq!(document.company_name(), "Harbour Lodge");
}

// 任意シートがない場合は空のオブジェクト
#[test]
fn test_optional_sheets_missing() {
    let names = fixtures::SheetNames {
        info: None,
        financials: None,
        ..Default::default()
    };
    let data = fixtures::generate_template(&names).unwrap();
    let value = to_value(&extract(data));

    assert_eq!(value["info"], json!({}));
    assert_eq!(value["financials"], json!({}));
    assert_eq!(value["i_COS"]["totalProducts"], json!(2));
}

// 必須シートがない場合は MissingSheet
#[test]
fn test_missing_required_sheet() {
    let extractor = ExtractorBuilder::new().build().unwrap();
    let data = fixtures::generate_without_cost_of_sales().unwrap();

    let result = extractor.extract(Cursor::new(data), "no-cos.xlsx");
    match result {
        Err(ExtractError::MissingSheet { role, available }) => {
            assert_eq!(role, "i_COS");
            assert_eq!(available, vec!["i_Setup".to_string(), "Notes".to_string()]);
        }
        other => panic!("Expected MissingSheet error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_missing_sheet_message_lists_sheets() {
    let extractor = ExtractorBuilder::new().build().unwrap();
    let data = fixtures::generate_without_cost_of_sales().unwrap();

    let error = extractor
        .extract(Cursor::new(data), "no-cos.xlsx")
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        "Sheet 'i_COS' (or variations) not found in the workbook. Available sheets: i_Setup, Notes"
    );
}

// TOMLでレイアウトを上書き
#[test]
fn test_layout_override_changes_columns() {
    let layout = TemplateLayout::from_toml_str(
        r#"
        [cost_of_sales]
        name = "M"
        category = "O"
        "#,
    )
    .unwrap();
    let extractor = ExtractorBuilder::new().with_layout(layout).build().unwrap();

    let data = fixtures::generate_template(&fixtures::SheetNames::default()).unwrap();
    let document = extractor.extract(Cursor::new(data), "harbour.xlsx").unwrap();
    // M/O列には何も書かれていない
    assert_eq!(document.cost_of_sales.total_products, 0);
    assert_eq!(document.setup.total_fields, 5);
}

#[test]
fn test_layout_override_sheet_roles() {
    let layout = TemplateLayout::from_toml_str(
        r#"
        [sheets.info]
        role = "info"
        names = ["Metrics"]
        "#,
    )
    .unwrap();
    let extractor = ExtractorBuilder::new().with_layout(layout).build().unwrap();

    let data = fixtures::generate_template(&fixtures::SheetNames::default()).unwrap();
    let document = extractor.extract(Cursor::new(data), "harbour.xlsx").unwrap();
    // "info"シートは候補にないので空
    assert!(document.info.is_empty());
}

// ファイルへの書き出し
#[test]
fn test_extract_to_json_file_default_path() {
    let dir = tempfile::TempDir::new().unwrap();
    let input = dir.path().join("Harbour Lodge.xlsx");
    let data = fixtures::generate_template(&fixtures::SheetNames::default()).unwrap();
    std::fs::write(&input, data).unwrap();

    let extractor = ExtractorBuilder::new().build().unwrap();
    let (document, output) = extractor.extract_to_json_file(&input, None).unwrap();

    assert_eq!(output, dir.path().join("Harbour Lodge.json"));
    assert_eq!(document.source_file, "Harbour Lodge.xlsx");

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.starts_with("{\n  \"extractedAt\": "));
    let parsed: Value = serde_json::from_str(&written).unwrap();
    assert_eq!(parsed["i_Setup"]["totalFields"], json!(5));
}

#[test]
fn test_extract_to_json_file_explicit_output() {
    let dir = tempfile::TempDir::new().unwrap();
    let input = dir.path().join("harbour.xlsm");
    let output = dir.path().join("out.json");
    let data = fixtures::generate_template(&fixtures::SheetNames::default()).unwrap();
    std::fs::write(&input, data).unwrap();

    let extractor = ExtractorBuilder::new().build().unwrap();
    let (_, written) = extractor
        .extract_to_json_file(&input, Some(&output))
        .unwrap();

    assert_eq!(written, output);
    assert!(output.exists());
    assert!(!dir.path().join("harbour.json").exists());
}

// 一括処理: 失敗したファイルは他のファイルに影響しない
#[test]
fn test_batch_isolates_failures() {
    let dir = tempfile::TempDir::new().unwrap();
    let data = fixtures::generate_template(&fixtures::SheetNames::default()).unwrap();
    std::fs::write(dir.path().join("a.xlsx"), &data).unwrap();
    std::fs::write(dir.path().join("b.xlsx"), b"corrupt").unwrap();
    std::fs::write(dir.path().join("c.xlsm"), &data).unwrap();
    std::fs::write(dir.path().join("subsectors-example.xlsx"), &data).unwrap();
    std::fs::write(
        dir.path().join("d.xlsx"),
        fixtures::generate_without_cost_of_sales().unwrap(),
    )
    .unwrap();

    let append = dir.path().join("all.jsonl");
    let extractor = ExtractorBuilder::new().build().unwrap();
    let report = BatchRunner::new(&extractor)
        .with_append_file(&append)
        .run(dir.path())
        .unwrap();

    assert_eq!(report.processed.len(), 2);
    assert_eq!(report.failed.len(), 2);
    assert!(dir.path().join("a.json").exists());
    assert!(dir.path().join("c.json").exists());
    assert!(!dir.path().join("b.json").exists());
    assert!(!dir.path().join("subsectors-example.json").exists());

    let failed: Vec<String> = report
        .failed
        .iter()
        .map(|(path, _)| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(failed, vec!["b.xlsx", "d.xlsx"]);
    assert!(report.failed[1].1.contains("i_COS"));

    // 成功したファイルごとに1行
    let lines: Vec<String> = std::fs::read_to_string(&append)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect();
    assert_eq!(lines.len(), 2);
    let first: Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(first["sourceFile"], json!("a.xlsx"));
}

#[test]
fn test_batch_appends_across_runs() {
    let dir = tempfile::TempDir::new().unwrap();
    let data = fixtures::generate_template(&fixtures::SheetNames::default()).unwrap();
    std::fs::write(dir.path().join("a.xlsx"), &data).unwrap();

    let out_dir = tempfile::TempDir::new().unwrap();
    let append = out_dir.path().join("all.jsonl");
    let extractor = ExtractorBuilder::new().build().unwrap();
    for _ in 0..2 {
        BatchRunner::new(&extractor)
            .with_append_file(&append)
            .run(dir.path())
            .unwrap();
    }

    let content = std::fs::read_to_string(&append).unwrap();
    assert_eq!(content.lines().count(), 2);
}
