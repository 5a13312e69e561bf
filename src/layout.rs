//! Template Layout
//!
//! ワークブックテンプレートの座標情報（シート名の候補、列記号、行範囲）を
//! 宣言的なテーブルとして保持するモジュール。
//!
//! デフォルト値は既知のテンプレートを再現します。TOMLファイルで一部だけを
//! 上書きすることもできます（未指定の項目はデフォルト値のまま）。
//!
//! ```toml
//! [setup.field]
//! value = "N"
//!
//! [[setup.sections]]
//! name = "Revenue Streams"
//! start_row = 40
//! end_row = 60
//! ```

use serde::Deserialize;
use std::path::Path;

use crate::error::ExtractError;
use crate::types::Column;

const A: Column = Column::from_index(0);
const B: Column = Column::from_index(1);
const E: Column = Column::from_index(4);
const F: Column = Column::from_index(5);
const G: Column = Column::from_index(6);
const H: Column = Column::from_index(7);
const I: Column = Column::from_index(8);
const M: Column = Column::from_index(12);
const O: Column = Column::from_index(14);
const P: Column = Column::from_index(15);
const Q: Column = Column::from_index(16);
const R: Column = Column::from_index(17);
const S: Column = Column::from_index(18);

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// テンプレート全体のレイアウト
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct TemplateLayout {
    /// 論理シートごとのシート名候補
    pub sheets: SheetRoles,
    /// 設定シート（i_Setup）
    pub setup: SetupLayout,
    /// 売上原価シート（i_COS）
    pub cost_of_sales: ProductLayout,
    /// 指標シート（info）
    pub info: MetricsLayout,
    /// 財務シート（financials）
    pub financials: FinancialsLayout,
}

impl TemplateLayout {
    /// TOML文字列から読み込む
    pub fn from_toml_str(content: &str) -> Result<Self, ExtractError> {
        toml::from_str(content)
            .map_err(|e| ExtractError::Config(format!("Invalid layout file: {}", e)))
    }

    /// TOMLファイルから読み込む
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ExtractError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// レイアウトを検証
    ///
    /// 行番号は1始まりで、開始行は終了行以下でなければなりません。
    pub(crate) fn validate(&self) -> Result<(), ExtractError> {
        for role in self.sheets.all() {
            if role.names.is_empty() && role.fallback.is_empty() {
                return Err(ExtractError::Config(format!(
                    "Sheet role '{}' has no candidate names",
                    role.role
                )));
            }
        }

        let industry = &self.setup.industry;
        validate_rows("Industry Details", industry.start_row, industry.end_row)?;

        for section in &self.setup.sections {
            if section.name.trim().is_empty() {
                return Err(ExtractError::Config(
                    "Sub-table section with empty field name".to_string(),
                ));
            }
            validate_rows(&section.name, section.start_row, section.end_row)?;
        }

        if self.setup.sub_table.item_markers.iter().any(|m| m.is_empty()) {
            return Err(ExtractError::Config(
                "Sub-table item markers must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn validate_rows(name: &str, start_row: u32, end_row: u32) -> Result<(), ExtractError> {
    if start_row == 0 {
        return Err(ExtractError::Config(format!(
            "Invalid row range for '{}': rows start at 1",
            name
        )));
    }
    if start_row > end_row {
        return Err(ExtractError::Config(format!(
            "Invalid row range for '{}': start row ({}) > end row ({})",
            name, start_row, end_row
        )));
    }
    Ok(())
}

/// 1つの論理シートの解決ルール
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRole {
    /// 論理名（エラーメッセージに使用、例: `i_Setup`）
    pub role: String,
    /// 優先候補
    pub names: Vec<String>,
    /// 代替候補（優先候補の後ろに連結して同じ3段階で照合）
    pub fallback: Vec<String>,
    /// 見つからない場合に抽出を失敗させるか
    pub required: bool,
}

impl SheetRole {
    fn new(role: &str, names: &[&str], fallback: &[&str], required: bool) -> Self {
        Self {
            role: role.to_string(),
            names: strings(names),
            fallback: strings(fallback),
            required,
        }
    }

    /// 指定された項目だけをデフォルト値に上書き
    fn merged(mut self, overrides: Option<SheetRoleOverride>) -> Self {
        let Some(overrides) = overrides else {
            return self;
        };
        if let Some(role) = overrides.role {
            self.role = role;
        }
        if let Some(names) = overrides.names {
            self.names = names;
        }
        if let Some(fallback) = overrides.fallback {
            self.fallback = fallback;
        }
        if let Some(required) = overrides.required {
            self.required = required;
        }
        self
    }
}

/// TOMLの`[sheets.<role>]`テーブル（未指定の項目は論理シートのデフォルト値）
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SheetRoleOverride {
    role: Option<String>,
    names: Option<Vec<String>>,
    fallback: Option<Vec<String>>,
    required: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SheetRolesOverride {
    setup: Option<SheetRoleOverride>,
    cost_of_sales: Option<SheetRoleOverride>,
    info: Option<SheetRoleOverride>,
    financials: Option<SheetRoleOverride>,
}

impl From<SheetRolesOverride> for SheetRoles {
    fn from(overrides: SheetRolesOverride) -> Self {
        let defaults = SheetRoles::default();
        Self {
            setup: defaults.setup.merged(overrides.setup),
            cost_of_sales: defaults.cost_of_sales.merged(overrides.cost_of_sales),
            info: defaults.info.merged(overrides.info),
            financials: defaults.financials.merged(overrides.financials),
        }
    }
}

/// 論理シートの一覧
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "SheetRolesOverride")]
pub struct SheetRoles {
    pub setup: SheetRole,
    pub cost_of_sales: SheetRole,
    pub info: SheetRole,
    pub financials: SheetRole,
}

impl SheetRoles {
    fn all(&self) -> [&SheetRole; 4] {
        [&self.setup, &self.cost_of_sales, &self.info, &self.financials]
    }
}

impl Default for SheetRoles {
    fn default() -> Self {
        Self {
            setup: SheetRole::new(
                "i_Setup",
                &["i_Setup", "i Setup", "Setup", "i-Setup"],
                &["summary", "Summary", "Summary Sheet"],
                true,
            ),
            cost_of_sales: SheetRole::new(
                "i_COS",
                &["i_COS", "i COS", "COS", "i-COS", "Cost of Sales"],
                &[],
                true,
            ),
            info: SheetRole::new("info", &["info", "Info", "Information"], &[], false),
            financials: SheetRole::new(
                "financials",
                &[
                    "financials",
                    "Financials",
                    "Financial",
                    "Financial Statements",
                    "FS",
                ],
                &[],
                false,
            ),
        }
    }
}

/// 設定シートのレイアウト
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SetupLayout {
    pub field: FieldColumns,
    pub industry: IndustryLayout,
    pub sub_table: SubTableColumns,
    /// サブテーブルを走査するフィールド（記載順に処理）
    pub sections: Vec<SectionSpec>,
}

impl Default for SetupLayout {
    fn default() -> Self {
        Self {
            field: FieldColumns::default(),
            industry: IndustryLayout::default(),
            sub_table: SubTableColumns::default(),
            sections: vec![
                SectionSpec::new("Revenue Streams", 44, 58),
                SectionSpec::new("Cost of Sales", 59, 77),
                SectionSpec::new("Operating Costs", 78, 96),
                SectionSpec::new("Financing Costs", 97, 105),
                SectionSpec::new("Capital Investment", 106, 116),
                SectionSpec::new("Borrowing Details", 117, 129),
                SectionSpec::new("Credit Scoring Details", 130, 136),
                SectionSpec::new("Cash Flow Details", 137, 146),
                SectionSpec::new("Collateral & Other", 147, 158),
                SectionSpec::new("Recommendations", 159, 170),
            ],
        }
    }
}

/// フィールド定義行の列
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldColumns {
    pub number: Column,
    pub name: Column,
    pub field_type: Column,
    pub value: Column,
}

impl Default for FieldColumns {
    fn default() -> Self {
        Self {
            number: G,
            name: H,
            field_type: I,
            value: M,
        }
    }
}

/// Industry Details（業種情報）のフラットリスト
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndustryLayout {
    /// 対象フィールド名
    pub field_name: String,
    pub start_row: u32,
    pub end_row: u32,
    /// 完全一致で採用するラベル
    pub labels: Vec<String>,
    pub label: Column,
    pub field_type: Column,
    pub value: Column,
}

impl Default for IndustryLayout {
    fn default() -> Self {
        Self {
            field_name: "Industry Details".to_string(),
            start_row: 19,
            end_row: 26,
            labels: strings(&[
                "Industry Type",
                "Primary Industry",
                "Secondary Industry",
                "Benchmarking Business Sector",
            ]),
            label: H,
            field_type: I,
            value: M,
        }
    }
}

/// サブテーブルの列とマーカー
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SubTableColumns {
    /// ヘッダー行: この列が`header_name_label`と一致
    pub header_name: Column,
    /// ヘッダー行: この列が`header_type_label`と一致
    pub header_type: Column,
    pub header_name_label: String,
    pub header_type_label: String,
    /// 項目名にいずれかを含む行だけをデータ行とする
    ///
    /// `"Steam"`は業務ルール側の表記をそのまま保持しています。
    pub item_markers: Vec<String>,
    pub item_name: Column,
    pub item_type: Column,
    pub name: Column,
    #[serde(rename = "type")]
    pub type_: Column,
    pub industry: Column,
    pub sub1: Column,
    pub sub2: Column,
    pub sub3: Column,
}

impl Default for SubTableColumns {
    fn default() -> Self {
        Self {
            header_name: M,
            header_type: O,
            header_name_label: "Name".to_string(),
            header_type_label: "Type".to_string(),
            item_markers: strings(&["Category", "Steam"]),
            item_name: H,
            item_type: I,
            name: M,
            type_: O,
            industry: P,
            sub1: Q,
            sub2: R,
            sub3: S,
        }
    }
}

/// サブテーブルを持つフィールドと、その走査行範囲（両端を含む）
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionSpec {
    pub name: String,
    pub start_row: u32,
    pub end_row: u32,
}

impl SectionSpec {
    pub fn new(name: &str, start_row: u32, end_row: u32) -> Self {
        Self {
            name: name.to_string(),
            start_row,
            end_row,
        }
    }
}

/// 商品シートのレイアウト
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProductLayout {
    pub name: Column,
    pub category: Column,
    /// ヘッダー行の見出し（この値と一致する行は除外）
    pub name_header: String,
    pub category_header: String,
}

impl Default for ProductLayout {
    fn default() -> Self {
        Self {
            name: H,
            category: I,
            name_header: "Product Name".to_string(),
            category_header: "Cost of Sales Category".to_string(),
        }
    }
}

/// 指標シートのレイアウト
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetricsLayout {
    pub label: Column,
    pub value: Column,
    /// 見出しとして読み飛ばすラベル（小文字で比較）
    pub reserved_labels: Vec<String>,
}

impl Default for MetricsLayout {
    fn default() -> Self {
        Self {
            label: A,
            value: B,
            reserved_labels: strings(&["label", "metric", "name", "description", "info"]),
        }
    }
}

/// 財務シートのレイアウト
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FinancialsLayout {
    /// 優先するカテゴリ列（より具体的な区分）
    pub specific_category: Column,
    /// 汎用カテゴリ列（優先列で解決できない場合のみ参照）
    pub generic_category: Column,
    pub subcategory: Column,
    pub sub_subcategory: Column,
    pub specific_headers: Vec<String>,
    pub generic_headers: Vec<String>,
    pub detail_headers: Vec<String>,
}

impl Default for FinancialsLayout {
    fn default() -> Self {
        Self {
            specific_category: A,
            generic_category: E,
            subcategory: F,
            sub_subcategory: G,
            specific_headers: strings(&["sub1", "line item", "account", "description", "name"]),
            generic_headers: strings(&["sub1", "category", "type", "comments", "sub3"]),
            detail_headers: strings(&["sub3", "comments", "type", "category", "subcategory"]),
        }
    }
}
