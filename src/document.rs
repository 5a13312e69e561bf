//! Extraction Document
//!
//! 抽出結果のデータモデル。JSONのキー名は下流の分類処理が参照するため、
//! ここで定義された名前から変更してはいけません。

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::path::Path;

use crate::taxonomy::Category;

/// `subTableData`の要素
///
/// 通常のサブテーブル行と、Industry Detailsのフラットな行の2種類があります。
/// どちらも自身のキーだけを持つJSONオブジェクトとして出力されます。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SubTableEntry {
    Item(SubTableItem),
    Industry(IndustryItem),
}

/// サブテーブルの1行（空文字列は値なし）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubTableItem {
    pub item_name: String,
    pub item_type: String,
    pub name: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub industry: String,
    pub sub1: String,
    pub sub2: String,
    pub sub3: String,
}

impl SubTableItem {
    /// name / type / sub1 / sub2 / sub3 のいずれかが空でないか
    pub fn has_values(&self) -> bool {
        [&self.name, &self.type_, &self.sub1, &self.sub2, &self.sub3]
            .iter()
            .any(|v| !v.is_empty())
    }
}

/// Industry Details の1行
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndustryItem {
    pub field_label: String,
    pub field_type: String,
    pub value: String,
}

/// 設定シートのフィールド
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRecord {
    pub field_number: i64,
    pub field_type: String,
    pub value: String,
    pub has_sub_table: bool,
    pub sub_table_data: Vec<SubTableEntry>,
}

impl FieldRecord {
    pub fn new(field_number: i64, field_type: String, value: String) -> Self {
        Self {
            field_number,
            field_type,
            value,
            has_sub_table: false,
            sub_table_data: Vec::new(),
        }
    }

    /// サブテーブルを設定（空の場合は何もしない）
    pub(crate) fn attach_sub_table(&mut self, entries: Vec<SubTableEntry>) {
        if !entries.is_empty() {
            self.has_sub_table = true;
            self.sub_table_data = entries;
        }
    }
}

/// 商品と売上原価カテゴリの組
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductEntry {
    pub product_name: String,
    pub cost_of_sales_category: String,
}

/// 指標シートの内容
///
/// 正規化キーと値に加えて、予約キー`_labels`に元のラベルを保持します。
/// `_labels`は最後に出力され、指標が1つもない場合は`{}`になります。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InfoMetrics {
    values: IndexMap<String, serde_json::Value>,
    labels: IndexMap<String, String>,
}

impl InfoMetrics {
    /// 予約キー
    pub const LABELS_KEY: &'static str = "_labels";

    pub fn new() -> Self {
        Self::default()
    }

    /// 指標を追加（同じキーは値とラベルを上書き）
    pub fn insert(&mut self, key: String, label: String, value: serde_json::Value) {
        self.labels.insert(key.clone(), label);
        self.values.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl Serialize for InfoMetrics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let extra = usize::from(!self.labels.is_empty());
        let mut map = serializer.serialize_map(Some(self.values.len() + extra))?;
        for (key, value) in &self.values {
            map.serialize_entry(key, value)?;
        }
        if !self.labels.is_empty() {
            map.serialize_entry(Self::LABELS_KEY, &self.labels)?;
        }
        map.end()
    }
}

/// 財務シートの階層（カテゴリ → サブカテゴリ → 明細名）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FinancialsHierarchy(IndexMap<Category, IndexMap<String, Vec<String>>>);

impl FinancialsHierarchy {
    /// 明細名を持たないサブカテゴリのキー
    pub const OTHER_KEY: &'static str = "_other";

    pub fn new() -> Self {
        Self::default()
    }

    /// サブカテゴリを登録（既存なら何もしない）
    pub fn add_subcategory(&mut self, category: Category, subcategory: &str) -> &mut Vec<String> {
        self.0
            .entry(category)
            .or_default()
            .entry(subcategory.to_string())
            .or_default()
    }

    /// 明細名を追加（重複は無視、挿入順を保持）
    pub fn add_item(&mut self, category: Category, subcategory: &str, item: &str) {
        let items = self.add_subcategory(category, subcategory);
        if !items.iter().any(|existing| existing == item) {
            items.push(item.to_string());
        }
    }

    pub fn get(&self, category: Category) -> Option<&IndexMap<String, Vec<String>>> {
        self.0.get(&category)
    }

    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.0.keys().copied()
    }

    /// サブカテゴリの総数
    pub fn line_items(&self) -> usize {
        self.0.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// `i_Setup`セクション
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupSection {
    pub total_fields: usize,
    pub fields_with_sub_tables: usize,
    pub total_sub_table_items: usize,
    pub fields: IndexMap<String, FieldRecord>,
}

impl SetupSection {
    pub fn new(fields: IndexMap<String, FieldRecord>) -> Self {
        Self {
            total_fields: fields.len(),
            fields_with_sub_tables: fields.values().filter(|f| f.has_sub_table).count(),
            total_sub_table_items: fields.values().map(|f| f.sub_table_data.len()).sum(),
            fields,
        }
    }
}

/// `i_COS`セクション
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostOfSalesSection {
    pub total_products: usize,
    pub products: Vec<ProductEntry>,
}

impl CostOfSalesSection {
    pub fn new(products: Vec<ProductEntry>) -> Self {
        Self {
            total_products: products.len(),
            products,
        }
    }
}

/// 抽出結果のルート
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionDocument {
    /// 抽出日時（ローカル時刻、ISO 8601）
    pub extracted_at: NaiveDateTime,
    /// 入力ファイルのベース名
    pub source_file: String,
    #[serde(rename = "i_Setup")]
    pub setup: SetupSection,
    #[serde(rename = "i_COS")]
    pub cost_of_sales: CostOfSalesSection,
    pub info: InfoMetrics,
    pub financials: FinancialsHierarchy,
}

impl ExtractionDocument {
    /// 事業者名（`Business Name`フィールド）
    ///
    /// 空の場合は入力ファイル名（拡張子なし）を返します。
    pub fn company_name(&self) -> String {
        let name = self
            .setup
            .fields
            .get("Business Name")
            .map(|f| f.value.trim())
            .unwrap_or_default();
        if !name.is_empty() {
            return name.to_string();
        }
        Path::new(&self.source_file)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// 商品に付いた売上原価カテゴリ（重複なし、出現順）
    pub fn cost_of_sales_categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for product in &self.cost_of_sales.products {
            let category = product.cost_of_sales_category.as_str();
            if !category.is_empty() && !categories.contains(&category) {
                categories.push(category);
            }
        }
        categories
    }

    /// 整形済みJSON文字列に変換（インデント2、非ASCII文字はそのまま）
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
