//! Builder Module
//!
//! Fluent Builder APIを提供し、`Extractor`インスタンスを段階的に構築する。

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::document::{
    CostOfSalesSection, ExtractionDocument, FinancialsHierarchy, InfoMetrics, SetupSection,
};
use crate::error::ExtractError;
use crate::extract::{extract_financials, extract_metrics, extract_products, extract_setup};
use crate::layout::{SheetRole, TemplateLayout};
use crate::parser::{Sheet, WorkbookReader};
use crate::resolver::resolve_sheet;
use crate::security::SecurityConfig;

/// Fluent Builder APIを提供する構造体
///
/// すべての設定項目にデフォルト値（既知のテンプレートのレイアウト）が設定されており、
/// 必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use sectorsheet::{ExtractorBuilder, TemplateLayout};
///
/// # fn main() -> Result<(), sectorsheet::ExtractError> {
/// let layout = TemplateLayout::from_path("layout.toml")?;
/// let extractor = ExtractorBuilder::new()
///     .with_layout(layout)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ExtractorBuilder {
    layout: TemplateLayout,
    security: SecurityConfig,
}

impl ExtractorBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    pub fn new() -> Self {
        Self::default()
    }

    /// テンプレートのレイアウトを指定する
    ///
    /// # 引数
    ///
    /// * `layout: TemplateLayout`: シート名の候補、列、行範囲
    pub fn with_layout(mut self, layout: TemplateLayout) -> Self {
        self.layout = layout;
        self
    }

    /// 入力サイズの制限を指定する
    pub fn with_security(mut self, security: SecurityConfig) -> Self {
        self.security = security;
        self
    }

    /// 設定を検証し、`Extractor`インスタンスを生成する
    ///
    /// # 戻り値
    ///
    /// * `Ok(Extractor)`: 設定が有効な場合
    /// * `Err(ExtractError::Config)`: レイアウトが無効な場合
    ///   * 行範囲の開始 > 終了、または行番号が0
    ///   * シート名の候補が1つもない論理シート
    ///   * サブテーブルの項目マーカーが空文字列
    pub fn build(self) -> Result<Extractor, ExtractError> {
        self.layout.validate()?;
        Ok(Extractor {
            layout: self.layout,
            security: self.security,
        })
    }
}

/// 抽出処理のファサード
///
/// ワークブックを開き、4つの論理シートを解決し、抽出結果を1つの
/// `ExtractionDocument`にまとめます。
///
/// # 使用例
///
/// ```rust,no_run
/// use sectorsheet::ExtractorBuilder;
///
/// # fn main() -> Result<(), sectorsheet::ExtractError> {
/// let extractor = ExtractorBuilder::new().build()?;
/// let (document, output) = extractor.extract_to_json_file("business.xlsm", None)?;
/// println!("{} -> {}", document.company_name(), output.display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Extractor {
    layout: TemplateLayout,
    security: SecurityConfig,
}

impl Extractor {
    pub fn layout(&self) -> &TemplateLayout {
        &self.layout
    }

    /// ワークブックから抽出
    ///
    /// # 引数
    ///
    /// * `input` - ワークブックを読み込むためのリーダー
    /// * `source_file` - 出力の`sourceFile`に記録する名前
    ///
    /// # 処理フロー
    ///
    /// 1. ワークブックを開く
    /// 2. 必須シート（設定、売上原価）を解決。見つからなければ`MissingSheet`
    /// 3. 任意シート（指標、財務）を解決。見つからなければ警告して空の構造
    /// 4. 各シートを抽出し、件数を集計
    pub fn extract<R: Read>(
        &self,
        input: R,
        source_file: &str,
    ) -> Result<ExtractionDocument, ExtractError> {
        let mut workbook = WorkbookReader::open(input, &self.security)?;
        let roles = &self.layout.sheets;

        let setup_sheet = self.required_sheet(&mut workbook, &roles.setup)?;
        let cos_sheet = self.required_sheet(&mut workbook, &roles.cost_of_sales)?;
        let info_sheet = self.optional_sheet(&mut workbook, &roles.info)?;
        let financials_sheet = self.optional_sheet(&mut workbook, &roles.financials)?;

        info!(
            setup = setup_sheet.name(),
            cost_of_sales = cos_sheet.name(),
            metrics = info_sheet.as_ref().map(Sheet::name),
            financials = financials_sheet.as_ref().map(Sheet::name),
            "resolved sheets for {}",
            source_file
        );

        let setup = SetupSection::new(extract_setup(&setup_sheet, &self.layout.setup));
        let cost_of_sales =
            CostOfSalesSection::new(extract_products(&cos_sheet, &self.layout.cost_of_sales));
        let info = info_sheet
            .map(|sheet| extract_metrics(&sheet, &self.layout.info))
            .unwrap_or_else(InfoMetrics::new);
        let financials = financials_sheet
            .map(|sheet| extract_financials(&sheet, &self.layout.financials))
            .unwrap_or_else(FinancialsHierarchy::new);

        debug!(
            fields = setup.total_fields,
            sub_tables = setup.fields_with_sub_tables,
            products = cost_of_sales.total_products,
            metrics = info.len(),
            line_items = financials.line_items(),
            "extracted {}",
            source_file
        );

        Ok(ExtractionDocument {
            extracted_at: chrono::Local::now().naive_local(),
            source_file: source_file.to_string(),
            setup,
            cost_of_sales,
            info,
            financials,
        })
    }

    /// ファイルパスから抽出（`sourceFile`はファイルのベース名）
    pub fn extract_path(&self, path: impl AsRef<Path>) -> Result<ExtractionDocument, ExtractError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let source_file = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.extract(file, &source_file)
    }

    /// 抽出結果を整形済みJSONとして書き出す
    pub fn write_json<W: Write>(
        &self,
        document: &ExtractionDocument,
        output: W,
    ) -> Result<(), ExtractError> {
        let mut writer = BufWriter::new(output);
        serde_json::to_writer_pretty(&mut writer, document)?;
        writer.flush()?;
        Ok(())
    }

    /// ファイルから抽出し、JSONファイルに書き出す
    ///
    /// # 引数
    ///
    /// * `input` - 入力ワークブックのパス
    /// * `output` - 出力先。`None`の場合は入力パスの拡張子を`.json`に置き換えたパス
    ///
    /// # 戻り値
    ///
    /// * `Ok((ExtractionDocument, PathBuf))` - 抽出結果と実際の出力先
    pub fn extract_to_json_file(
        &self,
        input: impl AsRef<Path>,
        output: Option<&Path>,
    ) -> Result<(ExtractionDocument, PathBuf), ExtractError> {
        let input = input.as_ref();
        let document = self.extract_path(input)?;
        let output = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_output_path(input));

        self.write_json(&document, File::create(&output)?)?;
        info!("wrote {}", output.display());
        Ok((document, output))
    }

    fn required_sheet(
        &self,
        workbook: &mut WorkbookReader,
        role: &SheetRole,
    ) -> Result<Sheet, ExtractError> {
        match self.find_sheet(workbook, role)? {
            Some(sheet) => Ok(sheet),
            None => Err(ExtractError::MissingSheet {
                role: role.role.clone(),
                available: workbook.sheet_names().to_vec(),
            }),
        }
    }

    fn optional_sheet(
        &self,
        workbook: &mut WorkbookReader,
        role: &SheetRole,
    ) -> Result<Option<Sheet>, ExtractError> {
        if role.required {
            return self.required_sheet(workbook, role).map(Some);
        }
        let sheet = self.find_sheet(workbook, role)?;
        if sheet.is_none() {
            warn!(
                "Sheet '{}' not found, skipping (available: {})",
                role.role,
                workbook.sheet_names().join(", ")
            );
        }
        Ok(sheet)
    }

    fn find_sheet(
        &self,
        workbook: &mut WorkbookReader,
        role: &SheetRole,
    ) -> Result<Option<Sheet>, ExtractError> {
        match resolve_sheet(workbook.sheet_names(), &role.names, &role.fallback) {
            Some(name) => workbook.sheet(&name).map(Some),
            None => Ok(None),
        }
    }
}

/// 入力パスの拡張子を`.json`に置き換えたパス
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("json")
}
