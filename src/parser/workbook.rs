//! Workbook Reader
//!
//! calamineを使用したワークブック読み込みの実装。
//! シート名の一覧を先に取得し、必要なシートだけをグリッドとして読み込みます。

use calamine::{open_workbook_auto_from_rs, Reader, Sheets, Xlsx};
use std::io::{Cursor, Read};

use crate::error::ExtractError;
use crate::parser::Sheet;
use crate::security::SecurityConfig;

/// ワークブックリーダー
///
/// calamineのラッパーとして、ワークブックレベルの操作を提供します。
/// XLSXとXLSM（マクロ有効ブック）はどちらも同じOOXMLコンテナとして読み込まれます。
pub(crate) struct WorkbookReader {
    /// calamineのワークブック（XLSX/XLSM形式のみサポート）
    workbook: Xlsx<Cursor<Vec<u8>>>,
    /// シート名（ブック内の順序）
    sheet_names: Vec<String>,
}

impl WorkbookReader {
    /// ワークブックを開く
    ///
    /// # 引数
    ///
    /// * `reader` - ワークブックのバイト列を読み込むためのリーダー
    /// * `security` - 入力サイズ上限などのセキュリティ設定
    ///
    /// # 戻り値
    ///
    /// * `Ok(WorkbookReader)` - ワークブックの読み込みに成功した場合
    /// * `Err(ExtractError::SecurityViolation)` - 入力サイズが上限を超えた場合
    /// * `Err(ExtractError::Parse)` - コンテナとして読めない場合
    /// * `Err(ExtractError::Config)` - XLSX/XLSM以外の形式の場合
    pub fn open<R: Read>(mut reader: R, security: &SecurityConfig) -> Result<Self, ExtractError> {
        // 上限+1バイトまでだけ読み込む
        let mut buffer = Vec::new();
        let limit = security.max_input_file_size.saturating_add(1);
        let bytes_read = reader.by_ref().take(limit).read_to_end(&mut buffer)?;
        security.check_input_size(bytes_read)?;

        let sheets = open_workbook_auto_from_rs(Cursor::new(buffer)).map_err(ExtractError::Parse)?;
        let workbook = match sheets {
            Sheets::Xlsx(workbook) => workbook,
            _ => {
                return Err(ExtractError::Config(
                    "Only XLSX/XLSM workbooks are supported".to_string(),
                ))
            }
        };

        let sheet_names = workbook.sheet_names().to_vec();

        Ok(Self {
            workbook,
            sheet_names,
        })
    }

    /// すべてのシート名を取得
    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    /// シートを読み込む
    ///
    /// 数式セルはキャッシュされた計算結果の値として読み込まれます。
    pub fn sheet(&mut self, name: &str) -> Result<Sheet, ExtractError> {
        let range = self
            .workbook
            .worksheet_range(name)
            .map_err(|e| ExtractError::Parse(e.into()))?;
        Ok(Sheet::new(name, range))
    }
}
