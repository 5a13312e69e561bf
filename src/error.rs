//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// sectorsheetクレート全体で使用するエラー型
///
/// ワークブックの読み込み、シート解決、抽出、JSON出力の処理中に発生する
/// すべてのエラーを統一的に扱うために使用されます。
///
/// セル内容の不正（型の不一致、想定外の空セルなど）はエラーにならず、
/// 空値として扱われます。
///
/// # 使用例
///
/// ```rust,no_run
/// use sectorsheet::{ExtractError, ExtractorBuilder};
///
/// # fn main() -> Result<(), ExtractError> {
/// let extractor = ExtractorBuilder::new().build()?;
/// match extractor.extract_path("business.xlsm") {
///     Err(ExtractError::MissingSheet { role, available }) => {
///         eprintln!("{} がありません: {:?}", role, available);
///     }
///     other => {
///         other?;
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Error, Debug)]
pub enum ExtractError {
    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ワークブックの解析中に発生したエラー（calamine由来）
    ///
    /// 破損したファイルやZIPコンテナとして読めないファイルが原因となります。
    #[error("Failed to parse Excel file: {0}")]
    Parse(#[from] calamine::Error),

    /// 必須シートが見つからない
    ///
    /// 3段階のシート名照合のいずれでも一致しなかった場合に発生します。
    /// 診断用に、ワークブック内のすべてのシート名を保持します。
    #[error(
        "Sheet '{role}' (or variations) not found in the workbook. Available sheets: {}",
        available.join(", ")
    )]
    MissingSheet {
        /// 見つからなかったシートの役割名（例: `i_Setup`）
        role: String,
        /// ワークブックに存在するシート名
        available: Vec<String>,
    },

    /// 設定の検証に失敗したエラー
    ///
    /// テンプレートレイアウトの不正（行範囲の逆転、列記号の誤り、TOML構文エラーなど）
    /// や、サポートされていないコンテナ形式の場合に発生します。
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSONのシリアライズに失敗したエラー
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// セキュリティ制限に違反したエラー
    ///
    /// 入力ファイルサイズの上限を超えた場合に発生します。
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}
