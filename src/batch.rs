//! Batch Runner
//!
//! ディレクトリ内のワークブックを順番に抽出します。1ファイルの失敗は
//! ログに記録して次のファイルへ進みます。

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::builder::{default_output_path, Extractor};
use crate::document::ExtractionDocument;
use crate::error::ExtractError;

/// 一括処理から除外する参照用ファイル
pub const DEFAULT_SKIP_NAMES: [&str; 2] = ["subsectors-example.xlsx", "Sub-Sectors_vf.xlsx"];

const WORKBOOK_EXTENSIONS: [&str; 2] = ["xlsx", "xlsm"];

/// 処理対象のワークブックを列挙（ファイル名順）
///
/// 以下は対象外です。
///
/// * `.`で始まるファイル
/// * 拡張子が`.xlsx` / `.xlsm`以外（大文字・小文字を区別しない）
/// * `skip_names`に含まれるファイル名
///
/// # 戻り値
///
/// * `Err(ExtractError::Config)` - `dir`がディレクトリでない場合
pub fn list_workbooks<S: AsRef<str>>(
    dir: &Path,
    skip_names: &[S],
) -> Result<Vec<PathBuf>, ExtractError> {
    if !dir.is_dir() {
        return Err(ExtractError::Config(format!(
            "Not a directory: {}",
            dir.display()
        )));
    }

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with('.') || skip_names.iter().any(|skip| skip.as_ref() == name) {
            continue;
        }
        let is_workbook = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                WORKBOOK_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            });
        if is_workbook {
            paths.push(path);
        }
    }

    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

/// 一括処理の結果
#[derive(Debug, Default)]
pub struct BatchReport {
    /// 成功したファイルと出力先
    pub processed: Vec<(PathBuf, PathBuf)>,
    /// 失敗したファイルとエラーメッセージ
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.processed.len() + self.failed.len()
    }
}

/// ディレクトリ単位の一括処理
///
/// # 使用例
///
/// ```rust,no_run
/// use sectorsheet::{BatchRunner, ExtractorBuilder};
///
/// # fn main() -> Result<(), sectorsheet::ExtractError> {
/// let extractor = ExtractorBuilder::new().build()?;
/// let report = BatchRunner::new(&extractor)
///     .with_append_file("all.jsonl")
///     .run("workbooks")?;
/// println!("{} ok, {} failed", report.processed.len(), report.failed.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct BatchRunner<'a> {
    extractor: &'a Extractor,
    append_file: Option<PathBuf>,
    skip_names: Vec<String>,
}

impl<'a> BatchRunner<'a> {
    pub fn new(extractor: &'a Extractor) -> Self {
        Self {
            extractor,
            append_file: None,
            skip_names: DEFAULT_SKIP_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// 成功した抽出結果を1行1件のJSONとして追記するファイル
    pub fn with_append_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.append_file = Some(path.into());
        self
    }

    /// 除外するファイル名を置き換える
    pub fn with_skip_names(mut self, names: Vec<String>) -> Self {
        self.skip_names = names;
        self
    }

    /// ディレクトリ内のワークブックを処理
    ///
    /// 列挙と追記ファイルのオープンに失敗した場合だけエラーを返します。
    /// 個々のファイルの失敗は`BatchReport::failed`に記録されます。
    pub fn run(&self, dir: impl AsRef<Path>) -> Result<BatchReport, ExtractError> {
        let dir = dir.as_ref();
        let workbooks = list_workbooks(dir, self.skip_names.as_slice())?;
        info!("found {} workbooks in {}", workbooks.len(), dir.display());

        let mut append = match &self.append_file {
            Some(path) => Some(BufWriter::new(
                OpenOptions::new().create(true).append(true).open(path)?,
            )),
            None => None,
        };

        let mut report = BatchReport::default();
        for path in workbooks {
            match self.process(&path, append.as_mut()) {
                Ok(output) => {
                    info!("{} -> {}", path.display(), output.display());
                    report.processed.push((path, output));
                }
                Err(e) => {
                    error!("failed to process {}: {}", path.display(), e);
                    report.failed.push((path, e.to_string()));
                }
            }
        }

        info!(
            "batch finished: {} succeeded, {} failed",
            report.processed.len(),
            report.failed.len()
        );
        Ok(report)
    }

    /// 1ファイルを抽出し、追記ファイルへの1行、個別のJSONファイルの順に書き出す
    ///
    /// 追記に失敗したファイルは個別のJSONファイルを作成しません。
    fn process<W: Write>(
        &self,
        path: &Path,
        append: Option<&mut W>,
    ) -> Result<PathBuf, ExtractError> {
        let document = self.extractor.extract_path(path)?;
        if let Some(writer) = append {
            append_line(writer, &document)?;
        }

        let output = default_output_path(path);
        self.extractor.write_json(&document, File::create(&output)?)?;
        Ok(output)
    }
}

/// 1件を1行のJSONとして追記（行全体をまとめて書き込む）
fn append_line<W: Write>(
    writer: &mut W,
    document: &ExtractionDocument,
) -> Result<(), ExtractError> {
    let mut line = serde_json::to_vec(document)?;
    line.push(b'\n');
    writer.write_all(&line)?;
    writer.flush()?;
    Ok(())
}
