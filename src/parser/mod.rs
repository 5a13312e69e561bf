//! Parser Module
//!
//! calamineを使用したワークブック読み込みと、1始まりの行番号・列記号で
//! セルを参照するシートグリッドを提供します。

mod sheet;
mod workbook;

pub(crate) use sheet::Sheet;
pub(crate) use workbook::WorkbookReader;

#[cfg(test)]
pub(crate) use sheet::text;
