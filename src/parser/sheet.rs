//! Sheet Grid
//!
//! テンプレートの固定座標でセルを参照するためのシートラッパー。
//! 行番号はExcel表記と同じ1始まり、列は`Column`で指定します。

use calamine::{Data, Range};

use crate::types::{CellValue, Column};

/// 読み込み済みのシート
#[derive(Debug, Clone)]
pub(crate) struct Sheet {
    name: String,
    range: Range<Data>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, range: Range<Data>) -> Self {
        Self {
            name: name.into(),
            range,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 最終行の行番号（1始まり）。空のシートは0
    pub fn max_row(&self) -> u32 {
        self.range.end().map(|(row, _)| row + 1).unwrap_or(0)
    }

    /// 1行目から最終行までの行番号
    pub fn rows(&self) -> std::ops::RangeInclusive<u32> {
        1..=self.max_row()
    }

    /// セルの値を取得
    ///
    /// 使用範囲外のセルや行番号0は`CellValue::Empty`を返します。
    /// calamineの`get_value`は絶対座標を受け取るため、
    /// シートの使用範囲がA1から始まらない場合でも座標はずれません。
    pub fn cell(&self, row: u32, col: Column) -> CellValue {
        if row == 0 {
            return CellValue::Empty;
        }
        self.range
            .get_value((row - 1, col.index()))
            .map(CellValue::from_data)
            .unwrap_or(CellValue::Empty)
    }

    /// テスト用: (行番号, 列記号, 値) のリストからシートを構築
    #[cfg(test)]
    pub fn from_cells(name: &str, cells: &[(u32, &str, Data)]) -> Self {
        let mut range = Range::empty();
        if !cells.is_empty() {
            let coords: Vec<(u32, u32)> = cells
                .iter()
                .map(|(row, col, _)| (row - 1, Column::from_letters(col).unwrap().index()))
                .collect();
            let start = (
                coords.iter().map(|c| c.0).min().unwrap(),
                coords.iter().map(|c| c.1).min().unwrap(),
            );
            let end = (
                coords.iter().map(|c| c.0).max().unwrap(),
                coords.iter().map(|c| c.1).max().unwrap(),
            );
            range = Range::new(start, end);
            for (coord, (_, _, value)) in coords.into_iter().zip(cells) {
                range.set_value(coord, value.clone());
            }
        }
        Self::new(name, range)
    }
}

/// テスト用: 文字列セル
#[cfg(test)]
pub(crate) fn text(value: &str) -> Data {
    Data::String(value.to_string())
}
