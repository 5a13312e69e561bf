//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

use calamine::Data;
use serde::Deserialize;
use std::fmt;

/// セルの値を表す列挙型
///
/// calamineの`Data`を、抽出処理で扱いやすい形に正規化したものです。
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CellValue {
    /// 数値（整数セルもf64として保持）
    Number(f64),

    /// 文字列（トリムしない）
    String(String),

    /// 論理値
    Bool(bool),

    /// 日時（`YYYY-MM-DD HH:MM:SS`形式の文字列）
    DateTime(String),

    /// エラー値（例: #DIV/0!）
    Error(String),

    /// 空セル
    Empty,
}

impl CellValue {
    /// calamineのセルデータから変換
    pub fn from_data(data: &Data) -> Self {
        match data {
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::String(s) => CellValue::String(s.clone()),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(naive) => CellValue::DateTime(naive.format("%Y-%m-%d %H:%M:%S").to_string()),
                None => CellValue::Number(dt.as_f64()),
            },
            Data::DateTimeIso(s) => CellValue::DateTime(s.clone()),
            Data::DurationIso(s) => CellValue::String(s.clone()),
            Data::Error(e) => CellValue::Error(e.to_string()),
            Data::Empty => CellValue::Empty,
        }
    }

    /// 値が空かどうかを判定
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// 数値セルの場合のみ値を返す
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// 文字列セルの場合のみ値を返す
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// 値を表示用の文字列として取得
    ///
    /// 整数値の浮動小数点数は小数部なしで出力します（`5.0` → `"5"`）。
    pub fn as_raw_string(&self) -> String {
        match self {
            CellValue::Number(n) => format_number(*n),
            CellValue::String(s) => s.clone(),
            CellValue::Bool(b) => if *b { "True" } else { "False" }.to_string(),
            CellValue::DateTime(s) => s.clone(),
            CellValue::Error(e) => e.clone(),
            CellValue::Empty => String::new(),
        }
    }

    /// 前後の空白を除いた表示用文字列
    pub fn trimmed(&self) -> String {
        match self {
            CellValue::String(s) => s.trim().to_string(),
            other => other.as_raw_string().trim().to_string(),
        }
    }

    /// 偽とみなす値（空、0、false）を空文字列とした表示用文字列
    pub fn truthy_trimmed(&self) -> String {
        match self {
            CellValue::Number(n) if *n == 0.0 => String::new(),
            CellValue::Bool(false) => String::new(),
            other => other.trimmed(),
        }
    }

    /// JSONのスカラー値に変換
    ///
    /// 空セルは`Null`になります。
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;

        match self {
            CellValue::Number(n) => {
                if is_whole(*n) {
                    Value::from(*n as i64)
                } else {
                    serde_json::Number::from_f64(*n)
                        .map(Value::Number)
                        .unwrap_or(Value::Null)
                }
            }
            CellValue::String(s) => Value::String(s.clone()),
            CellValue::Bool(b) => Value::Bool(*b),
            CellValue::DateTime(s) | CellValue::Error(s) => Value::String(s.clone()),
            CellValue::Empty => Value::Null,
        }
    }
}

fn is_whole(n: f64) -> bool {
    n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15
}

fn format_number(n: f64) -> String {
    if is_whole(n) {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// 列（0始まりのインデックス）
///
/// 設定ファイルでは列記号（`"A"`, `"M"`, `"AA"`）で記述します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Column(u32);

impl Column {
    /// 0始まりのインデックスから生成（0 -> A）
    pub const fn from_index(index: u32) -> Self {
        Self(index)
    }

    /// 0始まりのインデックス
    pub fn index(&self) -> u32 {
        self.0
    }

    /// 列記号から生成（"A" -> 0, "Z" -> 25, "AA" -> 26）
    ///
    /// 大文字・小文字は区別しません。
    pub fn from_letters(letters: &str) -> Result<Self, String> {
        let letters = letters.trim();
        if letters.is_empty() {
            return Err("Empty column letters".to_string());
        }

        let mut index: u32 = 0;
        for ch in letters.chars() {
            if !ch.is_ascii_alphabetic() {
                return Err(format!("Invalid column letters: '{}'", letters));
            }
            let digit = (ch.to_ascii_uppercase() as u8 - b'A') as u32 + 1;
            index = index
                .checked_mul(26)
                .and_then(|i| i.checked_add(digit))
                .ok_or_else(|| format!("Column out of range: '{}'", letters))?;
        }

        // Excelの最大列はXFD（16384列）
        if index > 16_384 {
            return Err(format!("Column out of range: '{}'", letters));
        }

        Ok(Self(index - 1))
    }

    /// 列インデックスを文字列に変換（0 -> "A", 25 -> "Z", 26 -> "AA"）
    pub fn letters(&self) -> String {
        let mut col = self.0;
        let mut result = String::new();
        loop {
            let remainder = col % 26;
            result.insert(0, (b'A' + remainder as u8) as char);
            if col < 26 {
                break;
            }
            col = col / 26 - 1;
        }
        result
    }
}

impl TryFrom<String> for Column {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_letters(&value)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.letters())
    }
}
