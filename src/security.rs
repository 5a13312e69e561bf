//! Security Module
//!
//! 入力ワークブックに対するセキュリティ制限を定義するモジュール。

use crate::error::ExtractError;

/// セキュリティ設定
///
/// ファイル処理時のセキュリティ制限を定義します。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityConfig {
    /// 入力ファイルの最大サイズ（バイト）
    /// デフォルト: 2GB (2_147_483_648 bytes)
    pub max_input_file_size: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_input_file_size: 2_147_483_648, // 2GB
        }
    }
}

impl SecurityConfig {
    /// デフォルトのセキュリティ設定を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 入力サイズの上限を指定
    pub fn with_max_input_file_size(mut self, bytes: u64) -> Self {
        self.max_input_file_size = bytes;
        self
    }

    /// 読み込んだバイト数を検証
    pub(crate) fn check_input_size(&self, bytes_read: usize) -> Result<(), ExtractError> {
        if bytes_read as u64 > self.max_input_file_size {
            return Err(ExtractError::SecurityViolation(format!(
                "Input file size exceeds maximum: {} bytes (max: {} bytes)",
                bytes_read, self.max_input_file_size
            )));
        }
        Ok(())
    }
}
