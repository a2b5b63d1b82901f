//! Security Module
//!
//! 入力カタログに対するリソース制限を定義するモジュール。
//! quick-xmlは外部実体を解決しないため、XXE攻撃への対策は不要です。

use crate::error::GoodsError;

/// セキュリティ設定
///
/// カタログ処理時のリソース制限を定義します。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityConfig {
    /// 入力ファイルの最大サイズ（バイト）
    /// デフォルト: 256MB (268_435_456 bytes)
    pub max_input_file_size: u64,
    /// 1つのダンプに含まれる最大レコード数
    /// デフォルト: 1_000_000
    pub max_records: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_input_file_size: 268_435_456, // 256MB
            max_records: 1_000_000,
        }
    }
}

impl SecurityConfig {
    /// デフォルトのセキュリティ設定を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 入力サイズの検証
    pub(crate) fn check_input_size(&self, size: u64) -> Result<(), GoodsError> {
        if size > self.max_input_file_size {
            return Err(GoodsError::SecurityViolation(format!(
                "Input file size exceeds maximum: {} bytes (max: {} bytes)",
                size, self.max_input_file_size
            )));
        }
        Ok(())
    }

    /// レコード数の検証
    pub(crate) fn check_record_count(&self, count: usize) -> Result<(), GoodsError> {
        if count > self.max_records {
            return Err(GoodsError::SecurityViolation(format!(
                "Catalog contains too many records (max: {})",
                self.max_records
            )));
        }
        Ok(())
    }
}
