//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。
//! 各メッセージは失敗した処理段階（スキーマ確認、フィールド抽出、書き込み）を示す。

use thiserror::Error;

/// goods2xlsxクレート全体で使用するエラー型
///
/// カタログXMLの読み込み、レコード抽出、出力ファイルの書き込み中に発生する
/// すべてのエラーを統一的に扱うために使用されます。
///
/// # 使用例
///
/// ```rust,no_run
/// use goods2xlsx::GoodsError;
/// use std::fs::File;
///
/// fn open_dump(path: &str) -> Result<(), GoodsError> {
///     let _file = File::open(path)?;  // Ioエラーが自動的に変換される
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum GoodsError {
    /// I/O操作中に発生したエラー
    ///
    /// 入力ファイルの読み込み、古い出力ファイルの削除、出力ファイルの書き込みなど。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// XMLの解析中に発生したエラー（quick-xml由来）
    #[error("Failed to parse catalog XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// XMLの構造が壊れている場合のエラー（閉じられていない要素など）
    #[error("Malformed catalog XML: {0}")]
    Malformed(String),

    /// UTF-8文字列の変換エラー
    ///
    /// CDATAセクションなど、バイト列を直接文字列化する箇所で発生します。
    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// 入力がカタログダンプの形をしていないエラー
    ///
    /// `database`要素が見つからない場合に発生します。
    #[error("Schema check failed: {0}")]
    Schema(String),

    /// レコードに必須フィールドが存在しないエラー
    ///
    /// `record`は0始まりのレコード番号（文書順）です。
    #[error("Field extraction failed: record #{record} has no '{field}' column")]
    MissingField {
        /// レコード番号（0始まり）
        record: usize,
        /// 見つからなかったフィールド名
        field: &'static str,
    },

    /// ワークブックの書き込みエラー（rust_xlsxwriter由来）
    #[error("Workbook write failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// JSON出力のシリアライズエラー
    #[error("JSON write failed: {0}")]
    Json(#[from] serde_json::Error),

    /// 古い出力ファイルを探すためのglobパターンが不正
    #[error("Invalid output pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// 設定の検証に失敗したエラー
    ///
    /// `ConverterBuilder::build()`時に無効な設定が検出された場合に発生します。
    ///
    /// ```rust,no_run
    /// use goods2xlsx::{ConverterBuilder, GoodsError};
    ///
    /// let result = ConverterBuilder::new().with_sheet_name("").build();
    ///
    /// if let Err(GoodsError::Config(msg)) = result {
    ///     println!("設定エラー: {}", msg);
    /// }
    /// ```
    #[error("Configuration error: {0}")]
    Config(String),

    /// セキュリティ制限に違反したエラー
    ///
    /// 入力ファイルサイズやレコード数の上限を超えた場合に発生します。
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}
