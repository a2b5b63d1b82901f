//! Builder Module
//!
//! Fluent Builder APIを提供し、`Converter`インスタンスを段階的に構築する。

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tracing::{debug, info, info_span, warn};

use crate::api::{MissingFieldPolicy, OutputFormat};
use crate::cleanup::cleanup_stale_outputs;
use crate::error::GoodsError;
use crate::output::{CsvSink, JsonSink, RowSink, XlsxSink};
use crate::parser::CatalogReader;
use crate::security::SecurityConfig;
use crate::types::{Record, RequiredField};

/// シート名に使用できない文字
const INVALID_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// シート名の最大文字数
const MAX_SHEET_NAME_LEN: usize = 31;

/// 変換処理の設定を保持する内部構造体
#[derive(Debug, Clone)]
pub(crate) struct ConversionConfig {
    /// 出力ファイルを作成するディレクトリ
    pub output_dir: PathBuf,

    /// 出力ファイル名の接頭辞（`<prefix>.<ext>`）
    pub output_prefix: String,

    /// 出力フォーマット
    pub output_format: OutputFormat,

    /// シート名
    pub sheet_name: String,

    /// 必須フィールドが欠けたレコードの扱い
    pub missing_field_policy: MissingFieldPolicy,

    /// 進捗ログの分割数
    pub progress_buckets: u32,

    /// リソース制限
    pub security: SecurityConfig,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            output_prefix: "output_".to_string(),
            output_format: OutputFormat::Xlsx,
            sheet_name: "goods".to_string(),
            missing_field_policy: MissingFieldPolicy::Abort,
            progress_buckets: 20,
            security: SecurityConfig::default(),
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use goods2xlsx::{ConverterBuilder, MissingFieldPolicy};
///
/// # fn main() -> Result<(), goods2xlsx::GoodsError> {
/// let converter = ConverterBuilder::new()
///     .with_output_dir("reports")
///     .with_missing_field_policy(MissingFieldPolicy::Skip)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConverterBuilder {
    /// 内部設定（構築中）
    config: ConversionConfig,
}

impl ConverterBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - 出力先: カレントディレクトリの`output_.xlsx`
    /// - シート名: `goods`
    /// - 必須フィールド欠落時: 中断
    /// - 進捗ログ: 20分割
    pub fn new() -> Self {
        Self {
            config: ConversionConfig::default(),
        }
    }

    /// 出力ファイルを作成するディレクトリを指定する
    ///
    /// 古い出力ファイルの削除もこのディレクトリが対象になります。
    pub fn with_output_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// 出力ファイル名の接頭辞を指定する
    ///
    /// 出力ファイル名は`<prefix>.<ext>`、削除対象のパターンは`<prefix>*.<ext>`になります。
    ///
    /// # 制約
    ///
    /// * 空文字列、パス区切り文字、globのメタ文字（`*?[]`）は使用できない
    pub fn with_output_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.output_prefix = prefix.into();
        self
    }

    /// 出力フォーマットを指定する
    ///
    /// ```rust,no_run
    /// use goods2xlsx::{ConverterBuilder, OutputFormat};
    ///
    /// // output_.csv に出力
    /// let builder = ConverterBuilder::new()
    ///     .with_output_format(OutputFormat::Csv);
    /// ```
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.config.output_format = format;
        self
    }

    /// シート名を指定する
    ///
    /// # 制約
    ///
    /// * 1〜31文字で、`[]:*?/\`を含まず、アポストロフィで始まったり終わったりしない
    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.config.sheet_name = name.into();
        self
    }

    /// 必須フィールドが欠けたレコードの扱いを指定する
    pub fn with_missing_field_policy(mut self, policy: MissingFieldPolicy) -> Self {
        self.config.missing_field_policy = policy;
        self
    }

    /// 進捗ログの分割数を指定する（例: 20なら5%ごと）
    pub fn with_progress_buckets(mut self, buckets: u32) -> Self {
        self.config.progress_buckets = buckets;
        self
    }

    /// リソース制限を指定する
    pub fn with_security_config(mut self, security: SecurityConfig) -> Self {
        self.config.security = security;
        self
    }

    /// 設定を検証し、`Converter`インスタンスを生成する
    ///
    /// # 戻り値
    ///
    /// * `Ok(Converter)`: 設定が有効な場合
    /// * `Err(GoodsError::Config)`: 設定が無効な場合
    pub fn build(self) -> Result<Converter, GoodsError> {
        // 1. 出力ファイル名の接頭辞
        let prefix = &self.config.output_prefix;
        if prefix.is_empty() {
            return Err(GoodsError::Config(
                "Output prefix must not be empty".to_string(),
            ));
        }
        if prefix
            .chars()
            .any(|c| matches!(c, '/' | '\\' | '*' | '?' | '[' | ']'))
        {
            return Err(GoodsError::Config(format!(
                "Output prefix '{}' must not contain path separators or glob characters",
                prefix
            )));
        }

        // 2. シート名
        let sheet = &self.config.sheet_name;
        let sheet_len = sheet.chars().count();
        if sheet_len == 0 || sheet_len > MAX_SHEET_NAME_LEN {
            return Err(GoodsError::Config(format!(
                "Sheet name must be 1-{} characters long, got {}",
                MAX_SHEET_NAME_LEN, sheet_len
            )));
        }
        if sheet.contains(INVALID_SHEET_CHARS) || sheet.starts_with('\'') || sheet.ends_with('\'') {
            return Err(GoodsError::Config(format!(
                "Invalid sheet name: '{}'",
                sheet
            )));
        }

        // 3. 進捗ログとリソース制限
        if self.config.progress_buckets == 0 {
            return Err(GoodsError::Config(
                "Progress buckets must be greater than zero".to_string(),
            ));
        }
        if self.config.security.max_input_file_size == 0 || self.config.security.max_records == 0 {
            return Err(GoodsError::Config(
                "Security limits must be greater than zero".to_string(),
            ));
        }

        Ok(Converter {
            config: self.config,
        })
    }
}

/// 変換結果の集計
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionReport {
    /// `database`要素の`name`属性
    pub database: Option<String>,
    /// 書き込んだレコード数
    pub records_written: usize,
    /// スキップしたレコード数（`MissingFieldPolicy::Skip`の場合のみ）
    pub records_skipped: usize,
}

/// 進捗ログの区切りを判定する
///
/// 総数を`buckets`個に分割し、区切りをまたいだときだけ通知します。
/// 総数が分割数より少なくても、総数が0でも動作します。
#[derive(Debug)]
pub(crate) struct ProgressTracker {
    total: usize,
    buckets: usize,
    reported: usize,
}

impl ProgressTracker {
    pub fn new(total: usize, buckets: usize) -> Self {
        Self {
            total,
            buckets: buckets.max(1),
            reported: 0,
        }
    }

    /// `processed`件処理した時点で新しい区切りに達していれば、その割合（%）を返す
    pub fn advance(&mut self, processed: usize) -> Option<usize> {
        if self.total == 0 {
            return None;
        }
        let bucket = processed.min(self.total) * self.buckets / self.total;
        if bucket > self.reported {
            self.reported = bucket;
            Some(bucket * 100 / self.buckets)
        } else {
            None
        }
    }
}

/// 変換処理のファサード
///
/// カタログダンプを読み込み、設定された出力先に1レコード1行で書き込みます。
///
/// # 使用例
///
/// ```rust,no_run
/// use goods2xlsx::ConverterBuilder;
///
/// # fn main() -> Result<(), goods2xlsx::GoodsError> {
/// let converter = ConverterBuilder::new().build()?;
/// converter.clean_stale_outputs()?;
/// let report = converter.convert_file("gloowi_goods.xml")?;
/// println!("{} rows -> {}", report.records_written, converter.output_path().display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Converter {
    /// 変換設定
    config: ConversionConfig,
}

impl Converter {
    /// 出力ファイルのパス
    pub fn output_path(&self) -> PathBuf {
        self.config.output_dir.join(format!(
            "{}.{}",
            self.config.output_prefix,
            self.config.output_format.extension()
        ))
    }

    /// 古い出力ファイルを探すためのglobパターン
    pub fn cleanup_pattern(&self) -> String {
        format!(
            "{}*.{}",
            self.config.output_prefix,
            self.config.output_format.extension()
        )
    }

    /// 出力ディレクトリ内の古い出力ファイルを削除する
    pub fn clean_stale_outputs(&self) -> Result<Vec<PathBuf>, GoodsError> {
        cleanup_stale_outputs(&self.config.output_dir, &self.cleanup_pattern())
    }

    /// カタログファイルを変換する
    ///
    /// # 処理フロー
    ///
    /// 1. 出力先の生成（ヘッダー行の設定）
    /// 2. カタログの読み込みと検証
    /// 3. レコードごとに1行を書き込む
    /// 4. 出力を確定する（2〜3でエラーが発生した場合も必ず実行）
    ///
    /// # 戻り値
    ///
    /// * `Ok(ConversionReport)` - 変換に成功した場合
    /// * `Err(GoodsError)` - 最初に発生したエラー。出力ファイルは保存済み
    pub fn convert_file<P: AsRef<Path>>(&self, input: P) -> Result<ConversionReport, GoodsError> {
        let input = input.as_ref();
        debug!(input = %input.display(), "converting catalog file");
        self.convert_with(|| CatalogReader::open(input, &self.config.security))
    }

    /// メモリ上のカタログを変換する
    pub fn convert_bytes(&self, content: Vec<u8>) -> Result<ConversionReport, GoodsError> {
        self.convert_with(|| CatalogReader::from_bytes_with(content, &self.config.security))
    }

    fn convert_with<F>(&self, open: F) -> Result<ConversionReport, GoodsError>
    where
        F: FnOnce() -> Result<CatalogReader, GoodsError>,
    {
        let output_path = self.output_path();
        let mut sink = self.create_sink(&output_path)?;

        let outcome = open().and_then(|reader| self.write_records(&reader, sink.as_mut()));
        let finished = sink.finish();

        match (outcome, finished) {
            (Ok(report), Ok(())) => Ok(report),
            (Err(e), Ok(())) | (Ok(_), Err(e)) => Err(e),
            (Err(e), Err(finish_err)) => {
                warn!(error = %finish_err, "failed to finalize output after an earlier error");
                Err(e)
            }
        }
    }

    fn create_sink(&self, path: &Path) -> Result<Box<dyn RowSink>, GoodsError> {
        let sink: Box<dyn RowSink> = match self.config.output_format {
            OutputFormat::Xlsx => Box::new(XlsxSink::new(path, &self.config.sheet_name)?),
            OutputFormat::Csv => Box::new(CsvSink::new(BufWriter::new(File::create(path)?))?),
            OutputFormat::Json => Box::new(JsonSink::new(
                BufWriter::new(File::create(path)?),
                &self.config.sheet_name,
            )),
        };
        Ok(sink)
    }

    /// カタログのレコードを出力先に書き込む
    ///
    /// 出力先の`finish()`は呼び出しません。
    pub fn write_records<S: RowSink + ?Sized>(
        &self,
        reader: &CatalogReader,
        sink: &mut S,
    ) -> Result<ConversionReport, GoodsError> {
        let total = reader.record_count();
        let mut progress = ProgressTracker::new(total, self.config.progress_buckets as usize);
        let mut report = ConversionReport {
            database: reader.database_name().map(str::to_string),
            ..Default::default()
        };

        for (processed, record) in reader.records().enumerate() {
            let record = record?;
            let missing = record.missing_fields();

            match missing.first() {
                None => {
                    write_record(sink, &record)?;
                    report.records_written += 1;
                }
                Some(field) => match self.config.missing_field_policy {
                    MissingFieldPolicy::Abort => {
                        return Err(GoodsError::MissingField {
                            record: record.index(),
                            field: field.key(),
                        });
                    }
                    MissingFieldPolicy::Skip => {
                        let keys: Vec<&str> = missing.iter().map(|f| f.key()).collect();
                        warn!(record = record.index(), missing = ?keys, "record skipped");
                        report.records_skipped += 1;
                    }
                },
            }

            if let Some(percent) = progress.advance(processed + 1) {
                info!(percent, processed = processed + 1, total, "progress");
            }
        }

        info!(
            written = report.records_written,
            skipped = report.records_skipped,
            "catalog converted"
        );
        Ok(report)
    }
}

/// 1レコードを出力列の順序で書き込み、行を進める
fn write_record<S: RowSink + ?Sized>(sink: &mut S, record: &Record) -> Result<(), GoodsError> {
    // 出力先のログにレコード番号を付与する
    let _span = info_span!("record", index = record.index()).entered();
    sink.convert_article(record.field(RequiredField::Article)?)?;
    sink.convert_description(record.field(RequiredField::Description)?)?;
    sink.convert_price(record.field(RequiredField::Price)?)?;
    sink.convert_price_retail(record.field(RequiredField::PriceRetail)?)?;
    sink.convert_sizes(record.field(RequiredField::Sizes)?)?;
    sink.increment_row()?;
    debug!(record = record.index(), row = sink.current_row() - 1, "record written");
    Ok(())
}
