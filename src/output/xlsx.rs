//! Excel Workbook Sink
//!
//! rust_xlsxwriterを使用して、書式付きの1シートのワークブックを出力します。

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, Worksheet};
use tracing::{debug, info, warn};

use crate::error::GoodsError;
use crate::formatter::{flatten_description, passthrough, unescape_article};
use crate::output::RowSink;
use crate::types::{
    column_index, RequiredField, RowCursor, COLUMNS, DEFAULT_ROW_HEIGHT, HEADER_ROW,
    HEADER_ROW_HEIGHT, MAX_CELL_CHARS,
};

/// Excelワークブックへの出力
///
/// ワークシートはメモリ上に構築され、`finish()`でファイルに保存されます。
pub struct XlsxSink {
    /// 保存前のワークシート（保存後は`None`）
    worksheet: Option<Worksheet>,
    body_format: Format,
    path: PathBuf,
    cursor: RowCursor,
}

impl XlsxSink {
    /// ヘッダー行と列幅を設定したワークシートを生成する
    ///
    /// # 引数
    ///
    /// * `path` - 保存先のファイルパス
    /// * `sheet_name` - シート名
    pub fn new<P: Into<PathBuf>>(path: P, sheet_name: &str) -> Result<Self, GoodsError> {
        let mut worksheet = Worksheet::new();
        worksheet.set_name(sheet_name)?;
        fill_header(&mut worksheet)?;

        // 縦位置は「上揃え」が最終的に有効になる
        let body_format = Format::new()
            .set_text_wrap()
            .set_align(FormatAlign::VerticalJustify)
            .set_align(FormatAlign::Top);

        Ok(Self {
            worksheet: Some(worksheet),
            body_format,
            path: path.into(),
            cursor: RowCursor::new(),
        })
    }

    /// 保存先のファイルパス
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_cell(&mut self, field: RequiredField, mut value: String) -> Result<(), GoodsError> {
        if let Some(len) = truncate_to_cell_limit(&mut value) {
            warn!(
                row = self.cursor.current(),
                column = field.key(),
                chars = len,
                "cell value truncated to {} characters",
                MAX_CELL_CHARS
            );
        }

        let worksheet = self.worksheet.as_mut().ok_or_else(|| {
            GoodsError::Config("workbook has already been saved".to_string())
        })?;
        worksheet.write_string_with_format(
            self.cursor.zero_based(),
            column_index(field),
            value,
            &self.body_format,
        )?;
        Ok(())
    }
}

/// セルの上限を超える文字列を文字境界で切り詰める
///
/// # 戻り値
///
/// 切り詰めた場合は元の文字数、そうでなければ`None`
fn truncate_to_cell_limit(value: &mut String) -> Option<usize> {
    let (cut, _) = value.char_indices().nth(MAX_CELL_CHARS)?;
    let len = value.chars().count();
    value.truncate(cut);
    Some(len)
}

/// ヘッダー行、列幅、行の高さを設定する
fn fill_header(worksheet: &mut Worksheet) -> Result<(), GoodsError> {
    let header_format = Format::new()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_background_color(Color::Yellow)
        .set_bold();

    let header_row = HEADER_ROW - 1;
    for column in COLUMNS.iter() {
        let col = column_index(column.field);
        worksheet.write_string_with_format(header_row, col, column.header, &header_format)?;
        worksheet.set_column_width(col, column.width)?;
    }

    worksheet.set_row_height(header_row, HEADER_ROW_HEIGHT)?;
    worksheet.set_row_format(header_row, &header_format)?;
    worksheet.set_default_row_height(DEFAULT_ROW_HEIGHT);
    Ok(())
}

impl RowSink for XlsxSink {
    fn convert_article(&mut self, text: Option<&str>) -> Result<(), GoodsError> {
        self.write_cell(RequiredField::Article, unescape_article(text))
    }

    fn convert_description(&mut self, text: Option<&str>) -> Result<(), GoodsError> {
        self.write_cell(RequiredField::Description, flatten_description(text))
    }

    fn convert_price(&mut self, text: Option<&str>) -> Result<(), GoodsError> {
        self.write_cell(RequiredField::Price, passthrough(text))
    }

    fn convert_price_retail(&mut self, text: Option<&str>) -> Result<(), GoodsError> {
        self.write_cell(RequiredField::PriceRetail, passthrough(text))
    }

    fn convert_sizes(&mut self, text: Option<&str>) -> Result<(), GoodsError> {
        self.write_cell(RequiredField::Sizes, passthrough(text))
    }

    fn increment_row(&mut self) -> Result<(), GoodsError> {
        self.cursor.advance();
        Ok(())
    }

    fn current_row(&self) -> u32 {
        self.cursor.current()
    }

    fn finish(&mut self) -> Result<(), GoodsError> {
        let Some(worksheet) = self.worksheet.take() else {
            debug!(path = %self.path.display(), "workbook already saved");
            return Ok(());
        };

        let mut workbook = Workbook::new();
        workbook.push_worksheet(worksheet);
        workbook.save(&self.path)?;

        info!(
            path = %self.path.display(),
            rows = self.cursor.rows_written(),
            "workbook saved"
        );
        Ok(())
    }
}
