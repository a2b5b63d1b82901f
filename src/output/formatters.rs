//! Text Sinks Implementation
//!
//! ワークブック以外の出力先（CSV、JSON）の実装を提供するモジュール。

use std::io::Write;

use serde::Serialize;

use crate::error::GoodsError;
use crate::formatter::{flatten_description, passthrough, unescape_article};
use crate::output::RowSink;
use crate::types::{column_index, RequiredField, RowCursor, COLUMNS};

fn already_finished() -> GoodsError {
    GoodsError::Config("output has already been finished".to_string())
}

/// CSV形式の出力先
///
/// 生成時にヘッダー行を書き込み、`increment_row()`ごとに1行を書き込みます。
pub struct CsvSink<W: Write> {
    writer: W,
    pending: [String; 5],
    cursor: RowCursor,
    finished: bool,
}

impl<W: Write> CsvSink<W> {
    /// ヘッダー行を書き込んでシンクを生成する
    pub fn new(mut writer: W) -> Result<Self, GoodsError> {
        let header: Vec<String> = COLUMNS.iter().map(|c| escape_csv(c.header)).collect();
        writeln!(writer, "{}", header.join(","))?;

        Ok(Self {
            writer,
            pending: Default::default(),
            cursor: RowCursor::new(),
            finished: false,
        })
    }

    /// 内部のライターを取り出す
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn set(&mut self, field: RequiredField, value: String) -> Result<(), GoodsError> {
        if self.finished {
            return Err(already_finished());
        }
        self.pending[column_index(field) as usize] = value;
        Ok(())
    }
}

impl<W: Write> RowSink for CsvSink<W> {
    fn convert_article(&mut self, text: Option<&str>) -> Result<(), GoodsError> {
        self.set(RequiredField::Article, unescape_article(text))
    }

    fn convert_description(&mut self, text: Option<&str>) -> Result<(), GoodsError> {
        self.set(RequiredField::Description, flatten_description(text))
    }

    fn convert_price(&mut self, text: Option<&str>) -> Result<(), GoodsError> {
        self.set(RequiredField::Price, passthrough(text))
    }

    fn convert_price_retail(&mut self, text: Option<&str>) -> Result<(), GoodsError> {
        self.set(RequiredField::PriceRetail, passthrough(text))
    }

    fn convert_sizes(&mut self, text: Option<&str>) -> Result<(), GoodsError> {
        self.set(RequiredField::Sizes, passthrough(text))
    }

    fn increment_row(&mut self) -> Result<(), GoodsError> {
        if self.finished {
            return Err(already_finished());
        }
        let line: Vec<String> = self
            .pending
            .iter_mut()
            .map(|cell| escape_csv(&std::mem::take(cell)))
            .collect();
        writeln!(self.writer, "{}", line.join(","))?;
        self.cursor.advance();
        Ok(())
    }

    fn current_row(&self) -> u32 {
        self.cursor.current()
    }

    fn finish(&mut self) -> Result<(), GoodsError> {
        if !self.finished {
            self.writer.flush()?;
            self.finished = true;
        }
        Ok(())
    }
}

/// JSON出力の1行
#[derive(Debug, Clone, Default, Serialize)]
struct JsonRow {
    row: u32,
    article: String,
    description: String,
    price: String,
    price_retail: String,
    sizes: String,
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    sheet: &'a str,
    columns: Vec<&'static str>,
    rows: &'a [JsonRow],
}

/// JSON形式の出力先
///
/// 行をメモリに蓄積し、`finish()`でまとめて書き込みます。
pub struct JsonSink<W: Write> {
    writer: W,
    sheet_name: String,
    rows: Vec<JsonRow>,
    pending: JsonRow,
    cursor: RowCursor,
    finished: bool,
}

impl<W: Write> JsonSink<W> {
    pub fn new(writer: W, sheet_name: &str) -> Self {
        Self {
            writer,
            sheet_name: sheet_name.to_string(),
            rows: Vec::new(),
            pending: JsonRow::default(),
            cursor: RowCursor::new(),
            finished: false,
        }
    }

    /// 内部のライターを取り出す
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn pending_mut(&mut self) -> Result<&mut JsonRow, GoodsError> {
        if self.finished {
            return Err(already_finished());
        }
        Ok(&mut self.pending)
    }
}

impl<W: Write> RowSink for JsonSink<W> {
    fn convert_article(&mut self, text: Option<&str>) -> Result<(), GoodsError> {
        self.pending_mut()?.article = unescape_article(text);
        Ok(())
    }

    fn convert_description(&mut self, text: Option<&str>) -> Result<(), GoodsError> {
        self.pending_mut()?.description = flatten_description(text);
        Ok(())
    }

    fn convert_price(&mut self, text: Option<&str>) -> Result<(), GoodsError> {
        self.pending_mut()?.price = passthrough(text);
        Ok(())
    }

    fn convert_price_retail(&mut self, text: Option<&str>) -> Result<(), GoodsError> {
        self.pending_mut()?.price_retail = passthrough(text);
        Ok(())
    }

    fn convert_sizes(&mut self, text: Option<&str>) -> Result<(), GoodsError> {
        self.pending_mut()?.sizes = passthrough(text);
        Ok(())
    }

    fn increment_row(&mut self) -> Result<(), GoodsError> {
        let row = self.cursor.current();
        let mut pending = std::mem::take(self.pending_mut()?);
        pending.row = row;
        self.rows.push(pending);
        self.cursor.advance();
        Ok(())
    }

    fn current_row(&self) -> u32 {
        self.cursor.current()
    }

    fn finish(&mut self) -> Result<(), GoodsError> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;

        let document = JsonDocument {
            sheet: &self.sheet_name,
            columns: COLUMNS.iter().map(|c| c.header).collect(),
            rows: &self.rows,
        };
        serde_json::to_writer_pretty(&mut self.writer, &document)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// CSV文字列をエスケープ
///
/// ダブルクォート、改行、カンマを含む場合はダブルクォートで囲み、
/// 内部のダブルクォートは2つにエスケープします。
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
