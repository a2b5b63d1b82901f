//! Catalog Reader
//!
//! `database` > `table` > `column` 形式のテーブルダンプからレコードを抽出します。

use std::borrow::Cow;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, info, warn};

use crate::error::GoodsError;
use crate::security::SecurityConfig;
use crate::types::Record;

const DATABASE_TAG: &[u8] = b"database";
const TABLE_TAG: &[u8] = b"table";
const COLUMN_TAG: &[u8] = b"column";

/// `database`要素に対する読み取り位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DatabaseState {
    /// まだ`database`要素に到達していない
    Searching,
    /// `database`要素の内側（値は`database`要素自身の深さ）
    Inside(usize),
    /// `database`要素を抜けた
    Done,
}

/// 検証パスの結果
#[derive(Debug)]
struct CatalogSummary {
    database_name: Option<String>,
    record_count: usize,
}

/// カタログリーダー
///
/// 入力文書をメモリに保持し、`records()`でレコードを文書順に取り出します。
///
/// # 使用例
///
/// ```rust
/// use goods2xlsx::CatalogReader;
///
/// # fn main() -> Result<(), goods2xlsx::GoodsError> {
/// let xml = r#"<dump><database name="shop">
///   <table name="goods"><column name="name">A-1</column></table>
/// </database></dump>"#;
/// let reader = CatalogReader::from_bytes(xml.as_bytes().to_vec())?;
/// assert_eq!(reader.database_name(), Some("shop"));
/// assert_eq!(reader.record_count(), 1);
///
/// for record in reader.records() {
///     let record = record?;
///     assert_eq!(record.get("name"), Some(Some("A-1")));
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CatalogReader {
    content: Vec<u8>,
    database_name: Option<String>,
    record_count: usize,
}

impl CatalogReader {
    /// ファイルからカタログを開く
    ///
    /// # 戻り値
    ///
    /// * `Ok(CatalogReader)` - 文書が整形式で、`database`要素を含む場合
    /// * `Err(GoodsError::Schema)` - `database`要素が見つからない場合
    /// * `Err(GoodsError::Xml)` / `Err(GoodsError::Malformed)` - XMLが壊れている場合
    /// * `Err(GoodsError::SecurityViolation)` - サイズやレコード数の上限を超えた場合
    pub fn open<P: AsRef<Path>>(path: P, security: &SecurityConfig) -> Result<Self, GoodsError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        security.check_input_size(file.metadata()?.len())?;

        let mut content = Vec::new();
        // メタデータ取得後にファイルが伸びた場合に備えて読み込み量も制限する
        file.take(security.max_input_file_size.saturating_add(1))
            .read_to_end(&mut content)?;
        security.check_input_size(content.len() as u64)?;

        debug!(path = %path.display(), bytes = content.len(), "catalog loaded");
        Self::from_bytes_with(content, security)
    }

    /// メモリ上のバイト列からカタログを開く（デフォルトの制限を使用）
    pub fn from_bytes(content: Vec<u8>) -> Result<Self, GoodsError> {
        Self::from_bytes_with(content, &SecurityConfig::default())
    }

    /// メモリ上のバイト列からカタログを開く
    pub fn from_bytes_with(content: Vec<u8>, security: &SecurityConfig) -> Result<Self, GoodsError> {
        security.check_input_size(content.len() as u64)?;
        let summary = scan(&content, security)?;

        info!(
            database = summary.database_name.as_deref().unwrap_or(""),
            records = summary.record_count,
            "catalog database found"
        );

        Ok(Self {
            content,
            database_name: summary.database_name,
            record_count: summary.record_count,
        })
    }

    /// `database`要素の`name`属性
    pub fn database_name(&self) -> Option<&str> {
        self.database_name.as_deref()
    }

    /// レコード（`table`要素）の総数
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// レコードを文書順に取り出すイテレーター
    ///
    /// 呼び出すたびに先頭から読み直す新しいイテレーターを返します。
    /// 個々のイテレーターは一度だけ消費できます。
    pub fn records(&self) -> Records<'_> {
        Records {
            reader: Reader::from_reader(self.content.as_slice()),
            state: DatabaseState::Searching,
            depth: 0,
            next_index: 0,
            finished: false,
        }
    }
}

/// 文書全体を走査し、整形式性の確認とレコード数の集計を行う
fn scan(content: &[u8], security: &SecurityConfig) -> Result<CatalogSummary, GoodsError> {
    // カラムの値はそのまま使うため、trim_textは有効にしない
    let mut reader = Reader::from_reader(content);

    let mut depth: usize = 0;
    let mut state = DatabaseState::Searching;
    let mut database_name = None;
    let mut record_count: usize = 0;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                depth += 1;
                match state {
                    DatabaseState::Searching if e.name().as_ref() == DATABASE_TAG => {
                        database_name = name_attribute(&e)?;
                        state = DatabaseState::Inside(depth);
                    }
                    DatabaseState::Inside(db_depth)
                        if depth == db_depth + 1 && e.name().as_ref() == TABLE_TAG =>
                    {
                        record_count += 1;
                        security.check_record_count(record_count)?;
                    }
                    DatabaseState::Inside(_) if e.name().as_ref() == COLUMN_TAG => {
                        name_attribute(&e)?;
                    }
                    _ => {}
                }
            }
            Event::Empty(e) => match state {
                DatabaseState::Searching if e.name().as_ref() == DATABASE_TAG => {
                    database_name = name_attribute(&e)?;
                    state = DatabaseState::Done;
                }
                DatabaseState::Inside(db_depth)
                    if depth == db_depth && e.name().as_ref() == TABLE_TAG =>
                {
                    record_count += 1;
                    security.check_record_count(record_count)?;
                }
                DatabaseState::Inside(_) if e.name().as_ref() == COLUMN_TAG => {
                    name_attribute(&e)?;
                }
                _ => {}
            },
            // レコードの読み取り時と同じデコードをここで済ませておく
            Event::Text(e) if matches!(state, DatabaseState::Inside(_)) => {
                e.unescape()?;
            }
            Event::CData(e) if matches!(state, DatabaseState::Inside(_)) => {
                std::str::from_utf8(&e)?;
            }
            Event::End(e) => {
                if depth == 0 {
                    return Err(GoodsError::Malformed(format!(
                        "unexpected closing tag </{}>",
                        String::from_utf8_lossy(e.name().as_ref())
                    )));
                }
                if state == DatabaseState::Inside(depth) {
                    state = DatabaseState::Done;
                }
                depth -= 1;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(GoodsError::Malformed(format!(
            "document ends inside {} unclosed element(s)",
            depth
        )));
    }

    if state == DatabaseState::Searching {
        return Err(GoodsError::Schema(
            "no <database> element found; the input does not look like a goods table dump"
                .to_string(),
        ));
    }

    Ok(CatalogSummary {
        database_name,
        record_count,
    })
}

/// `name`属性の値を取得する
fn name_attribute(e: &BytesStart<'_>) -> Result<Option<String>, GoodsError> {
    for attr in e.attributes() {
        let attr =
            attr.map_err(|e| GoodsError::Malformed(format!("XML attribute error: {}", e)))?;
        if attr.key.as_ref() == b"name" {
            let raw = std::str::from_utf8(&attr.value)?;
            let value = unescape(raw).map_err(quick_xml::Error::from)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// 読み取り中のカラム
struct OpenColumn {
    name: Option<String>,
    text: Option<String>,
    depth: usize,
}

impl OpenColumn {
    fn push(&mut self, text: Cow<'_, str>) {
        match self.text.as_mut() {
            Some(existing) => existing.push_str(&text),
            None => self.text = Some(text.into_owned()),
        }
    }
}

/// レコードを文書順に取り出すイテレーター
///
/// `CatalogReader::records()`で生成します。文書は検証済みのため、
/// 通常はエラーを返しませんが、読み取りエラーが発生した場合は
/// そのエラーを1度返して終了します。
pub struct Records<'a> {
    reader: Reader<&'a [u8]>,
    state: DatabaseState,
    depth: usize,
    next_index: usize,
    finished: bool,
}

impl<'a> Records<'a> {
    fn next_record(&mut self) -> Result<Option<Record>, GoodsError> {
        loop {
            match self.reader.read_event()? {
                Event::Start(e) => {
                    self.depth += 1;
                    match self.state {
                        DatabaseState::Searching if e.name().as_ref() == DATABASE_TAG => {
                            self.state = DatabaseState::Inside(self.depth);
                        }
                        DatabaseState::Inside(db_depth)
                            if self.depth == db_depth + 1 && e.name().as_ref() == TABLE_TAG =>
                        {
                            return self.read_table().map(Some);
                        }
                        _ => {}
                    }
                }
                Event::Empty(e) => match self.state {
                    DatabaseState::Searching if e.name().as_ref() == DATABASE_TAG => {
                        return Ok(None);
                    }
                    DatabaseState::Inside(db_depth)
                        if self.depth == db_depth && e.name().as_ref() == TABLE_TAG =>
                    {
                        let record = Record::new(self.next_index);
                        self.next_index += 1;
                        return Ok(Some(record));
                    }
                    _ => {}
                },
                Event::End(_) => {
                    if self.state == DatabaseState::Inside(self.depth) {
                        self.state = DatabaseState::Done;
                        return Ok(None);
                    }
                    self.depth = self.depth.saturating_sub(1);
                }
                Event::Eof => return Ok(None),
                _ => {}
            }
        }
    }

    /// 開始タグを読んだ直後の`table`要素から1レコードを読み取る
    fn read_table(&mut self) -> Result<Record, GoodsError> {
        let table_depth = self.depth;
        let mut record = Record::new(self.next_index);
        self.next_index += 1;
        let mut column: Option<OpenColumn> = None;

        loop {
            match self.reader.read_event()? {
                Event::Start(e) => {
                    self.depth += 1;
                    if column.is_none() && e.name().as_ref() == COLUMN_TAG {
                        column = Some(OpenColumn {
                            name: name_attribute(&e)?,
                            text: None,
                            depth: self.depth,
                        });
                    }
                }
                Event::Empty(e) => {
                    if column.is_none() && e.name().as_ref() == COLUMN_TAG {
                        match name_attribute(&e)? {
                            Some(name) => record.insert(name, None),
                            None => warn!(record = record.index(), "column without name attribute ignored"),
                        }
                    }
                }
                Event::Text(e) => {
                    if let Some(open) = column.as_mut().filter(|c| c.depth == self.depth) {
                        open.push(e.unescape()?);
                    }
                }
                Event::CData(e) => {
                    if let Some(open) = column.as_mut().filter(|c| c.depth == self.depth) {
                        open.push(Cow::Borrowed(std::str::from_utf8(&e)?));
                    }
                }
                Event::End(_) => {
                    if column.as_ref().is_some_and(|c| c.depth == self.depth) {
                        if let Some(open) = column.take() {
                            match open.name {
                                Some(name) => record.insert(name, open.text),
                                None => warn!(record = record.index(), "column without name attribute ignored"),
                            }
                        }
                    }
                    if self.depth == table_depth {
                        self.depth -= 1;
                        debug!(record = record.index(), columns = record.len(), "record read");
                        return Ok(record);
                    }
                    self.depth -= 1;
                }
                Event::Eof => {
                    return Err(GoodsError::Malformed(format!(
                        "document ends inside record #{}",
                        record.index()
                    )))
                }
                _ => {}
            }
        }
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = Result<Record, GoodsError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}
