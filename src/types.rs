//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

use std::collections::HashMap;

use crate::error::GoodsError;

/// ヘッダー行（1始まり）
pub(crate) const HEADER_ROW: u32 = 1;

/// 最初のデータ行（1始まり）。2行目は空行として予約されている
pub(crate) const FIRST_DATA_ROW: u32 = 3;

/// ヘッダー行の高さ
pub(crate) const HEADER_ROW_HEIGHT: f64 = 25.0;

/// データ行のデフォルトの高さ
pub(crate) const DEFAULT_ROW_HEIGHT: f64 = 35.0;

/// Excelのセルに格納できる最大文字数
pub(crate) const MAX_CELL_CHARS: usize = 32_767;

/// レコードに必須のフィールド
///
/// 並び順は出力列の順序（A〜E）と一致します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredField {
    /// 商品コード（カラム名 `name`）
    Article,
    /// HTML形式の商品説明（カラム名 `content`）
    Description,
    /// 卸売価格（カラム名 `price`）
    Price,
    /// 小売価格（カラム名 `price_retail`）
    PriceRetail,
    /// サイズ（カラム名 `har_size`）
    Sizes,
}

impl RequiredField {
    /// 出力列の順序で並べたすべてのフィールド
    pub const ALL: [RequiredField; 5] = [
        RequiredField::Article,
        RequiredField::Description,
        RequiredField::Price,
        RequiredField::PriceRetail,
        RequiredField::Sizes,
    ];

    /// ダンプ内のカラム名
    pub fn key(&self) -> &'static str {
        match self {
            RequiredField::Article => "name",
            RequiredField::Description => "content",
            RequiredField::Price => "price",
            RequiredField::PriceRetail => "price_retail",
            RequiredField::Sizes => "har_size",
        }
    }
}

/// 出力列の定義
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ColumnSpec {
    pub header: &'static str,
    pub width: f64,
    pub field: RequiredField,
}

/// 出力列（A〜E）
pub(crate) const COLUMNS: [ColumnSpec; 5] = [
    ColumnSpec {
        header: "Артикул",
        width: 50.0,
        field: RequiredField::Article,
    },
    ColumnSpec {
        header: "Описание",
        width: 80.0,
        field: RequiredField::Description,
    },
    ColumnSpec {
        header: "Цена",
        width: 20.0,
        field: RequiredField::Price,
    },
    ColumnSpec {
        header: "Розничная цена",
        width: 20.0,
        field: RequiredField::PriceRetail,
    },
    ColumnSpec {
        header: "Размеры",
        width: 20.0,
        field: RequiredField::Sizes,
    },
];

/// 出力列のインデックス（0始まり）
pub(crate) fn column_index(field: RequiredField) -> u16 {
    match field {
        RequiredField::Article => 0,
        RequiredField::Description => 1,
        RequiredField::Price => 2,
        RequiredField::PriceRetail => 3,
        RequiredField::Sizes => 4,
    }
}

/// カタログの1レコード（`table`要素1つ分）
///
/// カラム名からテキストへのマッピングです。値が`None`の場合は、
/// カラム要素は存在するがテキストを持たないことを示します。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    /// 文書内でのレコード番号（0始まり）
    index: usize,
    fields: HashMap<String, Option<String>>,
}

impl Record {
    /// 空のレコードを生成
    pub fn new(index: usize) -> Self {
        Self {
            index,
            fields: HashMap::new(),
        }
    }

    /// カラム名と値のペアからレコードを生成
    ///
    /// 同じカラム名が複数ある場合は後のものが優先されます。
    pub fn from_pairs<I, K>(index: usize, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<String>)>,
        K: Into<String>,
    {
        let mut record = Self::new(index);
        for (key, value) in pairs {
            record.insert(key, value);
        }
        record
    }

    pub(crate) fn insert(&mut self, key: impl Into<String>, value: Option<String>) {
        self.fields.insert(key.into(), value);
    }

    /// 文書内でのレコード番号（0始まり）
    pub fn index(&self) -> usize {
        self.index
    }

    /// カラム数
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// カラムを1つも持たないかどうか
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 任意のカラムを取得
    ///
    /// * `None` - カラムが存在しない
    /// * `Some(None)` - カラムは存在するが値がない
    pub fn get(&self, key: &str) -> Option<Option<&str>> {
        self.fields.get(key).map(|value| value.as_deref())
    }

    /// 必須フィールドの値を取得
    ///
    /// # 戻り値
    ///
    /// * `Ok(Some(text))` / `Ok(None)` - カラムが存在する場合
    /// * `Err(GoodsError::MissingField)` - カラムが存在しない場合
    pub fn field(&self, field: RequiredField) -> Result<Option<&str>, GoodsError> {
        self.get(field.key()).ok_or(GoodsError::MissingField {
            record: self.index,
            field: field.key(),
        })
    }

    /// 存在しない必須フィールドの一覧（出力列の順序）
    pub fn missing_fields(&self) -> Vec<RequiredField> {
        RequiredField::ALL
            .into_iter()
            .filter(|field| !self.fields.contains_key(field.key()))
            .collect()
    }
}

/// 行カーソル
///
/// 次に書き込む行番号（1始まり）を保持します。3行目から始まり、
/// レコードごとにちょうど1つずつ増加します。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowCursor {
    row: u32,
}

impl Default for RowCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl RowCursor {
    /// 最初のデータ行を指すカーソルを生成
    pub fn new() -> Self {
        Self {
            row: FIRST_DATA_ROW,
        }
    }

    /// 現在の行番号（1始まり）
    pub fn current(&self) -> u32 {
        self.row
    }

    /// 現在の行番号（0始まり、rust_xlsxwriter用）
    pub(crate) fn zero_based(&self) -> u32 {
        self.row - 1
    }

    /// これまでに書き込んだレコード数
    pub fn rows_written(&self) -> u32 {
        self.row - FIRST_DATA_ROW
    }

    /// 次の行へ進める
    pub fn advance(&mut self) {
        self.row += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_record() -> Record {
        Record::from_pairs(
            0,
            [
                ("name", Some("A-1".to_string())),
                ("content", None),
                ("price", Some("100".to_string())),
                ("price_retail", Some("150".to_string())),
                ("har_size", Some("M".to_string())),
            ],
        )
    }

    #[test]
    fn test_required_field_keys() {
        let keys: Vec<&str> = RequiredField::ALL.iter().map(|f| f.key()).collect();
        assert_eq!(keys, ["name", "content", "price", "price_retail", "har_size"]);
    }

    #[test]
    fn test_columns_follow_field_order() {
        for (idx, column) in COLUMNS.iter().enumerate() {
            assert_eq!(column_index(column.field) as usize, idx);
        }
        assert_eq!(COLUMNS[1].width, 80.0);
        assert_eq!(COLUMNS[0].width, 50.0);
    }

    #[test]
    fn test_record_field_present_and_absent_value() {
        let record = full_record();
        assert_eq!(record.field(RequiredField::Article).unwrap(), Some("A-1"));
        assert_eq!(record.field(RequiredField::Description).unwrap(), None);
        assert!(record.missing_fields().is_empty());
    }

    #[test]
    fn test_record_missing_field() {
        let record = Record::from_pairs(7, [("name", Some("A-1".to_string()))]);
        match record.field(RequiredField::Price) {
            Err(GoodsError::MissingField { record, field }) => {
                assert_eq!(record, 7);
                assert_eq!(field, "price");
            }
            other => panic!("Expected MissingField error, got {:?}", other),
        }
        assert_eq!(
            record.missing_fields(),
            vec![
                RequiredField::Description,
                RequiredField::Price,
                RequiredField::PriceRetail,
                RequiredField::Sizes,
            ]
        );
    }

    #[test]
    fn test_record_duplicate_key_last_wins() {
        let record = Record::from_pairs(
            0,
            [("price", Some("1".to_string())), ("price", Some("2".to_string()))],
        );
        assert_eq!(record.len(), 1);
        assert_eq!(record.get("price"), Some(Some("2")));
    }

    #[test]
    fn test_row_cursor_starts_at_third_row() {
        let cursor = RowCursor::new();
        assert_eq!(cursor.current(), 3);
        assert_eq!(cursor.zero_based(), 2);
        assert_eq!(cursor.rows_written(), 0);
    }

    // プロパティベーステスト: 行カーソルの単調性
    #[allow(unused_doc_comments)]
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_cursor_equals_three_plus_n(n in 0u32..5000) {
                let mut cursor = RowCursor::new();
                let mut previous = cursor.current();
                for _ in 0..n {
                    cursor.advance();
                    prop_assert_eq!(cursor.current(), previous + 1);
                    previous = cursor.current();
                }
                prop_assert_eq!(cursor.current(), 3 + n);
                prop_assert_eq!(cursor.rows_written(), n);
            }
        }
    }
}
