//! Public API Types
//!
//! 公開APIで使用する列挙型を定義するモジュール。

/// 必須フィールドが欠けたレコードの扱い
///
/// カタログの各レコードには`name`、`content`、`price`、`price_retail`、
/// `har_size`の5つのカラムが必要です。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum MissingFieldPolicy {
    /// 変換全体を中断する（デフォルト）
    ///
    /// `GoodsError::MissingField`を返します。該当レコードのセルは1つも
    /// 書き込まれませんが、それ以前の行と出力ファイル自体は保存されます。
    #[default]
    Abort,

    /// レコードをスキップして警告をログに出力する
    ///
    /// 行カーソルは進みません。スキップ数は`ConversionReport`に記録されます。
    Skip,
}

/// 出力フォーマット
///
/// 出力ファイルの形式を指定します。ファイル名の拡張子もこれで決まります。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum OutputFormat {
    /// Excelワークブック（デフォルト）
    ///
    /// ヘッダー書式、列幅、折り返し書式付きの1シートのワークブックです。
    #[default]
    Xlsx,

    /// CSV形式
    ///
    /// ヘッダー行と、レコードごとに1行を出力します。
    ///
    /// ```csv
    /// Артикул,Описание,Цена,Розничная цена,Размеры
    /// "Shirt ""Oxford""","Cotton",100,150,M
    /// ```
    Csv,

    /// JSON形式
    ///
    /// ```json
    /// {
    ///   "sheet": "goods",
    ///   "columns": ["Артикул", "Описание", "Цена", "Розничная цена", "Размеры"],
    ///   "rows": [
    ///     {"row": 3, "article": "A-1", "description": "...", "price": "100",
    ///      "price_retail": "150", "sizes": "M"}
    ///   ]
    /// }
    /// ```
    Json,
}

impl OutputFormat {
    /// 出力ファイルの拡張子
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}
