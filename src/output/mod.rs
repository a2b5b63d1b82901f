//! Output Sink Module
//!
//! レコードを1行ずつ書き込む出力先（シンク）の抽象化を提供するモジュール。

mod formatters;
mod xlsx;

pub use formatters::{CsvSink, JsonSink};
pub use xlsx::XlsxSink;

use crate::error::GoodsError;

/// 行単位の出力先
///
/// 1レコードにつき、5つの`convert_*`を出力列の順序で呼び出し、
/// 最後に`increment_row()`をちょうど1回呼び出します。
/// 値が`None`の場合は空文字列として書き込みます。
pub trait RowSink {
    /// 商品コードを書き込む（`&#34;`をダブルクォートに復元）
    fn convert_article(&mut self, text: Option<&str>) -> Result<(), GoodsError>;

    /// HTML形式の商品説明をプレーンテキスト化して書き込む
    fn convert_description(&mut self, text: Option<&str>) -> Result<(), GoodsError>;

    /// 卸売価格をそのまま書き込む
    fn convert_price(&mut self, text: Option<&str>) -> Result<(), GoodsError>;

    /// 小売価格をそのまま書き込む
    fn convert_price_retail(&mut self, text: Option<&str>) -> Result<(), GoodsError>;

    /// サイズをそのまま書き込む
    fn convert_sizes(&mut self, text: Option<&str>) -> Result<(), GoodsError>;

    /// 行カーソルを1つ進める
    fn increment_row(&mut self) -> Result<(), GoodsError>;

    /// 次のレコードが書き込まれる行番号（1始まり）
    fn current_row(&self) -> u32;

    /// 出力を確定して閉じる
    ///
    /// 2回目以降の呼び出しは何もしません。
    fn finish(&mut self) -> Result<(), GoodsError>;
}
