//! goods2xlsx - Convert an XML goods-catalog table dump into an Excel workbook
//!
//! このクレートは、データベースのテーブルダンプ（XML）を読み込み、
//! 商品ごとに1行（商品コード、説明、卸売価格、小売価格、サイズ）の
//! 書式付きワークブックを生成します。
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use goods2xlsx::ConverterBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = ConverterBuilder::new().build()?;
//!
//!     // 前回の output_*.xlsx を削除
//!     for removed in converter.clean_stale_outputs()? {
//!         println!("'{}' removed", removed.display());
//!     }
//!
//!     // output_.xlsx を作成
//!     let report = converter.convert_file("gloowi_goods.xml")?;
//!     println!("{} records written", report.records_written);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Custom Sinks
//!
//! 出力先は`RowSink`トレイトで抽象化されています。
//!
//! ```rust
//! use goods2xlsx::{CatalogReader, ConverterBuilder, CsvSink, RowSink};
//!
//! # fn main() -> Result<(), goods2xlsx::GoodsError> {
//! let xml = r#"<database><table>
//!     <column name="name">A-1</column>
//!     <column name="content">&lt;p&gt;Hello&lt;/p&gt;&lt;p&gt;World&lt;/p&gt;</column>
//!     <column name="price">100</column>
//!     <column name="price_retail">150</column>
//!     <column name="har_size">M</column>
//! </table></database>"#;
//!
//! let converter = ConverterBuilder::new().build()?;
//! let reader = CatalogReader::from_bytes(xml.as_bytes().to_vec())?;
//! let mut sink = CsvSink::new(Vec::new())?;
//! converter.write_records(&reader, &mut sink)?;
//! sink.finish()?;
//!
//! let csv = String::from_utf8(sink.into_inner()).unwrap();
//! assert!(csv.ends_with("A-1,\"Hello\nWorld\",100,150,M\n"));
//! # Ok(())
//! # }
//! ```

mod api;
mod builder;
mod cleanup;
mod error;
mod formatter;
mod output;
mod parser;
mod security;
mod types;

// 公開API
pub use api::{MissingFieldPolicy, OutputFormat};
pub use builder::{ConversionReport, Converter, ConverterBuilder};
pub use cleanup::cleanup_stale_outputs;
pub use error::GoodsError;
pub use formatter::{flatten_description, unescape_article};
pub use output::{CsvSink, JsonSink, RowSink, XlsxSink};
pub use parser::{CatalogReader, Records};
pub use security::SecurityConfig;
pub use types::{Record, RequiredField, RowCursor};
