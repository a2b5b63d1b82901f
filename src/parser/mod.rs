//! Parser Module
//!
//! quick-xmlを使用したカタログダンプ（XML）の解析。
//! 検証パスで文書全体の整形式性とレコード数を確認した後、
//! レコードを1件ずつ遅延的に取り出します。

mod catalog;

pub use catalog::{CatalogReader, Records};
