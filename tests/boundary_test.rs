//! Boundary Value Tests
//!
//! 空のカタログ、大量のレコード、特殊な文字を含む値など、境界条件を検証します。

use calamine::{open_workbook, Data, Reader, Xlsx};
use goods2xlsx::{
    flatten_description, CatalogReader, ConverterBuilder, CsvSink, OutputFormat, RowSink,
};

fn record(name: &str, content: &str) -> String {
    format!(
        "<table><column name=\"name\">{}</column><column name=\"content\">{}</column>\
         <column name=\"price\">10</column><column name=\"price_retail\">20</column>\
         <column name=\"har_size\">M</column></table>",
        name, content
    )
}

/// レコードが1件もないダンプ
#[test]
fn test_empty_database() {
    let dir = tempfile::tempdir().unwrap();
    let converter = ConverterBuilder::new()
        .with_output_dir(dir.path())
        .build()
        .unwrap();

    for xml in ["<database name=\"gloowi\"></database>", "<database name=\"gloowi\"/>"] {
        let report = converter.convert_bytes(xml.as_bytes().to_vec()).unwrap();
        assert_eq!(report.records_written, 0);
        assert_eq!(report.database.as_deref(), Some("gloowi"));
    }

    let mut workbook: Xlsx<_> = open_workbook(converter.output_path()).unwrap();
    let range = workbook.worksheet_range("goods").unwrap();
    assert_eq!(range.height(), 1);
    assert_eq!(
        range.get_value((0, 4)),
        Some(&Data::String("Размеры".to_string()))
    );
}

/// 空の`table`要素は全フィールド欠落として扱う
#[test]
fn test_empty_table_element_is_missing_fields() {
    let converter = ConverterBuilder::new().build().unwrap();
    let reader = CatalogReader::from_bytes(b"<database><table/></database>".to_vec()).unwrap();
    assert_eq!(reader.record_count(), 1);

    let mut sink = CsvSink::new(Vec::new()).unwrap();
    assert!(converter.write_records(&reader, &mut sink).is_err());
    assert_eq!(sink.current_row(), 3);
}

/// 大量のレコードでも行番号が連続する
#[test]
fn test_many_records() {
    let count = 5_000;
    let tables: String = (0..count)
        .map(|i| record(&format!("A-{}", i), ""))
        .collect();
    let xml = format!("<database name=\"gloowi\">{}</database>", tables);

    let converter = ConverterBuilder::new().build().unwrap();
    let reader = CatalogReader::from_bytes(xml.into_bytes()).unwrap();
    let mut sink = CsvSink::new(Vec::new()).unwrap();
    let report = converter.write_records(&reader, &mut sink).unwrap();

    assert_eq!(report.records_written, count);
    assert_eq!(sink.current_row() as usize, 3 + count);

    let csv = String::from_utf8(sink.into_inner()).unwrap();
    assert_eq!(csv.lines().count(), count + 1);
    assert!(csv.ends_with("A-4999,,10,20,M\n"));
}

/// 進捗の分割数よりレコードが少ない場合
#[test]
fn test_fewer_records_than_progress_buckets() {
    let tables: String = (0..3).map(|i| record(&format!("A-{}", i), "")).collect();
    let xml = format!("<database>{}</database>", tables);

    let converter = ConverterBuilder::new()
        .with_progress_buckets(100)
        .build()
        .unwrap();
    let reader = CatalogReader::from_bytes(xml.into_bytes()).unwrap();
    let mut sink = CsvSink::new(Vec::new()).unwrap();

    let report = converter.write_records(&reader, &mut sink).unwrap();
    assert_eq!(report.records_written, 3);
}

/// キリル文字や絵文字を含む値
#[test]
fn test_unicode_values() {
    let dir = tempfile::tempdir().unwrap();
    let xml = format!(
        "<database>{}</database>",
        record(
            "Платье «Весна» 🌸",
            "&lt;p&gt;Состав: шёлк&lt;/p&gt;&lt;p&gt;Цвет: 赤&lt;/p&gt;"
        )
    );

    let converter = ConverterBuilder::new()
        .with_output_dir(dir.path())
        .build()
        .unwrap();
    converter.convert_bytes(xml.into_bytes()).unwrap();

    let mut workbook: Xlsx<_> = open_workbook(converter.output_path()).unwrap();
    let range = workbook.worksheet_range("goods").unwrap();
    assert_eq!(
        range.get_value((2, 0)),
        Some(&Data::String("Платье «Весна» 🌸".to_string()))
    );
    assert_eq!(
        range.get_value((2, 1)),
        Some(&Data::String("Состав: шёлк\nЦвет: 赤".to_string()))
    );
}

/// CDATAで囲まれた説明と、カンマを含む値
#[test]
fn test_cdata_description_with_commas() {
    let xml = "<database><table>\
        <column name=\"name\">A,1</column>\
        <column name=\"content\"><![CDATA[<table><tr><td>a, b</td><td>c</td></tr></table>]]></column>\
        <column name=\"price\">1</column>\
        <column name=\"price_retail\">2</column>\
        <column name=\"har_size\">S</column>\
        </table></database>";

    let converter = ConverterBuilder::new()
        .with_output_format(OutputFormat::Csv)
        .build()
        .unwrap();
    let reader = CatalogReader::from_bytes(xml.as_bytes().to_vec()).unwrap();
    let mut sink = CsvSink::new(Vec::new()).unwrap();
    converter.write_records(&reader, &mut sink).unwrap();

    let csv = String::from_utf8(sink.into_inner()).unwrap();
    assert!(csv.ends_with("\"A,1\",\"a, b   c\",1,2,S\n"));
}

/// 非常に長い説明
#[test]
fn test_long_description() {
    let paragraphs: String = (0..1_000).map(|i| format!("<p>line {}</p>", i)).collect();
    let flattened = flatten_description(Some(paragraphs.as_str()));

    assert_eq!(flattened.lines().count(), 1_000);
    assert!(flattened.starts_with("line 0\n"));
    assert!(flattened.ends_with("line 999"));
}
