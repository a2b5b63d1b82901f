//! Field Formatter Module
//!
//! レコードのフィールド値をセルに書き込む文字列へ変換するモジュール。
//! 商品コードの引用符の復元と、HTML形式の商品説明のプレーンテキスト化を担当します。

use scraper::{ElementRef, Html};

/// ダブルクォートの数値文字参照
const ENCODED_QUOTE: &str = "&#34;";

/// テーブルのセル同士の区切り
const CELL_SEPARATOR: &str = "   ";

/// 商品コードを変換する
///
/// `&#34;`をダブルクォートに置き換えます。それ以外の文字参照は変換しません。
pub fn unescape_article(text: Option<&str>) -> String {
    match text {
        Some(text) => text.replace(ENCODED_QUOTE, "\""),
        None => String::new(),
    }
}

/// 値をそのまま出力する（価格、サイズ用）
pub fn passthrough(text: Option<&str>) -> String {
    text.unwrap_or_default().to_string()
}

/// HTML形式の商品説明をプレーンテキストに変換する
///
/// フラグメントの最上位にある要素を文書順に処理します。
///
/// - `table`要素: `tr`ごとに1行。`td`のテキストを前後の空白を除いて
///   3つの空白で連結する
/// - その他の要素: テキスト全体を前後の空白を除いて1行とする
/// - 最上位のテキストノードは無視する
///
/// 各行を改行で連結し、最後に全体の前後の空白を除きます。
///
/// # 使用例
///
/// ```rust
/// use goods2xlsx::flatten_description;
///
/// let html = "<p>Hello</p><table><tr><td>A</td><td>B</td></tr></table>";
/// assert_eq!(flatten_description(Some(html)), "Hello\nA   B");
/// assert_eq!(flatten_description(None), "");
/// ```
pub fn flatten_description(text: Option<&str>) -> String {
    let Some(text) = text else {
        return String::new();
    };

    let fragment = Html::parse_fragment(text);
    let mut lines: Vec<String> = Vec::new();

    for node in fragment.root_element().children() {
        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };

        if element.value().name() == "table" {
            lines.extend(table_lines(element));
        } else {
            lines.push(element_text(element));
        }
    }

    lines.join("\n").trim().to_string()
}

/// テーブルの各行を1行の文字列に変換
fn table_lines(table: ElementRef<'_>) -> Vec<String> {
    table
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|element| element.value().name() == "tr")
        .map(|row| {
            row.children()
                .filter_map(ElementRef::wrap)
                .filter(|cell| cell.value().name() == "td")
                .map(element_text)
                .collect::<Vec<_>>()
                .join(CELL_SEPARATOR)
        })
        .collect()
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape_article_quote() {
        assert_eq!(
            unescape_article(Some("Shirt &#34;Oxford&#34; 42")),
            "Shirt \"Oxford\" 42"
        );
    }

    #[test]
    fn test_unescape_article_leaves_other_references() {
        assert_eq!(unescape_article(Some("A&amp;B &#39;x&#39;")), "A&amp;B &#39;x&#39;");
        assert_eq!(unescape_article(None), "");
    }

    #[test]
    fn test_passthrough() {
        assert_eq!(passthrough(Some(" 1 200,00 ")), " 1 200,00 ");
        assert_eq!(passthrough(None), "");
    }

    #[test]
    fn test_flatten_paragraphs() {
        assert_eq!(
            flatten_description(Some("<p>Hello</p><p>World</p>")),
            "Hello\nWorld"
        );
    }

    #[test]
    fn test_flatten_table() {
        let html = "<table><tr><td>A</td><td>B</td></tr><tr><td>C</td><td>D</td></tr></table>";
        assert_eq!(flatten_description(Some(html)), "A   B\nC   D");
    }

    #[test]
    fn test_flatten_paragraph_then_table() {
        let html = "<p>Sizes:</p>\n<table>\n  <tr><td> S </td><td>44</td></tr>\n  <tr><td>M</td><td>46</td></tr>\n</table>";
        assert_eq!(flatten_description(Some(html)), "Sizes:\nS   44\nM   46");
    }

    #[test]
    fn test_flatten_trims_cells_and_paragraphs() {
        let html = "<p>\n   Cotton shirt  \n</p><table><tr><td>\n a </td><td> b\n</td></tr></table>";
        assert_eq!(flatten_description(Some(html)), "Cotton shirt\na   b");
    }

    #[test]
    fn test_flatten_ignores_top_level_text() {
        assert_eq!(
            flatten_description(Some("stray <p>Kept</p> text")),
            "Kept"
        );
    }

    #[test]
    fn test_flatten_nested_inline_markup() {
        let html = "<p>Made of <b>100%</b> <i>cotton</i></p>";
        assert_eq!(flatten_description(Some(html)), "Made of 100% cotton");
    }

    #[test]
    fn test_flatten_explicit_tbody() {
        let html = "<table><tbody><tr><td>1</td><td>2</td><td>3</td></tr></tbody></table>";
        assert_eq!(flatten_description(Some(html)), "1   2   3");
    }

    #[test]
    fn test_flatten_absent_and_empty() {
        assert_eq!(flatten_description(None), "");
        assert_eq!(flatten_description(Some("")), "");
        assert_eq!(flatten_description(Some("   ")), "");
    }

    #[test]
    fn test_flatten_decodes_html_entities() {
        assert_eq!(
            flatten_description(Some("<p>Tom &amp; Jerry</p>")),
            "Tom & Jerry"
        );
    }

    #[allow(unused_doc_comments)]
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// `&`を含まない文字列は変化しない
            #[test]
            fn test_unescape_without_ampersand_is_identity(text in "[^&]*") {
                prop_assert_eq!(unescape_article(Some(text.as_str())), text);
            }

            /// 引用符参照は同じ位置でダブルクォートになる
            #[test]
            fn test_unescape_quote_in_place(prefix in "[^&]*", suffix in "[^&]*") {
                let input = format!("{}&#34;{}", prefix, suffix);
                prop_assert_eq!(
                    unescape_article(Some(input.as_str())),
                    format!("{}\"{}", prefix, suffix)
                );
            }
        }
    }
}
