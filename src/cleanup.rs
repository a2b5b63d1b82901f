//! Stale Output Cleanup
//!
//! 前回の実行で作成された出力ファイルを削除する。

use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::info;

use crate::error::GoodsError;

/// `dir`直下で、ファイル名が`pattern`に一致する通常ファイルをすべて削除する
///
/// サブディレクトリは走査しません。削除したファイルのパスを
/// ファイル名順で返します。
///
/// # 引数
///
/// * `dir` - 対象ディレクトリ
/// * `pattern` - ファイル名に対するglobパターン（例: `output_*.xlsx`）
///
/// # 使用例
///
/// ```rust,no_run
/// use goods2xlsx::cleanup_stale_outputs;
///
/// # fn main() -> Result<(), goods2xlsx::GoodsError> {
/// for removed in cleanup_stale_outputs(".", "output_*.xlsx")? {
///     println!("'{}' removed", removed.display());
/// }
/// # Ok(())
/// # }
/// ```
pub fn cleanup_stale_outputs<P: AsRef<Path>>(
    dir: P,
    pattern: &str,
) -> Result<Vec<PathBuf>, GoodsError> {
    let pattern = Pattern::new(pattern)?;
    let mut stale = Vec::new();

    for entry in fs::read_dir(dir.as_ref())? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if pattern.matches(name) {
            stale.push(entry.path());
        }
    }

    stale.sort();
    for path in &stale {
        fs::remove_file(path)?;
        info!(path = %path.display(), "stale output removed");
    }

    Ok(stale)
}
