//! CLI tool to convert a goods table dump (XML) into `output_.xlsx`.
//!
//! Usage:
//!   goods2xlsx <xmlFile>
//!
//! Stale `output_*.xlsx` files in the current directory are removed first.
//! Set `RUST_LOG` to control log verbosity (default: `info`).

use std::path::{Path, PathBuf};
use std::process;

use clap::error::ErrorKind;
use clap::Parser;
use goods2xlsx::{ConverterBuilder, GoodsError};
use tracing_subscriber::EnvFilter;

/// Convert a goods table dump (XML) into an Excel workbook
#[derive(Parser, Debug)]
#[command(name = "goods2xlsx", version, about)]
struct Cli {
    /// Table dump exported as XML
    #[arg(value_name = "xmlFile")]
    input: PathBuf,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(_) => {
            let program = std::env::args().next().unwrap_or_else(|| "goods2xlsx".to_string());
            println!("Usage: {} <xmlFile>", program);
            process::exit(1);
        }
    };

    init_logging();

    if let Err(e) = run(&cli.input) {
        handle_error(e);
        process::exit(1);
    }
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn run(input: &Path) -> Result<(), GoodsError> {
    let converter = ConverterBuilder::new().build()?;

    for removed in converter.clean_stale_outputs()? {
        println!("'{}' removed", display_name(&removed));
    }

    let result = converter.convert_file(input);

    // 失敗した場合も出力ファイルは保存されている
    let output = converter.output_path();
    if output.exists() {
        println!("'{}' created", display_name(&output));
    }

    let report = result?;
    if let Some(database) = &report.database {
        println!("Database: '{}'", database);
    }
    println!(
        "{} records written, {} skipped",
        report.records_written, report.records_skipped
    );
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn handle_error(error: GoodsError) {
    match error {
        GoodsError::Schema(msg) => {
            eprintln!("Schema Error: {}", msg);
            eprintln!("The input file is not a dump of the goods database table.");
        }
        GoodsError::MissingField { record, field } => {
            eprintln!("Field Extraction Error: record #{} has no '{}' column", record, field);
            eprintln!("Every record needs name, content, price, price_retail and har_size columns.");
        }
        GoodsError::Xml(xml_err) => {
            eprintln!("XML Parse Error: {}", xml_err);
            eprintln!("The input file is not well-formed XML.");
        }
        GoodsError::Malformed(msg) => {
            eprintln!("XML Parse Error: {}", msg);
            eprintln!("The input file is not well-formed XML.");
        }
        GoodsError::Utf8(utf8_err) => {
            eprintln!("UTF-8 Conversion Error: {}", utf8_err);
            eprintln!("The input file contains invalid UTF-8 characters.");
        }
        GoodsError::Io(io_err) => {
            eprintln!("I/O Error: {}", io_err);
            eprintln!("Please check that the files exist and you have permission to access them.");
        }
        GoodsError::Xlsx(xlsx_err) => {
            eprintln!("Workbook Write Error: {}", xlsx_err);
        }
        GoodsError::Json(json_err) => {
            eprintln!("JSON Write Error: {}", json_err);
        }
        GoodsError::Pattern(pattern_err) => {
            eprintln!("Cleanup Error: {}", pattern_err);
        }
        GoodsError::Config(msg) => {
            eprintln!("Configuration Error: {}", msg);
        }
        GoodsError::SecurityViolation(msg) => {
            eprintln!("Security Violation: {}", msg);
            eprintln!("The input file violates resource limits.");
        }
    }
}
