//! JSON:API document CLI
//!
//! Command-line interface for checking and filtering JSON:API documents.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use jsonapi_codec::{check, Document, Severity, SparseFieldsets};

#[derive(Parser)]
#[command(name = "jsonapi-codec")]
#[command(about = "Check and filter JSON:API documents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a document for structural violations
    Check {
        /// Document file to check
        document: PathBuf,

        /// Output format: text (default) or json
        #[arg(long, default_value = "text")]
        format: String,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,

        /// Suppress progress output, only show findings
        #[arg(long, short)]
        quiet: bool,
    },

    /// Apply sparse fieldsets to a document and re-emit it
    Filter {
        /// Document file to filter
        document: PathBuf,

        /// Fieldset as type=field,field (repeatable)
        #[arg(long = "fields", value_name = "TYPE=FIELDS", required = true)]
        fields: Vec<String>,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            document,
            format,
            strict,
            quiet,
        } => run_check(&document, &format, strict, quiet),

        Commands::Filter {
            document,
            fields,
            output,
            pretty,
        } => run_filter(&document, &fields, output, pretty),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

/// Load and parse a document file. IO failures exit 3, bad JSON exits 2.
fn load_document(path: &Path) -> Result<serde_json::Value, u8> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        eprintln!("Error: cannot read {}: {}", path.display(), e);
        3u8
    })?;
    serde_json::from_str(&content).map_err(|e| {
        eprintln!("Error: invalid JSON in {}: {}", path.display(), e);
        2u8
    })
}

fn run_check(path: &Path, format: &str, strict: bool, quiet: bool) -> Result<(), u8> {
    let document = load_document(path)?;
    let result = check(&document);

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&result).unwrap());
    } else {
        if !quiet {
            println!("Checking {} ...\n", path.display());
        }

        for diag in &result.diagnostics {
            let (color, label) = match diag.severity {
                Severity::Error => ("\x1b[31m", "error"),
                Severity::Warning => ("\x1b[33m", "warning"),
            };
            if !quiet || diag.severity == Severity::Error {
                let pointer = if diag.pointer.is_empty() {
                    "/"
                } else {
                    diag.pointer.as_str()
                };
                println!(
                    "  {}{}[{}]\x1b[0m: {} - {}",
                    color, label, diag.code, pointer, diag.message
                );
            }
        }

        if !quiet {
            println!();
        }
        if result.is_ok() && (!strict || result.warnings == 0) {
            println!("\x1b[32m✓ document passed\x1b[0m");
        } else {
            println!(
                "\x1b[31m✗ document failed ({} errors, {} warnings)\x1b[0m",
                result.errors, result.warnings
            );
        }
    }

    if result.is_ok() && (!strict || result.warnings == 0) {
        Ok(())
    } else {
        Err(1)
    }
}

fn run_filter(
    path: &Path,
    fields: &[String],
    output: Option<PathBuf>,
    pretty: bool,
) -> Result<(), u8> {
    let mut fieldsets = SparseFieldsets::new();
    for spec in fields {
        fieldsets.parse_spec(spec).map_err(|e| {
            eprintln!("Error: {}", e);
            2u8
        })?;
    }

    let value = load_document(path)?;
    let mut document = Document::from_value(&value).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;
    document.apply_fieldsets(&fieldsets);

    let rendered = document.to_value();
    let json_output = if pretty {
        serde_json::to_string_pretty(&rendered)
    } else {
        serde_json::to_string(&rendered)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}
