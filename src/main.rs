use std::path::PathBuf;

use calc_formula::{EvaluationContext, EvaluatorConfig, FormulaEvaluator, FormulaValidator, Sheet};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::Level;

/// Calculated-column formulas from the command line.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// JSON config file (`case_variants`, `strict_validation`)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// More log output on stderr; repeat for more
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate a formula against one row
    Eval {
        expression: String,
        /// Row as a JSON object, e.g. '{"Revenue":100,"Cost":40}'
        #[arg(long, default_value = "{}")]
        row: String,
    },
    /// Check a formula against declared field names
    Validate {
        expression: String,
        /// Declared field (repeatable)
        #[arg(long = "field")]
        fields: Vec<String>,
        /// Also reject identifiers that are not declared fields
        #[arg(long)]
        strict: bool,
    },
    /// Compute every calculated column of a sheet JSON file
    Sheet { path: PathBuf },
}

fn main() {
    // Parse CLI arguments.
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    // Load options.
    let mut config = match args.config.as_ref() {
        Some(path) => EvaluatorConfig::load(path).unwrap_or_else(|e| fail(&e.to_string())),
        None => EvaluatorConfig::default(),
    };

    let out = match args.cmd {
        Command::Eval { expression, row } => {
            let row: EvaluationContext =
                serde_json::from_str(&row).unwrap_or_else(|e| fail(&format!("Invalid row JSON: {e}")));
            let result = FormulaEvaluator::new(config).evaluate(&expression, &row);
            serde_json::to_value(result).unwrap_or(Value::Null)
        }
        Command::Validate { expression, fields, strict } => {
            config.strict_validation |= strict;
            let validation = FormulaValidator::new(config).validate(&expression, fields.as_slice());
            serde_json::to_value(validation).unwrap_or_else(|e| fail(&e.to_string()))
        }
        Command::Sheet { path } => {
            let raw = std::fs::read_to_string(&path)
                .unwrap_or_else(|e| fail(&format!("{}: {e}", path.display())));
            let sheet: Sheet =
                serde_json::from_str(&raw).unwrap_or_else(|e| fail(&format!("Invalid sheet JSON: {e}")));
            tracing::info!(id = %sheet.id, rows = sheet.rows.len(), "computing sheet");
            let rows = sheet.compute(&FormulaEvaluator::new(config));
            serde_json::to_value(rows).unwrap_or_else(|e| fail(&e.to_string()))
        }
    };

    // Output result.
    match serde_json::to_string_pretty(&out) {
        Ok(s) => println!("{s}"),
        Err(e) => fail(&e.to_string()),
    }
}

fn fail(msg: &str) -> ! {
    eprintln!("{msg}");
    std::process::exit(1);
}
