//! Vertiscope CLI - Inspect tabular model metadata
//!
//! Usage:
//!   vertiscope inspect <path> [--format json|text]
//!   vertiscope extract-query [<file>] [--verbose]
//!
//! Examples:
//!   vertiscope inspect ./Model.db
//!   vertiscope inspect ./extracted/metadata.sqlitedb --format json
//!   echo 'Value.NativeQuery(Db, "SELECT 1;")' | vertiscope extract-query

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use vertiscope::config::Settings;
use vertiscope::report::FragmentOutcome;
use vertiscope::{load_path, LoadOutcome, QueryExtractor};

#[derive(Parser)]
#[command(name = "vertiscope")]
#[command(about = "Vertiscope - Reconstruct tabular model metadata from either metadata backend")]
#[command(version)]
struct Cli {
    /// Path to a vertiscope.toml settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a model and print its tables, columns, relationships and queries
    Inspect {
        /// Metadata store file, or an extracted model directory
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Extract the embedded query from one data-source expression
    ExtractQuery {
        /// File holding the expression (reads stdin if not specified)
        file: Option<PathBuf>,

        /// Also print which matcher found the query
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Readable listing
    Text,
    /// The full model and load report as JSON
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::Inspect { path, format } => cmd_inspect(path, format, &settings),
        Commands::ExtractQuery { file, verbose } => cmd_extract_query(file, verbose, &settings),
    }
}

fn cmd_inspect(path: PathBuf, format: OutputFormat, settings: &Settings) -> ExitCode {
    let outcome = match load_path(&path, settings) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Error loading '{}': {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    for skipped in outcome.report.skipped_fragments() {
        if let FragmentOutcome::Skipped { file, reason, .. } = skipped {
            eprintln!("warning: skipped {}: {}", file, reason);
        }
    }
    for issue in outcome.report.issues() {
        eprintln!("warning: {:?}", issue);
    }

    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(&outcome) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing model: {}", e);
                return ExitCode::FAILURE;
            }
        },
        OutputFormat::Text => print_listing(&path, &outcome),
    }
    ExitCode::SUCCESS
}

fn print_listing(path: &std::path::Path, outcome: &LoadOutcome) {
    let model = &outcome.model;

    println!("Model: {} ({:?} backend)", path.display(), outcome.backend);
    println!();

    if !model.tables().is_empty() {
        println!("Tables:");
        for table in model.tables() {
            let hidden = if table.visible { "" } else { " [hidden]" };
            println!("  - {}{}", table.name, hidden);
            for column in model.columns_of(&table.name) {
                println!("      {} : {}", column.name, column.data_type);
            }
        }
        println!();
    }

    if !model.relationships().is_empty() {
        println!("Relationships:");
        for rel in model.relationships() {
            let inactive = if rel.is_active { "" } else { " [inactive]" };
            println!(
                "  - {}[{}] -> {}[{}] ({}){}",
                rel.from_table,
                rel.from_column,
                rel.to_table,
                rel.to_column,
                rel.cardinality.as_str(),
                inactive
            );
        }
        println!();
    }

    if !model.measures().is_empty() {
        println!("Measures:");
        for measure in model.measures() {
            println!("  - {}[{}]", measure.table_name, measure.name);
        }
        println!();
    }

    let queries: Vec<_> = model.native_queries().collect();
    if queries.is_empty() {
        println!("No embedded queries.");
    } else {
        println!("Queries:");
        for (table, query) in queries {
            println!("  {}:", table);
            for line in query.lines() {
                println!("    {}", line);
            }
        }
    }
}

fn cmd_extract_query(file: Option<PathBuf>, verbose: bool, settings: &Settings) -> ExitCode {
    let expression = match &file {
        Some(path) => fs::read_to_string(path).map_err(|e| (path.display().to_string(), e)),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map(|_| buf)
                .map_err(|e| ("<stdin>".to_string(), e))
        }
    };
    let expression = match expression {
        Ok(s) => s,
        Err((name, e)) => {
            eprintln!("Error reading '{}': {}", name, e);
            return ExitCode::FAILURE;
        }
    };

    let extractor = match QueryExtractor::new(&settings.extractor) {
        Ok(extractor) => extractor,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(extraction) = extractor.extract(&expression) {
        if verbose {
            println!("-- matched by: {}", extraction.source);
        }
        println!("{}", extraction.text);
    } else if verbose {
        println!("-- no embedded query");
    }
    ExitCode::SUCCESS
}
