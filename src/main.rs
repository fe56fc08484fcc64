use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use schema_flattener::export::{self, ExportFormat};
use schema_flattener::loader;
use schema_flattener::progress::{LoggingProgress, NoProgress, ProgressObserver};
use schema_flattener::schema_flattener::SchemaFlattener;
use schema_flattener::types::SchemaTable;

#[derive(Parser)]
#[command(name = "schemaflat")]
#[command(about = "Flatten nested schema-description JSON into one row per column")]
#[command(version)]
#[command(long_about = "schemaflat reads a combined schema details document (tables and views with their columns and constraints) and produces a flat table with one row per column, marking primary key and foreign key membership.")]
#[command(after_help = "EXAMPLES:
    # Print the flattened table
    schemaflat flatten -i combined_schema_details.json

    # Export only views to CSV
    schemaflat flatten -i combined_schema_details.json --object-type VIEW -o views.csv

    # Show object and key counts
    schemaflat summary -i combined_schema_details.json --format json")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Set log level explicitly
    #[arg(long, global = true, value_enum)]
    log_level: Option<LogLevel>,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(ValueEnum, Clone, Debug)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Flatten a schema document into a column table
    Flatten {
        /// Path to the combined schema details JSON file
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Write the table to this file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format (default: from output extension, else text)
        #[arg(long, value_enum)]
        format: Option<TableFormat>,

        /// Keep only objects of this type (e.g. TABLE, VIEW)
        #[arg(long, value_name = "TYPE")]
        object_type: Option<String>,

        /// Keep only the object with this exact name
        #[arg(long, value_name = "NAME")]
        object: Option<String>,

        /// Log progress while flattening (info level, every 100 objects)
        #[arg(long)]
        progress: bool,
    },

    /// Print object and key statistics for a schema document
    Summary {
        /// Path to the combined schema details JSON file
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Output format for the summary
        #[arg(long, value_enum, default_value = "text")]
        format: SummaryFormat,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TableFormat {
    Text,
    Csv,
    Json,
}

impl From<TableFormat> for ExportFormat {
    fn from(format: TableFormat) -> Self {
        match format {
            TableFormat::Text => ExportFormat::Text,
            TableFormat::Csv => ExportFormat::Csv,
            TableFormat::Json => ExportFormat::Json,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SummaryFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = initialize_logging(&cli) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("Starting schemaflat v{}", env!("CARGO_PKG_VERSION"));

    let result = match cli.command {
        Commands::Flatten {
            input,
            output,
            format,
            object_type,
            object,
            progress,
        } => {
            execute_flatten(
                &input,
                output.as_deref(),
                format,
                object_type.as_deref(),
                object.as_deref(),
                progress,
            )
            .await
        }
        Commands::Summary { input, format } => execute_summary(&input, format).await,
    };

    if let Err(e) = result {
        eprintln!("schemaflat failed: {:#}", e);
        std::process::exit(1);
    }
}

/// Load and flatten the document at `input`
async fn load_table(input: &Path, progress: &dyn ProgressObserver) -> Result<SchemaTable> {
    let document = loader::load_document(input)
        .await
        .with_context(|| format!("failed to load schema document {:?}", input))?;

    let table = SchemaFlattener::new()
        .flatten_with_progress(Some(&document), progress)
        .with_context(|| format!("failed to flatten schema document {:?}", input))?;
    Ok(table)
}

async fn execute_flatten(
    input: &Path,
    output: Option<&Path>,
    format: Option<TableFormat>,
    object_type: Option<&str>,
    object: Option<&str>,
    show_progress: bool,
) -> Result<()> {
    let mut table = if show_progress {
        load_table(input, &LoggingProgress::new("flatten")).await?
    } else {
        load_table(input, &NoProgress).await?
    };

    if let Some(object_type) = object_type {
        table = table.filter_object_type(object_type);
        info!("{} rows after object type filter '{}'", table.len(), object_type);
    }
    if let Some(object) = object {
        table = table.filter_object(object);
        info!("{} rows after object filter '{}'", table.len(), object);
    }

    let format = format
        .map(ExportFormat::from)
        .or_else(|| output.and_then(ExportFormat::from_path))
        .unwrap_or(ExportFormat::Text);

    match output {
        Some(path) => export::write_table(&table, format, path)
            .with_context(|| format!("failed to write {:?}", path))?,
        None => print!("{}", export::render(&table, format)?),
    }

    Ok(())
}

async fn execute_summary(input: &Path, format: SummaryFormat) -> Result<()> {
    let table = load_table(input, &NoProgress).await?;
    let summary = table.summary();

    match format {
        SummaryFormat::Text => print!("{}", summary.to_report()),
        SummaryFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }

    Ok(())
}

/// Initialize logging based on CLI configuration; `RUST_LOG` takes precedence
fn initialize_logging(cli: &Cli) -> Result<()> {
    let log_level: Level = if let Some(level) = &cli.log_level {
        level.clone().into()
    } else if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(cli.verbose)
        .with_line_number(cli.verbose);

    if cli.json_logs {
        builder
            .json()
            .try_init()
            .map_err(|e| anyhow::anyhow!("{}", e))?;
    } else {
        builder.try_init().map_err(|e| anyhow::anyhow!("{}", e))?;
    }

    Ok(())
}
