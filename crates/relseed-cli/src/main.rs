mod config;
mod logging;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use config::{Config, ConfigError, DEFAULT_CONFIG_PATH, load_config};
use logging::{LogFormat, init_logging};
use relseed_core::Error as CoreError;
use relseed_generate::output::{write_seed_file, write_seed_sql};
use relseed_generate::{GenerationError, SeedGenerator};
use relseed_introspect::{
    IntrospectError, IntrospectionSnapshot, JsonFileSource, SchemaGraph, SnapshotSource,
    build_schema,
};
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
enum CliError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("introspection error: {0}")]
    Introspect(#[from] IntrospectError),
    #[error("generation error: {0}")]
    Generate(#[from] GenerationError),
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(
    name = "relseed",
    version,
    about = "Schema graph analysis and seed data generation"
)]
struct Cli {
    /// Path to the relseed.toml config file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
    /// Append logs to this file instead of stderr.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the finalized tables as JSON.
    Inspect(SnapshotArgs),
    /// Print the insert order.
    Order(OrderArgs),
    /// Write seed INSERT statements.
    Seed(SeedArgs),
    /// Print the JSON Schema of the snapshot format.
    InputSchema,
}

#[derive(Args, Debug)]
struct SnapshotArgs {
    /// Introspection snapshot (JSON).
    snapshot: PathBuf,
    /// Schema name(s) to include; overrides the config file.
    #[arg(long = "schema", value_name = "SCHEMA")]
    schemas: Vec<String>,
    /// Leave views out of the analysis.
    #[arg(long, default_value_t = false)]
    exclude_views: bool,
}

#[derive(Args, Debug)]
struct OrderArgs {
    #[command(flatten)]
    snapshot: SnapshotArgs,
    /// Strict topological order; fails on foreign-key cycles.
    #[arg(long, default_value_t = false)]
    strict: bool,
}

#[derive(Args, Debug)]
struct SeedArgs {
    #[command(flatten)]
    snapshot: SnapshotArgs,
    /// Output file; stdout when absent.
    #[arg(long)]
    out: Option<PathBuf>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    row_cap: Option<usize>,
    #[arg(long)]
    min_rows: Option<usize>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "command failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(&cli.config)?;
    init_logging(cli.log_format, &config.log_level, cli.log_file.as_deref())?;

    match cli.command {
        Command::Inspect(args) => run_inspect(&config, args),
        Command::Order(args) => run_order(&config, args),
        Command::Seed(args) => run_seed(&config, args),
        Command::InputSchema => run_input_schema(),
    }
}

fn load_graph(config: &Config, args: &SnapshotArgs) -> Result<SchemaGraph, CliError> {
    let mut options = config.marshal_options();
    if !args.schemas.is_empty() {
        options.schemas = Some(args.schemas.clone());
    }
    if args.exclude_views {
        options.include_views = false;
    }

    let source = JsonFileSource::new(&args.snapshot);
    let snapshot = source.load()?;
    info!(
        source = %source.describe(),
        engine = %snapshot.engine.unwrap_or(options.engine),
        tables = snapshot.tables.len(),
        "snapshot loaded"
    );
    Ok(build_schema(&snapshot, &options)?)
}

fn run_inspect(config: &Config, args: SnapshotArgs) -> Result<(), CliError> {
    let graph = load_graph(config, &args)?;
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &graph)?;
    writeln!(stdout)?;
    Ok(())
}

fn run_order(config: &Config, args: OrderArgs) -> Result<(), CliError> {
    let graph = load_graph(config, &args.snapshot)?;
    let mut stdout = io::stdout().lock();

    if args.strict {
        for key in graph.topological_order()? {
            writeln!(stdout, "{key}")?;
        }
        return Ok(());
    }

    writeln!(stdout, "base tables:")?;
    for key in &graph.insert_order.base_tables {
        writeln!(stdout, "  {key}")?;
    }
    writeln!(stdout, "views:")?;
    for key in &graph.insert_order.views {
        writeln!(stdout, "  {key}")?;
    }
    Ok(())
}

fn run_seed(config: &Config, args: SeedArgs) -> Result<(), CliError> {
    let timer = Instant::now();
    let graph = load_graph(config, &args.snapshot)?;

    let mut options = config.seed.clone();
    if let Some(seed) = args.seed {
        options.seed = Some(seed);
    }
    if let Some(row_cap) = args.row_cap {
        options.row_cap = row_cap;
    }
    if let Some(min_rows) = args.min_rows {
        options.min_rows = min_rows;
    }

    let mut generator = SeedGenerator::new(options)?;
    let data = generator.generate(&graph.tables);

    let bytes = match &args.out {
        Some(path) => write_seed_file(path, &data)?,
        None => write_seed_sql(io::stdout().lock(), &data)?,
    };

    let report = generator.report();
    for table in &report.tables {
        info!(
            schema = %table.schema,
            table = %table.table,
            rows = table.rows_generated,
            null_fallbacks = table.null_fallbacks,
            "seed table summary"
        );
    }
    info!(
        seed = report.seed,
        tables = report.tables.len(),
        rows = report.rows_total(),
        bytes,
        out = %args.out.as_ref().map(|path| path.display().to_string()).unwrap_or_else(|| "stdout".to_string()),
        duration_ms = timer.elapsed().as_millis() as u64,
        "seed written"
    );
    Ok(())
}

fn run_input_schema() -> Result<(), CliError> {
    let schema = schemars::schema_for!(IntrospectionSnapshot);
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &schema)?;
    writeln!(stdout)?;
    Ok(())
}
