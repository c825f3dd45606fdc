mod error_presentation;

use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use chstate_core::{
    Executor, IntrospectionFilter, Introspector, Renderer, Snapshot, generate_create_table,
    generate_sql, plan_diff,
};
use chstate_files::{CatalogFile, DumpOptions, Dumper, SchemaLoader};
use clap::{Args, Parser, Subcommand, ValueEnum};
use error_presentation::{CliError, CliResult, render_runtime_error};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "chstate",
    version,
    about = "Declarative schema management for ClickHouse"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// Schema directory holding tables/, views/, and the other entity folders.
    #[arg(
        short = 'c',
        long = "config",
        global = true,
        env = "CHSTATE_SCHEMA_DIR",
        default_value = "schema"
    )]
    schema_dir: PathBuf,

    /// Database for desired tables that do not name one; also narrows introspection.
    #[arg(long, global = true, env = "CHSTATE_DATABASE")]
    database: Option<String>,

    /// Recorded catalog (YAML or JSON export of system.tables, system.columns, ...).
    #[arg(long, global = true, env = "CHSTATE_CATALOG")]
    catalog: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        env = "CHSTATE_LOG_LEVEL",
        value_enum,
        default_value_t = LogLevel::Info
    )]
    log_level: LogLevel,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compare the schema files against the catalog and print the planned actions.
    Plan {
        /// Write the plan to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also print the DDL script for the plan.
        #[arg(long)]
        sql: bool,

        /// Run the planned statements through the catalog adapter.
        #[arg(long)]
        apply: bool,
    },
    /// Print CREATE TABLE statements for every table in the schema files.
    Sql,
    /// Introspect the catalog and write it out as schema files.
    Dump {
        /// Defaults to the schema directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Skip views, materialized views, dictionaries, and clusters.
        #[arg(long)]
        tables_only: bool,

        /// Replace files that already exist.
        #[arg(long)]
        overwrite: bool,
    },
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.global);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let code = error.exit_code();
            eprintln!("{}", render_runtime_error(error));
            ExitCode::from(code)
        }
    }
}

/// `RUST_LOG` wins over `--log-level`. Logs always go to stderr.
fn init_logging(global: &GlobalArgs) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(global.log_level.as_str()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(!global.no_color);

    let installed = match global.log_format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if let Err(error) = installed {
        eprintln!("failed to install log subscriber: {error}");
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let global = cli.global;
    match cli.command {
        Command::Plan { output, sql, apply } => {
            let options = PlanOptions {
                output,
                with_sql: sql,
                apply,
            };
            run_plan(&global, &options)
        }
        Command::Sql => run_sql(&global),
        Command::Dump {
            output_dir,
            tables_only,
            overwrite,
        } => {
            let options = DumpOptions {
                output_dir: output_dir.unwrap_or_else(|| global.schema_dir.clone()),
                database: global.database.clone(),
                tables_only,
                overwrite,
            };
            run_dump(&global, options)
        }
        Command::Version => write_stdout(&format!("chstate {}\n", env!("CARGO_PKG_VERSION"))),
    }
}

fn run_plan(global: &GlobalArgs, options: &PlanOptions) -> CliResult<()> {
    let desired = load_desired(global)?;
    let catalog = open_catalog(global)?;
    let current = Introspector::new(&catalog, introspection_filter(global))
        .introspect()?
        .snapshot;

    let plan = plan_diff(&desired, &current);
    info!(actions = plan.len(), "plan computed");

    let renderer = Renderer::new();
    let mut rendered = renderer.render_plan(&plan);
    if options.with_sql && !plan.is_empty() {
        rendered.push('\n');
        rendered.push_str(&renderer.render_sql(&generate_sql(&plan)?));
    }

    if options.apply {
        let executed = Executor::new(&catalog).execute_plan(&plan)?;
        info!(executed, "plan applied");
        rendered.push_str(&format!("\nApplied {executed} statement(s).\n"));
        rendered.push_str(&renderer.render_sql(&catalog.executed_sql()));
    }

    match options.output.as_deref() {
        Some(path) => {
            fs::write(path, &rendered).map_err(|source| CliError::WriteOutput {
                path: path.to_path_buf(),
                source,
            })?;
            info!(file = %path.display(), "plan written");
            Ok(())
        }
        None => write_stdout(&rendered),
    }
}

struct PlanOptions {
    output: Option<PathBuf>,
    with_sql: bool,
    apply: bool,
}

fn run_sql(global: &GlobalArgs) -> CliResult<()> {
    let desired = load_desired(global)?;
    let statements: Vec<String> = desired.tables().iter().map(generate_create_table).collect();
    write_stdout(&Renderer::new().render_sql(&statements))
}

fn run_dump(global: &GlobalArgs, options: DumpOptions) -> CliResult<()> {
    let catalog = open_catalog(global)?;
    let introspection = Introspector::new(&catalog, introspection_filter(global)).introspect()?;

    let written = Dumper::new(options)
        .dump(&introspection.snapshot)
        .map_err(CliError::Dump)?;
    for path in &written {
        debug!(file = %path.display(), "wrote schema file");
    }

    write_stdout(&format!(
        "Wrote {} file(s)\n{}",
        written.len(),
        introspection.statistics
    ))
}

fn load_desired(global: &GlobalArgs) -> CliResult<Snapshot> {
    let mut desired = SchemaLoader::new(&global.schema_dir)
        .load()
        .map_err(CliError::Load)?;
    if let Some(database) = &global.database {
        desired.resolve_database(database);
    }
    Ok(desired)
}

fn open_catalog(global: &GlobalArgs) -> CliResult<CatalogFile> {
    let path = global.catalog.as_ref().ok_or(CliError::MissingCatalog)?;
    CatalogFile::from_path(path).map_err(CliError::Catalog)
}

fn introspection_filter(global: &GlobalArgs) -> IntrospectionFilter {
    global
        .database
        .as_ref()
        .map_or_else(IntrospectionFilter::default, IntrospectionFilter::database)
}

fn write_stdout(text: &str) -> CliResult<()> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(CliError::WriteStdout)
}
