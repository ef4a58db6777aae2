use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use datatable::{DataTableConfig, DataTableService, Params, ProtocolKind, TableRegistry};
use runtime::{AppConfig, CliArgs, DatabaseConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tablekit_db::{ConnectOpts, DbHandle};

/// Module name of the datatable section inside `modules:`.
const DATATABLE_MODULE: &str = "datatable";

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps in-memory DSNs as-is.
/// - Normalizes backslashes into forward slashes (important on Windows).
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path) -> Result<String> {
    if tablekit_db::is_sqlite_memory(dsn) {
        return Ok(dsn.to_string());
    }
    let Some(db_path) = dsn.strip_prefix("sqlite://") else {
        return Ok(dsn.to_string());
    };

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    Ok(out)
}

/// Tablekit - server-side processing for paged, sortable, searchable tables
#[derive(Parser)]
#[command(name = "tablekit-cli")]
#[command(about = "Tablekit - server-side processing for paged, sortable, searchable tables")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Database URL (overrides config)
    #[arg(long)]
    database_url: Option<String>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer one table request and print the response envelope
    Query {
        /// Table id as declared under `modules.datatable.tables`
        table: String,
        /// Request parameters as a URL query string, e.g. "draw=1&start=0&length=10"
        #[arg(short, long, default_value = "")]
        params: String,
        /// Wire protocol: current, legacy or legacy-hybrid
        #[arg(long, default_value = "current")]
        protocol: String,
    },
    /// Print the column metadata of a table
    Columns {
        table: String,
        /// Wire protocol: current, legacy or legacy-hybrid
        #[arg(long, default_value = "current")]
        protocol: String,
        /// Print the full client grid settings instead of the column list
        #[arg(long)]
        client: bool,
    },
    /// Check configuration and table declarations
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        database_url: cli.database_url.clone(),
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, &config.home_path());
    tracing::debug!(home_dir = %config.home_dir, "configuration loaded");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Check) {
        Commands::Query {
            table,
            params,
            protocol,
        } => run_query(&config, &table, &params, parse_protocol(&protocol)?).await,
        Commands::Columns {
            table,
            protocol,
            client,
        } => print_columns(&config, &table, parse_protocol(&protocol)?, client),
        Commands::Check => check_config(&config),
    }
}

fn parse_protocol(raw: &str) -> Result<ProtocolKind> {
    raw.parse::<ProtocolKind>().map_err(|e| anyhow!(e))
}

fn datatable_config(config: &AppConfig) -> Result<DataTableConfig> {
    config.module_config(DATATABLE_MODULE)
}

fn connect_opts(db_config: &DatabaseConfig) -> ConnectOpts {
    ConnectOpts {
        max_conns: db_config.max_conns.or(Some(10)),
        acquire_timeout: Some(Duration::from_secs(
            db_config.acquire_timeout_sec.unwrap_or(30),
        )),
        create_sqlite_dirs: true,
        ..Default::default()
    }
}

async fn run_query(
    config: &AppConfig,
    table: &str,
    raw_params: &str,
    protocol: ProtocolKind,
) -> Result<()> {
    let dt_config = datatable_config(config)?;
    let registry = TableRegistry::from_config(&dt_config)?;

    let db_config = config
        .database
        .as_ref()
        .ok_or_else(|| anyhow!("Database URL not configured"))?;
    let dsn = absolutize_sqlite_dsn(db_config.url.trim(), &config.home_path())?;

    let db = DbHandle::connect(&dsn, connect_opts(db_config))
        .await
        .context("Failed to connect to database")?;
    tracing::info!(engine = ?db.engine(), "connected");

    let service = DataTableService::new(registry, db.clone(), &dt_config);
    let params = Params::from_query(raw_params);
    let result = service.query(table, protocol, &params).await;
    db.close().await?;

    let envelope = result?;
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

fn print_columns(
    config: &AppConfig,
    table: &str,
    protocol: ProtocolKind,
    client: bool,
) -> Result<()> {
    let dt_config = datatable_config(config)?;
    let registry = TableRegistry::from_config(&dt_config)?;
    let entry = registry
        .get(table)
        .ok_or_else(|| anyhow!("Table not found: {table}"))?;

    let out = if client {
        entry.table.to_client_json()
    } else {
        protocol
            .adapter(&dt_config.legacy_sort_field)
            .column_metadata(entry.table.get_columns())
    };
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    let dt_config = datatable_config(config)?;
    let registry = TableRegistry::from_config(&dt_config)?;

    if let Some(db) = &config.database {
        tablekit_db::DbHandle::detect(&db.url)?;
    }

    println!("Configuration is valid");
    for id in registry.ids() {
        println!("  table {id} -> {}", dt_config.results_url(id));
    }
    Ok(())
}
