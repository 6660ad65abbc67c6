use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use gormgen::config::{Overrides, Settings};
use gormgen::emit::FsSink;
use gormgen::pipeline::Report;

#[derive(Parser, Debug)]
#[command(name = "gormgen")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Database host
    #[arg(long)]
    host: Option<String>,

    /// Database port
    #[arg(long)]
    port: Option<u16>,

    /// Database user
    #[arg(short, long)]
    user: Option<String>,

    /// Database password
    #[arg(short, long)]
    password: Option<String>,

    /// Database (schema) name
    #[arg(short, long)]
    database: Option<String>,

    /// Output directory of the generated models
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Comma-separated list of tables to generate (default: all)
    #[arg(short, long)]
    tables: Option<String>,

    /// Go package name of the generated models
    #[arg(long)]
    package: Option<String>,

    /// Path to the YAML config file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Path to .env file for connection config
    #[arg(long, default_value = "./.env")]
    env_file: PathBuf,

    /// Generate gin routers
    #[arg(long)]
    router: bool,

    /// Generate services
    #[arg(long)]
    service: bool,

    /// Output directory of the generated routers
    #[arg(long)]
    router_output: Option<PathBuf>,

    /// Output directory of the generated services
    #[arg(long)]
    service_output: Option<PathBuf>,

    /// Import path of the models package
    #[arg(long)]
    model_import: Option<String>,

    /// Import path of the services package
    #[arg(long)]
    service_import: Option<String>,

    /// Import path of the storage root (services use `<path>/mysql`)
    #[arg(long)]
    storage_import: Option<String>,

    /// Verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl From<Cli> for Overrides {
    fn from(cli: Cli) -> Self {
        Self {
            host: cli.host,
            port: cli.port,
            user: cli.user,
            password: cli.password,
            database: cli.database,
            output: cli.output,
            package: cli.package,
            tables: cli.tables,
            generate_service: cli.service,
            generate_router: cli.router,
            service_output: cli.service_output,
            router_output: cli.router_output,
            model_import: cli.model_import,
            service_import: cli.service_import,
            storage_import: cli.storage_import,
        }
    }
}

fn main() {
    if let Err(e) = run() {
        error!(error = ?e, "Fatal error");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    info!("gormgen v{}", env!("CARGO_PKG_VERSION"));

    let config_file = cli.config.clone();
    let env_file = cli.env_file.clone();
    let settings = Settings::load(cli.into(), &config_file, &env_file)
        .context("Failed to load configuration")?;

    info!(
        database = ?settings.connection.database,
        output = ?settings.output,
        package = ?settings.package,
        service = ?settings.generate_service,
        router = ?settings.generate_router,
        "Starting code generation"
    );

    let mut sink = FsSink::new(&settings);
    debug!(sink = ?sink, "Output directories");

    let report = generate(settings, &mut sink)?;
    log_report(&report);

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

#[cfg(feature = "mysql")]
fn generate(settings: Settings, sink: &mut FsSink) -> Result<Report> {
    use gormgen::codegen::GoRenderer;
    use gormgen::pipeline::Pipeline;
    use gormgen::MysqlSource;

    let mut pipeline = Pipeline::new(settings, GoRenderer::new());
    pipeline
        .run(MysqlSource::connect, sink)
        .context("Code generation aborted")
}

#[cfg(not(feature = "mysql"))]
fn generate(_settings: Settings, _sink: &mut FsSink) -> Result<Report> {
    anyhow::bail!("MySQL support not enabled. Rebuild with --features mysql")
}

fn log_report(report: &Report) {
    for outcome in report.failed() {
        if let Some((layer, e)) = &outcome.failure {
            warn!(table = ?outcome.table, layer = layer.as_str(), error = %e, "Table skipped");
        }
    }

    info!(
        tables = ?report.outcomes.len(),
        succeeded = ?report.succeeded().count(),
        failed = ?report.failed().count(),
        files = ?report.files_written(),
        "Code generation complete"
    );
}
