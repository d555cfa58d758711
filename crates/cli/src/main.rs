use crate::{
    conn::{ConnectionPinger, PostgresConnectionPinger},
    error::CliError,
};
use clap::Parser;
use commands::Commands;
use engine_config::{
    env::EnvVars,
    settings::{JobConfig, Overrides},
};
use engine_core::metrics::Metrics;
use engine_runtime::{error::MigrationError, execution::factory::build_job};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod conn;
mod error;
mod output;

#[derive(Parser)]
#[command(
    name = "copybase",
    version = "0.1.0",
    about = "Partitioned bulk copy into Postgres"
)]
struct Cli {
    /// Log filter, e.g. "info" or "engine_core=debug". Overrides RUST_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    match execute(cli.command).await {
        Ok(code) => code,
        Err(err) => {
            error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(level: Option<&str>) {
    let filter = level
        .and_then(|l| EnvFilter::try_new(l).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn execute(command: Commands) -> Result<ExitCode, CliError> {
    match command {
        Commands::Run {
            config,
            env_file,
            chunk_size,
            partitions,
            workers,
            report,
        } => {
            let overrides = Overrides {
                chunk_size,
                partition_count: partitions,
                worker_pool_size: workers,
            };
            let config = load_config(&config, env_file.as_deref(), &overrides)?;

            let job = build_job(&config, Metrics::new())?
                .on_complete(|result| print!("{}", output::render_summary(result)));
            let result = job.run().await;

            if let Some(path) = report {
                output::write_report(&result, &path).await?;
                info!("Report written to {path}");
            }

            Ok(if result.is_completed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Validate { config, env_file } => {
            info!("Validating job file: {config}");
            let config = load_config(&config, env_file.as_deref(), &Overrides::default())?;
            output::print_json(&config)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Plan {
            config,
            step,
            env_file,
            partitions,
        } => {
            let overrides = Overrides {
                partition_count: partitions,
                ..Overrides::default()
            };
            let config = load_config(&config, env_file.as_deref(), &overrides)?;
            let job = build_job(&config, Metrics::new())?;
            let target = job
                .step(&step)
                .ok_or_else(|| MigrationError::UnknownStep(step.clone()))?;

            let ranges = target.partitions().await?;
            output::print_json(&ranges)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::TestConn { url } => {
            PostgresConnectionPinger { url }.ping().await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_config(
    path: &str,
    env_file: Option<&str>,
    overrides: &Overrides,
) -> Result<JobConfig, CliError> {
    let mut env = EnvVars::from_process();
    if let Some(env_file) = env_file {
        env.load_file(env_file)?;
    }

    let mut config = JobConfig::load(path, &env)?;
    config.apply_overrides(overrides);
    config.validate()?;
    Ok(config)
}
