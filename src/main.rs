mod cli;
mod commands;
mod error;

use crate::cli::{Cli, Command};
use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use fastdog_config::Config;
use fastdog_server::AppState;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_FILTER: &str = "fastdog=info,tower_http=info";

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err:?}");
            return ExitCode::from(2);
        },
    };
    init_tracing(&config);

    match run(cli.command, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = ?err, "command failed");
            eprintln!("error: {err:?}");
            ExitCode::FAILURE
        },
    }
}

/// `RUST_LOG` wins over the configured filter, which wins over the default.
fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter.as_deref().unwrap_or(DEFAULT_FILTER)));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(command: Command, mut config: Config) -> Result<()> {
    match command {
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                config.bind = bind;
            }
            serve(config)
        },
        Command::Transcode { input, output } => {
            commands::transcode(&input, output.as_deref(), std::io::stdout().lock())?;
            Ok(())
        },
        Command::Decode { input, output: Some(output) } => {
            let file = std::fs::File::create(&output).or_raise(|| ErrorKind::Write(output.clone()))?;
            commands::decode(&input, std::io::BufWriter::new(file), &output)
        },
        Command::Decode { input, output: None } => {
            let mut stdout = std::io::stdout().lock();
            commands::decode(&input, &mut stdout, Path::new("-"))?;
            writeln!(stdout).or_raise(|| ErrorKind::Write("-".into()))
        },
        Command::Inspect { input } => commands::inspect(&input, std::io::stdout().lock()),
    }
}

fn serve(config: Config) -> Result<()> {
    let state = AppState::from_config(&config).or_raise(|| ErrorKind::Server)?;
    tracing::info!(
        bind = %config.bind,
        models_dir = %config.models_dir.display(),
        static_dir = %config.static_dir.display(),
        api_prefix = %config.api_prefix,
        cache_capacity = config.cache.capacity.get(),
        "starting server"
    );
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .or_raise(|| ErrorKind::Runtime)?;
    runtime
        .block_on(fastdog_server::serve(config.bind, state))
        .or_raise(|| ErrorKind::Server)
}
