#[macro_use]
extern crate tracing;

use anyhow::{Context, Result as AnyResult};
use clap::Parser;
use cli::{Cli, Command};
use configs::GlobalConfig;
use session::Session;
use std::{num::NonZeroUsize, process::ExitCode};
use tokio::io::{stdin, stdout, BufReader};
use tracing_subscriber::EnvFilter;
use view::{DetailPane, ListPane};

mod cli;
mod configs;
mod error;
mod session;
mod shell;
mod store;
mod types;
mod view;

fn main() -> AnyResult<ExitCode> {
    // Load environment variables from the `.env` file
    dotenvy::dotenv().ok();
    // Initialize the logger after loading the environment variables.
    // Panes go to stdout, so logs stay on stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut app_config = GlobalConfig::load_config(cli.config.as_deref())
        .context("Failed to parse configuration files")?;
    cli.apply(&mut app_config);
    debug!("Configuration: {:?}", app_config);

    // Setup async runtime
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    if let Some(worker) = app_config.workers.and_then(NonZeroUsize::new) {
        runtime_builder.worker_threads(worker.into());
    }
    runtime_builder
        .enable_all()
        .build()
        .context("Failed to bootstrap the Tokio runtime")?
        .block_on(run(cli.command.unwrap_or(Command::Shell), app_config))
}

async fn run(command: Command, app_config: GlobalConfig) -> AnyResult<ExitCode> {
    let mut session = Session::load_from_config(&app_config)?;
    debug!(
        "Opened shelf with {} certificate(s), extraction mode {:?}",
        session.store().len(),
        session.mode()
    );

    let mode = session.mode();
    match command {
        Command::Open { file } => match session.upload(file).await {
            Ok(record) => println!("{}", DetailPane::new(Some(record), mode)),
            Err(alert) => {
                eprintln!("{}", alert);
                return Ok(ExitCode::FAILURE);
            }
        },
        Command::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(session.store().records())?);
            } else {
                println!("{}", ListPane::new(session.store(), None));
            }
        }
        Command::Show { name } => match session.select(&name) {
            Ok(record) => println!("{}", DetailPane::new(Some(record), mode)),
            Err(e) => {
                eprintln!("{}", e);
                return Ok(ExitCode::FAILURE);
            }
        },
        Command::Shell => {
            shell::run(&mut session, BufReader::new(stdin()), stdout()).await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
