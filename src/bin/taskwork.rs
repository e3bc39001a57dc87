//! Submits tasks to an in-process worker pool and reports their outcome.
//!
//! Usage:
//!
//! ```text
//! taskwork [--config <path>] [--caller <subject>] [--description <text>] <title>...
//! ```
//!
//! Every title becomes one task. The driver waits for all background
//! processing to finish, shuts the pool down, and writes each final task
//! record to stdout as one JSON object per line. Logs go to stderr.

use clap::Parser;
use mockable::DefaultClock;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use taskwork::config::{AppConfig, ConfigError};
use taskwork::identity::{CallerIdentity, IdentityError};
use taskwork::logging::{LoggingError, init_tracing};
use taskwork::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{NewTask, Task},
    services::{RetryPolicy, TaskService, TaskServiceError},
};
use taskwork::worker::{SimulatedWork, WorkerPool};
use thiserror::Error;

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "taskwork", about = "Submit tasks to a bounded worker pool")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Authenticated subject to attribute submissions to.
    #[arg(long)]
    caller: Option<String>,

    /// Description attached to every submitted task.
    #[arg(long, default_value = "")]
    description: String,

    /// Titles of the tasks to submit.
    #[arg(required = true)]
    titles: Vec<String>,
}

/// Errors that can occur while driving the pool.
#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Logging(#[from] LoggingError),
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error("runtime init failed: {0}")]
    RuntimeInit(#[source] io::Error),
    #[error(transparent)]
    Service(#[from] TaskServiceError),
    #[error("failed to encode task: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),
}

fn main() -> Result<(), BoxError> {
    run(Args::parse()).map_err(Into::into)
}

fn run(args: Args) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    init_tracing(&config.logging)?;
    let caller = args.caller.map(CallerIdentity::new).transpose()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::RuntimeInit)?;
    let tasks = runtime.block_on(submit_and_wait(
        &config,
        caller.as_ref(),
        &args.description,
        args.titles,
    ))?;

    write_tasks(&mut io::stdout().lock(), &tasks)
}

fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut config = path.map_or_else(|| Ok(AppConfig::default()), AppConfig::load)?;
    config.apply_env_overrides()?;
    config.validate()?;
    Ok(config)
}

async fn submit_and_wait(
    config: &AppConfig,
    caller: Option<&CallerIdentity>,
    description: &str,
    titles: Vec<String>,
) -> Result<Vec<Task>, CliError> {
    let clock = Arc::new(DefaultClock);
    let work = Arc::new(SimulatedWork::new(config.processor.work_duration()));
    let pool = WorkerPool::start(&config.processor, work, Arc::clone(&clock))?;
    let service = TaskService::new(
        Arc::new(InMemoryTaskRepository::new()),
        Arc::new(pool),
        clock,
    )
    .with_retry_policy(RetryPolicy::from(&config.retry));

    let mut ids = Vec::with_capacity(titles.len());
    for title in titles {
        let new_task = NewTask::new(title).with_description(description);
        let accepted = match caller {
            Some(identity) => service.submit_task_for(identity, new_task).await?,
            None => service.submit_task(new_task).await?,
        };
        ids.push(accepted.id());
    }

    while service.in_flight() > 0 {
        tokio::time::sleep(POLL_INTERVAL).await;
    }
    service.shutdown().await;

    let mut finished = Vec::with_capacity(ids.len());
    for id in ids {
        finished.push(service.get_task_status(id).await?);
    }
    Ok(finished)
}

fn write_tasks(out: &mut impl Write, tasks: &[Task]) -> Result<(), CliError> {
    for task in tasks {
        serde_json::to_writer(&mut *out, task)?;
        writeln!(out).map_err(CliError::Output)?;
    }
    out.flush().map_err(CliError::Output)
}
