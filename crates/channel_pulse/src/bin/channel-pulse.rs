use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::Context;
use apalis::{
    layers::{retry::RetryPolicy, sentry::SentryLayer},
    prelude::*,
};
use apalis_cron::{CronStream, Tick};
use channel_datastore::PgDataStore;
use channel_pulse::{
    openai::OpenAIClient,
    tracing::init_tracing_subscriber,
    yt::{data_api::DataApiClient, transcript::TimedTextClient},
    AppConfig, ChannelProcessorBuilder, FailureLog,
};
use clap::{Parser, Subcommand};
use cron::Schedule;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "channel-pulse", about = "YouTube channel digest pipeline")]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(long, env = "CHANNEL_PULSE_CONFIG", default_value = "config.yaml")]
    config: PathBuf,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_key: Option<String>,

    /// YouTube Data API key
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    youtube_key: Option<String>,

    /// Database connection URL (falls back to the config file)
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    /// Where to append records for rows the store rejected
    #[arg(long, default_value = "failed_upserts.jsonl")]
    failure_log: PathBuf,

    /// Items enriched concurrently within a channel
    #[arg(long, default_value = "1")]
    concurrency: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the pipeline once and exit
    Run,
    /// Start the cron scheduler
    Cron {
        /// Cron schedule expression
        #[arg(long, env = "CRON_SCHEDULE", default_value = "0 0 */4 * * *")]
        schedule: String,
    },
    /// Manage the channel registry in the configuration file
    Channels {
        #[command(subcommand)]
        action: ChannelCommand,
    },
}

#[derive(Subcommand)]
enum ChannelCommand {
    /// List channels
    List {
        /// Include disabled channels
        #[arg(long, short)]
        all: bool,
    },
    /// Add a new channel
    Add {
        /// YouTube channel ID
        id: String,
        /// Channel name/description
        name: String,
        /// Add the channel in disabled state
        #[arg(long)]
        disabled: bool,
    },
    /// Remove a channel
    Remove { id: String },
    /// Enable a channel
    Enable { id: String },
    /// Disable a channel
    Disable { id: String },
    /// Rename a channel
    Rename { id: String, name: String },
}

#[derive(Clone)]
struct PipelineSettings {
    config_path: PathBuf,
    openai_key: String,
    youtube_key: String,
    database_url: Option<String>,
    failure_log: PathBuf,
    concurrency: usize,
}

async fn run_pipeline(settings: &PipelineSettings, cancel: CancellationToken) -> anyhow::Result<()> {
    // config is re-read every run so registry edits apply without a restart
    let config = AppConfig::load(&settings.config_path)?;
    config.validate()?;

    let database_url = settings
        .database_url
        .clone()
        .or_else(|| config.database.url.clone())
        .context("No database URL configured (set DATABASE_URL or database.url)")?;

    let store = PgDataStore::init(&database_url).await?;

    let channels = config.enabled_channels();
    tracing::info!(
        channels = channels.len(),
        max_results = config.youtube.max_results,
        "Starting pipeline run"
    );

    let processor = ChannelProcessorBuilder::new()
        .store(store)
        .lister(DataApiClient::new(&settings.youtube_key))
        .transcript_fetcher(TimedTextClient::new())
        .summarizer(OpenAIClient::new(&settings.openai_key))
        .prompt(config.openai.clone())
        .max_results(config.youtube.max_results)
        .concurrency(settings.concurrency)
        .cancel_token(cancel)
        .failure_log(FailureLog::new(&settings.failure_log))
        .build();

    let report = processor.run(&channels).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

async fn handle_tick(_tick: Tick, settings: Data<PipelineSettings>) -> anyhow::Result<()> {
    tracing::info!("Running scheduled pipeline...");
    run_pipeline(&settings, CancellationToken::new()).await
}

fn manage_channels(config_path: &Path, action: ChannelCommand) -> anyhow::Result<()> {
    let mut config = AppConfig::load(config_path)?;

    match action {
        ChannelCommand::List { all } => {
            let channels = if all {
                config.channels.clone()
            } else {
                config.enabled_channels()
            };
            if channels.is_empty() {
                println!("No channels configured.");
                return Ok(());
            }
            println!("{:<30} {:<30} {:<10}", "ID", "Name", "Status");
            for channel in &channels {
                let status = if channel.enabled { "enabled" } else { "disabled" };
                println!("{:<30} {:<30} {:<10}", channel.id, channel.name, status);
            }
            println!("Total: {} channel(s)", channels.len());
            return Ok(());
        }
        ChannelCommand::Add { id, name, disabled } => {
            config.add_channel(&id, &name, !disabled)?;
            println!("Added channel '{name}' ({id})");
        }
        ChannelCommand::Remove { id } => {
            config.remove_channel(&id)?;
            println!("Removed channel {id}");
        }
        ChannelCommand::Enable { id } => {
            config.set_channel_enabled(&id, true)?;
            println!("Enabled channel {id}");
        }
        ChannelCommand::Disable { id } => {
            config.set_channel_enabled(&id, false)?;
            println!("Disabled channel {id}");
        }
        ChannelCommand::Rename { id, name } => {
            config.rename_channel(&id, &name)?;
            println!("Renamed channel {id} to '{name}'");
        }
    }

    config.save(config_path)?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let _guard = sentry::init((
        std::env::var("SENTRY_DSN").unwrap_or_default(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some("production".into()),
            ..Default::default()
        },
    ));

    let cli = Cli::parse();
    init_tracing_subscriber()?;

    match cli.command {
        Command::Channels { action } => manage_channels(&cli.config, action),
        command => {
            let settings = PipelineSettings {
                config_path: cli.config,
                openai_key: cli.openai_key.context("OPENAI_API_KEY not set")?,
                youtube_key: cli.youtube_key.context("YOUTUBE_API_KEY not set")?,
                database_url: cli.database_url,
                failure_log: cli.failure_log,
                concurrency: cli.concurrency.max(1),
            };

            match command {
                Command::Run => {
                    let cancel = CancellationToken::new();
                    let interrupt = cancel.clone();
                    tokio::spawn(async move {
                        if tokio::signal::ctrl_c().await.is_ok() {
                            tracing::warn!(
                                "Interrupt received, letting in-flight items finish..."
                            );
                            interrupt.cancel();
                        }
                    });

                    tracing::info!("Running pipeline once...");
                    run_pipeline(&settings, cancel).await
                }
                Command::Cron { schedule } => {
                    tracing::info!(%schedule, "Starting cron scheduler...");
                    let schedule = Schedule::from_str(&schedule)?;

                    let worker = WorkerBuilder::new("channel-pulse-cron")
                        .backend(CronStream::new(schedule))
                        .retry(RetryPolicy::retries(3))
                        .layer(SentryLayer::new())
                        .data(settings)
                        .build(handle_tick);

                    worker.run().await?;
                    Ok(())
                }
                Command::Channels { .. } => unreachable!("handled above"),
            }
        }
    }
}
