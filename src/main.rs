//! Threads Downloader - CLI entry point.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, EnvFilter};

use threads_downloader::{
    cli::{Args, Command, DownloadArgs},
    command::{serve, OrchestratorHandle, Response},
    config::{validate_config, validate_settings, Config, Settings, SettingsHandle},
    download::{EventBus, HttpDownloader, Notification, Orchestrator, OrchestratorOptions},
    error::{exit_codes, Error, Result},
    fs::{download_root, sanitize_owner},
    output::{
        create_item_bar, follow_batch, print_banner, print_batch_stats, print_config_summary,
        print_error, print_info, print_status, print_success, print_warning, BatchOutcome,
        BatchStats,
    },
    store::{JsonFileStore, KeyValueStore, QueueStore},
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            match e {
                Error::Config(_) | Error::ConfigValidation { .. } | Error::TomlParse(_) => {
                    ExitCode::from(exit_codes::CONFIG_ERROR as u8)
                }
                Error::Download(_)
                | Error::HttpStatus { .. }
                | Error::Http(_)
                | Error::NoValidUrls
                | Error::NoSavedState
                | Error::Rejected(_) => ExitCode::from(exit_codes::DOWNLOAD_ERROR as u8),
                _ => ExitCode::from(exit_codes::UNEXPECTED_ERROR as u8),
            }
        }
    }
}

async fn run() -> Result<i32> {
    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging; stdout carries protocol lines in serve mode
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let interactive = !matches!(args.command, Command::Serve);
    if interactive {
        print_banner();
    }

    // Load configuration
    let mut config = if args.config.exists() {
        Config::load(&args.config)?
    } else {
        tracing::debug!(
            "Configuration file not found: {}, using defaults",
            args.config.display()
        );
        Config::default()
    };

    // Merge CLI arguments into config
    args.merge_into_config(&mut config);

    // Validate configuration
    validate_config(&config)?;

    let store: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::new(config.state_file()));
    let queue_store = QueueStore::new(Arc::clone(&store));
    let settings = Settings::load(store.as_ref(), config.rate_limit.settings()).await;
    let root = download_root(&config);

    if interactive {
        print_config_summary(
            &root.display().to_string(),
            &config.state_file().display().to_string(),
            settings.inter_item_delay_ms,
            settings.milestone_cooldown_ms,
        );
    }

    let orchestrator = Orchestrator::new(
        queue_store.clone(),
        Arc::new(HttpDownloader::new(&config.options.user_agent)?),
        SettingsHandle::new(settings),
        EventBus::new(),
        OrchestratorOptions {
            download_root: root,
            skip_existing: config.options.skip_existing,
        },
    );
    let (handle, task) = orchestrator.spawn();

    let code = match args.command {
        Command::Serve => {
            serve(handle.clone(), tokio::io::stdin(), tokio::io::stdout()).await?;
            exit_codes::SUCCESS
        }
        Command::Download(download) => run_download(&handle, download, settings).await?,
        Command::Resume => run_resume(&handle, &queue_store).await?,
        Command::Status => {
            let mut report = handle.status().await?;
            if let Some(saved) = queue_store.load().await? {
                report.queue_length = saved.remaining();
                report.download_count = saved.completed_count;
                report.total_files = saved.total_files;
            }
            print_status(&report);
            exit_codes::SUCCESS
        }
        Command::Clear => {
            handle.clear().await?.into_result()?;
            print_success("Saved download state cleared");
            exit_codes::SUCCESS
        }
        Command::Settings(requested) => {
            let requested = requested.settings();
            validate_settings(&requested)?;
            handle.update_settings(requested).await?.into_result()?;
            print_success(&format!(
                "Settings saved: {}ms between downloads, {}ms after every 100",
                requested.inter_item_delay_ms, requested.milestone_cooldown_ms
            ));
            exit_codes::SUCCESS
        }
    };

    // Dropping the last handle lets the orchestrator finish its in-flight file.
    drop(handle);
    if let Err(e) = task.await {
        tracing::warn!("Orchestrator task ended abnormally: {}", e);
    }

    Ok(code)
}

/// Enqueue a new batch and follow it to the end.
async fn run_download(
    handle: &OrchestratorHandle,
    args: DownloadArgs,
    current: Settings,
) -> Result<i32> {
    if let Some(requested) = args.settings_override(current) {
        validate_settings(&requested)?;
        handle.update_settings(requested).await?.into_result()?;
    }

    let mut urls = args.urls.clone();
    if let Some(path) = &args.urls_file {
        urls.extend(read_urls_file(path).await?);
    }
    if urls.is_empty() {
        return Err(Error::NoValidUrls);
    }

    let owner = sanitize_owner(&args.user);
    let events = handle.subscribe();
    let (queued, skipped) = match handle.enqueue(urls, &args.user).await?.into_result()? {
        Response::Enqueued {
            queued, skipped, ..
        } => (queued, skipped),
        other => {
            return Err(Error::Protocol(format!(
                "Unexpected response to enqueue: {:?}",
                other
            )))
        }
    };

    print_info(&format!(
        "Queued {} files for {} ({} already downloaded)",
        queued, owner, skipped
    ));

    follow(handle, events, BatchStats::new(owner, queued + skipped, skipped)).await
}

/// Resume the saved batch and follow it to the end.
async fn run_resume(handle: &OrchestratorHandle, queue_store: &QueueStore) -> Result<i32> {
    let saved = queue_store.load().await?.ok_or(Error::NoSavedState)?;
    let events = handle.subscribe();
    handle.resume().await?.into_result()?;

    print_info(&format!(
        "Resuming {}: {} of {} files left",
        saved.owner_name,
        saved.remaining(),
        saved.total_files
    ));

    let stats = BatchStats::new(saved.owner_name, saved.total_files, saved.completed_count);
    follow(handle, events, stats).await
}

/// Show progress until the batch ends; Ctrl-C stops it and keeps it resumable.
async fn follow(
    handle: &OrchestratorHandle,
    events: broadcast::Receiver<Notification>,
    stats: BatchStats,
) -> Result<i32> {
    let stopper = handle.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            print_warning("Stopping after the current file...");
            if let Err(e) = stopper.stop().await {
                tracing::warn!("Failed to request stop: {}", e);
            }
        }
    });

    let bar = create_item_bar(stats.total_files as u64, &stats.owner_name);
    let stats = follow_batch(events, &bar, stats).await;
    interrupt.abort();

    print_batch_stats(&stats);
    Ok(match stats.outcome {
        BatchOutcome::Complete => exit_codes::SUCCESS,
        BatchOutcome::Stopped | BatchOutcome::Interrupted => exit_codes::ABORT,
    })
}

/// Read one URL per line, ignoring blanks and `#` comments.
async fn read_urls_file(path: &Path) -> Result<Vec<String>> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}
