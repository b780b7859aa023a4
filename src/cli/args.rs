//! Command-line argument definitions using clap.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{Config, Settings};

/// Threads media downloader CLI.
#[derive(Parser, Debug)]
#[command(
    name = "threads-downloader",
    version,
    about = "Download Threads media into per-profile folders",
    long_about = "A rate-limited, resumable downloader for media URLs collected from Threads profiles.\n\n\
                  Batches survive restarts: stop with Ctrl-C and pick up later with `resume`."
)]
pub struct Args {
    /// Path to configuration file.
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: PathBuf,

    /// Base directory for downloads.
    #[arg(short = 'd', long = "directory", global = true)]
    pub download_directory: Option<PathBuf>,

    /// File holding the saved queue and settings.
    #[arg(long = "state-file", env = "THREADS_DOWNLOADER_STATE", global = true)]
    pub state_file: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// What to do.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve JSON commands on stdin, one per line, until end of input.
    Serve,

    /// Download a new batch of media URLs.
    Download(DownloadArgs),

    /// Continue the saved batch.
    Resume,

    /// Show queue and cooldown status.
    Status,

    /// Discard the saved batch.
    Clear,

    /// Change and store the rate-limit settings.
    Settings(SettingsArgs),
}

/// Arguments of the `download` command.
#[derive(ClapArgs, Debug)]
pub struct DownloadArgs {
    /// Profile the media belongs to; names the download folder.
    #[arg(short, long)]
    pub user: String,

    /// Read media URLs from a file, one per line.
    #[arg(short = 'f', long = "urls-file")]
    pub urls_file: Option<PathBuf>,

    /// Media URLs to download.
    pub urls: Vec<String>,

    /// Milliseconds between two downloads.
    #[arg(long = "cooldown-ms")]
    pub cooldown_ms: Option<u64>,

    /// Milliseconds to pause after every 100 downloads.
    #[arg(long = "cooldown-after-100")]
    pub cooldown_after_100: Option<u64>,

    /// Download files again even if a finished copy exists.
    #[arg(long)]
    pub no_skip_existing: bool,
}

impl DownloadArgs {
    /// Settings requested on the command line, filled up from `current`.
    pub fn settings_override(&self, current: Settings) -> Option<Settings> {
        if self.cooldown_ms.is_none() && self.cooldown_after_100.is_none() {
            return None;
        }

        Some(Settings {
            inter_item_delay_ms: self.cooldown_ms.unwrap_or(current.inter_item_delay_ms),
            milestone_cooldown_ms: self
                .cooldown_after_100
                .unwrap_or(current.milestone_cooldown_ms),
        })
    }
}

/// Arguments of the `settings` command.
#[derive(ClapArgs, Debug)]
pub struct SettingsArgs {
    /// Milliseconds between two downloads (500-60000).
    #[arg(long = "cooldown-ms")]
    pub cooldown_ms: u64,

    /// Milliseconds to pause after every 100 downloads (60000-3600000).
    #[arg(long = "cooldown-after-100")]
    pub cooldown_after_100: u64,
}

impl SettingsArgs {
    pub fn settings(&self) -> Settings {
        Settings {
            inter_item_delay_ms: self.cooldown_ms,
            milestone_cooldown_ms: self.cooldown_after_100,
        }
    }
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(&self, config: &mut Config) {
        if let Some(dir) = &self.download_directory {
            config.options.download_directory = Some(dir.clone());
        }

        if let Some(state_file) = &self.state_file {
            config.options.state_file = Some(state_file.clone());
        }

        // Boolean flags (only override if set to non-default)
        if let Command::Download(download) = &self.command {
            if download.no_skip_existing {
                config.options.skip_existing = false;
            }
        }
    }
}
