//! Progress bar utilities.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::download::Notification;
use crate::output::stats::BatchStats;

/// Create a progress bar for item counts.
pub fn create_item_bar(total: u64, message: &str) -> ProgressBar {
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    bar.set_prefix(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Drive `bar` from notifications until the batch stops or completes.
pub async fn follow_batch(
    mut events: broadcast::Receiver<Notification>,
    bar: &ProgressBar,
    mut stats: BatchStats,
) -> BatchStats {
    bar.set_position(stats.completed as u64);

    loop {
        let notification = match events.recv().await {
            Ok(notification) => notification,
            Err(RecvError::Lagged(missed)) => {
                tracing::debug!("Progress display skipped {} notifications", missed);
                continue;
            }
            Err(RecvError::Closed) => break,
        };

        stats.record(&notification);
        match &notification {
            Notification::Progress {
                downloaded,
                total_files,
                ..
            } => {
                bar.set_length(*total_files as u64);
                bar.set_position(*downloaded as u64);
                bar.set_message("");
            }
            Notification::CooldownStarted { duration } => {
                bar.set_message(format!("cooling down for {}s", duration / 1000));
            }
            Notification::Stopped | Notification::Complete => break,
        }
    }

    bar.finish_and_clear();
    stats
}
