//! Statistics reporting.

use console::style;

use crate::download::Notification;

/// How a followed batch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    Complete,
    Stopped,
    /// The orchestrator went away without a final notification.
    Interrupted,
}

/// Counters collected from the notifications of one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchStats {
    pub owner_name: String,
    pub total_files: u32,
    /// Files counted as done before this run started.
    pub already_done: u32,
    /// Files fetched during this run.
    pub fetched: u32,
    /// Latest counter reported by the orchestrator.
    pub completed: u32,
    pub cooldowns: u32,
    pub outcome: BatchOutcome,
}

impl BatchStats {
    pub fn new(owner_name: impl Into<String>, total_files: u32, already_done: u32) -> Self {
        Self {
            owner_name: owner_name.into(),
            total_files,
            already_done,
            fetched: 0,
            completed: already_done,
            cooldowns: 0,
            outcome: BatchOutcome::Interrupted,
        }
    }

    /// Fold one notification into the counters.
    pub fn record(&mut self, notification: &Notification) {
        match notification {
            Notification::Progress {
                downloaded,
                total_files,
                ..
            } => {
                self.fetched += 1;
                self.completed = *downloaded;
                self.total_files = *total_files;
            }
            Notification::CooldownStarted { .. } => self.cooldowns += 1,
            Notification::Stopped => self.outcome = BatchOutcome::Stopped,
            Notification::Complete => self.outcome = BatchOutcome::Complete,
        }
    }

    /// Files that never made it to disk in this batch.
    pub fn missing(&self) -> u32 {
        match self.outcome {
            BatchOutcome::Complete => self.total_files.saturating_sub(self.completed),
            _ => 0,
        }
    }
}

/// Print statistics for a finished or stopped batch.
pub fn print_batch_stats(stats: &BatchStats) {
    println!();
    println!(
        "{}",
        style(format!("Statistics for {}:", stats.owner_name)).bold()
    );
    println!("  Downloaded: {}", stats.fetched);
    println!("  Skipped:    {} (already on disk or done earlier)", stats.already_done);
    if stats.missing() > 0 {
        println!("  Failed:     {}", style(stats.missing()).red());
    }
    println!("  Cooldowns:  {}", stats.cooldowns);
    println!("  Progress:   {}/{}", stats.completed, stats.total_files);

    match stats.outcome {
        BatchOutcome::Complete => println!("{}", style("Batch complete").green().bold()),
        BatchOutcome::Stopped => println!(
            "{}",
            style("Batch stopped; run `resume` to continue").yellow()
        ),
        BatchOutcome::Interrupted => println!("{}", style("Batch interrupted").red()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(current: u32, downloaded: u32) -> Notification {
        Notification::Progress {
            current,
            total: 4,
            remaining: (4 - downloaded) as usize,
            downloaded,
            total_files: 4,
        }
    }

    #[test]
    fn test_complete_with_failure() {
        let mut stats = BatchStats::new("jo", 4, 1);
        for notification in [progress(2, 2), progress(4, 3), Notification::Complete] {
            stats.record(&notification);
        }

        assert_eq!(stats.fetched, 2);
        assert_eq!(stats.completed, 3);
        assert_eq!(stats.outcome, BatchOutcome::Complete);
        assert_eq!(stats.missing(), 1);
    }

    #[test]
    fn test_stopped_batch_has_nothing_missing() {
        let mut stats = BatchStats::new("jo", 4, 0);
        stats.record(&progress(1, 1));
        stats.record(&Notification::CooldownStarted { duration: 60_000 });
        stats.record(&Notification::Stopped);

        assert_eq!(stats.cooldowns, 1);
        assert_eq!(stats.outcome, BatchOutcome::Stopped);
        assert_eq!(stats.missing(), 0);
    }
}
