//! The download scheduling loop.
//!
//! One [`Orchestrator`] owns the working queue, the counters and the rate
//! limiter. It runs as a single task: commands, timer wake-ups and dispatch
//! completions are handled one at a time, so no state is shared and no locks
//! are needed. Each loop iteration does at most one unit of work and then
//! schedules its own re-entry with [`Orchestrator::schedule_at`].
//!
//! The fetch itself runs on a spawned task so status requests are still
//! answered while a file downloads. Only one fetch is in flight at a time
//! and the timer never fires while one is.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;

use crate::command::{Envelope, OrchestratorHandle, Request, Response, StatusReport};
use crate::config::{Settings, SettingsHandle};
use crate::download::events::{EventBus, Notification};
use crate::download::fetch::Downloader;
use crate::download::limiter::{Gate, RateLimiter};
use crate::download::state::QueueState;
use crate::error::{Error, Result};
use crate::fs::{destination_path, owner_folder, sanitize_owner, scan_completed_indices};
use crate::media::{is_acceptable_media_url, QueueItem};
use crate::store::QueueStore;

/// Commands buffered before senders wait.
const COMMAND_BUFFER: usize = 32;

/// Lifecycle of the scheduling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No work, nothing scheduled.
    Idle,
    /// The loop is scheduled or a fetch is in flight.
    Active,
    /// Stop requested; the next iteration halts without dispatching.
    Draining,
}

/// Orchestrator construction options.
#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    /// Namespaced root; files land in `<root>/<owner>/<filename>`.
    pub download_root: PathBuf,

    /// Count files finished by an earlier run as done when a batch starts.
    pub skip_existing: bool,
}

/// Result of one fetch, tagged with the batch it belongs to.
#[derive(Debug)]
struct DispatchOutcome {
    generation: u64,
    item: QueueItem,
    destination: PathBuf,
    result: Result<()>,
}

/// Owns all queue, counter and rate-limit state of the process.
pub struct Orchestrator {
    state: QueueState,
    phase: Phase,
    stop_requested: bool,
    limiter: RateLimiter,
    wake_at: Option<Instant>,
    // Bumped by enqueue/resume/clear so late results of an older batch are ignored.
    generation: u64,
    in_flight: Option<JoinHandle<DispatchOutcome>>,
    store: QueueStore,
    settings: SettingsHandle,
    events: EventBus,
    downloader: Arc<dyn Downloader>,
    options: OrchestratorOptions,
}

impl Orchestrator {
    pub fn new(
        store: QueueStore,
        downloader: Arc<dyn Downloader>,
        settings: SettingsHandle,
        events: EventBus,
        options: OrchestratorOptions,
    ) -> Self {
        Self {
            state: QueueState::default(),
            phase: Phase::Idle,
            stop_requested: false,
            limiter: RateLimiter::new(),
            wake_at: None,
            generation: 0,
            in_flight: None,
            store,
            settings,
            events,
            downloader,
            options,
        }
    }

    /// Run the orchestrator on its own task.
    ///
    /// The task ends once every [`OrchestratorHandle`] is dropped.
    pub fn spawn(self) -> (OrchestratorHandle, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(COMMAND_BUFFER);
        let handle = OrchestratorHandle::new(sender, self.events.clone());
        let task = tokio::spawn(self.run(receiver));
        (handle, task)
    }

    /// Process commands and loop iterations until the command channel closes.
    pub async fn run(mut self, mut requests: mpsc::Receiver<Envelope>) {
        self.detect_saved_state().await;

        loop {
            let wake = if self.in_flight.is_none() {
                self.wake_at
            } else {
                None
            };

            tokio::select! {
                biased;

                envelope = requests.recv() => match envelope {
                    Some(Envelope { request, reply }) => {
                        let response = self.handle_request(request).await;
                        if reply.send(response).is_err() {
                            tracing::debug!("Requester went away before the response");
                        }
                    }
                    None => break,
                },

                joined = join_in_flight(&mut self.in_flight) => {
                    self.finish_dispatch(joined).await;
                }

                () = sleep_until(wake) => {
                    self.wake_at = None;
                    self.step().await;
                }
            }
        }

        if let Some(handle) = self.in_flight.take() {
            tracing::debug!("Waiting for the last download before shutting down");
            let joined = handle.await;
            self.finish_dispatch(joined).await;
        }
    }

    /// Answer one command.
    pub async fn handle_request(&mut self, request: Request) -> Response {
        match request {
            Request::Enqueue { urls, owner_name } => {
                match self.enqueue(urls, owner_name.as_deref().unwrap_or("")).await {
                    Ok((queued, skipped)) => Response::enqueued(queued, skipped),
                    Err(e) => Response::failure(e),
                }
            }
            Request::Stop => {
                self.stop();
                Response::ack()
            }
            Request::Resume => match self.resume().await {
                Ok(()) => Response::resumed(),
                Err(e) => Response::failure(e),
            },
            Request::Clear => {
                self.clear().await;
                Response::ack()
            }
            Request::Status => Response::Status(self.status().await),
            Request::UpdateSettings {
                cooldown_ms,
                cooldown_after_100,
            } => {
                let settings = Settings {
                    inter_item_delay_ms: cooldown_ms,
                    milestone_cooldown_ms: cooldown_after_100,
                };
                match self.update_settings(settings).await {
                    Ok(()) => Response::ack(),
                    Err(e) => Response::failure(e),
                }
            }
        }
    }

    /// Start a fresh batch. Returns `(queued, skipped)`.
    ///
    /// Invalid URLs are dropped; a batch without any valid URL is rejected
    /// and leaves the current state untouched.
    pub async fn enqueue(&mut self, urls: Vec<String>, owner_name: &str) -> Result<(u32, u32)> {
        let owner = sanitize_owner(owner_name);
        let received = urls.len();
        let valid: Vec<String> = urls
            .into_iter()
            .filter(|url| is_acceptable_media_url(url))
            .collect();

        tracing::info!(
            "Received {} URLs for {}: {} valid, {} invalid",
            received,
            owner,
            valid.len(),
            received - valid.len()
        );

        if valid.is_empty() {
            return Err(Error::NoValidUrls);
        }

        let total = u32::try_from(valid.len())
            .map_err(|_| Error::InvalidUrl(format!("batch of {} URLs is too large", valid.len())))?;

        let existing = if self.options.skip_existing {
            let dir = owner_folder(&self.options.download_root, &owner);
            match scan_completed_indices(&dir, &owner, total).await {
                Ok(found) => found,
                Err(e) => {
                    tracing::warn!("Error checking existing files, downloading all: {}", e);
                    HashSet::new()
                }
            }
        } else {
            HashSet::new()
        };

        let mut state = QueueState::new(owner.clone(), total);
        let mut skipped = 0;
        for (index, url) in (1..=total).zip(valid) {
            if existing.contains(&index) {
                state.mark_completed();
                skipped += 1;
            } else {
                state.items.push_back(QueueItem::new(url, owner.clone(), index, total));
            }
        }

        if skipped > 0 {
            tracing::info!(
                "Skipped {} already downloaded files, starting from file {}",
                skipped,
                state
                    .items
                    .front()
                    .map(|item| item.index.to_string())
                    .unwrap_or_else(|| "none".to_string())
            );
        }

        let queued = state.items.len() as u32;
        self.generation += 1;
        self.state = state;
        self.stop_requested = false;
        self.limiter.begin_batch(self.state.completed_count);
        self.persist().await;
        self.activate();

        Ok((queued, skipped))
    }

    /// Request a stop. The loop halts at its next iteration boundary; a fetch
    /// already in flight completes first.
    pub fn stop(&mut self) {
        self.stop_requested = true;
        if self.phase != Phase::Idle {
            tracing::info!("Stop requested");
            self.phase = Phase::Draining;
            // Cancels a pending cooldown or delay wake-up.
            self.schedule_at(Instant::now());
        }
    }

    /// Reload the saved batch and continue it.
    pub async fn resume(&mut self) -> Result<()> {
        let saved = match self.store.load().await {
            Ok(Some(saved)) => saved,
            Ok(None) => return Err(Error::NoSavedState),
            Err(e) => {
                tracing::warn!("Failed to load saved state: {}", e);
                return Err(Error::Store("Failed to load saved state".to_string()));
            }
        };

        tracing::info!(
            "Resuming {}: {} remaining, {}/{} done",
            saved.owner_name,
            saved.remaining(),
            saved.completed_count,
            saved.total_files
        );

        self.generation += 1;
        self.limiter.resume(saved.completed_count);
        self.state = saved;
        self.stop_requested = false;
        self.activate();
        Ok(())
    }

    /// Discard the queue and saved state unconditionally.
    pub async fn clear(&mut self) {
        tracing::info!("Clearing download queue");
        self.generation += 1;
        self.state = QueueState::default();
        self.stop_requested = false;
        self.phase = Phase::Idle;
        self.wake_at = None;
        self.limiter.begin_batch(0);
        if let Err(e) = self.store.clear().await {
            tracing::warn!("Failed to clear saved state: {}", e);
        }
    }

    pub async fn status(&self) -> StatusReport {
        let has_saved_state = match self.store.load().await {
            Ok(saved) => saved.is_some(),
            Err(e) => {
                tracing::debug!("Failed to read saved state: {}", e);
                false
            }
        };

        StatusReport {
            is_downloading: self.phase != Phase::Idle,
            queue_length: self.state.remaining(),
            download_count: self.state.completed_count,
            total_files: self.state.total_files,
            cooldown_until: self.limiter.cooldown_until().map(epoch_millis).unwrap_or(0),
            has_saved_state,
        }
    }

    /// Validate, apply and persist new settings. Takes effect at the next
    /// scheduling decision.
    pub async fn update_settings(&mut self, settings: Settings) -> Result<()> {
        self.settings.update(settings)?;
        if let Err(e) = settings.persist(self.store.backend().as_ref()).await {
            tracing::warn!("Failed to persist settings: {}", e);
        }
        Ok(())
    }

    /// Schedule the next loop iteration, replacing any pending one.
    pub fn schedule_at(&mut self, at: Instant) {
        self.wake_at = Some(at);
    }

    fn activate(&mut self) {
        self.phase = Phase::Active;
        self.schedule_at(Instant::now());
    }

    /// One loop iteration.
    async fn step(&mut self) {
        if self.stop_requested {
            tracing::info!("Stopping download as requested");
            self.phase = Phase::Idle;
            if self.state.is_empty() {
                // The last item finished while stopping; its completion was never saved.
                if let Err(e) = self.store.clear().await {
                    tracing::warn!("Failed to clear saved state: {}", e);
                }
            } else {
                self.persist().await;
            }
            self.events.publish(Notification::Stopped);
            return;
        }

        if self.state.is_empty() {
            tracing::info!(
                "Download complete: {}/{} files for {}",
                self.state.completed_count,
                self.state.total_files,
                self.state.owner_name
            );
            self.phase = Phase::Idle;
            self.state = QueueState::default();
            self.limiter.begin_batch(0);
            if let Err(e) = self.store.clear().await {
                tracing::warn!("Failed to clear saved state: {}", e);
            }
            self.events.publish(Notification::Complete);
            return;
        }

        let settings = self.settings.current();
        let now = Instant::now();
        match self.limiter.gate(self.state.completed_count, now, &settings) {
            Gate::CooldownStarted {
                milestone,
                until,
                duration,
            } => {
                tracing::info!(
                    "Reached {} downloads, starting {}ms cooldown",
                    milestone,
                    duration.as_millis()
                );
                self.events.publish(Notification::CooldownStarted {
                    duration: duration.as_millis() as u64,
                });
                self.schedule_at(until);
                return;
            }
            Gate::Cooldown { until } => {
                tracing::debug!(
                    "In cooldown, waiting {}ms",
                    until.saturating_duration_since(now).as_millis()
                );
                self.schedule_at(until);
                return;
            }
            Gate::InterItemWait { until } => {
                self.schedule_at(until);
                return;
            }
            Gate::Ready => {}
        }

        let Some(item) = self.state.items.pop_front() else {
            self.schedule_at(now);
            return;
        };

        if !is_acceptable_media_url(&item.url) {
            tracing::warn!("Invalid URL skipped: {}", item.url);
            self.schedule_at(now);
            return;
        }

        let destination = destination_path(&self.options.download_root, &item);
        tracing::debug!("Downloading {} to {}", item.url, destination.display());

        let downloader = Arc::clone(&self.downloader);
        let generation = self.generation;
        self.in_flight = Some(tokio::spawn(async move {
            let result = downloader.fetch(&item.url, &destination).await;
            DispatchOutcome {
                generation,
                item,
                destination,
                result,
            }
        }));
    }

    async fn finish_dispatch(&mut self, joined: std::result::Result<DispatchOutcome, JoinError>) {
        match joined {
            Err(e) => tracing::warn!("Download task failed: {}", e),
            Ok(outcome) if outcome.generation != self.generation => {
                tracing::debug!(
                    "Discarding result for {} from a previous batch",
                    outcome.destination.display()
                );
            }
            Ok(DispatchOutcome {
                item,
                destination,
                result: Err(e),
                ..
            }) => {
                tracing::warn!(
                    "Download failed for {} ({}): {}",
                    item.url,
                    destination.display(),
                    e
                );
            }
            Ok(DispatchOutcome {
                item,
                destination,
                result: Ok(()),
                ..
            }) => {
                self.state.mark_completed();
                self.limiter.record_dispatch(Instant::now());
                tracing::info!(
                    "Downloaded {}/{}: {}",
                    item.index,
                    item.total,
                    destination.display()
                );

                // A drained batch at its target is done; the next iteration clears it.
                if !(self.state.is_empty() && self.state.reached_target()) {
                    self.persist().await;
                }

                self.events.publish(Notification::Progress {
                    current: item.index,
                    total: item.total,
                    remaining: self.state.remaining(),
                    downloaded: self.state.completed_count,
                    total_files: self.state.total_files,
                });
            }
        }

        if self.phase != Phase::Idle {
            self.schedule_at(Instant::now());
        }
    }

    /// Best-effort save; the in-memory state stays authoritative.
    async fn persist(&self) {
        if let Err(e) = self.store.save(&self.state).await {
            tracing::warn!("Failed to save download state: {}", e);
        }
    }

    async fn detect_saved_state(&self) {
        match self.store.load().await {
            Ok(Some(saved)) => tracing::info!(
                "Found saved download state for {} ({} remaining) - ready to resume",
                saved.owner_name,
                saved.remaining()
            ),
            Ok(None) => {}
            Err(e) => tracing::warn!("Ignoring unreadable saved state: {}", e),
        }
    }
}

/// Sleep until `at`, or forever when nothing is scheduled.
async fn sleep_until(at: Option<Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

/// Wait for the in-flight fetch, or forever when there is none.
async fn join_in_flight(
    slot: &mut Option<JoinHandle<DispatchOutcome>>,
) -> std::result::Result<DispatchOutcome, JoinError> {
    match slot.as_mut() {
        Some(handle) => {
            let joined = handle.await;
            *slot = None;
            joined
        }
        None => std::future::pending().await,
    }
}

/// Wall-clock Unix milliseconds of a monotonic instant.
fn epoch_millis(instant: Instant) -> i64 {
    let now = Instant::now();
    let wall = chrono::Utc::now();
    let shifted = if instant >= now {
        chrono::Duration::from_std(instant - now).map(|ahead| wall + ahead)
    } else {
        chrono::Duration::from_std(now - instant).map(|behind| wall - behind)
    };
    shifted.unwrap_or(wall).timestamp_millis()
}
