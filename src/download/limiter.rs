//! Dispatch gating: inter-item delay and milestone cooldowns.
//!
//! The limiter is a small state machine with three effective states:
//!
//! - **Ready**: the next item may be dispatched now.
//! - **InterItemWait**: the last dispatch was less than the configured delay
//!   ago.
//! - **MilestoneCooldown**: the completed counter crossed a multiple of
//!   [`MILESTONE_INTERVAL`] and the scheduler pauses for the bulk cooldown.
//!
//! The limiter never sleeps itself. It reports the instant the caller should
//! come back at, and the orchestrator schedules its next iteration there.

use std::time::Duration;

use tokio::time::Instant;

use crate::config::Settings;

/// Completed items between two bulk cooldowns.
pub const MILESTONE_INTERVAL: u32 = 100;

/// Milestone already reached by `completed` (rounded down to the interval).
pub fn milestone_for(completed: u32) -> u32 {
    completed / MILESTONE_INTERVAL * MILESTONE_INTERVAL
}

/// Decision for one scheduling pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Dispatch now.
    Ready,

    /// Wait out the remainder of the inter-item delay.
    InterItemWait { until: Instant },

    /// A milestone was just crossed; a new cooldown window starts.
    CooldownStarted {
        milestone: u32,
        until: Instant,
        duration: Duration,
    },

    /// Still inside a cooldown window started earlier.
    Cooldown { until: Instant },
}

/// Transient rate limiter state. Never persisted.
#[derive(Debug, Default)]
pub struct RateLimiter {
    last_dispatch: Option<Instant>,
    cooldown_until: Option<Instant>,
    last_milestone: u32,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepare for a fresh batch whose counter starts at `completed`.
    ///
    /// Any cooldown window is dropped. The last dispatch time is kept so the
    /// delay between two downloads also holds across batches.
    pub fn begin_batch(&mut self, completed: u32) {
        self.cooldown_until = None;
        self.last_milestone = milestone_for(completed);
    }

    /// Re-derive the milestone from a counter restored from storage.
    ///
    /// A batch stopped exactly on a multiple of the interval must not pay the
    /// cooldown a second time.
    pub fn resume(&mut self, completed: u32) {
        self.last_milestone = milestone_for(completed);
    }

    pub fn last_milestone(&self) -> u32 {
        self.last_milestone
    }

    pub fn cooldown_until(&self) -> Option<Instant> {
        self.cooldown_until
    }

    /// Record a finished dispatch.
    pub fn record_dispatch(&mut self, at: Instant) {
        self.last_dispatch = Some(at);
    }

    /// Start a cooldown if `completed` sits on a milestone not handled yet.
    ///
    /// Fires once per milestone even if the counter stays on it across
    /// several passes.
    pub fn check_milestone(
        &mut self,
        completed: u32,
        now: Instant,
        cooldown: Duration,
    ) -> Option<Instant> {
        if completed == 0 || completed % MILESTONE_INTERVAL != 0 {
            return None;
        }

        let milestone = milestone_for(completed);
        if milestone <= self.last_milestone {
            return None;
        }

        self.last_milestone = milestone;
        let until = now + cooldown;
        self.cooldown_until = Some(until);
        Some(until)
    }

    /// End of the current cooldown window, if `now` is inside one.
    pub fn cooldown_remaining(&self, now: Instant) -> Option<Instant> {
        self.cooldown_until.filter(|until| now < *until)
    }

    /// Earliest instant the next dispatch may start, if that is in the future.
    pub fn inter_item_wait(&self, now: Instant, delay: Duration) -> Option<Instant> {
        let ready_at = self.last_dispatch? + delay;
        (now < ready_at).then_some(ready_at)
    }

    /// Evaluate all rules, in order: new milestone, open cooldown, delay.
    pub fn gate(&mut self, completed: u32, now: Instant, settings: &Settings) -> Gate {
        let cooldown = settings.milestone_cooldown();
        if let Some(until) = self.check_milestone(completed, now, cooldown) {
            return Gate::CooldownStarted {
                milestone: self.last_milestone,
                until,
                duration: cooldown,
            };
        }

        if let Some(until) = self.cooldown_remaining(now) {
            return Gate::Cooldown { until };
        }

        if let Some(until) = self.inter_item_wait(now, settings.inter_item_delay()) {
            return Gate::InterItemWait { until };
        }

        Gate::Ready
    }
}
