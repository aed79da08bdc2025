//! Client-side pacing of outbound analysis calls.

use chrono::NaiveDate;
use log::{debug, info};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::ai::clock::Clock;

/// Calls made today against a fixed daily ceiling. Rolls over to zero the first time it is
/// touched on a new calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyCounter {
    count: u32,
    day: NaiveDate,
    ceiling: u32,
}

impl DailyCounter {
    pub fn new(ceiling: u32, today: NaiveDate) -> Self {
        Self {
            count: 0,
            day: today,
            ceiling,
        }
    }

    /// Counts one call and returns the number of calls made today.
    pub fn record(&mut self, today: NaiveDate) -> u32 {
        self.roll_over(today);
        self.count += 1;
        self.count
    }

    pub fn remaining(&mut self, today: NaiveDate) -> u32 {
        self.roll_over(today);
        self.ceiling.saturating_sub(self.count)
    }

    pub fn used(&mut self, today: NaiveDate) -> u32 {
        self.roll_over(today);
        self.count
    }

    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    fn roll_over(&mut self, today: NaiveDate) {
        if today != self.day {
            debug!("New day {today}, resetting request count");
            self.count = 0;
            self.day = today;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimits {
    pub min_interval: Duration,
    pub daily_limit: u32,
}

#[derive(Debug)]
struct GovernorState {
    counter: DailyCounter,
    next_slot: Option<Instant>,
}

/// Daily quota plus a minimum spacing between dispatches, owned by one client instance.
pub struct RateGovernor {
    clock: Arc<dyn Clock>,
    limits: RateLimits,
    state: Mutex<GovernorState>,
}

impl RateGovernor {
    pub fn new(clock: Arc<dyn Clock>, limits: RateLimits) -> Self {
        let counter = DailyCounter::new(limits.daily_limit, clock.today());
        Self {
            clock,
            limits,
            state: Mutex::new(GovernorState {
                counter,
                next_slot: None,
            }),
        }
    }

    pub fn limits(&self) -> RateLimits {
        self.limits
    }

    pub fn remaining(&self) -> u32 {
        let today = self.clock.today();
        self.lock().counter.remaining(today)
    }

    /// Counts one outbound call and returns today's total.
    pub fn record_call(&self) -> u32 {
        let today = self.clock.today();
        let used = self.lock().counter.record(today);
        info!(
            "Requests used today: {used}/{}",
            self.limits.daily_limit
        );
        used
    }

    /// Waits until the minimum interval since the previous dispatch has passed. Returns how
    /// long the caller was held back.
    ///
    /// The slot is reserved under the lock before sleeping, so concurrent callers queue up
    /// one interval apart instead of racing on the same timestamp.
    pub async fn pace(&self) -> Duration {
        let now = self.clock.now();
        let wait = {
            let mut state = self.lock();
            let slot = match state.next_slot {
                Some(slot) if slot > now => slot,
                _ => now,
            };
            state.next_slot = Some(slot.checked_add(self.limits.min_interval).unwrap_or(slot));
            slot - now
        };

        if !wait.is_zero() {
            debug!("Rate limiting: waiting {}ms before next analysis", wait.as_millis());
            self.clock.sleep(wait).await;
        }
        wait
    }

    fn lock(&self) -> MutexGuard<'_, GovernorState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
