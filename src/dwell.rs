use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Dwell threshold for in-game letter targets.
pub const TARGET_DWELL_MS: u64 = 1000;
/// Dwell threshold for menu items. Deliberately longer than the target
/// threshold so stray glances across a menu don't trigger navigation.
pub const MENU_DWELL_MS: u64 = 2000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DwellEvent {
    None,
    Confirmed,
}

/// Per-candidate hover-duration timer.
///
/// A candidate accumulates dwell only while it is continuously hovered; a
/// single tick outside clears its start time. `Confirmed` keeps firing every
/// tick once the threshold is crossed; the tracker does not auto-reset, so
/// callers must take the candidate out of eligibility (or call [`clear`])
/// when they act on a confirmation.
///
/// [`clear`]: DwellTracker::clear
#[derive(Debug)]
pub struct DwellTracker {
    threshold: Duration,
    start_times: HashMap<usize, Instant>,
}

impl DwellTracker {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            start_times: HashMap::new(),
        }
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    pub fn update(&mut self, id: usize, inside: bool, now: Instant) -> DwellEvent {
        if !inside {
            self.start_times.remove(&id);
            return DwellEvent::None;
        }
        let start = *self.start_times.entry(id).or_insert(now);
        if now.duration_since(start) >= self.threshold {
            DwellEvent::Confirmed
        } else {
            DwellEvent::None
        }
    }

    /// Fraction of the threshold elapsed for `id`, clamped to `0.0..=1.0`.
    pub fn progress(&self, id: usize, now: Instant) -> f64 {
        match self.start_times.get(&id) {
            Some(start) => {
                let elapsed = now.duration_since(*start).as_secs_f64();
                (elapsed / self.threshold.as_secs_f64()).min(1.0)
            }
            None => 0.0,
        }
    }

    /// Whether a dwell is in progress (or confirmed) for `id`.
    pub fn is_active(&self, id: usize) -> bool {
        self.start_times.contains_key(&id)
    }

    pub fn clear(&mut self, id: usize) {
        self.start_times.remove(&id);
    }

    pub fn clear_all(&mut self) {
        self.start_times.clear();
    }
}
