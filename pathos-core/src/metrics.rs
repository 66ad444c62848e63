//! Runtime counters and step-budget monitoring.
//!
//! Counters are plain `AtomicU64`s bumped on the simulation path and read
//! when a dashboard or test asks for a [`CounterSnapshot`]. The step monitor
//! keeps a short ring of wall-clock timings behind a `parking_lot::Mutex`,
//! since it is written once per step and read rarely.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::Mutex;

// ---------------------------------------------------------------------------
// Counters
// ---------------------------------------------------------------------------

/// Event counters shared by every core of one world.
#[derive(Debug)]
pub struct EmotionCounters {
    /// Stimuli offered to an enabled core.
    pub stimuli_received: AtomicU64,
    /// Stimuli with no matching reaction rule.
    pub stimuli_unmatched: AtomicU64,
    /// Reactions scheduled for later.
    pub reactions_deferred: AtomicU64,
    /// Visible state changes committed.
    pub changes_committed: AtomicU64,
    /// Threshold and combo signals fired.
    pub behavior_signals: AtomicU64,
    /// Memory records stored.
    pub memories_recorded: AtomicU64,
    /// Memory records forgotten by decay.
    pub memories_forgotten: AtomicU64,
    /// Influence passes run.
    pub influence_passes: AtomicU64,
    /// Synthetic stimuli delivered by influence.
    pub influence_deliveries: AtomicU64,
}

impl EmotionCounters {
    /// Zeroed counters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stimuli_received: AtomicU64::new(0),
            stimuli_unmatched: AtomicU64::new(0),
            reactions_deferred: AtomicU64::new(0),
            changes_committed: AtomicU64::new(0),
            behavior_signals: AtomicU64::new(0),
            memories_recorded: AtomicU64::new(0),
            memories_forgotten: AtomicU64::new(0),
            influence_passes: AtomicU64::new(0),
            influence_deliveries: AtomicU64::new(0),
        }
    }

    /// Add `n` to a counter.
    pub fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    /// Read every counter.
    #[must_use]
    pub fn snapshot(&self) -> CounterSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        CounterSnapshot {
            stimuli_received: load(&self.stimuli_received),
            stimuli_unmatched: load(&self.stimuli_unmatched),
            reactions_deferred: load(&self.reactions_deferred),
            changes_committed: load(&self.changes_committed),
            behavior_signals: load(&self.behavior_signals),
            memories_recorded: load(&self.memories_recorded),
            memories_forgotten: load(&self.memories_forgotten),
            influence_passes: load(&self.influence_passes),
            influence_deliveries: load(&self.influence_deliveries),
        }
    }
}

impl Default for EmotionCounters {
    fn default() -> Self {
        Self::new()
    }
}

/// Counter values at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    /// Stimuli offered to an enabled core.
    pub stimuli_received: u64,
    /// Stimuli with no matching rule.
    pub stimuli_unmatched: u64,
    /// Reactions scheduled for later.
    pub reactions_deferred: u64,
    /// Visible state changes committed.
    pub changes_committed: u64,
    /// Threshold and combo signals fired.
    pub behavior_signals: u64,
    /// Memory records stored.
    pub memories_recorded: u64,
    /// Memory records forgotten.
    pub memories_forgotten: u64,
    /// Influence passes run.
    pub influence_passes: u64,
    /// Influence stimuli delivered.
    pub influence_deliveries: u64,
}

impl CounterSnapshot {
    fn rows(&self) -> [(&'static str, &'static str, u64); 9] {
        [
            ("stimuli_received", "Stimuli offered to enabled actors", self.stimuli_received),
            ("stimuli_unmatched", "Stimuli with no reaction rule", self.stimuli_unmatched),
            ("reactions_deferred", "Reactions scheduled with a delay", self.reactions_deferred),
            ("changes_committed", "Visible emotion changes", self.changes_committed),
            ("behavior_signals", "Threshold and combo signals", self.behavior_signals),
            ("memories_recorded", "Emotional memories stored", self.memories_recorded),
            ("memories_forgotten", "Emotional memories forgotten", self.memories_forgotten),
            ("influence_passes", "Influence passes run", self.influence_passes),
            ("influence_deliveries", "Influence stimuli delivered", self.influence_deliveries),
        ]
    }

    /// Format as Prometheus text exposition.
    #[must_use]
    pub fn to_prometheus(&self) -> String {
        let mut out = String::new();
        for (name, help, value) in self.rows() {
            out.push_str(&format!(
                "# HELP pathos_{name}_total {help}\n\
                 # TYPE pathos_{name}_total counter\n\
                 pathos_{name}_total {value}\n"
            ));
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Step Budget Monitor
// ---------------------------------------------------------------------------

const HISTORY_LEN: usize = 128;

/// Tracks wall time spent per simulation step against a budget.
#[derive(Debug)]
pub struct StepBudgetMonitor {
    budget_ms: f64,
    history: Mutex<StepHistory>,
}

#[derive(Debug)]
struct StepHistory {
    timings: [f64; HISTORY_LEN],
    write_idx: usize,
    count: u64,
    over_budget: u64,
}

impl StepBudgetMonitor {
    /// Monitor with `budget_ms` milliseconds per step.
    #[must_use]
    pub fn new(budget_ms: f64) -> Self {
        Self {
            budget_ms,
            history: Mutex::new(StepHistory {
                timings: [0.0; HISTORY_LEN],
                write_idx: 0,
                count: 0,
                over_budget: 0,
            }),
        }
    }

    /// Start timing a step; the elapsed time is recorded when the guard drops.
    #[must_use]
    pub fn begin_step(&self) -> StepGuard<'_> {
        StepGuard {
            monitor: self,
            start: Instant::now(),
        }
    }

    /// Record one step timing. Returns whether it exceeded the budget.
    pub fn record(&self, ms: f64) -> bool {
        let over = ms > self.budget_ms;
        let mut h = self.history.lock();
        let idx = h.write_idx;
        h.timings[idx] = ms;
        h.write_idx = (idx + 1) % HISTORY_LEN;
        h.count += 1;
        if over {
            h.over_budget += 1;
        }
        over
    }

    /// Most recent timing, or 0 before the first step.
    #[must_use]
    pub fn last_step_ms(&self) -> f64 {
        let h = self.history.lock();
        if h.count == 0 {
            return 0.0;
        }
        h.timings[(h.write_idx + HISTORY_LEN - 1) % HISTORY_LEN]
    }

    /// Worst timing still in the history window.
    #[must_use]
    pub fn max_recent_ms(&self) -> f64 {
        let h = self.history.lock();
        let n = usize::try_from(h.count).unwrap_or(HISTORY_LEN).min(HISTORY_LEN);
        h.timings[..n].iter().copied().fold(0.0, f64::max)
    }

    /// Steps recorded so far.
    #[must_use]
    pub fn step_count(&self) -> u64 {
        self.history.lock().count
    }

    /// Steps that exceeded the budget.
    #[must_use]
    pub fn over_budget_count(&self) -> u64 {
        self.history.lock().over_budget
    }

    /// Configured budget in milliseconds.
    #[must_use]
    pub fn budget_ms(&self) -> f64 {
        self.budget_ms
    }
}

/// Records elapsed time into its monitor on drop.
pub struct StepGuard<'a> {
    monitor: &'a StepBudgetMonitor,
    start: Instant,
}

impl StepGuard<'_> {
    /// Milliseconds since the guard was created.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for StepGuard<'_> {
    fn drop(&mut self) {
        let ms = self.elapsed_ms();
        if self.monitor.record(ms) {
            tracing::debug!(elapsed_ms = ms, budget_ms = self.monitor.budget_ms, "step over budget");
        }
    }
}

// ---------------------------------------------------------------------------
// Span names
// ---------------------------------------------------------------------------

/// Span names used with `tracing::span!` on the simulation path.
pub mod spans {
    /// One `EmotionWorld::step`.
    pub const STEP: &str = "pathos::step";
    /// Stimulus intake for one actor.
    pub const STIMULUS: &str = "pathos::stimulus";
    /// Decay tick across all actors.
    pub const DECAY: &str = "pathos::decay";
    /// Influence pass.
    pub const INFLUENCE: &str = "pathos::influence";
    /// Deferred reactions firing.
    pub const DEFERRED: &str = "pathos::deferred";
}
