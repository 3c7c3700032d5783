//! Cancellable timer queue
//!
//! Single-threaded stand-in for `setTimeout`/`setInterval`. Nothing fires on
//! its own; the owner pulls due timers with [`Timers::pop_due`]. Timers due at
//! the same instant fire in the order they were scheduled.

/// Handle returned when scheduling, used to cancel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTask {
    /// Show the next countdown value, or begin the run after the last one
    CountdownStep,
    /// Advance ball physics
    PhysicsTick,
    /// Draw the ball at the current display rate
    RenderTick,
    /// Random wait elapsed; pick a new display rate
    RateChange,
    /// Test length elapsed
    TestTimeout,
}

/// A timer that came due
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fired {
    pub id: TimerId,
    pub task: TimerTask,
    pub due_ms: f64,
}

#[derive(Debug, Clone)]
struct Timer {
    id: TimerId,
    task: TimerTask,
    due_ms: f64,
    period_ms: Option<f64>,
}

/// Smallest accepted repeat period
const MIN_PERIOD_MS: f64 = 0.001;

/// Pending one-shot and repeating timers
#[derive(Debug, Default)]
pub struct Timers {
    pending: Vec<Timer>,
    next_id: u64,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Fire `task` once, `delay_ms` after `now_ms`
    pub fn schedule_once(&mut self, now_ms: f64, delay_ms: f64, task: TimerTask) -> TimerId {
        let id = self.allocate_id();
        self.pending.push(Timer {
            id,
            task,
            due_ms: now_ms + delay_ms.max(0.0),
            period_ms: None,
        });
        id
    }

    /// Fire `task` every `period_ms`, first at `now_ms + period_ms`
    pub fn schedule_repeating(&mut self, now_ms: f64, period_ms: f64, task: TimerTask) -> TimerId {
        let period_ms = period_ms.max(MIN_PERIOD_MS);
        let id = self.allocate_id();
        self.pending.push(Timer {
            id,
            task,
            due_ms: now_ms + period_ms,
            period_ms: Some(period_ms),
        });
        id
    }

    /// Cancel a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|t| t.id != id);
        self.pending.len() != before
    }

    /// Cancel every pending timer
    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Earliest due time, if anything is pending
    pub fn next_due(&self) -> Option<f64> {
        self.earliest().map(|i| self.pending[i].due_ms)
    }

    fn earliest(&self) -> Option<usize> {
        self.pending
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.due_ms
                    .partial_cmp(&b.due_ms)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.id.cmp(&b.id))
            })
            .map(|(i, _)| i)
    }

    /// Take the earliest timer due at or before `until_ms`
    ///
    /// One-shot timers are removed; repeating timers are re-armed one
    /// period later under the same id.
    pub fn pop_due(&mut self, until_ms: f64) -> Option<Fired> {
        let idx = self.earliest()?;
        let timer = &self.pending[idx];
        if timer.due_ms > until_ms {
            return None;
        }
        let fired = Fired {
            id: timer.id,
            task: timer.task,
            due_ms: timer.due_ms,
        };
        let period = timer.period_ms;
        match period {
            Some(period) => self.pending[idx].due_ms += period,
            None => {
                self.pending.swap_remove(idx);
            }
        }
        Some(fired)
    }
}
