use std::collections::HashMap;
use std::time::{Duration, Instant};

const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

pub trait Scheduler {
    fn schedule(&mut self, interval: Duration) -> TimerHandle;
    /// Disarms `handle`. Firings it had accumulated are discarded.
    fn cancel(&mut self, handle: TimerHandle);
    fn take_due(&mut self, handle: TimerHandle) -> bool;
    fn active_timers(&self) -> usize;
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    interval: Duration,
    next_due: Duration,
}

#[derive(Debug, Default)]
struct TimerTable {
    next_id: u64,
    timers: HashMap<u64, Timer>,
}

impl TimerTable {
    fn schedule(&mut self, now: Duration, interval: Duration) -> TimerHandle {
        let interval = interval.max(MIN_INTERVAL);
        let id = self.next_id;
        self.next_id += 1;
        self.timers.insert(
            id,
            Timer {
                interval,
                next_due: now + interval,
            },
        );
        TimerHandle(id)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.timers.remove(&handle.0);
    }

    fn take_due(&mut self, handle: TimerHandle, now: Duration) -> bool {
        let Some(timer) = self.timers.get_mut(&handle.0) else {
            return false;
        };
        if now < timer.next_due {
            return false;
        }
        timer.next_due += timer.interval;
        true
    }

    fn len(&self) -> usize {
        self.timers.len()
    }
}

#[derive(Debug)]
pub struct IntervalScheduler {
    origin: Instant,
    table: TimerTable,
}

impl IntervalScheduler {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            table: TimerTable::default(),
        }
    }

    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

impl Default for IntervalScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for IntervalScheduler {
    fn schedule(&mut self, interval: Duration) -> TimerHandle {
        let now = self.now();
        self.table.schedule(now, interval)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.table.cancel(handle);
    }

    fn take_due(&mut self, handle: TimerHandle) -> bool {
        let now = self.now();
        self.table.take_due(handle, now)
    }

    fn active_timers(&self) -> usize {
        self.table.len()
    }
}

#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    table: TimerTable,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, interval: Duration) -> TimerHandle {
        self.table.schedule(self.now, interval)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.table.cancel(handle);
    }

    fn take_due(&mut self, handle: TimerHandle) -> bool {
        self.table.take_due(handle, self.now)
    }

    fn active_timers(&self) -> usize {
        self.table.len()
    }
}
