//! Monotonic time source shared by boot, screens, and the event loop.

use core::cell::Cell;

/// Millisecond clock plus an async delay.
#[allow(async_fn_in_trait)]
pub trait Clock {
    fn now_ms(&self) -> u64;

    async fn sleep_ms(&self, ms: u64);
}

/// Deterministic clock: sleeping advances time instantly.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: Cell<u64>,
    read_step_ms: u64,
    yield_on_sleep: bool,
    slept_ms: Cell<u64>,
}

impl ManualClock {
    pub const fn new(start_ms: u64) -> Self {
        Self {
            now_ms: Cell::new(start_ms),
            read_step_ms: 0,
            yield_on_sleep: false,
            slept_ms: Cell::new(0),
        }
    }

    /// Every `now_ms` read also advances time, so busy-wait loops terminate.
    pub const fn with_read_step_ms(mut self, read_step_ms: u64) -> Self {
        self.read_step_ms = read_step_ms;
        self
    }

    /// Sleeping yields once to the executor, so joined futures interleave.
    pub const fn with_yielding_sleep(mut self) -> Self {
        self.yield_on_sleep = true;
        self
    }

    pub fn advance_ms(&self, ms: u64) {
        self.now_ms.set(self.now_ms.get().saturating_add(ms));
    }

    /// Total time spent in `sleep_ms`.
    pub fn slept_ms(&self) -> u64 {
        self.slept_ms.get()
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        let now = self.now_ms.get();
        self.now_ms.set(now.saturating_add(self.read_step_ms));
        now
    }

    async fn sleep_ms(&self, ms: u64) {
        self.slept_ms.set(self.slept_ms.get().saturating_add(ms));
        self.advance_ms(ms);
        if self.yield_on_sleep {
            embassy_futures::yield_now().await;
        }
    }
}
