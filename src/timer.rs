//! Countdown tick source
//!
//! The countdown does not touch game state. The event loop asks it how many
//! whole seconds have elapsed and feeds that many ticks to the session.

use std::time::{Duration, Instant};

/// Tick period of the countdown
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Source of the current instant
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: std::cell::Cell<Instant>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: std::cell::Cell::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

#[cfg(test)]
impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Cancellable periodic tick source
#[derive(Debug)]
pub struct Countdown<C: Clock> {
    clock: C,
    period: Duration,
    /// Instant of the last delivered tick; `None` while disarmed
    last_tick: Option<Instant>,
}

impl<C: Clock> Countdown<C> {
    pub fn new(clock: C) -> Self {
        Self::with_period(clock, TICK_PERIOD)
    }

    pub fn with_period(clock: C, period: Duration) -> Self {
        Self {
            clock,
            period,
            last_tick: None,
        }
    }

    /// Start counting from now. Re-arming restarts the current period.
    pub fn arm(&mut self) {
        self.last_tick = Some(self.clock.now());
    }

    /// Stop delivering ticks
    pub fn disarm(&mut self) {
        self.last_tick = None;
    }

    pub fn is_armed(&self) -> bool {
        self.last_tick.is_some()
    }

    /// Number of whole periods elapsed since the last delivered tick.
    ///
    /// The reference point advances by exactly that many periods, so a late
    /// poll never drops a tick and never delivers one twice.
    pub fn due_ticks(&mut self) -> u32 {
        let Some(last) = self.last_tick else {
            return 0;
        };
        let elapsed = self.clock.now().saturating_duration_since(last);
        let due = (elapsed.as_nanos() / self.period.as_nanos().max(1)) as u32;
        if due > 0 {
            self.last_tick = Some(last + self.period * due);
        }
        due
    }

    /// Time left until the next tick, for use as a poll timeout
    pub fn until_next_tick(&self) -> Option<Duration> {
        let last = self.last_tick?;
        let next = last + self.period;
        Some(next.saturating_duration_since(self.clock.now()))
    }
}
