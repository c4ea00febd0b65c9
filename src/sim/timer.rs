//! Countdown timers aged once per fixed tick

use std::fmt;

/// Logical ticks per second of simulated time
pub const TICKS_PER_SECOND: u64 = 60;

/// Unit a timer's magnitude is given in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Tick,
    Second,
    Minute,
}

impl TimeUnit {
    /// Number of fixed ticks in one of this unit
    pub const fn ticks(self) -> u64 {
        match self {
            TimeUnit::Tick => 1,
            TimeUnit::Second => TICKS_PER_SECOND,
            TimeUnit::Minute => TICKS_PER_SECOND * 60,
        }
    }
}

/// Identifies a timer within its [`TimerSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Work run when a timer reaches zero
pub type TimerAction = Box<dyn FnMut(&mut TimerCommands)>;

/// Result of aging a timer by one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimerState {
    /// Still counting down
    Pending,
    /// Fired and reset to its full period
    Rearmed,
    /// Fired and will be removed
    Expired,
}

/// A one-shot or repeating countdown
pub struct Timer {
    unit: TimeUnit,
    period: u64,
    remaining: u64,
    repeats: bool,
    expired: bool,
    action: TimerAction,
}

impl Timer {
    /// Creates a timer firing after `magnitude` units
    pub fn new<F>(unit: TimeUnit, magnitude: u64, repeats: bool, action: F) -> Self
    where
        F: FnMut(&mut TimerCommands) + 'static,
    {
        let period = magnitude.saturating_mul(unit.ticks());
        Self {
            unit,
            period,
            remaining: period,
            repeats,
            expired: false,
            action: Box::new(action),
        }
    }

    /// Ages the timer by one tick, running its action when it reaches zero
    pub(crate) fn advance(&mut self, commands: &mut TimerCommands) -> TimerState {
        if self.expired {
            return TimerState::Expired;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            return TimerState::Pending;
        }

        let state = if self.repeats {
            self.remaining = self.period;
            TimerState::Rearmed
        } else {
            self.expired = true;
            TimerState::Expired
        };

        (self.action)(commands);
        state
    }

    /// Ticks left before the next firing
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Full countdown length in ticks
    pub fn period(&self) -> u64 {
        self.period
    }

    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    pub fn repeats(&self) -> bool {
        self.repeats
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("unit", &self.unit)
            .field("period", &self.period)
            .field("remaining", &self.remaining)
            .field("repeats", &self.repeats)
            .field("expired", &self.expired)
            .finish_non_exhaustive()
    }
}

/// Requests made by timer actions while a tick is in progress
///
/// Nothing here touches the active set directly. Scheduled timers join the
/// set once every timer that was active at the start of the tick has been
/// aged.
pub struct TimerCommands {
    next_id: u64,
    scheduled: Vec<(TimerId, Timer)>,
    close_requested: bool,
    debug_toggles: u32,
}

impl TimerCommands {
    fn new(next_id: u64) -> Self {
        Self {
            next_id,
            scheduled: Vec::new(),
            close_requested: false,
            debug_toggles: 0,
        }
    }

    /// Schedules a new timer, first aged on the next tick
    pub fn add_timer<F>(&mut self, unit: TimeUnit, magnitude: u64, repeats: bool, action: F) -> TimerId
    where
        F: FnMut(&mut TimerCommands) + 'static,
    {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.scheduled
            .push((id, Timer::new(unit, magnitude, repeats, action)));
        id
    }

    /// Asks the loop to close at the top of the next frame
    pub fn close(&mut self) {
        self.close_requested = true;
    }

    /// Flips the debug flag once the tick completes
    pub fn toggle_debug(&mut self) {
        self.debug_toggles += 1;
    }
}

/// What happened during one [`TimerSet::tick`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    /// Timers whose action ran
    pub fired: usize,
    /// One-shot timers removed after firing
    pub expired: usize,
    /// Timers scheduled by actions
    pub scheduled: usize,
    /// Whether an action asked the loop to close
    pub close_requested: bool,
    /// How many times actions toggled debug
    pub debug_toggles: u32,
}

/// Active timers, aged in insertion order
#[derive(Debug, Default)]
pub struct TimerSet {
    timers: Vec<(TimerId, Timer)>,
    next_id: u64,
}

impl TimerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a timer to the end of the set
    pub fn insert(&mut self, timer: Timer) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push((id, timer));
        id
    }

    /// Ages every active timer by one tick
    pub fn tick(&mut self) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        if self.timers.is_empty() {
            return outcome;
        }

        let mut commands = TimerCommands::new(self.next_id);
        for (_, timer) in &mut self.timers {
            match timer.advance(&mut commands) {
                TimerState::Pending => {}
                TimerState::Rearmed => outcome.fired += 1,
                TimerState::Expired => {
                    outcome.fired += 1;
                    outcome.expired += 1;
                }
            }
        }

        self.timers.retain(|(_, timer)| !timer.is_expired());

        self.next_id = commands.next_id;
        outcome.scheduled = commands.scheduled.len();
        outcome.close_requested = commands.close_requested;
        outcome.debug_toggles = commands.debug_toggles;
        self.timers.append(&mut commands.scheduled);

        outcome
    }

    pub fn get(&self, id: TimerId) -> Option<&Timer> {
        self.timers
            .iter()
            .find(|(timer_id, _)| *timer_id == id)
            .map(|(_, timer)| timer)
    }

    pub fn contains(&self, id: TimerId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}
