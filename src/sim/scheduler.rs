//! Virtual-time timer set
//!
//! Every periodic or one-shot action in a match (movement, spawn attempts,
//! entity expiry, effect durations) is a timer here. Each `TimerKind` owns at
//! most one live handle: arming a kind replaces whatever was armed before, so
//! a stale callback can never outlive its replacement.

use super::state::{EntityKind, GameMode};
use crate::consts::{LEVEL_STEP_MS, SPEED_FLOOR_MS};

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Advance the snake one cell
    Move,
    SpawnSpecialFood,
    SpawnBomb,
    SpawnStar,
    SpawnColorFood,
    /// Clear a transient entity whose lifetime ran out
    Expire(EntityKind),
    InvincibilityEnd,
    SpeedBoostEnd,
    ColorCycleStep,
    ColorCycleEnd,
}

#[derive(Debug, Clone)]
struct Timer {
    kind: TimerKind,
    due_ms: u64,
    /// `Some` for recurring timers
    period_ms: Option<u64>,
    /// Arm order, breaks ties between timers due at the same instant
    seq: u64,
}

/// Cancellable timers over a virtual millisecond clock
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now_ms: u64,
    timers: Vec<Timer>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Fire `kind` once, `delay_ms` from now
    pub fn arm_once(&mut self, kind: TimerKind, delay_ms: u64) {
        self.arm(kind, delay_ms, None);
    }

    /// Fire `kind` every `period_ms`, first firing one period from now
    pub fn arm_every(&mut self, kind: TimerKind, period_ms: u64) {
        // A zero period would spin forever inside a single advance
        self.arm(kind, period_ms, Some(period_ms.max(1)));
    }

    fn arm(&mut self, kind: TimerKind, delay_ms: u64, period_ms: Option<u64>) {
        self.cancel(kind);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers.push(Timer {
            kind,
            due_ms: self.now_ms + delay_ms,
            period_ms,
            seq,
        });
    }

    /// Returns true if a timer of this kind was live
    pub fn cancel(&mut self, kind: TimerKind) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.kind != kind);
        self.timers.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.timers.iter().any(|t| t.kind == kind)
    }

    /// Period of a recurring timer
    pub fn period_of(&self, kind: TimerKind) -> Option<u64> {
        self.timers
            .iter()
            .find(|t| t.kind == kind)
            .and_then(|t| t.period_ms)
    }

    /// Milliseconds until `kind` next fires
    pub fn due_in(&self, kind: TimerKind) -> Option<u64> {
        self.timers
            .iter()
            .find(|t| t.kind == kind)
            .map(|t| t.due_ms.saturating_sub(self.now_ms))
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Pop the earliest timer due at or before `until_ms`.
    ///
    /// The clock jumps to the timer's due time. Recurring timers are re-armed
    /// for their next period before being returned, so the caller may cancel
    /// or replace them while handling the firing.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<TimerKind> {
        let idx = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= until_ms)
            .min_by_key(|(_, t)| (t.due_ms, t.seq))
            .map(|(i, _)| i)?;

        let due_ms = self.timers[idx].due_ms;
        self.now_ms = self.now_ms.max(due_ms);

        let kind = self.timers[idx].kind;
        match self.timers[idx].period_ms {
            Some(period) => {
                let seq = self.next_seq;
                self.next_seq += 1;
                let timer = &mut self.timers[idx];
                timer.due_ms = due_ms + period;
                timer.seq = seq;
            }
            None => {
                self.timers.swap_remove(idx);
            }
        }
        Some(kind)
    }

    /// Move the clock forward to `until_ms` without firing anything
    pub fn settle(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }
}

/// Move interval for a mode and level, less any active boost, never below the floor
pub fn move_interval_ms(mode: GameMode, level: u32, boost_ms: u64) -> u64 {
    mode.base_interval_ms()
        .saturating_sub(u64::from(level) * LEVEL_STEP_MS)
        .saturating_sub(boost_ms)
        .max(SPEED_FLOOR_MS)
}
