//! Per-color countdown clocks
//!
//! Every operation takes the current [`Instant`] explicitly, so elapsed time
//! is deducted exactly once per observation and tests never need to sleep.
//! Timeout is polled: a flag fall is noticed on the next read, not by a
//! background timer.

use std::time::{Duration, Instant};

use board::Color;

/// The time budget each side starts with
pub const INITIAL_BUDGET: Duration = Duration::from_secs(10 * 60);

/// How much the add-time card grants
pub const TIME_GRANT: Duration = Duration::from_secs(2 * 60);

/// How much the subtract-time card takes away
pub const TIME_PENALTY: Duration = Duration::from_secs(2 * 60);

/// The subtract-time card may not target a player below this
pub const PENALTY_FLOOR: Duration = Duration::from_secs(3 * 60);

/// A pair of countdown clocks, at most one of which runs at a time
#[derive(Clone, Debug)]
pub struct GameClock {
    remaining: [Duration; 2],
    running: Option<Color>,
    last_tick: Instant,
}

impl GameClock {
    /// Both clocks full, neither running
    pub fn new(budget: Duration, now: Instant) -> Self {
        Self {
            remaining: [budget; 2],
            running: None,
            last_tick: now,
        }
    }

    /// Deduct wall-clock time since the last tick from the running clock
    pub fn elapse(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_tick);
        self.last_tick = now;
        if let Some(color) = self.running {
            let remaining = &mut self.remaining[color.index()];
            *remaining = remaining.saturating_sub(elapsed);
        }
    }

    /// Time left for the given color, as of the last [`GameClock::elapse`]
    pub fn remaining(&self, color: Color) -> Duration {
        self.remaining[color.index()]
    }

    /// Whose clock is running, if any
    pub fn running(&self) -> Option<Color> {
        self.running
    }

    /// Switch which clock runs
    ///
    /// Settles the old running clock up to `now` first, so no elapsed time
    /// leaks onto the wrong color. `None` stops both, which is what game
    /// termination does.
    pub fn set_running(&mut self, color: Option<Color>, now: Instant) {
        self.elapse(now);
        self.running = color;
    }

    /// Grant extra time to the given color
    pub fn add_time(&mut self, color: Color, amount: Duration) {
        self.remaining[color.index()] += amount;
    }

    /// Take time away from the given color, stopping at zero
    pub fn subtract_time(&mut self, color: Color, amount: Duration) {
        let remaining = &mut self.remaining[color.index()];
        *remaining = remaining.saturating_sub(amount);
    }

    /// Exchange the two remaining durations
    pub fn swap(&mut self, now: Instant) {
        self.elapse(now);
        self.remaining.swap(0, 1);
    }

    /// The color whose flag has fallen, if any
    pub fn flagged(&self) -> Option<Color> {
        Color::COLORS
            .into_iter()
            .find(|color| self.remaining[color.index()].is_zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_running_clock_loses_time() {
        let start = Instant::now();
        let mut clock = GameClock::new(INITIAL_BUDGET, start);
        clock.set_running(Some(Color::White), start);
        clock.elapse(start + Duration::from_secs(30));
        assert_eq!(
            clock.remaining(Color::White),
            INITIAL_BUDGET - Duration::from_secs(30)
        );
        assert_eq!(clock.remaining(Color::Black), INITIAL_BUDGET);
    }

    #[test]
    fn switching_settles_the_old_clock_first() {
        let start = Instant::now();
        let mut clock = GameClock::new(INITIAL_BUDGET, start);
        clock.set_running(Some(Color::White), start);
        clock.set_running(Some(Color::Black), start + Duration::from_secs(10));
        clock.elapse(start + Duration::from_secs(25));
        assert_eq!(
            clock.remaining(Color::White),
            INITIAL_BUDGET - Duration::from_secs(10)
        );
        assert_eq!(
            clock.remaining(Color::Black),
            INITIAL_BUDGET - Duration::from_secs(15)
        );
    }

    #[test]
    fn flag_falls_at_zero() {
        let start = Instant::now();
        let mut clock = GameClock::new(Duration::from_secs(5), start);
        clock.set_running(Some(Color::Black), start);
        assert_eq!(clock.flagged(), None);
        clock.elapse(start + Duration::from_secs(6));
        assert_eq!(clock.flagged(), Some(Color::Black));
        assert_eq!(clock.remaining(Color::Black), Duration::ZERO);
    }

    #[test]
    fn swap_exchanges_remaining_time() {
        let start = Instant::now();
        let mut clock = GameClock::new(INITIAL_BUDGET, start);
        clock.subtract_time(Color::Black, Duration::from_secs(60));
        clock.swap(start);
        assert_eq!(
            clock.remaining(Color::White),
            INITIAL_BUDGET - Duration::from_secs(60)
        );
        assert_eq!(clock.remaining(Color::Black), INITIAL_BUDGET);
    }

    #[test]
    fn subtraction_saturates_at_zero() {
        let start = Instant::now();
        let mut clock = GameClock::new(Duration::from_secs(30), start);
        clock.subtract_time(Color::White, TIME_PENALTY);
        assert_eq!(clock.remaining(Color::White), Duration::ZERO);
    }
}
