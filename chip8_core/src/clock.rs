pub mod clock {
    use std::time::{Duration, Instant};

    pub const TIMER_HZ: u64 = 60;

    const TICK: Duration = Duration::from_nanos(1_000_000_000 / TIMER_HZ);

    /// Converts elapsed wall time into whole 60 Hz timer ticks.
    ///
    /// Sub-tick remainders carry over, so ticks do not drift no matter how
    /// often the clock is sampled.
    pub struct TimerClock {
        last: Instant,
        carry: Duration,
    }

    impl TimerClock {
        pub fn new(now: Instant) -> TimerClock {
            TimerClock {
                last: now,
                carry: Duration::ZERO,
            }
        }

        pub fn ticks_at(&mut self, now: Instant) -> u32 {
            let elapsed = now.saturating_duration_since(self.last) + self.carry;
            self.last = now;

            let ticks = (elapsed.as_nanos() / TICK.as_nanos()) as u32;
            self.carry = elapsed - TICK * ticks;
            ticks
        }
    }
}
