//! Frame slot pacing for the render loop.

use std::time::{Duration, Instant};

/// Sleeps until the next frame slot. Missed slots are dropped, not caught up.
#[derive(Debug)]
pub struct FramePacer {
    interval: Duration,
    next_slot: Option<Instant>,
}

impl FramePacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: None,
        }
    }

    /// Block until the next slot and return how long we slept.
    pub fn wait(&mut self) -> Duration {
        let now = Instant::now();
        let slot = self.next_slot.unwrap_or(now) + self.interval;

        if slot > now {
            let pause = slot - now;
            std::thread::sleep(pause);
            self.next_slot = Some(slot);
            pause
        } else {
            self.next_slot = Some(now);
            Duration::ZERO
        }
    }
}
