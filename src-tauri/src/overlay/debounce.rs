//! Resize debouncing.
//!
//! A burst of layout samples becomes exactly one `Started` and one
//! `Settled(last geometry)`. Every sample re-arms a single-shot timer; the
//! burst settles once the timer expires with no sample in between.

use std::time::Duration;

use tokio::time::Instant;

use super::geometry::Geometry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    Idle,
    Resizing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeEvent {
    Started,
    Settled(Geometry),
}

/// Cancelable single-shot timer.
///
/// Arming replaces any pending deadline, which is the only cancellation
/// primitive the debouncer needs.
#[derive(Debug, Default)]
pub struct DebounceTimer {
    deadline: Option<Instant>,
}

impl DebounceTimer {
    pub fn arm(&mut self, at: Instant) {
        self.deadline = Some(at);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }

    /// Resolves when the armed deadline passes; pending forever when disarmed.
    pub async fn expired(&self) {
        match self.deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending().await,
        }
    }
}

/// Two-state debouncer over geometry samples. Single owner, not shared.
#[derive(Debug)]
pub struct ResizeDebouncer {
    state: DebounceState,
    delay: Duration,
    timer: DebounceTimer,
    latest: Option<Geometry>,
}

impl ResizeDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            state: DebounceState::Idle,
            delay,
            timer: DebounceTimer::default(),
            latest: None,
        }
    }

    pub fn state(&self) -> DebounceState {
        self.state
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// Feed one sample. Returns `Started` only on the first sample of a burst.
    pub fn on_sample(&mut self, geometry: Geometry, now: Instant) -> Option<ResizeEvent> {
        self.latest = Some(geometry);
        self.timer.arm(now + self.delay);

        match self.state {
            DebounceState::Idle => {
                self.state = DebounceState::Resizing;
                Some(ResizeEvent::Started)
            },
            DebounceState::Resizing => None,
        }
    }

    /// Fire the timer if its deadline has passed.
    pub fn on_timer(&mut self, now: Instant) -> Option<ResizeEvent> {
        if !self.timer.is_due(now) {
            return None;
        }
        self.timer.cancel();

        if self.state != DebounceState::Resizing {
            return None;
        }
        self.state = DebounceState::Idle;
        self.latest.take().map(ResizeEvent::Settled)
    }

    /// Settle a pending burst now, without waiting for the timer.
    pub fn flush(&mut self) -> Option<ResizeEvent> {
        self.timer.cancel();
        match self.state {
            DebounceState::Resizing => {
                self.state = DebounceState::Idle;
                self.latest.take().map(ResizeEvent::Settled)
            },
            DebounceState::Idle => None,
        }
    }

    /// Wait for the pending timer; never resolves while idle.
    pub async fn expired(&self) {
        self.timer.expired().await
    }
}
