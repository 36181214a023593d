//! Time primitives shared by the drills.
//!
//! Nothing here owns a clock. The host measures elapsed time and pushes it in
//! through `tick`, so every drill can be driven deterministically in tests.

use std::time::Duration;

use tracing::debug;

/// Motion speeds are expressed per frame at this refresh rate.
pub const REFERENCE_FPS: f64 = 60.0;

/// Number of reference frames covered by `elapsed`.
pub fn frames_in(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * REFERENCE_FPS
}

/// Liveness token stamped on deferred work. Bumping the epoch invalidates
/// everything scheduled under the previous one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Epoch(pub u64);

impl Epoch {
    pub fn next(self) -> Self {
        Epoch(self.0.wrapping_add(1))
    }
}

/// Registration of the per-refresh update callback for one round.
#[derive(Debug, Default)]
pub struct FrameLoop {
    owner: Option<u64>,
    frames: u64,
}

impl FrameLoop {
    pub fn register(&mut self, owner: u64) {
        if self.owner != Some(owner) {
            debug!(owner, "frame loop registered");
            self.owner = Some(owner);
            self.frames = 0;
        }
    }

    /// Returns whether a registration was actually cancelled.
    pub fn cancel(&mut self) -> bool {
        match self.owner.take() {
            Some(owner) => {
                debug!(owner, frames = self.frames, "frame loop cancelled");
                true
            }
            None => false,
        }
    }

    pub fn is_running_for(&self, owner: u64) -> bool {
        self.owner == Some(owner)
    }

    pub fn is_running(&self) -> bool {
        self.owner.is_some()
    }

    pub fn record_frame(&mut self) {
        self.frames += 1;
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[derive(Debug)]
struct Pending<A> {
    due: Duration,
    seq: u64,
    epoch: Epoch,
    action: A,
}

/// One-shot delayed actions on a virtual clock advanced by `advance`.
#[derive(Debug)]
pub struct Timers<A> {
    now: Duration,
    epoch: Epoch,
    seq: u64,
    pending: Vec<Pending<A>>,
}

impl<A> Default for Timers<A> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            epoch: Epoch::default(),
            seq: 0,
            pending: Vec::new(),
        }
    }
}

impl<A> Timers<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Start a new epoch; anything still queued from the old one is dropped
    /// when it comes due instead of firing.
    pub fn bump_epoch(&mut self) -> Epoch {
        self.epoch = self.epoch.next();
        self.epoch
    }

    pub fn schedule(&mut self, delay: Duration, action: A) {
        self.seq += 1;
        self.pending.push(Pending {
            due: self.now + delay,
            seq: self.seq,
            epoch: self.epoch,
            action,
        });
    }

    /// Advance the clock and return live actions that came due, in due order.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<A> {
        self.now += elapsed;
        let now = self.now;

        let (mut due, waiting): (Vec<Pending<A>>, Vec<Pending<A>>) =
            self.pending.drain(..).partition(|p| p.due <= now);
        self.pending = waiting;

        due.sort_by(|a, b| a.due.cmp(&b.due).then(a.seq.cmp(&b.seq)));
        let current = self.epoch;
        due.into_iter()
            .filter_map(|p| {
                if p.epoch == current {
                    Some(p.action)
                } else {
                    debug!(stale = p.epoch.0, current = current.0, "dropping stale timer");
                    None
                }
            })
            .collect()
    }

    pub fn cancel_all(&mut self) -> usize {
        let n = self.pending.len();
        self.pending.clear();
        n
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Whole-second countdown. Fractions of a second carry between advances and
/// are discarded on stop, so a quick stop/start cannot fire early.
#[derive(Clone, Debug)]
pub struct Countdown {
    remaining: u32,
    max: u32,
    carry: Duration,
    running: bool,
}

impl Countdown {
    pub fn new(seconds: u32) -> Self {
        Self {
            remaining: seconds,
            max: seconds,
            carry: Duration::ZERO,
            running: false,
        }
    }

    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            self.carry = Duration::ZERO;
        }
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.carry = Duration::ZERO;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    /// Add seconds, capped at the starting duration.
    pub fn extend(&mut self, seconds: u32) {
        self.remaining = self.remaining.saturating_add(seconds).min(self.max);
    }

    /// Returns the number of whole seconds that elapsed.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        if !self.running {
            return 0;
        }
        self.carry += elapsed;
        let mut fired = 0;
        while self.carry >= Duration::from_secs(1) && self.remaining > 0 {
            self.carry -= Duration::from_secs(1);
            self.remaining -= 1;
            fired += 1;
        }
        if self.remaining == 0 {
            self.carry = Duration::ZERO;
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_in() {
        assert!((frames_in(Duration::from_millis(500)) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_timers_fire_in_due_order() {
        let mut timers = Timers::new();
        timers.schedule(Duration::from_millis(300), "late");
        timers.schedule(Duration::from_millis(100), "early");
        assert!(timers.advance(Duration::from_millis(50)).is_empty());
        assert_eq!(timers.advance(Duration::from_millis(300)), vec!["early", "late"]);
        assert!(timers.is_empty());
    }

    #[test]
    fn test_stale_timers_never_fire() {
        let mut timers = Timers::new();
        timers.schedule(Duration::from_millis(100), 1);
        timers.bump_epoch();
        timers.schedule(Duration::from_millis(100), 2);
        assert_eq!(timers.advance(Duration::from_millis(100)), vec![2]);
    }

    #[test]
    fn test_cancel_all() {
        let mut timers = Timers::new();
        timers.schedule(Duration::from_millis(10), ());
        timers.schedule(Duration::from_millis(20), ());
        assert_eq!(timers.cancel_all(), 2);
        assert_eq!(timers.cancel_all(), 0);
        assert!(timers.advance(Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn test_frame_loop_cancel_is_idempotent() {
        let mut frames = FrameLoop::default();
        frames.register(4);
        assert!(frames.is_running_for(4));
        assert!(!frames.is_running_for(5));
        assert!(frames.cancel());
        assert!(!frames.cancel());
        assert!(!frames.is_running());
    }

    #[test]
    fn test_countdown_only_runs_when_started() {
        let mut countdown = Countdown::new(10);
        assert_eq!(countdown.advance(Duration::from_secs(3)), 0);
        countdown.start();
        assert_eq!(countdown.advance(Duration::from_millis(2500)), 2);
        assert_eq!(countdown.remaining(), 8);
        assert_eq!(countdown.advance(Duration::from_millis(500)), 1);
        assert_eq!(countdown.remaining(), 7);
    }

    #[test]
    fn test_countdown_restart_does_not_double_fire() {
        let mut countdown = Countdown::new(10);
        countdown.start();
        countdown.advance(Duration::from_millis(900));
        countdown.start();
        countdown.stop();
        countdown.start();
        assert_eq!(countdown.advance(Duration::from_millis(900)), 0);
        assert_eq!(countdown.remaining(), 10);
    }

    #[test]
    fn test_countdown_extend_is_capped() {
        let mut countdown = Countdown::new(120);
        countdown.start();
        countdown.advance(Duration::from_secs(2));
        countdown.extend(3);
        assert_eq!(countdown.remaining(), 120);
        countdown.advance(Duration::from_secs(10));
        countdown.extend(3);
        assert_eq!(countdown.remaining(), 113);
    }

    #[test]
    fn test_countdown_stops_at_zero() {
        let mut countdown = Countdown::new(2);
        countdown.start();
        assert_eq!(countdown.advance(Duration::from_secs(5)), 2);
        assert!(countdown.is_expired());
        assert_eq!(countdown.advance(Duration::from_secs(5)), 0);
    }
}
