//! Debounced render scheduling.
//!
//! ```text
//!          volume_loaded            request
//!   Idle ---------------> Ready ---------------> Pending { deadline }
//!                          ^                        |  ^
//!                          |   poll (deadline hit)  |  | request (re-arm)
//!                          +------------------------+--+
//! ```
//!
//! Requests while `Idle` are accepted and dropped. Each request while
//! `Ready` or `Pending` moves the deadline to `now + quiet_period`, so a
//! burst of requests results in a single due render after the last one.
//!
//! The scheduler never reads the clock itself; callers pass `now`.

use std::time::{Duration, Instant};

use tracing::trace;

/// Quiet period used when none is configured.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(80);

/// Scheduler tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Time without new requests before a render is due.
    pub quiet_period: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            quiet_period: DEFAULT_QUIET_PERIOD,
        }
    }
}

/// Scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerState {
    /// No volume loaded.
    #[default]
    Idle,
    /// Volume loaded, nothing pending.
    Ready,
    /// A render is due at `deadline`.
    Pending {
        /// When the render becomes due.
        deadline: Instant,
    },
}

/// Coalesces render requests into single renders.
#[derive(Debug, Clone, Default)]
pub struct RenderScheduler {
    config: SchedulerConfig,
    state: SchedulerState,
}

impl RenderScheduler {
    /// Idle scheduler.
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            state: SchedulerState::Idle,
        }
    }

    /// Tunables.
    pub fn config(&self) -> SchedulerConfig {
        self.config
    }

    /// Current state.
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Whether no volume is loaded yet.
    pub fn is_idle(&self) -> bool {
        self.state == SchedulerState::Idle
    }

    /// Whether a render is waiting for its deadline.
    pub fn is_pending(&self) -> bool {
        matches!(self.state, SchedulerState::Pending { .. })
    }

    /// A volume was loaded and rendered right away; drops anything pending.
    pub fn volume_loaded(&mut self) {
        self.state = SchedulerState::Ready;
    }

    /// Arms (or re-arms) the quiet period. Returns whether a render is now
    /// pending; always false while idle.
    pub fn request(&mut self, now: Instant) -> bool {
        if self.is_idle() {
            trace!("render request ignored while idle");
            return false;
        }
        self.state = SchedulerState::Pending {
            deadline: now + self.config.quiet_period,
        };
        true
    }

    /// Returns true exactly once per armed deadline, when `now` has reached it.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.state {
            SchedulerState::Pending { deadline } if now >= deadline => {
                self.state = SchedulerState::Ready;
                true
            }
            _ => false,
        }
    }

    /// Time left until the pending render is due.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        match self.state {
            SchedulerState::Pending { deadline } => Some(deadline.saturating_duration_since(now)),
            _ => None,
        }
    }

    /// Makes a pending render due immediately. Returns whether one was pending.
    pub fn flush(&mut self) -> bool {
        if self.is_pending() {
            self.state = SchedulerState::Ready;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn ready() -> RenderScheduler {
        let mut s = RenderScheduler::default();
        s.volume_loaded();
        s
    }

    #[test]
    fn idle_accepts_but_never_renders() {
        let t0 = Instant::now();
        let mut s = RenderScheduler::default();
        assert!(!s.request(t0));
        assert!(s.is_idle());
        assert!(!s.poll(t0 + ms(1000)));
        assert_eq!(s.time_until_due(t0), None);
    }

    #[test]
    fn burst_coalesces_into_one_render() {
        let t0 = Instant::now();
        let mut s = ready();
        let mut renders = 0;
        // ten requests 20 ms apart, each inside the quiet period of the previous one
        for i in 0..10 {
            let now = t0 + ms(i * 20);
            if s.poll(now) {
                renders += 1;
            }
            assert!(s.request(now));
        }
        let last = t0 + ms(180);
        assert!(!s.poll(last + ms(79)));
        assert!(s.poll(last + ms(80)));
        renders += 1;
        assert_eq!(renders, 1);
        assert!(!s.poll(last + ms(500)));
        assert_eq!(s.state(), SchedulerState::Ready);
    }

    #[test]
    fn spaced_requests_render_separately() {
        let t0 = Instant::now();
        let mut s = ready();
        s.request(t0);
        assert!(s.poll(t0 + ms(100)));
        s.request(t0 + ms(200));
        assert!(s.poll(t0 + ms(300)));
    }

    #[test]
    fn time_until_due_counts_down() {
        let t0 = Instant::now();
        let mut s = ready();
        s.request(t0);
        assert_eq!(s.time_until_due(t0 + ms(30)), Some(ms(50)));
        assert_eq!(s.time_until_due(t0 + ms(200)), Some(Duration::ZERO));
    }

    #[test]
    fn load_and_flush_clear_pending() {
        let t0 = Instant::now();
        let mut s = ready();
        s.request(t0);
        s.volume_loaded();
        assert!(!s.is_pending());
        assert!(!s.flush());
        s.request(t0);
        assert!(s.flush());
        assert!(!s.poll(t0 + ms(100)));
    }

    #[test]
    fn custom_quiet_period() {
        let t0 = Instant::now();
        let mut s = RenderScheduler::new(SchedulerConfig { quiet_period: ms(5) });
        s.volume_loaded();
        s.request(t0);
        assert!(s.poll(t0 + ms(5)));
        assert_eq!(s.config().quiet_period, ms(5));
    }
}
